//! Writer for the ncdu JSON export format.
//!
//! The document is `[major, minor, {metadata}, [{"name": "/"}, <entry>...]]`
//! where a childless entry is `{"name", "dsize"}` and an entry with children
//! is `[{"name"}, <child>...]`. Directory sizes are never written, ncdu sums
//! them from the leaves.

use std::io::Write;

use serde::Serialize;
use snafu::{ResultExt, Snafu};

use super::entry::{EntryId, FileTree};

pub const NCDU_MAJOR_VERSION: u32 = 1;
pub const NCDU_MINOR_VERSION: u32 = 1;
const ROOT_NAME: &str = "/";

#[derive(Serialize)]
struct NodeHeader<'a> {
    name: &'a str,
}

#[derive(Serialize)]
struct LeafNode<'a> {
    name: &'a str,
    dsize: i64,
}

#[derive(Serialize)]
struct Metadata {}

/// Streams the ncdu document for `tree` into `writer`.
///
/// Entries are visited depth-first with an explicit stack, so deep
/// hierarchies do not grow the call stack.
pub fn write_ncdu_document<W: Write>(tree: &FileTree, mut writer: W) -> Result<(), ExportError> {
    write!(
        writer,
        "[{},{},",
        NCDU_MAJOR_VERSION, NCDU_MINOR_VERSION
    )
    .context(WriteSnafu)?;
    serde_json::to_writer(&mut writer, &Metadata {}).context(EncodeSnafu)?;
    writer.write_all(b",[").context(WriteSnafu)?;
    serde_json::to_writer(&mut writer, &NodeHeader { name: ROOT_NAME }).context(EncodeSnafu)?;

    // Each frame is an open internal node and the index of its next child
    let mut stack: Vec<(EntryId, usize)> = Vec::new();
    for &root in tree.roots() {
        writer.write_all(b",").context(WriteSnafu)?;
        open_entry(tree, root, &mut writer, &mut stack)?;

        while let Some((id, next_child)) = stack.last_mut() {
            let children = tree.entry(*id).children();
            match children.get(*next_child) {
                Some(&child) => {
                    *next_child += 1;
                    writer.write_all(b",").context(WriteSnafu)?;
                    open_entry(tree, child, &mut writer, &mut stack)?;
                }
                None => {
                    writer.write_all(b"]").context(WriteSnafu)?;
                    stack.pop();
                }
            }
        }
    }

    writer.write_all(b"]]").context(WriteSnafu)?;
    writer.flush().context(WriteSnafu)?;
    Ok(())
}

/// Writes a leaf completely, or the opening of an internal node and pushes it.
fn open_entry<W: Write>(
    tree: &FileTree,
    id: EntryId,
    writer: &mut W,
    stack: &mut Vec<(EntryId, usize)>,
) -> Result<(), ExportError> {
    let entry = tree.entry(id);
    if entry.is_leaf() {
        let leaf = LeafNode {
            name: entry.name(),
            dsize: entry.size(),
        };
        serde_json::to_writer(&mut *writer, &leaf).context(EncodeSnafu)?;
    } else {
        writer.write_all(b"[").context(WriteSnafu)?;
        serde_json::to_writer(&mut *writer, &NodeHeader { name: entry.name() })
            .context(EncodeSnafu)?;
        stack.push((id, 0));
    }
    Ok(())
}

#[derive(Debug, Snafu)]
pub enum ExportError {
    #[snafu(display("Failed to encode a tree entry"))]
    EncodeError { source: serde_json::Error },
    #[snafu(display("Failed to write the ncdu export"))]
    WriteError { source: std::io::Error },
}
