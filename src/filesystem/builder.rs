use derive_more::Display;
use snafu::{OptionExt, ResultExt, Snafu};
use tracing::{debug, trace, warn};

use super::entry::{Entry, EntryId, FileTree, parent_dir};
use super::record::Record;

/// How directories whose parent has not been seen yet are placed in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum AddressingMode {
    /// Every such directory starts its own tree in the root list.
    #[default]
    #[display("per-dataset")]
    PerDataset,
    /// All paths share one namespace, missing ancestors are created on demand.
    #[display("full-path")]
    FullPath,
}

/// Ancestor handling picked once per builder from the [`AddressingMode`].
#[derive(Clone, Copy)]
struct AncestorStrategy {
    /// Places a directory whose parent is not indexed.
    new_directory: fn(&mut FileTree, &str) -> EntryId,
    /// Finds a parent for a file whose parent directory is not indexed.
    missing_parent: fn(&mut FileTree, &str) -> Option<EntryId>,
}

impl AncestorStrategy {
    fn for_mode(mode: AddressingMode) -> Self {
        match mode {
            AddressingMode::FullPath => Self {
                new_directory: synthesize_ancestors,
                missing_parent: synthesize_parent,
            },
            AddressingMode::PerDataset => Self {
                new_directory: open_dataset,
                missing_parent: no_parent,
            },
        }
    }
}

/// Creates every prefix of `path` that is not indexed yet, each under the previous one.
///
/// Prefixes that already exist are reused, so ancestors announced out of
/// order or more than once still end up as a single entry.
fn synthesize_ancestors(tree: &mut FileTree, path: &str) -> EntryId {
    let mut ancestor = None;
    for (end, _) in path.match_indices('/') {
        ancestor = Some(directory_or_create(tree, &path[..end], ancestor));
    }
    directory_or_create(tree, path, ancestor)
}

fn directory_or_create(tree: &mut FileTree, path: &str, parent: Option<EntryId>) -> EntryId {
    match tree.lookup(path) {
        Some(id) => id,
        None => {
            trace!("Synthesizing directory '{}'", path);
            tree.insert_indexed(path, Entry::directory(path), parent)
        }
    }
}

fn synthesize_parent(tree: &mut FileTree, parent: &str) -> Option<EntryId> {
    Some(synthesize_ancestors(tree, parent))
}

/// Starts a new independent tree rooted at `path`.
fn open_dataset(tree: &mut FileTree, path: &str) -> EntryId {
    debug!("Opening dataset '{}'", path);
    tree.insert_indexed(path, Entry::directory(path), None)
}

fn no_parent(_tree: &mut FileTree, _parent: &str) -> Option<EntryId> {
    None
}

/// Incrementally rebuilds a directory hierarchy from listing records.
pub struct TreeBuilder {
    tree: FileTree,
    strategy: AncestorStrategy,
    lines_processed: usize,
}

impl TreeBuilder {
    pub fn new(mode: AddressingMode) -> Self {
        debug!("Creating tree builder in {} mode", mode);
        Self {
            tree: FileTree::new(),
            strategy: AncestorStrategy::for_mode(mode),
            lines_processed: 0,
        }
    }

    pub fn lines_processed(&self) -> usize {
        self.lines_processed
    }

    /// Parses one JSON line and attaches the record it describes.
    pub fn process_line(&mut self, line: &str) -> Result<(), BuildError> {
        self.lines_processed += 1;
        let line_number = self.lines_processed;
        let record: Record =
            serde_json::from_str(line).context(MalformedRecordSnafu { line_number })?;
        self.attach(record, line_number)
    }

    pub fn process_lines<I, S>(&mut self, lines: I) -> Result<(), BuildError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        lines
            .into_iter()
            .try_for_each(|line| self.process_line(line.as_ref()))
    }

    pub fn finish(self) -> FileTree {
        debug!(
            "Built tree with {} entries ({} roots) from {} lines",
            self.tree.len(),
            self.tree.roots().len(),
            self.lines_processed
        );
        self.tree
    }

    fn attach(&mut self, record: Record, line_number: usize) -> Result<(), BuildError> {
        if record.is_archive_root() {
            trace!("Skipping archive root on line {}", line_number);
            return Ok(());
        }

        if record.is_directory() {
            self.attach_directory(&record.path);
            Ok(())
        } else {
            let size = record.size.context(MissingSizeSnafu {
                line_number,
                path: record.path.clone(),
            })?;
            self.attach_file(&record.path, size, line_number)
        }
    }

    fn attach_directory(&mut self, path: &str) {
        if self.tree.contains_path(path) {
            debug!("Directory '{}' is already known", path);
            return;
        }

        match self.tree.lookup(parent_dir(path)) {
            Some(parent) => {
                self.tree
                    .insert_indexed(path, Entry::directory(path), Some(parent));
            }
            None => {
                (self.strategy.new_directory)(&mut self.tree, path);
            }
        }
    }

    fn attach_file(&mut self, path: &str, size: i64, line_number: usize) -> Result<(), BuildError> {
        let parent = parent_dir(path);

        if parent.is_empty() {
            if self.tree.contains_path(path) {
                warn!("Ignoring duplicate top-level entry '{}' on line {}", path, line_number);
            } else {
                self.tree
                    .insert_indexed(path, Entry::from_path(path, size), None);
            }
            return Ok(());
        }

        let parent_id = match self.tree.lookup(parent) {
            Some(id) => id,
            None => (self.strategy.missing_parent)(&mut self.tree, parent).context(
                UnresolvedParentSnafu {
                    line_number,
                    path,
                    parent,
                },
            )?,
        };
        self.tree.insert(Entry::from_path(path, size), Some(parent_id));
        Ok(())
    }
}

/// Builds a whole tree from `lines`, failing on the first bad line.
pub fn build<I, S>(lines: I, mode: AddressingMode) -> Result<FileTree, BuildError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut builder = TreeBuilder::new(mode);
    builder.process_lines(lines)?;
    Ok(builder.finish())
}

#[derive(Debug, Snafu)]
pub enum BuildError {
    #[snafu(display("Line {} is not a valid listing record", line_number))]
    MalformedRecordError {
        line_number: usize,
        source: serde_json::Error,
    },
    #[snafu(display("Line {}: file '{}' has no size", line_number, path))]
    MissingSizeError { line_number: usize, path: String },
    #[snafu(display(
        "Line {}: parent directory '{}' of '{}' was never listed",
        line_number,
        parent,
        path
    ))]
    UnresolvedParentError {
        line_number: usize,
        path: String,
        parent: String,
    },
}
