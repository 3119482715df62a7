use serde::Deserialize;

const DIRECTORY_TYPE: &str = "d";
const ARCHIVE_ROOT_PATH: &str = ".";

/// One line of `borg list --json-lines` output.
///
/// Only the fields needed to rebuild the tree are read, everything else borg
/// prints (mode, owner, mtime, ...) is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Record {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub size: Option<i64>,
}

impl Record {
    pub fn is_directory(&self) -> bool {
        self.kind == DIRECTORY_TYPE
    }

    /// The archive root (`.`) has no name and never becomes an entry.
    pub fn is_archive_root(&self) -> bool {
        self.path == ARCHIVE_ROOT_PATH
    }
}
