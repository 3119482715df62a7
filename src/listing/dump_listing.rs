use std::path::{Path, PathBuf};
use std::string::FromUtf8Error;

use compio::fs;
use snafu::{ResultExt, Snafu};
use tracing::{debug, info};

use crate::console::{Progress, status};
use crate::filesystem::{AddressingMode, BuildError, FileTree, build};

/// A file with saved `borg list --json-lines` output.
pub struct DumpListing<'a> {
    path: &'a Path,
}

impl<'a> DumpListing<'a> {
    pub fn new(path: &'a Path) -> Self {
        Self { path }
    }

    /// Loads the whole file first so progress can be shown as a percentage.
    pub async fn build_tree(&self, mode: AddressingMode) -> Result<FileTree, DumpListingError> {
        status("Loading lines...");
        let bytes = fs::read(self.path).await.context(ReadSnafu {
            file_path: self.path.to_path_buf(),
        })?;
        let contents = String::from_utf8(bytes).context(EncodingSnafu {
            file_path: self.path.to_path_buf(),
        })?;
        let lines: Vec<&str> = contents.lines().collect();
        debug!("Loaded {} lines from {}", lines.len(), self.path.display());

        status("Processing lines...");
        let line_count = lines.len();
        let mut progress = Progress::new(Some(line_count));
        let tree = build(lines.into_iter().inspect(|_| progress.tick()), mode).context(
            TreeBuildSnafu {
                file_path: self.path.to_path_buf(),
            },
        )?;
        drop(progress);

        info!("Processed {} lines from {}", line_count, self.path.display());
        Ok(tree)
    }
}

#[derive(Debug, Snafu)]
pub enum DumpListingError {
    #[snafu(display("Failed to read the listing file: {}", file_path.display()))]
    ReadError {
        file_path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Listing file {} is not valid UTF-8", file_path.display()))]
    EncodingError {
        file_path: PathBuf,
        source: FromUtf8Error,
    },
    #[snafu(display("Failed to build the tree from {}", file_path.display()))]
    TreeBuildError {
        file_path: PathBuf,
        source: BuildError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn dump_file(contents: &[u8]) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
        temp_file
            .write_all(contents)
            .expect("Failed to write to temp file");
        temp_file
    }

    #[compio::test]
    async fn builds_tree_from_dump_file() {
        let temp_file = dump_file(
            concat!(
                r#"{"path": ".", "type": "d", "size": 0}"#,
                "\n",
                r#"{"path": "pool/data", "type": "d", "size": 0}"#,
                "\r\n",
                r#"{"path": "pool/data/file", "type": "-", "size": 9}"#,
                "\n",
            )
            .as_bytes(),
        );

        let tree = DumpListing::new(temp_file.path())
            .build_tree(AddressingMode::FullPath)
            .await
            .unwrap();

        assert_eq!(tree.len(), 3);
        assert_eq!(tree.roots(), &[tree.lookup("pool").unwrap()]);
    }

    #[compio::test]
    async fn reports_line_of_malformed_record() {
        let temp_file = dump_file(b"{\"path\": \"a\", \"type\": \"d\"}\n{broken\n");

        let result = DumpListing::new(temp_file.path())
            .build_tree(AddressingMode::PerDataset)
            .await;

        assert!(matches!(
            result,
            Err(DumpListingError::TreeBuildError {
                source: BuildError::MalformedRecordError { line_number: 2, .. },
                ..
            })
        ));
    }

    #[compio::test]
    async fn rejects_invalid_utf8() {
        let temp_file = dump_file(&[0xff, 0xfe, b'\n']);

        let result = DumpListing::new(temp_file.path())
            .build_tree(AddressingMode::PerDataset)
            .await;

        assert!(matches!(result, Err(DumpListingError::EncodingError { .. })));
    }

    #[compio::test]
    async fn missing_file_is_a_read_error() {
        let result = DumpListing::new(Path::new("/this/path/does/not/exist.jsonl"))
            .build_tree(AddressingMode::PerDataset)
            .await;

        assert!(matches!(result, Err(DumpListingError::ReadError { .. })));
    }
}
