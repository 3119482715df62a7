use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use compio::process::Command;
use snafu::{ResultExt, Snafu};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::config::ToolCommand;
use crate::filesystem::{ExportError, FileTree, write_ncdu_document};

const IMPORT_FLAG: &str = "-f";

/// Opens a tree in ncdu through a temporary export file.
pub struct NcduViewer<'a> {
    tool: &'a ToolCommand,
}

impl<'a> NcduViewer<'a> {
    pub fn new(tool: &'a ToolCommand) -> Self {
        Self { tool }
    }

    /// Blocks until the user leaves ncdu. The export file is removed afterwards.
    pub async fn show(&self, tree: &FileTree) -> Result<(), ViewerError> {
        let mut export_file = NamedTempFile::new().context(TempFileSnafu)?;
        write_ncdu_document(tree, BufWriter::new(export_file.as_file_mut())).context(
            WriteExportSnafu {
                file_path: export_file.path().to_path_buf(),
            },
        )?;
        debug!("Wrote ncdu export to {}", export_file.path().display());

        let child = self
            .create_command(export_file.path())
            .spawn()
            .context(SpawnSnafu {
                command: self.tool.program.clone(),
            })?;
        let status = child.wait().await.context(WaitSnafu {
            command: self.tool.program.clone(),
        })?;

        if status.success() {
            info!("'{}' exited successfully", self.tool.program);
            Ok(())
        } else {
            ViewerFailedSnafu {
                command: self.tool.program.clone(),
                status: status.code().unwrap_or(-1),
            }
            .fail()
        }
    }

    fn create_command(&self, export_path: &Path) -> Command {
        let mut cmd = Command::new(&self.tool.program);
        cmd.args(&self.tool.args);
        cmd.arg(IMPORT_FLAG);
        cmd.arg(export_path);
        cmd
    }
}

/// Writes the ncdu export to `path` instead of opening a viewer.
pub fn write_export(tree: &FileTree, path: &Path) -> Result<(), ViewerError> {
    let file = File::create(path).context(CreateOutputSnafu {
        file_path: path.to_path_buf(),
    })?;
    write_ncdu_document(tree, BufWriter::new(file)).context(WriteExportSnafu {
        file_path: path.to_path_buf(),
    })?;
    info!("Wrote ncdu export to {}", path.display());
    Ok(())
}

#[derive(Debug, Snafu)]
pub enum ViewerError {
    #[snafu(display("Failed to create a temporary export file"))]
    TempFileError { source: std::io::Error },
    #[snafu(display("Failed to create output file {}", file_path.display()))]
    CreateOutputError {
        file_path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to write the ncdu export to {}", file_path.display()))]
    WriteExportError {
        file_path: PathBuf,
        source: ExportError,
    },
    #[snafu(display("Failed to spawn '{}'", command))]
    SpawnError {
        command: String,
        source: std::io::Error,
    },
    #[snafu(display("Failed to wait for '{}'", command))]
    WaitError {
        command: String,
        source: std::io::Error,
    },
    #[snafu(display("'{}' failed with exit code {}", command, status))]
    ViewerFailedError { command: String, status: i32 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::{AddressingMode, build};
    use tempfile::TempDir;

    fn sample_tree() -> FileTree {
        build(
            [
                r#"{"path": "data", "type": "d", "size": 0}"#,
                r#"{"path": "data/f", "type": "-", "size": 3}"#,
            ],
            AddressingMode::PerDataset,
        )
        .unwrap()
    }

    #[test]
    fn write_export_creates_document() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("export.json");

        write_export(&sample_tree(), &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents,
            r#"[1,1,{},[{"name":"/"},[{"name":"data"},{"name":"f","dsize":3}]]]"#
        );
    }

    #[test]
    fn write_export_into_missing_directory_fails() {
        let result = write_export(&sample_tree(), Path::new("/this/dir/does/not/exist/out.json"));
        assert!(matches!(result, Err(ViewerError::CreateOutputError { .. })));
    }

    #[cfg(unix)]
    #[compio::test]
    async fn viewer_receives_export_file() {
        // `sh -c <script> sh -f <path>`: succeed only if the export exists and mentions the entry
        let tool = ToolCommand::new("sh").with_args([
            "-c",
            r#"[ "$1" = "-f" ] && grep -q '"name":"data"' "$2""#,
            "sh",
        ]);

        let result = NcduViewer::new(&tool).show(&sample_tree()).await;
        assert!(result.is_ok(), "{result:?}");
    }

    #[cfg(unix)]
    #[compio::test]
    async fn viewer_failure_is_reported() {
        let tool = ToolCommand::new("sh").with_args(["-c", "exit 4", "sh"]);

        let result = NcduViewer::new(&tool).show(&sample_tree()).await;
        match result {
            Err(ViewerError::ViewerFailedError { command, status }) => {
                assert_eq!(command, "sh");
                assert_eq!(status, 4);
            }
            other => panic!("Expected ViewerFailedError, got {other:?}"),
        }
    }
}
