use std::pin::pin;
use std::process::Stdio;

use compio::io::compat::AsyncStream;
use compio::process::{Child, ChildStdout, Command};
use futures::future::{Either, select};
use futures::{AsyncBufReadExt, StreamExt, io::BufReader};
use snafu::{ResultExt, Snafu};
use tracing::{debug, info, warn};

use crate::config::ToolCommand;
use crate::console::Progress;
use crate::filesystem::{AddressingMode, BuildError, FileTree, TreeBuilder};

const LIST_ARGS: [&str; 2] = ["list", "--json-lines"];

/// Streams `borg list --json-lines <archive>` into a tree builder.
pub struct BorgListing<'a> {
    tool: &'a ToolCommand,
    archive: String,
}

impl<'a> BorgListing<'a> {
    pub fn new(tool: &'a ToolCommand, archive: impl Into<String>) -> Self {
        Self {
            tool,
            archive: archive.into(),
        }
    }

    /// Runs borg and builds the tree from its output as it arrives.
    ///
    /// Borg is killed when the user interrupts the run or a line cannot be
    /// used. Its exit status is only checked once all output has been read.
    pub async fn build_tree(&self, mode: AddressingMode) -> Result<FileTree, BorgListingError> {
        let mut child = self.create_command().spawn().context(SpawnSnafu {
            command: self.tool.program.clone(),
        })?;
        debug!("Spawned '{}' for archive '{}'", self.tool.program, self.archive);

        let Some(stdout) = child.stdout.take() else {
            terminate(child).await;
            return MissingStdoutSnafu {
                command: self.tool.program.clone(),
            }
            .fail();
        };

        let mut builder = TreeBuilder::new(mode);
        let outcome = {
            let feeding = pin!(feed_builder(stdout, &mut builder));
            let interrupted = pin!(compio::signal::ctrl_c());
            match select(feeding, interrupted).await {
                Either::Left((result, _)) => result,
                Either::Right((Ok(()), _)) => Err(BorgListingError::InterruptedError),
                Either::Right((Err(source), _)) => Err(BorgListingError::SignalError { source }),
            }
        };

        if let Err(error) = outcome {
            warn!("Stopping '{}': {}", self.tool.program, error);
            terminate(child).await;
            return Err(error);
        }

        let status = child.wait().await.context(WaitSnafu {
            command: self.tool.program.clone(),
        })?;
        if !status.success() {
            return ListingFailedSnafu {
                archive: self.archive.clone(),
                status: status.code().unwrap_or(-1),
            }
            .fail();
        }

        info!(
            "Listed archive '{}' ({} lines)",
            self.archive,
            builder.lines_processed()
        );
        Ok(builder.finish())
    }

    /// Stdin and stderr stay attached to the terminal so borg can ask for a passphrase.
    fn create_command(&self) -> Command {
        let mut cmd = Command::new(&self.tool.program);
        cmd.args(&self.tool.args);
        cmd.args(LIST_ARGS);
        cmd.arg(&self.archive);
        let _ = cmd.stdout(Stdio::piped());
        cmd
    }
}

async fn feed_builder(stdout: ChildStdout, builder: &mut TreeBuilder) -> Result<(), BorgListingError> {
    let reader = BufReader::new(AsyncStream::new(stdout));
    let mut lines = reader.lines();
    let mut progress = Progress::new(None);

    while let Some(line_result) = lines.next().await {
        let line = line_result.context(ReadOutputSnafu)?;
        builder.process_line(&line).context(TreeBuildSnafu)?;
        progress.tick();
    }

    Ok(())
}

/// Kills the listing process and reaps it.
async fn terminate(mut child: Child) {
    if let Err(e) = child.kill() {
        debug!("Failed to kill listing process: {}", e);
    }
    match child.wait().await {
        Ok(status) => debug!("Listing process stopped: {}", status),
        Err(e) => warn!("Failed to wait for the killed listing process: {}", e),
    }
}

#[derive(Debug, Snafu)]
pub enum BorgListingError {
    #[snafu(display("Failed to spawn '{}'", command))]
    SpawnError {
        command: String,
        source: std::io::Error,
    },
    #[snafu(display("'{}' was started without a readable stdout", command))]
    MissingStdoutError { command: String },
    #[snafu(display("Failed to read the archive listing"))]
    ReadOutputError { source: std::io::Error },
    #[snafu(display("Failed to build the tree from the archive listing"))]
    TreeBuildError { source: BuildError },
    #[snafu(display("Interrupted by user"))]
    InterruptedError,
    #[snafu(display("Failed to listen for interrupts"))]
    SignalError { source: std::io::Error },
    #[snafu(display("Failed to wait for '{}'", command))]
    WaitError {
        command: String,
        source: std::io::Error,
    },
    #[snafu(display("Listing archive '{}' failed with exit code {}", archive, status))]
    ListingFailedError { archive: String, status: i32 },
}
