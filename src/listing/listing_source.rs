use std::path::{Path, PathBuf};

use derive_more::Display;
use snafu::Snafu;

const ARCHIVE_SEPARATOR: &str = "::";

/// Where the listing for this run comes from.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum ListingSource {
    /// A `repository::archive` reference handed to `borg list`.
    #[display("archive '{_0}'")]
    Archive(String),
    /// A file holding previously saved `--json-lines` output.
    #[display("dump '{}'", _0.display())]
    Dump(PathBuf),
}

impl ListingSource {
    /// Archive references win over existing paths, as a repository path may
    /// well exist on disk.
    pub fn detect(argument: &str) -> Result<Self, ListingSourceError> {
        if argument.contains(ARCHIVE_SEPARATOR) {
            return Ok(ListingSource::Archive(argument.to_string()));
        }

        let path = Path::new(argument);
        if path.exists() {
            Ok(ListingSource::Dump(path.to_path_buf()))
        } else {
            UnknownSourceSnafu { argument }.fail()
        }
    }
}

#[derive(Debug, Snafu)]
pub enum ListingSourceError {
    #[snafu(display(
        "'{}' is neither a borg archive (repository::archive) nor an existing file",
        argument
    ))]
    UnknownSourceError { argument: String },
}
