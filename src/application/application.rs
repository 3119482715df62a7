use snafu::Snafu;
use snafu::prelude::*;
use tracing::{debug, info};

use crate::application::RuntimeConfig;
use crate::config::{ToolsConfig, ToolsConfigCreationError};
use crate::console::status;
use crate::filesystem::FileTree;
use crate::listing::{
    BorgListing, BorgListingError, DumpListing, DumpListingError, ListingSource,
    ListingSourceError,
};
use crate::viewer::{NcduViewer, ViewerError, write_export};

pub struct Application;

impl Application {
    pub async fn run(app_config: impl Into<RuntimeConfig>) -> Result<(), ApplicationError> {
        let app_config: RuntimeConfig = app_config.into();
        let tools = ToolsConfig::read(app_config.config_path.as_deref())
            .await
            .context(ToolsConfigSnafu)?;
        debug!("Loaded tools config: {:?}", tools);

        let source = ListingSource::detect(&app_config.source).context(SourceSnafu)?;
        info!("Reading listing from {} in {} mode", source, app_config.mode);

        let tree = Self::build_tree(&source, &tools, &app_config).await?;
        info!(
            "Tree has {} entries in {} roots",
            tree.len(),
            tree.roots().len()
        );

        status("Generating ncdu tree...");
        match &app_config.output {
            Some(path) => write_export(&tree, path).context(PresentationSnafu)?,
            None => NcduViewer::new(&tools.ncdu)
                .show(&tree)
                .await
                .context(PresentationSnafu)?,
        }

        Ok(())
    }

    async fn build_tree(
        source: &ListingSource,
        tools: &ToolsConfig,
        app_config: &RuntimeConfig,
    ) -> Result<FileTree, ApplicationError> {
        match source {
            ListingSource::Archive(archive) => {
                status("Dumping and processing archive...");
                BorgListing::new(&tools.borg, archive.as_str())
                    .build_tree(app_config.mode)
                    .await
                    .context(ArchiveListingSnafu)
            }
            ListingSource::Dump(path) => DumpListing::new(path)
                .build_tree(app_config.mode)
                .await
                .context(DumpFileSnafu),
        }
    }
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Critical failure encountered while reading the tools config"))]
    ToolsConfigError { source: ToolsConfigCreationError },
    #[snafu(display("Critical failure encountered while choosing the listing source"))]
    SourceError { source: ListingSourceError },
    #[snafu(display("Critical failure encountered while listing the archive"))]
    ArchiveListingError { source: BorgListingError },
    #[snafu(display("Critical failure encountered while reading the listing file"))]
    DumpFileError { source: DumpListingError },
    #[snafu(display("Critical failure encountered while presenting the tree"))]
    PresentationError { source: ViewerError },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::AddressingMode;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[compio::test]
    async fn writes_export_for_dump_file() {
        let mut dump = NamedTempFile::new().expect("Failed to create temp file");
        writeln!(dump, r#"{{"path": ".", "type": "d", "size": 0}}"#).unwrap();
        writeln!(dump, r#"{{"path": "x/y/z.txt", "type": "-", "size": 5}}"#).unwrap();
        let out_dir = TempDir::new().expect("Failed to create temp directory");
        let output = out_dir.path().join("tree.json");

        Application::run(RuntimeConfig {
            source: dump.path().to_string_lossy().into_owned(),
            mode: AddressingMode::FullPath,
            config_path: None,
            output: Some(output.clone()),
        })
        .await
        .unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!([1, 1, {}, [
                {"name": "/"},
                [{"name": "x"}, [{"name": "y"}, {"name": "z.txt", "dsize": 5}]]
            ]])
        );
    }

    #[compio::test]
    async fn malformed_dump_produces_no_output() {
        let mut dump = NamedTempFile::new().expect("Failed to create temp file");
        writeln!(dump, "{{ not json").unwrap();
        let out_dir = TempDir::new().expect("Failed to create temp directory");
        let output = out_dir.path().join("tree.json");

        let result = Application::run(RuntimeConfig {
            source: dump.path().to_string_lossy().into_owned(),
            mode: AddressingMode::PerDataset,
            config_path: None,
            output: Some(output.clone()),
        })
        .await;

        assert!(matches!(result, Err(ApplicationError::DumpFileError { .. })));
        assert!(!output.exists());
    }

    #[compio::test]
    async fn unknown_source_is_an_error() {
        let result = Application::run(RuntimeConfig {
            source: "/this/path/does/not/exist".into(),
            mode: AddressingMode::PerDataset,
            config_path: None,
            output: None,
        })
        .await;

        assert!(matches!(result, Err(ApplicationError::SourceError { .. })));
    }
}
