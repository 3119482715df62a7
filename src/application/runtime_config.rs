use std::path::PathBuf;

use crate::cli::Cli;
use crate::filesystem::AddressingMode;

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Archive reference or dump file path, as given on the command line
    pub source: String,
    pub mode: AddressingMode,
    pub config_path: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

impl From<Cli> for RuntimeConfig {
    fn from(cli: Cli) -> Self {
        let mode = if cli.full_path {
            AddressingMode::FullPath
        } else {
            AddressingMode::PerDataset
        };

        Self {
            source: cli.source,
            mode,
            config_path: cli.config,
            output: cli.output,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn defaults_to_per_dataset_mode() {
        let cli = Cli::parse_from(["borgdu", "repo::archive"]);
        let config = RuntimeConfig::from(cli);

        assert_eq!(config.source, "repo::archive");
        assert_eq!(config.mode, AddressingMode::PerDataset);
        assert!(config.config_path.is_none());
        assert!(config.output.is_none());
    }

    #[test]
    fn full_path_flag_selects_full_path_mode() {
        let cli = Cli::parse_from([
            "borgdu",
            "--full-path",
            "-c",
            "tools.yaml",
            "-o",
            "out.json",
            "listing.jsonl",
        ]);
        let config = RuntimeConfig::from(cli);

        assert_eq!(config.mode, AddressingMode::FullPath);
        assert_eq!(config.config_path, Some(PathBuf::from("tools.yaml")));
        assert_eq!(config.output, Some(PathBuf::from("out.json")));
    }
}
