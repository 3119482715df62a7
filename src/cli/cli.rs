use std::path::PathBuf;

use clap::Parser;

use crate::application::data::LogLevel;

/// Browse the contents of a borg archive in ncdu.
#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub struct Cli {
    /// A borg archive (`repository::archive`) or a file with saved `borg list --json-lines` output
    pub source: String,

    /// Merge all paths into one filesystem tree instead of one tree per dataset
    #[clap(long)]
    pub full_path: bool,

    #[clap(long, short, default_value = "warn", value_enum)]
    pub log_level: LogLevel,

    /// YAML file overriding the borg and ncdu commands
    #[clap(long, short)]
    pub config: Option<PathBuf>,

    /// Write the ncdu export to this file instead of opening ncdu
    #[clap(long, short)]
    pub output: Option<PathBuf>,
}
