use compio::{fs::File, io::AsyncReadExt, io::BufReader};
use hashlink::LinkedHashMap;
use saphyr::{LoadableYamlNode, Scalar, Yaml};
use snafu::prelude::*;
use std::{borrow::Cow, io::Cursor, path::Path};
use tracing::debug;

const DEFAULT_BORG_COMMAND: &str = "borg";
const DEFAULT_NCDU_COMMAND: &str = "ncdu";
const BORG_SECTION: &str = "borg";
const NCDU_SECTION: &str = "ncdu";

/// An external program together with the arguments always passed to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    fn from_section(
        section: &str,
        data: &LinkedHashMap<Yaml, Yaml>,
        default_program: &str,
    ) -> Result<Self, ToolsConfigCreationError> {
        let program = match data.get(&key("command")) {
            Some(value) => value
                .as_str()
                .context(CommandNotStringSnafu { section })?
                .to_string(),
            None => default_program.to_string(),
        };

        let args = match data.get(&key("args")) {
            Some(value) => value
                .as_sequence()
                .context(ArgsNotSequenceSnafu { section })?
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
                .context(ArgsNotSequenceSnafu { section })?,
            None => Vec::new(),
        };

        Ok(Self::new(program).with_args(args))
    }
}

/// Programs used to list archives and to display the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolsConfig {
    pub borg: ToolCommand,
    pub ncdu: ToolCommand,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            borg: ToolCommand::new(DEFAULT_BORG_COMMAND),
            ncdu: ToolCommand::new(DEFAULT_NCDU_COMMAND),
        }
    }
}

fn key(name: &str) -> Yaml<'_> {
    Yaml::Value(Scalar::String(Cow::Borrowed(name)))
}

impl ToolsConfig {
    /// Reads the config file at `path`, or returns the defaults when no path is given.
    pub async fn read(path: Option<&Path>) -> Result<Self, ToolsConfigCreationError> {
        match path {
            Some(path) => Self::from_path(path).await,
            None => {
                debug!("No config file given, using default tools");
                Ok(Self::default())
            }
        }
    }

    pub async fn from_path(path: &Path) -> Result<Self, ToolsConfigCreationError> {
        debug!("Opening config file: {}", path.display());
        let file = File::open(path).await.context(ReadSnafu {
            file_path: path.display().to_string(),
        })?;

        let cursor = Cursor::new(file);
        let mut reader = BufReader::new(cursor);
        let res = reader.read_to_string(String::new()).await;
        match res.0 {
            Ok(n) => debug!("Successfully read config file: {n} bytes"),
            Err(source) => {
                return Err(ToolsConfigCreationError::ReadError {
                    file_path: path.display().to_string(),
                    source,
                });
            }
        }
        res.1.as_str().try_into()
    }

    fn section<'a, 'input>(
        top_level: &'a LinkedHashMap<Yaml<'input>, Yaml<'input>>,
        name: &'static str,
    ) -> Result<Option<&'a LinkedHashMap<Yaml<'input>, Yaml<'input>>>, ToolsConfigCreationError>
    {
        top_level
            .get(&key(name))
            .map(|value| value.as_mapping().context(SectionNotMapSnafu { section: name }))
            .transpose()
    }
}

impl TryFrom<&str> for ToolsConfig {
    type Error = ToolsConfigCreationError;

    fn try_from(contents: &str) -> Result<Self, Self::Error> {
        let contents_vec = Yaml::load_from_str(contents).context(ParseSnafu)?;
        let contents = contents_vec
            .first()
            .ok_or(ToolsConfigCreationError::MalformedConfig)?;

        let top_level = contents
            .as_mapping()
            .ok_or(ToolsConfigCreationError::TopLevelNotMap)?;

        let defaults = Self::default();
        let borg = match Self::section(top_level, BORG_SECTION)? {
            Some(data) => ToolCommand::from_section(BORG_SECTION, data, DEFAULT_BORG_COMMAND)?,
            None => defaults.borg,
        };
        let ncdu = match Self::section(top_level, NCDU_SECTION)? {
            Some(data) => ToolCommand::from_section(NCDU_SECTION, data, DEFAULT_NCDU_COMMAND)?,
            None => defaults.ncdu,
        };

        Ok(ToolsConfig { borg, ncdu })
    }
}

#[derive(Debug, Snafu)]
pub enum ToolsConfigCreationError {
    #[snafu(display("Failed to read the config file: {}", file_path))]
    ReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Failed to parse the config file"))]
    ParseError { source: saphyr::ScanError },
    #[snafu(display("Improperly formatted config file"))]
    MalformedConfig,
    #[snafu(display("Top level of config should be a map"))]
    TopLevelNotMap,
    #[snafu(display("Section '{}' should be a map", section))]
    SectionNotMap { section: String },
    #[snafu(display("'command' in section '{}' should be a string", section))]
    CommandNotString { section: String },
    #[snafu(display("'args' in section '{}' should be a list of strings", section))]
    ArgsNotSequence { section: String },
}
