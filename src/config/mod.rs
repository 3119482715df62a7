mod tools_config;

pub use tools_config::{ToolCommand, ToolsConfig, ToolsConfigCreationError};
