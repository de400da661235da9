use thiserror::Error;

pub mod version;

pub use version::{parse_version, ParseOutcome, SemanticVersion};

#[derive(Error, Debug)]
pub enum CompatError {
    #[error("Unable to parse version: {0}")]
    UnparsableVersion(String),

    #[error("Invalid rule set: {0}")]
    InvalidRuleSet(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("Tool execution failed for '{tool}': {message}")]
    ToolError { tool: String, message: String },

    #[error("MCP communication error: {0}")]
    McpError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CompatError>;
