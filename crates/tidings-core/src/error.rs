//! Error types for tidings

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using TidingsError
pub type Result<T> = std::result::Result<T, TidingsError>;

/// Main error type for tidings operations
#[derive(Debug, Error)]
pub enum TidingsError {
    /// Configuration-related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Template-related errors
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Changelog-related errors
    #[error(transparent)]
    Changelog(#[from] ChangelogError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found at {0}")]
    NotFound(PathBuf),

    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {message}")]
    InvalidValue { field: String, message: String },

    /// A configured pattern is not a valid regular expression
    #[error("Invalid regex in {field}: {source}")]
    InvalidRegex {
        field: String,
        #[source]
        source: regex::Error,
    },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// IO error
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),
}

/// Template-related errors
#[derive(Debug, Error)]
pub enum TemplateError {
    /// The template source could not be parsed
    #[error("Template syntax error in {template} template: {message} near `{fragment}`")]
    Syntax {
        template: String,
        message: String,
        fragment: String,
    },

    /// Evaluation failed while rendering
    #[error("Failed to render {template} template: {message}")]
    Render { template: String, message: String },
}

/// Changelog-related errors
#[derive(Debug, Error)]
pub enum ChangelogError {
    /// Commit input could not be read
    #[error("Invalid commit input: {0}")]
    InvalidInput(String),

    /// Commit parents form a cycle, so no ancestry order exists
    #[error("Commit graph contains a cycle involving {0}")]
    CyclicHistory(String),

    /// Failed to write changelog
    #[error("Failed to write changelog to {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TemplateError {
    /// Build a syntax error, clipping the offending fragment to a readable length
    pub fn syntax(
        template: impl Into<String>,
        message: impl Into<String>,
        fragment: &str,
    ) -> Self {
        let fragment: String = fragment.chars().take(40).collect();
        Self::Syntax {
            template: template.into(),
            message: message.into(),
            fragment,
        }
    }

    /// Build a render error
    pub fn render(template: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Render {
            template: template.into(),
            message: message.into(),
        }
    }
}
