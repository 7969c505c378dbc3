//! Exit codes for the CLI

use tidings_core::{ChangelogError, ConfigError, TemplateError, TidingsError};

/// General error
pub const ERROR: i32 = 1;

/// Configuration error
pub const CONFIG_ERROR: i32 = 2;

/// Template error
pub const TEMPLATE_ERROR: i32 = 3;

/// Commit input error
pub const INPUT_ERROR: i32 = 4;

/// Pick the exit code for a failed command
pub fn for_error(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(err) = cause.downcast_ref::<TidingsError>() {
            return match err {
                TidingsError::Config(_) => CONFIG_ERROR,
                TidingsError::Template(_) => TEMPLATE_ERROR,
                TidingsError::Changelog(ChangelogError::WriteFailed { .. }) => ERROR,
                TidingsError::Changelog(_) | TidingsError::Json(_) => INPUT_ERROR,
                TidingsError::Io(_) => ERROR,
            };
        }
        if cause.is::<ConfigError>() {
            return CONFIG_ERROR;
        }
        if cause.is::<TemplateError>() {
            return TEMPLATE_ERROR;
        }
        if cause.is::<ChangelogError>() || cause.is::<serde_json::Error>() {
            return INPUT_ERROR;
        }
    }
    ERROR
}
