//! Configuration validation

use regex::Regex;
use tracing::debug;

use crate::error::{ConfigError, Result};

use super::types::Config;

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    debug!("validating configuration");
    validate_changelog(config)?;
    validate_commit_parsers(config)?;
    validate_link_parsers(config)?;
    validate_tags(config)?;
    debug!("configuration validation passed");
    Ok(())
}

/// Compile a configured pattern, naming the field on failure
pub fn compile_pattern(field: impl Into<String>, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| {
        ConfigError::InvalidRegex {
            field: field.into(),
            source,
        }
        .into()
    })
}

fn validate_changelog(config: &Config) -> Result<()> {
    if config.changelog.body.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "changelog.body".to_string(),
            message: "body template cannot be empty".to_string(),
        }
        .into());
    }

    Ok(())
}

fn validate_commit_parsers(config: &Config) -> Result<()> {
    for (i, parser) in config.git.commit_parsers.iter().enumerate() {
        if parser.message.is_none() && parser.body.is_none() {
            return Err(ConfigError::InvalidValue {
                field: format!("git.commit_parsers[{}]", i),
                message: "must declare a message or body pattern".to_string(),
            }
            .into());
        }

        if let Some(message) = &parser.message {
            compile_pattern(format!("git.commit_parsers[{}].message", i), message)?;
        }
        if let Some(body) = &parser.body {
            compile_pattern(format!("git.commit_parsers[{}].body", i), body)?;
        }
    }

    Ok(())
}

fn validate_link_parsers(config: &Config) -> Result<()> {
    for (i, parser) in config.git.link_parsers.iter().enumerate() {
        compile_pattern(format!("git.link_parsers[{}].pattern", i), &parser.pattern)?;

        if parser.href.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: format!("git.link_parsers[{}].href", i),
                message: "href cannot be empty".to_string(),
            }
            .into());
        }
    }

    Ok(())
}

fn validate_tags(config: &Config) -> Result<()> {
    if let Some(pattern) = config.git.ignore_tags.as_deref().filter(|p| !p.is_empty()) {
        compile_pattern("git.ignore_tags", pattern)?;
    }

    Ok(())
}
