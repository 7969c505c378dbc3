//! Tidings Core - Core library for changelog rendering
//!
//! This crate provides the configuration model, configuration loading and
//! validation, and the error types shared by the tidings crates.

pub mod config;
pub mod error;

pub use config::{ChangelogConfig, CommitParserConfig, Config, GitConfig, LinkParserConfig, SortOrder};
pub use error::{ChangelogError, ConfigError, Result, TemplateError, TidingsError};
