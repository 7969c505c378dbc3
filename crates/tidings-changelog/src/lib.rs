//! Tidings Changelog - Template-driven changelog rendering
//!
//! This crate turns commit records into releases, classifies and groups
//! their commits, and renders the result through configurable templates.

pub mod generator;
pub mod parser;
pub mod release;
pub mod template;
pub mod types;

pub use generator::{ChangelogGenerator, GenerateOptions, ReleaseSelection};
pub use parser::{CommitParser, ConfiguredParser, ConventionalParser};
pub use template::Template;
pub use types::{Commit, GroupSection, Link, ProcessedCommit, Release, ScopeSection};
