//! Configuration types

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::defaults::{
    default_commit_parsers, default_link_parsers, DEFAULT_BODY, DEFAULT_FOOTER, DEFAULT_HEADER,
};

/// Main configuration for tidings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Rendering configuration
    pub changelog: ChangelogConfig,

    /// Commit processing configuration
    pub git: GitConfig,
}

/// Changelog rendering configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangelogConfig {
    /// Template rendered once at the top of the document
    pub header: String,

    /// Template rendered once per release
    pub body: String,

    /// Template rendered once at the bottom of the document
    pub footer: String,

    /// Strip leading/trailing whitespace from every template line and
    /// from every rendered release
    pub trim: bool,

    /// Free-form values exposed to templates as `extra`
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Default for ChangelogConfig {
    fn default() -> Self {
        Self {
            header: DEFAULT_HEADER.to_string(),
            body: DEFAULT_BODY.to_string(),
            footer: DEFAULT_FOOTER.to_string(),
            trim: true,
            extra: BTreeMap::new(),
        }
    }
}

/// Commit processing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    /// Parse messages as `type(scope)!: description`
    pub conventional_commits: bool,

    /// Drop commits that are not conventional or match no commit parser
    pub filter_unconventional: bool,

    /// Treat every line of a commit message as a separate commit
    pub split_commits: bool,

    /// Ordered classification rules; the first match wins
    pub commit_parsers: Vec<CommitParserConfig>,

    /// Keep breaking commits even when a skipping rule matches them
    pub protect_breaking_commits: bool,

    /// Commit order inside a release
    pub sort_commits: SortOrder,

    /// Order commits by ancestry instead of timestamp
    pub topo_order: bool,

    /// Ordered rules rewriting message substrings into links
    pub link_parsers: Vec<LinkParserConfig>,

    /// Tags matching this pattern do not start a new release
    pub ignore_tags: Option<String>,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            conventional_commits: true,
            filter_unconventional: false,
            split_commits: false,
            commit_parsers: default_commit_parsers(),
            protect_breaking_commits: false,
            sort_commits: SortOrder::Oldest,
            topo_order: false,
            link_parsers: default_link_parsers(),
            ignore_tags: None,
        }
    }
}

/// A single commit classification rule
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitParserConfig {
    /// Pattern tested against the commit subject
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Pattern tested against the commit body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    /// Group label assigned on match
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,

    /// Scope assigned when the commit carries none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_scope: Option<String>,

    /// Drop matching commits
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub skip: bool,
}

impl CommitParserConfig {
    /// Create a rule matching `message` and assigning `group`
    pub fn new(message: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            group: Some(group.into()),
            ..Default::default()
        }
    }

    /// Set the default scope
    pub fn with_default_scope(mut self, scope: impl Into<String>) -> Self {
        self.default_scope = Some(scope.into());
        self
    }

    /// Mark the rule as skipping
    pub fn skipping(mut self) -> Self {
        self.skip = true;
        self
    }
}

/// A link rewriting rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkParserConfig {
    /// Pattern matched against the commit message
    pub pattern: String,

    /// Link target, may reference capture groups (`$1`, `${name}`)
    pub href: String,

    /// Link text, defaults to the matched substring
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl LinkParserConfig {
    /// Create a link rule
    pub fn new(pattern: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            href: href.into(),
            text: None,
        }
    }
}

/// Commit ordering applied inside a release
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Oldest commit first
    #[default]
    Oldest,
    /// Newest commit first
    Newest,
}
