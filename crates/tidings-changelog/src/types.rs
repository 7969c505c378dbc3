//! Changelog types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A commit record as produced by a version-control log reader
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commit {
    /// Full commit id
    pub id: String,
    /// Full commit message; the first line is the subject
    pub message: String,
    /// Scope attributed by the log reader
    #[serde(default)]
    pub scope: Option<String>,
    /// Explicitly marked as breaking
    #[serde(default)]
    pub breaking: bool,
    /// Commit timestamp
    pub timestamp: DateTime<Utc>,
    /// Author name
    #[serde(default)]
    pub author: Option<String>,
    /// Parent commit ids
    #[serde(default)]
    pub parents: Vec<String>,
    /// Version tag pointing at this commit
    #[serde(default)]
    pub tag: Option<String>,
}

impl Commit {
    /// Create a new commit record
    pub fn new(id: impl Into<String>, message: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            message: message.into(),
            scope: None,
            breaking: false,
            timestamp,
            author: None,
            parents: Vec::new(),
            tag: None,
        }
    }

    /// Set the scope
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Mark as breaking
    pub fn breaking(mut self) -> Self {
        self.breaking = true;
        self
    }

    /// Set the parent ids
    pub fn with_parents<I, S>(mut self, parents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parents = parents.into_iter().map(Into::into).collect();
        self
    }

    /// Set the version tag
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// First line of the message
    pub fn subject(&self) -> &str {
        self.message.lines().next().unwrap_or_default().trim()
    }

    /// Message after the subject line, if any
    pub fn body(&self) -> Option<&str> {
        self.message
            .split_once('\n')
            .map(|(_, body)| body.trim())
            .filter(|body| !body.is_empty())
    }

    /// First 7 characters of the id
    pub fn short_id(&self) -> String {
        self.id.chars().take(7).collect()
    }
}

/// A link extracted from a commit message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Link text
    pub text: String,
    /// Link target
    pub href: String,
}

/// A commit after parsing and classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedCommit {
    /// Full commit id
    pub id: String,
    /// First 7 characters of the id
    pub short_id: String,
    /// Description (conventional) or subject line, with links rewritten
    pub message: String,
    /// Message body
    pub body: Option<String>,
    /// Message as received
    pub raw_message: String,
    /// Conventional commit type
    pub commit_type: Option<String>,
    /// Scope: explicit, from the message, or the matching rule's default
    pub scope: Option<String>,
    /// Group label of the first matching rule
    pub group: Option<String>,
    /// Whether this is a breaking change
    pub breaking: bool,
    /// Whether the message follows the conventional format
    pub conventional: bool,
    /// Links found in the message
    pub links: Vec<Link>,
    /// Author name
    pub author: Option<String>,
    /// Commit timestamp
    pub timestamp: DateTime<Utc>,
}

/// Commits sharing a classification group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSection {
    /// Group label; `None` for unclassified commits
    pub name: Option<String>,
    /// Commits in this group
    pub commits: Vec<ProcessedCommit>,
}

/// Commits sharing a scope, partitioned by group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopeSection {
    /// Scope name; `None` for commits without any scope
    pub name: Option<String>,
    /// Groups in first-seen order
    pub groups: Vec<GroupSection>,
}

impl ScopeSection {
    /// Total commits across all groups
    pub fn commit_count(&self) -> usize {
        self.groups.iter().map(|g| g.commits.len()).sum()
    }
}

/// Partition commits by scope, then by group, keeping first-seen key order
pub fn group_commits(commits: &[ProcessedCommit]) -> Vec<ScopeSection> {
    let mut scopes: Vec<ScopeSection> = Vec::new();

    for commit in commits {
        let scope_idx = match scopes.iter().position(|s| s.name == commit.scope) {
            Some(idx) => idx,
            None => {
                scopes.push(ScopeSection {
                    name: commit.scope.clone(),
                    groups: Vec::new(),
                });
                scopes.len() - 1
            }
        };
        let groups = &mut scopes[scope_idx].groups;

        match groups.iter_mut().find(|g| g.name == commit.group) {
            Some(group) => group.commits.push(commit.clone()),
            None => groups.push(GroupSection {
                name: commit.group.clone(),
                commits: vec![commit.clone()],
            }),
        }
    }

    scopes
}

/// One section of the changelog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Release {
    /// Version tag; `None` for unreleased changes
    pub version: Option<String>,
    /// Release timestamp
    pub timestamp: Option<DateTime<Utc>>,
    /// Version of the preceding release
    pub previous: Option<String>,
    /// Commits, sorted per configuration
    pub commits: Vec<ProcessedCommit>,
    /// Commits grouped by scope, then group
    pub scopes: Vec<ScopeSection>,
}

impl Release {
    /// Build a release and its grouping
    pub fn new(
        version: Option<String>,
        timestamp: Option<DateTime<Utc>>,
        commits: Vec<ProcessedCommit>,
    ) -> Self {
        let scopes = group_commits(&commits);
        Self {
            version,
            timestamp,
            previous: None,
            commits,
            scopes,
        }
    }

    /// Whether this is the unreleased section
    pub fn is_unreleased(&self) -> bool {
        self.version.is_none()
    }

    /// Check if release has any commits
    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }
}
