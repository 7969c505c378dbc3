//! Conventional Commits parser
//!
//! Parses messages following the Conventional Commits specification:
//! https://www.conventionalcommits.org/

use regex::Regex;
use std::sync::LazyLock;

/// Regex for parsing conventional commit subjects
static CONVENTIONAL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<type>[a-zA-Z]+)(?:\((?P<scope>[^)]+)\))?(?P<breaking>!)?: (?P<description>.+)$",
    )
    .expect("Invalid regex")
});

/// Regex for parsing footer lines
static FOOTER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<token>[A-Za-z-]+|BREAKING CHANGE): (?P<value>.+)$").expect("Invalid regex")
});

/// A footer field from a conventional commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Footer {
    /// Footer token (e.g., "BREAKING CHANGE", "Fixes", "Refs")
    pub token: String,
    /// Footer value
    pub value: String,
}

impl Footer {
    /// Whether this footer announces a breaking change
    pub fn is_breaking(&self) -> bool {
        self.token.eq_ignore_ascii_case("BREAKING CHANGE")
            || self.token.eq_ignore_ascii_case("BREAKING-CHANGE")
    }
}

/// The structured parts of a conventional message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConventionalMessage {
    /// Commit type (feat, fix, etc.)
    pub commit_type: String,
    /// Scope in parentheses
    pub scope: Option<String>,
    /// `!` marker or breaking footer present
    pub breaking: bool,
    /// Text after the colon
    pub description: String,
    /// Body without footers
    pub body: Option<String>,
    /// Footer fields
    pub footers: Vec<Footer>,
}

/// Parser for the Conventional Commits format
#[derive(Debug, Clone, Copy, Default)]
pub struct ConventionalParser;

impl ConventionalParser {
    /// Create a new parser
    pub fn new() -> Self {
        Self
    }

    /// Parse a subject line and optional body
    pub fn parse_message(&self, subject: &str, body: Option<&str>) -> Option<ConventionalMessage> {
        let caps = CONVENTIONAL_REGEX.captures(subject.trim())?;

        let commit_type = caps.name("type")?.as_str().to_lowercase();
        let scope = caps.name("scope").map(|m| m.as_str().trim().to_string());
        let breaking_marker = caps.name("breaking").is_some();
        let description = caps.name("description")?.as_str().trim().to_string();

        let (body, footers) = match body {
            Some(body) => split_footers(body),
            None => (None, Vec::new()),
        };
        let breaking_in_footer = footers.iter().any(Footer::is_breaking);

        Some(ConventionalMessage {
            commit_type,
            scope,
            breaking: breaking_marker || breaking_in_footer,
            description,
            body,
            footers,
        })
    }
}

/// Split a body into free text and the trailing footer block.
///
/// Only the last paragraph can hold footers, and only when it opens with a
/// `Token: value` line. Later lines that are not footers continue the
/// previous footer's value.
fn split_footers(body: &str) -> (Option<String>, Vec<Footer>) {
    let lines: Vec<&str> = body.trim_end().lines().collect();
    let last_paragraph = lines
        .iter()
        .rposition(|line| line.trim().is_empty())
        .map_or(0, |blank| blank + 1);
    let start = match lines.get(last_paragraph) {
        Some(line) if FOOTER_REGEX.is_match(line) => last_paragraph,
        _ => lines.len(),
    };

    let mut footers: Vec<Footer> = Vec::new();
    for line in &lines[start..] {
        if let Some(caps) = FOOTER_REGEX.captures(line) {
            footers.push(Footer {
                token: caps["token"].to_string(),
                value: caps["value"].trim().to_string(),
            });
            continue;
        }
        let text = line.trim();
        if let Some(last) = footers.last_mut() {
            last.value.push('\n');
            last.value.push_str(text);
        }
    }

    let text = lines[..start].join("\n").trim().to_string();
    ((!text.is_empty()).then_some(text), footers)
}
