//! Ordered commit classification rules

use regex::Regex;
use tidings_core::config::{compile_pattern, CommitParserConfig};
use tidings_core::Result;

/// A compiled classification rule
#[derive(Debug, Clone)]
pub struct ParserRule {
    message: Option<Regex>,
    body: Option<Regex>,
    /// Group label assigned on match
    pub group: Option<String>,
    /// Scope assigned to commits without one
    pub default_scope: Option<String>,
    /// Drop matching commits
    pub skip: bool,
}

impl ParserRule {
    /// Compile a configured rule; `index` names it in errors
    pub fn compile(index: usize, config: &CommitParserConfig) -> Result<Self> {
        let message = config
            .message
            .as_deref()
            .map(|p| compile_pattern(format!("git.commit_parsers[{}].message", index), p))
            .transpose()?;
        let body = config
            .body
            .as_deref()
            .map(|p| compile_pattern(format!("git.commit_parsers[{}].body", index), p))
            .transpose()?;

        Ok(Self {
            message,
            body,
            group: config.group.clone(),
            default_scope: config.default_scope.clone(),
            skip: config.skip,
        })
    }

    /// Every declared pattern must match; a rule without patterns never matches
    pub fn matches(&self, subject: &str, body: Option<&str>) -> bool {
        if self.message.is_none() && self.body.is_none() {
            return false;
        }
        let message_ok = self.message.as_ref().map_or(true, |re| re.is_match(subject));
        let body_ok = self
            .body
            .as_ref()
            .map_or(true, |re| re.is_match(body.unwrap_or_default()));
        message_ok && body_ok
    }
}

/// Ordered rule list where the first match wins
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<ParserRule>,
}

impl RuleSet {
    /// Compile rules in declaration order
    pub fn compile(configs: &[CommitParserConfig]) -> Result<Self> {
        let rules = configs
            .iter()
            .enumerate()
            .map(|(i, config)| ParserRule::compile(i, config))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// First rule matching the commit
    pub fn first_match(&self, subject: &str, body: Option<&str>) -> Option<&ParserRule> {
        self.rules.iter().find(|rule| rule.matches(subject, body))
    }

    /// Number of rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if there are no rules
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
