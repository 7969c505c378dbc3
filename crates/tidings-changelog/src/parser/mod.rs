//! Commit parsing and classification

mod conventional;
mod links;
mod rules;

pub use conventional::{ConventionalMessage, ConventionalParser, Footer};
pub use links::LinkRewriter;
pub use rules::{ParserRule, RuleSet};

use tidings_core::config::GitConfig;
use tidings_core::Result;
use tracing::{debug, trace};

use crate::types::{Commit, ProcessedCommit};

/// Trait for commit parsers
pub trait CommitParser: Send + Sync {
    /// Parse a commit into a structured format; `None` drops it
    fn parse(&self, commit: &Commit) -> Option<ProcessedCommit>;

    /// Check if a commit should be included in the changelog
    fn should_include(&self, commit: &ProcessedCommit) -> bool;
}

/// Parser driven by the `[git]` configuration section
#[derive(Debug, Clone)]
pub struct ConfiguredParser {
    conventional: Option<ConventionalParser>,
    rules: RuleSet,
    links: LinkRewriter,
    filter_unconventional: bool,
    protect_breaking_commits: bool,
}

impl ConfiguredParser {
    /// Compile all patterns from configuration
    pub fn from_config(config: &GitConfig) -> Result<Self> {
        let parser = Self {
            conventional: config.conventional_commits.then(ConventionalParser::new),
            rules: RuleSet::compile(&config.commit_parsers)?,
            links: LinkRewriter::compile(&config.link_parsers)?,
            filter_unconventional: config.filter_unconventional,
            protect_breaking_commits: config.protect_breaking_commits,
        };
        debug!(
            rules = parser.rules.len(),
            conventional = parser.conventional.is_some(),
            "commit parser compiled"
        );
        Ok(parser)
    }
}

impl CommitParser for ConfiguredParser {
    fn parse(&self, commit: &Commit) -> Option<ProcessedCommit> {
        let subject = commit.subject();
        let body = commit.body();

        let parsed = self
            .conventional
            .as_ref()
            .and_then(|p| p.parse_message(subject, body));

        let (message, commit_type, message_scope, marked_breaking, body_text) = match parsed {
            Some(conv) => (
                conv.description,
                Some(conv.commit_type),
                conv.scope,
                conv.breaking,
                conv.body,
            ),
            None => (
                subject.to_string(),
                None,
                None,
                false,
                body.map(String::from),
            ),
        };
        let conventional = commit_type.is_some();
        let breaking = commit.breaking || marked_breaking;
        let mut scope = commit.scope.clone().or(message_scope);

        let rule = self.rules.first_match(subject, body);
        if let Some(rule) = rule {
            if rule.skip && !(breaking && self.protect_breaking_commits) {
                trace!(id = %commit.id, "commit skipped by parser rule");
                return None;
            }
            if scope.is_none() {
                scope = rule.default_scope.clone();
            }
        }

        let (message, links) = self.links.rewrite(&message);

        Some(ProcessedCommit {
            id: commit.id.clone(),
            short_id: commit.short_id(),
            message,
            body: body_text,
            raw_message: commit.message.clone(),
            commit_type,
            scope,
            group: rule.and_then(|r| r.group.clone()),
            breaking,
            conventional,
            links,
            author: commit.author.clone(),
            timestamp: commit.timestamp,
        })
    }

    fn should_include(&self, commit: &ProcessedCommit) -> bool {
        if !self.filter_unconventional {
            return true;
        }
        if commit.breaking && self.protect_breaking_commits {
            return true;
        }

        let conventional_ok = self.conventional.is_none() || commit.conventional;
        conventional_ok && commit.group.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::test_support::at;
    use tidings_core::config::CommitParserConfig;

    fn parser(config: GitConfig) -> ConfiguredParser {
        ConfiguredParser::from_config(&config).unwrap()
    }

    fn commit(message: &str) -> Commit {
        Commit::new("abc123def4567890", message, at(1))
    }

    #[test]
    fn test_classifies_with_default_scope() {
        let p = parser(GitConfig::default());
        let parsed = p.parse(&commit("fix: handle timeout")).unwrap();

        assert_eq!(parsed.message, "handle timeout");
        assert_eq!(parsed.group.as_deref(), Some("🐞 Bug Fixes"));
        assert_eq!(parsed.scope.as_deref(), Some("global changes"));
        assert_eq!(parsed.commit_type.as_deref(), Some("fix"));
        assert_eq!(parsed.short_id, "abc123d");
        assert!(parsed.conventional);
    }

    #[test]
    fn test_message_scope_beats_default_scope() {
        let p = parser(GitConfig::default());
        let parsed = p.parse(&commit("feat(cli): add flag")).unwrap();
        assert_eq!(parsed.scope.as_deref(), Some("cli"));
    }

    #[test]
    fn test_record_scope_beats_message_scope() {
        let p = parser(GitConfig::default());
        let parsed = p
            .parse(&commit("feat(cli): add flag").with_scope("frontend"))
            .unwrap();
        assert_eq!(parsed.scope.as_deref(), Some("frontend"));
    }

    #[test]
    fn test_breaking_from_marker_and_record() {
        let p = parser(GitConfig::default());
        assert!(p.parse(&commit("feat!: drop api")).unwrap().breaking);
        assert!(p.parse(&commit("feat: drop api").breaking()).unwrap().breaking);
    }

    #[test]
    fn test_unconventional_kept_unclassified() {
        let p = parser(GitConfig::default());
        let parsed = p.parse(&commit("Update README")).unwrap();

        assert!(!parsed.conventional);
        assert!(parsed.group.is_none());
        assert_eq!(parsed.message, "Update README");
        assert!(p.should_include(&parsed));
    }

    #[test]
    fn test_filter_unconventional_drops_unmatched() {
        let p = parser(GitConfig {
            filter_unconventional: true,
            ..GitConfig::default()
        });

        let unmatched = p.parse(&commit("Update README")).unwrap();
        assert!(!p.should_include(&unmatched));

        let conventional_unmatched = p.parse(&commit("wip: half done")).unwrap();
        assert!(!p.should_include(&conventional_unmatched));

        let matched = p.parse(&commit("feat: thing")).unwrap();
        assert!(p.should_include(&matched));
    }

    #[test]
    fn test_filter_protects_breaking() {
        let p = parser(GitConfig {
            filter_unconventional: true,
            protect_breaking_commits: true,
            ..GitConfig::default()
        });
        let parsed = p.parse(&commit("Remove legacy endpoint").breaking()).unwrap();
        assert!(p.should_include(&parsed));
    }

    #[test]
    fn test_skip_rule() {
        let mut config = GitConfig::default();
        config
            .commit_parsers
            .insert(0, CommitParserConfig::new("^chore\\(release\\)", "Release").skipping());
        let p = parser(config);

        assert!(p.parse(&commit("chore(release): v1.0.0")).is_none());
        assert!(p.parse(&commit("chore(deps): bump")).is_some());
    }

    #[test]
    fn test_skip_rule_respects_protection() {
        let mut config = GitConfig {
            protect_breaking_commits: true,
            ..GitConfig::default()
        };
        config.commit_parsers = vec![CommitParserConfig::new("^refactor", "Refactor").skipping()];
        let p = parser(config);

        assert!(p.parse(&commit("refactor: tidy")).is_none());
        assert!(p.parse(&commit("refactor!: rename module")).is_some());
    }

    #[test]
    fn test_conventional_disabled() {
        let p = parser(GitConfig {
            conventional_commits: false,
            ..GitConfig::default()
        });
        let parsed = p.parse(&commit("fix: handle timeout")).unwrap();

        assert!(!parsed.conventional);
        assert_eq!(parsed.message, "fix: handle timeout");
        assert_eq!(parsed.group.as_deref(), Some("🐞 Bug Fixes"));
    }

    #[test]
    fn test_links_rewritten_in_message() {
        let p = parser(GitConfig::default());
        let parsed = p.parse(&commit("fix: close socket (#42)")).unwrap();

        assert_eq!(
            parsed.message,
            "close socket ([#42](https://github.com/example/project/issues/42))"
        );
        assert_eq!(parsed.links.len(), 1);
    }
}
