//! Link rewriting in commit messages

use regex::Regex;
use tidings_core::config::{compile_pattern, LinkParserConfig};
use tidings_core::Result;

use crate::types::Link;

#[derive(Debug, Clone)]
struct LinkRule {
    pattern: Regex,
    href: String,
    text: Option<String>,
}

/// Rewrites matching substrings into Markdown links
#[derive(Debug, Clone, Default)]
pub struct LinkRewriter {
    rules: Vec<LinkRule>,
}

impl LinkRewriter {
    /// Compile configured link rules
    pub fn compile(configs: &[LinkParserConfig]) -> Result<Self> {
        let rules = configs
            .iter()
            .enumerate()
            .map(|(i, config)| {
                Ok(LinkRule {
                    pattern: compile_pattern(
                        format!("git.link_parsers[{}].pattern", i),
                        &config.pattern,
                    )?,
                    href: config.href.clone(),
                    text: config.text.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// Rewrite `message`, returning the new text and the links found.
    ///
    /// Rules are applied in order against the original message; a match
    /// overlapping an earlier match is ignored.
    pub fn rewrite(&self, message: &str) -> (String, Vec<Link>) {
        let mut spans: Vec<(usize, usize, Link)> = Vec::new();

        for rule in &self.rules {
            for caps in rule.pattern.captures_iter(message) {
                let Some(whole) = caps.get(0) else { continue };
                if whole.is_empty() {
                    continue;
                }
                let overlaps = spans
                    .iter()
                    .any(|(start, end, _)| whole.start() < *end && *start < whole.end());
                if overlaps {
                    continue;
                }

                let mut href = String::new();
                caps.expand(&rule.href, &mut href);
                let text = match &rule.text {
                    Some(template) => {
                        let mut text = String::new();
                        caps.expand(template, &mut text);
                        text
                    }
                    None => whole.as_str().to_string(),
                };
                spans.push((whole.start(), whole.end(), Link { text, href }));
            }
        }

        if spans.is_empty() {
            return (message.to_string(), Vec::new());
        }
        spans.sort_by_key(|(start, _, _)| *start);

        let mut rewritten = String::with_capacity(message.len());
        let mut cursor = 0;
        let mut links = Vec::with_capacity(spans.len());
        for (start, end, link) in spans {
            rewritten.push_str(&message[cursor..start]);
            rewritten.push_str(&format!("[{}]({})", link.text, link.href));
            cursor = end;
            links.push(link);
        }
        rewritten.push_str(&message[cursor..]);

        (rewritten, links)
    }

    /// Check if there are no rules
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
