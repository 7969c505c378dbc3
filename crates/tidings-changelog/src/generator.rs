//! Changelog generation

use regex::Regex;
use serde_json::{json, Value};
use tidings_core::config::{compile_pattern, Config, SortOrder};
use tidings_core::Result;
use tracing::{debug, info, instrument};

use crate::parser::{CommitParser, ConfiguredParser};
use crate::release::{order_commits, split_commit, split_releases, ReleaseSlice};
use crate::template::Template;
use crate::types::{Commit, ProcessedCommit, Release};

/// Which releases to emit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReleaseSelection {
    /// Every release
    #[default]
    All,
    /// Only the unreleased section
    Unreleased,
    /// Only the newest release
    Latest,
}

/// Options for a generation run
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Version to give the unreleased section
    pub tag: Option<String>,
    /// Which releases to emit
    pub selection: ReleaseSelection,
}

impl GenerateOptions {
    /// Name the unreleased section
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Restrict the emitted releases
    pub fn with_selection(mut self, selection: ReleaseSelection) -> Self {
        self.selection = selection;
        self
    }
}

/// Changelog generator
pub struct ChangelogGenerator {
    parser: Box<dyn CommitParser>,
    header: Template,
    body: Template,
    footer: Template,
    trim: bool,
    split_commits: bool,
    topo_order: bool,
    sort_commits: SortOrder,
    ignore_tags: Option<Regex>,
    extra: Value,
}

impl ChangelogGenerator {
    /// Compile templates and patterns from configuration
    pub fn new(config: &Config) -> Result<Self> {
        let changelog = &config.changelog;
        let git = &config.git;
        let trim = changelog.trim;

        let ignore_tags = git
            .ignore_tags
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(|p| compile_pattern("git.ignore_tags", p))
            .transpose()?;

        Ok(Self {
            parser: Box::new(ConfiguredParser::from_config(git)?),
            header: Template::new("header", &changelog.header, trim)?,
            body: Template::new("body", &changelog.body, trim)?,
            footer: Template::new("footer", &changelog.footer, trim)?,
            trim,
            split_commits: git.split_commits,
            topo_order: git.topo_order,
            sort_commits: git.sort_commits,
            ignore_tags,
            extra: json!(changelog.extra),
        })
    }

    /// Build releases from commit records, newest release first
    #[instrument(skip(self, commits, options), fields(commit_count = commits.len()))]
    pub fn generate(&self, commits: Vec<Commit>, options: &GenerateOptions) -> Result<Vec<Release>> {
        info!(commit_count = commits.len(), tag = ?options.tag, "generating changelog");

        let ordered = order_commits(commits, self.topo_order)?;
        let slices = split_releases(ordered, self.ignore_tags.as_ref());
        let has_unreleased = slices.last().is_some_and(|s| s.version.is_none());

        let mut releases: Vec<Release> = slices
            .into_iter()
            .map(|slice| self.build_release(slice, options.tag.as_deref()))
            .collect();

        let mut previous: Option<String> = None;
        for release in &mut releases {
            release.previous = previous.take();
            previous = release.version.clone();
        }
        releases.reverse();

        match options.selection {
            ReleaseSelection::All => {}
            ReleaseSelection::Unreleased if has_unreleased => releases.truncate(1),
            ReleaseSelection::Unreleased => releases.clear(),
            ReleaseSelection::Latest => releases.truncate(1),
        }

        debug!(
            release_count = releases.len(),
            commit_count = releases.iter().map(|r| r.commits.len()).sum::<usize>(),
            "releases built"
        );
        Ok(releases)
    }

    fn build_release(&self, slice: ReleaseSlice, tag: Option<&str>) -> Release {
        let ReleaseSlice {
            version,
            timestamp,
            commits,
        } = slice;

        // An explicit tag names the unreleased section, dated by its newest commit
        let (version, timestamp) = match (version, tag) {
            (None, Some(tag)) => (
                Some(tag.to_string()),
                commits.last().map(|c| c.timestamp),
            ),
            (version, _) => (version, timestamp),
        };

        let mut processed = self.process_commits(&commits);
        if self.sort_commits == SortOrder::Newest {
            processed.reverse();
        }

        debug!(
            version = ?version,
            input = commits.len(),
            kept = processed.len(),
            "release processed"
        );
        Release::new(version, timestamp, processed)
    }

    fn process_commits(&self, commits: &[Commit]) -> Vec<ProcessedCommit> {
        let mut processed = Vec::with_capacity(commits.len());

        for commit in commits {
            let parts = if self.split_commits {
                split_commit(commit)
            } else {
                vec![commit.clone()]
            };

            processed.extend(
                parts
                    .iter()
                    .filter_map(|c| self.parser.parse(c))
                    .filter(|c| self.parser.should_include(c)),
            );
        }

        processed
    }

    /// Render a single release with the body template
    pub fn render_release(&self, release: &Release) -> Result<String> {
        let mut context = serde_json::to_value(release)?;
        if let Value::Object(map) = &mut context {
            map.insert("extra".to_string(), self.extra.clone());
        }

        let rendered = self.body.render(&context)?;
        Ok(self.finish(rendered))
    }

    /// Render the whole document: header, releases, footer
    #[instrument(skip(self, releases), fields(release_count = releases.len()))]
    pub fn render(&self, releases: &[Release]) -> Result<String> {
        let context = self.document_context(releases);

        let mut parts = Vec::with_capacity(releases.len() + 2);
        parts.push(self.finish(self.header.render(&context)?));
        for release in releases {
            parts.push(self.render_release(release)?);
        }
        parts.push(self.finish(self.footer.render(&context)?));

        let output = self.join(parts);
        debug!(output_len = output.len(), "changelog rendered");
        Ok(output)
    }

    /// Insert rendered releases into an existing changelog.
    ///
    /// When `existing` starts with the rendered header, the releases go
    /// right below it; otherwise they go on top. The footer is not repeated.
    /// A blank `existing` gets the whole document.
    #[instrument(skip(self, releases, existing), fields(release_count = releases.len()))]
    pub fn prepend(&self, releases: &[Release], existing: &str) -> Result<String> {
        if existing.trim().is_empty() {
            return self.render(releases);
        }

        let header = self.finish(self.header.render(&self.document_context(releases))?);

        let mut parts = Vec::with_capacity(releases.len() + 2);
        let rest = match existing.strip_prefix(header.as_str()) {
            Some(rest) if !header.is_empty() => {
                parts.push(header.clone());
                rest
            }
            _ => existing,
        };
        for release in releases {
            parts.push(self.render_release(release)?);
        }
        parts.push(self.finish(rest.to_string()));

        Ok(self.join(parts))
    }

    fn document_context(&self, releases: &[Release]) -> Value {
        json!({
            "releases": releases,
            "extra": self.extra,
        })
    }

    fn join(&self, parts: Vec<String>) -> String {
        if !self.trim {
            return parts.concat();
        }

        let mut output = parts
            .into_iter()
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n");
        if !output.is_empty() {
            output.push('\n');
        }
        output
    }

    /// Generate and render in one step
    pub fn generate_formatted(&self, commits: Vec<Commit>, options: &GenerateOptions) -> Result<String> {
        let releases = self.generate(commits, options)?;
        self.render(&releases)
    }

    fn finish(&self, rendered: String) -> String {
        if self.trim {
            rendered.trim().to_string()
        } else {
            rendered
        }
    }
}
