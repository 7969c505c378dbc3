//! Generate command

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use tracing::{debug, info};

use tidings_changelog::{ChangelogGenerator, Commit, GenerateOptions, ReleaseSelection};
use tidings_core::config::{load_config, load_config_or_default, Config};
use tidings_core::{ChangelogError, TidingsError};

use crate::cli::{output, Cli, OutputFormat};

/// Render a changelog from commit records
#[derive(Debug, Args)]
pub struct GenerateCommand {
    /// JSON array of commit records (`-` reads stdin)
    #[arg(long, value_name = "FILE", default_value = "-")]
    pub commits: String,

    /// Configuration file (default: discovered from the working directory)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Version for the unreleased commits
    #[arg(short, long, value_name = "VERSION")]
    pub tag: Option<String>,

    /// Only render unreleased commits
    #[arg(long, conflicts_with = "latest")]
    pub unreleased: bool,

    /// Only render the newest release
    #[arg(long)]
    pub latest: bool,

    /// Write to file instead of stdout
    #[arg(short, long, value_name = "FILE", conflicts_with = "prepend")]
    pub output: Option<PathBuf>,

    /// Insert the new releases into an existing changelog
    #[arg(long, value_name = "FILE")]
    pub prepend: Option<PathBuf>,
}

impl GenerateCommand {
    /// Execute the generate command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(
            commits = %self.commits,
            tag = ?self.tag,
            unreleased = self.unreleased,
            latest = self.latest,
            "executing generate command"
        );

        let config = self.load_config()?;
        let commits = self.read_commits()?;
        debug!(count = commits.len(), "commit records loaded");

        let generator = ChangelogGenerator::new(&config)?;
        let releases = generator.generate(commits, &self.options())?;
        if releases.is_empty() && !cli.quiet {
            output::warning("No releases to render");
        }

        if cli.format == OutputFormat::Json {
            println!("{}", serde_json::to_string_pretty(&releases)?);
            return Ok(());
        }

        if let Some(path) = &self.prepend {
            let existing = if path.exists() {
                std::fs::read_to_string(path)?
            } else {
                String::new()
            };
            let changelog = generator.prepend(&releases, &existing)?;
            write_changelog(path, &changelog)?;
            if !cli.quiet {
                output::success(&format!(
                    "Changelog updated at {}",
                    output::path_style().apply_to(path.display())
                ));
            }
            return Ok(());
        }

        let changelog = generator.render(&releases)?;
        match &self.output {
            Some(path) => {
                write_changelog(path, &changelog)?;
                if !cli.quiet {
                    output::success(&format!(
                        "Changelog written to {}",
                        output::path_style().apply_to(path.display())
                    ));
                }
            }
            None => print!("{}", changelog),
        }

        Ok(())
    }

    fn options(&self) -> GenerateOptions {
        let selection = if self.unreleased {
            ReleaseSelection::Unreleased
        } else if self.latest {
            ReleaseSelection::Latest
        } else {
            ReleaseSelection::All
        };

        GenerateOptions {
            tag: self.tag.clone(),
            selection,
        }
    }

    fn load_config(&self) -> anyhow::Result<Config> {
        if let Some(path) = &self.config {
            return Ok(load_config(path)?);
        }

        let cwd = std::env::current_dir()?;
        let (config, path) = load_config_or_default(&cwd)?;
        match path {
            Some(path) => debug!(path = %path.display(), "using discovered configuration"),
            None => debug!("no configuration found, using defaults"),
        }
        Ok(config)
    }

    fn read_commits(&self) -> anyhow::Result<Vec<Commit>> {
        let content = if self.commits == "-" {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read commits from stdin")?;
            buffer
        } else {
            std::fs::read_to_string(&self.commits)
                .with_context(|| format!("Failed to read commits from {}", self.commits))?
        };

        Ok(parse_commits(&content)?)
    }
}

/// Parse a JSON array of commit records
fn parse_commits(content: &str) -> Result<Vec<Commit>, TidingsError> {
    serde_json::from_str(content)
        .map_err(|e| ChangelogError::InvalidInput(e.to_string()).into())
}

fn write_changelog(path: &Path, content: &str) -> Result<(), TidingsError> {
    std::fs::write(path, content).map_err(|source| {
        ChangelogError::WriteFailed {
            path: path.to_path_buf(),
            source,
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tidings_core::config::{serialize_config, ConfigFormat};

    /// Write a default config and a commit file, returning their paths as args
    fn fixture(dir: &Path, commits: &str) -> (String, String) {
        let config = dir.join("tidings.toml");
        std::fs::write(
            &config,
            serialize_config(&Config::default(), ConfigFormat::Toml).unwrap(),
        )
        .unwrap();
        let records = dir.join("commits.json");
        std::fs::write(&records, commits).unwrap();
        (
            config.to_string_lossy().to_string(),
            records.to_string_lossy().to_string(),
        )
    }

    const TAGGED: &str = r#"[
        {"id": "1111111aaaa", "message": "feat: one", "timestamp": "2024-01-01T12:00:00Z", "tag": "v0.1.0"}
    ]"#;

    const UNRELEASED: &str = r#"[
        {"id": "1111111aaaa", "message": "feat: one", "timestamp": "2024-01-01T12:00:00Z", "tag": "v0.1.0"},
        {"id": "2222222bbbb", "message": "fix: two", "timestamp": "2024-01-02T12:00:00Z"}
    ]"#;

    #[test]
    fn test_parse_commits() {
        let commits = parse_commits(
            r#"[
                {"id": "abc123def4567890", "message": "fix: handle timeout", "timestamp": "2024-01-02T12:00:00Z"},
                {"id": "0011223344556677", "message": "feat!: drop v1", "timestamp": "2024-01-03T12:00:00Z",
                 "breaking": true, "scope": "api", "tag": "v2.0.0"}
            ]"#,
        )
        .unwrap();

        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].short_id(), "abc123d");
        assert!(!commits[0].breaking);
        assert!(commits[1].breaking);
        assert_eq!(commits[1].scope.as_deref(), Some("api"));
        assert_eq!(commits[1].tag.as_deref(), Some("v2.0.0"));
    }

    #[test]
    fn test_parse_commits_rejects_bad_input() {
        let err = parse_commits(r#"{"id": "x"}"#).unwrap_err();
        assert!(matches!(
            err,
            TidingsError::Changelog(ChangelogError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_write_changelog_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("CHANGELOG.md");
        let err = write_changelog(&path, "x").unwrap_err();
        assert!(err.to_string().contains("CHANGELOG.md"));
    }

    #[test]
    fn test_write_changelog() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("CHANGELOG.md");
        write_changelog(&path, "# Changelog\n").unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "# Changelog\n");
    }

    #[test]
    fn test_generate_writes_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let (config, commits) = fixture(dir.path(), TAGGED);
        let output = dir.path().join("CHANGELOG.md");
        let output_arg = output.to_string_lossy().to_string();

        let cli = Cli::try_parse_from([
            "tidings", "-q", "generate", "--commits", commits.as_str(), "--config", config.as_str(),
            "--output", output_arg.as_str(),
        ])
        .unwrap();
        cli.execute().unwrap();

        let written = std::fs::read_to_string(&output).unwrap();
        assert!(written.starts_with("# Changelog"));
        assert!(written.contains("## [0.1.0] - 2024-01-01"));
    }

    #[test]
    fn test_generate_prepend_creates_and_updates_changelog() {
        let dir = tempfile::tempdir().unwrap();
        let (config, first) = fixture(dir.path(), TAGGED);
        let changelog = dir.path().join("CHANGELOG.md");
        let changelog_arg = changelog.to_string_lossy().to_string();

        let cli = Cli::try_parse_from([
            "tidings", "-q", "generate", "--commits", first.as_str(), "--config", config.as_str(),
            "--prepend", changelog_arg.as_str(),
        ])
        .unwrap();
        cli.execute().unwrap();
        let created = std::fs::read_to_string(&changelog).unwrap();
        assert!(created.starts_with("# Changelog"));

        let second = dir.path().join("second.json");
        std::fs::write(&second, UNRELEASED).unwrap();
        let second_arg = second.to_string_lossy().to_string();
        let cli = Cli::try_parse_from([
            "tidings", "-q", "generate", "--commits", second_arg.as_str(), "--config", config.as_str(),
            "--unreleased", "--tag", "v0.2.0", "--prepend", changelog_arg.as_str(),
        ])
        .unwrap();
        cli.execute().unwrap();

        let updated = std::fs::read_to_string(&changelog).unwrap();
        assert_eq!(updated.matches("# Changelog").count(), 1);
        assert_eq!(updated.matches("## [0.1.0]").count(), 1);
        let newer = updated.find("## [0.2.0]").unwrap();
        let older = updated.find("## [0.1.0]").unwrap();
        assert!(newer < older);
    }

    #[test]
    fn test_generate_prepend_with_existing_tag_adds_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let (config, commits) = fixture(dir.path(), TAGGED);
        let changelog = dir.path().join("CHANGELOG.md");
        let changelog_arg = changelog.to_string_lossy().to_string();

        for _ in 0..2 {
            let cli = Cli::try_parse_from([
                "tidings", "-q", "generate", "--commits", commits.as_str(), "--config", config.as_str(),
                "--unreleased", "--tag", "v0.1.0", "--prepend", changelog_arg.as_str(),
            ])
            .unwrap();
            cli.execute().unwrap();
        }

        let content = std::fs::read_to_string(&changelog).unwrap();
        assert!(!content.contains("## [0.1.0]"));
    }

    #[test]
    fn test_generate_json_skips_rendering_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let (config, commits) = fixture(dir.path(), UNRELEASED);
        let output = dir.path().join("CHANGELOG.md");
        let output_arg = output.to_string_lossy().to_string();

        let cli = Cli::try_parse_from([
            "tidings", "-q", "--format", "json", "generate", "--commits", commits.as_str(),
            "--config", config.as_str(), "--output", output_arg.as_str(),
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        cli.execute().unwrap();
        assert!(!output.exists());
    }

    #[test]
    fn test_generate_rejects_output_with_prepend() {
        let result = Cli::try_parse_from([
            "tidings", "generate", "--output", "a.md", "--prepend", "b.md",
        ]);
        assert!(result.is_err());
    }
}
