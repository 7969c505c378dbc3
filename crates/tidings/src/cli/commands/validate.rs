//! Validate command

use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use tidings_changelog::ChangelogGenerator;
use tidings_core::config::{load_config, load_config_or_default, Config};
use tidings_core::TidingsError;

use crate::cli::{output, Cli, OutputFormat};

/// Validate configuration and templates
#[derive(Debug, Args)]
pub struct ValidateCommand {
    /// Configuration file (default: discovered from the working directory)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Strict mode - treat warnings as errors
    #[arg(long)]
    pub strict: bool,
}

/// Outcome of checking a configuration
#[derive(Debug, Default)]
struct Report {
    config_path: Option<PathBuf>,
    errors: Vec<String>,
    warnings: Vec<String>,
    failure: Option<TidingsError>,
}

impl Report {
    fn fail(&mut self, context: &str, err: TidingsError) {
        self.errors.push(format!("{}: {}", context, err));
        if self.failure.is_none() {
            self.failure = Some(err);
        }
    }
}

impl ValidateCommand {
    /// Execute the validate command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(config = ?self.config, strict = self.strict, "executing validate command");

        let mut report = self.check()?;
        if self.strict {
            let mut warnings = std::mem::take(&mut report.warnings);
            report.errors.append(&mut warnings);
        }
        let passed = report.errors.is_empty();

        match cli.format {
            OutputFormat::Json => {
                let result = serde_json::json!({
                    "valid": passed,
                    "config_path": report.config_path.as_ref().map(|p| p.to_string_lossy()),
                    "errors": report.errors,
                    "warnings": report.warnings,
                });
                println!("{}", serde_json::to_string_pretty(&result)?);
            }
            OutputFormat::Text if !cli.quiet => print_report(&report, passed),
            OutputFormat::Text => {}
        }

        if passed {
            return Ok(());
        }
        match report.failure {
            Some(err) => Err(anyhow::Error::from(err).context("Validation failed")),
            None => anyhow::bail!("Validation failed with {} error(s)", report.errors.len()),
        }
    }

    fn check(&self) -> anyhow::Result<Report> {
        let mut report = Report::default();

        let loaded = match &self.config {
            Some(path) => load_config(path).map(|c| (c, Some(path.clone()))),
            None => load_config_or_default(&std::env::current_dir()?),
        };

        let config = match loaded {
            Ok((config, path)) => {
                if path.is_none() {
                    report
                        .warnings
                        .push("No configuration file found, defaults apply".to_string());
                }
                report.config_path = path;
                config
            }
            Err(e) => {
                report.fail("Configuration", e);
                return Ok(report);
            }
        };

        if let Err(e) = ChangelogGenerator::new(&config) {
            report.fail("Templates", e);
        }
        report.warnings.extend(config_warnings(&config));

        Ok(report)
    }
}

/// Settings that are valid but probably not what the user wants
fn config_warnings(config: &Config) -> Vec<String> {
    let mut warnings = Vec::new();
    let git = &config.git;

    if git.commit_parsers.is_empty() {
        if git.filter_unconventional {
            warnings.push(
                "filter_unconventional is set without commit parsers; every commit will be dropped"
                    .to_string(),
            );
        } else {
            warnings.push("No commit parsers configured; every commit is unclassified".to_string());
        }
    }

    for (i, parser) in git.commit_parsers.iter().enumerate() {
        if parser.group.is_none() && !parser.skip {
            warnings.push(format!(
                "git.commit_parsers[{}] has no group and does not skip",
                i
            ));
        }
    }

    if git.filter_unconventional && !git.conventional_commits {
        warnings.push(
            "filter_unconventional has no effect on parsing while conventional_commits is off"
                .to_string(),
        );
    }

    warnings
}

fn print_report(report: &Report, passed: bool) {
    println!("{}", output::header("Validation Results"));
    println!();

    if let Some(path) = &report.config_path {
        let path = output::path_style().apply_to(path.display()).to_string();
        println!("{}", output::key_value("Config", &path));
        println!();
    }

    if !report.errors.is_empty() {
        println!("{}", style("Errors:").red().bold());
        for error in &report.errors {
            println!("  {} {}", style("✗").red(), error);
        }
        println!();
    }

    if !report.warnings.is_empty() {
        println!("{}", style("Warnings:").yellow().bold());
        for warning in &report.warnings {
            println!("  {} {}", style("!").yellow(), warning);
        }
        println!();
    }

    if passed {
        output::success("Configuration is valid");
    }
}
