//! Init command

use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use tidings_core::config::{
    serialize_config, Config, ConfigFormat, DEFAULT_CONFIG_TEMPLATE, DEFAULT_CONFIG_TOML,
    DEFAULT_CONFIG_YAML,
};

use crate::cli::{output, Cli, OutputFormat};

/// Write the default configuration
#[derive(Debug, Args)]
pub struct InitCommand {
    /// Force overwrite existing configuration
    #[arg(short, long)]
    pub force: bool,

    /// Write YAML instead of TOML
    #[arg(long)]
    pub yaml: bool,

    /// Output file path
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl InitCommand {
    /// Execute the init command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(force = self.force, yaml = self.yaml, "executing init command");
        let cwd = std::env::current_dir()?;

        let format = match (&self.output, self.yaml) {
            (_, true) => ConfigFormat::Yaml,
            (Some(path), false) => ConfigFormat::from_path(path),
            (None, false) => ConfigFormat::Toml,
        };
        let config_path = self.output.clone().unwrap_or_else(|| {
            cwd.join(match format {
                ConfigFormat::Toml => DEFAULT_CONFIG_TOML,
                ConfigFormat::Yaml => DEFAULT_CONFIG_YAML,
            })
        });

        if config_path.exists() && !self.force {
            anyhow::bail!(
                "Configuration file already exists at {}. Use --force to overwrite.",
                config_path.display()
            );
        }

        std::fs::write(&config_path, default_config(format)?)?;

        match cli.format {
            OutputFormat::Json => {
                let result = serde_json::json!({
                    "path": config_path.to_string_lossy(),
                    "format": match format {
                        ConfigFormat::Toml => "toml",
                        ConfigFormat::Yaml => "yaml",
                    },
                });
                println!("{}", serde_json::to_string_pretty(&result)?);
            }
            OutputFormat::Text if !cli.quiet => {
                output::success(&format!(
                    "Created configuration at {}",
                    output::path_style().apply_to(config_path.display())
                ));
                eprintln!();
                eprintln!("Next steps:");
                eprintln!("  1. Edit {} to customize templates and commit groups", config_path.display());
                eprintln!("  2. Run {} to check your setup", style("tidings validate").cyan());
                eprintln!(
                    "  3. Pipe commits into {} to render a changelog",
                    style("tidings generate").cyan()
                );
            }
            OutputFormat::Text => {}
        }

        Ok(())
    }
}

/// Default configuration file content
fn default_config(format: ConfigFormat) -> anyhow::Result<String> {
    Ok(match format {
        ConfigFormat::Toml => DEFAULT_CONFIG_TEMPLATE.to_string(),
        ConfigFormat::Yaml => serialize_config(&Config::default(), ConfigFormat::Yaml)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tidings_core::config::{load_config, parse_config};

    #[test]
    fn test_default_config_round_trips() {
        for format in [ConfigFormat::Toml, ConfigFormat::Yaml] {
            let content = default_config(format).unwrap();
            assert_eq!(parse_config(&content, format).unwrap(), Config::default());
        }
    }

    #[test]
    fn test_init_writes_and_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.yml");
        let path_arg = path.to_string_lossy().to_string();

        let cli = Cli::try_parse_from(["tidings", "-q", "init", "--output", path_arg.as_str()]).unwrap();
        cli.execute().unwrap();
        assert_eq!(load_config(&path).unwrap(), Config::default());

        let again = Cli::try_parse_from(["tidings", "-q", "init", "--output", path_arg.as_str()]).unwrap();
        assert!(again.execute().is_err());

        let forced =
            Cli::try_parse_from(["tidings", "-q", "init", "--force", "--output", path_arg.as_str()]).unwrap();
        forced.execute().unwrap();
    }
}
