//! Configuration loading

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{ConfigError, Result};

use super::defaults::config_file_names;
use super::types::Config;
use super::validation::validate_config;

/// Serialization format of a configuration file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML
    Toml,
    /// YAML
    Yaml,
}

impl ConfigFormat {
    /// Infer the format from a file extension, defaulting to TOML
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Self::Yaml,
            _ => Self::Toml,
        }
    }
}

/// Parse configuration from a string
pub fn parse_config(content: &str, format: ConfigFormat) -> Result<Config> {
    let config: Config = match format {
        ConfigFormat::Toml => toml::from_str(content).map_err(ConfigError::TomlError)?,
        ConfigFormat::Yaml => serde_yaml::from_str(content).map_err(ConfigError::YamlError)?,
    };
    validate_config(&config)?;
    Ok(config)
}

/// Serialize configuration to a string
pub fn serialize_config(config: &Config, format: ConfigFormat) -> Result<String> {
    let content = match format {
        ConfigFormat::Toml => toml::to_string_pretty(config).map_err(ConfigError::TomlSerialize)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config).map_err(ConfigError::YamlError)?,
    };
    Ok(content)
}

/// Load configuration from a file
pub fn load_config(path: &Path) -> Result<Config> {
    let format = ConfigFormat::from_path(path);
    info!(path = %path.display(), ?format, "loading config");

    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()).into());
    }
    let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config = parse_config(&content, format)?;

    debug!(
        path = %path.display(),
        commit_parsers = config.git.commit_parsers.len(),
        link_parsers = config.git.link_parsers.len(),
        "config loaded and validated"
    );
    Ok(config)
}

/// Find configuration file in directory or parent directories.
///
/// At each directory level the search checks:
///   1. `<dir>/<name>`          (e.g. `tidings.toml`)
///   2. `<dir>/.github/<name>`  (e.g. `.github/tidings.toml`)
///
/// The first match wins. Parents are walked until the filesystem root.
pub fn find_config(start_dir: &Path) -> Option<PathBuf> {
    debug!(start_dir = %start_dir.display(), "searching for config file");
    let mut current = start_dir.to_path_buf();

    loop {
        for name in config_file_names() {
            let config_path = current.join(name);
            if config_path.exists() {
                info!(path = %config_path.display(), "found config file");
                return Some(config_path);
            }

            let github_path = current.join(".github").join(name);
            if github_path.exists() {
                info!(path = %github_path.display(), "found config file in .github/");
                return Some(github_path);
            }
        }

        if !current.pop() {
            break;
        }
    }

    debug!("no config file found");
    None
}

/// Load configuration or use defaults when no file exists.
///
/// A file that exists but fails to parse or validate is still an error.
pub fn load_config_or_default(dir: &Path) -> Result<(Config, Option<PathBuf>)> {
    match find_config(dir) {
        Some(path) => {
            let config = load_config(&path)?;
            Ok((config, Some(path)))
        }
        None => {
            info!(dir = %dir.display(), "no config found, using defaults");
            Ok((Config::default(), None))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SortOrder;
    use crate::error::TidingsError;
    use tempfile::TempDir;

    #[test]
    fn test_find_config_toml() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("tidings.toml");
        std::fs::write(&config_path, "[git]\ntopo_order = true").unwrap();

        let found = find_config(temp.path());
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_prefers_toml_over_yaml() {
        let temp = TempDir::new().unwrap();
        let toml_path = temp.path().join("tidings.toml");
        let yaml_path = temp.path().join("tidings.yaml");
        std::fs::write(&toml_path, "[git]\ntopo_order = true").unwrap();
        std::fs::write(&yaml_path, "git:\n  topo_order: true").unwrap();

        let found = find_config(temp.path()).unwrap();
        assert_eq!(found, toml_path);
    }

    #[test]
    fn test_find_config_in_github_dir() {
        let temp = TempDir::new().unwrap();
        let github_dir = temp.path().join(".github");
        std::fs::create_dir_all(&github_dir).unwrap();
        let config_path = github_dir.join("tidings.toml");
        std::fs::write(&config_path, "[git]\ntopo_order = true").unwrap();

        assert_eq!(find_config(temp.path()), Some(config_path));
    }

    #[test]
    fn test_find_config_in_parent_dir() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join(".tidings.toml");
        std::fs::write(&config_path, "").unwrap();
        let nested = temp.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_config(&nested), Some(config_path));
    }

    #[test]
    fn test_load_config_toml() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("tidings.toml");
        std::fs::write(
            &config_path,
            "[changelog]\ntrim = false\n\n[git]\nsort_commits = \"newest\"\n",
        )
        .unwrap();

        let config = load_config(&config_path).unwrap();
        assert!(!config.changelog.trim);
        assert_eq!(config.git.sort_commits, SortOrder::Newest);
    }

    #[test]
    fn test_load_config_yaml() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("tidings.yaml");
        std::fs::write(
            &config_path,
            "git:\n  filter_unconventional: true\n  link_parsers:\n    - pattern: 'JIRA-(\\d+)'\n      href: 'https://jira/browse/JIRA-$1'\n",
        )
        .unwrap();

        let config = load_config(&config_path).unwrap();
        assert!(config.git.filter_unconventional);
        assert_eq!(config.git.link_parsers.len(), 1);
    }

    #[test]
    fn test_load_config_rejects_bad_regex() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("tidings.toml");
        std::fs::write(
            &config_path,
            "[git]\ncommit_parsers = [{ message = \"^feat(\", group = \"Features\" }]\n",
        )
        .unwrap();

        let err = load_config(&config_path).unwrap_err();
        assert!(matches!(
            err,
            TidingsError::Config(ConfigError::InvalidRegex { .. })
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = load_config(&temp.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, TidingsError::Config(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_or_default_without_file() {
        let temp = TempDir::new().unwrap();
        let (config, path) = load_config_or_default(temp.path()).unwrap();
        assert!(path.is_none());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_serialize_round_trips_defaults() {
        let config = Config::default();
        let yaml = serialize_config(&config, ConfigFormat::Yaml).unwrap();
        let parsed = parse_config(&yaml, ConfigFormat::Yaml).unwrap();
        assert_eq!(parsed, config);
    }
}
