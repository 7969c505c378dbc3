//! Default configuration values

use super::types::{CommitParserConfig, LinkParserConfig};

/// Default configuration file name (TOML)
pub const DEFAULT_CONFIG_TOML: &str = "tidings.toml";

/// Default configuration file name (YAML)
pub const DEFAULT_CONFIG_YAML: &str = "tidings.yaml";

/// Scope given to commits that do not name one
pub const DEFAULT_SCOPE: &str = "global changes";

/// Get list of config file names to search for
pub fn config_file_names() -> Vec<&'static str> {
    vec![
        DEFAULT_CONFIG_TOML,
        DEFAULT_CONFIG_YAML,
        ".tidings.toml",
        ".tidings.yaml",
    ]
}

/// Default header template
pub const DEFAULT_HEADER: &str = r#"# Changelog

All notable changes to this project will be documented in this file.
"#;

/// Default release body template
pub const DEFAULT_BODY: &str = r#"
{% if version %}
    ## [{{ version | trim_start_matches(pat="v") }}] - {{ timestamp | date(format="%Y-%m-%d") }}
{% else %}
    ## [unreleased]
{% endif %}
{% for scope in scopes %}

    ### {{ scope.name | default(value="other") | upper_first }}
    {% for group in scope.groups %}

        #### {{ group.name | default(value="Other") }}
        {% for commit in group.commits %}
            {% if commit.breaking %}
                - **BREAKING** {{ commit.message }}
            {% else %}
                - {{ commit.message | upper_first }} [{{ commit.id | truncate(length=7, end="") }}]
            {% endif %}
        {% endfor %}
    {% endfor %}
{% endfor %}
"#;

/// Default footer template
pub const DEFAULT_FOOTER: &str = "";

/// Default classification rules
pub fn default_commit_parsers() -> Vec<CommitParserConfig> {
    [
        ("^feat", "🚀 Features"),
        ("^fix", "🐞 Bug Fixes"),
        ("^doc", "📚 Documentation"),
        ("^perf", "⚡ Performance"),
        ("^refactor", "🚜 Refactor"),
        ("^style", "🎨 Styling"),
        ("^test", "🧪 Testing"),
        ("^chore|^ci|^build", "⚙️ Miscellaneous Tasks"),
        ("^revert", "◀️ Revert"),
    ]
    .into_iter()
    .map(|(pattern, group)| CommitParserConfig::new(pattern, group).with_default_scope(DEFAULT_SCOPE))
    .collect()
}

/// Default link rules
pub fn default_link_parsers() -> Vec<LinkParserConfig> {
    vec![LinkParserConfig::new(
        r"#(\d+)",
        "https://github.com/example/project/issues/$1",
    )]
}

/// Default configuration template written by `tidings init`
pub const DEFAULT_CONFIG_TEMPLATE: &str = r##"# tidings configuration

[changelog]
header = """
# Changelog

All notable changes to this project will be documented in this file.
"""
body = """
{% if version %}
    ## [{{ version | trim_start_matches(pat="v") }}] - {{ timestamp | date(format="%Y-%m-%d") }}
{% else %}
    ## [unreleased]
{% endif %}
{% for scope in scopes %}

    ### {{ scope.name | default(value="other") | upper_first }}
    {% for group in scope.groups %}

        #### {{ group.name | default(value="Other") }}
        {% for commit in group.commits %}
            {% if commit.breaking %}
                - **BREAKING** {{ commit.message }}
            {% else %}
                - {{ commit.message | upper_first }} [{{ commit.id | truncate(length=7, end="") }}]
            {% endif %}
        {% endfor %}
    {% endfor %}
{% endfor %}
"""
footer = ""
trim = true

[git]
conventional_commits = true
filter_unconventional = false
split_commits = false
commit_parsers = [
  { message = "^feat", group = "🚀 Features", default_scope = "global changes" },
  { message = "^fix", group = "🐞 Bug Fixes", default_scope = "global changes" },
  { message = "^doc", group = "📚 Documentation", default_scope = "global changes" },
  { message = "^perf", group = "⚡ Performance", default_scope = "global changes" },
  { message = "^refactor", group = "🚜 Refactor", default_scope = "global changes" },
  { message = "^style", group = "🎨 Styling", default_scope = "global changes" },
  { message = "^test", group = "🧪 Testing", default_scope = "global changes" },
  { message = "^chore|^ci|^build", group = "⚙️ Miscellaneous Tasks", default_scope = "global changes" },
  { message = "^revert", group = "◀️ Revert", default_scope = "global changes" },
]
protect_breaking_commits = false
sort_commits = "oldest"
topo_order = false
link_parsers = [
  { pattern = "#(\\d+)", href = "https://github.com/example/project/issues/$1" },
]
"##;
