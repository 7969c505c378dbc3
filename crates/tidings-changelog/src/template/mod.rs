//! Changelog template dialect
//!
//! A small Jinja-flavoured language covering what changelog templates need:
//!
//! - `{{ expr }}` prints a value, `{{ expr | filter(arg=value) }}` pipes it
//!   through a built-in filter
//! - `{% if %}` / `{% elif %}` / `{% else %}` / `{% endif %}`
//! - `{% for item in list %}` / `{% endfor %}` with `loop.index`,
//!   `loop.index0`, `loop.first` and `loop.last`
//! - `{# comments #}`
//!
//! A newline directly after a `{% %}` tag is dropped, and a `-` inside any
//! delimiter strips the whitespace on that side.
//!
//! ```
//! use serde_json::json;
//! use tidings_changelog::template::Template;
//!
//! let template = Template::new("body", "{% if version %}## {{ version }}{% else %}## unreleased{% endif %}", false)?;
//! assert_eq!(template.render(&json!({"version": "1.0.0"}))?, "## 1.0.0");
//! assert_eq!(template.render(&json!({}))?, "## unreleased");
//! # Ok::<(), tidings_core::TemplateError>(())
//! ```

mod filters;
mod lexer;
mod parser;
mod render;

use serde_json::Value;
use tidings_core::TemplateError;
use tracing::trace;

use parser::Node;
use render::Scopes;

/// A compiled template
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    nodes: Vec<Node>,
}

impl Template {
    /// Compile template source.
    ///
    /// With `trim`, every source line is stripped of leading and trailing
    /// whitespace before compilation.
    pub fn new(name: impl Into<String>, source: &str, trim: bool) -> Result<Self, TemplateError> {
        let name = name.into();
        let source = if trim {
            source.lines().map(str::trim).collect::<Vec<_>>().join("\n")
        } else {
            source.to_string()
        };

        let tokens = lexer::tokenize(&name, &source)?;
        let nodes = parser::parse(&name, tokens)?;
        trace!(template = %name, nodes = nodes.len(), "template compiled");

        Ok(Self { name, nodes })
    }

    /// Render against a context object
    pub fn render(&self, context: &Value) -> Result<String, TemplateError> {
        let root = context.as_object().ok_or_else(|| {
            TemplateError::render(&self.name, "template context must be an object")
        })?;

        let mut scopes = Scopes::new(root);
        let mut out = String::new();
        render::render_nodes(&self.nodes, &mut scopes, &mut out)
            .map_err(|message| TemplateError::render(&self.name, message))?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(source: &str, context: Value) -> String {
        Template::new("test", source, false)
            .unwrap()
            .render(&context)
            .unwrap()
    }

    #[test]
    fn test_render_text_only() {
        assert_eq!(render("# Changelog", json!({})), "# Changelog");
    }

    #[test]
    fn test_render_variable_with_filters() {
        let out = render(
            r#"{{ message | upper_first }} [{{ id | truncate(length=7, end="") }}]"#,
            json!({"message": "handle timeout", "id": "abc123def456"}),
        );
        assert_eq!(out, "Handle timeout [abc123d]");
    }

    #[test]
    fn test_render_if_else() {
        let source = "{% if version %}## [{{ version }}]{% else %}## [unreleased]{% endif %}";
        assert_eq!(render(source, json!({"version": "v1.0.0"})), "## [v1.0.0]");
        assert_eq!(render(source, json!({"version": null})), "## [unreleased]");
    }

    #[test]
    fn test_render_elif() {
        let source = r#"{% if kind == "a" %}A{% elif kind == "b" %}B{% else %}C{% endif %}"#;
        assert_eq!(render(source, json!({"kind": "b"})), "B");
        assert_eq!(render(source, json!({"kind": "z"})), "C");
    }

    #[test]
    fn test_render_nested_loops() {
        let source = "{% for s in scopes %}[{{ s.name }}:{% for c in s.commits %}{{ c }}{% if not loop.last %},{% endif %}{% endfor %}]{% endfor %}";
        let out = render(
            source,
            json!({"scopes": [
                {"name": "core", "commits": ["a", "b"]},
                {"name": "cli", "commits": ["c"]}
            ]}),
        );
        assert_eq!(out, "[core:a,b][cli:c]");
    }

    #[test]
    fn test_loop_variable_does_not_leak() {
        let out = render(
            "{% for x in items %}{{ x }}{% endfor %}|{{ x }}",
            json!({"items": [1, 2]}),
        );
        assert_eq!(out, "12|");
    }

    #[test]
    fn test_trim_strips_line_indentation() {
        let source = "{% for c in commits %}\n    - {{ c }}\n{% endfor %}\n";
        let template = Template::new("body", source, true).unwrap();
        let out = template.render(&json!({"commits": ["a", "b"]})).unwrap();
        assert_eq!(out, "- a\n- b\n");
    }

    #[test]
    fn test_render_requires_object_context() {
        let template = Template::new("body", "x", false).unwrap();
        assert!(template.render(&json!([1, 2])).is_err());
    }

    #[test]
    fn test_render_error_names_template() {
        let template = Template::new("footer", "{{ n | truncate }}", false).unwrap();
        let err = template.render(&json!({"n": "abc"})).unwrap_err();
        assert!(matches!(err, TemplateError::Render { ref template, .. } if template == "footer"));
    }

    #[test]
    fn test_syntax_error_surfaces_fragment() {
        let err = Template::new("body", "{% for c in commits %}{{ c }}", false).unwrap_err();
        assert!(matches!(err, TemplateError::Syntax { ref fragment, .. } if fragment.starts_with("{% for")));
    }
}
