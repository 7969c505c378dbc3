//! Built-in template filters

use std::collections::HashMap;
use std::fmt::Write;

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::render::stringify;

const FILTERS: &[&str] = &[
    "upper_first",
    "upper",
    "lower",
    "trim",
    "trim_start_matches",
    "trim_end_matches",
    "truncate",
    "date",
    "default",
    "length",
    "first",
    "last",
    "join",
    "replace",
    "split",
];

/// Whether `name` is a built-in filter
pub(crate) fn is_known_filter(name: &str) -> bool {
    FILTERS.contains(&name)
}

/// Apply a filter to a value
pub(crate) fn apply(name: &str, value: Value, args: &HashMap<String, Value>) -> Result<Value, String> {
    match name {
        "upper_first" => Ok(Value::String(upper_first(&stringify(&value)))),
        "upper" => Ok(Value::String(stringify(&value).to_uppercase())),
        "lower" => Ok(Value::String(stringify(&value).to_lowercase())),
        "trim" => Ok(Value::String(stringify(&value).trim().to_string())),
        "trim_start_matches" => {
            let pat = string_arg(name, args, "pat")?;
            Ok(Value::String(
                stringify(&value).trim_start_matches(pat.as_str()).to_string(),
            ))
        }
        "trim_end_matches" => {
            let pat = string_arg(name, args, "pat")?;
            Ok(Value::String(
                stringify(&value).trim_end_matches(pat.as_str()).to_string(),
            ))
        }
        "truncate" => {
            let length = args
                .get("length")
                .and_then(Value::as_u64)
                .ok_or_else(|| "truncate requires a numeric `length` argument".to_string())?;
            let end = match args.get("end") {
                Some(end) => stringify(end),
                None => "…".to_string(),
            };
            Ok(Value::String(truncate(&stringify(&value), length as usize, &end)))
        }
        "date" => {
            let format = match args.get("format") {
                Some(format) => stringify(format),
                None => "%Y-%m-%d".to_string(),
            };
            format_date(&value, &format)
        }
        "default" => {
            let fallback = args
                .get("value")
                .cloned()
                .ok_or_else(|| "default requires a `value` argument".to_string())?;
            Ok(if value.is_null() { fallback } else { value })
        }
        "length" => {
            let len = match &value {
                Value::Array(items) => items.len(),
                Value::Object(map) => map.len(),
                Value::String(s) => s.chars().count(),
                Value::Null => 0,
                other => return Err(format!("length is not defined for {other}")),
            };
            Ok(Value::from(len))
        }
        "first" => Ok(as_array(name, &value)?.first().cloned().unwrap_or(Value::Null)),
        "last" => Ok(as_array(name, &value)?.last().cloned().unwrap_or(Value::Null)),
        "join" => {
            let sep = match args.get("sep") {
                Some(sep) => stringify(sep),
                None => String::new(),
            };
            let joined = as_array(name, &value)?
                .iter()
                .map(stringify)
                .collect::<Vec<_>>()
                .join(&sep);
            Ok(Value::String(joined))
        }
        "replace" => {
            let from = string_arg(name, args, "from")?;
            let to = string_arg(name, args, "to")?;
            Ok(Value::String(stringify(&value).replace(&from, &to)))
        }
        "split" => {
            let pat = string_arg(name, args, "pat")?;
            Ok(Value::Array(
                stringify(&value)
                    .split(pat.as_str())
                    .map(|part| Value::String(part.to_string()))
                    .collect(),
            ))
        }
        other => Err(format!("unknown filter `{other}`")),
    }
}

fn string_arg(filter: &str, args: &HashMap<String, Value>, key: &str) -> Result<String, String> {
    args.get(key)
        .map(stringify)
        .ok_or_else(|| format!("{filter} requires a `{key}` argument"))
}

fn as_array<'a>(filter: &str, value: &'a Value) -> Result<&'a [Value], String> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Null => Ok(&[]),
        other => Err(format!("{filter} expects a list, got {other}")),
    }
}

/// Uppercase the first character
pub(crate) fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn truncate(s: &str, length: usize, end: &str) -> String {
    if s.chars().count() <= length {
        return s.to_string();
    }
    let mut truncated: String = s.chars().take(length).collect();
    truncated.push_str(end);
    truncated
}

fn format_date(value: &Value, format: &str) -> Result<Value, String> {
    let timestamp: DateTime<Utc> = match value {
        Value::Null => return Ok(Value::Null),
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .map_err(|e| format!("date expects an RFC 3339 timestamp, got `{s}`: {e}"))?
            .with_timezone(&Utc),
        Value::Number(n) => n
            .as_i64()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .ok_or_else(|| format!("date expects unix seconds, got {n}"))?,
        other => return Err(format!("date is not defined for {other}")),
    };
    let mut formatted = String::new();
    write!(formatted, "{}", timestamp.format(format))
        .map_err(|_| format!("invalid date format `{format}`"))?;
    Ok(Value::String(formatted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_upper_first() {
        assert_eq!(upper_first("handle timeout"), "Handle timeout");
        assert_eq!(upper_first(""), "");
        assert_eq!(upper_first("élan"), "Élan");
    }

    #[test]
    fn test_truncate_short_id() {
        let out = apply(
            "truncate",
            json!("abc123def4567890"),
            &args(&[("length", json!(7)), ("end", json!(""))]),
        )
        .unwrap();
        assert_eq!(out, json!("abc123d"));
    }

    #[test]
    fn test_truncate_default_end() {
        let out = apply("truncate", json!("abcdef"), &args(&[("length", json!(3))])).unwrap();
        assert_eq!(out, json!("abc…"));
    }

    #[test]
    fn test_truncate_requires_length() {
        assert!(apply("truncate", json!("abc"), &HashMap::new()).is_err());
    }

    #[test]
    fn test_date_formats_rfc3339() {
        let out = apply(
            "date",
            json!("2024-03-05T10:00:00Z"),
            &args(&[("format", json!("%Y/%m/%d"))]),
        )
        .unwrap();
        assert_eq!(out, json!("2024/03/05"));
    }

    #[test]
    fn test_date_null_passes_through() {
        assert_eq!(apply("date", Value::Null, &HashMap::new()).unwrap(), Value::Null);
    }

    #[test]
    fn test_date_rejects_garbage() {
        assert!(apply("date", json!("yesterday"), &HashMap::new()).is_err());
    }

    #[test]
    fn test_default_only_replaces_null() {
        let fallback = args(&[("value", json!("other"))]);
        assert_eq!(apply("default", Value::Null, &fallback).unwrap(), json!("other"));
        assert_eq!(apply("default", json!("core"), &fallback).unwrap(), json!("core"));
    }

    #[test]
    fn test_trim_start_matches() {
        let out = apply(
            "trim_start_matches",
            json!("v1.2.0"),
            &args(&[("pat", json!("v"))]),
        )
        .unwrap();
        assert_eq!(out, json!("1.2.0"));
    }

    #[test]
    fn test_length_and_join() {
        let list = json!(["a", "b", "c"]);
        assert_eq!(apply("length", list.clone(), &HashMap::new()).unwrap(), json!(3));
        assert_eq!(
            apply("join", list, &args(&[("sep", json!(", "))])).unwrap(),
            json!("a, b, c")
        );
    }

    #[test]
    fn test_first_last_split() {
        let parts = apply("split", json!("a/b/c"), &args(&[("pat", json!("/"))])).unwrap();
        assert_eq!(apply("first", parts.clone(), &HashMap::new()).unwrap(), json!("a"));
        assert_eq!(apply("last", parts, &HashMap::new()).unwrap(), json!("c"));
    }

    #[test]
    fn test_replace() {
        let out = apply(
            "replace",
            json!("a-b-c"),
            &args(&[("from", json!("-")), ("to", json!("+"))]),
        )
        .unwrap();
        assert_eq!(out, json!("a+b+c"));
    }

    #[test]
    fn test_every_listed_filter_is_known() {
        for name in FILTERS {
            assert!(is_known_filter(name));
        }
        assert!(!is_known_filter("shout"));
    }
}
