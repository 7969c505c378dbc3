//! Node evaluation against a JSON context

use std::collections::HashMap;

use serde_json::{Map, Value};

use super::filters;
use super::parser::{Expr, Node};

/// Variable scopes, innermost last
pub(crate) struct Scopes<'a> {
    root: &'a Map<String, Value>,
    frames: Vec<Map<String, Value>>,
}

impl<'a> Scopes<'a> {
    pub(crate) fn new(root: &'a Map<String, Value>) -> Self {
        Self {
            root,
            frames: Vec::new(),
        }
    }

    fn lookup(&self, name: &str) -> Option<&Value> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(name))
            .or_else(|| self.root.get(name))
    }
}

/// Render nodes into `out`
pub(crate) fn render_nodes(
    nodes: &[Node],
    scopes: &mut Scopes<'_>,
    out: &mut String,
) -> Result<(), String> {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Output(expr) => out.push_str(&stringify(&evaluate(expr, scopes)?)),
            Node::If {
                branches,
                otherwise,
            } => {
                let mut taken = false;
                for (condition, body) in branches {
                    if is_truthy(&evaluate(condition, scopes)?) {
                        render_nodes(body, scopes, out)?;
                        taken = true;
                        break;
                    }
                }
                if !taken {
                    render_nodes(otherwise, scopes, out)?;
                }
            }
            Node::For {
                variable,
                iterable,
                body,
            } => {
                let items = match evaluate(iterable, scopes)? {
                    Value::Array(items) => items,
                    Value::Object(map) => map.into_iter().map(|(_, v)| v).collect(),
                    Value::Null => Vec::new(),
                    other => return Err(format!("cannot iterate over {other}")),
                };

                let count = items.len();
                for (index, item) in items.into_iter().enumerate() {
                    let mut frame = Map::new();
                    frame.insert(variable.clone(), item);
                    frame.insert(
                        "loop".to_string(),
                        serde_json::json!({
                            "index": index + 1,
                            "index0": index,
                            "first": index == 0,
                            "last": index + 1 == count,
                        }),
                    );
                    scopes.frames.push(frame);
                    let result = render_nodes(body, scopes, out);
                    scopes.frames.pop();
                    result?;
                }
            }
        }
    }
    Ok(())
}

fn evaluate(expr: &Expr, scopes: &Scopes<'_>) -> Result<Value, String> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Path(path) => Ok(resolve(path, scopes)),
        Expr::Not(inner) => Ok(Value::Bool(!is_truthy(&evaluate(inner, scopes)?))),
        Expr::And(left, right) => {
            let left = is_truthy(&evaluate(left, scopes)?);
            Ok(Value::Bool(left && is_truthy(&evaluate(right, scopes)?)))
        }
        Expr::Or(left, right) => {
            let left = is_truthy(&evaluate(left, scopes)?);
            Ok(Value::Bool(left || is_truthy(&evaluate(right, scopes)?)))
        }
        Expr::Eq(left, right) => Ok(Value::Bool(
            evaluate(left, scopes)? == evaluate(right, scopes)?,
        )),
        Expr::Ne(left, right) => Ok(Value::Bool(
            evaluate(left, scopes)? != evaluate(right, scopes)?,
        )),
        Expr::Filter { input, name, args } => {
            let value = evaluate(input, scopes)?;
            let mut evaluated = HashMap::with_capacity(args.len());
            for (key, arg) in args {
                evaluated.insert(key.clone(), evaluate(arg, scopes)?);
            }
            filters::apply(name, value, &evaluated).map_err(|e| format!("filter `{name}`: {e}"))
        }
    }
}

/// Missing variables and attributes resolve to null
fn resolve(path: &[String], scopes: &Scopes<'_>) -> Value {
    let Some((head, tail)) = path.split_first() else {
        return Value::Null;
    };
    let mut current = match scopes.lookup(head) {
        Some(value) => value,
        None => return Value::Null,
    };

    for segment in tail {
        let next = match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        };
        match next {
            Some(value) => current = value,
            None => return Value::Null,
        }
    }

    current.clone()
}

/// Truthiness: null, false, zero and empty strings/lists/objects are false
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Text form of a value as emitted into output
pub(crate) fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}
