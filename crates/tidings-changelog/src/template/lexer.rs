//! Splits template source into text and delimited tags

use tidings_core::TemplateError;

/// A raw template token
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    /// Literal text emitted verbatim
    Text(String),
    /// `{{ ... }}` contents
    Expression { source: String, fragment: String },
    /// `{% ... %}` contents
    Tag { source: String, fragment: String },
}

#[derive(Clone, Copy, PartialEq)]
enum Delimiter {
    Expression,
    Tag,
    Comment,
}

impl Delimiter {
    fn from_open(open: &str) -> Option<Self> {
        match open {
            "{{" => Some(Self::Expression),
            "{%" => Some(Self::Tag),
            "{#" => Some(Self::Comment),
            _ => None,
        }
    }

    fn close(self) -> &'static str {
        match self {
            Self::Expression => "}}",
            Self::Tag => "%}",
            Self::Comment => "#}",
        }
    }
}

/// Tokenize template source.
///
/// A single newline directly after a `{% %}` or `{# #}` delimiter is dropped.
/// A `-` just inside a delimiter strips all whitespace on that side.
pub(crate) fn tokenize(name: &str, source: &str) -> Result<Vec<Token>, TemplateError> {
    let mut tokens = Vec::new();
    let mut rest = source;
    let mut strip_next = false;
    let mut eat_newline = false;

    loop {
        let Some((start, delimiter)) = find_open(rest) else {
            push_text(&mut tokens, rest, strip_next, eat_newline, false);
            break;
        };

        let (text, opened) = rest.split_at(start);
        let body = &opened[2..];
        let strip_before = body.starts_with('-');
        push_text(&mut tokens, text, strip_next, eat_newline, strip_before);

        let end = find_close(body, delimiter)
            .ok_or_else(|| TemplateError::syntax(name, "unclosed delimiter", opened))?;
        let fragment = &opened[..end + 4];
        let mut inner = &body[..end];
        if strip_before {
            inner = &inner[1..];
        }
        let strip_after = inner.ends_with('-');
        if strip_after {
            inner = &inner[..inner.len() - 1];
        }

        match delimiter {
            Delimiter::Expression => tokens.push(Token::Expression {
                source: inner.trim().to_string(),
                fragment: fragment.to_string(),
            }),
            Delimiter::Tag => tokens.push(Token::Tag {
                source: inner.trim().to_string(),
                fragment: fragment.to_string(),
            }),
            Delimiter::Comment => {}
        }

        rest = &body[end + 2..];
        strip_next = strip_after;
        eat_newline = delimiter != Delimiter::Expression;
    }

    Ok(tokens)
}

fn push_text(
    tokens: &mut Vec<Token>,
    text: &str,
    strip_start: bool,
    eat_newline: bool,
    strip_end: bool,
) {
    let mut text = text;
    if strip_start {
        text = text.trim_start();
    } else if eat_newline {
        text = text
            .strip_prefix("\r\n")
            .or_else(|| text.strip_prefix('\n'))
            .unwrap_or(text);
    }
    if strip_end {
        text = text.trim_end();
    }
    if !text.is_empty() {
        tokens.push(Token::Text(text.to_string()));
    }
}

fn find_open(source: &str) -> Option<(usize, Delimiter)> {
    let mut offset = 0;
    while let Some(pos) = source[offset..].find('{') {
        let start = offset + pos;
        if let Some(delimiter) = source
            .get(start..start + 2)
            .and_then(Delimiter::from_open)
        {
            return Some((start, delimiter));
        }
        offset = start + 1;
    }
    None
}

/// Find the closing delimiter, ignoring anything inside string literals
fn find_close(body: &str, delimiter: Delimiter) -> Option<usize> {
    let close = delimiter.close();
    if delimiter == Delimiter::Comment {
        return body.find(close);
    }

    let mut quote: Option<char> = None;
    for (i, c) in body.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if body[i..].starts_with(close) => return Some(i),
            None => {}
        }
    }
    None
}
