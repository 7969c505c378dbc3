//! Builds the node tree from lexer tokens

use serde_json::Value;
use tidings_core::TemplateError;

use super::filters::is_known_filter;
use super::lexer::Token;

/// A compiled template node
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node {
    Text(String),
    Output(Expr),
    If {
        branches: Vec<(Expr, Vec<Node>)>,
        otherwise: Vec<Node>,
    },
    For {
        variable: String,
        iterable: Expr,
        body: Vec<Node>,
    },
}

/// A template expression
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    Literal(Value),
    Path(Vec<String>),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Eq(Box<Expr>, Box<Expr>),
    Ne(Box<Expr>, Box<Expr>),
    Filter {
        input: Box<Expr>,
        name: String,
        args: Vec<(String, Expr)>,
    },
}

/// Parse a token stream into nodes
pub(crate) fn parse(name: &str, tokens: Vec<Token>) -> Result<Vec<Node>, TemplateError> {
    let mut parser = BlockParser {
        name,
        tokens: tokens.into_iter(),
    };
    let (nodes, _) = parser.parse_nodes(&[], None)?;
    Ok(nodes)
}

/// A block-closing tag encountered while parsing a body
struct Terminator {
    keyword: String,
    rest: String,
    fragment: String,
}

struct BlockParser<'a> {
    name: &'a str,
    tokens: std::vec::IntoIter<Token>,
}

impl BlockParser<'_> {
    fn parse_nodes(
        &mut self,
        terminators: &[&str],
        opening: Option<&str>,
    ) -> Result<(Vec<Node>, Option<Terminator>), TemplateError> {
        let mut nodes = Vec::new();

        while let Some(token) = self.tokens.next() {
            match token {
                Token::Text(text) => nodes.push(Node::Text(text)),
                Token::Expression { source, fragment } => {
                    nodes.push(Node::Output(parse_expression(self.name, &source, &fragment)?));
                }
                Token::Tag { source, fragment } => {
                    let (keyword, rest) = match source.split_once(char::is_whitespace) {
                        Some((keyword, rest)) => (keyword.to_string(), rest.trim().to_string()),
                        None => (source.clone(), String::new()),
                    };

                    match keyword.as_str() {
                        "if" => nodes.push(self.parse_if(&rest, &fragment)?),
                        "for" => nodes.push(self.parse_for(&rest, &fragment)?),
                        kw if terminators.contains(&kw) => {
                            return Ok((
                                nodes,
                                Some(Terminator {
                                    keyword: kw.to_string(),
                                    rest,
                                    fragment,
                                }),
                            ));
                        }
                        "elif" | "else" | "endif" | "endfor" => {
                            return Err(TemplateError::syntax(
                                self.name,
                                format!("unexpected `{}`", keyword),
                                &fragment,
                            ));
                        }
                        _ => {
                            return Err(TemplateError::syntax(
                                self.name,
                                format!("unknown tag `{}`", keyword),
                                &fragment,
                            ));
                        }
                    }
                }
            }
        }

        match opening {
            Some(fragment) => Err(TemplateError::syntax(
                self.name,
                format!("unclosed block, expected `{}`", terminators.join("` or `")),
                fragment,
            )),
            None => Ok((nodes, None)),
        }
    }

    fn parse_if(&mut self, condition: &str, fragment: &str) -> Result<Node, TemplateError> {
        let mut branches = Vec::new();
        let mut condition = parse_expression(self.name, condition, fragment)?;

        loop {
            let (body, terminator) =
                self.parse_nodes(&["elif", "else", "endif"], Some(fragment))?;
            let Some(terminator) = terminator else {
                return Err(TemplateError::syntax(self.name, "unclosed `if`", fragment));
            };
            branches.push((condition, body));

            match terminator.keyword.as_str() {
                "elif" => {
                    condition =
                        parse_expression(self.name, &terminator.rest, &terminator.fragment)?;
                }
                "else" => {
                    let (otherwise, _) = self.parse_nodes(&["endif"], Some(fragment))?;
                    return Ok(Node::If {
                        branches,
                        otherwise,
                    });
                }
                _ => {
                    return Ok(Node::If {
                        branches,
                        otherwise: Vec::new(),
                    });
                }
            }
        }
    }

    fn parse_for(&mut self, header: &str, fragment: &str) -> Result<Node, TemplateError> {
        let mut tokens = lex_expression(self.name, header, fragment)?;
        let variable = match (tokens.first(), tokens.get(1)) {
            (Some(ExprToken::Ident(variable)), Some(ExprToken::Ident(kw))) if kw == "in" => {
                variable.clone()
            }
            _ => {
                return Err(TemplateError::syntax(
                    self.name,
                    "expected `for <name> in <expression>`",
                    fragment,
                ))
            }
        };
        tokens.drain(..2);

        let iterable = ExprParser::new(self.name, fragment, tokens).parse_all()?;
        let (body, _) = self.parse_nodes(&["endfor"], Some(fragment))?;

        Ok(Node::For {
            variable,
            iterable,
            body,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
enum ExprToken {
    Ident(String),
    Str(String),
    Num(Value),
    Dot,
    Pipe,
    LParen,
    RParen,
    Comma,
    Assign,
    EqEq,
    NotEq,
}

/// Parse a standalone expression
pub(crate) fn parse_expression(
    name: &str,
    source: &str,
    fragment: &str,
) -> Result<Expr, TemplateError> {
    let tokens = lex_expression(name, source, fragment)?;
    ExprParser::new(name, fragment, tokens).parse_all()
}

fn lex_expression(name: &str, source: &str, fragment: &str) -> Result<Vec<ExprToken>, TemplateError> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some(&(i, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '.' => {
                chars.next();
                tokens.push(ExprToken::Dot);
            }
            '|' => {
                chars.next();
                tokens.push(ExprToken::Pipe);
            }
            '(' => {
                chars.next();
                tokens.push(ExprToken::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(ExprToken::RParen);
            }
            ',' => {
                chars.next();
                tokens.push(ExprToken::Comma);
            }
            '=' | '!' => {
                chars.next();
                match chars.peek() {
                    Some(&(_, '=')) => {
                        chars.next();
                        tokens.push(if c == '=' {
                            ExprToken::EqEq
                        } else {
                            ExprToken::NotEq
                        });
                    }
                    _ if c == '=' => tokens.push(ExprToken::Assign),
                    _ => return Err(TemplateError::syntax(name, "unexpected `!`", fragment)),
                }
            }
            '"' | '\'' => {
                chars.next();
                let mut literal = String::new();
                let mut closed = false;
                for (_, ch) in chars.by_ref() {
                    if ch == c {
                        closed = true;
                        break;
                    }
                    literal.push(ch);
                }
                if !closed {
                    return Err(TemplateError::syntax(name, "unterminated string", fragment));
                }
                tokens.push(ExprToken::Str(literal));
            }
            c if c.is_ascii_digit() => {
                // After `.` a number is an index segment, never a float
                let fractional = !matches!(tokens.last(), Some(ExprToken::Dot));
                let mut end = i;
                while let Some(&(j, d)) = chars.peek() {
                    if d.is_ascii_digit() || (fractional && d == '.') {
                        end = j + d.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                let literal = &source[i..end];
                let number = if let Ok(n) = literal.parse::<i64>() {
                    Value::from(n)
                } else {
                    literal
                        .parse::<f64>()
                        .ok()
                        .and_then(serde_json::Number::from_f64)
                        .map(Value::Number)
                        .ok_or_else(|| {
                            TemplateError::syntax(name, format!("invalid number `{literal}`"), fragment)
                        })?
                };
                tokens.push(ExprToken::Num(number));
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut ident = String::new();
                while let Some(&(_, d)) = chars.peek() {
                    if d.is_alphanumeric() || d == '_' {
                        ident.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(ExprToken::Ident(ident));
            }
            other => {
                return Err(TemplateError::syntax(
                    name,
                    format!("unexpected character `{other}`"),
                    fragment,
                ));
            }
        }
    }

    Ok(tokens)
}

struct ExprParser<'a> {
    name: &'a str,
    fragment: &'a str,
    tokens: Vec<ExprToken>,
    pos: usize,
}

impl<'a> ExprParser<'a> {
    fn new(name: &'a str, fragment: &'a str, tokens: Vec<ExprToken>) -> Self {
        Self {
            name,
            fragment,
            tokens,
            pos: 0,
        }
    }

    fn error(&self, message: impl Into<String>) -> TemplateError {
        TemplateError::syntax(self.name, message, self.fragment)
    }

    fn peek(&self) -> Option<&ExprToken> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<ExprToken> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(ExprToken::Ident(ident)) if ident == keyword)
    }

    fn expect(&mut self, expected: ExprToken) -> Result<(), TemplateError> {
        match self.next() {
            Some(token) if token == expected => Ok(()),
            _ => Err(self.error(format!("expected {expected:?}"))),
        }
    }

    fn parse_all(mut self) -> Result<Expr, TemplateError> {
        if self.tokens.is_empty() {
            return Err(self.error("empty expression"));
        }
        let expr = self.parse_or()?;
        if self.pos < self.tokens.len() {
            return Err(self.error("unexpected trailing input"));
        }
        Ok(expr)
    }

    fn parse_or(&mut self) -> Result<Expr, TemplateError> {
        let mut left = self.parse_and()?;
        while self.peek_keyword("or") {
            self.pos += 1;
            let right = self.parse_and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, TemplateError> {
        let mut left = self.parse_not()?;
        while self.peek_keyword("and") {
            self.pos += 1;
            let right = self.parse_not()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expr, TemplateError> {
        if self.peek_keyword("not") {
            self.pos += 1;
            return Ok(Expr::Not(Box::new(self.parse_not()?)));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr, TemplateError> {
        let left = self.parse_filtered()?;
        match self.peek() {
            Some(ExprToken::EqEq) => {
                self.pos += 1;
                let right = self.parse_filtered()?;
                Ok(Expr::Eq(Box::new(left), Box::new(right)))
            }
            Some(ExprToken::NotEq) => {
                self.pos += 1;
                let right = self.parse_filtered()?;
                Ok(Expr::Ne(Box::new(left), Box::new(right)))
            }
            _ => Ok(left),
        }
    }

    fn parse_filtered(&mut self) -> Result<Expr, TemplateError> {
        let mut expr = self.parse_primary()?;

        while matches!(self.peek(), Some(ExprToken::Pipe)) {
            self.pos += 1;
            let name = match self.next() {
                Some(ExprToken::Ident(name)) => name,
                _ => return Err(self.error("expected filter name after `|`")),
            };
            if !is_known_filter(&name) {
                return Err(self.error(format!("unknown filter `{name}`")));
            }

            let mut args = Vec::new();
            if matches!(self.peek(), Some(ExprToken::LParen)) {
                self.pos += 1;
                while !matches!(self.peek(), Some(ExprToken::RParen)) {
                    let arg = match self.next() {
                        Some(ExprToken::Ident(arg)) => arg,
                        _ => return Err(self.error("expected named filter argument")),
                    };
                    self.expect(ExprToken::Assign)?;
                    args.push((arg, self.parse_or()?));
                    if matches!(self.peek(), Some(ExprToken::Comma)) {
                        self.pos += 1;
                    } else if !matches!(self.peek(), Some(ExprToken::RParen)) {
                        return Err(self.error("expected `,` or `)` in filter arguments"));
                    }
                }
                self.expect(ExprToken::RParen)?;
            }

            expr = Expr::Filter {
                input: Box::new(expr),
                name,
                args,
            };
        }

        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, TemplateError> {
        match self.next() {
            Some(ExprToken::Str(s)) => Ok(Expr::Literal(Value::String(s))),
            Some(ExprToken::Num(n)) => Ok(Expr::Literal(n)),
            Some(ExprToken::LParen) => {
                let expr = self.parse_or()?;
                self.expect(ExprToken::RParen)?;
                Ok(expr)
            }
            Some(ExprToken::Ident(ident)) => match ident.as_str() {
                "true" => Ok(Expr::Literal(Value::Bool(true))),
                "false" => Ok(Expr::Literal(Value::Bool(false))),
                "none" | "null" => Ok(Expr::Literal(Value::Null)),
                "and" | "or" | "not" => Err(self.error(format!("unexpected `{ident}`"))),
                _ => {
                    let mut path = vec![ident];
                    while matches!(self.peek(), Some(ExprToken::Dot)) {
                        self.pos += 1;
                        match self.next() {
                            Some(ExprToken::Ident(segment)) => path.push(segment),
                            Some(ExprToken::Num(Value::Number(n))) if n.is_u64() => {
                                path.push(n.to_string())
                            }
                            _ => return Err(self.error("expected attribute after `.`")),
                        }
                    }
                    Ok(Expr::Path(path))
                }
            },
            Some(other) => Err(self.error(format!("unexpected {other:?}"))),
            None => Err(self.error("unexpected end of expression")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::lexer::tokenize;

    fn compile(source: &str) -> Result<Vec<Node>, TemplateError> {
        parse("test", tokenize("test", source)?)
    }

    fn path(segments: &[&str]) -> Expr {
        Expr::Path(segments.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_parse_path() {
        let expr = parse_expression("t", "commit.id", "").unwrap();
        assert_eq!(expr, path(&["commit", "id"]));
    }

    #[test]
    fn test_parse_index_segment() {
        let expr = parse_expression("t", "commits.0.id", "").unwrap();
        assert_eq!(expr, path(&["commits", "0", "id"]));
    }

    #[test]
    fn test_parse_filter_chain() {
        let expr =
            parse_expression("t", r#"commit.id | truncate(length=7, end="") | upper"#, "").unwrap();
        match expr {
            Expr::Filter { name, input, .. } => {
                assert_eq!(name, "upper");
                assert!(matches!(*input, Expr::Filter { ref name, ref args, .. } if name == "truncate" && args.len() == 2));
            }
            other => panic!("unexpected expr: {other:?}"),
        }
    }

    #[test]
    fn test_parse_boolean_precedence() {
        let expr = parse_expression("t", "not a and b or c", "").unwrap();
        assert!(matches!(expr, Expr::Or(..)));
    }

    #[test]
    fn test_parse_comparison() {
        let expr = parse_expression("t", r#"group.name == "Features""#, "").unwrap();
        assert!(matches!(expr, Expr::Eq(..)));
    }

    #[test]
    fn test_unknown_filter_rejected() {
        let err = parse_expression("t", "x | shout", "{{ x | shout }}").unwrap_err();
        assert!(err.to_string().contains("unknown filter"));
    }

    #[test]
    fn test_parse_if_elif_else() {
        let nodes = compile("{% if a %}A{% elif b %}B{% else %}C{% endif %}").unwrap();
        match &nodes[0] {
            Node::If {
                branches,
                otherwise,
            } => {
                assert_eq!(branches.len(), 2);
                assert_eq!(otherwise, &vec![Node::Text("C".to_string())]);
            }
            other => panic!("unexpected node: {other:?}"),
        }
    }

    #[test]
    fn test_parse_for() {
        let nodes = compile("{% for c in commits %}{{ c.message }}{% endfor %}").unwrap();
        assert!(matches!(&nodes[0], Node::For { variable, .. } if variable == "c"));
    }

    #[test]
    fn test_unclosed_if() {
        let err = compile("{% if version %}release").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("unclosed"));
        assert!(msg.contains("{% if version %}"));
    }

    #[test]
    fn test_stray_endfor() {
        assert!(compile("text{% endfor %}").is_err());
    }

    #[test]
    fn test_malformed_for() {
        assert!(compile("{% for commits %}{% endfor %}").is_err());
    }

    #[test]
    fn test_unknown_tag() {
        let err = compile("{% macro x %}").unwrap_err();
        assert!(err.to_string().contains("unknown tag"));
    }

    #[test]
    fn test_empty_expression() {
        assert!(compile("{{ }}").is_err());
    }
}
