//! Route-style path patterns compiled to `regex`.
//!
//! Syntax:
//! - literal text matches itself (`\` escapes the next character);
//! - `:name` matches one non-empty segment;
//! - `:name(<regex>)` replaces the segment expression;
//! - a trailing `?` makes the parameter optional, `*` matches zero or more
//!   segments and `+` one or more. When a parameter follows a `/`, the slash
//!   belongs to the parameter, so `/items/:id?` also matches `/items`.
//!
//! Captured text is percent-decoded. Optional parameters that did not match
//! are absent from the result.
use std::collections::HashSet;

use indexmap::IndexMap;
use regex::Regex;

use crate::error::PatternError;

use super::{Params, PathMatcher};

const DEFAULT_SEGMENT: &str = "[^/#?]+?";

/// Matching options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteOptions {
    /// Match letter case exactly.
    pub sensitive: bool,
    /// Require the trailing slash to match exactly.
    pub strict: bool,
    /// Anchor at the end of the path (otherwise prefixes match).
    pub end: bool,
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self { sensitive: false, strict: false, end: true }
    }
}

impl RouteOptions {
    pub fn sensitive(mut self, yes: bool) -> Self {
        self.sensitive = yes;
        self
    }

    pub fn strict(mut self, yes: bool) -> Self {
        self.strict = yes;
        self
    }

    pub fn end(mut self, yes: bool) -> Self {
        self.end = yes;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Modifier {
    One,
    Optional,
    ZeroOrMore,
    OneOrMore,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Text(String),
    Param {
        name: String,
        prefix: String,
        segment: String,
        modifier: Modifier,
    },
}

/// A compiled route pattern.
#[derive(Debug, Clone)]
pub struct RoutePattern {
    source: String,
    regex: Regex,
    /// Capture group name → parameter name, in declaration order.
    groups: Vec<(String, String)>,
}

impl RoutePattern {
    pub fn compile(source: &str, options: RouteOptions) -> Result<Self, PatternError> {
        let tokens = tokenize(source)?;
        let mut groups = Vec::new();
        let mut body = String::new();
        let mut trailing_slash = false;

        let last = tokens.len().saturating_sub(1);
        for (index, token) in tokens.iter().enumerate() {
            match token {
                Token::Text(text) => {
                    let mut text = text.as_str();
                    if index == last && !options.strict && text.len() > 1 && text.ends_with('/') {
                        text = &text[..text.len() - 1];
                    }
                    trailing_slash = text.ends_with('/');
                    body.push_str(&regex::escape(text));
                }
                Token::Param { name, prefix, segment, modifier } => {
                    let group = format!("p{}", groups.len());
                    let prefix = regex::escape(prefix);
                    let piece = match modifier {
                        Modifier::One => format!("{prefix}(?P<{group}>{segment})"),
                        Modifier::Optional => format!("(?:{prefix}(?P<{group}>{segment}))?"),
                        Modifier::OneOrMore => format!(
                            "{prefix}(?P<{group}>(?:{segment})(?:{prefix}(?:{segment}))*)"
                        ),
                        Modifier::ZeroOrMore => format!(
                            "(?:{prefix}(?P<{group}>(?:{segment})(?:{prefix}(?:{segment}))*))?"
                        ),
                    };
                    body.push_str(&piece);
                    groups.push((group, name.clone()));
                    trailing_slash = false;
                }
            }
        }

        let mut expr = String::new();
        if !options.sensitive {
            expr.push_str("(?i)");
        }
        expr.push('^');
        expr.push_str(&body);
        match (options.end, options.strict) {
            (true, true) => expr.push('$'),
            (true, false) if trailing_slash => expr.push('$'),
            (true, false) => expr.push_str("/?$"),
            (false, _) if trailing_slash => {}
            (false, _) => expr.push_str("(?:/|$)"),
        }

        let regex = Regex::new(&expr).map_err(|error| PatternError::Regex {
            pattern: source.to_string(),
            reason: error.to_string(),
        })?;
        tracing::debug!(pattern = source, regex = %regex, "compiled route pattern");
        Ok(Self { source: source.to_string(), regex, groups })
    }

    /// Parameter names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(_, name)| name.as_str())
    }
}

impl PathMatcher for RoutePattern {
    fn source(&self) -> &str {
        &self.source
    }

    fn matches(&self, path: &str) -> Option<Params> {
        let captures = self.regex.captures(path)?;
        let mut params = IndexMap::with_capacity(self.groups.len());
        for (group, name) in &self.groups {
            if let Some(found) = captures.name(group) {
                params.insert(name.clone(), decode(found.as_str()));
            }
        }
        Some(params)
    }
}

fn decode(raw: &str) -> String {
    match urlencoding::decode(raw) {
        Ok(text) => text.into_owned(),
        Err(_) => raw.to_string(),
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TOKENIZER
// ————————————————————————————————————————————————————————————————————————————

fn tokenize(source: &str) -> Result<Vec<Token>, PatternError> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut text = String::new();
    let mut seen = HashSet::new();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '\\' if i + 1 < chars.len() => {
                text.push(chars[i + 1]);
                i += 2;
            }
            ':' => {
                let start = i;
                i += 1;
                let mut name = String::new();
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    name.push(chars[i]);
                    i += 1;
                }
                if name.is_empty() {
                    return Err(PatternError::MissingName {
                        pattern: source.to_string(),
                        offset: start,
                    });
                }
                if !seen.insert(name.clone()) {
                    return Err(PatternError::DuplicateName {
                        pattern: source.to_string(),
                        name,
                    });
                }

                let mut segment = DEFAULT_SEGMENT.to_string();
                if i < chars.len() && chars[i] == '(' {
                    let (custom, next) = group(source, &chars, i)?;
                    segment = custom;
                    i = next;
                }

                let modifier = match chars.get(i) {
                    Some('?') => Modifier::Optional,
                    Some('*') => Modifier::ZeroOrMore,
                    Some('+') => Modifier::OneOrMore,
                    _ => Modifier::One,
                };
                if modifier != Modifier::One {
                    i += 1;
                }

                let prefix = if text.ends_with('/') {
                    text.pop();
                    "/".to_string()
                } else {
                    String::new()
                };
                if !text.is_empty() {
                    tokens.push(Token::Text(std::mem::take(&mut text)));
                }
                tokens.push(Token::Param { name, prefix, segment, modifier });
            }
            c => {
                text.push(c);
                i += 1;
            }
        }
    }
    if !text.is_empty() {
        tokens.push(Token::Text(text));
    }
    Ok(tokens)
}

/// Read a balanced `( ... )` starting at `open`; returns the inner text and
/// the index after the closing paren.
fn group(source: &str, chars: &[char], open: usize) -> Result<(String, usize), PatternError> {
    let mut depth = 0usize;
    let mut inner = String::new();
    let mut i = open;
    while i < chars.len() {
        let c = chars[i];
        match c {
            '\\' if i + 1 < chars.len() => {
                inner.push(c);
                inner.push(chars[i + 1]);
                i += 2;
                continue;
            }
            '(' => {
                depth += 1;
                if depth > 1 {
                    inner.push(c);
                }
            }
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Ok((inner, i + 1));
                }
                inner.push(c);
            }
            _ => inner.push(c),
        }
        i += 1;
    }
    Err(PatternError::Unbalanced {
        pattern: source.to_string(),
        offset: open,
    })
}
