use std::borrow::Cow;
use std::fmt::Write;
use std::str::FromStr;

use kinema_core::{KinemaError, Result};

/// One meaningful line of a text asset, split into tokens.
pub(super) struct Record {
    pub line: usize,
    pub tokens: Vec<String>,
}

impl Record {
    pub fn keyword(&self) -> &str {
        &self.tokens[0]
    }

    /// Fails unless the record has exactly `count` tokens after the keyword.
    pub fn expect_args(&self, count: usize) -> Result<()> {
        let found = self.tokens.len() - 1;
        if found == count {
            Ok(())
        } else {
            Err(KinemaError::parse(
                self.line,
                format!(
                    "'{}' expects {count} argument(s), found {found}",
                    self.keyword()
                ),
            ))
        }
    }

    pub fn str(&self, index: usize) -> &str {
        &self.tokens[index]
    }

    pub fn parse<T: FromStr>(&self, index: usize, what: &str) -> Result<T> {
        self.tokens[index].parse().map_err(|_| {
            KinemaError::parse(
                self.line,
                format!("invalid {what} '{}'", self.tokens[index]),
            )
        })
    }

    pub fn bool(&self, index: usize, what: &str) -> Result<bool> {
        match self.tokens[index].as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            other => Err(KinemaError::parse(
                self.line,
                format!("invalid {what} '{other}', expected true or false"),
            )),
        }
    }
}

/// Splits `text` into records, skipping blank and comment lines.
pub(super) fn records(text: &str) -> Result<Vec<Record>> {
    let mut out = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let tokens = split(trimmed).map_err(|message| KinemaError::parse(line, message))?;
        if !tokens.is_empty() {
            out.push(Record { line, tokens });
        }
    }
    Ok(out)
}

fn split(line: &str) -> std::result::Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        let mut token = String::new();
        if c == '"' {
            chars.next();
            let mut closed = false;
            while let Some(c) = chars.next() {
                match c {
                    '"' => {
                        closed = true;
                        break;
                    }
                    '\\' => match chars.next() {
                        Some(escaped) => token.push(escaped),
                        None => return Err("dangling escape".to_string()),
                    },
                    _ => token.push(c),
                }
            }
            if !closed {
                return Err("unterminated quoted token".to_string());
            }
        } else {
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() {
                    break;
                }
                token.push(c);
                chars.next();
            }
        }
        tokens.push(token);
    }
    Ok(tokens)
}

/// Quotes a token when splitting would not give it back unchanged.
pub(super) fn quote(token: &str) -> Cow<'_, str> {
    let needs_quotes = token.is_empty()
        || token
            .chars()
            .any(|c| c.is_whitespace() || c == '"' || c == '#' || c == '\\');
    if !needs_quotes {
        return Cow::Borrowed(token);
    }
    let mut out = String::with_capacity(token.len() + 2);
    out.push('"');
    for c in token.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    Cow::Owned(out)
}

/// Appends one record line.
pub(super) fn push_line(out: &mut String, parts: &[&str]) {
    let _ = writeln!(out, "{}", parts.join(" "));
}
