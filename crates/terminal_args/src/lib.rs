//! Argument tokenizer for terminal commands.
//!
//! The dispatcher hands every command its arguments as one string. Commands that need an argument
//! vector use this crate: whitespace splitting with quoting/escaping, plus a small flag parser.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tokenizer error for malformed argument strings.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct ArgsError {
    /// Human-readable message.
    pub message: String,
}

impl ArgsError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// One parsed `--name[=value]` or `-n` flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flag {
    /// Flag name without leading dashes.
    pub name: String,
    /// Inline value from `--name=value`.
    pub value: Option<String>,
}

/// Positional arguments and flags of one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParsedArgs {
    /// Non-flag tokens in order.
    pub positionals: Vec<String>,
    /// Flags in order of appearance.
    pub flags: Vec<Flag>,
}

impl ParsedArgs {
    /// Tokenizes `args` and separates flags from positionals.
    ///
    /// A bare `--` ends flag parsing; everything after it is positional.
    pub fn parse(args: &str) -> Result<Self, ArgsError> {
        let mut parsed = Self::default();
        let mut flags_done = false;

        for token in split_args(args)? {
            if flags_done {
                parsed.positionals.push(token);
                continue;
            }
            if token == "--" {
                flags_done = true;
                continue;
            }
            if let Some(rest) = token.strip_prefix("--") {
                let (name, value) = match rest.split_once('=') {
                    Some((name, value)) => (name.to_string(), Some(value.to_string())),
                    None => (rest.to_string(), None),
                };
                parsed.flags.push(Flag { name, value });
                continue;
            }
            if token.len() > 1 && token.starts_with('-') {
                for short in token.chars().skip(1) {
                    parsed.flags.push(Flag {
                        name: short.to_string(),
                        value: None,
                    });
                }
                continue;
            }
            parsed.positionals.push(token);
        }

        Ok(parsed)
    }

    /// Returns the positional at `index`.
    pub fn positional(&self, index: usize) -> Option<&str> {
        self.positionals.get(index).map(String::as_str)
    }

    /// Returns whether any flag named `name` is present.
    pub fn has_flag(&self, name: &str) -> bool {
        self.flags.iter().any(|flag| flag.name == name)
    }

    /// Returns the inline value of the last flag named `name`.
    pub fn flag_value(&self, name: &str) -> Option<&str> {
        self.flags
            .iter()
            .rev()
            .find(|flag| flag.name == name)
            .and_then(|flag| flag.value.as_deref())
    }

    /// Returns whether no positionals and no flags were given.
    pub fn is_empty(&self) -> bool {
        self.positionals.is_empty() && self.flags.is_empty()
    }
}

/// Splits an argument string on whitespace, honoring quotes and backslash escapes.
pub fn split_args(line: &str) -> Result<Vec<String>, ArgsError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut chars = line.chars();
    let mut quote = None::<char>;

    while let Some(ch) = chars.next() {
        match quote {
            Some(active) if ch == active => quote = None,
            Some('"') if ch == '\\' => {
                let Some(next) = chars.next() else {
                    return Err(ArgsError::new("dangling escape sequence"));
                };
                current.push(next);
            }
            Some(_) => current.push(ch),
            None if ch == '"' || ch == '\'' => {
                quote = Some(ch);
                in_token = true;
            }
            None if ch.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            None if ch == '\\' => {
                let Some(next) = chars.next() else {
                    return Err(ArgsError::new("dangling escape sequence"));
                };
                current.push(next);
                in_token = true;
            }
            None => {
                current.push(ch);
                in_token = true;
            }
        }
    }

    if quote.is_some() {
        return Err(ArgsError::new("unterminated quoted string"));
    }

    if in_token {
        tokens.push(current);
    }

    Ok(tokens)
}
