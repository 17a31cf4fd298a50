//! Override argument parsing.

use std::collections::BTreeMap;
use thiserror::Error;

/// Separator between a query key and its value.
const QUERY_SEPARATOR: &str = "? ";
/// Separator between a header name and its value.
const HEADER_SEPARATOR: &str = ": ";

/// Errors produced while parsing override arguments.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OverrideError {
    /// The first word of the argument ends in neither '?' nor ':'.
    #[error("header/query substitutions must have the first word end in '?' or ':' (got {0:?})")]
    MissingSuffix(String),
}

/// A single caller-supplied substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Override {
    /// `name: value` replaces every value of the header `name`.
    Header { key: String, value: String },
    /// `name? value` replaces every value of the query parameter `name`.
    Query { key: String, value: String },
}

/// Parse one override argument.
///
/// The first whitespace-delimited word selects the kind: a trailing `?` makes a
/// query override, a trailing `:` a header override. The key is that word without
/// its suffix; the value is everything after the first `"? "` / `": "`.
pub fn parse_override(arg: &str) -> Result<Override, OverrideError> {
    let trimmed = arg.trim_start();
    let token_end = trimmed
        .find(char::is_whitespace)
        .unwrap_or(trimmed.len());
    let (token, rest) = trimmed.split_at(token_end);

    if let Some(key) = token.strip_suffix('?') {
        return Ok(Override::Query {
            key: key.to_string(),
            value: split_value(rest, QUERY_SEPARATOR),
        });
    }

    if let Some(key) = token.strip_suffix(':') {
        return Ok(Override::Header {
            key: key.to_string(),
            value: split_value(rest, HEADER_SEPARATOR),
        });
    }

    Err(OverrideError::MissingSuffix(arg.to_string()))
}

/// Extract the value following the token.
///
/// `rest` starts right after the token's suffix character, so the separator's
/// space is its first byte in the common case.
fn split_value(rest: &str, separator: &str) -> String {
    let space = &separator[1..];
    match rest.strip_prefix(space) {
        Some(value) => value.to_string(),
        // Token followed by a tab or similar, or no value at all.
        None => rest.trim_start().to_string(),
    }
}

/// Header and query overrides for one invocation.
///
/// Both mappings are built by plain `insert`, so when a key repeats the later
/// argument replaces the earlier one. Headers and queries are separate
/// namespaces: `a: 1` and `a? 2` never collide.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideSet {
    headers: BTreeMap<String, String>,
    queries: BTreeMap<String, String>,
}

impl OverrideSet {
    /// Parse every argument, failing on the first malformed one.
    pub fn from_args<I, S>(args: I) -> Result<Self, OverrideError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::default();
        for arg in args {
            set.push(parse_override(arg.as_ref())?);
        }
        Ok(set)
    }

    /// Record one override. Last write wins.
    pub fn push(&mut self, item: Override) {
        match item {
            Override::Header { key, value } => {
                self.headers.insert(key, value);
            }
            Override::Query { key, value } => {
                self.queries.insert(key, value);
            }
        }
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn queries(&self) -> &BTreeMap<String, String> {
        &self.queries
    }
}
