//! Catalog header storage.
//!
//! The header lives in the `msgstr` of the message with an empty `msgid`, as
//! RFC-822 style `Key: value` lines. Keys compare case-insensitively; when a
//! key repeats, lookups return the last value.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Error;

lazy_static! {
    static ref HEADER_LINE_REGEX: Regex = Regex::new(r"^([^\s:]+):[ \t]*(.*)$").unwrap();
}

/// Ordered, case-insensitive multimap of header fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<(String, String)>", into = "Vec<(String, String)>")]
pub struct Header {
    entries: Vec<(String, String)>,
    /// Folded key → index of the latest entry for that key.
    index: HashMap<String, usize>,
}

impl Header {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `Key: value` lines. Lines starting with whitespace continue the
    /// previous value; blank lines are skipped.
    pub fn parse(text: &str) -> Result<Self, Error> {
        let mut header = Header::new();

        for line in text.lines() {
            if line.trim().is_empty() {
                continue;
            }
            if line.starts_with([' ', '\t']) {
                let Some((_, value)) = header.entries.last_mut() else {
                    return Err(Error::HeaderParse(format!(
                        "continuation line without a field: `{}`",
                        line
                    )));
                };
                if !value.is_empty() {
                    value.push(' ');
                }
                value.push_str(line.trim());
                continue;
            }

            let caps = HEADER_LINE_REGEX.captures(line).ok_or_else(|| {
                Error::HeaderParse(format!("expected `Key: value`, found `{}`", line))
            })?;
            header.append(&caps[1], caps[2].trim_end());
        }

        Ok(header)
    }

    /// Adds a field, keeping any earlier values for the same key.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        self.index.insert(key.to_ascii_lowercase(), self.entries.len());
        self.entries.push((key, value.into()));
    }

    /// Replaces every value of `key` with a single one.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        self.remove(&key);
        self.append(key, value);
    }

    /// Removes every value stored under `key`.
    pub fn remove(&mut self, key: &str) {
        let folded = key.to_ascii_lowercase();
        if self.index.remove(&folded).is_none() {
            return;
        }
        self.entries.retain(|(k, _)| !k.eq_ignore_ascii_case(key));
        self.reindex();
    }

    /// Latest value stored for `key`, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.index
            .get(&key.to_ascii_lowercase())
            .map(|&i| self.entries[i].1.as_str())
    }

    /// All values stored for `key`, in insertion order.
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(&key.to_ascii_lowercase())
    }

    /// Distinct keys, spelled as first seen, in first-seen order.
    pub fn keys(&self) -> Vec<&str> {
        let mut seen = Vec::<&str>::new();
        for (key, _) in &self.entries {
            if !seen.iter().any(|s| s.eq_ignore_ascii_case(key)) {
                seen.push(key);
            }
        }
        seen
    }

    /// Every stored field in insertion order, duplicates included.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Renders the header as `msgstr` text: keys sorted, one `Key: value\n`
    /// line per key with its latest value.
    pub fn render(&self) -> String {
        let mut keys = self.keys();
        keys.sort_unstable();
        let mut out = String::new();
        for key in keys {
            out.push_str(key);
            out.push_str(": ");
            out.push_str(self.get(key).unwrap_or_default());
            out.push('\n');
        }
        out
    }

    fn reindex(&mut self) {
        self.index = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, (k, _))| (k.to_ascii_lowercase(), i))
            .collect();
    }
}

/// Headers are equal when they resolve every key to the same value; field
/// order and superseded duplicates are not significant.
impl PartialEq for Header {
    fn eq(&self, other: &Self) -> bool {
        self.index.len() == other.index.len()
            && self
                .index
                .keys()
                .all(|key| self.get(key) == other.get(key))
    }
}

impl Eq for Header {}

impl From<Vec<(String, String)>> for Header {
    fn from(entries: Vec<(String, String)>) -> Self {
        let mut header = Header {
            entries,
            index: HashMap::new(),
        };
        header.reindex();
        header
    }
}

impl From<Header> for Vec<(String, String)> {
    fn from(header: Header) -> Self {
        header.entries
    }
}
