//! Front-matter parsing
//!
//! Posts carry a flat `key: value` header between two `---` lines. Values are
//! plain strings, optionally quoted, or bracketed comma lists. Parsing never
//! fails: anything that does not look like a header block is body text.

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref FRONT_MATTER_RE: Regex =
        Regex::new(r"^---\s*\r?\n([\s\S]*?)\r?\n---[ \t]*(?:\s*\r?\n([\s\S]*))?$")
            .expect("front-matter regex is valid");
}

/// A single front-matter value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FrontValue {
    Text(String),
    List(Vec<String>),
}

impl FrontValue {
    /// Parse the raw right-hand side of a `key: value` line
    fn parse(raw: &str) -> Self {
        let mut value = raw.trim();

        if value.len() >= 2
            && ((value.starts_with('"') && value.ends_with('"'))
                || (value.starts_with('\'') && value.ends_with('\'')))
        {
            value = &value[1..value.len() - 1];
        }

        if value.starts_with('[') && value.ends_with(']') {
            let items = value[1..value.len() - 1]
                .split(',')
                .map(|item| item.trim().replace(['\'', '"'], ""))
                .filter(|item| !item.is_empty())
                .collect();
            return FrontValue::List(items);
        }

        FrontValue::Text(value.to_string())
    }

    /// Borrow as text, if this is a scalar
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FrontValue::Text(s) => Some(s),
            FrontValue::List(_) => None,
        }
    }
}

/// Front-matter data from a post
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrontMatter {
    fields: IndexMap<String, FrontValue>,
}

impl FrontMatter {
    /// Parse front-matter from content string
    /// Returns (front_matter, body)
    pub fn parse(content: &str) -> (Self, &str) {
        let Some(caps) = FRONT_MATTER_RE.captures(content) else {
            return (FrontMatter::default(), content);
        };

        let header = caps.get(1).map_or("", |m| m.as_str());
        let body = caps.get(2).map_or("", |m| m.as_str());

        let mut fields = IndexMap::new();
        for line in header.lines() {
            let Some(colon) = line.find(':') else {
                continue;
            };
            if colon == 0 {
                continue;
            }
            let key = line[..colon].trim();
            if key.is_empty() {
                continue;
            }
            fields.insert(key.to_string(), FrontValue::parse(&line[colon + 1..]));
        }

        (Self { fields }, body)
    }

    pub fn get(&self, key: &str) -> Option<&FrontValue> {
        self.fields.get(key)
    }

    /// Non-empty scalar value for `key`
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key)
            .and_then(FrontValue::as_text)
            .filter(|s| !s.is_empty())
    }

    /// List value for `key`; a scalar counts as a one-element list
    pub fn list(&self, key: &str) -> Vec<String> {
        match self.get(key) {
            Some(FrontValue::List(items)) => items.clone(),
            Some(FrontValue::Text(s)) if !s.is_empty() => vec![s.clone()],
            _ => Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FrontValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}
