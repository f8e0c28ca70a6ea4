//! Property Path Module
//!
//! Parses path locators like `a.b[0].c` or `address.state['long-code']` and
//! resolves them against a JSON tree without ever failing on missing parts.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

// == Prop Path ==
/// A parsed property path.
///
/// Brackets become separators and every quote flavor is dropped, so
/// `a["b"][0]`, `a['b'].0` and `a.b.0` are the same path. Empty segments are
/// kept and look up the `""` key, so `""` and `a..b` are usually absent.
///
/// Quoted keys cannot contain `.`, `[` or `]`: `a["b.c"]` is `a.b.c`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropPath {
    segments: Vec<String>,
}

impl PropPath {
    // == Parse ==
    /// Parses a path locator. Parsing never fails.
    pub fn parse(path: &str) -> Self {
        let normalized: String = path
            .chars()
            .filter_map(|c| match c {
                '[' => Some('.'),
                ']' | '"' | '\'' | '`' => None,
                other => Some(other),
            })
            .collect();

        let segments = normalized
            .split('.')
            .map(str::to_string)
            .collect();

        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    // == Resolve ==
    /// Walks the path from `root`.
    ///
    /// Returns None when a segment is missing, indexes past the end of an
    /// array, or descends into a scalar. A `null` met before the last segment
    /// resolves to that `null`.
    pub fn resolve<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        let mut current = root;

        for segment in &self.segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => segment
                    .parse::<usize>()
                    .ok()
                    .and_then(|index| items.get(index))?,
                Value::Null => return Some(current),
                _ => return None,
            };
        }

        Some(current)
    }
}

impl FromStr for PropPath {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for PropPath {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}

impl fmt::Display for PropPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}
