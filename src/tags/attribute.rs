//! Attribute tag grammar: `key:value;flag;key:value`

use std::collections::BTreeMap;

/// Separator between segments, and between accumulated values of a repeated key.
pub const MULTI_VALUE_SEPARATOR: char = ';';

/// Parsed attribute tag.
///
/// Flags are stored with an empty value. A key given more than once keeps all
/// its non-empty values joined by [`MULTI_VALUE_SEPARATOR`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeSet {
    entries: BTreeMap<String, String>,
}

impl AttributeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse one raw attribute tag. Never fails: the grammar is open, and
    /// semantic problems are reported later by [`super::rules`].
    pub fn parse(raw: &str) -> Self {
        let mut set = Self::new();
        for segment in raw.split(MULTI_VALUE_SEPARATOR) {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            match segment.split_once(':') {
                Some((key, value)) => set.insert(key.trim(), value.trim()),
                None => set.insert(segment, ""),
            }
        }
        set
    }

    /// Insert a value, accumulating onto any existing value for `key`.
    pub fn insert(&mut self, key: &str, value: &str) {
        match self.entries.get_mut(key) {
            Some(existing) => {
                if existing.is_empty() {
                    *existing = value.to_string();
                } else if !value.is_empty() {
                    existing.push(MULTI_VALUE_SEPARATOR);
                    existing.push_str(value);
                }
            }
            None => {
                self.entries.insert(key.to_string(), value.to_string());
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Value for `key` if present and non-empty.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    pub fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Individual values of a possibly repeated key.
    pub fn values<'a>(&'a self, key: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.get(key)
            .unwrap_or_default()
            .split(MULTI_VALUE_SEPARATOR)
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
