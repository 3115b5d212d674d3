//! Image link properties: `width=200, align=right, frame`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Property keys understood by preview renderers
pub const KNOWN_KEYS: [&str; 6] = ["width", "height", "align", "float", "alt", "frame"];

/// Parsed `key=value` list of a gollum image link
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageProperties {
    entries: BTreeMap<String, String>,
}

impl ImageProperties {
    /// Parse a comma- (or pipe-) separated property list.
    ///
    /// Entries and values are trimmed, keys lower-cased; a bare key maps to
    /// an empty value. Later duplicates win.
    ///
    /// ```
    /// use linkweave_parser::ImageProperties;
    ///
    /// let props = ImageProperties::parse("width=200, align=right");
    /// assert_eq!(props.width(), Some("200"));
    /// assert_eq!(props.align(), Some("right"));
    /// ```
    pub fn parse(raw: &str) -> Self {
        let mut entries = BTreeMap::new();
        for entry in raw.split([',', '|']) {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            let (key, value) = entry.split_once('=').unwrap_or((entry, ""));
            let key = key.trim().to_ascii_lowercase();
            if key.is_empty() {
                continue;
            }
            if !KNOWN_KEYS.contains(&key.as_str()) {
                log::debug!("Unknown image property '{}' kept verbatim", key);
            }
            entries.insert(key, unquote(value.trim()).to_string());
        }
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn width(&self) -> Option<&str> {
        self.get("width")
    }

    pub fn height(&self) -> Option<&str> {
        self.get("height")
    }

    pub fn align(&self) -> Option<&str> {
        self.get("align")
    }

    pub fn alt(&self) -> Option<&str> {
        self.get("alt")
    }

    /// `float` or `float=left`; the value is empty for the bare flag
    pub fn float(&self) -> Option<&str> {
        self.get("float")
    }

    /// `frame` or `frame=<style>`; the value is empty for the bare flag
    pub fn frame(&self) -> Option<&str> {
        self.get("frame")
    }

    /// CSS class for a flag-or-value property: `key` or `key-value`
    pub fn flag_class(&self, key: &str) -> Option<String> {
        self.get(key).map(|value| match value {
            "" => key.to_string(),
            value => format!("{}-{}", key, value),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterate `(key, value)` pairs in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}
