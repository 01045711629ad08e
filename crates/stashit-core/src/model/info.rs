use crate::errors::{Result, StashError};
use serde::{Deserialize, Serialize};

/// Key under which the correlation token travels with a package
pub const EXTERNAL_IDENTIFIER: &str = "External-Identifier";
/// Key recording the payload size summary
pub const PAYLOAD_OXUM: &str = "Payload-Oxum";
/// Key recording the day a package was first built
pub const BAGGING_DATE: &str = "Bagging-Date";

/// Ordered descriptive-info map (key -> value)
///
/// Keeps insertion order so that a package's info file round-trips in the
/// order it was written. Keys are unique: inserting an existing key replaces
/// its value in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct InfoMap {
    entries: Vec<(String, String)>,
}

impl InfoMap {
    /// Create a new empty InfoMap
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Get a value by key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set a value by key, replacing any previous value for the same key
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Merge every key of `other` into this map, overwriting same-named keys
    pub fn merge(&mut self, other: &InfoMap) {
        for (key, value) in other.iter() {
            self.insert(key, value);
        }
    }

    /// Check if a key exists
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Iterate entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Get the number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the map is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse `Key: Value` lines.
    ///
    /// Lines starting with whitespace continue the previous value. Blank lines
    /// and lines starting with `#` are ignored.
    pub fn parse(text: &str) -> Result<Self> {
        let mut map = InfoMap::new();
        let mut last_key: Option<String> = None;

        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim_end_matches('\r');
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }

            if line.starts_with(' ') || line.starts_with('\t') {
                let Some(key) = &last_key else {
                    return Err(StashError::InvalidInfoLine {
                        line_no: index + 1,
                        line: line.to_string(),
                    });
                };
                let continued = format!(
                    "{} {}",
                    map.get(key).unwrap_or_default(),
                    line.trim()
                );
                map.insert(key.clone(), continued);
                continue;
            }

            let Some((key, value)) = line.split_once(':') else {
                return Err(StashError::InvalidInfoLine {
                    line_no: index + 1,
                    line: line.to_string(),
                });
            };
            let key = key.trim();
            if key.is_empty() {
                return Err(StashError::InvalidInfoLine {
                    line_no: index + 1,
                    line: line.to_string(),
                });
            }
            map.insert(key, value.trim());
            last_key = Some(key.to_string());
        }

        Ok(map)
    }

    /// Render as `Key: Value` lines (LF terminated).
    ///
    /// Embedded line breaks in values are folded to spaces.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for (key, value) in self.iter() {
            let folded: String = value
                .chars()
                .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
                .collect();
            out.push_str(key);
            out.push_str(": ");
            out.push_str(&folded);
            out.push('\n');
        }
        out
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for InfoMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = InfoMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_insert_overwrites_in_place() {
        let mut map: InfoMap = [("A", "1"), ("B", "2")].into_iter().collect();
        map.insert("A", "3");
        let entries: Vec<_> = map.iter().collect();
        assert_eq!(entries, vec![("A", "3"), ("B", "2")]);
    }

    #[test]
    fn test_merge_overwrites_and_appends() {
        let mut base: InfoMap = [("Source-Organization", "X"), ("Contact-Name", "Ann")]
            .into_iter()
            .collect();
        let update: InfoMap = [("Source-Organization", "Y"), ("External-Identifier", "u1")]
            .into_iter()
            .collect();

        base.merge(&update);

        assert_eq!(base.get("Source-Organization"), Some("Y"));
        assert_eq!(base.get("Contact-Name"), Some("Ann"));
        assert_eq!(base.get("External-Identifier"), Some("u1"));
        assert_eq!(base.len(), 3);
    }

    #[test]
    fn test_parse_with_continuation_and_comments() {
        let text = "# staged by upstream\nSource-Organization: X\nExternal-Description: first\n  second\n\nContact-Name:  Ann \n";
        let map = InfoMap::parse(text).unwrap();
        assert_eq!(map.get("Source-Organization"), Some("X"));
        assert_eq!(map.get("External-Description"), Some("first second"));
        assert_eq!(map.get("Contact-Name"), Some("Ann"));
    }

    #[test]
    fn test_parse_value_may_contain_colon() {
        let map = InfoMap::parse("Contact-Email: mailto:a@b.c\n").unwrap();
        assert_eq!(map.get("Contact-Email"), Some("mailto:a@b.c"));
    }

    #[test]
    fn test_parse_rejects_line_without_separator() {
        let err = InfoMap::parse("Source-Organization X\n").unwrap_err();
        assert!(matches!(err, StashError::InvalidInfoLine { line_no: 1, .. }));
    }

    #[test]
    fn test_parse_rejects_leading_continuation() {
        assert!(InfoMap::parse("  orphan\n").is_err());
    }

    #[test]
    fn test_to_text_folds_line_breaks() {
        let mut map = InfoMap::new();
        map.insert("External-Description", "line one\nline two");
        assert_eq!(map.to_text(), "External-Description: line one line two\n");
    }

    proptest! {
        #[test]
        fn prop_merge_makes_every_update_key_visible(
            base in proptest::collection::vec(("[A-Z][a-z]{0,6}", "[a-z0-9 ]{0,10}"), 0..8),
            update in proptest::collection::vec(("[A-Z][a-z]{0,6}", "[a-z0-9]{1,10}"), 0..8),
        ) {
            let mut merged: InfoMap = base.clone().into_iter().collect();
            let update_map: InfoMap = update.clone().into_iter().collect();
            merged.merge(&update_map);

            for (key, value) in update_map.iter() {
                prop_assert_eq!(merged.get(key), Some(value));
            }
            for (key, _) in &base {
                prop_assert!(merged.contains_key(key));
            }
        }
    }
}
