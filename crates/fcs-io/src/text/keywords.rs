//! Keyword classification and the ordered, case-insensitive keyword store.

use std::collections::BTreeMap;

use crate::error::{FcsError, Result};

/// Keywords whose values are always derived from the document.
const DERIVED_KEYWORDS: [&str; 2] = ["$PAR", "$TOT"];

/// A TEXT keyword after classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    /// Any keyword that is not per-parameter or derived, original casing kept.
    Standard(String),
    /// `$PnX` / `$GnX`: the embedded 1-based index and the generic key (`$PnX`).
    Parameter { index: u32, generic: String },
    /// `$PAR` or `$TOT`, recomputed on output.
    Derived(&'static str),
}

/// Classify a keyword, matching `^\$[PG]\d+(\D.*)$` case-insensitively.
#[must_use]
pub fn classify_key(key: &str) -> Key {
    let upper = key.to_uppercase();
    if let Some(derived) = DERIVED_KEYWORDS.iter().find(|d| **d == upper) {
        return Key::Derived(*derived);
    }

    let bytes = upper.as_bytes();
    if bytes.len() >= 4 && bytes[0] == b'$' && matches!(bytes[1], b'P' | b'G') {
        let digits = bytes[2..].iter().take_while(|b| b.is_ascii_digit()).count();
        let rest = &upper[2 + digits..];
        if digits > 0 && !rest.is_empty() {
            if let Ok(index) = upper[2..2 + digits].parse::<u32>() {
                return Key::Parameter {
                    index,
                    generic: format!("${}n{rest}", bytes[1] as char),
                };
            }
        }
    }

    Key::Standard(key.to_string())
}

#[derive(Debug, Clone)]
struct KeywordEntry {
    key: String,
    value: String,
    slot: u64,
}

/// Ordered keyword store for non-parameter keywords.
///
/// Lookups are case-insensitive. Re-inserting an existing key overwrites its
/// value and casing in place; iteration follows first-insertion order.
#[derive(Debug, Clone, Default)]
pub struct KeywordStore {
    entries: BTreeMap<String, KeywordEntry>,
    next_slot: u64,
}

impl KeywordStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keywords.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Case-insensitive lookup.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(&key.to_uppercase())
            .map(|entry| entry.value.as_str())
    }

    /// Whether a keyword is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(&key.to_uppercase())
    }

    /// Insert or overwrite a keyword.
    ///
    /// Empty keys and values are rejected, as are parameter and derived
    /// keywords, which live elsewhere.
    pub fn insert(&mut self, key: &str, value: &str) -> Result<()> {
        if key.is_empty() || value.is_empty() {
            return Err(FcsError::validation(format!(
                "empty keyword or value (key {key:?})"
            )));
        }
        match classify_key(key) {
            Key::Standard(_) => {}
            Key::Parameter { .. } => {
                return Err(FcsError::validation(format!(
                    "{key} is a parameter keyword"
                )));
            }
            Key::Derived(name) => {
                return Err(FcsError::validation(format!(
                    "{name} is derived from the document and cannot be set"
                )));
            }
        }

        let canonical = key.to_uppercase();
        if let Some(entry) = self.entries.get_mut(&canonical) {
            entry.key = key.to_string();
            entry.value = value.to_string();
        } else {
            self.entries.insert(
                canonical,
                KeywordEntry {
                    key: key.to_string(),
                    value: value.to_string(),
                    slot: self.next_slot,
                },
            );
            self.next_slot += 1;
        }
        Ok(())
    }

    /// Insert a keyword known to be a non-empty standard key.
    pub(crate) fn insert_trusted(&mut self, key: &str, value: String) {
        let canonical = key.to_uppercase();
        if let Some(entry) = self.entries.get_mut(&canonical) {
            entry.value = value;
            return;
        }
        self.entries.insert(
            canonical,
            KeywordEntry {
                key: key.to_string(),
                value,
                slot: self.next_slot,
            },
        );
        self.next_slot += 1;
    }

    /// Remove a keyword, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries
            .remove(&key.to_uppercase())
            .map(|entry| entry.value)
    }

    /// Keep only keywords for which `keep(key)` is true.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.entries.retain(|_, entry| keep(&entry.key));
    }

    /// Iterate `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        let mut ordered: Vec<&KeywordEntry> = self.entries.values().collect();
        ordered.sort_by_key(|entry| entry.slot);
        ordered
            .into_iter()
            .map(|entry| (entry.key.as_str(), entry.value.as_str()))
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.iter().map(|(key, _)| key)
    }
}

impl PartialEq for KeywordStore {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(
            classify_key("$P3N"),
            Key::Parameter {
                index: 3,
                generic: "$PnN".to_string()
            }
        );
        assert_eq!(
            classify_key("$p12calibration"),
            Key::Parameter {
                index: 12,
                generic: "$PnCALIBRATION".to_string()
            }
        );
        assert_eq!(
            classify_key("$G2E"),
            Key::Parameter {
                index: 2,
                generic: "$GnE".to_string()
            }
        );
        assert_eq!(classify_key("$par"), Key::Derived("$PAR"));
        assert_eq!(classify_key("$TOT"), Key::Derived("$TOT"));
        assert_eq!(classify_key("$PK3"), Key::Standard("$PK3".to_string()));
        assert_eq!(classify_key("$P3"), Key::Standard("$P3".to_string()));
        assert_eq!(classify_key("$PROJ"), Key::Standard("$PROJ".to_string()));
    }

    #[test]
    fn test_overwrite_in_place() {
        let mut store = KeywordStore::new();
        store.insert("$CYT", "Aria").unwrap();
        store.insert("$MODE", "L").unwrap();
        store.insert("$cyt", "Fortessa").unwrap();

        let pairs: Vec<_> = store.iter().collect();
        assert_eq!(pairs, vec![("$cyt", "Fortessa"), ("$MODE", "L")]);
        assert_eq!(store.get("$CYT"), Some("Fortessa"));
    }

    #[test]
    fn test_rejects_empty_and_routed_keys() {
        let mut store = KeywordStore::new();
        assert!(store.insert("", "x").is_err());
        assert!(store.insert("$CYT", "").is_err());
        assert!(store.insert("$P1N", "FSC").is_err());
        assert!(store.insert("$PAR", "3").is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_remove_and_reinsert_goes_last() {
        let mut store = KeywordStore::new();
        store.insert("A", "1").unwrap();
        store.insert("B", "2").unwrap();
        assert_eq!(store.remove("a"), Some("1".to_string()));
        store.insert("A", "3").unwrap();
        assert_eq!(store.keys().collect::<Vec<_>>(), vec!["B", "A"]);
    }

    #[test]
    fn test_equality_ignores_slots() {
        let mut left = KeywordStore::new();
        left.insert("X", "0").unwrap();
        left.remove("X");
        left.insert("A", "1").unwrap();
        let mut right = KeywordStore::new();
        right.insert("A", "1").unwrap();
        assert_eq!(left, right);
    }
}
