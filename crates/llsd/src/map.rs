//! Insertion-ordered LLSD map.
//!
//! LLSD documents list map entries in a meaningful order for some services
//! (for example catalogues where the first entry is the preferred choice), so
//! the map keeps entries in the order they were decoded or inserted.

use crate::LlsdValue;

/// String-keyed LLSD map that preserves insertion order.
///
/// ## Invariants
/// - Keys are unique. Re-inserting a key replaces its value in place and
///   keeps the original position.
///
/// # Examples
/// ```
/// use llsd::{LlsdMap, LlsdValue};
///
/// let mut map = LlsdMap::new();
/// map.insert("b", LlsdValue::from("second"));
/// map.insert("a", LlsdValue::from("first"));
/// let keys: Vec<&str> = map.keys().collect();
/// assert_eq!(keys, ["b", "a"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LlsdMap {
    entries: Vec<(String, LlsdValue)>,
}

impl LlsdMap {
    /// Create an empty map.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert or replace a value, returning the previous value for `key`.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<LlsdValue>,
    ) -> Option<LlsdValue> {
        let owned_key = key.into();
        let new_value = value.into();
        let existing = self.entries.iter_mut().find(|(key, _)| *key == owned_key);
        match existing {
            Some((_, slot)) => Some(std::mem::replace(slot, new_value)),
            None => {
                self.entries.push((owned_key, new_value));
                None
            }
        }
    }

    /// Look up a value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&LlsdValue> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    /// Return true when `key` is present, regardless of its value.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return true when the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// Iterate over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &LlsdValue)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value))
    }
}

impl IntoIterator for LlsdMap {
    type Item = (String, LlsdValue);
    type IntoIter = std::vec::IntoIter<(String, LlsdValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K, V> FromIterator<(K, V)> for LlsdMap
where
    K: Into<String>,
    V: Into<LlsdValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}
