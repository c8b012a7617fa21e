//! Decoded parameter tables.

use std::collections::btree_map;
use std::collections::BTreeMap;

use crate::value::Value;

/// A decoded parameter table: an ordered mapping from a single-byte key to
/// a [`Value`].
///
/// Keys are not guaranteed unique across protocol versions; the last
/// writer wins. The typed accessors mirror what the event interpreter
/// needs and return `None` rather than coercing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters(BTreeMap<u8, Value>);

impl Parameters {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value, replacing any previous value for the key.
    pub fn insert(&mut self, key: u8, value: Value) {
        self.0.insert(key, value);
    }

    /// Returns the value for `key`, if present.
    #[must_use]
    pub fn get(&self, key: u8) -> Option<&Value> {
        self.0.get(&key)
    }

    /// Returns `true` if the table contains `key`.
    #[must_use]
    pub fn contains(&self, key: u8) -> bool {
        self.0.contains_key(&key)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, u8, Value> {
        self.0.iter()
    }

    /// Integer value at `key` widened to `i64`, or 0 when absent or
    /// non-numeric.
    #[must_use]
    pub fn i64_at(&self, key: u8) -> i64 {
        self.get(key).and_then(Value::as_i64).unwrap_or(0)
    }

    /// Integer value at `key` as `i32`, or 0 when absent or non-numeric.
    #[must_use]
    pub fn i32_at(&self, key: u8) -> i32 {
        self.get(key).and_then(Value::as_i32).unwrap_or(0)
    }

    /// String value at `key`, or `""` when absent or not a string.
    #[must_use]
    pub fn str_at(&self, key: u8) -> &str {
        self.get(key).and_then(Value::as_str).unwrap_or("")
    }

    /// Boolean value at `key`, or `false` when absent or not a boolean.
    #[must_use]
    pub fn bool_at(&self, key: u8) -> bool {
        self.get(key).and_then(Value::as_bool).unwrap_or(false)
    }
}

impl FromIterator<(u8, Value)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (u8, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Parameters {
    type Item = (&'a u8, &'a Value);
    type IntoIter = btree_map::Iter<'a, u8, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_get() {
        let mut params = Parameters::new();
        params.insert(1, Value::I32(5));
        assert_eq!(params.get(1), Some(&Value::I32(5)));
        assert_eq!(params.get(2), None);
        assert!(params.contains(1));
        assert!(!params.contains(2));
    }

    #[test]
    fn insert_replaces() {
        let mut params = Parameters::new();
        params.insert(1, Value::I32(5));
        params.insert(1, Value::I32(6));
        assert_eq!(params.len(), 1);
        assert_eq!(params.get(1), Some(&Value::I32(6)));
    }

    #[test]
    fn typed_accessors_with_defaults() {
        let params: Parameters = [
            (1, Value::I64(50_000)),
            (2, Value::Str("Player1".into())),
            (3, Value::Bool(true)),
            (4, Value::I32(7)),
        ]
        .into_iter()
        .collect();

        assert_eq!(params.i64_at(1), 50_000);
        assert_eq!(params.str_at(2), "Player1");
        assert!(params.bool_at(3));
        assert_eq!(params.i32_at(4), 7);

        // Absent keys fall back to zero values.
        assert_eq!(params.i64_at(9), 0);
        assert_eq!(params.str_at(9), "");
        assert!(!params.bool_at(9));
        assert_eq!(params.i32_at(9), 0);
    }

    #[test]
    fn accessors_do_not_coerce() {
        let params: Parameters = [(1, Value::Str("5".into()))].into_iter().collect();
        assert_eq!(params.i64_at(1), 0);
    }

    #[test]
    fn iterates_in_key_order() {
        let params: Parameters = [(9, Value::Null), (1, Value::Null), (5, Value::Null)]
            .into_iter()
            .collect();
        let keys: Vec<u8> = params.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec![1, 5, 9]);
    }
}
