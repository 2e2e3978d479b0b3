//! Free-form user data attached to series and tables.
//!
//! Stored as ordered key-value pairs with JSON values, so consumers can
//! keep whatever context they need next to the numbers.

use serde_json::Value;
use smallvec::SmallVec;
use std::fmt;

/// User data storage - ordered key-value pairs.
///
/// Uses SmallVec optimization for common case of few entries.
#[derive(Clone, Default, PartialEq)]
pub struct UserData {
    entries: SmallVec<[(String, Value); 4]>,
}

impl UserData {
    /// Object class key (e.g. "Surface").
    pub const CLASS_NAME_KEY: &'static str = "className";

    /// Source file extension key (e.g. "ts").
    pub const EXTENSION_KEY: &'static str = "extension";

    /// Object name key.
    pub const NAME_KEY: &'static str = "name";

    /// Declared attribute names key (array of strings).
    pub const ATTRIBUTE_NAMES_KEY: &'static str = "attributeNames";

    /// Create empty user data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, replacing any previous value for `key`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();

        for (k, v) in &mut self.entries {
            if k == &key {
                *v = value;
                return;
            }
        }
        self.entries.push((key, value));
    }

    /// Get a value by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Get a string value by key.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Check if a key exists.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Remove a key and return its value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Iterate over key-value pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Convert to a JSON object.
    pub fn to_json(&self) -> Value {
        Value::Object(self.entries.iter().cloned().collect())
    }

    // === Decoded object keys ===

    pub fn class_name(&self) -> Option<&str> {
        self.get_str(Self::CLASS_NAME_KEY)
    }

    pub fn extension(&self) -> Option<&str> {
        self.get_str(Self::EXTENSION_KEY)
    }

    pub fn name(&self) -> Option<&str> {
        self.get_str(Self::NAME_KEY)
    }

    /// Declared attribute names, in declaration order.
    pub fn attribute_names(&self) -> Vec<&str> {
        match self.get(Self::ATTRIBUTE_NAMES_KEY) {
            Some(Value::Array(names)) => names.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }
}

impl fmt::Debug for UserData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(k, v)| (k, v)))
            .finish()
    }
}

impl From<serde_json::Map<String, Value>> for UserData {
    fn from(map: serde_json::Map<String, Value>) -> Self {
        map.into_iter().collect()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for UserData {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut data = Self::new();
        for (k, v) in iter {
            data.set(k, v);
        }
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_data_basic() {
        let mut data = UserData::new();
        data.set("key1", "value1");
        data.set("count", 3);

        assert_eq!(data.get_str("key1"), Some("value1"));
        assert_eq!(data.get("count"), Some(&json!(3)));
        assert_eq!(data.get("key3"), None);
        assert_eq!(data.len(), 2);
    }

    #[test]
    fn test_user_data_update() {
        let mut data = UserData::new();
        data.set("key", "value1");
        data.set("key", "value2");

        assert_eq!(data.get_str("key"), Some("value2"));
        assert_eq!(data.len(), 1);
        assert_eq!(data.remove("key"), Some(json!("value2")));
        assert!(data.is_empty());
    }

    #[test]
    fn test_user_data_object_keys() {
        let data: UserData = [
            (UserData::CLASS_NAME_KEY, json!("Surface")),
            (UserData::EXTENSION_KEY, json!("ts")),
            (UserData::NAME_KEY, json!("top")),
            (UserData::ATTRIBUTE_NAMES_KEY, json!(["a", "b"])),
        ]
        .into_iter()
        .collect();

        assert_eq!(data.class_name(), Some("Surface"));
        assert_eq!(data.extension(), Some("ts"));
        assert_eq!(data.name(), Some("top"));
        assert_eq!(data.attribute_names(), vec!["a", "b"]);
    }

    #[test]
    fn test_user_data_json() {
        let mut data = UserData::new();
        data.set("name", "s1");
        data.set("attributeNames", json!([]));
        assert_eq!(data.to_json(), json!({"name": "s1", "attributeNames": []}));

        let back = match data.to_json() {
            Value::Object(map) => UserData::from(map),
            _ => unreachable!(),
        };
        assert_eq!(back.name(), Some("s1"));
    }
}
