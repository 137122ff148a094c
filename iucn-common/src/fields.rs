//! Fact box field maps
//!
//! The template engine hands back the fact box parameters as a JSON
//! object (named parameters) or array (positional parameters). These
//! are kept as flat ordered maps; nothing here knows about the template
//! markup itself.

use crate::sanitize::sanitize;
use crate::{Error, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Template parameter key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldKey {
    /// Named parameter, trimmed (`| rl-id = 19` → `rl-id`)
    Named(String),
    /// Unnamed parameter, 1-based like template positional parameters
    Positional(usize),
}

impl FieldKey {
    /// Named key with surrounding whitespace removed
    pub fn named(key: &str) -> Self {
        FieldKey::Named(key.trim().to_string())
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKey::Named(name) => f.write_str(name),
            FieldKey::Positional(index) => write!(f, "{}", index),
        }
    }
}

/// Raw, unsanitized field values as extracted from the document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFieldMap {
    entries: BTreeMap<FieldKey, String>,
}

impl RawFieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value; named keys are trimmed, a later duplicate wins
    pub fn insert(&mut self, key: FieldKey, value: impl Into<String>) {
        let key = match key {
            FieldKey::Named(name) => FieldKey::named(&name),
            positional => positional,
        };
        self.entries.insert(key, value.into());
    }

    /// Build from template engine JSON output
    ///
    /// Accepts an object (named parameters) or an array (positional
    /// parameters); object keys in plain decimal also count as
    /// positional. Numbers are kept as their decimal text and `null`
    /// becomes the empty string; any other value kind is rejected.
    pub fn from_json(value: &Value) -> Result<Self> {
        let mut map = RawFieldMap::new();

        match value {
            Value::Object(object) => {
                for (key, value) in object {
                    map.insert(object_key(key), scalar_text(key, value)?);
                }
            }
            Value::Array(items) => {
                for (index, value) in items.iter().enumerate() {
                    let key = FieldKey::Positional(index + 1);
                    let text = scalar_text(&key.to_string(), value)?;
                    map.insert(key, text);
                }
            }
            other => {
                return Err(Error::InvalidInput(format!(
                    "Fact box fields must be an object or array, got {}",
                    json_kind(other)
                )))
            }
        }

        Ok(map)
    }

    pub fn get(&self, key: &FieldKey) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldKey, &str)> {
        self.entries.iter().map(|(k, v)| (k, v.as_str()))
    }

    /// Sanitize every value, keeping the key set
    pub fn clean(&self) -> CleanedFieldMap {
        CleanedFieldMap {
            entries: self
                .entries
                .iter()
                .map(|(key, value)| (key.clone(), sanitize(value)))
                .collect(),
        }
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for RawFieldMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = RawFieldMap::new();
        for (key, value) in iter {
            map.insert(FieldKey::named(key.as_ref()), value);
        }
        map
    }
}

/// Sanitized field values; read-only once built
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanedFieldMap {
    entries: BTreeMap<FieldKey, String>,
}

impl CleanedFieldMap {
    /// Value of a named field
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&FieldKey::Named(name.to_string()))
            .map(String::as_str)
    }

    pub fn get_key(&self, key: &FieldKey) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &FieldKey> {
        self.entries.keys()
    }
}

/// Canonical decimal keys (`"1"`, not `"01"` or `" 1"`) are positional
fn object_key(key: &str) -> FieldKey {
    match key.parse::<usize>() {
        Ok(index) if index.to_string() == key => FieldKey::Positional(index),
        _ => FieldKey::named(key),
    }
}

fn scalar_text(key: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(text) => Ok(text.clone()),
        Value::Number(number) => Ok(number.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(Error::InvalidInput(format!(
            "Field '{}' has non-scalar value ({})",
            key,
            json_kind(other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
