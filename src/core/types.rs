//! Tagged configuration tree used for semi-structured resource sections.
//!
//! Box specs carry two free-form sections (`customConfig`, `extendedSettings`)
//! whose shape is not known to the engine. Instead of passing raw untyped maps
//! around, these sections are decoded once into a closed enum:
//! - Exhaustive pattern matching catches missing cases at compile time
//! - The placeholder scanner and URL-path extraction never downcast
//! - serde handles the tree natively (mappings keep their insertion order)

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A node of a nested configuration tree.
///
/// Leaves are scalars; interior nodes are sequences or string-keyed mappings.
/// Mappings are backed by [`IndexMap`] so re-serialization is stable for a
/// given input, which the repair content hash relies on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    /// Absent / null leaf
    Null,
    /// Boolean leaf
    Bool(bool),
    /// Integer leaf
    Integer(i64),
    /// Floating point leaf
    Float(f64),
    /// String leaf (the only kind placeholders can live in)
    String(String),
    /// Ordered list of child values
    Sequence(Vec<ConfigValue>),
    /// String-keyed mapping of child values
    Mapping(IndexMap<String, ConfigValue>),
}

impl ConfigValue {
    /// Borrow this value as a string leaf.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(value) => Some(value),
            _ => None,
        }
    }

    /// Borrow this value as a mapping.
    pub fn as_mapping(&self) -> Option<&IndexMap<String, ConfigValue>> {
        match self {
            ConfigValue::Mapping(entries) => Some(entries),
            _ => None,
        }
    }

    /// Borrow this value as a sequence.
    pub fn as_sequence(&self) -> Option<&[ConfigValue]> {
        match self {
            ConfigValue::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Look up a key in a mapping value. Returns `None` for non-mappings.
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.as_mapping().and_then(|entries| entries.get(key))
    }
}

impl From<serde_json::Value> for ConfigValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => ConfigValue::Null,
            serde_json::Value::Bool(flag) => ConfigValue::Bool(flag),
            serde_json::Value::Number(number) => match number.as_i64() {
                Some(integer) => ConfigValue::Integer(integer),
                None => ConfigValue::Float(number.as_f64().unwrap_or(0.0)),
            },
            serde_json::Value::String(text) => ConfigValue::String(text),
            serde_json::Value::Array(items) => {
                ConfigValue::Sequence(items.into_iter().map(Into::into).collect())
            }
            serde_json::Value::Object(entries) => ConfigValue::Mapping(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, value.into()))
                    .collect(),
            ),
        }
    }
}
