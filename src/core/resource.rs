//! Resource model: boxes, dictionaries, settings, and the name index.
//!
//! The index is the leaf input of a validation run. Loading specs from a
//! backing repository is a collaborator concern; by the time the engine sees
//! a box its pin sections are already decoded into typed structs, while the
//! free-form sections stay as [`ConfigValue`] trees.

use crate::core::pin::PinSpec;
use crate::core::types::ConfigValue;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The spec body of a box resource, as stored in the repository.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxSpec {
    /// Declared pin sections.
    #[serde(default)]
    pub pins: PinSpec,
    /// Arbitrary nested component configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_config: Option<ConfigValue>,
    /// Deployment settings (service exposure, ingress paths).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extended_settings: Option<ConfigValue>,
    /// Storage book this box writes to, overriding the schema default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book_name: Option<String>,
}

/// A deployable service unit described by a resource spec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxResource {
    /// Unique resource name.
    pub name: String,
    /// The spec body. Mutated only by pin normalization and repair.
    pub spec: BoxSpec,
    /// Content hash of the spec, recomputed by repair for change detection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_hash: Option<String>,
}

impl BoxResource {
    /// Create a box resource from its name and spec.
    pub fn new(name: impl Into<String>, spec: BoxSpec) -> Self {
        Self {
            name: name.into(),
            spec,
            source_hash: None,
        }
    }
}

/// A shared schema/config object referenced by boxes. Identity only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dictionary {
    /// Unique resource name.
    pub name: String,
}

/// Schema-wide settings resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsResource {
    /// Name of the settings resource itself (owner of default-book errors).
    pub name: String,
    /// Storage keyspace the schema writes into.
    pub keyspace: String,
    /// Default book for boxes that do not name one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_book: Option<String>,
}

/// Name-indexed view of all resources taking part in a validation run.
#[derive(Debug, Clone, Default)]
pub struct ResourceIndex {
    boxes: IndexMap<String, BoxResource>,
    dictionaries: IndexMap<String, Dictionary>,
}

impl ResourceIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a box resource, replacing any previous resource with its name.
    pub fn insert_box(&mut self, resource: BoxResource) {
        self.boxes.insert(resource.name.clone(), resource);
    }

    /// Insert a dictionary.
    pub fn insert_dictionary(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.dictionaries.insert(name.clone(), Dictionary { name });
    }

    /// Look up a box by name.
    pub fn get_box(&self, name: &str) -> Option<&BoxResource> {
        self.boxes.get(name)
    }

    /// Whether a dictionary with this name exists.
    pub fn has_dictionary(&self, name: &str) -> bool {
        self.dictionaries.contains_key(name)
    }

    /// Iterate all boxes in insertion order.
    pub fn boxes(&self) -> impl Iterator<Item = &BoxResource> {
        self.boxes.values()
    }

    /// Mutable access to the box map, for normalization and repair.
    pub fn boxes_mut(&mut self) -> &mut IndexMap<String, BoxResource> {
        &mut self.boxes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_lookup() {
        let mut index = ResourceIndex::new();
        index.insert_box(BoxResource::new("act", BoxSpec::default()));
        index.insert_dictionary("fix44");

        assert!(index.get_box("act").is_some());
        assert!(index.get_box("ghost").is_none());
        assert!(index.has_dictionary("fix44"));
        assert!(!index.has_dictionary("fix50"));
    }

    #[test]
    fn test_box_spec_skips_empty_sections_on_serialize() {
        let resource = BoxResource::new("act", BoxSpec::default());
        let text = serde_json::to_string(&resource.spec).unwrap();
        assert!(!text.contains("customConfig"));
        assert!(!text.contains("bookName"));
    }
}
