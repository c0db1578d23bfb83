//! Instance - a tracked property bag for one remote record
//!
//! The dynamic "get/set named value" pattern of the remote APIs becomes an
//! explicit ordered map plus a parallel set of dirtied keys. Loading a
//! response writes through `set_loaded` (no dirty marking); caller mutations
//! go through `set` and are picked up by the partial-update builder.

use std::collections::{BTreeMap, BTreeSet};

use remora_core_types::{EntityTag, Value};

/// Non-owning reference to another instance in the same context
///
/// Used for the ownership back-reference walked during token resolution.
/// Carries the canonical key literal, never a pointer - lifetime ownership
/// of the target stays with the context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceRef {
    pub tag: EntityTag,
    pub key: String,
}

impl InstanceRef {
    pub fn new(tag: EntityTag, key: impl Into<String>) -> Self {
        Self {
            tag,
            key: key.into(),
        }
    }
}

/// A property bag of named values plus a change-tracking set
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    tag: EntityTag,
    key: Option<Value>,
    values: BTreeMap<String, Value>,
    dirty: BTreeSet<String>,
    parent: Option<InstanceRef>,
}

impl Instance {
    /// Create a new empty instance of the given entity type
    pub fn new(tag: EntityTag) -> Self {
        Self {
            tag,
            key: None,
            values: BTreeMap::new(),
            dirty: BTreeSet::new(),
            parent: None,
        }
    }

    /// Entity type tag of this instance
    pub fn tag(&self) -> &EntityTag {
        &self.tag
    }

    /// Get a property value
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Set a property value, marking it as modified
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        self.values.insert(name.clone(), value.into());
        self.dirty.insert(name);
    }

    /// Write a property value from a response without marking it modified
    pub fn set_loaded(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    /// The key value, if assigned
    pub fn key(&self) -> Option<&Value> {
        self.key.as_ref()
    }

    /// Assign the key value
    pub fn set_key(&mut self, key: Value) {
        self.key = Some(key);
    }

    /// Canonical key literal used by the identity map
    pub fn key_literal(&self) -> Option<String> {
        self.key.as_ref().and_then(Value::key_literal)
    }

    /// Names modified since load, in deterministic order
    pub fn dirty_fields(&self) -> impl Iterator<Item = &str> {
        self.dirty.iter().map(String::as_str)
    }

    /// Whether any field has been modified since load
    pub fn has_changes(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Clear the change-tracking set (after a merge or a successful update)
    pub fn clear_dirty(&mut self) {
        self.dirty.clear();
    }

    /// The ownership back-reference, if any
    pub fn parent(&self) -> Option<&InstanceRef> {
        self.parent.as_ref()
    }

    /// Attach the ownership back-reference
    pub fn set_parent(&mut self, parent: InstanceRef) {
        self.parent = Some(parent);
    }

    /// Iterate all property values in deterministic (name) order
    pub fn values(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}
