//! Context - per-caller object graph with identity-map semantics
//!
//! A context owns every instance and collection created through it. The
//! identity map guarantees that within one context no two instances of the
//! same entity type share a key: merging a record with a known key updates
//! the existing instance in place (object identity preserved, outstanding
//! references stay valid), never duplicates it.
//!
//! Not safe for concurrent mutation - mutating entry points take `&mut self`
//! and callers wanting parallel work use independent contexts.

use std::collections::HashMap;

use remora_core_types::{EntityTag, Value};

use crate::errors::{RemoraError, Result};
use crate::metadata::EntityDescriptor;
use crate::model::{Collection, CollectionId, Instance, InstanceRef};
use crate::query::QueryDescriptor;

/// Per-caller store of instances and collections
#[derive(Debug, Default)]
pub struct Context {
    instances: HashMap<(EntityTag, String), Instance>,
    collections: Vec<Collection>,
}

impl Context {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new unloaded collection and return its handle
    pub fn new_collection(
        &mut self,
        tag: EntityTag,
        parent: Option<InstanceRef>,
        query: QueryDescriptor,
    ) -> CollectionId {
        self.collections.push(Collection::new(tag, parent, query));
        CollectionId(self.collections.len() - 1)
    }

    /// Get a collection by handle
    ///
    /// # Panics
    ///
    /// Panics if the handle did not come from this context.
    pub fn collection(&self, id: CollectionId) -> &Collection {
        &self.collections[id.0]
    }

    /// Get a mutable collection by handle
    ///
    /// # Panics
    ///
    /// Panics if the handle did not come from this context.
    pub fn collection_mut(&mut self, id: CollectionId) -> &mut Collection {
        &mut self.collections[id.0]
    }

    /// Look up an instance by (entity type, key literal)
    pub fn instance(&self, tag: &EntityTag, key: &str) -> Option<&Instance> {
        self.instances.get(&(tag.clone(), key.to_string()))
    }

    /// Look up a mutable instance by (entity type, key literal)
    pub fn instance_mut(&mut self, tag: &EntityTag, key: &str) -> Option<&mut Instance> {
        self.instances.get_mut(&(tag.clone(), key.to_string()))
    }

    /// Resolve a non-owning instance reference
    pub fn resolve_ref(&self, r: &InstanceRef) -> Option<&Instance> {
        self.instance(&r.tag, &r.key)
    }

    /// Number of live instances of one entity type
    pub fn count_instances(&self, tag: &EntityTag) -> usize {
        self.instances.keys().filter(|(t, _)| t == tag).count()
    }

    /// Place a caller-constructed instance under its key
    ///
    /// Used after a successful add when the server does not echo the record.
    /// The instance must carry a key; its change set is cleared because the
    /// remote now agrees with the local state.
    ///
    /// # Errors
    ///
    /// Returns `KeyMissing` if the instance has no key-capable key value.
    pub fn adopt(&mut self, mut instance: Instance) -> Result<String> {
        let key = instance
            .key_literal()
            .ok_or_else(|| RemoraError::KeyMissing {
                entity: instance.tag().to_string(),
                reason: "instance has no key value to register under".to_string(),
            })?;
        instance.clear_dirty();
        self.instances
            .insert((instance.tag().clone(), key.clone()), instance);
        Ok(key)
    }

    /// Merge a raw response record into the identity map
    ///
    /// Looks up an existing instance by the key extracted from the record;
    /// if found, overwrites its property bag in place and clears its change
    /// set; if not, constructs and inserts a new instance. Partial records
    /// (projection results) are tolerated: only fields present in the
    /// payload are written, previously loaded fields survive.
    ///
    /// Returns the canonical key literal of the merged instance.
    ///
    /// # Errors
    ///
    /// Returns `Serialization` for a non-object record and `KeyMissing`
    /// when the key field is absent or not key-capable.
    pub fn merge_record(
        &mut self,
        descriptor: &EntityDescriptor,
        raw: &serde_json::Value,
        parent: Option<InstanceRef>,
    ) -> Result<String> {
        let obj = raw
            .as_object()
            .ok_or_else(|| RemoraError::Serialization {
                message: format!(
                    "expected a JSON object for entity {}, got {}",
                    descriptor.tag(),
                    json_kind(raw)
                ),
            })?;

        let key_value = obj
            .get(descriptor.key_field())
            .map(Value::from_json)
            .ok_or_else(|| RemoraError::KeyMissing {
                entity: descriptor.tag().to_string(),
                reason: format!("record has no '{}' field", descriptor.key_field()),
            })?;
        let key = key_value
            .key_literal()
            .ok_or_else(|| RemoraError::KeyMissing {
                entity: descriptor.tag().to_string(),
                reason: format!(
                    "'{}' value is not usable as a key",
                    descriptor.key_field()
                ),
            })?;

        let slot = (descriptor.tag().clone(), key.clone());
        let instance = self.instances.entry(slot).or_insert_with(|| {
            let mut fresh = Instance::new(descriptor.tag().clone());
            fresh.set_key(key_value.clone());
            if let Some(p) = parent {
                fresh.set_parent(p);
            }
            fresh
        });

        for property in descriptor.properties() {
            let found = match &property.path {
                Some(path) => extract_path(raw, path),
                None => obj.get(&property.name),
            };
            if let Some(v) = found {
                instance.set_loaded(property.name.clone(), Value::from_json(v));
            }
        }
        // The key field is always readable off the bag, described or not
        instance.set_loaded(descriptor.key_field().to_string(), key_value);
        instance.clear_dirty();

        if let Some(hook) = descriptor.merge_hook_fn() {
            hook(instance, raw);
        }

        tracing::debug!(entity = %descriptor.tag(), key = %key, "merged record");
        Ok(key)
    }

    /// Merge a raw record and append it to a collection, preserving
    /// response order
    pub fn merge_into(
        &mut self,
        descriptor: &EntityDescriptor,
        id: CollectionId,
        raw: &serde_json::Value,
    ) -> Result<String> {
        let parent = self.collections[id.0].parent().cloned();
        let key = self.merge_record(descriptor, raw, parent)?;
        self.collections[id.0].push_member(key.clone());
        Ok(key)
    }

    /// Remove an instance and every collection membership it holds
    ///
    /// Delete flow: the instance is discarded, not tombstoned.
    pub fn evict(&mut self, tag: &EntityTag, key: &str) {
        self.instances.remove(&(tag.clone(), key.to_string()));
        for collection in &mut self.collections {
            if collection.tag() == tag {
                collection.remove_member(key);
            }
        }
    }
}

/// Walk a dotted path into a nested JSON value
fn extract_path<'a>(raw: &'a serde_json::Value, path: &str) -> Option<&'a serde_json::Value> {
    path.split('.').try_fold(raw, |v, segment| v.get(segment))
}

fn json_kind(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
