//! Process-wide descriptor catalog
//!
//! Descriptors are registered through `RegistryBuilder` at startup; `build`
//! freezes the catalog into an immutable `MetadataRegistry` that is shared
//! (typically behind an `Arc`) for the life of the process.

use std::collections::HashMap;

use remora_core_types::{EntityTag, ScopeTag};

use super::descriptor::{EntityDescriptor, OperationKind};
use crate::errors::{RemoraError, Result};

/// Accumulates descriptors during startup registration
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    entities: HashMap<EntityTag, EntityDescriptor>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one entity descriptor; a later registration under the same
    /// tag replaces the earlier one
    pub fn register(mut self, descriptor: EntityDescriptor) -> Self {
        self.entities.insert(descriptor.tag().clone(), descriptor);
        self
    }

    /// Freeze into an immutable registry
    pub fn build(self) -> MetadataRegistry {
        MetadataRegistry {
            entities: self.entities,
        }
    }
}

/// Immutable catalog of per-entity-type descriptors
#[derive(Debug)]
pub struct MetadataRegistry {
    entities: HashMap<EntityTag, EntityDescriptor>,
}

impl MetadataRegistry {
    /// Start a builder
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Look up the descriptor for an entity tag
    ///
    /// # Errors
    ///
    /// Returns `UnknownEntity` if no descriptor was registered for the tag.
    pub fn descriptor(&self, tag: &EntityTag) -> Result<&EntityDescriptor> {
        self.entities
            .get(tag)
            .ok_or_else(|| RemoraError::UnknownEntity {
                entity: tag.to_string(),
            })
    }

    /// Resolve the URI template for (entity, operation, scope)
    ///
    /// Prefers an exact scope match and falls back to the scope-less
    /// template.
    ///
    /// # Errors
    ///
    /// Returns `UnknownEntity` for an unregistered tag, or
    /// `MetadataMissing` when neither a scoped nor a scope-less template
    /// exists for the operation - a configuration bug, never retried.
    pub fn uri_template(
        &self,
        tag: &EntityTag,
        op: OperationKind,
        scope: Option<&ScopeTag>,
    ) -> Result<&str> {
        let descriptor = self.descriptor(tag)?;
        descriptor
            .uri_template(op, scope)
            .ok_or_else(|| RemoraError::MetadataMissing {
                entity: tag.to_string(),
                operation: match scope {
                    Some(s) => format!("{} (scope {})", op, s),
                    None => op.to_string(),
                },
            })
    }

    /// Number of registered entity types
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
