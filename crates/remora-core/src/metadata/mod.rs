//! Metadata registry: per-entity-type descriptors
//!
//! An immutable, process-wide catalog mapping entity type tags to URI
//! templates, key fields and property mappings. Built once at startup via
//! `RegistryBuilder` and shared read-only afterward.

pub mod descriptor;
pub mod registry;

pub use descriptor::{
    EntityDescriptor, MergeHook, OperationKind, PayloadHook, PropertyDescriptor,
};
pub use registry::{MetadataRegistry, RegistryBuilder};
