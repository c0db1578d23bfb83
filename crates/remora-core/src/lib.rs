//! Remora Core - metadata-driven query translation for remote object graphs
//!
//! This crate provides the synchronous half of the engine that maps a typed
//! in-memory object graph onto REST-style and Graph-style HTTP JSON APIs:
//! - Entity descriptors and the immutable metadata registry
//! - The per-context identity map (one live instance per key)
//! - URI template token resolution against instance/parent state
//! - Declarative query building and deterministic query-string serialization
//! - Add/update mutation payload builders with change tracking
//!
//! The asynchronous half (request materialization, batching, paging) lives
//! in `remora-engine`.

pub mod context;
pub mod errors;
pub mod logging;
pub mod metadata;
pub mod model;
pub mod mutation;
pub mod protocol;
pub mod query;
pub mod token;

// Re-export commonly used types
pub use context::Context;
pub use errors::{RemoraError, Result};
pub use metadata::{EntityDescriptor, MetadataRegistry, OperationKind, PropertyDescriptor};
pub use model::{Collection, CollectionId, Instance, InstanceRef, PagingState};
pub use protocol::ApiFlavor;
pub use query::{Predicate, QueryBuilder, QueryDescriptor, SortDirection};
