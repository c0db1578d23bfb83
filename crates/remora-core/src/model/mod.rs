//! In-memory object graph: instances and collections
//!
//! An `Instance` is a property bag with change tracking; a `Collection` is
//! an ordered sequence of instances sharing one parent and one descriptor.
//! Both are owned exclusively by the `Context` that created them.

pub mod collection;
pub mod instance;

pub use collection::{Collection, CollectionId, PagingState};
pub use instance::{Instance, InstanceRef};
