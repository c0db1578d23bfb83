//! Query translation
//!
//! Compiles a chain of query operators into a protocol-specific query
//! descriptor and, on demand, its serialized query string. Translation is
//! lazy: building a query never touches the network.

pub mod builder;
pub mod descriptor;
pub mod serialize;

pub use builder::QueryBuilder;
pub use descriptor::{CompareOp, OrderKey, Predicate, QueryDescriptor, SortDirection};
pub use serialize::to_query_string;
