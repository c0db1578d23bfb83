//! Core types shared across Remora crates
//!
//! This crate provides foundational types used by the metadata registry,
//! query translator and engine:
//!
//! - **Tag types**: EntityTag, ScopeTag identifying remote resource kinds
//! - **Value**: the scalar value type carried in instance property bags
//! - **Correlation types**: RequestId, TraceId for tagging outbound requests

pub mod correlation;
pub mod tags;
pub mod value;

pub use correlation::{RequestId, TraceId};
pub use tags::{EntityTag, ScopeTag};
pub use value::Value;
