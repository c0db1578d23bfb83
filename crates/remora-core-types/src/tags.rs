//! Tag types identifying remote resource kinds
//!
//! An `EntityTag` distinguishes one remote resource kind from another and is
//! the key under which an entity descriptor is registered. A `ScopeTag`
//! qualifies a URI template by the parent type a child collection is reached
//! from, so the same entity type can carry different templates per owner.

use serde::{Deserialize, Serialize};

/// Identifier for a remote resource kind (e.g. "account", "task")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityTag(String);

impl EntityTag {
    /// Create a tag from a name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EntityTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EntityTag {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Qualifier for a URI template, naming the parent type a child collection
/// is reached from
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScopeTag(String);

impl ScopeTag {
    /// Create a scope tag from a name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ScopeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ScopeTag {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
