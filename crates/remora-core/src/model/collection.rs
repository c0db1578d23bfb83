//! Collection - an ordered sequence of instances with paging state
//!
//! A collection holds member keys in response order; the instances
//! themselves live in the context's identity map so that repeated fetches of
//! the same key keep a single live object. Paging follows a small state
//! machine: `Unloaded -> Loaded(HasMore) -> Loaded(Exhausted)`.

use remora_core_types::EntityTag;

use super::instance::InstanceRef;
use crate::query::QueryDescriptor;

/// Handle addressing a collection inside its context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CollectionId(pub(crate) usize);

/// Cursor state for a paged collection
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PagingState {
    cursor: Option<String>,
    loaded: bool,
    exhausted: bool,
}

impl PagingState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether paging operations are meaningful yet
    ///
    /// False until the first page has been fetched - paging metadata (a
    /// cursor) only exists once a first response has been seen. This is
    /// intentional, not a bug.
    pub fn can_page(&self) -> bool {
        self.loaded
    }

    /// Whether the first page has been fetched
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Whether the server has no more pages to give
    pub fn is_exhausted(&self) -> bool {
        self.loaded && self.exhausted
    }

    /// The stored cursor, if the last response carried one
    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    /// Record the outcome of a successfully fetched page
    ///
    /// Transitions to `Loaded(HasMore)` when a cursor was returned, else
    /// `Loaded(Exhausted)`. Only called after a response has been fully
    /// parsed, so a failed or cancelled fetch never corrupts cursor state.
    pub fn record_page(&mut self, cursor: Option<String>) {
        self.loaded = true;
        self.exhausted = cursor.is_none();
        self.cursor = cursor;
    }
}

/// An ordered sequence of instances sharing one parent and one descriptor
#[derive(Debug, Clone)]
pub struct Collection {
    tag: EntityTag,
    parent: Option<InstanceRef>,
    members: Vec<String>,
    /// Pending/last query for this collection
    pub query: QueryDescriptor,
    paging: PagingState,
    /// Client-side skip budget remaining (consumed as pages arrive)
    skip_remaining: u32,
}

impl Collection {
    /// Create a new unloaded collection
    pub fn new(tag: EntityTag, parent: Option<InstanceRef>, query: QueryDescriptor) -> Self {
        let skip_remaining = query.skip.unwrap_or(0);
        Self {
            tag,
            parent,
            members: Vec::new(),
            query,
            paging: PagingState::new(),
            skip_remaining,
        }
    }

    /// Entity type of the members
    pub fn tag(&self) -> &EntityTag {
        &self.tag
    }

    /// The owning parent instance, if this is a child collection
    pub fn parent(&self) -> Option<&InstanceRef> {
        self.parent.as_ref()
    }

    /// Member key literals in response order
    pub fn members(&self) -> &[String] {
        &self.members
    }

    /// Number of members currently materialized
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Append a member key, preserving response order; a key already present
    /// is not appended again (the identity map merged it in place)
    pub fn push_member(&mut self, key: impl Into<String>) {
        let key = key.into();
        if !self.members.contains(&key) {
            self.members.push(key);
        }
    }

    /// Remove a member key (delete flow)
    pub fn remove_member(&mut self, key: &str) {
        self.members.retain(|k| k != key);
    }

    /// Paging state, read-only
    pub fn paging(&self) -> &PagingState {
        &self.paging
    }

    /// Paging state, mutable (engine use)
    pub fn paging_mut(&mut self) -> &mut PagingState {
        &mut self.paging
    }

    /// Consume the client-side skip budget against freshly appended members
    ///
    /// Removes up to `skip_remaining` keys from the front of the member list.
    /// Instances stay in the identity map; only membership is trimmed.
    pub fn apply_skip(&mut self) {
        if self.skip_remaining == 0 {
            return;
        }
        let n = (self.skip_remaining as usize).min(self.members.len());
        self.members.drain(..n);
        self.skip_remaining -= n as u32;
    }
}
