//! Session - high-level CRUD and paging facade
//!
//! Owns the shared registry, the transport and the configuration, and
//! keeps the identity map honest around every operation: an insert
//! registers the echoed record (or the local instance), an update clears
//! the change set only after the server accepted it, a delete evicts the
//! instance and its collection memberships.
//!
//! Mutating operations take `&mut Context`, so two operations on the same
//! context can never be in flight at once. Callers wanting parallel work
//! use independent contexts.

use std::sync::Arc;

use remora_core::errors::{RemoraError, Result};
use remora_core::metadata::OperationKind;
use remora_core::{
    mutation, token, CollectionId, Context, Instance, InstanceRef, MetadataRegistry,
    QueryDescriptor,
};
use remora_core_types::{EntityTag, ScopeTag, Value};

use crate::batch::{Batch, BatchOutcome};
use crate::config::SessionConfig;
use crate::paging;
use crate::request::{self, RequestDescriptor};
use crate::transport::{check_status, Transport};

/// One caller's gateway to the remote APIs
pub struct Session {
    registry: Arc<MetadataRegistry>,
    transport: Arc<dyn Transport>,
    config: SessionConfig,
}

impl Session {
    pub fn new(
        registry: Arc<MetadataRegistry>,
        transport: Arc<dyn Transport>,
        config: SessionConfig,
    ) -> Self {
        Self {
            registry,
            transport,
            config,
        }
    }

    pub fn registry(&self) -> &MetadataRegistry {
        &self.registry
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Open a new unloaded collection over a query
    pub fn query(
        &self,
        ctx: &mut Context,
        tag: EntityTag,
        parent: Option<InstanceRef>,
        query: QueryDescriptor,
    ) -> CollectionId {
        ctx.new_collection(tag, parent, query)
    }

    /// Fetch a single record by key and merge it into the context
    ///
    /// Returns the canonical key literal the instance is registered under.
    ///
    /// # Errors
    ///
    /// Returns metadata or token-resolution errors before touching the
    /// network, and `Transport` / `Serialization` / `KeyMissing` afterwards.
    pub async fn fetch(&self, ctx: &mut Context, tag: &EntityTag, key: &Value) -> Result<String> {
        let request = self.fetch_request(ctx, tag, key)?;
        tracing::info!(entity = %tag, request = %request.request_id, "fetch");
        let response = self.transport.send(request).await?;
        check_status(&response)?;

        let descriptor = self.registry.descriptor(tag)?;
        ctx.merge_record(descriptor, &response.body, None)
    }

    /// Add a new record built from a locally constructed instance
    ///
    /// When the server echoes the created record, the echo is merged and
    /// wins over local state; a body-less success registers the local
    /// instance under its own key instead.
    ///
    /// # Errors
    ///
    /// Returns `KeyMissing` when neither the echo nor the instance carries
    /// a usable key, plus the usual materialization and transport errors.
    pub async fn insert(&self, ctx: &mut Context, instance: Instance) -> Result<String> {
        let tag = instance.tag().clone();
        let request = self.insert_request(ctx, &instance)?;
        tracing::info!(entity = %tag, request = %request.request_id, "insert");
        let response = self.transport.send(request).await?;
        check_status(&response)?;

        let descriptor = self.registry.descriptor(&tag)?;
        let parent = instance.parent().cloned();
        let echoed = response
            .body
            .as_object()
            .is_some_and(|obj| obj.contains_key(descriptor.key_field()));
        if echoed {
            // Seed the slot with the local state first so fields the server
            // does not echo survive the merge
            if instance.key_literal().is_some() {
                ctx.adopt(instance)?;
            }
            ctx.merge_record(descriptor, &response.body, parent)
        } else {
            ctx.adopt(instance)
        }
    }

    /// Send the dirty fields of a live instance as a partial update
    ///
    /// The change set is cleared only after the server accepted the patch.
    ///
    /// # Errors
    ///
    /// Returns `EmptyUpdate` for an unmodified instance and `KeyMissing`
    /// when no live instance exists under the key, plus the usual
    /// materialization and transport errors.
    pub async fn update(&self, ctx: &mut Context, tag: &EntityTag, key: &str) -> Result<()> {
        let request = self.update_request(ctx, tag, key)?;
        tracing::info!(entity = %tag, key, request = %request.request_id, "update");
        let response = self.transport.send(request).await?;
        check_status(&response)?;

        if let Some(instance) = ctx.instance_mut(tag, key) {
            instance.clear_dirty();
        }
        Ok(())
    }

    /// Delete a live instance remotely and evict it from the context
    ///
    /// # Errors
    ///
    /// Returns `KeyMissing` when no live instance exists under the key,
    /// plus the usual materialization and transport errors.
    pub async fn delete(&self, ctx: &mut Context, tag: &EntityTag, key: &str) -> Result<()> {
        let request = self.delete_request(ctx, tag, key)?;
        tracing::info!(entity = %tag, key, request = %request.request_id, "delete");
        let response = self.transport.send(request).await?;
        check_status(&response)?;

        ctx.evict(tag, key);
        Ok(())
    }

    /// Fetch the first page of a collection's query
    ///
    /// # Errors
    ///
    /// See [`paging::load`].
    pub async fn load(&self, ctx: &mut Context, id: CollectionId) -> Result<usize> {
        paging::load(ctx, id, &self.registry, self.transport.as_ref(), &self.config).await
    }

    /// Fetch the next page of a loaded collection; no-op after exhaustion
    ///
    /// # Errors
    ///
    /// See [`paging::next_page`].
    pub async fn next_page(&self, ctx: &mut Context, id: CollectionId) -> Result<usize> {
        paging::next_page(ctx, id, &self.registry, self.transport.as_ref(), &self.config).await
    }

    /// Drain a collection to exhaustion
    ///
    /// # Errors
    ///
    /// See [`paging::all_pages`].
    pub async fn all_pages(&self, ctx: &mut Context, id: CollectionId) -> Result<usize> {
        paging::all_pages(ctx, id, &self.registry, self.transport.as_ref(), &self.config).await
    }

    /// Start an empty batch envelope
    pub fn batch(&self) -> Batch {
        Batch::new()
    }

    /// Flush a batch through this session's transport
    ///
    /// # Errors
    ///
    /// See [`Batch::flush`].
    pub async fn flush(&self, batch: &mut Batch) -> Result<Vec<BatchOutcome>> {
        batch.flush(self.transport.as_ref()).await
    }

    // ----- request materialization (usable directly for batching) -----

    /// Materialize a fetch-by-key request without sending it
    ///
    /// # Errors
    ///
    /// Returns metadata or token-resolution errors.
    pub fn fetch_request(
        &self,
        ctx: &Context,
        tag: &EntityTag,
        key: &Value,
    ) -> Result<RequestDescriptor> {
        let descriptor = self.registry.descriptor(tag)?;
        let template = self.registry.uri_template(tag, OperationKind::Get, None)?;

        // Transient anchor carrying just the key field for token resolution
        let mut probe = Instance::new(tag.clone());
        probe.set_key(key.clone());
        probe.set_loaded(descriptor.key_field().to_string(), key.clone());
        let path = token::resolve(template, Some(&probe), ctx, self.config.flavor)?;
        Ok(request::build_get(&self.config, &path))
    }

    /// Materialize an insert request without sending it
    ///
    /// # Errors
    ///
    /// Returns metadata, token-resolution or payload errors.
    pub fn insert_request(&self, ctx: &Context, instance: &Instance) -> Result<RequestDescriptor> {
        let tag = instance.tag();
        let descriptor = self.registry.descriptor(tag)?;
        let scope = scope_of(instance.parent());
        let template = self
            .registry
            .uri_template(tag, OperationKind::Add, scope.as_ref())?;
        let path = token::resolve(template, Some(instance), ctx, self.config.flavor)?;
        let payload = mutation::build_add(descriptor, instance)?;
        Ok(request::build_post(&self.config, &path, payload))
    }

    /// Materialize a partial-update request without sending it
    ///
    /// # Errors
    ///
    /// Returns `EmptyUpdate` for an unmodified instance and `KeyMissing`
    /// when no live instance exists under the key.
    pub fn update_request(
        &self,
        ctx: &Context,
        tag: &EntityTag,
        key: &str,
    ) -> Result<RequestDescriptor> {
        let descriptor = self.registry.descriptor(tag)?;
        let instance = self.live_instance(ctx, tag, key)?;
        let payload = mutation::build_update(descriptor, instance)?;

        let scope = scope_of(instance.parent());
        let template = self
            .registry
            .uri_template(tag, OperationKind::Update, scope.as_ref())?;
        let path = token::resolve(template, Some(instance), ctx, self.config.flavor)?;
        Ok(request::build_patch(&self.config, &path, payload))
    }

    /// Materialize a delete request without sending it
    ///
    /// # Errors
    ///
    /// Returns `KeyMissing` when no live instance exists under the key.
    pub fn delete_request(
        &self,
        ctx: &Context,
        tag: &EntityTag,
        key: &str,
    ) -> Result<RequestDescriptor> {
        let instance = self.live_instance(ctx, tag, key)?;
        let scope = scope_of(instance.parent());
        let template = self
            .registry
            .uri_template(tag, OperationKind::Delete, scope.as_ref())?;
        let path = token::resolve(template, Some(instance), ctx, self.config.flavor)?;
        Ok(request::build_delete(&self.config, &path))
    }

    fn live_instance<'c>(
        &self,
        ctx: &'c Context,
        tag: &EntityTag,
        key: &str,
    ) -> Result<&'c Instance> {
        ctx.instance(tag, key).ok_or_else(|| RemoraError::KeyMissing {
            entity: tag.to_string(),
            reason: format!("no live instance registered under key '{}'", key),
        })
    }
}

fn scope_of(parent: Option<&InstanceRef>) -> Option<ScopeTag> {
    parent.map(|p| ScopeTag::new(p.tag.as_str()))
}
