//! Paging controller
//!
//! Drives a collection through `Unloaded -> Loaded(HasMore) ->
//! Loaded(Exhausted)`. All state mutations happen only after a response
//! has been received and parsed, so a failed or cancelled fetch leaves the
//! cursor and merged data exactly as they were - calling again retries the
//! pending page.
//!
//! Cursor semantics differ per flavor: Graph endpoints return a complete
//! `nextLink` URL used verbatim for the next fetch; REST endpoints return
//! an opaque skip-token re-sent as a `$skiptoken` parameter on the
//! original query.

use remora_core::errors::{RemoraError, Result};
use remora_core::metadata::OperationKind;
use remora_core::query::to_query_string;
use remora_core::{token, Collection, CollectionId, Context, Instance, MetadataRegistry};
use remora_core_types::ScopeTag;

use crate::config::SessionConfig;
use crate::request::{self, RequestDescriptor};
use crate::transport::{check_status, Transport};

/// Fetch the first page of a collection's query
///
/// Merges every record into the identity map, applies the client-side skip
/// budget, and records the cursor. Returns the number of records merged.
///
/// # Errors
///
/// Returns metadata, token-resolution or translation errors before
/// touching the network, and `Transport` / `Serialization` afterwards.
pub async fn load(
    ctx: &mut Context,
    id: CollectionId,
    registry: &MetadataRegistry,
    transport: &dyn Transport,
    config: &SessionConfig,
) -> Result<usize> {
    let request = first_page_request(ctx, id, registry, config)?;
    fetch_page(ctx, id, registry, transport, request, config).await
}

/// Fetch the next page by cursor
///
/// No-op returning 0 unless the collection is loaded with more pages
/// available; in particular, calling after exhaustion is harmless.
///
/// # Errors
///
/// Same failure surface as [`load`]; a failure leaves the prior cursor in
/// place so the pending page stays retryable.
pub async fn next_page(
    ctx: &mut Context,
    id: CollectionId,
    registry: &MetadataRegistry,
    transport: &dyn Transport,
    config: &SessionConfig,
) -> Result<usize> {
    let request = {
        let collection = ctx.collection(id);
        let paging = collection.paging();
        if !paging.is_loaded() || paging.is_exhausted() {
            return Ok(0);
        }
        let cursor = paging.cursor().ok_or_else(|| RemoraError::Internal {
            message: "loaded collection with more pages carries no cursor".to_string(),
        })?;

        if config.flavor.cursor_is_next_link() {
            request::build_absolute_get(config, cursor)
        } else {
            let (path, query_string) = query_parts(ctx, collection, registry, config)?;
            let query_string = if query_string.is_empty() {
                format!("$skiptoken={}", cursor)
            } else {
                format!("{}&$skiptoken={}", query_string, cursor)
            };
            request::build_query(config, &path, &query_string)
        }
    };
    fetch_page(ctx, id, registry, transport, request, config).await
}

/// Drain the collection to exhaustion
///
/// Performs the initial load when the collection is still unloaded, then
/// follows cursors until the server stops returning one. Idempotent after
/// exhaustion. Returns the total number of records merged by this call.
///
/// # Errors
///
/// Same failure surface as [`load`].
pub async fn all_pages(
    ctx: &mut Context,
    id: CollectionId,
    registry: &MetadataRegistry,
    transport: &dyn Transport,
    config: &SessionConfig,
) -> Result<usize> {
    let mut total = 0;
    if !ctx.collection(id).paging().is_loaded() {
        total += load(ctx, id, registry, transport, config).await?;
    }
    while !ctx.collection(id).paging().is_exhausted() {
        total += next_page(ctx, id, registry, transport, config).await?;
    }
    Ok(total)
}

fn first_page_request(
    ctx: &Context,
    id: CollectionId,
    registry: &MetadataRegistry,
    config: &SessionConfig,
) -> Result<RequestDescriptor> {
    let collection = ctx.collection(id);
    let (path, query_string) = query_parts(ctx, collection, registry, config)?;
    Ok(request::build_query(config, &path, &query_string))
}

/// Resolve the collection's query URI path and serialized query string
fn query_parts(
    ctx: &Context,
    collection: &Collection,
    registry: &MetadataRegistry,
    config: &SessionConfig,
) -> Result<(String, String)> {
    let scope = collection
        .parent()
        .map(|parent| ScopeTag::new(parent.tag.as_str()));
    let template =
        registry.uri_template(collection.tag(), OperationKind::Query, scope.as_ref())?;
    let anchor = anchor_instance(collection);
    let path = token::resolve(template, anchor.as_ref(), ctx, config.flavor)?;

    let mut query = collection.query.clone();
    if query.top.is_none() {
        query.top = config.default_page_size;
    }
    let query_string = to_query_string(&query, config.flavor)?;
    Ok((path, query_string))
}

/// Transient instance used to resolve `{Parent.*}` tokens for a child
/// collection; a root collection needs none
fn anchor_instance(collection: &Collection) -> Option<Instance> {
    collection.parent().map(|parent| {
        let mut anchor = Instance::new(collection.tag().clone());
        anchor.set_parent(parent.clone());
        anchor
    })
}

/// Merge one fetched page into the collection
///
/// Records merge one at a time, so a malformed record mid-page (for
/// example one missing its key field) leaves the earlier records of that
/// page already merged when the error propagates. Cursor state is only
/// recorded after the whole page merged, so the page stays retryable and
/// the member dedupe makes the retry idempotent.
async fn fetch_page(
    ctx: &mut Context,
    id: CollectionId,
    registry: &MetadataRegistry,
    transport: &dyn Transport,
    request: RequestDescriptor,
    config: &SessionConfig,
) -> Result<usize> {
    let response = transport.send(request).await?;
    check_status(&response)?;

    let records = response
        .body
        .get("value")
        .and_then(serde_json::Value::as_array)
        .ok_or_else(|| RemoraError::Serialization {
            message: "query response carries no 'value' array".to_string(),
        })?;
    let cursor = response
        .body
        .get(config.flavor.cursor_field())
        .and_then(serde_json::Value::as_str)
        .map(str::to_string);

    let tag = ctx.collection(id).tag().clone();
    let descriptor = registry.descriptor(&tag)?;
    let merged = records.len();
    for record in records {
        ctx.merge_into(descriptor, id, record)?;
    }

    let collection = ctx.collection_mut(id);
    collection.apply_skip();
    collection.paging_mut().record_page(cursor);
    tracing::debug!(entity = %tag, merged, exhausted = collection.paging().is_exhausted(), "page merged");
    Ok(merged)
}
