//! Paging controller integration tests
//!
//! Exercise the full load / next_page / all_pages flow against a scripted
//! transport, covering both cursor flavors, exhaustion, retry after a
//! failed page, client-side skip and the default page size.

mod common;

use std::sync::Arc;

use common::{fixture_registry, graph_config, page, rest_config, ScriptedTransport};
use remora_core::query::QueryBuilder;
use remora_core::{Context, Predicate, QueryDescriptor};
use remora_core_types::EntityTag;
use remora_engine::Session;

fn session(transport: Arc<ScriptedTransport>, config: remora_engine::SessionConfig) -> Session {
    Session::new(Arc::new(fixture_registry()), transport, config)
}

#[tokio::test]
async fn test_load_then_exhaust_then_noop() {
    let transport = Arc::new(ScriptedTransport::new());
    let session = session(transport.clone(), graph_config());
    let mut ctx = Context::new();
    let id = session.query(&mut ctx, EntityTag::new("item"), None, QueryDescriptor::default());

    assert!(!ctx.collection(id).paging().can_page());

    transport.enqueue(
        200,
        page(
            vec![serde_json::json!({"Id": "1"}), serde_json::json!({"Id": "2"})],
            "@odata.nextLink",
            Some("https://unit.test/api/items?$skiptoken=X"),
        ),
    );
    let merged = session.load(&mut ctx, id).await.unwrap();
    assert_eq!(merged, 2);
    assert!(ctx.collection(id).paging().can_page());
    assert!(!ctx.collection(id).paging().is_exhausted());

    transport.enqueue(
        200,
        page(vec![serde_json::json!({"Id": "3"})], "@odata.nextLink", None),
    );
    let merged = session.next_page(&mut ctx, id).await.unwrap();
    assert_eq!(merged, 1);
    assert!(ctx.collection(id).paging().is_exhausted());
    assert_eq!(ctx.collection(id).len(), 3);

    // Exhausted: further calls are no-ops and touch no network
    let merged = session.next_page(&mut ctx, id).await.unwrap();
    assert_eq!(merged, 0);
    assert_eq!(transport.sent_count(), 2);
}

#[tokio::test]
async fn test_graph_cursor_is_used_verbatim() {
    let transport = Arc::new(ScriptedTransport::new());
    let session = session(transport.clone(), graph_config());
    let mut ctx = Context::new();
    let id = session.query(&mut ctx, EntityTag::new("item"), None, QueryDescriptor::default());

    let next_link = "https://unit.test/api/items?$skiptoken=opaque%2Ftoken";
    transport.enqueue(
        200,
        page(vec![serde_json::json!({"Id": "1"})], "@odata.nextLink", Some(next_link)),
    );
    session.load(&mut ctx, id).await.unwrap();

    transport.enqueue(200, page(vec![], "@odata.nextLink", None));
    session.next_page(&mut ctx, id).await.unwrap();

    assert_eq!(transport.sent()[1].uri, next_link);
}

#[tokio::test]
async fn test_rest_cursor_reissues_query_with_skiptoken() {
    let transport = Arc::new(ScriptedTransport::new());
    let session = session(transport.clone(), rest_config());
    let mut ctx = Context::new();

    let registry = fixture_registry();
    let descriptor = registry.descriptor(&EntityTag::new("item")).unwrap();
    let query = QueryBuilder::for_entity(descriptor)
        .filter(Predicate::eq("Status", 1i64))
        .unwrap()
        .take(2)
        .build();
    let id = session.query(&mut ctx, EntityTag::new("item"), None, query);

    transport.enqueue(
        200,
        page(vec![serde_json::json!({"Id": "1"})], "@odata.skiptoken", Some("tok2")),
    );
    session.load(&mut ctx, id).await.unwrap();

    transport.enqueue(200, page(vec![], "@odata.skiptoken", None));
    session.next_page(&mut ctx, id).await.unwrap();

    let sent = transport.sent();
    assert_eq!(
        sent[0].uri,
        "https://unit.test/api/items?$filter=Status eq 1&$top=2"
    );
    assert_eq!(
        sent[1].uri,
        "https://unit.test/api/items?$filter=Status eq 1&$top=2&$skiptoken=tok2"
    );
}

#[tokio::test]
async fn test_all_pages_drains_and_is_idempotent() {
    let transport = Arc::new(ScriptedTransport::new());
    let session = session(transport.clone(), graph_config());
    let mut ctx = Context::new();
    let id = session.query(&mut ctx, EntityTag::new("item"), None, QueryDescriptor::default());

    transport.enqueue(
        200,
        page(vec![serde_json::json!({"Id": "1"})], "@odata.nextLink", Some("https://unit.test/p2")),
    );
    transport.enqueue(
        200,
        page(vec![serde_json::json!({"Id": "2"})], "@odata.nextLink", Some("https://unit.test/p3")),
    );
    transport.enqueue(
        200,
        page(vec![serde_json::json!({"Id": "3"})], "@odata.nextLink", None),
    );

    let total = session.all_pages(&mut ctx, id).await.unwrap();
    assert_eq!(total, 3);
    assert_eq!(ctx.collection(id).len(), 3);
    assert!(ctx.collection(id).paging().is_exhausted());

    // Idempotent after exhaustion
    let total = session.all_pages(&mut ctx, id).await.unwrap();
    assert_eq!(total, 0);
    assert_eq!(transport.sent_count(), 3);
}

#[tokio::test]
async fn test_failed_page_preserves_state_and_stays_retryable() {
    let transport = Arc::new(ScriptedTransport::new());
    let session = session(transport.clone(), graph_config());
    let mut ctx = Context::new();
    let id = session.query(&mut ctx, EntityTag::new("item"), None, QueryDescriptor::default());

    transport.enqueue(
        200,
        page(vec![serde_json::json!({"Id": "1"})], "@odata.nextLink", Some("https://unit.test/p2")),
    );
    session.load(&mut ctx, id).await.unwrap();

    transport.enqueue(503, serde_json::json!({"error": {"message": "unavailable"}}));
    let err = session.next_page(&mut ctx, id).await.unwrap_err();
    assert_eq!(err.code(), "ERR_TRANSPORT");
    assert!(err.is_retryable());

    // Cursor and merged data untouched by the failure
    assert_eq!(ctx.collection(id).len(), 1);
    assert_eq!(
        ctx.collection(id).paging().cursor(),
        Some("https://unit.test/p2")
    );

    // The pending page can be retried
    transport.enqueue(
        200,
        page(vec![serde_json::json!({"Id": "2"})], "@odata.nextLink", None),
    );
    let merged = session.next_page(&mut ctx, id).await.unwrap();
    assert_eq!(merged, 1);
    assert!(ctx.collection(id).paging().is_exhausted());
}

#[tokio::test]
async fn test_malformed_record_mid_page_keeps_page_retryable() {
    let transport = Arc::new(ScriptedTransport::new());
    let session = session(transport.clone(), graph_config());
    let mut ctx = Context::new();
    let id = session.query(&mut ctx, EntityTag::new("item"), None, QueryDescriptor::default());

    // Second record has no key field; the first merges before the error
    transport.enqueue(
        200,
        page(
            vec![
                serde_json::json!({"Id": "1", "Title": "A"}),
                serde_json::json!({"Title": "no key"}),
            ],
            "@odata.nextLink",
            None,
        ),
    );
    let err = session.load(&mut ctx, id).await.unwrap_err();
    assert_eq!(err.code(), "ERR_KEY_MISSING");

    // Partial page is visible, but no cursor state was recorded
    assert_eq!(ctx.collection(id).members(), &["1".to_string()]);
    assert!(!ctx.collection(id).paging().can_page());

    // Retrying the load re-fetches the page; the dedupe keeps one member
    transport.enqueue(
        200,
        page(
            vec![
                serde_json::json!({"Id": "1", "Title": "A"}),
                serde_json::json!({"Id": "2", "Title": "B"}),
            ],
            "@odata.nextLink",
            None,
        ),
    );
    session.load(&mut ctx, id).await.unwrap();
    assert_eq!(
        ctx.collection(id).members(),
        &["1".to_string(), "2".to_string()]
    );
    assert!(ctx.collection(id).paging().is_exhausted());
}

#[tokio::test]
async fn test_skip_is_applied_client_side() {
    let transport = Arc::new(ScriptedTransport::new());
    let session = session(transport.clone(), graph_config());
    let mut ctx = Context::new();

    let query = QueryDescriptor {
        skip: Some(2),
        ..Default::default()
    };
    let id = session.query(&mut ctx, EntityTag::new("item"), None, query);

    transport.enqueue(
        200,
        page(
            vec![
                serde_json::json!({"Id": "1"}),
                serde_json::json!({"Id": "2"}),
                serde_json::json!({"Id": "3"}),
            ],
            "@odata.nextLink",
            None,
        ),
    );
    session.load(&mut ctx, id).await.unwrap();

    // $skip never reaches the wire; slicing happens locally
    assert_eq!(transport.sent()[0].uri, "https://unit.test/api/items");
    assert_eq!(ctx.collection(id).members(), &["3".to_string()]);
    // Skipped instances still live in the identity map
    assert!(ctx.instance(&EntityTag::new("item"), "1").is_some());
}

#[tokio::test]
async fn test_default_page_size_applies_when_query_has_no_top() {
    let transport = Arc::new(ScriptedTransport::new());
    let config = graph_config().with_default_page_size(50);
    let session = session(transport.clone(), config);
    let mut ctx = Context::new();
    let id = session.query(&mut ctx, EntityTag::new("item"), None, QueryDescriptor::default());

    transport.enqueue(200, page(vec![], "@odata.nextLink", None));
    session.load(&mut ctx, id).await.unwrap();

    assert_eq!(transport.sent()[0].uri, "https://unit.test/api/items?$top=50");
}

#[tokio::test]
async fn test_child_collection_resolves_parent_scoped_template() {
    let transport = Arc::new(ScriptedTransport::new());
    let session = session(transport.clone(), graph_config());
    let mut ctx = Context::new();

    let registry = fixture_registry();
    let project = registry.descriptor(&EntityTag::new("project")).unwrap();
    ctx.merge_record(project, &serde_json::json!({"Id": "p1", "Name": "Apollo"}), None)
        .unwrap();

    let parent = remora_core::InstanceRef::new(EntityTag::new("project"), "p1");
    let id = session.query(
        &mut ctx,
        EntityTag::new("task"),
        Some(parent.clone()),
        QueryDescriptor::default(),
    );

    transport.enqueue(
        200,
        page(vec![serde_json::json!({"Id": "t1"})], "@odata.nextLink", None),
    );
    session.load(&mut ctx, id).await.unwrap();

    assert_eq!(
        transport.sent()[0].uri,
        "https://unit.test/api/projects(p1)/tasks"
    );
    // Merged members carry the owning parent back-reference
    let task = ctx.instance(&EntityTag::new("task"), "t1").unwrap();
    assert_eq!(task.parent(), Some(&parent));
}
