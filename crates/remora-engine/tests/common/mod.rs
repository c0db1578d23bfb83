use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use remora_core::errors::Result;
use remora_core::metadata::{
    EntityDescriptor, MetadataRegistry, OperationKind, PropertyDescriptor,
};
use remora_core::ApiFlavor;
use remora_engine::{RequestDescriptor, SessionConfig, Transport, TransportResponse};

/// Transport replaying a scripted queue of responses, recording every
/// request it was handed
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<TransportResponse>>,
    log: Mutex<Vec<RequestDescriptor>>,
}

#[allow(dead_code)]
impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&self, status: u16, body: serde_json::Value) {
        self.responses
            .lock()
            .unwrap()
            .push_back(TransportResponse { status, body });
    }

    /// Every request sent so far, in order
    pub fn sent(&self) -> Vec<RequestDescriptor> {
        self.log.lock().unwrap().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.log.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: RequestDescriptor) -> Result<TransportResponse> {
        self.log.lock().unwrap().push(request);
        let response = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("transport script exhausted");
        Ok(response)
    }
}

/// Registry with a flat item entity plus a project/task ownership pair
#[allow(dead_code)]
pub fn fixture_registry() -> MetadataRegistry {
    MetadataRegistry::builder()
        .register(
            EntityDescriptor::new("item", "Id")
                .template(OperationKind::Get, "/items({Id})")
                .template(OperationKind::Query, "/items")
                .template(OperationKind::Add, "/items")
                .template(OperationKind::Update, "/items({Id})")
                .template(OperationKind::Delete, "/items({Id})")
                .property(PropertyDescriptor::new("Id"))
                .property(PropertyDescriptor::new("Title"))
                .property(PropertyDescriptor::new("Status")),
        )
        .register(
            EntityDescriptor::new("project", "Id")
                .template(OperationKind::Get, "/projects({Id})")
                .template(OperationKind::Query, "/projects")
                .property(PropertyDescriptor::new("Id"))
                .property(PropertyDescriptor::new("Name")),
        )
        .register(
            EntityDescriptor::new("task", "Id")
                .template(OperationKind::Query, "/tasks")
                .scoped_template(
                    OperationKind::Query,
                    "project",
                    "/projects({Parent.Id})/tasks",
                )
                .property(PropertyDescriptor::new("Id"))
                .property(PropertyDescriptor::new("Subject")),
        )
        .build()
}

#[allow(dead_code)]
pub fn graph_config() -> SessionConfig {
    SessionConfig::new(ApiFlavor::Graph, "https://unit.test/api", "t0ken")
}

#[allow(dead_code)]
pub fn rest_config() -> SessionConfig {
    SessionConfig::new(ApiFlavor::Rest, "https://unit.test/api", "t0ken")
}

/// Build a query response page; `cursor_field` is the flavor's cursor key
#[allow(dead_code)]
pub fn page(
    records: Vec<serde_json::Value>,
    cursor_field: &str,
    cursor: Option<&str>,
) -> serde_json::Value {
    let mut body = serde_json::json!({ "value": records });
    if let Some(c) = cursor {
        body[cursor_field] = serde_json::Value::String(c.to_string());
    }
    body
}
