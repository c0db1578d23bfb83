//! Request materialization
//!
//! Turns resolved URIs and payloads into transport-ready request
//! descriptors. Reads carry no body; mutation bodies come from the
//! mutation builders in `remora-core`. Every descriptor is tagged with a
//! fresh `RequestId` so transport logs correlate back to the operation
//! that produced them.

use remora_core::ApiFlavor;
use remora_core_types::RequestId;

use crate::config::SessionConfig;

/// HTTP method of a materialized request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully materialized request, ready for a transport to send
///
/// Once handed to a transport or appended to a batch, a descriptor is
/// never mutated.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    pub uri: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
    pub request_id: RequestId,
}

impl RequestDescriptor {
    /// Look up a header value by name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// GET a path under the configured base URI
pub fn build_get(config: &SessionConfig, path: &str) -> RequestDescriptor {
    materialize(config, Method::Get, join(config, path), None)
}

/// GET a collection query; the query string is appended when non-empty
pub fn build_query(config: &SessionConfig, path: &str, query_string: &str) -> RequestDescriptor {
    let uri = if query_string.is_empty() {
        join(config, path)
    } else {
        format!("{}?{}", join(config, path), query_string)
    };
    materialize(config, Method::Get, uri, None)
}

/// GET an absolute URL verbatim (nextLink cursors)
pub fn build_absolute_get(config: &SessionConfig, url: &str) -> RequestDescriptor {
    materialize(config, Method::Get, url.to_string(), None)
}

/// POST a payload to a path under the configured base URI
pub fn build_post(
    config: &SessionConfig,
    path: &str,
    body: serde_json::Value,
) -> RequestDescriptor {
    materialize(config, Method::Post, join(config, path), Some(body))
}

/// PATCH a payload to a path under the configured base URI
pub fn build_patch(
    config: &SessionConfig,
    path: &str,
    body: serde_json::Value,
) -> RequestDescriptor {
    materialize(config, Method::Patch, join(config, path), Some(body))
}

/// DELETE a path under the configured base URI
pub fn build_delete(config: &SessionConfig, path: &str) -> RequestDescriptor {
    materialize(config, Method::Delete, join(config, path), None)
}

fn materialize(
    config: &SessionConfig,
    method: Method,
    uri: String,
    body: Option<serde_json::Value>,
) -> RequestDescriptor {
    let request_id = RequestId::new();
    let headers = standard_headers(config, &request_id, body.is_some());
    RequestDescriptor {
        method,
        uri,
        headers,
        body,
        request_id,
    }
}

/// Standard header set: bearer auth, JSON content negotiation, the
/// correlation id, and the protocol version headers of the flavor
fn standard_headers(
    config: &SessionConfig,
    request_id: &RequestId,
    has_body: bool,
) -> Vec<(String, String)> {
    let mut headers = vec![
        (
            "Authorization".to_string(),
            format!("Bearer {}", config.bearer_token),
        ),
        ("Accept".to_string(), "application/json".to_string()),
        ("x-request-id".to_string(), request_id.to_string()),
    ];
    if has_body {
        headers.push(("Content-Type".to_string(), "application/json".to_string()));
    }
    match config.flavor {
        ApiFlavor::Rest => {
            headers.push(("DataServiceVersion".to_string(), "2.0".to_string()));
            headers.push(("MaxDataServiceVersion".to_string(), "3.0".to_string()));
        }
        ApiFlavor::Graph => {
            headers.push(("OData-Version".to_string(), "4.0".to_string()));
            headers.push(("OData-MaxVersion".to_string(), "4.0".to_string()));
        }
    }
    headers
}

fn join(config: &SessionConfig, path: &str) -> String {
    format!("{}{}", config.base_uri.trim_end_matches('/'), path)
}
