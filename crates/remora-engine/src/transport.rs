//! Transport seam
//!
//! The engine never speaks HTTP itself; the embedding application supplies
//! an async send primitive through this trait. Status classification lives
//! here so every call site maps non-success responses to the same
//! retryable/terminal split.

use async_trait::async_trait;
use remora_core::errors::{RemoraError, Result};

use crate::request::RequestDescriptor;

/// Raw response handed back by the transport
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: serde_json::Value,
}

/// Async HTTP-send primitive supplied by the embedding application
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one request and return the raw response
    ///
    /// # Errors
    ///
    /// Returns `Transport` for connection-level failures; a response with a
    /// non-success status is returned as `Ok` and classified by the caller.
    async fn send(&self, request: RequestDescriptor) -> Result<TransportResponse>;

    /// Send an ordered group of requests as one exchange
    ///
    /// The default implementation executes sequentially in submission
    /// order; transports speaking a native multipart batch format override
    /// this.
    ///
    /// # Errors
    ///
    /// Returns `Transport` when the exchange itself fails.
    async fn send_batch(
        &self,
        requests: Vec<RequestDescriptor>,
    ) -> Result<Vec<TransportResponse>> {
        let mut responses = Vec::with_capacity(requests.len());
        for request in requests {
            responses.push(self.send(request).await?);
        }
        Ok(responses)
    }
}

/// Whether a status is worth retrying
///
/// Throttling and transient server-side failures are retryable; every
/// other non-success status (validation, auth, not-found) is terminal.
pub fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// Map a non-success response to a classified transport error
///
/// # Errors
///
/// Returns `Transport` for any status outside 2xx.
pub fn check_status(response: &TransportResponse) -> Result<()> {
    if (200..300).contains(&response.status) {
        return Ok(());
    }
    Err(status_error(response))
}

fn status_error(response: &TransportResponse) -> RemoraError {
    // OData error envelope: { "error": { "message": "..." } }
    let message = response
        .body
        .get("error")
        .and_then(|e| e.get("message"))
        .and_then(serde_json::Value::as_str)
        .unwrap_or("no error detail in response body")
        .to_string();
    RemoraError::Transport {
        status: response.status,
        retryable: is_retryable_status(response.status),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_statuses_pass() {
        for status in [200, 201, 204] {
            let response = TransportResponse {
                status,
                body: serde_json::Value::Null,
            };
            assert!(check_status(&response).is_ok());
        }
    }

    #[test]
    fn test_throttling_and_server_failures_are_retryable() {
        for status in [429, 500, 502, 503, 504] {
            let response = TransportResponse {
                status,
                body: serde_json::Value::Null,
            };
            let err = check_status(&response).unwrap_err();
            assert_eq!(err.code(), "ERR_TRANSPORT");
            assert!(err.is_retryable(), "status {} should retry", status);
        }
    }

    #[test]
    fn test_client_errors_are_terminal() {
        for status in [400, 401, 403, 404, 409] {
            let response = TransportResponse {
                status,
                body: serde_json::Value::Null,
            };
            let err = check_status(&response).unwrap_err();
            assert!(!err.is_retryable(), "status {} must not retry", status);
        }
    }

    #[test]
    fn test_error_envelope_message_is_surfaced() {
        let response = TransportResponse {
            status: 400,
            body: serde_json::json!({"error": {"message": "bad filter"}}),
        };
        let err = check_status(&response).unwrap_err();
        assert!(err.to_string().contains("bad filter"));
    }
}
