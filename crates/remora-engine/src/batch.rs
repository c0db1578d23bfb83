//! Batch envelope
//!
//! An ordered list of materialized requests flushed as one exchange. Items
//! execute in submission order within the exchange; independent batches may
//! flush concurrently. Outcomes are correlated back to callers by the
//! submission index `push` returned.

use remora_core::errors::{RemoraError, Result};
use remora_core_types::TraceId;

use crate::request::RequestDescriptor;
use crate::transport::{check_status, Transport, TransportResponse};

/// Per-item result of a batch flush, correlated by submission index
#[derive(Debug)]
pub struct BatchOutcome {
    pub index: usize,
    pub result: Result<TransportResponse>,
}

/// Ordered request envelope with one-shot flush semantics
#[derive(Debug)]
pub struct Batch {
    items: Vec<RequestDescriptor>,
    sealed: bool,
    trace: TraceId,
}

impl Batch {
    /// Create an empty batch with a fresh trace id
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            sealed: false,
            trace: TraceId::new(),
        }
    }

    /// Trace id shared by every request in this batch
    pub fn trace_id(&self) -> &TraceId {
        &self.trace
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append a request and return its submission index
    ///
    /// # Errors
    ///
    /// Returns `BatchSealed` once the batch has been flushed.
    pub fn push(&mut self, request: RequestDescriptor) -> Result<usize> {
        if self.sealed {
            return Err(RemoraError::BatchSealed);
        }
        self.items.push(request);
        Ok(self.items.len() - 1)
    }

    /// Flush the batch as one exchange and seal it
    ///
    /// Outcomes come back in submission order, one per pushed request, each
    /// carrying its own status classification. The batch is sealed even
    /// when the exchange fails - a request appended to a batch is
    /// immutable, and a half-executed envelope must not be re-flushed.
    ///
    /// # Errors
    ///
    /// Returns `Transport` when the exchange itself fails; per-item
    /// failures surface inside the outcomes instead.
    pub async fn flush(&mut self, transport: &dyn Transport) -> Result<Vec<BatchOutcome>> {
        self.sealed = true;
        let requests = std::mem::take(&mut self.items);
        tracing::info!(trace = %self.trace, count = requests.len(), "flushing batch");

        let responses = transport.send_batch(requests).await?;
        Ok(responses
            .into_iter()
            .enumerate()
            .map(|(index, response)| {
                let result = match check_status(&response) {
                    Ok(()) => Ok(response),
                    Err(err) => Err(err),
                };
                BatchOutcome { index, result }
            })
            .collect())
    }
}

impl Default for Batch {
    fn default() -> Self {
        Self::new()
    }
}
