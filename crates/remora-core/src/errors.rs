//! Error taxonomy for Remora operations
//!
//! Translation-time failures (`UnsupportedQuery`, `NotExpandable`,
//! `UnknownField`) are raised before anything touches the network and are
//! never retried. `MetadataMissing` is a configuration bug, not a runtime
//! condition. Transport failures carry an HTTP status and a retryability
//! classification; retry policy itself belongs to the transport
//! collaborator, not to this crate.

use thiserror::Error;

/// Result type alias using RemoraError
pub type Result<T> = std::result::Result<T, RemoraError>;

/// Comprehensive error taxonomy for Remora operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RemoraError {
    // ===== Metadata Errors =====
    /// No descriptor registered for an entity tag
    #[error("Unknown entity type: {entity}")]
    UnknownEntity { entity: String },

    /// No URI template registered for an operation (neither scoped nor scope-less)
    #[error("No URI template for entity {entity}, operation {operation}")]
    MetadataMissing { entity: String, operation: String },

    // ===== Token Resolution Errors =====
    /// A URI template token could not be resolved from instance/parent state
    #[error("Unresolved token '{{{token}}}': {reason}")]
    UnresolvedToken { token: String, reason: String },

    // ===== Query Translation Errors =====
    /// Predicate shape has no protocol query-string equivalent
    #[error("Unsupported query: {reason}")]
    UnsupportedQuery { reason: String },

    /// Expand target is not marked expandable in the entity descriptor
    #[error("Field is not expandable: {field}")]
    NotExpandable { field: String },

    /// Field name is not described by the entity descriptor
    #[error("Unknown field '{field}' on entity {entity}")]
    UnknownField { entity: String, field: String },

    // ===== Mutation Errors =====
    /// Update requested with an empty change-tracking set
    #[error("Empty update for entity {entity}: no fields have been modified")]
    EmptyUpdate { entity: String },

    /// Record or instance has no usable key value
    #[error("Missing key for entity {entity}: {reason}")]
    KeyMissing { entity: String, reason: String },

    // ===== Batch Errors =====
    /// Request appended to a batch that was already flushed
    #[error("Batch was already flushed and cannot accept new requests")]
    BatchSealed,

    // ===== Transport Errors =====
    /// Transport-level failure, classified retryable or terminal
    #[error("Transport error (status {status}, retryable: {retryable}): {message}")]
    Transport {
        status: u16,
        retryable: bool,
        message: String,
    },

    // ===== Generic Errors =====
    /// Serialization error (JSON encoding/decoding)
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Generic internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl RemoraError {
    /// Get the stable error code for this error
    ///
    /// Codes are stable identifiers for programmatic handling and test
    /// assertions; display strings may change, codes do not.
    pub fn code(&self) -> &'static str {
        match self {
            RemoraError::UnknownEntity { .. } => "ERR_UNKNOWN_ENTITY",
            RemoraError::MetadataMissing { .. } => "ERR_METADATA_MISSING",
            RemoraError::UnresolvedToken { .. } => "ERR_UNRESOLVED_TOKEN",
            RemoraError::UnsupportedQuery { .. } => "ERR_UNSUPPORTED_QUERY",
            RemoraError::NotExpandable { .. } => "ERR_NOT_EXPANDABLE",
            RemoraError::UnknownField { .. } => "ERR_UNKNOWN_FIELD",
            RemoraError::EmptyUpdate { .. } => "ERR_EMPTY_UPDATE",
            RemoraError::KeyMissing { .. } => "ERR_KEY_MISSING",
            RemoraError::BatchSealed => "ERR_BATCH_SEALED",
            RemoraError::Transport { .. } => "ERR_TRANSPORT",
            RemoraError::Serialization { .. } => "ERR_SERIALIZATION",
            RemoraError::Internal { .. } => "ERR_INTERNAL",
        }
    }

    /// Whether a retry of the same request may succeed
    ///
    /// Only transport errors are ever retryable; every translation-time and
    /// caller-misuse error is terminal by construction.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RemoraError::Transport { retryable: true, .. })
    }
}

/// Conversion from serde_json::Error to RemoraError
impl From<serde_json::Error> for RemoraError {
    fn from(err: serde_json::Error) -> Self {
        RemoraError::Serialization {
            message: err.to_string(),
        }
    }
}
