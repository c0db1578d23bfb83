//! Remora Engine - async orchestration over `remora-core`
//!
//! The asynchronous half of the engine: request materialization, the
//! transport seam, the batch envelope, the paging controller and the
//! session facade. Everything here is runtime-agnostic; the embedding
//! application supplies the HTTP-send primitive through the [`Transport`]
//! trait.

pub mod batch;
pub mod config;
pub mod paging;
pub mod request;
pub mod session;
pub mod transport;

// Re-export commonly used types
pub use batch::{Batch, BatchOutcome};
pub use config::SessionConfig;
pub use request::{Method, RequestDescriptor};
pub use session::Session;
pub use transport::{Transport, TransportResponse};
