//! Session configuration
//!
//! All engine behavior is configured through this explicit struct; there is
//! no environment sniffing. Token acquisition and refresh stay with the
//! caller - the engine consumes a resolved bearer token.

use remora_core::ApiFlavor;

/// Explicit configuration for one session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Target API flavor
    pub flavor: ApiFlavor,
    /// Base URI every relative request path is joined onto
    pub base_uri: String,
    /// Resolved bearer token sent on every request
    pub bearer_token: String,
    /// `$top` applied to collection queries that set none
    pub default_page_size: Option<u32>,
}

impl SessionConfig {
    pub fn new(
        flavor: ApiFlavor,
        base_uri: impl Into<String>,
        bearer_token: impl Into<String>,
    ) -> Self {
        Self {
            flavor,
            base_uri: base_uri.into(),
            bearer_token: bearer_token.into(),
            default_page_size: None,
        }
    }

    /// Set the default page size for queries that carry no `$top`
    pub fn with_default_page_size(mut self, size: u32) -> Self {
        self.default_page_size = Some(size);
        self
    }
}
