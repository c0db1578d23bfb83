//! Protocol flavor and literal rendering
//!
//! The two target APIs agree on the `$`-prefixed query option names but
//! differ in literal quoting (GUIDs, date-times), in the string-contains
//! function, and in how paging cursors come back. Everything
//! flavor-dependent lives here so the translator and engine stay
//! flavor-agnostic.

use chrono::SecondsFormat;
use remora_core_types::Value;
use uuid::Uuid;

use crate::errors::{RemoraError, Result};

/// Target API flavor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiFlavor {
    /// REST-style OData endpoint (legacy literal quoting, skip-token cursors)
    Rest,
    /// Graph-style endpoint (bare literals, nextLink cursors)
    Graph,
}

impl ApiFlavor {
    /// Response field carrying the paging cursor for this flavor
    ///
    /// Graph endpoints return a full `nextLink` URL; REST endpoints return
    /// an opaque skip-token re-sent as a `$skiptoken` query parameter.
    pub fn cursor_field(&self) -> &'static str {
        match self {
            ApiFlavor::Rest => "@odata.skiptoken",
            ApiFlavor::Graph => "@odata.nextLink",
        }
    }

    /// Whether the cursor is a complete URL usable verbatim for the next fetch
    pub fn cursor_is_next_link(&self) -> bool {
        matches!(self, ApiFlavor::Graph)
    }
}

/// Render a GUID for use inside a URI key segment
///
/// Both flavors accept the bare hyphenated form between parentheses.
pub fn guid_uri_literal(_flavor: ApiFlavor, guid: &Uuid) -> String {
    guid.to_string()
}

/// Render a value as a `$filter` expression literal
///
/// # Errors
///
/// Returns `UnsupportedQuery` for values with no literal form (nested JSON).
pub fn filter_literal(flavor: ApiFlavor, value: &Value) -> Result<String> {
    match value {
        Value::Null => Ok("null".to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Int(i) => Ok(i.to_string()),
        Value::Float(f) => Ok(f.to_string()),
        Value::String(s) => Ok(quote_string(s)),
        Value::Guid(g) => Ok(match flavor {
            ApiFlavor::Rest => format!("guid'{}'", g),
            ApiFlavor::Graph => g.to_string(),
        }),
        Value::DateTime(dt) => {
            let iso = dt.to_rfc3339_opts(SecondsFormat::Secs, true);
            Ok(match flavor {
                ApiFlavor::Rest => format!("datetime'{}'", iso),
                ApiFlavor::Graph => iso,
            })
        }
        Value::Json(_) => Err(RemoraError::UnsupportedQuery {
            reason: "nested JSON values cannot appear in a filter expression".to_string(),
        }),
    }
}

/// Quote a string literal, doubling embedded single quotes
pub fn quote_string(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}
