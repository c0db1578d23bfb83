//! Query string serialization
//!
//! Serialization order is fixed for determinism and testability: filter,
//! select, expand, orderby, top. The same logical query always yields the
//! same literal string. The client-side `skip` count is never serialized.

use super::descriptor::{Predicate, QueryDescriptor};
use crate::errors::{RemoraError, Result};
use crate::protocol::{filter_literal, quote_string, ApiFlavor};

/// Serialize a query descriptor into the protocol query string
///
/// Returns an empty string for an empty descriptor. Percent-encoding is the
/// transport's concern; this is the logical query string.
///
/// # Errors
///
/// Returns `UnsupportedQuery` for predicate values with no literal form.
pub fn to_query_string(query: &QueryDescriptor, flavor: ApiFlavor) -> Result<String> {
    let mut parts: Vec<String> = Vec::new();

    if let Some(filter) = &query.filter {
        parts.push(format!("$filter={}", render_predicate(filter, flavor)?));
    }
    if !query.select.is_empty() {
        parts.push(format!("$select={}", query.select.join(",")));
    }
    if !query.expand.is_empty() {
        parts.push(format!("$expand={}", query.expand.join(",")));
    }
    if !query.order_by.is_empty() {
        let keys: Vec<String> = query
            .order_by
            .iter()
            .map(|k| format!("{} {}", k.field, k.direction.as_str()))
            .collect();
        parts.push(format!("$orderby={}", keys.join(",")));
    }
    if let Some(top) = query.top {
        parts.push(format!("$top={}", top));
    }

    Ok(parts.join("&"))
}

fn render_predicate(predicate: &Predicate, flavor: ApiFlavor) -> Result<String> {
    match predicate {
        Predicate::Compare { field, op, value } => Ok(format!(
            "{} {} {}",
            field,
            op.as_str(),
            filter_literal(flavor, value)?
        )),
        Predicate::StartsWith { field, value } => {
            Ok(format!("startswith({},{})", field, quote_string(value)))
        }
        Predicate::Contains { field, value } => Ok(match flavor {
            // The REST flavor predates the contains() function
            ApiFlavor::Rest => format!("substringof({},{})", quote_string(value), field),
            ApiFlavor::Graph => format!("contains({},{})", field, quote_string(value)),
        }),
        Predicate::And(children) => render_junction(children, "and", flavor),
        Predicate::Or(children) => render_junction(children, "or", flavor),
    }
}

fn render_junction(children: &[Predicate], word: &str, flavor: ApiFlavor) -> Result<String> {
    if children.is_empty() {
        return Err(RemoraError::UnsupportedQuery {
            reason: format!("empty {} group", word),
        });
    }
    let rendered: Vec<String> = children
        .iter()
        .map(|c| render_predicate(c, flavor))
        .collect::<Result<_>>()?;
    Ok(format!("({})", rendered.join(&format!(" {} ", word))))
}
