//! Token resolver: URI template expansion
//!
//! A template is a literal string containing `{PropertyName}` or
//! `{Parent.PropertyName}` tokens (the `Parent.` hop chains to unbounded
//! depth). Resolution reads the named property off the instance or walks
//! the ownership chain through the context. A missing value or a missing
//! parent hop is a hard failure - silent empty substitution would produce a
//! structurally different but syntactically valid URI.

use remora_core_types::Value;

use crate::context::Context;
use crate::errors::{RemoraError, Result};
use crate::model::Instance;
use crate::protocol::{guid_uri_literal, ApiFlavor};

/// Expand a URI template against an instance and its ownership chain
///
/// `instance` is `None` for templates that must be fully literal (e.g. a
/// root collection); any token then fails resolution.
///
/// # Errors
///
/// Returns `UnresolvedToken` when a token value is absent, a parent hop
/// does not exist, a token is malformed, or the value has no URI form.
pub fn resolve(
    template: &str,
    instance: Option<&Instance>,
    ctx: &Context,
    flavor: ApiFlavor,
) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let close = after
            .find('}')
            .ok_or_else(|| RemoraError::UnresolvedToken {
                token: after.chars().take(32).collect(),
                reason: "unterminated token".to_string(),
            })?;
        let token = &after[..close];
        out.push_str(&resolve_token(token, instance, ctx, flavor)?);
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

fn resolve_token(
    token: &str,
    instance: Option<&Instance>,
    ctx: &Context,
    flavor: ApiFlavor,
) -> Result<String> {
    let mut current = instance.ok_or_else(|| RemoraError::UnresolvedToken {
        token: token.to_string(),
        reason: "no instance available for token resolution".to_string(),
    })?;

    let segments: Vec<&str> = token.split('.').collect();
    let (hops, field) = segments.split_at(segments.len() - 1);
    let field = field[0];
    if field.is_empty() {
        return Err(RemoraError::UnresolvedToken {
            token: token.to_string(),
            reason: "empty property name".to_string(),
        });
    }

    for hop in hops {
        if *hop != "Parent" {
            return Err(RemoraError::UnresolvedToken {
                token: token.to_string(),
                reason: format!("unexpected segment '{}' (only 'Parent' hops allowed)", hop),
            });
        }
        let parent_ref = current
            .parent()
            .ok_or_else(|| RemoraError::UnresolvedToken {
                token: token.to_string(),
                reason: format!("instance of type {} has no parent", current.tag()),
            })?;
        current = ctx
            .resolve_ref(parent_ref)
            .ok_or_else(|| RemoraError::UnresolvedToken {
                token: token.to_string(),
                reason: format!(
                    "parent {}({}) is not present in the context",
                    parent_ref.tag, parent_ref.key
                ),
            })?;
    }

    let value = current
        .get(field)
        .ok_or_else(|| RemoraError::UnresolvedToken {
            token: token.to_string(),
            reason: format!("property '{}' has no value on {}", field, current.tag()),
        })?;
    render_uri_value(token, value, flavor)
}

/// Render a property value into its URI segment form
fn render_uri_value(token: &str, value: &Value, flavor: ApiFlavor) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Guid(g) => Ok(guid_uri_literal(flavor, g)),
        Value::Int(i) => Ok(i.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Float(f) => Ok(f.to_string()),
        Value::DateTime(dt) => Ok(dt.to_rfc3339()),
        Value::Null | Value::Json(_) => Err(RemoraError::UnresolvedToken {
            token: token.to_string(),
            reason: "value has no URI literal form".to_string(),
        }),
    }
}
