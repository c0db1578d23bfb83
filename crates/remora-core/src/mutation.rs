//! Mutation payload builders
//!
//! Add serializes every settable field of a newly constructed instance;
//! update serializes only the change-tracking set (partial-update
//! semantics). Delete needs no payload, only the resolved URI, so no
//! builder exists for it. Properties marked custom-mapping are left to the
//! descriptor's payload hook.

use crate::errors::{RemoraError, Result};
use crate::metadata::{EntityDescriptor, PropertyDescriptor};
use crate::model::Instance;

/// Whether a property participates in default outgoing serialization
fn settable(property: &PropertyDescriptor) -> bool {
    property.path.is_none() && !property.expandable && !property.custom_mapping
}

/// Build the payload for an add operation
///
/// Serializes all settable fields present on the instance using the
/// metadata property mappings, then lets the payload hook adjust the map.
pub fn build_add(descriptor: &EntityDescriptor, instance: &Instance) -> Result<serde_json::Value> {
    let mut map = serde_json::Map::new();
    for property in descriptor.properties() {
        if !settable(property) {
            continue;
        }
        if let Some(value) = instance.get(&property.name) {
            map.insert(property.name.clone(), value.to_json());
        }
    }
    if let Some(hook) = descriptor.payload_hook_fn() {
        hook(instance, &mut map);
    }
    Ok(serde_json::Value::Object(map))
}

/// Build the payload for a partial update
///
/// Serializes only fields in the change-tracking set.
///
/// # Errors
///
/// Returns `EmptyUpdate` when nothing has been modified - an update with no
/// changes is a caller error, not a silent no-op network call.
pub fn build_update(
    descriptor: &EntityDescriptor,
    instance: &Instance,
) -> Result<serde_json::Value> {
    if !instance.has_changes() {
        return Err(RemoraError::EmptyUpdate {
            entity: descriptor.tag().to_string(),
        });
    }

    let mut map = serde_json::Map::new();
    for field in instance.dirty_fields() {
        let Some(property) = descriptor.property_named(field) else {
            continue;
        };
        if !settable(property) {
            continue;
        }
        if let Some(value) = instance.get(field) {
            map.insert(field.to_string(), value.to_json());
        }
    }
    if let Some(hook) = descriptor.payload_hook_fn() {
        hook(instance, &mut map);
    }
    Ok(serde_json::Value::Object(map))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use remora_core_types::EntityTag;

    use crate::metadata::{OperationKind, PropertyDescriptor};

    fn descriptor() -> EntityDescriptor {
        EntityDescriptor::new("item", "Id")
            .template(OperationKind::Add, "/items")
            .property(PropertyDescriptor::new("Id"))
            .property(PropertyDescriptor::new("Title"))
            .property(PropertyDescriptor::new("Owner").expandable())
            .property(PropertyDescriptor::new("OwnerName").with_path("Owner.Name"))
    }

    #[test]
    fn test_build_add_serializes_settable_fields() {
        let d = descriptor();
        let mut instance = Instance::new(EntityTag::new("item"));
        instance.set("Title", "A");
        instance.set("OwnerName", "derived"); // path property, not settable

        let payload = build_add(&d, &instance).unwrap();
        assert_eq!(payload, serde_json::json!({"Title": "A"}));
    }

    #[test]
    fn test_build_update_empty_change_set_fails() {
        let d = descriptor();
        let instance = Instance::new(EntityTag::new("item"));

        let err = build_update(&d, &instance).unwrap_err();
        assert_eq!(err.code(), "ERR_EMPTY_UPDATE");
    }

    #[test]
    fn test_build_update_contains_exactly_the_dirty_field() {
        let d = descriptor();
        let mut instance = Instance::new(EntityTag::new("item"));
        instance.set_loaded("Id", "1".into());
        instance.set_loaded("Title", "old".into());
        instance.set("Title", "new");

        let payload = build_update(&d, &instance).unwrap();
        assert_eq!(payload, serde_json::json!({"Title": "new"}));
    }

    #[test]
    fn test_payload_hook_adjusts_map() {
        let d = descriptor()
            .property(PropertyDescriptor::new("Secret").custom_mapping())
            .payload_hook(Arc::new(|instance, map| {
                if let Some(v) = instance.get("Secret") {
                    map.insert("secret_field".to_string(), v.to_json());
                }
            }));
        let mut instance = Instance::new(EntityTag::new("item"));
        instance.set("Title", "A");
        instance.set("Secret", "s");

        let payload = build_add(&d, &instance).unwrap();
        assert_eq!(
            payload,
            serde_json::json!({"Title": "A", "secret_field": "s"})
        );
    }
}
