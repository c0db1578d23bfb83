//! Entity and property descriptors
//!
//! Declarative per-type metadata (originally class/property annotations)
//! expressed as explicit registration structs - no runtime reflection.
//! Customization hooks that the original raised as events are injectable
//! strategy closures attached here at registration time.

use std::collections::HashMap;
use std::sync::Arc;

use remora_core_types::{EntityTag, ScopeTag};

use crate::model::Instance;

/// Operation kind a URI template is registered under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Fetch a single record by key
    Get,
    /// Create a record
    Add,
    /// Partially update a record
    Update,
    /// Delete a record
    Delete,
    /// Collection query (translated query string appended)
    Query,
}

impl OperationKind {
    /// Stable name used in error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Get => "Get",
            OperationKind::Add => "Add",
            OperationKind::Update => "Update",
            OperationKind::Delete => "Delete",
            OperationKind::Query => "Query",
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Descriptor for one remote field
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PropertyDescriptor {
    /// Remote field name
    pub name: String,

    /// Dotted path into a nested response value; path properties are always
    /// fetched whole and extracted after the response arrives
    pub path: Option<String>,

    /// Whether this field may appear in an expand set
    pub expandable: bool,

    /// Whether this field is expanded even when not requested
    pub expand_by_default: bool,

    /// Whether outgoing serialization goes through the payload hook instead
    /// of the default mapping
    pub custom_mapping: bool,
}

impl PropertyDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Read this property from a dotted path in the response
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Mark as a valid expand target
    pub fn expandable(mut self) -> Self {
        self.expandable = true;
        self
    }

    /// Expand even when the caller did not ask for it
    pub fn expand_by_default(mut self) -> Self {
        self.expandable = true;
        self.expand_by_default = true;
        self
    }

    /// Route outgoing serialization through the payload hook
    pub fn custom_mapping(mut self) -> Self {
        self.custom_mapping = true;
        self
    }
}

/// Strategy closure adjusting an outgoing mutation payload
pub type PayloadHook =
    Arc<dyn Fn(&Instance, &mut serde_json::Map<String, serde_json::Value>) + Send + Sync>;

/// Strategy closure post-processing a merged instance
pub type MergeHook = Arc<dyn Fn(&mut Instance, &serde_json::Value) + Send + Sync>;

/// Immutable per-entity-type descriptor
///
/// Holds the URI templates per (operation, optional scope), the key field
/// name and the ordered property list. Scope lets the same child collection
/// use different templates depending on which parent type it is reached
/// from.
#[derive(Clone)]
pub struct EntityDescriptor {
    tag: EntityTag,
    key_field: String,
    templates: HashMap<(OperationKind, Option<ScopeTag>), String>,
    properties: Vec<PropertyDescriptor>,
    payload_hook: Option<PayloadHook>,
    merge_hook: Option<MergeHook>,
}

impl EntityDescriptor {
    /// Start a descriptor for an entity type with the given key field
    pub fn new(tag: impl Into<EntityTag>, key_field: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            key_field: key_field.into(),
            templates: HashMap::new(),
            properties: Vec::new(),
            payload_hook: None,
            merge_hook: None,
        }
    }

    /// Register the scope-less URI template for an operation
    pub fn template(mut self, op: OperationKind, template: impl Into<String>) -> Self {
        self.templates.insert((op, None), template.into());
        self
    }

    /// Register a scoped URI template, used when reached via the named parent
    pub fn scoped_template(
        mut self,
        op: OperationKind,
        scope: impl Into<ScopeTag>,
        template: impl Into<String>,
    ) -> Self {
        self.templates
            .insert((op, Some(scope.into())), template.into());
        self
    }

    /// Append a property descriptor (order is preserved)
    pub fn property(mut self, property: PropertyDescriptor) -> Self {
        self.properties.push(property);
        self
    }

    /// Attach the mutation payload hook
    pub fn payload_hook(mut self, hook: PayloadHook) -> Self {
        self.payload_hook = Some(hook);
        self
    }

    /// Attach the merge post-processing hook
    pub fn merge_hook(mut self, hook: MergeHook) -> Self {
        self.merge_hook = Some(hook);
        self
    }

    /// Entity type tag
    pub fn tag(&self) -> &EntityTag {
        &self.tag
    }

    /// Key field name
    pub fn key_field(&self) -> &str {
        &self.key_field
    }

    /// Look up the URI template for an operation
    ///
    /// Prefers an exact scope match, falling back to the scope-less
    /// template. `None` when neither exists.
    pub fn uri_template(&self, op: OperationKind, scope: Option<&ScopeTag>) -> Option<&str> {
        if let Some(scope) = scope {
            if let Some(t) = self.templates.get(&(op, Some(scope.clone()))) {
                return Some(t.as_str());
            }
        }
        self.templates.get(&(op, None)).map(String::as_str)
    }

    /// Ordered property list
    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    /// Look up one property by remote field name
    pub fn property_named(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Registered payload hook, if any
    pub fn payload_hook_fn(&self) -> Option<&PayloadHook> {
        self.payload_hook.as_ref()
    }

    /// Registered merge hook, if any
    pub fn merge_hook_fn(&self) -> Option<&MergeHook> {
        self.merge_hook.as_ref()
    }
}

impl std::fmt::Debug for EntityDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityDescriptor")
            .field("tag", &self.tag)
            .field("key_field", &self.key_field)
            .field("templates", &self.templates)
            .field("properties", &self.properties)
            .field("payload_hook", &self.payload_hook.is_some())
            .field("merge_hook", &self.merge_hook.is_some())
            .finish()
    }
}
