use remora_core::metadata::{
    EntityDescriptor, MetadataRegistry, OperationKind, PropertyDescriptor,
};
use remora_core::model::{Instance, InstanceRef};
use remora_core::Context;
use remora_core_types::{EntityTag, Value};

/// Registry with a project/task ownership pair and a flat item entity
///
/// - `item`: root entity, key `Id`, used for identity-map and query tests
/// - `project`: root entity owning tasks
/// - `task`: reachable both standalone and scoped through `project`
#[allow(dead_code)]
pub fn fixture_registry() -> MetadataRegistry {
    MetadataRegistry::builder()
        .register(
            EntityDescriptor::new("item", "Id")
                .template(OperationKind::Get, "/items({Id})")
                .template(OperationKind::Query, "/items")
                .template(OperationKind::Add, "/items")
                .template(OperationKind::Update, "/items({Id})")
                .template(OperationKind::Delete, "/items({Id})")
                .property(PropertyDescriptor::new("Id"))
                .property(PropertyDescriptor::new("Title"))
                .property(PropertyDescriptor::new("Status"))
                .property(PropertyDescriptor::new("Owner").expandable())
                .property(PropertyDescriptor::new("OwnerName").with_path("Owner.Name")),
        )
        .register(
            EntityDescriptor::new("project", "Id")
                .template(OperationKind::Get, "/projects({Id})")
                .template(OperationKind::Query, "/projects")
                .property(PropertyDescriptor::new("Id"))
                .property(PropertyDescriptor::new("Name")),
        )
        .register(
            EntityDescriptor::new("task", "Id")
                .template(OperationKind::Query, "/tasks")
                .scoped_template(
                    OperationKind::Query,
                    "project",
                    "/projects({Parent.Id})/tasks",
                )
                .property(PropertyDescriptor::new("Id"))
                .property(PropertyDescriptor::new("Subject")),
        )
        .build()
}

/// Adopt a project instance into the context and return a ref to it
#[allow(dead_code)]
pub fn adopt_project(ctx: &mut Context, id: &str) -> InstanceRef {
    let mut project = Instance::new(EntityTag::new("project"));
    project.set_key(Value::from(id));
    project.set_loaded("Id", Value::from(id));
    ctx.adopt(project).unwrap();
    InstanceRef::new(EntityTag::new("project"), id)
}

/// A task instance owned by the given project
#[allow(dead_code)]
pub fn task_of(parent: InstanceRef) -> Instance {
    let mut task = Instance::new(EntityTag::new("task"));
    task.set_parent(parent);
    task
}
