use std::sync::Arc;

use yangkit_core::model::{AugmentCapabilities, EntityId, EntitySchema, EntityTree};

pub const NS_IF: &str = "urn:ietf:params:xml:ns:yang:ietf-interfaces";
pub const NS_IANA: &str = "urn:ietf:params:xml:ns:yang:iana-if-type";
pub const NS_EXT: &str = "http://example.com/ns/example-interface-ext";
pub const NS_RPC: &str = "urn:example:rpc";

/// Declared name of the augment container under `interface`
pub const EXT_CHILD: &str = "example-interface-ext:ext";

/// `ietf-interfaces:interfaces` with a keyed `interface` list, an augment
/// container from another namespace and an identity-typed `type` leaf
#[allow(dead_code)]
pub fn interfaces_schema() -> Arc<EntitySchema> {
    build_interfaces(None)
}

/// Same model, carrying an augment hook that maps `augment_namespace` onto
/// the extension module
#[allow(dead_code)]
pub fn interfaces_schema_with_augment(augment_namespace: &'static str) -> Arc<EntitySchema> {
    let hook = AugmentCapabilities::new(move |table| {
        table.insert_module(augment_namespace, "example-interface-ext");
    });
    build_interfaces(Some(hook))
}

fn build_interfaces(hook: Option<AugmentCapabilities>) -> Arc<EntitySchema> {
    let ext = EntitySchema::builder("ext", NS_EXT, "example-interface-ext")
        .leaf("mirror")
        .build();
    let loopback = EntitySchema::builder("loopback", NS_IF, "ietf-interfaces")
        .presence()
        .leaf("mode")
        .build();
    let interface = EntitySchema::builder("interface", NS_IF, "ietf-interfaces")
        .keys(&["name"])
        .leaf("description")
        .leaf("type")
        .leaf("enabled")
        .child(loopback)
        .child(ext)
        .build();

    let builder = EntitySchema::builder("interfaces", NS_IF, "ietf-interfaces")
        .top_level()
        .list(interface)
        .identity("ethernetCsmacd", NS_IANA, "iana-if-type")
        .identity("softwareLoopback", NS_IANA, "iana-if-type");
    match hook {
        Some(hook) => builder.augment_capabilities(hook).build(),
        None => builder.build(),
    }
}

/// `example-rpc:reset-interface` with an `input` container
#[allow(dead_code)]
pub fn rpc_schema() -> Arc<EntitySchema> {
    let input = EntitySchema::builder("input", NS_RPC, "example-rpc")
        .leaf("name")
        .leaf("force")
        .build();
    EntitySchema::builder("reset-interface", NS_RPC, "example-rpc")
        .top_level()
        .child(input)
        .build()
}

#[allow(dead_code)]
pub fn new_interfaces() -> EntityTree {
    EntityTree::new(interfaces_schema())
}

/// Append an `interface` entry keyed by `name`
#[allow(dead_code)]
pub fn add_interface(tree: &mut EntityTree, name: &str) -> EntityId {
    let root = tree.root();
    let id = tree.add_child(root, "interface").unwrap();
    tree.set_value(id, "name", name).unwrap();
    id
}

/// A sparse filter tree selecting one interface; returns the tree and the
/// interface handle
#[allow(dead_code)]
pub fn interface_filter(name: &str) -> (EntityTree, EntityId) {
    let mut tree = new_interfaces();
    let id = add_interface(&mut tree, name);
    (tree, id)
}
