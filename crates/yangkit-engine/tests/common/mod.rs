use std::sync::Arc;

use yangkit_core::codec::EncodingFormat;
use yangkit_core::model::{EntityId, EntitySchema, EntityTree};
use yangkit_engine::session::mock::MockDataNode;
use yangkit_engine::DataNode;

pub const NS_IF: &str = "urn:ietf:params:xml:ns:yang:ietf-interfaces";
pub const NS_SYS: &str = "urn:example:system";

#[allow(dead_code)]
pub fn interfaces_schema() -> Arc<EntitySchema> {
    let interface = EntitySchema::builder("interface", NS_IF, "ietf-interfaces")
        .keys(&["name"])
        .leaf("description")
        .leaf("enabled")
        .build();
    EntitySchema::builder("interfaces", NS_IF, "ietf-interfaces")
        .top_level()
        .list(interface)
        .build()
}

#[allow(dead_code)]
pub fn system_schema() -> Arc<EntitySchema> {
    let ntp = EntitySchema::builder("ntp", NS_SYS, "example-system")
        .leaf("enabled")
        .build();
    EntitySchema::builder("system", NS_SYS, "example-system")
        .top_level()
        .leaf("hostname")
        .child(ntp)
        .build()
}

/// Filter selecting the whole `interfaces` container
#[allow(dead_code)]
pub fn interfaces_filter() -> EntityTree {
    EntityTree::new(interfaces_schema())
}

/// Filter selecting the whole `system` container
#[allow(dead_code)]
pub fn system_filter() -> EntityTree {
    EntityTree::new(system_schema())
}

/// Filter selecting one interface entry
#[allow(dead_code)]
pub fn interface_filter(name: &str) -> (EntityTree, EntityId) {
    let mut tree = interfaces_filter();
    let root = tree.root();
    let id = tree.add_child(root, "interface").unwrap();
    tree.set_value(id, "name", name).unwrap();
    (tree, id)
}

/// Device answer for the interfaces model: `eth0` and `eth1`
#[allow(dead_code)]
pub fn interfaces_document() -> String {
    format!(
        concat!(
            r#"<interfaces xmlns="{}">"#,
            "<interface><name>eth0</name><description>uplink</description></interface>",
            "<interface><name>eth1</name><description>downlink</description></interface>",
            "</interfaces>"
        ),
        NS_IF
    )
}

#[allow(dead_code)]
pub fn system_document() -> String {
    format!(
        r#"<system xmlns="{}"><hostname>edge-1</hostname><ntp><enabled>true</enabled></ntp></system>"#,
        NS_SYS
    )
}

/// Response holding only the interfaces document
#[allow(dead_code)]
pub fn interfaces_response() -> Arc<dyn DataNode> {
    let path = "/data/ietf-interfaces:interfaces";
    xml_response(&[(path, interfaces_document())])
}

/// Response root at `/data` whose children carry XML documents
#[allow(dead_code)]
pub fn xml_response(children: &[(&str, String)]) -> Arc<dyn DataNode> {
    let mut root = MockDataNode::new("/data");
    for (path, document) in children {
        root = root.with_child(
            MockDataNode::new(*path)
                .with_document(EncodingFormat::Xml, document.clone())
                .into_node(),
        );
    }
    root.into_node()
}
