use tracing::{debug, error};

use crate::errors::YangkitError;
use crate::model::{EntityId, EntityRef, EntityTree};

/// Empty template of the top-level entity a filter hangs under
///
/// Walks parent links from `filter` to its root. Returns `None` (logged as
/// `FilterNotRooted`) if that root is not a top-level class.
pub fn get_top_entity_from_filter(filter: EntityRef<'_>) -> Option<EntityTree> {
    let mut current = filter;
    while let Some(parent) = current.parent() {
        current = parent;
    }

    if current.is_top_level_class() {
        return current.tree().clone_template(current.id()).ok();
    }

    let err = YangkitError::FilterNotRooted {
        path: filter.absolute_path(),
    };
    error!(reason = %err, "Could not resolve top-level entity for filter");
    None
}

/// Locate the entity in `tree` whose absolute path equals the filter's
///
/// Checks `from` itself, then the filter's segment among `from`'s direct
/// children, then every descendant depth first in key order.
pub fn find_child_entity(
    tree: &EntityTree,
    from: EntityId,
    filter: EntityRef<'_>,
) -> Option<EntityId> {
    let wanted = filter.absolute_path();
    if tree.absolute_path(from) == wanted {
        return Some(from);
    }

    let children = tree.children(from).ok()?;
    if let Some(&direct) = children.get(&filter.segment_path()) {
        if tree.absolute_path(direct) == wanted {
            return Some(direct);
        }
    }

    children
        .values()
        .find_map(|child| find_child_entity(tree, *child, filter))
}

/// Extract the subtree of `tree` denoted by `filter`
///
/// A top-level filter matching the root returns `tree` unchanged; a top-level
/// filter of another type is logged and yields `None`. Any other match is
/// detached into a new tree whose root has no parent.
pub fn get_child_entity_from_top(
    mut tree: EntityTree,
    filter: EntityRef<'_>,
) -> Option<EntityTree> {
    let root = tree.root();
    if filter.is_top_level_class() {
        let filter_path = filter.absolute_path();
        let root_path = tree.absolute_path(root);
        if filter_path == root_path {
            return Some(tree);
        }
        error!(
            "Top entity '{}' does not match the filter '{}'",
            root_path, filter_path
        );
        return None;
    }

    let Some(found) = find_child_entity(&tree, root, filter) else {
        debug!("No entity matching '{}' found", filter.absolute_path());
        return None;
    };
    if found == root {
        return Some(tree);
    }
    match tree.detach(found) {
        Ok(detached) => Some(detached),
        Err(err) => {
            error!(reason = %err, "Could not detach matched entity");
            None
        }
    }
}

/// `[seg, seg, ...]` rendering of a filter list for log lines
pub fn entity_list_to_string(filters: &[EntityRef<'_>]) -> String {
    let segments: Vec<String> = filters.iter().map(|f| f.segment_path()).collect();
    format!("[{}]", segments.join(", "))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::model::EntitySchema;

    const NS: &str = "urn:example:system";

    fn schema() -> Arc<EntitySchema> {
        let server = EntitySchema::builder("server", NS, "example-system")
            .keys(&["address"])
            .leaf("port")
            .build();
        let ntp = EntitySchema::builder("ntp", NS, "example-system")
            .leaf("enabled")
            .list(server)
            .build();
        EntitySchema::builder("system", NS, "example-system")
            .top_level()
            .leaf("hostname")
            .child(ntp)
            .build()
    }

    #[test]
    fn test_top_entity_is_fresh_template() {
        let mut tree = EntityTree::new(schema());
        let root = tree.root();
        tree.set_value(root, "hostname", "r1").unwrap();
        let ntp = tree.add_child(root, "ntp").unwrap();

        let top = get_top_entity_from_filter(tree.at(ntp).unwrap()).unwrap();
        assert_eq!(top.len(), 1);
        assert!(!top.has_data(top.root()));
        assert_eq!(top.yang_name(top.root()), "system");
    }

    #[test]
    fn test_unrooted_filter_yields_none() {
        let ntp_schema = schema().child("ntp").unwrap().schema.clone();
        let tree = EntityTree::new(ntp_schema);
        assert!(get_top_entity_from_filter(tree.root_ref()).is_none());
    }

    #[test]
    fn test_find_uses_depth_first_fallback() {
        let mut full = EntityTree::new(schema());
        let root = full.root();
        let ntp = full.add_child(root, "ntp").unwrap();
        let server = full.add_child(ntp, "server").unwrap();
        full.set_value(server, "address", "10.0.0.1").unwrap();

        let mut filter = EntityTree::new(schema());
        let f_root = filter.root();
        let f_ntp = filter.add_child(f_root, "ntp").unwrap();
        let f_server = filter.add_child(f_ntp, "server").unwrap();
        filter.set_value(f_server, "address", "10.0.0.1").unwrap();

        let found = find_child_entity(&full, root, filter.at(f_server).unwrap());
        assert_eq!(found, Some(server));
    }

    #[test]
    fn test_entity_list_to_string() {
        let mut tree = EntityTree::new(schema());
        let root = tree.root();
        let ntp = tree.add_child(root, "ntp").unwrap();
        let refs = [tree.root_ref(), tree.at(ntp).unwrap()];
        assert_eq!(entity_list_to_string(&refs), "[example-system:system, ntp]");
    }
}
