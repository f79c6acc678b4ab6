//! Response correlation
//!
//! Maps the direct children of an RPC response back onto request filters in
//! two phases:
//!
//! 1. Prefix: the first key (in key order) that is a string prefix of the
//!    filter's absolute path. The entry stays in the index.
//! 2. Name: the filter's own exact key is dropped, then the first remaining
//!    key containing the filter's yang name is claimed and removed.
//!
//! Phase 2 is best effort. Two filters sharing a yang name, with only one
//! of them answered, can be mapped onto the wrong fragment.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;
use yangkit_core::model::EntityRef;

use crate::session::DataNode;

/// Response children keyed by path relative to the response root
pub struct ResponseIndex {
    entries: BTreeMap<String, Arc<dyn DataNode>>,
}

impl ResponseIndex {
    /// Index every direct child of `root`
    pub fn new(root: &dyn DataNode) -> Self {
        let root_path = root.path();
        let mut entries = BTreeMap::new();
        for child in root.children() {
            let key = internal_key(&root_path, &child.path());
            if key.is_empty() {
                debug!("Skipping response child at the root path '{}'", root_path);
                continue;
            }
            entries.insert(key, child);
        }
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Response fragment for `filter`, prefix match first, then by name
    pub fn claim(&mut self, filter: EntityRef<'_>) -> Option<Arc<dyn DataNode>> {
        let path = filter.absolute_path();
        if let Some(node) = self.match_prefix(&path) {
            return Some(node);
        }
        self.match_name(&path, filter.yang_name())
    }

    /// First entry whose key is a prefix of `path`; not removed
    pub fn match_prefix(&self, path: &str) -> Option<Arc<dyn DataNode>> {
        self.entries
            .iter()
            .find(|(key, _)| path.starts_with(key.as_str()))
            .map(|(key, node)| {
                debug!("Matched '{}' to response key '{}'", path, key);
                node.clone()
            })
    }

    /// Drop the exact `path` entry, then claim the first key containing `yang_name`
    pub fn match_name(&mut self, path: &str, yang_name: &str) -> Option<Arc<dyn DataNode>> {
        self.entries.remove(path);
        let key = self
            .entries
            .keys()
            .find(|key| key.contains(yang_name))
            .cloned();
        match key {
            Some(key) => {
                debug!("Matched '{}' by name to response key '{}'", path, key);
                self.entries.remove(&key)
            }
            None => {
                debug!("No response fragment for '{}'", path);
                None
            }
        }
    }
}

/// `child_path` with `root_path` and the leading `/` stripped
fn internal_key(root_path: &str, child_path: &str) -> String {
    child_path
        .strip_prefix(root_path)
        .unwrap_or(child_path)
        .trim_start_matches('/')
        .to_string()
}
