use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::leaf::LeafData;
use super::schema::EntitySchema;
use super::yfilter::YFilter;

/// Handle of an entity inside one [`EntityTree`](super::EntityTree) arena
///
/// Handles are only meaningful for the tree that issued them; a detached
/// subtree gets fresh handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub(crate) usize);

impl EntityId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One node of the configuration/state tree
#[derive(Debug, Clone)]
pub struct Entity {
    pub(crate) schema: Arc<EntitySchema>,
    /// Name this entity is declared under in its parent's schema
    pub(crate) declared_name: String,
    pub(crate) list_member: bool,
    pub(crate) parent: Option<EntityId>,
    /// Keyed by child segment path
    pub(crate) children: BTreeMap<String, EntityId>,
    pub(crate) leaves: Vec<(String, LeafData)>,
    pub(crate) yfilter: YFilter,
}

impl Entity {
    pub(crate) fn new(
        schema: Arc<EntitySchema>,
        declared_name: String,
        list_member: bool,
        parent: Option<EntityId>,
    ) -> Self {
        let leaves = schema
            .leaves()
            .iter()
            .map(|name| (name.clone(), LeafData::new()))
            .collect();
        Self {
            schema,
            declared_name,
            list_member,
            parent,
            children: BTreeMap::new(),
            leaves,
            yfilter: YFilter::NotSet,
        }
    }

    pub fn yang_name(&self) -> &str {
        self.schema.yang_name()
    }

    pub fn namespace(&self) -> &str {
        self.schema.namespace()
    }

    pub fn schema(&self) -> &Arc<EntitySchema> {
        &self.schema
    }

    pub fn declared_name(&self) -> &str {
        &self.declared_name
    }

    pub fn parent(&self) -> Option<EntityId> {
        self.parent
    }

    pub fn children(&self) -> &BTreeMap<String, EntityId> {
        &self.children
    }

    pub fn yfilter(&self) -> YFilter {
        self.yfilter
    }

    pub fn is_top_level_class(&self) -> bool {
        self.schema.is_top_level_class()
    }

    pub fn is_presence_container(&self) -> bool {
        self.schema.is_presence_container()
    }

    pub fn is_list_member(&self) -> bool {
        self.list_member
    }

    pub fn leaf(&self, name: &str) -> Option<&LeafData> {
        self.leaves.iter().find(|(n, _)| n == name).map(|(_, l)| l)
    }

    pub(crate) fn leaf_mut(&mut self, name: &str) -> Option<&mut LeafData> {
        self.leaves
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, l)| l)
    }

    /// All leaves in declaration order
    pub fn leaves(&self) -> &[(String, LeafData)] {
        &self.leaves
    }

    /// True when every list key of this entity carries a value
    pub fn keys_complete(&self) -> bool {
        !self.schema.keys().is_empty()
            && self
                .schema
                .keys()
                .iter()
                .all(|k| self.leaf(k).map(|l| l.is_set).unwrap_or(false))
    }
}

/// Transient projection used while encoding: the node's path plus its
/// direct leaves that must be written
#[derive(Debug, Clone, PartialEq)]
pub struct EntityPath {
    pub path: String,
    pub value_paths: Vec<(String, LeafData)>,
}
