use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::{debug, warn};

use super::entity::{Entity, EntityId, EntityPath};
use super::leaf::LeafData;
use super::schema::EntitySchema;
use super::yfilter::YFilter;
use crate::errors::{Result, YangkitError};

/// Arena-backed entity tree
///
/// Entities live in slots addressed by [`EntityId`]. Exactly one live slot has
/// no parent: the root. Detaching a subtree moves its slots into a new tree,
/// so no handle in either tree can observe the other afterwards.
///
/// Single-threaded by design: a tree and any subtree detached from it are
/// owned and mutated by one thread of control at a time.
#[derive(Debug, Clone)]
pub struct EntityTree {
    nodes: Vec<Option<Entity>>,
    root: EntityId,
}

impl EntityTree {
    /// Create a tree holding a single, empty root entity of `schema`
    pub fn new(schema: Arc<EntitySchema>) -> Self {
        let declared_name = schema.yang_name().to_string();
        Self {
            nodes: vec![Some(Entity::new(schema, declared_name, false, None))],
            root: EntityId(0),
        }
    }

    pub fn root(&self) -> EntityId {
        self.root
    }

    /// Schema of the root entity
    pub fn root_schema(&self) -> Option<&Arc<EntitySchema>> {
        self.get(self.root).map(Entity::schema)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    /// # Errors
    ///
    /// `UnknownEntity` if `id` does not address a live entity.
    pub fn entity(&self, id: EntityId) -> Result<&Entity> {
        self.get(id).ok_or(YangkitError::UnknownEntity { id: id.0 })
    }

    fn entity_mut(&mut self, id: EntityId) -> Result<&mut Entity> {
        self.nodes
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(YangkitError::UnknownEntity { id: id.0 })
    }

    /// Borrowed view of one entity, used to pass filters around
    ///
    /// # Errors
    ///
    /// `UnknownEntity` if `id` does not address a live entity.
    pub fn at(&self, id: EntityId) -> Result<EntityRef<'_>> {
        self.entity(id)?;
        Ok(EntityRef { tree: self, id })
    }

    pub fn root_ref(&self) -> EntityRef<'_> {
        EntityRef {
            tree: self,
            id: self.root,
        }
    }

    /// Number of live entities
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// # Errors
    ///
    /// `UnknownEntity` if `id` does not address a live entity.
    pub fn children(&self, id: EntityId) -> Result<&BTreeMap<String, EntityId>> {
        Ok(self.entity(id)?.children())
    }

    /// First existing child declared under `name`, in key order; never creates
    pub fn find_child(&self, id: EntityId, name: &str) -> Option<EntityId> {
        self.get(id)?
            .children
            .values()
            .copied()
            .find(|c| self.get(*c).is_some_and(|e| e.declared_name == name))
    }

    /// Look up a declared child, creating it when absent
    ///
    /// For list children every call appends a new entry. Returns `Ok(None)`
    /// when `name` is not a declared child.
    ///
    /// # Errors
    ///
    /// `UnknownEntity` if `id` does not address a live entity.
    pub fn child_by_name(&mut self, id: EntityId, name: &str) -> Result<Option<EntityId>> {
        let declared = match self.entity(id)?.schema.child(name) {
            Some(c) => c.clone(),
            None => return Ok(None),
        };
        if !declared.many {
            if let Some(existing) = self.find_child(id, name) {
                return Ok(Some(existing));
            }
        }

        let child_id = EntityId(self.nodes.len());
        self.nodes.push(Some(Entity::new(
            declared.schema,
            declared.name,
            declared.many,
            Some(id),
        )));
        let key = self.free_child_key(id, child_id);
        self.entity_mut(id)?.children.insert(key, child_id);
        Ok(Some(child_id))
    }

    /// Like [`child_by_name`](Self::child_by_name) but undeclared names are an error
    ///
    /// # Errors
    ///
    /// `UnknownChild` if `name` is not declared on the entity.
    pub fn add_child(&mut self, id: EntityId, name: &str) -> Result<EntityId> {
        match self.child_by_name(id, name)? {
            Some(child) => Ok(child),
            None => Err(YangkitError::UnknownChild {
                child: name.to_string(),
                container: self.entity(id)?.yang_name().to_string(),
            }),
        }
    }

    pub fn has_leaf_or_child_of_name(&self, id: EntityId, name: &str) -> bool {
        self.get(id)
            .map(|e| e.schema.declares_leaf(name) || e.schema.child(name).is_some())
            .unwrap_or(false)
    }

    /// Set a leaf value; re-keys the entity in its parent when a list key changes
    ///
    /// # Errors
    ///
    /// `UnknownEntity` or `UnknownLeaf`.
    pub fn set_value(&mut self, id: EntityId, leaf: &str, value: impl Into<String>) -> Result<()> {
        self.set_value_with_namespace(id, leaf, value, "", "")
    }

    /// Set a leaf value together with the namespace/prefix of a qualified value
    ///
    /// # Errors
    ///
    /// `UnknownEntity` or `UnknownLeaf`.
    pub fn set_value_with_namespace(
        &mut self,
        id: EntityId,
        leaf: &str,
        value: impl Into<String>,
        namespace: &str,
        namespace_prefix: &str,
    ) -> Result<()> {
        let entity = self.entity_mut(id)?;
        let container = entity.yang_name().to_string();
        let is_key = entity.list_member && entity.schema.keys().iter().any(|k| k == leaf);
        let data = entity
            .leaf_mut(leaf)
            .ok_or_else(|| YangkitError::UnknownLeaf {
                leaf: leaf.to_string(),
                container,
            })?;
        data.value = value.into();
        data.is_set = true;
        data.namespace = namespace.to_string();
        data.namespace_prefix = namespace_prefix.to_string();

        if is_key {
            self.review(id)?;
        }
        Ok(())
    }

    /// Attach a filter operation to a leaf
    ///
    /// # Errors
    ///
    /// `UnknownEntity` or `UnknownLeaf`.
    pub fn set_filter(&mut self, id: EntityId, leaf: &str, yfilter: YFilter) -> Result<()> {
        let entity = self.entity_mut(id)?;
        let container = entity.yang_name().to_string();
        let data = entity
            .leaf_mut(leaf)
            .ok_or_else(|| YangkitError::UnknownLeaf {
                leaf: leaf.to_string(),
                container,
            })?;
        data.yfilter = yfilter;
        Ok(())
    }

    /// Attach a filter operation to the entity itself
    ///
    /// # Errors
    ///
    /// `UnknownEntity` if `id` does not address a live entity.
    pub fn set_entity_filter(&mut self, id: EntityId, yfilter: YFilter) -> Result<()> {
        self.entity_mut(id)?.yfilter = yfilter;
        Ok(())
    }

    /// Leaf data of one entity
    pub fn leaf(&self, id: EntityId, name: &str) -> Option<&LeafData> {
        self.get(id)?.leaf(name)
    }

    pub fn yang_name(&self, id: EntityId) -> &str {
        self.get(id).map(Entity::yang_name).unwrap_or_default()
    }

    pub fn namespace(&self, id: EntityId) -> &str {
        self.get(id).map(Entity::namespace).unwrap_or_default()
    }

    pub fn is_top_level_class(&self, id: EntityId) -> bool {
        self.get(id).is_some_and(Entity::is_top_level_class)
    }

    pub fn is_presence_container(&self, id: EntityId) -> bool {
        self.get(id)
            .map(Entity::is_presence_container)
            .unwrap_or(false)
    }

    /// Path component of `id` relative to its parent; empty for unknown handles
    pub fn segment_path(&self, id: EntityId) -> String {
        let Some(entity) = self.get(id) else {
            return String::new();
        };
        let crosses_namespace = entity
            .parent
            .and_then(|p| self.get(p))
            .map(|p| !entity.namespace().is_empty() && p.namespace() != entity.namespace())
            .unwrap_or(false);

        let mut segment = if entity.is_top_level_class() || crosses_namespace {
            entity.schema.qualified_name()
        } else {
            entity.yang_name().to_string()
        };
        for key in entity.schema.keys() {
            if let Some(leaf) = entity.leaf(key).filter(|l| l.is_set) {
                segment.push_str(&format!("[{}='{}']", key, leaf.value));
            }
        }
        segment
    }

    /// Segment paths from the root down to `id`, joined with `/`
    pub fn absolute_path(&self, id: EntityId) -> String {
        let mut segments = Vec::new();
        let mut current = Some(id);
        while let Some(cur) = current {
            let Some(entity) = self.get(cur) else {
                break;
            };
            segments.push(self.segment_path(cur));
            current = entity.parent;
        }
        segments.reverse();
        segments.join("/")
    }

    /// Any set leaf in the subtree
    pub fn has_data(&self, id: EntityId) -> bool {
        let Some(entity) = self.get(id) else {
            return false;
        };
        entity.leaves.iter().any(|(_, l)| l.is_set)
            || entity.children.values().any(|c| self.has_data(*c))
    }

    /// Any filter operation on the entity, its leaves, or its descendants
    pub fn has_operation(&self, id: EntityId) -> bool {
        let Some(entity) = self.get(id) else {
            return false;
        };
        entity.yfilter.is_set()
            || entity.leaves.iter().any(|(_, l)| l.yfilter.is_set())
            || entity.children.values().any(|c| self.has_operation(*c))
    }

    /// Path plus the direct leaves the codec has to write
    ///
    /// # Errors
    ///
    /// `UnknownEntity` if `id` does not address a live entity.
    pub fn entity_path(&self, id: EntityId) -> Result<EntityPath> {
        let entity = self.entity(id)?;
        Ok(EntityPath {
            path: self.absolute_path(id),
            value_paths: entity
                .leaves
                .iter()
                .filter(|(_, l)| l.to_be_created())
                .cloned()
                .collect(),
        })
    }

    /// Nearest top-level ancestor (or self), falling back to the root
    pub fn top_entity(&self, id: EntityId) -> Option<EntityId> {
        let mut current = id;
        loop {
            let entity = self.get(current)?;
            match entity.parent {
                Some(parent) if !entity.is_top_level_class() => current = parent,
                _ => return Some(current),
            }
        }
    }

    /// Fresh, empty tree of the same entity type as `id`
    ///
    /// # Errors
    ///
    /// `UnknownEntity` if `id` does not address a live entity.
    pub fn clone_template(&self, id: EntityId) -> Result<EntityTree> {
        Ok(EntityTree::new(self.entity(id)?.schema.clone()))
    }

    /// Re-key a list member in its parent after its keys changed
    ///
    /// A member with complete keys replaces any sibling already holding the
    /// same key; a member with missing keys keeps a disambiguated slot.
    ///
    /// # Errors
    ///
    /// `UnknownEntity` if `id` does not address a live entity.
    pub fn review(&mut self, id: EntityId) -> Result<()> {
        let entity = self.entity(id)?;
        let Some(parent) = entity.parent else {
            return Ok(());
        };
        if !entity.list_member {
            return Ok(());
        }
        let complete = entity.keys_complete();
        let segment = self.segment_path(id);

        let parent_entity = self.entity_mut(parent)?;
        parent_entity.children.retain(|_, c| *c != id);
        let replaced = match parent_entity.children.get(&segment).copied() {
            Some(other) if complete => {
                parent_entity.children.remove(&segment);
                Some(other)
            }
            Some(_) => None,
            None => None,
        };
        let key = if parent_entity.children.contains_key(&segment) {
            format!("{}#{}", segment, id.0)
        } else {
            segment
        };
        debug!("Reviewed list entry {} as '{}'", id, key);
        parent_entity.children.insert(key.clone(), id);

        if let Some(other) = replaced {
            warn!(
                "List entry '{}' replaced an existing entry with the same key",
                key
            );
            self.free_subtree(other);
        }
        Ok(())
    }

    /// Move the subtree rooted at `id` into a new tree
    ///
    /// The entry is removed from its parent's children map, the slots are
    /// vacated here, and the returned tree's root has no parent.
    ///
    /// # Errors
    ///
    /// `UnknownEntity` if `id` is not live, `Internal` if `id` is the root.
    pub fn detach(&mut self, id: EntityId) -> Result<EntityTree> {
        let parent = self.entity(id)?.parent;
        if id == self.root {
            return Err(YangkitError::Internal {
                message: "cannot detach the root entity".to_string(),
            });
        }
        if let Some(parent) = parent {
            self.entity_mut(parent)?.children.retain(|_, c| *c != id);
        }

        let ids = self.subtree_ids(id);
        let remap: HashMap<EntityId, EntityId> = ids
            .iter()
            .enumerate()
            .map(|(i, old)| (*old, EntityId(i)))
            .collect();

        let mut nodes = Vec::with_capacity(ids.len());
        for old in &ids {
            let mut entity = self
                .nodes
                .get_mut(old.0)
                .and_then(Option::take)
                .ok_or(YangkitError::UnknownEntity { id: old.0 })?;
            entity.parent = entity.parent.and_then(|p| remap.get(&p).copied());
            entity.children = entity
                .children
                .into_iter()
                .filter_map(|(k, c)| remap.get(&c).map(|n| (k, *n)))
                .collect();
            nodes.push(Some(entity));
        }
        Ok(EntityTree {
            nodes,
            root: EntityId(0),
        })
    }

    /// Pre-order ids of the subtree rooted at `id`
    fn subtree_ids(&self, id: EntityId) -> Vec<EntityId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            if let Some(entity) = self.get(cur) {
                out.push(cur);
                stack.extend(entity.children.values().rev().copied());
            }
        }
        out
    }

    fn free_subtree(&mut self, id: EntityId) {
        for old in self.subtree_ids(id) {
            if let Some(slot) = self.nodes.get_mut(old.0) {
                *slot = None;
            }
        }
    }

    fn free_child_key(&self, parent: EntityId, child: EntityId) -> String {
        let segment = self.segment_path(child);
        let taken = self
            .get(parent)
            .map(|p| p.children.contains_key(&segment))
            .unwrap_or(false);
        if taken {
            format!("{}#{}", segment, child.0)
        } else {
            segment
        }
    }
}

/// Borrowed view of one entity in a tree
#[derive(Debug, Clone, Copy)]
pub struct EntityRef<'a> {
    tree: &'a EntityTree,
    id: EntityId,
}

impl<'a> EntityRef<'a> {
    pub fn tree(&self) -> &'a EntityTree {
        self.tree
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn entity(&self) -> Option<&'a Entity> {
        self.tree.get(self.id)
    }

    pub fn yang_name(&self) -> &'a str {
        self.entity().map(Entity::yang_name).unwrap_or_default()
    }

    pub fn namespace(&self) -> &'a str {
        self.entity().map(Entity::namespace).unwrap_or_default()
    }

    pub fn is_top_level_class(&self) -> bool {
        self.entity()
            .map(Entity::is_top_level_class)
            .unwrap_or(false)
    }

    pub fn parent(&self) -> Option<EntityRef<'a>> {
        let parent = self.entity()?.parent?;
        Some(EntityRef {
            tree: self.tree,
            id: parent,
        })
    }

    pub fn segment_path(&self) -> String {
        self.tree.segment_path(self.id)
    }

    pub fn absolute_path(&self) -> String {
        self.tree.absolute_path(self.id)
    }
}
