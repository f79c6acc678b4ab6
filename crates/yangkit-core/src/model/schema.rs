use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::codec::CapabilityTable;

/// Hook run before decoding into a template, allowing augment modules to
/// register their namespaces
#[derive(Clone)]
pub struct AugmentCapabilities(Arc<dyn Fn(&mut CapabilityTable) + Send + Sync>);

impl AugmentCapabilities {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut CapabilityTable) + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn apply(&self, table: &mut CapabilityTable) {
        (self.0)(table)
    }
}

impl fmt::Debug for AugmentCapabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AugmentCapabilities(..)")
    }
}

/// A declared child of an entity type
#[derive(Debug, Clone)]
pub struct ChildSchema {
    /// Name the child is registered under; `module:name` when the child
    /// lives in a different namespace than its parent
    pub name: String,
    pub schema: Arc<EntitySchema>,
    /// List child: every lookup by name appends a new entry
    pub many: bool,
}

/// Closed per-type table of declared leaves and children
///
/// This is the data that generated entity classes would carry. The decoder
/// consults it to decide whether an element is a leaf, a child, or an error.
#[derive(Debug, Clone)]
pub struct EntitySchema {
    yang_name: String,
    namespace: String,
    module_name: String,
    is_top_level_class: bool,
    is_presence_container: bool,
    leaves: Vec<String>,
    children: Vec<ChildSchema>,
    keys: Vec<String>,
    identities: BTreeMap<(String, String), String>,
    augment: Option<AugmentCapabilities>,
}

impl EntitySchema {
    /// Start describing an entity type living in `namespace` of `module`
    pub fn builder(
        yang_name: impl Into<String>,
        namespace: impl Into<String>,
        module_name: impl Into<String>,
    ) -> EntitySchemaBuilder {
        EntitySchemaBuilder {
            schema: EntitySchema {
                yang_name: yang_name.into(),
                namespace: namespace.into(),
                module_name: module_name.into(),
                is_top_level_class: false,
                is_presence_container: false,
                leaves: Vec::new(),
                children: Vec::new(),
                keys: Vec::new(),
                identities: BTreeMap::new(),
                augment: None,
            },
        }
    }

    pub fn yang_name(&self) -> &str {
        &self.yang_name
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    pub fn is_top_level_class(&self) -> bool {
        self.is_top_level_class
    }

    pub fn is_presence_container(&self) -> bool {
        self.is_presence_container
    }

    /// Declared leaf names, in declaration order
    pub fn leaves(&self) -> &[String] {
        &self.leaves
    }

    pub fn children(&self) -> &[ChildSchema] {
        &self.children
    }

    /// List key leaves, in key order
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn declares_leaf(&self, name: &str) -> bool {
        self.leaves.iter().any(|l| l == name)
    }

    pub fn child(&self, name: &str) -> Option<&ChildSchema> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn augment_capabilities(&self) -> Option<&AugmentCapabilities> {
        self.augment.as_ref()
    }

    /// Owning module of an identity value, keyed by its bare name and namespace
    pub fn identity_module(&self, value: &str, namespace: &str) -> Option<&str> {
        self.identities
            .get(&(value.to_string(), namespace.to_string()))
            .map(String::as_str)
    }

    pub fn identity_count(&self) -> usize {
        self.identities.len()
    }

    /// `module:name`, or the bare name when no module is known
    pub fn qualified_name(&self) -> String {
        if self.module_name.is_empty() {
            self.yang_name.clone()
        } else {
            format!("{}:{}", self.module_name, self.yang_name)
        }
    }
}

/// Builder for [`EntitySchema`]
#[derive(Debug)]
pub struct EntitySchemaBuilder {
    schema: EntitySchema,
}

impl EntitySchemaBuilder {
    /// Mark as a valid RPC/filter root
    pub fn top_level(mut self) -> Self {
        self.schema.is_top_level_class = true;
        self
    }

    pub fn presence(mut self) -> Self {
        self.schema.is_presence_container = true;
        self
    }

    pub fn leaf(mut self, name: impl Into<String>) -> Self {
        self.schema.leaves.push(name.into());
        self
    }

    /// Declare key leaves; keys are also declared as leaves if missing
    pub fn keys(mut self, keys: &[&str]) -> Self {
        for key in keys {
            if !self.schema.declares_leaf(key) {
                self.schema.leaves.push((*key).to_string());
            }
            self.schema.keys.push((*key).to_string());
        }
        self
    }

    /// Declare a single-instance child container
    pub fn child(self, schema: Arc<EntitySchema>) -> Self {
        self.add_child(schema, false)
    }

    /// Declare a list child
    pub fn list(self, schema: Arc<EntitySchema>) -> Self {
        self.add_child(schema, true)
    }

    fn add_child(mut self, schema: Arc<EntitySchema>, many: bool) -> Self {
        let crosses_namespace = !schema.namespace.is_empty()
            && schema.namespace != self.schema.namespace
            && !schema.module_name.is_empty();
        let name = if crosses_namespace {
            schema.qualified_name()
        } else {
            schema.yang_name.clone()
        };
        let child = ChildSchema { name, schema, many };
        self.schema.children.push(child);
        self
    }

    /// Register an identity value for module re-qualification on decode
    pub fn identity(
        mut self,
        value: impl Into<String>,
        namespace: impl Into<String>,
        module_name: impl Into<String>,
    ) -> Self {
        self.schema
            .identities
            .insert((value.into(), namespace.into()), module_name.into());
        self
    }

    pub fn augment_capabilities(mut self, hook: AugmentCapabilities) -> Self {
        self.schema.augment = Some(hook);
        self
    }

    pub fn build(self) -> Arc<EntitySchema> {
        Arc::new(self.schema)
    }
}
