use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// Module descriptor advertised for one namespace
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleCapability {
    pub module: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
}

/// Namespace URI to module lookup table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityTable {
    #[serde(default)]
    modules: BTreeMap<String, ModuleCapability>,
}

impl CapabilityTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, namespace: impl Into<String>, capability: ModuleCapability) {
        self.modules.insert(namespace.into(), capability);
    }

    /// Register `module` for `namespace` without a revision
    pub fn insert_module(&mut self, namespace: impl Into<String>, module: impl Into<String>) {
        self.insert(
            namespace,
            ModuleCapability {
                module: module.into(),
                revision: None,
            },
        );
    }

    pub fn lookup(&self, namespace: &str) -> Option<&ModuleCapability> {
        self.modules.get(namespace)
    }

    /// Module name for `namespace`, or the last `/`-separated URI segment
    pub fn module_for_namespace(&self, namespace: &str) -> String {
        match self.lookup(namespace) {
            Some(capability) => capability.module.clone(),
            None => namespace
                .rsplit('/')
                .next()
                .unwrap_or(namespace)
                .to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// Read-only context handed to decode
///
/// Built once from configuration; decode never mutates it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CodecContext {
    capabilities: CapabilityTable,
}

impl CodecContext {
    pub fn new(capabilities: CapabilityTable) -> Self {
        Self { capabilities }
    }

    /// Parse a context from a JSON document of the form
    /// `{"modules": {"<namespace>": {"module": "...", "revision": "..."}}}`
    ///
    /// # Errors
    ///
    /// `Serialization` if the document does not match.
    pub fn from_json_str(document: &str) -> Result<Self> {
        Ok(serde_json::from_str(document)?)
    }

    /// Parse a context from TOML with one `[modules."<namespace>"]` table per module
    ///
    /// # Errors
    ///
    /// `Serialization` if the document does not match.
    pub fn from_toml_str(document: &str) -> Result<Self> {
        Ok(toml::from_str(document)?)
    }

    pub fn capabilities(&self) -> &CapabilityTable {
        &self.capabilities
    }
}
