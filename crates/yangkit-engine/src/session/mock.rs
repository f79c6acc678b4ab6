//! In-memory runtime for tests
//!
//! `MockSession` answers every RPC with a canned response tree and records
//! the inputs attached to it. Data nodes carry pre-rendered documents.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use yangkit_core::codec::{codec_for, EncodingFormat};
use yangkit_core::errors::{Result, YangkitError};
use yangkit_core::model::EntityRef;

use super::{DataNode, RootSchemaNode, Rpc, Session};

/// Data node with a fixed path and one document per encoding
#[derive(Default)]
pub struct MockDataNode {
    path: String,
    documents: HashMap<EncodingFormat, String>,
    parent: Option<Arc<dyn DataNode>>,
    children: Vec<Arc<dyn DataNode>>,
}

impl MockDataNode {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Document returned by `encode` for `format`
    pub fn with_document(mut self, format: EncodingFormat, document: impl Into<String>) -> Self {
        self.documents.insert(format, document.into());
        self
    }

    pub fn with_parent(mut self, parent: Arc<dyn DataNode>) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_child(mut self, child: Arc<dyn DataNode>) -> Self {
        self.children.push(child);
        self
    }

    pub fn into_node(self) -> Arc<dyn DataNode> {
        Arc::new(self)
    }
}

impl DataNode for MockDataNode {
    fn path(&self) -> String {
        self.path.clone()
    }

    fn parent(&self) -> Option<Arc<dyn DataNode>> {
        self.parent.clone()
    }

    fn children(&self) -> Vec<Arc<dyn DataNode>> {
        self.children.clone()
    }

    fn encode(&self, format: EncodingFormat, _pretty: bool) -> Result<String> {
        self.documents
            .get(&format)
            .cloned()
            .ok_or_else(|| YangkitError::Serialization {
                message: format!("no {} document for '{}'", format, self.path),
            })
    }
}

/// One `create_input` call seen by a mock RPC
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedInput {
    pub rpc: String,
    pub tag: String,
    pub value: Option<String>,
}

/// RPC that records its inputs and returns the session's canned response
pub struct MockRpc {
    name: String,
    response: Option<Arc<dyn DataNode>>,
    failure: Option<String>,
    inputs: Arc<Mutex<Vec<RecordedInput>>>,
}

impl Rpc for MockRpc {
    fn create_input(&mut self, tag: &str, value: Option<&str>) -> Result<()> {
        let mut inputs = self.inputs.lock().map_err(|e| YangkitError::Session {
            message: e.to_string(),
        })?;
        inputs.push(RecordedInput {
            rpc: self.name.clone(),
            tag: tag.to_string(),
            value: value.map(str::to_string),
        });
        Ok(())
    }

    fn invoke(&self, _session: &dyn Session) -> Result<Option<Arc<dyn DataNode>>> {
        if let Some(message) = &self.failure {
            return Err(YangkitError::Session {
                message: message.clone(),
            });
        }
        Ok(self.response.clone())
    }
}

/// Schema root of the mock runtime
pub struct MockRootSchema {
    encoding: EncodingFormat,
    response: Option<Arc<dyn DataNode>>,
    failure: Option<String>,
    inputs: Arc<Mutex<Vec<RecordedInput>>>,
}

impl RootSchemaNode for MockRootSchema {
    fn create_rpc(&self, name: &str) -> Result<Box<dyn Rpc>> {
        Ok(Box::new(MockRpc {
            name: name.to_string(),
            response: self.response.clone(),
            failure: self.failure.clone(),
            inputs: self.inputs.clone(),
        }))
    }

    /// Renders the entity's top-level ancestor as the runtime root document
    /// and hangs a node at the entity's path below it
    fn create_datanode(&self, entity: EntityRef<'_>) -> Result<Arc<dyn DataNode>> {
        let tree = entity.tree();
        let top = tree
            .top_entity(entity.id())
            .ok_or(YangkitError::UnknownEntity {
                id: entity.id().index(),
            })?;
        let document = codec_for(self.encoding).encode(tree.at(top)?)?;

        let root = MockDataNode::new(format!("/{}", tree.absolute_path(top)))
            .with_document(self.encoding, document)
            .into_node();
        if top == entity.id() {
            return Ok(root);
        }
        Ok(MockDataNode::new(format!("/{}", entity.absolute_path()))
            .with_parent(root)
            .into_node())
    }
}

/// Session with a fixed encoding and canned response
pub struct MockSession {
    root: MockRootSchema,
}

impl MockSession {
    pub fn new(encoding: EncodingFormat) -> Self {
        Self {
            root: MockRootSchema {
                encoding,
                response: None,
                failure: None,
                inputs: Arc::new(Mutex::new(Vec::new())),
            },
        }
    }

    /// Response root returned by every RPC
    pub fn with_response(mut self, response: Arc<dyn DataNode>) -> Self {
        self.root.response = Some(response);
        self
    }

    /// Make every RPC fail with a session error
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.root.failure = Some(message.into());
        self
    }

    /// Inputs attached so far, across all RPCs
    pub fn recorded_inputs(&self) -> Vec<RecordedInput> {
        self.root
            .inputs
            .lock()
            .map(|inputs| inputs.clone())
            .unwrap_or_default()
    }
}

impl Session for MockSession {
    fn root_schema(&self) -> &dyn RootSchemaNode {
        &self.root
    }

    fn encoding(&self) -> EncodingFormat {
        self.root.encoding
    }
}
