//! External path/session runtime
//!
//! The engine never speaks a transport itself. A NETCONF or RESTCONF stack
//! implements these traits; the engine only creates RPCs, attaches inputs,
//! invokes them and reads back the response tree.

pub mod mock;

use std::sync::Arc;

use yangkit_core::codec::EncodingFormat;
use yangkit_core::errors::Result;
use yangkit_core::model::EntityRef;

/// Schema-aware node of a runtime data tree
///
/// Read-only from the engine's point of view.
pub trait DataNode {
    /// Absolute path, e.g. `/ietf-interfaces:interfaces/interface[name='eth0']`
    fn path(&self) -> String;

    fn parent(&self) -> Option<Arc<dyn DataNode>>;

    fn children(&self) -> Vec<Arc<dyn DataNode>>;

    /// Serialize this node's subtree as a standalone document
    ///
    /// # Errors
    ///
    /// Runtime specific; usually `Serialization`.
    fn encode(&self, format: EncodingFormat, pretty: bool) -> Result<String>;
}

/// A remote procedure call under construction
pub trait Rpc {
    /// Attach an input leaf; `None` creates an empty marker element
    ///
    /// # Errors
    ///
    /// `Session` if the runtime rejects the input.
    fn create_input(&mut self, tag: &str, value: Option<&str>) -> Result<()>;

    /// Execute synchronously; `None` when the call yields no data
    ///
    /// # Errors
    ///
    /// `Session` on transport or protocol failure.
    fn invoke(&self, session: &dyn Session) -> Result<Option<Arc<dyn DataNode>>>;
}

/// Entry point into the runtime's schema tree
pub trait RootSchemaNode {
    /// # Errors
    ///
    /// `Session` if the operation is not known to the device.
    fn create_rpc(&self, name: &str) -> Result<Box<dyn Rpc>>;

    /// Project an entity into the runtime data tree
    ///
    /// # Errors
    ///
    /// `Session` if the entity's path is not valid for the schema.
    fn create_datanode(&self, entity: EntityRef<'_>) -> Result<Arc<dyn DataNode>>;
}

/// An established management session
pub trait Session {
    fn root_schema(&self) -> &dyn RootSchemaNode;

    /// Wire encoding negotiated for this session
    fn encoding(&self) -> EncodingFormat;
}
