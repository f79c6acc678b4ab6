//! Yangkit Engine - RPC orchestration layer
//!
//! Executes remote procedure calls for batches of filter entities through an
//! external session runtime and correlates the response back onto the
//! caller's filters.

pub mod commands;
pub mod session;

pub use commands::{execute_rpc, execute_rpc_single, read_datanode};
pub use session::{DataNode, RootSchemaNode, Rpc, Session};
