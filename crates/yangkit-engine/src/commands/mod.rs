//! Command orchestration layer.
//!
//! Builds RPC payloads from filter entities, executes them through an
//! external session and resolves the response back into entity trees.

pub mod correlate;
pub mod execute;
pub mod payload;
pub mod read;

pub use correlate::ResponseIndex;
pub use execute::{execute_rpc, execute_rpc_single, ONLY_CONFIG_TAG};
pub use payload::{
    build_rpc_payload, get_data_payload, get_json_subtree_filter_payload,
    get_xml_subtree_filter_payload, FILTER_TAG,
};
pub use read::read_datanode;
