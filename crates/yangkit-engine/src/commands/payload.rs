//! RPC payload builders
//!
//! Each filter contributes one document. Top-level filters sent under a
//! `filter` tag over an XML session use the subtree codec directly; every
//! other case goes through the runtime's data tree.

use std::sync::Arc;

use tracing::debug;
use yangkit_core::codec::{EncodingFormat, JsonSubtreeCodec, SubtreeCodec, XmlSubtreeCodec};
use yangkit_core::errors::Result;
use yangkit_core::model::EntityRef;

use crate::session::{DataNode, RootSchemaNode, Session};

/// Input tag that selects subtree filtering
pub const FILTER_TAG: &str = "filter";

/// XML subtree filter document for `entity`
///
/// # Errors
///
/// `Serialization` if the writer fails.
pub fn get_xml_subtree_filter_payload(entity: EntityRef<'_>) -> Result<String> {
    XmlSubtreeCodec::new().encode(entity)
}

/// JSON subtree filter document for `entity`
///
/// # Errors
///
/// `Serialization` if the writer fails.
pub fn get_json_subtree_filter_payload(entity: EntityRef<'_>) -> Result<String> {
    JsonSubtreeCodec::new().encode(entity)
}

/// Runtime projection of `entity`, rendered from the root of its data tree
///
/// # Errors
///
/// Whatever the runtime reports for the projection or the encoding.
pub fn get_data_payload(
    entity: EntityRef<'_>,
    root_schema: &dyn RootSchemaNode,
    format: EncodingFormat,
) -> Result<String> {
    let mut node: Arc<dyn DataNode> = root_schema.create_datanode(entity)?;
    while let Some(parent) = node.parent() {
        node = parent;
    }
    node.encode(format, false)
}

/// Concatenated contributions of all filters, in filter order
///
/// # Errors
///
/// The first contribution that fails aborts the whole payload.
pub fn build_rpc_payload(
    session: &dyn Session,
    filters: &[EntityRef<'_>],
    tag: &str,
) -> Result<String> {
    let encoding = session.encoding();
    let mut payload = String::new();
    for filter in filters {
        let subtree_filter =
            tag == FILTER_TAG && encoding == EncodingFormat::Xml && filter.is_top_level_class();
        let contribution = if subtree_filter {
            get_xml_subtree_filter_payload(*filter)?
        } else {
            get_data_payload(*filter, session.root_schema(), encoding)?
        };
        debug!(
            "Payload contribution for '{}': {} bytes",
            filter.segment_path(),
            contribution.len()
        );
        payload.push_str(&contribution);
    }
    Ok(payload)
}
