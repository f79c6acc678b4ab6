//! Resolve a runtime data node into a standalone entity tree

use std::time::Instant;

use yangkit_core::codec::{codec_for, CodecContext, EncodingFormat};
use yangkit_core::errors::Result;
use yangkit_core::logging_facility::macros::elapsed_ms;
use yangkit_core::model::{EntityRef, EntityTree};
use yangkit_core::traversal::{get_child_entity_from_top, get_top_entity_from_filter};
use yangkit_core::{log_op_end, log_op_error, log_op_start};

use crate::session::DataNode;

/// Decode `node` into a fresh template of the filter's top-level entity and
/// extract the filter's subtree
///
/// Returns `Ok(None)` when there is no node, the filter is not rooted at a
/// top-level entity, or the decoded tree holds no matching subtree.
///
/// # Errors
///
/// Encoding or decode failures of the node's document.
pub fn read_datanode(
    filter: EntityRef<'_>,
    node: Option<&dyn DataNode>,
    format: EncodingFormat,
    ctx: &CodecContext,
) -> Result<Option<EntityTree>> {
    let Some(node) = node else {
        return Ok(None);
    };
    let path = filter.absolute_path();
    log_op_start!("read_datanode", entity_path = path.as_str());
    let start = Instant::now();

    let result = read_datanode_impl(filter, node, format, ctx).map_err(|e| {
        log_op_error!("read_datanode", e.clone(), duration_ms = elapsed_ms(start));
        e
    })?;

    log_op_end!(
        "read_datanode",
        duration_ms = elapsed_ms(start),
        found = result.is_some()
    );
    Ok(result)
}

fn read_datanode_impl(
    filter: EntityRef<'_>,
    node: &dyn DataNode,
    format: EncodingFormat,
    ctx: &CodecContext,
) -> Result<Option<EntityTree>> {
    let Some(template) = get_top_entity_from_filter(filter) else {
        return Ok(None);
    };
    let document = node.encode(format, false)?;
    let decoded = codec_for(format).decode(&document, template, ctx)?;
    Ok(get_child_entity_from_top(decoded, filter))
}
