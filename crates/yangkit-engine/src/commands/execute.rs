//! RPC execution
//!
//! Builds one payload from a batch of filters, runs the RPC through the
//! session and maps the response back onto the filters. The result always
//! has one entry per filter, in filter order, unless the call returned no
//! data at all.

use std::time::Instant;

use tracing::debug;
use yangkit_core::codec::CodecContext;
use yangkit_core::errors::Result;
use yangkit_core::logging_facility::macros::elapsed_ms;
use yangkit_core::model::{EntityRef, EntityTree};
use yangkit_core::traversal::entity_list_to_string;
use yangkit_core::{log_op_end, log_op_error, log_op_start};
use yangkit_core_types::RequestContext;

use super::correlate::ResponseIndex;
use super::payload::build_rpc_payload;
use super::read::read_datanode;
use crate::session::Session;

/// Input tag of the marker restricting a read to configuration data
pub const ONLY_CONFIG_TAG: &str = "only-config";

/// Execute `operation` for a batch of filters
///
/// Returns an empty vector when the session yields no response; otherwise
/// entry *i* is the subtree answering `filters[i]`, or `None` when the
/// response holds nothing for it.
///
/// # Errors
///
/// Payload, session and decode failures abort the whole call.
pub fn execute_rpc(
    session: &dyn Session,
    ctx: &CodecContext,
    filters: &[EntityRef<'_>],
    operation: &str,
    payload_tag: &str,
    set_only_config: bool,
) -> Result<Vec<Option<EntityTree>>> {
    let request = RequestContext::new(operation);
    log_op_start!(
        "execute_rpc",
        request_id = request.request_id.as_str(),
        rpc_operation = request.operation.as_str(),
        filter_count = filters.len()
    );
    let start = Instant::now();

    let result = execute_rpc_impl(
        session,
        ctx,
        filters,
        payload_tag,
        set_only_config,
        &request,
    )
    .map_err(|e| {
        log_op_error!(
            "execute_rpc",
            e.clone(),
            duration_ms = elapsed_ms(start),
            request_id = request.request_id.as_str()
        );
        e
    })?;

    log_op_end!(
        "execute_rpc",
        duration_ms = elapsed_ms(start),
        request_id = request.request_id.as_str(),
        rpc_operation = request.operation.as_str(),
        result_count = result.len()
    );
    Ok(result)
}

/// Single-filter form of [`execute_rpc`]
///
/// # Errors
///
/// As [`execute_rpc`].
pub fn execute_rpc_single(
    session: &dyn Session,
    ctx: &CodecContext,
    filter: EntityRef<'_>,
    operation: &str,
    payload_tag: &str,
    set_only_config: bool,
) -> Result<Option<EntityTree>> {
    let results = execute_rpc(
        session,
        ctx,
        &[filter],
        operation,
        payload_tag,
        set_only_config,
    )?;
    Ok(results.into_iter().next().flatten())
}

fn execute_rpc_impl(
    session: &dyn Session,
    ctx: &CodecContext,
    filters: &[EntityRef<'_>],
    payload_tag: &str,
    set_only_config: bool,
    request: &RequestContext,
) -> Result<Vec<Option<EntityTree>>> {
    let operation = request.operation.as_str();
    let mut rpc = session.root_schema().create_rpc(operation)?;
    let payload = build_rpc_payload(session, filters, payload_tag)?;
    debug!(
        request_id = request.request_id.as_str(),
        "Executing '{}' for {}",
        operation,
        entity_list_to_string(filters)
    );

    if set_only_config {
        rpc.create_input(ONLY_CONFIG_TAG, None)?;
    }
    rpc.create_input(payload_tag, Some(&payload))?;

    let Some(response) = rpc.invoke(session)? else {
        debug!(
            request_id = request.request_id.as_str(),
            "RPC '{}' returned no data",
            operation
        );
        return Ok(Vec::new());
    };

    let mut index = ResponseIndex::new(response.as_ref());
    debug!(
        request_id = request.request_id.as_str(),
        "Response '{}' has {} children",
        response.path(),
        index.len()
    );

    let mut results = Vec::with_capacity(filters.len());
    for filter in filters {
        let node = index.claim(*filter);
        let tree = read_datanode(*filter, node.as_deref(), session.encoding(), ctx)?;
        results.push(tree);
    }
    Ok(results)
}
