#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::*;
use yangkit_core::codec::{CodecContext, EncodingFormat, JsonSubtreeCodec, SubtreeCodec};
use yangkit_core::errors::YangkitError;
use yangkit_engine::commands::{execute_rpc, execute_rpc_single, FILTER_TAG, ONLY_CONFIG_TAG};
use yangkit_engine::session::mock::{MockDataNode, MockSession};

const GET: &str = "ietf-netconf:get";

#[test]
fn test_results_follow_filter_order() {
    let response = xml_response(&[
        ("/data/ietf-interfaces:interfaces", interfaces_document()),
        ("/data/example-system:system", system_document()),
    ]);
    let session = MockSession::new(EncodingFormat::Xml).with_response(response);
    let system = system_filter();
    let interfaces = interfaces_filter();

    let results = execute_rpc(
        &session,
        &CodecContext::default(),
        &[system.root_ref(), interfaces.root_ref()],
        GET,
        FILTER_TAG,
        false,
    )
    .unwrap();

    assert_eq!(results.len(), 2);
    let first = results[0].as_ref().unwrap();
    let second = results[1].as_ref().unwrap();
    assert_eq!(first.yang_name(first.root()), "system");
    assert_eq!(
        first.leaf(first.root(), "hostname").unwrap().value,
        "edge-1"
    );
    assert_eq!(second.yang_name(second.root()), "interfaces");
    assert_eq!(second.children(second.root()).unwrap().len(), 2);
}

#[test]
fn test_nested_filter_is_extracted_and_detached() {
    let response = interfaces_response();
    let session = MockSession::new(EncodingFormat::Xml).with_response(response);
    let (filter, eth1) = interface_filter("eth1");

    let result = execute_rpc_single(
        &session,
        &CodecContext::default(),
        filter.at(eth1).unwrap(),
        GET,
        FILTER_TAG,
        false,
    )
    .unwrap()
    .unwrap();

    let root = result.root();
    assert!(result.entity(root).unwrap().parent().is_none());
    assert_eq!(result.yang_name(root), "interface");
    assert_eq!(result.leaf(root, "description").unwrap().value, "downlink");
}

#[test]
fn test_unanswered_filter_keeps_its_slot() {
    let response = interfaces_response();
    let session = MockSession::new(EncodingFormat::Xml).with_response(response);
    let system = system_filter();
    let interfaces = interfaces_filter();

    let results = execute_rpc(
        &session,
        &CodecContext::default(),
        &[system.root_ref(), interfaces.root_ref()],
        GET,
        FILTER_TAG,
        false,
    )
    .unwrap();

    assert_eq!(results.len(), 2);
    assert!(results[0].is_none());
    assert!(results[1].is_some());
}

#[test]
fn test_missing_list_entry_yields_none() {
    let response = interfaces_response();
    let session = MockSession::new(EncodingFormat::Xml).with_response(response);
    let (filter, eth7) = interface_filter("eth7");

    let result = execute_rpc_single(
        &session,
        &CodecContext::default(),
        filter.at(eth7).unwrap(),
        GET,
        FILTER_TAG,
        false,
    )
    .unwrap();

    assert!(result.is_none());
}

#[test]
fn test_empty_response_yields_empty_vector() {
    let session = MockSession::new(EncodingFormat::Xml);
    let interfaces = interfaces_filter();

    let results = execute_rpc(
        &session,
        &CodecContext::default(),
        &[interfaces.root_ref()],
        GET,
        FILTER_TAG,
        false,
    )
    .unwrap();

    assert!(results.is_empty());
    assert!(execute_rpc_single(
        &session,
        &CodecContext::default(),
        interfaces.root_ref(),
        GET,
        FILTER_TAG,
        false
    )
    .unwrap()
    .is_none());
}

#[test]
fn test_inputs_include_only_config_marker_and_payload() {
    let session = MockSession::new(EncodingFormat::Xml);
    let system = system_filter();
    let (filter, eth0) = interface_filter("eth0");

    execute_rpc(
        &session,
        &CodecContext::default(),
        &[system.root_ref(), filter.at(eth0).unwrap()],
        "ietf-netconf:get-config",
        FILTER_TAG,
        true,
    )
    .unwrap();

    let inputs = session.recorded_inputs();
    assert_eq!(inputs.len(), 2);
    assert_eq!(inputs[0].tag, ONLY_CONFIG_TAG);
    assert_eq!(inputs[0].value, None);
    assert_eq!(inputs[1].tag, FILTER_TAG);
    assert_eq!(inputs[1].rpc, "ietf-netconf:get-config");

    let payload = inputs[1].value.as_deref().unwrap();
    let system_xml = format!(r#"<system xmlns="{}"/>"#, NS_SYS);
    assert!(payload.starts_with(&system_xml));
    assert!(payload.ends_with("<interface><name>eth0</name></interface></interfaces>"));
}

#[test]
fn test_non_filter_tag_uses_data_payload() {
    let session = MockSession::new(EncodingFormat::Xml);
    let mut system = system_filter();
    let root = system.root();
    system.set_value(root, "hostname", "edge-2").unwrap();

    execute_rpc(
        &session,
        &CodecContext::default(),
        &[system.root_ref()],
        "ietf-netconf:edit-config",
        "config",
        false,
    )
    .unwrap();

    let inputs = session.recorded_inputs();
    assert_eq!(inputs.len(), 1);
    assert_eq!(inputs[0].tag, "config");
    assert!(inputs[0]
        .value
        .as_deref()
        .unwrap()
        .contains("<hostname>edge-2</hostname>"));
}

#[test]
fn test_session_failure_aborts_call() {
    let session = MockSession::new(EncodingFormat::Xml).failing("connection reset");
    let interfaces = interfaces_filter();

    let err = execute_rpc(
        &session,
        &CodecContext::default(),
        &[interfaces.root_ref()],
        GET,
        FILTER_TAG,
        false,
    )
    .unwrap_err();

    assert_eq!(
        err,
        YangkitError::Session {
            message: "connection reset".to_string()
        }
    );
}

#[test]
fn test_malformed_response_aborts_call() {
    let document = format!(
        r#"<interfaces xmlns="{}"><interface><name>eth0</name><speed>10</speed></interface></interfaces>"#,
        NS_IF
    );
    let response = xml_response(&[("/data/ietf-interfaces:interfaces", document)]);
    let session = MockSession::new(EncodingFormat::Xml).with_response(response);
    let interfaces = interfaces_filter();

    let err = execute_rpc(
        &session,
        &CodecContext::default(),
        &[interfaces.root_ref()],
        GET,
        FILTER_TAG,
        false,
    )
    .unwrap_err();

    assert!(matches!(err, YangkitError::UnexpectedElement { .. }));
}

#[test]
fn test_json_session_round_trip() {
    let mut device = interfaces_filter();
    let root = device.root();
    let eth0 = device.add_child(root, "interface").unwrap();
    device.set_value(eth0, "name", "eth0").unwrap();
    device.set_value(eth0, "enabled", "true").unwrap();
    let document = JsonSubtreeCodec::new().encode(device.root_ref()).unwrap();

    let response = MockDataNode::new("/")
        .with_child(
            MockDataNode::new("/ietf-interfaces:interfaces")
                .with_document(EncodingFormat::Json, document)
                .into_node(),
        )
        .into_node();
    let session = MockSession::new(EncodingFormat::Json).with_response(response);
    let (filter, f_eth0) = interface_filter("eth0");

    let result = execute_rpc_single(
        &session,
        &CodecContext::default(),
        filter.at(f_eth0).unwrap(),
        GET,
        FILTER_TAG,
        false,
    )
    .unwrap()
    .unwrap();

    assert_eq!(result.leaf(result.root(), "enabled").unwrap().value, "true");
    let payload = session.recorded_inputs()[0].value.clone().unwrap();
    let sent: serde_json::Value = serde_json::from_str(&payload).unwrap();
    assert_eq!(
        sent["ietf-interfaces:interfaces"]["interface"][0]["name"],
        "eth0"
    );
}
