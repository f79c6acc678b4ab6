#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::*;
use yangkit_core::codec::{CodecContext, EncodingFormat};
use yangkit_engine::commands::{execute_rpc, ResponseIndex, FILTER_TAG};
use yangkit_engine::session::mock::{MockDataNode, MockSession};

#[test]
fn test_prefix_keys_map_to_their_filters() {
    let response = MockDataNode::new("/data")
        .with_child(MockDataNode::new("/data/a/b").into_node())
        .with_child(MockDataNode::new("/data/a/c").into_node())
        .into_node();
    let index = ResponseIndex::new(response.as_ref());

    assert_eq!(index.match_prefix("a/b/x").unwrap().path(), "/data/a/b");
    assert_eq!(index.match_prefix("a/c/y").unwrap().path(), "/data/a/c");
}

#[test]
fn test_two_filters_share_one_prefix_entry() {
    let response = interfaces_response();
    let session = MockSession::new(EncodingFormat::Xml).with_response(response);
    let (eth0_filter, eth0) = interface_filter("eth0");
    let (eth1_filter, eth1) = interface_filter("eth1");

    let results = execute_rpc(
        &session,
        &CodecContext::default(),
        &[eth1_filter.at(eth1).unwrap(), eth0_filter.at(eth0).unwrap()],
        "ietf-netconf:get",
        FILTER_TAG,
        false,
    )
    .unwrap();

    let first = results[0].as_ref().unwrap();
    let second = results[1].as_ref().unwrap();
    assert_eq!(first.leaf(first.root(), "name").unwrap().value, "eth1");
    assert_eq!(second.leaf(second.root(), "name").unwrap().value, "eth0");
}

#[test]
fn test_fallback_selects_key_containing_yang_name() {
    let response = xml_response(&[
        ("/data/openconfig-interfaces:interfaces", interfaces_document()),
        ("/data/example-system:system", system_document()),
    ]);
    let session = MockSession::new(EncodingFormat::Xml).with_response(response);
    let interfaces = interfaces_filter();

    let results = execute_rpc(
        &session,
        &CodecContext::default(),
        &[interfaces.root_ref()],
        "ietf-netconf:get",
        FILTER_TAG,
        false,
    )
    .unwrap();

    let tree = results[0].as_ref().unwrap();
    assert_eq!(tree.children(tree.root()).unwrap().len(), 2);
}

#[test]
fn test_fallback_claims_each_entry_once() {
    let path = "/data/openconfig-interfaces:interfaces";
    let response = xml_response(&[(path, interfaces_document())]);
    let session = MockSession::new(EncodingFormat::Xml).with_response(response);
    let first = interfaces_filter();
    let second = interfaces_filter();

    let results = execute_rpc(
        &session,
        &CodecContext::default(),
        &[first.root_ref(), second.root_ref()],
        "ietf-netconf:get",
        FILTER_TAG,
        false,
    )
    .unwrap();

    assert_eq!(results.len(), 2);
    assert!(results[0].is_some());
    assert!(results[1].is_none());
}

#[test]
fn test_claim_prefers_prefix_over_name() {
    let response = MockDataNode::new("/")
        .with_child(MockDataNode::new("/ietf-interfaces:interfaces").into_node())
        .with_child(MockDataNode::new("/example:interfaces-state").into_node())
        .into_node();
    let mut index = ResponseIndex::new(response.as_ref());
    let filter = interfaces_filter();

    let claimed = index.claim(filter.root_ref()).unwrap();

    assert_eq!(claimed.path(), "/ietf-interfaces:interfaces");
    assert_eq!(index.len(), 2);
}
