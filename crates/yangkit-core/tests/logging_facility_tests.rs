#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::*;
use yangkit_core::codec::{CodecContext, SubtreeCodec, XmlSubtreeCodec};
use yangkit_core::errors::YangkitError;
use yangkit_core::logging_facility::test_capture::init_test_capture;
use yangkit_core::{log_op_end, log_op_error, log_op_start};
use yangkit_core_types::schema::{EVENT_END, EVENT_END_ERROR, EVENT_START};

#[test]
fn test_log_op_start_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_start_unique_1";

    log_op_start!(op_name);

    let starts =
        capture.count_events(|e| e.op() == Some(op_name) && e.event() == Some(EVENT_START));
    assert_eq!(starts, 1, "Should have captured exactly one start event");
}

#[test]
fn test_log_op_end_records_duration() {
    let capture = init_test_capture();
    let op_name = "test_log_op_end_unique_2";

    log_op_end!(op_name, duration_ms = 42);

    let events = capture.events_for_op(op_name);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event(), Some(EVENT_END));
    assert_eq!(events[0].field("duration_ms"), Some("42"));
}

#[test]
fn test_log_op_error_includes_code() {
    let capture = init_test_capture();
    let op_name = "test_log_op_error_unique_3";

    let err = YangkitError::UnexpectedElement {
        element: "speed".to_string(),
        container: "interface".to_string(),
    };
    log_op_error!(op_name, err, duration_ms = 10);

    capture.assert_event_exists(op_name, EVENT_END_ERROR);
    let events = capture.events_for_op(op_name);
    assert_eq!(events[0].field("err.code"), Some("ERR_UNEXPECTED_ELEMENT"));
}

#[test]
fn test_log_macros_with_extra_fields() {
    let capture = init_test_capture();
    let op_name = "test_log_macros_fields_unique_4";

    log_op_start!(op_name, yang_name = "interfaces", entity_path = "a/b");

    let events = capture.events_for_op(op_name);
    assert_eq!(events[0].field("yang_name"), Some("interfaces"));
    assert_eq!(events[0].field("entity_path"), Some("a/b"));
}

#[test]
#[should_panic(expected = "Expected event")]
fn test_capture_assert_event_exists_fails() {
    let capture = init_test_capture();

    capture.assert_event_exists("nonexistent_op_truly_unique_999", EVENT_START);
}

#[test]
fn test_encode_brackets_operation() {
    let capture = init_test_capture();
    let (tree, _) = interface_filter("eth-logging-1");

    XmlSubtreeCodec::new().encode(tree.root_ref()).unwrap();

    capture.assert_event_exists("xml_encode", EVENT_START);
    capture.assert_event_exists("xml_encode", EVENT_END);
}

#[test]
fn test_failed_decode_emits_end_error() {
    let capture = init_test_capture();
    let payload = format!(r#"<logging-mismatch xmlns="{}"/>"#, NS_IF);

    let result = XmlSubtreeCodec::new()
        .decode(&payload, new_interfaces(), &CodecContext::default());

    assert!(result.is_err());
    let mismatches = capture.count_events(|e| {
        e.op() == Some("xml_decode")
            && e.event() == Some(EVENT_END_ERROR)
            && e.field("err.code") == Some("ERR_PROTOCOL_MISMATCH")
    });
    assert!(mismatches >= 1);
}
