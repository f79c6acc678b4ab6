use yangkit_core::errors::{ExError, ExErrorKind, YangkitError};

#[test]
fn test_protocol_mismatch_classified() {
    let err = YangkitError::ProtocolMismatch {
        expected: "interfaces".to_string(),
        found: "routing".to_string(),
    };

    let ex_err: ExError = err.into();

    assert_eq!(ex_err.kind(), ExErrorKind::ProtocolMismatch);
    assert_eq!(ex_err.code(), "ERR_PROTOCOL_MISMATCH");
    assert_eq!(ex_err.path(), Some("interfaces"));
    assert!(ex_err.message().contains("routing"));
}

#[test]
fn test_unexpected_element_carries_container() {
    let err = YangkitError::UnexpectedElement {
        element: "speed".to_string(),
        container: "interface".to_string(),
    };

    let ex_err: ExError = err.into();

    assert_eq!(ex_err.kind(), ExErrorKind::UnexpectedElement);
    assert_eq!(ex_err.op(), Some("decode"));
    assert_eq!(ex_err.path(), Some("interface"));
    assert!(ex_err.message().contains("speed"));
}

#[test]
fn test_undeclared_names_are_invalid_input() {
    let leaf: ExError = YangkitError::UnknownLeaf {
        leaf: "speed".to_string(),
        container: "interface".to_string(),
    }
    .into();
    let child: ExError = YangkitError::UnknownChild {
        child: "bogus".to_string(),
        container: "interfaces".to_string(),
    }
    .into();

    assert_eq!(leaf.kind(), ExErrorKind::InvalidInput);
    assert_eq!(child.kind(), ExErrorKind::InvalidInput);
}

#[test]
fn test_session_failure_is_external_service() {
    let ex_err: ExError = YangkitError::Session {
        message: "connection reset".to_string(),
    }
    .into();

    assert_eq!(ex_err.code(), "ERR_EXTERNAL_SERVICE");
    assert_eq!(ex_err.message(), "connection reset");
}

#[test]
fn test_error_kind_codes_unique() {
    let kinds = [
        ExErrorKind::ProtocolMismatch,
        ExErrorKind::UnexpectedElement,
        ExErrorKind::InvalidPayload,
        ExErrorKind::FilterNotRooted,
        ExErrorKind::NotFound,
        ExErrorKind::InvalidInput,
        ExErrorKind::Serialization,
        ExErrorKind::ExternalService,
        ExErrorKind::Internal,
    ];

    let mut codes: Vec<&str> = kinds.iter().map(|k| k.code()).collect();
    codes.sort_unstable();
    codes.dedup();
    assert_eq!(codes.len(), kinds.len());
    assert!(codes.iter().all(|c| c.starts_with("ERR_")));
}

#[test]
fn test_json_error_converts_to_serialization() {
    let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();

    let err: YangkitError = json_err.into();

    assert!(matches!(err, YangkitError::Serialization { .. }));
}
