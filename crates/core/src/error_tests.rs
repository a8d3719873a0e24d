use super::*;

#[test]
fn json_rpc_codes_match_spec_table() {
    assert_eq!(ErrorKind::InvalidParams.json_rpc_code(), -32602);
    assert_eq!(ErrorKind::RateLimited.json_rpc_code(), -32000);
    assert_eq!(ErrorKind::CircuitOpen.json_rpc_code(), -32001);
    assert_eq!(ErrorKind::Unauthorized.json_rpc_code(), -32002);
    assert_eq!(ErrorKind::Timeout.json_rpc_code(), -32603);
}

#[test]
fn rate_limited_carries_remaining_ms() {
    let err = CbError::rate_limited(1234);
    assert_eq!(err.kind, ErrorKind::RateLimited);
    assert_eq!(err.detail.remaining_ms, Some(1234));
}

#[test]
fn invalid_params_carries_field_path() {
    let err = CbError::invalid_params("priority", "must be 0..=100");
    assert_eq!(err.detail.field.as_deref(), Some("priority"));
}

#[test]
fn display_includes_message_when_present() {
    let err = CbError::not_found("task t-1 not found");
    assert_eq!(err.to_string(), "not_found: task t-1 not found");
}
