use super::*;
use cb_core::ErrorKind;

fn schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "text": {"type": "string"},
            "priority": {"type": "integer", "minimum": 0, "maximum": 100},
        },
        "required": ["text"],
    })
}

#[test]
fn valid_instance_passes() {
    let instance = serde_json::json!({"text": "do it", "priority": 50});
    assert!(validate(&schema(), &instance).is_ok());
}

#[test]
fn missing_required_field_is_invalid_params() {
    let instance = serde_json::json!({"priority": 50});
    let err = validate(&schema(), &instance).expect_err("missing text fails validation");
    assert_eq!(err.kind, ErrorKind::InvalidParams);
}

#[test]
fn out_of_range_value_is_invalid_params() {
    let instance = serde_json::json!({"text": "do it", "priority": 500});
    let err = validate(&schema(), &instance).expect_err("out of range fails validation");
    assert_eq!(err.kind, ErrorKind::InvalidParams);
    assert!(err.detail.field.is_some());
}
