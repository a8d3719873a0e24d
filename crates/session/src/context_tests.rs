use super::*;

#[test]
fn apply_tracks_last_prompt() {
    let mut ctx = SessionContext::default();
    ctx.apply(&serde_json::json!({"prompt": "first"}));
    ctx.apply(&serde_json::json!({"toolName": "Bash"}));
    ctx.apply(&serde_json::json!({"prompt": "second"}));
    assert_eq!(ctx.last_prompt.as_deref(), Some("second"));
}

#[test]
fn apply_rolls_tools_to_at_most_ten_most_recent_first() {
    let mut ctx = SessionContext::default();
    for i in 0..12 {
        ctx.apply(&serde_json::json!({"toolName": format!("tool-{i}")}));
    }
    assert_eq!(ctx.last_tools.len(), 10);
    assert_eq!(ctx.last_tools[0], "tool-11");
    assert_eq!(ctx.last_tools[9], "tool-2");
}

#[test]
fn apply_replaces_active_todos_wholesale() {
    let mut ctx = SessionContext::default();
    ctx.apply(&serde_json::json!({"todos": [{"id": 1}]}));
    ctx.apply(&serde_json::json!({"todos": [{"id": 2}, {"id": 3}]}));
    assert_eq!(ctx.active_todos, Some(serde_json::json!([{"id": 2}, {"id": 3}])));
}

#[test]
fn apply_ignores_unrelated_payload_fields() {
    let mut ctx = SessionContext::default();
    ctx.apply(&serde_json::json!({"sessionId": "s1"}));
    assert_eq!(ctx, SessionContext::default());
}
