// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn emit_json_ignores_render_closure() {
    let mut rendered = false;
    let value = serde_json::json!({"ok": true});
    emit(OutputFormat::Json, &value, |_| rendered = true).unwrap();
    assert!(!rendered);
}

#[test]
fn emit_text_calls_render_closure() {
    let mut rendered = false;
    let value = serde_json::json!({"ok": true});
    emit(OutputFormat::Text, &value, |_| rendered = true).unwrap();
    assert!(rendered);
}
