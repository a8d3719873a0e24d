// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The condensed per-session context (spec.md §4.9): "last prompt, rolling
//! last-10 tools, active todos". A pure accumulator so the on-demand
//! fold-from-stream path in [`crate::service::SessionService::get_context`]
//! and the live per-event fold in
//! [`crate::service::SessionService::fold_event`] apply exactly the same
//! rule, just against different event sources.

use serde::{Deserialize, Serialize};
use serde_json::Value;

const MAX_ROLLING_TOOLS: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionContext {
    #[serde(rename = "lastPrompt", skip_serializing_if = "Option::is_none")]
    pub last_prompt: Option<String>,
    #[serde(rename = "lastTools")]
    pub last_tools: Vec<String>,
    #[serde(rename = "activeTodos", skip_serializing_if = "Option::is_none")]
    pub active_todos: Option<Value>,
}

impl SessionContext {
    /// Folds one hook event's payload in. Fields absent from the payload
    /// leave the corresponding part of the context unchanged.
    pub fn apply(&mut self, payload: &Value) {
        if let Some(prompt) = payload.get("prompt").and_then(Value::as_str) {
            self.last_prompt = Some(prompt.to_string());
        }
        if let Some(tool) = payload.get("toolName").and_then(Value::as_str) {
            self.last_tools.insert(0, tool.to_string());
            self.last_tools.truncate(MAX_ROLLING_TOOLS);
        }
        if let Some(todos) = payload.get("todos") {
            self.active_todos = Some(todos.clone());
        }
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
