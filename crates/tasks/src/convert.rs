// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Maps the `cb:task:{id}` store-hash shape (camelCase field names, as
//! written by `cb-scripts`'s Lua/native scripts) onto [`cb_core::Task`]
//! (snake_case Rust fields). Kept as an explicit, reviewable function
//! rather than a serde rename table so the two shapes can diverge without
//! coupling the wire format scripts write to the domain type's derive.

use crate::error::TaskError;
use cb_core::{Task, TaskStatus};
use std::collections::HashMap;

pub(crate) fn task_from_fields(fields: &HashMap<String, String>) -> Result<Task, TaskError> {
    if fields.is_empty() {
        return Err(TaskError::NotFound);
    }
    let get = |k: &str| fields.get(k).cloned().unwrap_or_default();
    let status = match get("status").as_str() {
        "pending" => TaskStatus::Pending,
        "in_progress" => TaskStatus::InProgress,
        "completed" => TaskStatus::Completed,
        "failed" => TaskStatus::Failed,
        other => {
            tracing::warn!(status = other, "unrecognized task status in store hash, defaulting to pending");
            TaskStatus::Pending
        }
    };
    let metadata = parse_json_or_null(&get("metadata"));
    let deny: Vec<String> = fields
        .get("deny")
        .and_then(|raw| serde_json::from_str(raw).ok())
        .unwrap_or_default();

    Ok(Task {
        id: get("id"),
        text: get("text"),
        priority: get("priority").parse().unwrap_or(50),
        status,
        assigned_to: non_empty(fields.get("assignedTo")),
        metadata,
        result: fields.get("result").and_then(|raw| serde_json::from_str(raw).ok()),
        error: non_empty(fields.get("error")),
        created_at: get("createdAt"),
        created_at_ms: get("createdAtMs").parse().unwrap_or(0),
        updated_at: get("updatedAt"),
        assigned_at: non_empty(fields.get("assignedAt")),
        completed_at: non_empty(fields.get("completedAt")),
        duration_ms: fields.get("duration").and_then(|v| v.parse().ok()),
        reassigned_at: non_empty(fields.get("reassignedAt")),
        reassign_reason: non_empty(fields.get("reassignReason")),
        deny,
    })
}

fn non_empty(v: Option<&String>) -> Option<String> {
    v.filter(|s| !s.is_empty()).cloned()
}

fn parse_json_or_null(raw: &str) -> serde_json::Value {
    serde_json::from_str(raw).unwrap_or(serde_json::Value::Null)
}

#[cfg(test)]
#[path = "convert_tests.rs"]
mod tests;
