// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task record and status machine (spec.md §3 data model).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// `status ∈ {pending, in_progress, completed, failed}` (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

crate::simple_display! {
    TaskStatus {
        Pending => "pending",
        InProgress => "in_progress",
        Completed => "completed",
        Failed => "failed",
    }
}

impl TaskStatus {
    /// Whether `self -> next` is an allowed transition (spec.md §3 Invariants,
    /// "Monotone status"). `completed` is a sink: no outgoing transitions.
    pub fn can_transition_to(self, next: TaskStatus) -> bool {
        use TaskStatus::*;
        matches!(
            (self, next),
            (Pending, InProgress)
                | (InProgress, Completed)
                | (InProgress, Failed)
                | (Failed, Pending)
                | (InProgress, Pending)
        )
    }
}

/// A task instance, as stored in the `cb:task:{id}` hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub text: String,
    pub priority: u8,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub metadata: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: String,
    pub created_at_ms: u64,
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reassigned_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reassign_reason: Option<String>,
    /// Workers barred from re-holding this task, accumulated on
    /// failures/reassignment. Never shrinks until the task is deleted
    /// (spec.md §3 Invariants, "Deny-list monotonicity").
    #[serde(default)]
    pub deny: Vec<String>,
}

impl Task {
    /// Sorted-set score for the pending queue: negated priority so
    /// `zrange 0 0` (lowest score first) yields the highest priority
    /// (spec.md §4.3 "Algorithmic notes").
    pub fn pending_score(priority: u8) -> f64 {
        -(priority as f64)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.status, TaskStatus::Completed)
    }

    pub fn is_denied(&self, worker_id: &str) -> bool {
        self.deny.iter().any(|w| w == worker_id)
    }

    pub fn metadata_map(&self) -> HashMap<String, serde_json::Value> {
        match &self.metadata {
            serde_json::Value::Object(map) => {
                map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
            }
            _ => HashMap::new(),
        }
    }
}

crate::builder! {
    pub struct TaskBuilder => Task {
        into {
            id: String = "t-1",
            text: String = "test task",
            created_at: String = "2026-01-01T00:00:00Z",
            updated_at: String = "2026-01-01T00:00:00Z",
        }
        set {
            priority: u8 = 50,
            status: TaskStatus = TaskStatus::Pending,
            metadata: serde_json::Value = serde_json::Value::Null,
            created_at_ms: u64 = 0,
            deny: Vec<String> = Vec::new(),
        }
        option {
            assigned_to: String = None,
            result: serde_json::Value = None,
            error: String = None,
            assigned_at: String = None,
            completed_at: String = None,
            duration_ms: u64 = None,
            reassigned_at: String = None,
            reassign_reason: String = None,
        }
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
