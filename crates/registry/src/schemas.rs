// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-handler JSON Schema documents (spec.md §4.6 "validate" stage). Each
//! function returns the `params` schema a descriptor attaches with
//! `with_input_schema`; the `validate` stage in `cb-runtime` compiles and
//! runs it before a handler body ever sees the call.

use serde_json::{json, Value};

pub fn task_create() -> Value {
    json!({
        "type": "object",
        "properties": {
            "text": {"type": "string", "minLength": 1},
            "priority": {"type": "integer", "minimum": 0, "maximum": 100},
            "metadata": {},
        },
        "required": ["text"],
    })
}

pub fn task_update() -> Value {
    json!({
        "type": "object",
        "properties": {
            "id": {"type": "string", "minLength": 1},
            "updates": {"type": "object"},
        },
        "required": ["id", "updates"],
    })
}

pub fn task_claim() -> Value {
    json!({
        "type": "object",
        "properties": {
            "workerId": {"type": "string", "minLength": 1},
        },
        "required": ["workerId"],
    })
}

pub fn task_complete() -> Value {
    json!({
        "type": "object",
        "properties": {
            "id": {"type": "string", "minLength": 1},
            "taskId": {"type": "string", "minLength": 1},
            "result": {},
            "error": {"type": "string"},
        },
        "anyOf": [{"required": ["id"]}, {"required": ["taskId"]}],
    })
}

pub fn task_assign() -> Value {
    json!({
        "type": "object",
        "properties": {
            "taskId": {"type": "string", "minLength": 1},
            "instanceId": {"type": "string", "minLength": 1},
        },
        "required": ["taskId", "instanceId"],
    })
}

pub fn task_unassign() -> Value {
    json!({
        "type": "object",
        "properties": {
            "taskId": {"type": "string", "minLength": 1},
        },
        "required": ["taskId"],
    })
}

pub fn task_delete() -> Value {
    json!({
        "type": "object",
        "properties": {
            "id": {"type": "string", "minLength": 1},
        },
        "required": ["id"],
    })
}

pub fn task_list() -> Value {
    json!({
        "type": "object",
        "properties": {
            "status": {"type": "string", "enum": ["pending", "in_progress", "completed", "failed"]},
            "assignedTo": {"type": "string"},
            "priority": {"type": "integer", "minimum": 0, "maximum": 100},
            "orderBy": {"type": "string", "enum": ["priority", "createdAt"]},
            "order": {"type": "string", "enum": ["asc", "desc"]},
            "limit": {"type": "integer", "minimum": 0},
            "offset": {"type": "integer", "minimum": 0},
        },
    })
}

pub fn task_auto_assign() -> Value {
    json!({
        "type": "object",
        "properties": {
            "workerId": {"type": "string", "minLength": 1},
            "capacity": {"type": "integer", "minimum": 1},
        },
        "required": ["workerId"],
    })
}

pub fn system_register() -> Value {
    json!({
        "type": "object",
        "properties": {
            "id": {"type": "string", "minLength": 1},
            "roles": {"type": "array", "items": {"type": "string"}},
        },
        "required": ["id"],
    })
}

pub fn system_heartbeat() -> Value {
    json!({
        "type": "object",
        "properties": {
            "instanceId": {"type": "string", "minLength": 1},
            "id": {"type": "string", "minLength": 1},
        },
        "anyOf": [{"required": ["instanceId"]}, {"required": ["id"]}],
    })
}

/// Every `system.*` read-only/sweep operation below takes no params.
pub fn empty_object() -> Value {
    json!({"type": "object"})
}
