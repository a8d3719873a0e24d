// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `task.*` handlers (spec.md §6 External Interfaces): thin `Value <->
//! domain type` translation layers over [`cb_tasks::TaskService`]. All the
//! actual lifecycle logic lives in `cb-tasks`/`cb-scripts`; a handler here
//! only parses params, calls the service, and shapes the reply.

use crate::dyn_adapters::{DynClock, DynStore};
use async_trait::async_trait;
use cb_core::{CbError, InstanceHealth, InstanceStatus};
use cb_instance::InstanceService;
use cb_runtime::{EventContext, Handler};
use cb_tasks::{TaskListFilter, TaskOrder, TaskOrderBy, TaskService};
use serde_json::{json, Value};
use std::sync::Arc;

fn field(params: &Value, name: &str) -> Result<Value, CbError> {
    params.get(name).cloned().ok_or_else(|| CbError::invalid_params(name, format!("missing field `{name}`")))
}

fn str_field(params: &Value, name: &str) -> Result<String, CbError> {
    field(params, name)?.as_str().map(str::to_string).ok_or_else(|| CbError::invalid_params(name, "expected a string"))
}

fn task_to_json(task: &cb_core::Task) -> Value {
    json!({
        "id": task.id,
        "text": task.text,
        "status": task.status,
        "priority": task.priority,
        "assignedTo": task.assigned_to,
        "createdAt": task.created_at,
        "createdAtMs": task.created_at_ms,
        "updatedAt": task.updated_at,
    })
}

pub struct Create(pub Arc<TaskService<DynStore, DynClock>>);

#[async_trait]
impl Handler for Create {
    async fn call(&self, params: Value, _ctx: &EventContext) -> Result<Value, CbError> {
        let text = str_field(&params, "text")?;
        let priority = params.get("priority").and_then(Value::as_u64).unwrap_or(50) as u8;
        let metadata = params.get("metadata").cloned().unwrap_or(Value::Null);
        let task = self.0.create(&text, priority, metadata).await?;
        Ok(task_to_json(&task))
    }
}

pub struct Update(pub Arc<TaskService<DynStore, DynClock>>);

#[async_trait]
impl Handler for Update {
    async fn call(&self, params: Value, _ctx: &EventContext) -> Result<Value, CbError> {
        let id = str_field(&params, "id")?;
        let updates = field(&params, "updates")?;
        let task = self.0.update(&id, updates).await?;
        Ok(task_to_json(&task))
    }
}

pub struct Claim(pub Arc<TaskService<DynStore, DynClock>>, pub Arc<InstanceService<DynStore, DynClock>>);

#[async_trait]
impl Handler for Claim {
    async fn call(&self, params: Value, _ctx: &EventContext) -> Result<Value, CbError> {
        let worker_id = str_field(&params, "workerId")?;
        // spec.md §4.3: caller must be registered and neither OFFLINE nor
        // unhealthy before the claim script ever runs.
        let instance = self.1.get(&worker_id).await.map_err(|_| CbError::unauthorized(format!("worker `{worker_id}` is not registered")))?;
        if instance.status == InstanceStatus::Offline || instance.health == InstanceHealth::Unhealthy {
            return Err(CbError::unauthorized(format!("worker `{worker_id}` is offline or unhealthy")));
        }
        match self.0.claim(&worker_id).await? {
            Some(task) => Ok(json!({"claimed": true, "taskId": task.id, "task": task_to_json(&task)})),
            // Clearly marked fallback, not success (spec.md §7 "User-visible behavior").
            None => Ok(json!({"claimed": false})),
        }
    }
}

pub struct Complete(pub Arc<TaskService<DynStore, DynClock>>);

#[async_trait]
impl Handler for Complete {
    async fn call(&self, params: Value, _ctx: &EventContext) -> Result<Value, CbError> {
        let id = params
            .get("id")
            .or_else(|| params.get("taskId"))
            .and_then(Value::as_str)
            .ok_or_else(|| CbError::invalid_params("id", "missing field `id` or `taskId`"))?;
        let result = params.get("result").cloned();
        let error = params.get("error").and_then(Value::as_str).map(str::to_string);
        let task = self.0.complete(id, result, error).await?;
        Ok(json!({"id": task.id, "status": task.status, "completedAt": task.completed_at}))
    }
}

pub struct Assign(pub Arc<TaskService<DynStore, DynClock>>);

#[async_trait]
impl Handler for Assign {
    async fn call(&self, params: Value, ctx: &EventContext) -> Result<Value, CbError> {
        let task_id = str_field(&params, "taskId")?;
        let instance_id = str_field(&params, "instanceId")?;
        let task = self.0.assign(&task_id, &instance_id).await?;
        Ok(json!({"taskId": task.id, "instanceId": instance_id, "assignedAt": ctx.now_ms()}))
    }
}

pub struct Unassign(pub Arc<TaskService<DynStore, DynClock>>);

#[async_trait]
impl Handler for Unassign {
    async fn call(&self, params: Value, ctx: &EventContext) -> Result<Value, CbError> {
        let task_id = str_field(&params, "taskId")?;
        let (task, previous) = self.0.unassign(&task_id).await?;
        Ok(json!({"taskId": task.id, "previousAssignment": previous, "unassignedAt": ctx.now_ms()}))
    }
}

pub struct Delete(pub Arc<TaskService<DynStore, DynClock>>);

#[async_trait]
impl Handler for Delete {
    async fn call(&self, params: Value, ctx: &EventContext) -> Result<Value, CbError> {
        let id = str_field(&params, "id")?;
        self.0.delete(&id).await?;
        Ok(json!({"id": id, "deleted": true, "deletedAt": ctx.now_ms()}))
    }
}

pub struct List(pub Arc<TaskService<DynStore, DynClock>>);

#[async_trait]
impl Handler for List {
    async fn call(&self, params: Value, _ctx: &EventContext) -> Result<Value, CbError> {
        let mut filter = TaskListFilter::default();
        if let Some(status) = params.get("status").and_then(Value::as_str) {
            filter.status = Some(parse_status(status)?);
        }
        filter.assigned_to = params.get("assignedTo").and_then(Value::as_str).map(str::to_string);
        filter.priority = params.get("priority").and_then(Value::as_u64).map(|p| p as u8);
        if let Some(order_by) = params.get("orderBy").and_then(Value::as_str) {
            filter.order_by = match order_by {
                "priority" => TaskOrderBy::Priority,
                "createdAt" => TaskOrderBy::CreatedAt,
                other => return Err(CbError::invalid_params("orderBy", format!("unknown orderBy `{other}`"))),
            };
        }
        if let Some(order) = params.get("order").and_then(Value::as_str) {
            filter.order = match order {
                "asc" => TaskOrder::Asc,
                "desc" => TaskOrder::Desc,
                other => return Err(CbError::invalid_params("order", format!("unknown order `{other}`"))),
            };
        }
        if let Some(limit) = params.get("limit").and_then(Value::as_u64) {
            filter.limit = limit as usize;
        }
        if let Some(offset) = params.get("offset").and_then(Value::as_u64) {
            filter.offset = offset as usize;
        }
        let page = self.0.list(&filter).await?;
        Ok(json!({
            "tasks": page.tasks.iter().map(task_to_json).collect::<Vec<_>>(),
            "totalCount": page.total_count,
            "hasMore": page.has_more,
        }))
    }
}

/// `task.auto_assign(workerId)` (spec.md §4.3, driven by `cb-scheduler`'s
/// `auto-assign-delayed` job — spec.md §4.7). Not part of the external
/// operation surface table, but reached the same way every other
/// scheduler-triggered mutation is: through `Registry::execute`, never a
/// privileged internal path (spec.md §9 REDESIGN FLAGS).
pub struct AutoAssign(pub Arc<TaskService<DynStore, DynClock>>);

#[async_trait]
impl Handler for AutoAssign {
    async fn call(&self, params: Value, _ctx: &EventContext) -> Result<Value, CbError> {
        let worker_id = str_field(&params, "workerId")?;
        let capacity = params.get("capacity").and_then(Value::as_u64).unwrap_or(10) as u32;
        match self.0.auto_assign(&worker_id, capacity).await? {
            Some(task) => Ok(json!({"assigned": true, "taskId": task.id, "task": task_to_json(&task)})),
            None => Ok(json!({"assigned": false})),
        }
    }
}

fn parse_status(raw: &str) -> Result<cb_core::TaskStatus, CbError> {
    match raw {
        "pending" => Ok(cb_core::TaskStatus::Pending),
        "in_progress" => Ok(cb_core::TaskStatus::InProgress),
        "completed" => Ok(cb_core::TaskStatus::Completed),
        "failed" => Ok(cb_core::TaskStatus::Failed),
        other => Err(CbError::invalid_params("status", format!("unknown status `{other}`"))),
    }
}
