// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task subsystem operations (spec.md §4.3), generic over the store and
//! clock the same way the teacher's `Runtime<A, N, C>` is generic over its
//! agent adapter, notify adapter, and clock — so unit tests substitute
//! [`cb_store::fake::FakeStore`] and [`cb_core::FakeClock`] without a live
//! Redis or wall clock.

use crate::convert::task_from_fields;
use crate::error::TaskError;
use cb_core::{Clock, Keys, Task, TaskId};
use cb_store::StoreAdapter;
use serde_json::Value;

/// Default bound on `task.claim`'s self-healing scan of stale pending entries.
const DEFAULT_CLAIM_ATTEMPTS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOrderBy {
    CreatedAt,
    Priority,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOrder {
    Asc,
    Desc,
}

/// `task.list` request shape (spec.md §6).
#[derive(Debug, Clone)]
pub struct TaskListFilter {
    pub status: Option<cb_core::TaskStatus>,
    pub assigned_to: Option<String>,
    pub priority: Option<u8>,
    pub order_by: TaskOrderBy,
    pub order: TaskOrder,
    pub limit: usize,
    pub offset: usize,
}

impl Default for TaskListFilter {
    fn default() -> Self {
        Self {
            status: None,
            assigned_to: None,
            priority: None,
            order_by: TaskOrderBy::CreatedAt,
            order: TaskOrder::Desc,
            limit: 20,
            offset: 0,
        }
    }
}

pub struct TaskListPage {
    pub tasks: Vec<Task>,
    pub total_count: usize,
    pub has_more: bool,
}

pub struct TaskService<S, C> {
    store: S,
    clock: C,
    keys: Keys,
}

impl<S, C> TaskService<S, C>
where
    S: StoreAdapter,
    C: Clock,
{
    pub fn new(store: S, clock: C) -> Self {
        Self { store, clock, keys: Keys }
    }

    pub async fn create(&self, text: &str, priority: u8, metadata: Value) -> Result<Task, TaskError> {
        let id = TaskId::generate(&self.clock);
        let now_ms = self.clock.epoch_ms();
        let now_iso = iso_now(now_ms);
        cb_scripts::task::create(
            &self.store,
            &self.keys.task(id.as_str()),
            &self.keys.pending_queue(),
            &self.keys.metrics_queues(),
            id.as_str(),
            text,
            priority,
            &metadata.to_string(),
            &now_iso,
            now_ms as i64,
        )
        .await?;
        // Maintained outside the atomic script, like cb-instance's role
        // index: `task.list` reads this instead of a `KEYS cb:task:*` scan
        // (spec.md §9 REDESIGN FLAGS).
        self.store.sadd(&self.keys.tasks_all(), id.as_str()).await.map_err(cb_scripts::ScriptError::from)?;
        self.load(id.as_str()).await
    }

    /// `task.assign(taskId, instanceId)` (spec.md §6): an operator-driven
    /// direct assignment, built on the same `task.reassign` script family
    /// that powers failure-driven reassignment (spec.md §9 REDESIGN FLAGS:
    /// no route mutates queue membership outside a script). The prior
    /// assignee, if any, is deny-listed the same way a failed claim would
    /// be — accepted here since re-claiming after being displaced by an
    /// operator is the same "don't hand it straight back" property the
    /// deny list exists for.
    pub async fn assign(&self, id: &str, instance_id: &str) -> Result<Task, TaskError> {
        self.reassign(id, Some(instance_id), "manual_assign").await
    }

    /// `task.unassign(taskId)` (spec.md §6): restores the task to pending,
    /// returning the assignment that was in place before the call.
    pub async fn unassign(&self, id: &str) -> Result<(Task, Option<String>), TaskError> {
        let previous = self.load(id).await?.assigned_to;
        let task = self.reassign(id, None, "manual_unassign").await?;
        Ok((task, previous))
    }

    /// `task.list` (spec.md §6): reads the maintained `tasks:all` index
    /// rather than scanning, applies the requested filter/sort/page, and
    /// reports whether more pages remain.
    pub async fn list(&self, filter: &TaskListFilter) -> Result<TaskListPage, TaskError> {
        let ids = self.store.smembers(&self.keys.tasks_all()).await.map_err(cb_scripts::ScriptError::from)?;
        let mut tasks = Vec::with_capacity(ids.len());
        for id in ids {
            match self.load(&id).await {
                Ok(task) => tasks.push(task),
                Err(TaskError::NotFound) => continue,
                Err(e) => return Err(e),
            }
        }
        tasks.retain(|t| {
            filter.status.map(|s| t.status == s).unwrap_or(true)
                && filter.assigned_to.as_deref().map(|w| t.assigned_to.as_deref() == Some(w)).unwrap_or(true)
                && filter.priority.map(|p| t.priority == p).unwrap_or(true)
        });
        match filter.order_by {
            TaskOrderBy::CreatedAt => tasks.sort_by_key(|t| t.created_at_ms),
            TaskOrderBy::Priority => tasks.sort_by_key(|t| t.priority),
        }
        if filter.order == TaskOrder::Desc {
            tasks.reverse();
        }
        let total_count = tasks.len();
        let page: Vec<Task> = tasks.into_iter().skip(filter.offset).take(filter.limit).collect();
        let has_more = filter.offset + page.len() < total_count;
        Ok(TaskListPage { tasks: page, total_count, has_more })
    }

    /// Claims the highest-priority pending task for `worker_id`, then issues
    /// the follow-up `task.update` that transitions `pending -> in_progress`
    /// (spec.md §4.3: claim itself only assigns, to preserve monotone rules).
    pub async fn claim(&self, worker_id: &str) -> Result<Option<Task>, TaskError> {
        let now_ms = self.clock.epoch_ms();
        let now_iso = iso_now(now_ms);
        let outcome = cb_scripts::task::claim(
            &self.store,
            &self.keys.pending_queue(),
            &self.keys.worker_queue(worker_id),
            &self.keys.assignments_history(),
            &self.keys.metrics_instance(worker_id),
            worker_id,
            &now_iso,
            now_ms as i64,
            DEFAULT_CLAIM_ATTEMPTS,
        )
        .await?;
        let Some(task_id) = outcome.task_id.filter(|_| outcome.claimed) else {
            return Ok(None);
        };
        cb_scripts::task::update(
            &self.store,
            &self.keys.task(&task_id),
            &self.keys.pending_queue(),
            &serde_json::json!({"status": "in_progress"}).to_string(),
            &now_iso,
        )
        .await?;
        Ok(Some(self.load(&task_id).await?))
    }

    pub async fn update(&self, id: &str, updates: Value) -> Result<Task, TaskError> {
        let now_iso = iso_now(self.clock.epoch_ms());
        cb_scripts::task::update(&self.store, &self.keys.task(id), &self.keys.pending_queue(), &updates.to_string(), &now_iso)
            .await?;
        self.load(id).await
    }

    pub async fn complete(&self, id: &str, result: Option<Value>, error: Option<String>) -> Result<Task, TaskError> {
        let task = self.load(id).await?;
        let worker_id = task.assigned_to.as_deref().ok_or(TaskError::NotAssigned)?;
        let now_ms = self.clock.epoch_ms();
        let now_iso = iso_now(now_ms);
        let result_json = result.map(|v| v.to_string()).unwrap_or_default();
        let error = error.unwrap_or_default();
        cb_scripts::task::complete(
            &self.store,
            &self.keys.task(id),
            &self.keys.worker_queue(worker_id),
            &self.keys.task_completions_history(id),
            &self.keys.metrics_instance(worker_id),
            &self.keys.metrics_queues(),
            &result_json,
            &error,
            &now_iso,
            now_ms as i64,
        )
        .await?;
        self.load(id).await
    }

    /// `target = None` always restores the task to pending (scheduler-driven
    /// redistribution). `target = Some(id)` raises [`TaskError::TargetDenied`]
    /// up front when `id` is already on the task's deny list, instead of the
    /// script's silent global-fallback path, which is reserved for the
    /// no-target case (spec.md §4.3, §9 Open Questions).
    pub async fn reassign(&self, id: &str, target: Option<&str>, reason: &str) -> Result<Task, TaskError> {
        let task = self.load(id).await?;
        if let Some(target_id) = target {
            if task.is_denied(target_id) {
                return Err(TaskError::TargetDenied);
            }
        }
        let current_worker_queue = task.assigned_to.as_deref().map(|w| self.keys.worker_queue(w)).unwrap_or_default();
        let target_worker_queue = target.map(|w| self.keys.worker_queue(w)).unwrap_or_default();
        let now_iso = iso_now(self.clock.epoch_ms());
        cb_scripts::task::reassign(
            &self.store,
            &self.keys.task(id),
            &self.keys.pending_queue(),
            &current_worker_queue,
            &target_worker_queue,
            target.unwrap_or(""),
            reason,
            &now_iso,
        )
        .await?;
        self.load(id).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), TaskError> {
        let task = self.load(id).await?;
        let worker_queue = task.assigned_to.as_deref().map(|w| self.keys.worker_queue(w)).unwrap_or_default();
        let now_iso = iso_now(self.clock.epoch_ms());
        cb_scripts::task::delete(&self.store, &self.keys.task(id), &self.keys.pending_queue(), &worker_queue, &now_iso).await?;
        self.store.srem(&self.keys.tasks_all(), id).await.map_err(cb_scripts::ScriptError::from)?;
        Ok(())
    }

    pub async fn auto_assign(&self, worker_id: &str, capacity: u32) -> Result<Option<Task>, TaskError> {
        let now_ms = self.clock.epoch_ms();
        let now_iso = iso_now(now_ms);
        let outcome = cb_scripts::task::auto_assign(
            &self.store,
            &self.keys.pending_queue(),
            &self.keys.worker_queue(worker_id),
            worker_id,
            &now_iso,
            now_ms as i64,
            capacity,
        )
        .await?;
        match outcome.task_id {
            Some(id) => Ok(Some(self.load(&id).await?)),
            None => Ok(None),
        }
    }

    async fn load(&self, id: &str) -> Result<Task, TaskError> {
        let fields = self.store.hgetall(&self.keys.task(id)).await.map_err(cb_scripts::ScriptError::from)?;
        task_from_fields(&fields)
    }
}

/// An RFC 3339 timestamp derived from the clock's epoch reading, not wall
/// time, so `FakeClock`-driven tests see a deterministic string.
fn iso_now(epoch_ms: u64) -> String {
    chrono::DateTime::<chrono::Utc>::from_timestamp_millis(epoch_ms as i64)
        .unwrap_or_default()
        .to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
