// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker-visible task errors (spec.md §4.3 "Failure semantics").

use cb_core::{CbError, ErrorKind};
use cb_scripts::ScriptError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("task not found")]
    NotFound,
    #[error("task already exists")]
    AlreadyExists,
    #[error("task already completed")]
    AlreadyCompleted,
    #[error("task is not assigned to a worker")]
    NotAssigned,
    #[error("reassignment target is on the task's deny list")]
    TargetDenied,
    #[error("worker queue is at capacity")]
    AtCapacity,
    #[error(transparent)]
    Script(ScriptError),
}

impl From<TaskError> for CbError {
    fn from(e: TaskError) -> Self {
        match e {
            TaskError::NotFound => CbError::not_found("task not found"),
            TaskError::AlreadyExists => CbError::conflict("task already exists"),
            TaskError::AlreadyCompleted => CbError::conflict("task already completed"),
            TaskError::NotAssigned => CbError::conflict("task is not assigned to a worker"),
            TaskError::TargetDenied => {
                CbError::new(ErrorKind::Conflict, "reassignment target is on the task's deny list")
            }
            TaskError::AtCapacity => CbError::new(ErrorKind::ServiceUnavailable, "worker queue is at capacity"),
            TaskError::Script(inner) => inner.into(),
        }
    }
}

impl From<ScriptError> for TaskError {
    fn from(e: ScriptError) -> Self {
        match e {
            ScriptError::TaskNotFound => TaskError::NotFound,
            ScriptError::TaskExists => TaskError::AlreadyExists,
            ScriptError::AlreadyCompleted => TaskError::AlreadyCompleted,
            ScriptError::NotAssigned => TaskError::NotAssigned,
            ScriptError::AtCapacity => TaskError::AtCapacity,
            other => TaskError::Script(other),
        }
    }
}
