// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed outcomes for the `ok: 0` branch every script can return, so
//! callers match on a closed enum instead of comparing strings.

use cb_core::{CbError, ErrorKind};
use cb_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("script {script} returned malformed JSON: {detail}")]
    MalformedReply { script: &'static str, detail: String },
    #[error("task not found")]
    TaskNotFound,
    #[error("task already exists")]
    TaskExists,
    #[error("task already completed")]
    AlreadyCompleted,
    #[error("task not assigned to a worker")]
    NotAssigned,
    #[error("worker queue is at capacity")]
    AtCapacity,
    #[error("instance not registered")]
    NotRegistered,
    #[error("script {script} reported an unrecognized error code: {code}")]
    Unrecognized { script: &'static str, code: String },
}

impl ScriptError {
    /// Maps the `error` field of an `{ok: 0, error: "..."}` reply to a
    /// typed variant. Every script's `.lua` source and `fake_scripts.rs`
    /// mirror agree on this vocabulary.
    pub(crate) fn from_code(script: &'static str, code: &str) -> Self {
        match code {
            "not_found" => ScriptError::TaskNotFound,
            "exists" => ScriptError::TaskExists,
            "already_completed" => ScriptError::AlreadyCompleted,
            "not_assigned" => ScriptError::NotAssigned,
            "at_capacity" => ScriptError::AtCapacity,
            "not_registered" => ScriptError::NotRegistered,
            other => ScriptError::Unrecognized {
                script,
                code: other.to_string(),
            },
        }
    }
}

impl From<ScriptError> for CbError {
    fn from(e: ScriptError) -> Self {
        let detail = e.to_string();
        match e {
            ScriptError::TaskNotFound | ScriptError::NotRegistered => {
                CbError::new(ErrorKind::NotFound, detail)
            }
            ScriptError::TaskExists | ScriptError::AlreadyCompleted | ScriptError::NotAssigned => {
                CbError::new(ErrorKind::Conflict, detail)
            }
            ScriptError::AtCapacity => CbError::new(ErrorKind::ServiceUnavailable, detail),
            ScriptError::Store(inner) => CbError::from(inner),
            ScriptError::MalformedReply { .. } | ScriptError::Unrecognized { .. } => {
                CbError::internal(&detail)
            }
        }
    }
}
