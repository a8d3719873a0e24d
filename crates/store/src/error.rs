// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Store-level failures (spec.md §4.1), converted to [`cb_core::CbError`]
//! at each crate's public boundary rather than escaping as raw driver errors
//! (spec.md §7 "Handler bodies never let raw store errors escape").

use cb_core::{CbError, ErrorKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("command failed: {0}")]
    Command(String),
    #[error("script {name} failed: {detail}")]
    Script { name: String, detail: String },
    #[error("script reply was not valid JSON: {0}")]
    MalformedReply(String),
}

impl From<redis::RedisError> for StoreError {
    fn from(e: redis::RedisError) -> Self {
        if e.is_connection_dropped() || e.is_connection_refusal() || e.is_timeout() {
            StoreError::Connection(e.to_string())
        } else {
            StoreError::Command(e.to_string())
        }
    }
}

impl From<StoreError> for CbError {
    fn from(e: StoreError) -> Self {
        match &e {
            StoreError::Connection(_) => CbError::new(ErrorKind::ServiceUnavailable, e.to_string()),
            _ => CbError::internal(&e.to_string()),
        }
    }
}
