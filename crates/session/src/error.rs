// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors for session folding (spec.md §4.9).

use cb_core::CbError;
use cb_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("event payload is missing `sessionId`")]
    MissingSessionId,
    #[error("stored session data is not valid JSON: {0}")]
    MalformedPayload(String),
}

impl From<SessionError> for CbError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::Store(inner) => inner.into(),
            SessionError::MissingSessionId => CbError::invalid_params("sessionId", e.to_string()),
            SessionError::MalformedPayload(detail) => CbError::internal(&detail),
        }
    }
}
