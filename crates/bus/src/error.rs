// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event bus errors (spec.md §4.5).

use cb_core::CbError;
use cb_scripts::ScriptError;
use cb_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BusError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("script error: {0}")]
    Script(#[from] ScriptError),
    #[error("event payload is not valid JSON: {0}")]
    MalformedPayload(String),
}

impl From<BusError> for CbError {
    fn from(e: BusError) -> Self {
        match e {
            BusError::Store(inner) => inner.into(),
            BusError::Script(inner) => inner.into(),
            BusError::MalformedPayload(detail) => CbError::internal(&detail),
        }
    }
}
