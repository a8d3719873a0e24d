// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Instance manager errors (spec.md §4.4).

use cb_core::CbError;
use cb_scripts::ScriptError;
use cb_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InstanceError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("instance is not registered")]
    NotRegistered,
    #[error(transparent)]
    Script(ScriptError),
}

impl From<ScriptError> for InstanceError {
    fn from(e: ScriptError) -> Self {
        match e {
            ScriptError::NotRegistered => InstanceError::NotRegistered,
            other => InstanceError::Script(other),
        }
    }
}

impl From<InstanceError> for CbError {
    fn from(e: InstanceError) -> Self {
        match e {
            InstanceError::Store(inner) => inner.into(),
            InstanceError::NotRegistered => CbError::not_found("instance is not registered"),
            InstanceError::Script(inner) => inner.into(),
        }
    }
}
