// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Startup/shutdown errors. Per-operation errors never reach here — they
//! cross the wire as [`cb_core::CbError`] from `Registry::execute` instead.

use cb_core::CbError;
use cb_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("failed to connect to the store: {0}")]
    Store(#[from] StoreError),
    #[error("startup registration failed: {0}")]
    Registration(#[from] CbError),
}
