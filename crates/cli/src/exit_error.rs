// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Custom error type that carries a process exit code.
//!
//! Commands return `ExitError` instead of calling `std::process::exit()`
//! directly, allowing `main()` to handle process termination.

use cb_core::{CbError, ErrorKind};
use std::fmt;

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExitError {}

impl From<CbError> for ExitError {
    /// Maps the spec's error kinds (spec.md §7) onto small, distinct exit
    /// codes so shell callers can branch without parsing stderr.
    fn from(err: CbError) -> Self {
        let code = match err.kind {
            ErrorKind::InvalidParams => 2,
            ErrorKind::NotFound | ErrorKind::MethodNotFound => 3,
            ErrorKind::Conflict => 4,
            ErrorKind::RateLimited => 5,
            ErrorKind::Timeout => 6,
            ErrorKind::CircuitOpen => 7,
            ErrorKind::Unauthorized => 8,
            ErrorKind::ServiceUnavailable => 9,
            ErrorKind::Internal => 1,
        };
        Self::new(code, err.to_string())
    }
}

#[cfg(test)]
#[path = "exit_error_tests.rs"]
mod tests;
