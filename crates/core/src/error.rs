// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The spec-level error type that crosses every `Registry::execute` boundary.
//!
//! Every crate defines its own `thiserror`-derived error enum for the
//! failures it can produce internally (`StoreError`, `TaskError`, ...) and
//! converts into [`CbError`] at its public boundary, so callers never have
//! to match on a dozen different error types — only on [`ErrorKind`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// The stable, transport-agnostic error kinds from spec.md §7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidParams,
    /// Dispatch-level failure: no handler is registered under the
    /// requested event name (spec.md §6 "Transport projection"). Distinct
    /// from [`ErrorKind::NotFound`], which is a domain lookup miss (e.g. a
    /// task id) inside a handler that *was* found.
    MethodNotFound,
    NotFound,
    Conflict,
    RateLimited,
    Timeout,
    CircuitOpen,
    Unauthorized,
    ServiceUnavailable,
    Internal,
}

crate::simple_display! {
    ErrorKind {
        InvalidParams => "invalid_params",
        MethodNotFound => "method_not_found",
        NotFound => "not_found",
        Conflict => "conflict",
        RateLimited => "rate_limited",
        Timeout => "timeout",
        CircuitOpen => "circuit_open",
        Unauthorized => "unauthorized",
        ServiceUnavailable => "service_unavailable",
        Internal => "internal",
    }
}

impl ErrorKind {
    /// Numeric code used by transport projections (spec.md §6, informational).
    pub fn json_rpc_code(self) -> i32 {
        match self {
            ErrorKind::InvalidParams => -32602,
            ErrorKind::MethodNotFound => -32601,
            ErrorKind::NotFound => -32603,
            ErrorKind::Conflict => -32603,
            ErrorKind::RateLimited => -32000,
            ErrorKind::CircuitOpen => -32001,
            ErrorKind::Unauthorized => -32002,
            ErrorKind::Timeout => -32603,
            ErrorKind::ServiceUnavailable => -32603,
            ErrorKind::Internal => -32603,
        }
    }
}

/// A structured, small detail attached to a terminal failure (spec.md §7
/// "User-visible behavior"): a field path for validation, remaining-ms for
/// rate limiting, or breaker state — never a raw store error message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// The error type returned by `Registry::execute` and every handler body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CbError {
    pub kind: ErrorKind,
    pub detail: ErrorDetail,
}

impl CbError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, detail: ErrorDetail { message: Some(message.into()), ..Default::default() } }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn method_not_found(event: impl std::fmt::Display) -> Self {
        Self::new(ErrorKind::MethodNotFound, format!("no handler registered for event {event}"))
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ServiceUnavailable, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    pub fn invalid_params(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::InvalidParams,
            detail: ErrorDetail {
                field: Some(field.into()),
                message: Some(message.into()),
                ..Default::default()
            },
        }
    }

    pub fn rate_limited(remaining_ms: u64) -> Self {
        Self {
            kind: ErrorKind::RateLimited,
            detail: ErrorDetail { remaining_ms: Some(remaining_ms), ..Default::default() },
        }
    }

    pub fn circuit_open(state: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::CircuitOpen,
            detail: ErrorDetail { state: Some(state.into()), ..Default::default() },
        }
    }

    pub fn timeout() -> Self {
        Self::new(ErrorKind::Timeout, "handler timed out")
    }

    /// Wrap an arbitrary internal failure, redacting the message the way
    /// spec.md §7 requires ("handler bodies never let raw store errors
    /// escape; they wrap them as Internal with a redacted message").
    pub fn internal(context: &str) -> Self {
        Self::new(ErrorKind::Internal, format!("internal error: {context}"))
    }
}

impl fmt::Display for CbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail.message {
            Some(m) => write!(f, "{}: {}", self.kind, m),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl std::error::Error for CbError {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
