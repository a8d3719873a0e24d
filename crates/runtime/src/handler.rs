// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`Handler`]: the body stage of the pipeline (spec.md §4.6). Everything
//! before it (validate, rate-limit, timeout, breaker, cache) and after it
//! (metrics, persist) is the same for every event; a `Handler` impl is just
//! the domain-specific work in between.

use crate::context::EventContext;
use async_trait::async_trait;
use cb_core::CbError;
use serde_json::Value;

#[async_trait]
pub trait Handler: Send + Sync {
    async fn call(&self, params: Value, ctx: &EventContext) -> Result<Value, CbError>;
}

/// Adapts a plain async closure into a [`Handler`], the way the teacher's
/// `oj-core` lets a job be built from a function pointer instead of a named
/// struct when there's no state to carry.
pub struct FnHandler<F>(pub F);

#[async_trait]
impl<F, Fut> Handler for FnHandler<F>
where
    F: Fn(Value, EventContext) -> Fut + Send + Sync,
    Fut: std::future::Future<Output = Result<Value, CbError>> + Send,
{
    async fn call(&self, params: Value, ctx: &EventContext) -> Result<Value, CbError> {
        (self.0)(params, ctx.clone()).await
    }
}
