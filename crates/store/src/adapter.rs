// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`StoreAdapter`]: the subset of a Redis-compatible store's operations
//! used by the atomic scripts and by read paths that don't need atomicity
//! (spec.md §4.1). Every other crate in the workspace is written against
//! this trait, not the `redis` crate directly, so unit tests run against
//! [`crate::fake::FakeStore`] (behind `test-support`) instead of a live
//! Redis instance, the same way the teacher's `oj-adapters` crate puts a
//! trait in front of its agent backends for `FakeAdapter` substitution.

use crate::error::StoreError;
use async_trait::async_trait;
use std::collections::HashMap;

/// One entry of a sorted-set range-with-scores read.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredMember {
    pub member: String,
    pub score: f64,
}

/// One entry appended to a stream.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamEntry {
    pub id: String,
    pub fields: HashMap<String, String>,
}

/// A message delivered to a pub/sub subscription.
#[derive(Debug, Clone, PartialEq)]
pub struct PubSubMessage {
    pub channel: String,
    pub payload: String,
}

/// The store-side operations every crate above `cb-store` is written
/// against. Implemented by [`crate::redis_store::RedisStore`] for
/// production and [`crate::fake::FakeStore`] for tests.
#[async_trait]
pub trait StoreAdapter: Send + Sync {
    // -- kv --
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), StoreError>;
    /// `SET key value NX [EX ttl]`: true if the key was absent and now set.
    async fn set_nx_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<bool, StoreError>;
    async fn expire(&self, key: &str, ttl_secs: u64) -> Result<(), StoreError>;
    async fn ttl(&self, key: &str) -> Result<i64, StoreError>;
    async fn del(&self, key: &str) -> Result<bool, StoreError>;
    async fn exists(&self, key: &str) -> Result<bool, StoreError>;

    // -- hash --
    async fn hset(&self, key: &str, field: &str, value: &str) -> Result<(), StoreError>;
    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>, StoreError>;
    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>, StoreError>;
    async fn hincrby(&self, key: &str, field: &str, delta: i64) -> Result<i64, StoreError>;
    async fn hdel(&self, key: &str, field: &str) -> Result<(), StoreError>;

    // -- sorted set --
    async fn zadd(&self, key: &str, member: &str, score: f64) -> Result<(), StoreError>;
    async fn zrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>, StoreError>;
    async fn zrange_withscores(
        &self,
        key: &str,
        start: i64,
        stop: i64,
    ) -> Result<Vec<ScoredMember>, StoreError>;
    async fn zrem(&self, key: &str, member: &str) -> Result<bool, StoreError>;
    async fn zscore(&self, key: &str, member: &str) -> Result<Option<f64>, StoreError>;
    async fn zcard(&self, key: &str) -> Result<i64, StoreError>;

    // -- list --
    async fn lpush(&self, key: &str, value: &str) -> Result<i64, StoreError>;
    async fn rpush(&self, key: &str, value: &str) -> Result<i64, StoreError>;
    async fn lrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>, StoreError>;
    async fn lrem(&self, key: &str, count: i64, value: &str) -> Result<i64, StoreError>;
    async fn ltrim(&self, key: &str, start: i64, stop: i64) -> Result<(), StoreError>;
    async fn llen(&self, key: &str) -> Result<i64, StoreError>;

    // -- set --
    async fn sadd(&self, key: &str, member: &str) -> Result<bool, StoreError>;
    async fn srem(&self, key: &str, member: &str) -> Result<bool, StoreError>;
    async fn sismember(&self, key: &str, member: &str) -> Result<bool, StoreError>;
    async fn smembers(&self, key: &str) -> Result<Vec<String>, StoreError>;

    // -- stream --
    async fn xadd(&self, key: &str, fields: &[(&str, &str)]) -> Result<String, StoreError>;
    async fn xrange(
        &self,
        key: &str,
        start: &str,
        end: &str,
        count: usize,
    ) -> Result<Vec<StreamEntry>, StoreError>;
    async fn xlen(&self, key: &str) -> Result<i64, StoreError>;

    // -- pub/sub --
    /// Publishes on the dedicated publisher connection (spec.md §4.1's
    /// three-connection rule: publish must never share a connection with a
    /// blocked subscriber).
    async fn publish(&self, channel: &str, message: &str) -> Result<i64, StoreError>;

    // -- scripts --
    /// Evaluate a named, content-addressed script (spec.md §4.2). `name`
    /// identifies the script for caching/dispatch purposes; `source` is the
    /// Lua body used as a fallback on the real store when the cached SHA is
    /// evicted (`NOSCRIPT`), and is the sole dispatch key for
    /// [`crate::fake::FakeStore`], which reimplements each named script's
    /// semantics natively instead of embedding a Lua interpreter.
    ///
    /// Returns the script's JSON-encoded reply string, which the caller
    /// (`cb-scripts`) deserializes into a typed result.
    async fn eval_script(
        &self,
        name: &'static str,
        source: &'static str,
        keys: &[String],
        args: &[String],
    ) -> Result<String, StoreError>;

    /// Pre-load a script so the first real invocation can use `EVALSHA`
    /// (spec.md §4.2 "loaded once at startup"). A no-op for `FakeStore`.
    async fn script_load(&self, source: &'static str) -> Result<String, StoreError>;

    /// Binds a pattern (exact type or Redis-glob `prefix.*`) on the
    /// dedicated subscriber connection (spec.md §4.1's three-connection
    /// rule) and returns a channel of matching messages. Multiple
    /// subscriptions to overlapping patterns are independent: each gets its
    /// own copy of every matching message.
    async fn subscribe(
        &self,
        pattern: &str,
    ) -> Result<tokio::sync::mpsc::Receiver<PubSubMessage>, StoreError>;
}
