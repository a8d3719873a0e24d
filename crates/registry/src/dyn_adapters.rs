// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Adapters that let the generic `*Service<S, C>` types from `cb-tasks`,
//! `cb-instance`, and `cb-bus` be built once over the same trait objects
//! [`cb_runtime::EventContext`] hands to every handler, instead of the
//! Registry needing its own type parameter for every store/clock
//! combination a caller might construct it with.

use async_trait::async_trait;
use cb_core::Clock;
use cb_store::adapter::{PubSubMessage, ScoredMember, StreamEntry};
use cb_store::{StoreAdapter, StoreError};
use std::collections::HashMap;
use std::sync::Arc;

/// A [`StoreAdapter`] that delegates to a shared trait object, so services
/// generic over `S: StoreAdapter` can be instantiated as
/// `Service<DynStore, DynClock>` and share one underlying store with the
/// rest of the process (spec.md §4.1's single-store rule).
#[derive(Clone)]
pub struct DynStore(pub Arc<dyn StoreAdapter>);

#[async_trait]
impl StoreAdapter for DynStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.0.get(key).await
    }
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.0.set(key, value).await
    }
    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), StoreError> {
        self.0.set_ex(key, value, ttl_secs).await
    }
    async fn set_nx_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<bool, StoreError> {
        self.0.set_nx_ex(key, value, ttl_secs).await
    }
    async fn expire(&self, key: &str, ttl_secs: u64) -> Result<(), StoreError> {
        self.0.expire(key, ttl_secs).await
    }
    async fn ttl(&self, key: &str) -> Result<i64, StoreError> {
        self.0.ttl(key).await
    }
    async fn del(&self, key: &str) -> Result<bool, StoreError> {
        self.0.del(key).await
    }
    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        self.0.exists(key).await
    }
    async fn hset(&self, key: &str, field: &str, value: &str) -> Result<(), StoreError> {
        self.0.hset(key, field, value).await
    }
    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>, StoreError> {
        self.0.hget(key, field).await
    }
    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>, StoreError> {
        self.0.hgetall(key).await
    }
    async fn hincrby(&self, key: &str, field: &str, delta: i64) -> Result<i64, StoreError> {
        self.0.hincrby(key, field, delta).await
    }
    async fn hdel(&self, key: &str, field: &str) -> Result<(), StoreError> {
        self.0.hdel(key, field).await
    }
    async fn zadd(&self, key: &str, member: &str, score: f64) -> Result<(), StoreError> {
        self.0.zadd(key, member, score).await
    }
    async fn zrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>, StoreError> {
        self.0.zrange(key, start, stop).await
    }
    async fn zrange_withscores(&self, key: &str, start: i64, stop: i64) -> Result<Vec<ScoredMember>, StoreError> {
        self.0.zrange_withscores(key, start, stop).await
    }
    async fn zrem(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        self.0.zrem(key, member).await
    }
    async fn zscore(&self, key: &str, member: &str) -> Result<Option<f64>, StoreError> {
        self.0.zscore(key, member).await
    }
    async fn zcard(&self, key: &str) -> Result<i64, StoreError> {
        self.0.zcard(key).await
    }
    async fn lpush(&self, key: &str, value: &str) -> Result<i64, StoreError> {
        self.0.lpush(key, value).await
    }
    async fn rpush(&self, key: &str, value: &str) -> Result<i64, StoreError> {
        self.0.rpush(key, value).await
    }
    async fn lrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>, StoreError> {
        self.0.lrange(key, start, stop).await
    }
    async fn lrem(&self, key: &str, count: i64, value: &str) -> Result<i64, StoreError> {
        self.0.lrem(key, count, value).await
    }
    async fn ltrim(&self, key: &str, start: i64, stop: i64) -> Result<(), StoreError> {
        self.0.ltrim(key, start, stop).await
    }
    async fn llen(&self, key: &str) -> Result<i64, StoreError> {
        self.0.llen(key).await
    }
    async fn sadd(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        self.0.sadd(key, member).await
    }
    async fn srem(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        self.0.srem(key, member).await
    }
    async fn sismember(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        self.0.sismember(key, member).await
    }
    async fn smembers(&self, key: &str) -> Result<Vec<String>, StoreError> {
        self.0.smembers(key).await
    }
    async fn xadd(&self, key: &str, fields: &[(&str, &str)]) -> Result<String, StoreError> {
        self.0.xadd(key, fields).await
    }
    async fn xrange(&self, key: &str, start: &str, end: &str, count: usize) -> Result<Vec<StreamEntry>, StoreError> {
        self.0.xrange(key, start, end, count).await
    }
    async fn xlen(&self, key: &str) -> Result<i64, StoreError> {
        self.0.xlen(key).await
    }
    async fn publish(&self, channel: &str, message: &str) -> Result<i64, StoreError> {
        self.0.publish(channel, message).await
    }
    async fn eval_script(
        &self,
        name: &'static str,
        source: &'static str,
        keys: &[String],
        args: &[String],
    ) -> Result<String, StoreError> {
        self.0.eval_script(name, source, keys, args).await
    }
    async fn script_load(&self, source: &'static str) -> Result<String, StoreError> {
        self.0.script_load(source).await
    }
    async fn subscribe(&self, pattern: &str) -> Result<tokio::sync::mpsc::Receiver<PubSubMessage>, StoreError> {
        self.0.subscribe(pattern).await
    }
}

/// A [`Clock`] backed by the same `now` closure threaded through
/// [`cb_runtime::EventContext`], so scheduler-driven calls and
/// handler-pipeline calls see identical time during tests.
#[derive(Clone)]
pub struct DynClock(pub Arc<dyn Fn() -> u64 + Send + Sync>);

impl Clock for DynClock {
    fn epoch_ms(&self) -> u64 {
        (self.0)()
    }
}
