// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cb-daemon: process wiring (spec.md §5 "Concurrency & resource model").
//! Constructs the store, the registry, the subscriber dispatch units, the
//! scheduler, and the session folder, then runs them until a shutdown
//! signal arrives — the way the teacher's `oj-daemon` lifecycle module
//! takes `Config::load()` through construct → serve → shutdown, just
//! without the Unix-socket listener or WAL this fabric doesn't need.

mod error;
mod logging;

pub use error::DaemonError;
pub use logging::init_logging;

use cb_bus::{Dispatcher, EventSubscription};
use cb_core::{Clock, Config, SystemClock};
use cb_registry::Registry;
use cb_runtime::CallerMetadata;
use cb_scheduler::Scheduler;
use cb_session::{SessionFoldHandler, SessionService};
use cb_store::{RedisStore, StoreAdapter};
use std::sync::Arc;
use tracing::info;

/// Default concurrency bound for the `hook.*.executed` subscriber's worker
/// pool (spec.md §5 "bounded worker pool that runs handler bodies").
const SESSION_WORKER_POOL_SIZE: usize = 16;

/// Resolves the instance identity this process registers under: the
/// configured `CB_INSTANCE_ID`, or a freshly generated one so an operator
/// never has to hand-assign ids for a disposable worker fleet.
fn resolve_instance_id(config: &Config) -> String {
    config.instance_id.clone().unwrap_or_else(|| format!("instance-{}", nanoid::nanoid!(10)))
}

/// Runs the daemon until `tokio::signal::ctrl_c()` (and, on Unix, SIGTERM)
/// fires. Returns once every spawned task has wound down.
pub async fn run(config: Config) -> Result<(), DaemonError> {
    let instance_id = resolve_instance_id(&config);
    info!(instance_id, redis_url = %config.redis_url, roles = ?config.roles, "starting");

    let store: Arc<dyn StoreAdapter> = Arc::new(RedisStore::connect(&config.redis_url).await?);
    let clock = SystemClock;
    let now_ms: Arc<dyn Fn() -> u64 + Send + Sync> = Arc::new(move || clock.epoch_ms());

    let registry = Arc::new(Registry::new(instance_id.clone(), store.clone(), now_ms.clone(), &config));
    registry
        .execute(
            "system.register",
            serde_json::json!({"id": instance_id, "roles": config.roles}),
            CallerMetadata::default(),
        )
        .await?;

    let scheduler = Scheduler::spawn(registry.clone(), &config);
    let heartbeat = spawn_self_heartbeat(registry.clone(), instance_id.clone(), config.heartbeat_timeout_ms);
    let session_dispatch = spawn_session_dispatch(store.clone(), config.snapshot_every_n).await?;

    wait_for_shutdown_signal().await;
    info!("shutdown signal received, draining");

    heartbeat.abort();
    session_dispatch.abort();
    scheduler.shutdown().await;
    Ok(())
}

/// Renews this instance's own lease (spec.md §4.4: "periodic heartbeat
/// extends TTL") at a third of the staleness threshold, the conventional
/// margin for a TTL-based liveness signal to survive one missed tick.
fn spawn_self_heartbeat(registry: Arc<Registry>, instance_id: String, heartbeat_timeout_ms: u64) -> tokio::task::JoinHandle<()> {
    let period = std::time::Duration::from_millis((heartbeat_timeout_ms / 3).max(1_000));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            let params = serde_json::json!({"instanceId": instance_id});
            if let Err(err) = registry.execute("system.heartbeat", params, CallerMetadata::default()).await {
                tracing::warn!(%err, "self-heartbeat failed");
            }
        }
    })
}

/// Binds the `hook.*.executed` subscription (spec.md §4.9) and hands
/// delivery to a bounded-pool `Dispatcher` running the session folder.
async fn spawn_session_dispatch(store: Arc<dyn StoreAdapter>, snapshot_every_n: u64) -> Result<tokio::task::JoinHandle<()>, DaemonError> {
    let subscription = EventSubscription::bind(store.as_ref(), "hook.*.executed").await.map_err(|e| DaemonError::Store(e.into()))?;
    let clock = SystemClock;
    let service = Arc::new(SessionService::new(DynStore(store), clock, snapshot_every_n));
    let handler = Arc::new(SessionFoldHandler::new(service));
    let dispatcher = Dispatcher::new(SESSION_WORKER_POOL_SIZE);
    Ok(tokio::spawn(async move {
        dispatcher.run(subscription, handler).await;
    }))
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};
    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(_) => {
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sigterm.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

/// Thin `Arc<dyn StoreAdapter>` -> owned-`StoreAdapter` delegation so
/// `SessionService<S, C>` can stay generic without every caller needing a
/// concrete store type, the same pattern `cb-registry`'s `DynStore` uses.
#[derive(Clone)]
struct DynStore(Arc<dyn StoreAdapter>);

#[async_trait::async_trait]
impl StoreAdapter for DynStore {
    async fn get(&self, key: &str) -> Result<Option<String>, cb_store::StoreError> {
        self.0.get(key).await
    }
    async fn set(&self, key: &str, value: &str) -> Result<(), cb_store::StoreError> {
        self.0.set(key, value).await
    }
    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), cb_store::StoreError> {
        self.0.set_ex(key, value, ttl_secs).await
    }
    async fn set_nx_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<bool, cb_store::StoreError> {
        self.0.set_nx_ex(key, value, ttl_secs).await
    }
    async fn expire(&self, key: &str, ttl_secs: u64) -> Result<(), cb_store::StoreError> {
        self.0.expire(key, ttl_secs).await
    }
    async fn ttl(&self, key: &str) -> Result<i64, cb_store::StoreError> {
        self.0.ttl(key).await
    }
    async fn del(&self, key: &str) -> Result<bool, cb_store::StoreError> {
        self.0.del(key).await
    }
    async fn exists(&self, key: &str) -> Result<bool, cb_store::StoreError> {
        self.0.exists(key).await
    }
    async fn hset(&self, key: &str, field: &str, value: &str) -> Result<(), cb_store::StoreError> {
        self.0.hset(key, field, value).await
    }
    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>, cb_store::StoreError> {
        self.0.hget(key, field).await
    }
    async fn hgetall(&self, key: &str) -> Result<std::collections::HashMap<String, String>, cb_store::StoreError> {
        self.0.hgetall(key).await
    }
    async fn hincrby(&self, key: &str, field: &str, delta: i64) -> Result<i64, cb_store::StoreError> {
        self.0.hincrby(key, field, delta).await
    }
    async fn hdel(&self, key: &str, field: &str) -> Result<(), cb_store::StoreError> {
        self.0.hdel(key, field).await
    }
    async fn zadd(&self, key: &str, member: &str, score: f64) -> Result<(), cb_store::StoreError> {
        self.0.zadd(key, member, score).await
    }
    async fn zrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>, cb_store::StoreError> {
        self.0.zrange(key, start, stop).await
    }
    async fn zrange_withscores(&self, key: &str, start: i64, stop: i64) -> Result<Vec<cb_store::ScoredMember>, cb_store::StoreError> {
        self.0.zrange_withscores(key, start, stop).await
    }
    async fn zrem(&self, key: &str, member: &str) -> Result<bool, cb_store::StoreError> {
        self.0.zrem(key, member).await
    }
    async fn zscore(&self, key: &str, member: &str) -> Result<Option<f64>, cb_store::StoreError> {
        self.0.zscore(key, member).await
    }
    async fn zcard(&self, key: &str) -> Result<i64, cb_store::StoreError> {
        self.0.zcard(key).await
    }
    async fn lpush(&self, key: &str, value: &str) -> Result<i64, cb_store::StoreError> {
        self.0.lpush(key, value).await
    }
    async fn rpush(&self, key: &str, value: &str) -> Result<i64, cb_store::StoreError> {
        self.0.rpush(key, value).await
    }
    async fn lrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>, cb_store::StoreError> {
        self.0.lrange(key, start, stop).await
    }
    async fn lrem(&self, key: &str, count: i64, value: &str) -> Result<i64, cb_store::StoreError> {
        self.0.lrem(key, count, value).await
    }
    async fn ltrim(&self, key: &str, start: i64, stop: i64) -> Result<(), cb_store::StoreError> {
        self.0.ltrim(key, start, stop).await
    }
    async fn llen(&self, key: &str) -> Result<i64, cb_store::StoreError> {
        self.0.llen(key).await
    }
    async fn sadd(&self, key: &str, member: &str) -> Result<bool, cb_store::StoreError> {
        self.0.sadd(key, member).await
    }
    async fn srem(&self, key: &str, member: &str) -> Result<bool, cb_store::StoreError> {
        self.0.srem(key, member).await
    }
    async fn sismember(&self, key: &str, member: &str) -> Result<bool, cb_store::StoreError> {
        self.0.sismember(key, member).await
    }
    async fn smembers(&self, key: &str) -> Result<Vec<String>, cb_store::StoreError> {
        self.0.smembers(key).await
    }
    async fn xadd(&self, key: &str, fields: &[(&str, &str)]) -> Result<String, cb_store::StoreError> {
        self.0.xadd(key, fields).await
    }
    async fn xrange(&self, key: &str, start: &str, end: &str, count: usize) -> Result<Vec<cb_store::StreamEntry>, cb_store::StoreError> {
        self.0.xrange(key, start, end, count).await
    }
    async fn xlen(&self, key: &str) -> Result<i64, cb_store::StoreError> {
        self.0.xlen(key).await
    }
    async fn publish(&self, channel: &str, message: &str) -> Result<i64, cb_store::StoreError> {
        self.0.publish(channel, message).await
    }
    async fn eval_script(&self, name: &'static str, source: &'static str, keys: &[String], args: &[String]) -> Result<String, cb_store::StoreError> {
        self.0.eval_script(name, source, keys, args).await
    }
    async fn script_load(&self, source: &'static str) -> Result<String, cb_store::StoreError> {
        self.0.script_load(source).await
    }
    async fn subscribe(&self, pattern: &str) -> Result<tokio::sync::mpsc::Receiver<cb_store::PubSubMessage>, cb_store::StoreError> {
        self.0.subscribe(pattern).await
    }
}
