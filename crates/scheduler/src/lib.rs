// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cb-scheduler: the repeating-job engine (spec.md §4.7). Each job is a
//! `tokio::time::interval`-driven task that calls
//! [`cb_registry::Registry::execute`] on its own cadence — the scheduler is
//! just another caller of the dispatcher, never a privileged internal path
//! (spec.md §9 REDESIGN FLAGS). Modeled on the way the teacher's
//! `oj-daemon::engine::usage_metrics` collector spawns a single interval
//! loop per background concern.
//!
//! `redistribute-tasks` has no standalone job here: `system.check_health`
//! already performs the failed-instance sweep and reassignment in one
//! atomic-per-instance pass (`cb-instance::InstanceService::check_health`),
//! so `health-check` firing is what drives it — see `DESIGN.md`.

mod auto_assign;

use cb_core::{Config, Keys};
use cb_registry::Registry;
use cb_runtime::CallerMetadata;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Cadences for every job (spec.md §4.7 table). Mirrors `Config` in shape
/// but these are fixed per the spec rather than environment-tunable, aside
/// from `auto_assign_delay_ms` and `default_capacity` which genuinely are
/// (spec.md §6.1).
struct Cadence;

impl Cadence {
    const AGGREGATE_METRICS: Duration = Duration::from_secs(5);
    const SYNC_STATE: Duration = Duration::from_secs(10);
    const DETECT_PARTITIONS: Duration = Duration::from_secs(5);
    const CHECK_QUORUM: Duration = Duration::from_secs(15);
    const HEALTH_CHECK: Duration = Duration::from_secs(3);
    const AUTO_ASSIGN_DELAYED: Duration = Duration::from_secs(2);
}

/// Owns every scheduler task's `JoinHandle` and the `CancellationToken`
/// that stops them together.
pub struct Scheduler {
    cancel: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

impl Scheduler {
    /// Spawns all six interval-driven jobs (spec.md §4.7), each calling
    /// `registry.execute` under the synthetic `scheduler` caller identity.
    /// `redistribute-tasks` is folded into `health-check` (see module docs).
    pub fn spawn(registry: Arc<Registry>, config: &Config) -> Self {
        let cancel = CancellationToken::new();
        let mut handles = Vec::with_capacity(6);

        handles.push(spawn_job(cancel.clone(), Cadence::AGGREGATE_METRICS, "aggregate-metrics", {
            let registry = registry.clone();
            move || {
                let registry = registry.clone();
                async move {
                    call(&registry, "system.aggregate_metrics", serde_json::json!({})).await;
                }
            }
        }));

        handles.push(spawn_job(cancel.clone(), Cadence::SYNC_STATE, "sync-state", {
            let registry = registry.clone();
            move || {
                let registry = registry.clone();
                async move {
                    call(&registry, "system.sync_state", serde_json::json!({})).await;
                }
            }
        }));

        handles.push(spawn_job(cancel.clone(), Cadence::DETECT_PARTITIONS, "detect-partitions", {
            let registry = registry.clone();
            move || {
                let registry = registry.clone();
                async move {
                    call(&registry, "system.detect_partitions", serde_json::json!({})).await;
                }
            }
        }));

        handles.push(spawn_job(cancel.clone(), Cadence::CHECK_QUORUM, "check-quorum", {
            let registry = registry.clone();
            move || {
                let registry = registry.clone();
                async move {
                    call(&registry, "system.check_quorum", serde_json::json!({})).await;
                }
            }
        }));

        handles.push(spawn_job(cancel.clone(), Cadence::HEALTH_CHECK, "health-check", {
            let registry = registry.clone();
            move || {
                let registry = registry.clone();
                async move {
                    call(&registry, "system.check_health", serde_json::json!({})).await;
                }
            }
        }));

        let delay_ms = config.auto_assign_delay_ms;
        let capacity = config.default_capacity;
        handles.push(spawn_job(cancel.clone(), Cadence::AUTO_ASSIGN_DELAYED, "auto-assign-delayed", {
            let registry = registry.clone();
            move || {
                let registry = registry.clone();
                async move {
                    auto_assign::run_once(&registry, delay_ms, capacity).await;
                }
            }
        }));

        Self { cancel, handles }
    }

    /// Cancels every job and waits for its current tick to finish.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        for handle in self.handles {
            let _ = handle.await;
        }
    }
}

/// Runs `factory` on `period`, stopping as soon as `cancel` fires. A tick
/// that overruns its period simply delays the next one (`MissedTickBehavior`
/// default `Burst`), matching spec.md §4.7 "safe to run overlapping".
fn spawn_job<F, Fut>(cancel: CancellationToken, period: Duration, name: &'static str, mut factory: F) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: std::future::Future<Output = ()> + Send,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    debug!(job = name, "tick");
                    factory().await;
                }
                _ = cancel.cancelled() => {
                    debug!(job = name, "stopped");
                    break;
                }
            }
        }
    })
}

async fn call(registry: &Registry, event: &str, params: serde_json::Value) {
    let caller = CallerMetadata { instance_id: Some("scheduler".to_string()), session_id: None };
    if let Err(err) = registry.execute(event, params, caller).await {
        warn!(event, error = %err, "scheduler job call failed");
    }
}

/// Shared by `auto_assign` for the `role:worker` ∩ `instances:active` read —
/// kept here so both this crate's jobs agree on the same key builder.
pub(crate) fn keys() -> Keys {
    Keys
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
