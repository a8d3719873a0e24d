use super::*;
use cb_core::test_support::fixed_clock;
use cb_core::{Clock, Config};
use cb_store::fake::FakeStore;
use cb_store::StoreAdapter;

fn registry() -> Arc<Registry> {
    let clock = fixed_clock();
    let store: Arc<dyn StoreAdapter> = Arc::new(FakeStore::new(clock.clone()));
    let now_ms: Arc<dyn Fn() -> u64 + Send + Sync> = Arc::new(move || clock.epoch_ms());
    Arc::new(Registry::new("instance-1", store, now_ms, &Config::default()))
}

#[tokio::test(start_paused = true)]
async fn aggregate_metrics_job_runs_on_its_cadence() {
    let registry = registry();
    let scheduler = Scheduler::spawn(registry.clone(), &Config::default());

    tokio::time::advance(Duration::from_secs(6)).await;
    tokio::task::yield_now().await;

    let global = registry.store().hgetall(&keys().metrics_global()).await.expect("hgetall succeeds");
    assert!(global.contains_key("activeInstances"));

    scheduler.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn sync_state_job_bumps_version_twice_after_two_ticks() {
    let registry = registry();
    let scheduler = Scheduler::spawn(registry.clone(), &Config::default());

    tokio::time::advance(Duration::from_secs(21)).await;
    tokio::task::yield_now().await;

    let state = registry.store().hgetall(&keys().state_global()).await.expect("hgetall succeeds");
    let version: u64 = state.get("version").expect("version is set").parse().expect("version parses");
    assert!(version >= 2);

    scheduler.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn auto_assign_delayed_job_leaves_fresh_tasks_alone() {
    let registry = registry();
    registry
        .execute("task.create", serde_json::json!({"text": "t1"}), CallerMetadata::default())
        .await
        .expect("create succeeds");
    registry
        .execute("system.register", serde_json::json!({"id": "w1", "roles": ["worker"]}), CallerMetadata::default())
        .await
        .expect("register succeeds");

    let scheduler = Scheduler::spawn(registry.clone(), &Config::default());
    tokio::time::advance(Duration::from_secs(3)).await;
    tokio::task::yield_now().await;

    let tasks = registry.execute("task.list", serde_json::json!({}), CallerMetadata::default()).await.expect("list succeeds");
    assert_eq!(tasks["tasks"][0]["status"], "pending");

    scheduler.shutdown().await;
}
