use super::*;
use cb_core::test_support::fixed_clock;
use cb_store::fake::FakeStore;
use cb_store::StoreAdapter;

fn store() -> FakeStore {
    FakeStore::new(fixed_clock())
}

#[tokio::test]
async fn aggregate_folds_queue_counters_and_active_instances() {
    let store = store();
    store.hset("cb:metrics:queues", "totalTasks", "3").await.expect("hset succeeds");
    store.hset("cb:metrics:queues", "pendingTasks", "2").await.expect("hset succeeds");
    store.sadd("cb:instances:active", "w1").await.expect("sadd succeeds");
    store.sadd("cb:instances:active", "w2").await.expect("sadd succeeds");

    aggregate(&store, "cb:metrics:queues", "cb:instances:active", "cb:metrics:global", "cb:metrics:scaling", "2026-01-01T00:00:00Z")
        .await
        .expect("aggregate succeeds");

    let global = store.hgetall("cb:metrics:global").await.expect("hgetall succeeds");
    assert_eq!(global.get("totalTasks").map(String::as_str), Some("3"));
    assert_eq!(global.get("activeInstances").map(String::as_str), Some("2"));
    let scaling = store.hgetall("cb:metrics:scaling").await.expect("hgetall succeeds");
    assert_eq!(scaling.get("pendingPerInstance").map(String::as_str), Some("1"));
}

#[tokio::test]
async fn sync_state_bumps_version_each_call() {
    let store = store();
    store.sadd("cb:tasks:all", "t-1").await.expect("sadd succeeds");

    let first = sync_state(&store, "cb:tasks:all", "cb:instances:active", "cb:state:global", "2026-01-01T00:00:00Z")
        .await
        .expect("first sync succeeds");
    assert_eq!(first.version, 1);

    let second = sync_state(&store, "cb:tasks:all", "cb:instances:active", "cb:state:global", "2026-01-01T00:00:01Z")
        .await
        .expect("second sync succeeds");
    assert_eq!(second.version, 2);
}
