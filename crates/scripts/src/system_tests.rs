use super::*;
use cb_core::test_support::fixed_clock;
use cb_core::Clock;
use cb_store::fake::FakeStore;

fn store() -> FakeStore {
    FakeStore::new(fixed_clock())
}

#[tokio::test]
async fn first_registrant_becomes_leader() {
    let store = store();
    let now = fixed_clock().epoch_ms() as i64;

    let first = register(
        &store,
        "cb:instance:w1",
        "cb:instances:active",
        "cb:leader:current",
        "cb:leader:lock",
        "w1",
        "[\"worker\"]",
        "iso",
        now,
        30,
        30,
    )
    .await
    .expect("first register succeeds");
    assert!(first.became_leader);

    let second = register(
        &store,
        "cb:instance:w2",
        "cb:instances:active",
        "cb:leader:current",
        "cb:leader:lock",
        "w2",
        "[\"worker\"]",
        "iso",
        now,
        30,
        30,
    )
    .await
    .expect("second register succeeds");
    assert!(!second.became_leader);
}

#[tokio::test]
async fn heartbeat_renews_leader_lease() {
    let store = store();
    let now = fixed_clock().epoch_ms() as i64;
    register(&store, "cb:instance:w1", "cb:instances:active", "cb:leader:current", "cb:leader:lock", "w1", "[]", "iso", now, 30, 30)
        .await
        .expect("register succeeds");

    let hb = heartbeat(&store, "cb:instance:w1", "cb:gossip:health", "cb:leader:current", "cb:leader:lock", "w1", "iso2", now + 1000, 30, 30)
        .await
        .expect("heartbeat succeeds");
    assert!(hb.is_leader);
}

#[tokio::test]
async fn heartbeat_on_unregistered_instance_fails() {
    let store = store();
    let now = fixed_clock().epoch_ms() as i64;
    let err = heartbeat(&store, "cb:instance:ghost", "cb:gossip:health", "cb:leader:current", "cb:leader:lock", "ghost", "iso", now, 30, 30)
        .await
        .expect_err("heartbeat on unregistered instance fails");
    assert!(matches!(err, ScriptError::NotRegistered));
}

#[tokio::test]
async fn reassign_failed_redistributes_round_robin() {
    let store = store();
    let now = fixed_clock().epoch_ms() as i64;
    store.rpush("cb:queue:instance:dead", "t-1").await.expect("seed queue");
    store.rpush("cb:queue:instance:dead", "t-2").await.expect("seed queue");
    store.hset("cb:instance:dead", "id", "dead").await.expect("seed instance");

    let outcome = reassign_failed(
        &store,
        "cb:queue:instance:dead",
        "cb:instance:dead",
        "cb:redistributed:from:dead",
        "iso",
        &["w1".to_string(), "w2".to_string()],
    )
    .await
    .expect("reassign_failed succeeds");
    assert_eq!(outcome.reassigned, 2);

    let status = store.hget("cb:instance:dead", "status").await.expect("hget succeeds");
    assert_eq!(status.as_deref(), Some("offline"));
}
