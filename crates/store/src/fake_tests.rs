// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use cb_core::FakeClock;

fn store() -> FakeStore {
    FakeStore::new(FakeClock::new())
}

#[tokio::test]
async fn kv_roundtrip() {
    let store = store();
    store.set("k", "v").await.unwrap();
    assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));
}

#[tokio::test]
async fn set_nx_ex_only_succeeds_once() {
    let store = store();
    assert!(store.set_nx_ex("lock", "a", 30).await.unwrap());
    assert!(!store.set_nx_ex("lock", "b", 30).await.unwrap());
    assert_eq!(store.get("lock").await.unwrap(), Some("a".to_string()));
}

#[tokio::test]
async fn ttl_expiry_follows_fake_clock() {
    let clock = FakeClock::new();
    let store = FakeStore::new(clock.clone());
    store.set_ex("k", "v", 10).await.unwrap();
    assert!(store.exists("k").await.unwrap());
    clock.advance(std::time::Duration::from_secs(11));
    assert!(!store.exists("k").await.unwrap());
    assert_eq!(store.get("k").await.unwrap(), None);
}

#[tokio::test]
async fn zset_range_orders_by_score_ascending() {
    let store = store();
    store.zadd("z", "a", -90.0).await.unwrap();
    store.zadd("z", "b", -10.0).await.unwrap();
    store.zadd("z", "c", -50.0).await.unwrap();
    assert_eq!(store.zrange("z", 0, -1).await.unwrap(), vec!["a", "c", "b"]);
}

#[tokio::test]
async fn list_fifo_via_rpush_lrange() {
    let store = store();
    store.rpush("l", "1").await.unwrap();
    store.rpush("l", "2").await.unwrap();
    store.rpush("l", "3").await.unwrap();
    assert_eq!(store.lrange("l", 0, -1).await.unwrap(), vec!["1", "2", "3"]);
    store.lrem("l", 0, "2").await.unwrap();
    assert_eq!(store.lrange("l", 0, -1).await.unwrap(), vec!["1", "3"]);
}

#[tokio::test]
async fn hash_incr_tracks_running_total() {
    let store = store();
    assert_eq!(store.hincrby("h", "n", 3).await.unwrap(), 3);
    assert_eq!(store.hincrby("h", "n", -1).await.unwrap(), 2);
}

#[tokio::test]
async fn stream_xadd_assigns_monotonic_ids() {
    let store = store();
    let id1 = store.xadd("s", &[("data", "{}")]).await.unwrap();
    let id2 = store.xadd("s", &[("data", "{}")]).await.unwrap();
    assert_ne!(id1, id2);
    assert_eq!(store.xlen("s").await.unwrap(), 2);
}

#[tokio::test]
async fn publish_delivers_to_matching_pattern_subscription() {
    let store = store();
    let mut rx = store.subscribe("task.*").await.unwrap();
    store.publish("task.created", "{}").await.unwrap();
    let msg = rx.recv().await.unwrap();
    assert_eq!(msg.channel, "task.created");
}

#[tokio::test]
async fn publish_does_not_deliver_to_non_matching_pattern() {
    let store = store();
    let mut rx = store.subscribe("system.*").await.unwrap();
    store.publish("task.created", "{}").await.unwrap();
    let result = tokio::time::timeout(std::time::Duration::from_millis(20), rx.recv()).await;
    assert!(result.is_err(), "expected no message within the timeout");
}
