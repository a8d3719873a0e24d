use super::*;
use cb_core::test_support::fixed_clock;
use cb_store::fake::FakeStore;

async fn seed(store: &FakeStore, id: &str, status: &str) {
    store.hset("cb:gossip:health", id, &serde_json::json!({"status": status, "lastSeen": 1}).to_string()).await.expect("hset succeeds");
}

#[tokio::test]
async fn five_instances_two_healthy_is_partitioned() {
    let store = FakeStore::new(fixed_clock());
    seed(&store, "i1", "healthy").await;
    seed(&store, "i2", "healthy").await;
    seed(&store, "i3", "unhealthy").await;
    seed(&store, "i4", "unhealthy").await;
    seed(&store, "i5", "unhealthy").await;

    let keys = Keys;
    let status = detect_partitions(&store, &keys).await.expect("detect_partitions succeeds");
    assert!(status.detected);
    assert!(store.exists("cb:partition:detected").await.expect("exists succeeds"));
}

#[tokio::test]
async fn four_of_five_healthy_is_recovered() {
    let store = FakeStore::new(fixed_clock());
    seed(&store, "i1", "healthy").await;
    seed(&store, "i2", "healthy").await;
    seed(&store, "i3", "healthy").await;
    seed(&store, "i4", "healthy").await;
    seed(&store, "i5", "unhealthy").await;

    let keys = Keys;
    let status = detect_partitions(&store, &keys).await.expect("detect_partitions succeeds");
    assert!(status.recovered);
    assert!(!status.detected);
}

#[tokio::test]
async fn two_instances_never_reports_partitioned() {
    let store = FakeStore::new(fixed_clock());
    seed(&store, "i1", "unhealthy").await;
    seed(&store, "i2", "unhealthy").await;

    let view = read_gossip_view(&store, "cb:gossip:health").await.expect("read_gossip_view succeeds");
    assert!(!view.is_partitioned());
}
