use super::*;
use cb_core::test_support::fixed_clock;
use cb_store::fake::FakeStore;

fn store() -> FakeStore {
    FakeStore::new(fixed_clock())
}

#[tokio::test]
async fn first_sight_is_not_duplicate_second_is() {
    let store = store();
    let first = is_duplicate(&store, "cb:processed:events", "evt-1", 86_400).await.expect("first check succeeds");
    assert!(!first);
    let second = is_duplicate(&store, "cb:processed:events", "evt-1", 86_400).await.expect("second check succeeds");
    assert!(second);
}

#[tokio::test]
async fn add_to_partition_trims_to_max_len() {
    let store = store();
    for i in 0..5 {
        add_to_partition(&store, "cb:partition:p1", &format!("{{\"n\":{i}}}"), 3, 3600)
            .await
            .expect("add succeeds");
    }
    let kept = store.lrange("cb:partition:p1", 0, -1).await.expect("lrange succeeds");
    assert_eq!(kept.len(), 3);
    assert!(kept[0].contains("\"n\":2"));
}
