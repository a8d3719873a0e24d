use super::*;
use cb_core::test_support::fixed_clock;
use cb_store::fake::FakeStore;

#[test]
fn equal_params_hash_equal() {
    let a = serde_json::json!({"id": "t-1", "n": 2});
    let b = serde_json::json!({"id": "t-1", "n": 2});
    assert_eq!(params_hash(&a), params_hash(&b));
}

#[test]
fn different_params_hash_different() {
    let a = serde_json::json!({"id": "t-1"});
    let b = serde_json::json!({"id": "t-2"});
    assert_ne!(params_hash(&a), params_hash(&b));
}

#[tokio::test]
async fn miss_then_put_then_hit() {
    let store = FakeStore::new(fixed_clock());
    let keys = Keys;
    let hash = params_hash(&serde_json::json!({"id": "t-1"}));
    assert!(get(&store, &keys, "task.get", &hash).await.is_none());

    let result = serde_json::json!({"id": "t-1", "status": "pending"});
    put(&store, &keys, "task.get", &hash, std::time::Duration::from_secs(30), &result).await;

    let cached = get(&store, &keys, "task.get", &hash).await.expect("cache hit after put");
    assert_eq!(cached, result);
}
