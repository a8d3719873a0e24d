use super::*;
use cb_core::test_support::fixed_clock;
use cb_core::{Clock, FakeClock};
use cb_store::fake::FakeStore;

fn store() -> (FakeStore, FakeClock) {
    let clock = fixed_clock();
    (FakeStore::new(clock.clone()), clock)
}

#[tokio::test]
async fn calls_within_limit_succeed() {
    let (store, clock) = store();
    let keys = Keys;
    for _ in 0..5 {
        check(&store, &keys, "task.create", 5, 60_000, clock.epoch_ms()).await.expect("within limit");
    }
}

#[tokio::test]
async fn the_call_over_the_limit_is_rejected() {
    let (store, clock) = store();
    let keys = Keys;
    for _ in 0..5 {
        check(&store, &keys, "task.create", 5, 60_000, clock.epoch_ms()).await.expect("within limit");
    }
    let err = check(&store, &keys, "task.create", 5, 60_000, clock.epoch_ms()).await.expect_err("over limit");
    assert_eq!(err.kind, ErrorKind::RateLimited);
    assert!(err.detail.remaining_ms.is_some());
}

#[tokio::test]
async fn a_new_window_resets_the_count() {
    let (store, clock) = store();
    let keys = Keys;
    for _ in 0..5 {
        check(&store, &keys, "task.create", 5, 60_000, clock.epoch_ms()).await.expect("within limit");
    }
    check(&store, &keys, "task.create", 5, 60_000, clock.epoch_ms() + 60_000).await.expect("new window resets count");
}
