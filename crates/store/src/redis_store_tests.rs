// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn connect_rejects_malformed_url() {
    let result = RedisStore::connect("not-a-redis-url").await;
    assert!(result.is_err());
}

/// Exercises a live Redis; skipped unless `CB_TEST_REDIS_URL` is set, the
/// same opt-in pattern the teacher uses for tests that need a live backend.
#[tokio::test]
#[ignore = "requires a live Redis at CB_TEST_REDIS_URL"]
async fn round_trips_a_string_against_live_redis() {
    let url = std::env::var("CB_TEST_REDIS_URL").expect("CB_TEST_REDIS_URL not set");
    let store = RedisStore::connect(&url).await.expect("connect");
    store.set("cb:test:roundtrip", "hello").await.expect("set");
    let value = store.get("cb:test:roundtrip").await.expect("get");
    assert_eq!(value.as_deref(), Some("hello"));
}
