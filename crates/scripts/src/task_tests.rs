use super::*;
use cb_core::test_support::fixed_clock;
use cb_core::Clock;
use cb_store::fake::FakeStore;

fn store() -> FakeStore {
    FakeStore::new(fixed_clock())
}

#[tokio::test]
async fn create_then_claim_round_trips_the_task() {
    let store = store();
    let now = fixed_clock().epoch_ms();

    let created = create(
        &store,
        "cb:task:t-1",
        "cb:queue:tasks:pending",
        "cb:metrics:queues",
        "t-1",
        "do the thing",
        70,
        "{}",
        "2026-01-01T00:00:00Z",
        now as i64,
    )
    .await
    .expect("create succeeds");
    assert_eq!(created.status, "pending");

    let claimed = claim(
        &store,
        "cb:queue:tasks:pending",
        "cb:queue:instance:w1",
        "cb:history:assignments",
        "cb:metrics:instance:w1",
        "w1",
        "2026-01-01T00:00:01Z",
        now as i64 + 1000,
        5,
    )
    .await
    .expect("claim succeeds");

    assert!(claimed.claimed);
    assert_eq!(claimed.task_id.as_deref(), Some("t-1"));
    let task = claimed.task.expect("claimed task fields");
    assert_eq!(task.get("status").map(String::as_str), Some("in_progress"));
    assert_eq!(task.get("assignedTo").map(String::as_str), Some("w1"));
}

#[tokio::test]
async fn create_rejects_duplicate_id() {
    let store = store();
    let now = fixed_clock().epoch_ms() as i64;
    create(&store, "cb:task:t-1", "cb:queue:tasks:pending", "cb:metrics:queues", "t-1", "x", 50, "{}", "iso", now)
        .await
        .expect("first create succeeds");

    let err = create(&store, "cb:task:t-1", "cb:queue:tasks:pending", "cb:metrics:queues", "t-1", "x", 50, "{}", "iso", now)
        .await
        .expect_err("duplicate create fails");
    assert!(matches!(err, ScriptError::TaskExists));
}

#[tokio::test]
async fn claim_with_nothing_pending_returns_not_claimed() {
    let store = store();
    let now = fixed_clock().epoch_ms() as i64;
    let claimed = claim(&store, "cb:queue:tasks:pending", "cb:queue:instance:w1", "cb:history:assignments", "cb:metrics:instance:w1", "w1", "iso", now, 5)
        .await
        .expect("claim on empty queue succeeds");
    assert!(!claimed.claimed);
}

#[tokio::test]
async fn complete_then_complete_again_is_rejected() {
    let store = store();
    let now = fixed_clock().epoch_ms() as i64;
    create(&store, "cb:task:t-1", "cb:queue:tasks:pending", "cb:metrics:queues", "t-1", "x", 50, "{}", "iso", now)
        .await
        .expect("create succeeds");
    claim(&store, "cb:queue:tasks:pending", "cb:queue:instance:w1", "cb:history:assignments", "cb:metrics:instance:w1", "w1", "iso", now, 5)
        .await
        .expect("claim succeeds");

    let completed = complete(
        &store,
        "cb:task:t-1",
        "cb:queue:instance:w1",
        "cb:history:task:t-1:completions",
        "cb:metrics:instance:w1",
        "cb:metrics:queues",
        "{\"ok\":true}",
        "",
        "iso2",
        now + 500,
    )
    .await
    .expect("complete succeeds");
    assert_eq!(completed.status, "completed");

    let err = complete(
        &store,
        "cb:task:t-1",
        "cb:queue:instance:w1",
        "cb:history:task:t-1:completions",
        "cb:metrics:instance:w1",
        "cb:metrics:queues",
        "",
        "",
        "iso3",
        now + 600,
    )
    .await
    .expect_err("second complete fails");
    assert!(matches!(err, ScriptError::AlreadyCompleted));
}

#[tokio::test]
async fn non_empty_error_completes_as_failed() {
    let store = store();
    let now = fixed_clock().epoch_ms() as i64;
    create(&store, "cb:task:t-1", "cb:queue:tasks:pending", "cb:metrics:queues", "t-1", "x", 50, "{}", "iso", now)
        .await
        .expect("create succeeds");
    claim(&store, "cb:queue:tasks:pending", "cb:queue:instance:w1", "cb:history:assignments", "cb:metrics:instance:w1", "w1", "iso", now, 5)
        .await
        .expect("claim succeeds");

    let completed = complete(
        &store,
        "cb:task:t-1",
        "cb:queue:instance:w1",
        "cb:history:task:t-1:completions",
        "cb:metrics:instance:w1",
        "cb:metrics:queues",
        "",
        "boom",
        "iso2",
        now + 500,
    )
    .await
    .expect("complete with error succeeds");
    assert_eq!(completed.status, "failed");
}

#[tokio::test]
async fn reassign_adds_current_assignee_to_deny_list() {
    let store = store();
    let now = fixed_clock().epoch_ms() as i64;
    create(&store, "cb:task:t-1", "cb:queue:tasks:pending", "cb:metrics:queues", "t-1", "x", 50, "{}", "iso", now)
        .await
        .expect("create succeeds");
    claim(&store, "cb:queue:tasks:pending", "cb:queue:instance:w1", "cb:history:assignments", "cb:metrics:instance:w1", "w1", "iso", now, 5)
        .await
        .expect("claim succeeds");

    let reassigned = reassign(
        &store,
        "cb:task:t-1",
        "cb:queue:tasks:pending",
        "cb:queue:instance:w1",
        "",
        "",
        "heartbeat_timeout",
        "iso2",
    )
    .await
    .expect("reassign succeeds");
    assert_eq!(reassigned.to, "global");

    let fields = store.hgetall("cb:task:t-1").await.expect("hgetall succeeds");
    assert!(fields.get("deny").expect("deny field present").contains("w1"));
}

#[tokio::test]
async fn delete_is_idempotent_not_found() {
    let store = store();
    let err = delete(&store, "cb:task:missing", "cb:queue:tasks:pending", "", "iso")
        .await
        .expect_err("deleting a missing task fails");
    assert!(matches!(err, ScriptError::TaskNotFound));
}
