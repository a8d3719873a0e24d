use super::*;
use cb_core::test_support::fixed_clock;
use cb_store::fake::FakeStore;

fn service() -> TaskService<FakeStore, cb_core::FakeClock> {
    let clock = fixed_clock();
    TaskService::new(FakeStore::new(clock.clone()), clock)
}

#[tokio::test]
async fn create_returns_pending_task() {
    let svc = service();
    let task = svc.create("do it", 70, serde_json::json!({"k": 1})).await.expect("create succeeds");
    assert_eq!(task.text, "do it");
    assert_eq!(task.priority, 70);
    assert_eq!(task.status, cb_core::TaskStatus::Pending);
    assert_eq!(task.metadata, serde_json::json!({"k": 1}));
}

#[tokio::test]
async fn claim_transitions_to_in_progress() {
    let svc = service();
    svc.create("do it", 50, serde_json::Value::Null).await.expect("create succeeds");
    let claimed = svc.claim("w1").await.expect("claim succeeds").expect("a task was claimed");
    assert_eq!(claimed.status, cb_core::TaskStatus::InProgress);
    assert_eq!(claimed.assigned_to.as_deref(), Some("w1"));
}

#[tokio::test]
async fn claim_on_empty_queue_returns_none() {
    let svc = service();
    let claimed = svc.claim("w1").await.expect("claim succeeds on empty queue");
    assert!(claimed.is_none());
}

#[tokio::test]
async fn a_deny_listed_worker_cannot_reclaim_and_the_task_goes_to_the_next_candidate() {
    let svc = service();
    svc.create("do it", 50, serde_json::Value::Null).await.expect("create succeeds");
    let claimed = svc.claim("w1").await.expect("claim succeeds").expect("a task was claimed");
    svc.unassign(&claimed.id).await.expect("unassign denies w1 and returns the task to pending");

    let reclaim_by_w1 = svc.claim("w1").await.expect("claim call succeeds");
    assert!(reclaim_by_w1.is_none(), "w1 is deny-listed for this task and must not reclaim it");

    let claimed_by_w2 = svc.claim("w2").await.expect("claim succeeds").expect("w2 claims the skipped task");
    assert_eq!(claimed_by_w2.id, claimed.id);
    assert_eq!(claimed_by_w2.assigned_to.as_deref(), Some("w2"));
}

#[tokio::test]
async fn update_merges_fields() {
    let svc = service();
    let created = svc.create("do it", 50, serde_json::Value::Null).await.expect("create succeeds");
    let updated = svc.update(&created.id, serde_json::json!({"text": "do it differently"})).await.expect("update succeeds");
    assert_eq!(updated.text, "do it differently");
}

#[tokio::test]
async fn complete_without_assignment_is_rejected() {
    let svc = service();
    let created = svc.create("do it", 50, serde_json::Value::Null).await.expect("create succeeds");
    let err = svc.complete(&created.id, Some(serde_json::json!({"ok": true})), None).await.expect_err("unassigned task cannot complete");
    assert!(matches!(err, TaskError::NotAssigned));
}

#[tokio::test]
async fn complete_after_claim_marks_completed() {
    let svc = service();
    svc.create("do it", 50, serde_json::Value::Null).await.expect("create succeeds");
    let claimed = svc.claim("w1").await.expect("claim succeeds").expect("a task was claimed");
    let completed = svc.complete(&claimed.id, Some(serde_json::json!({"ok": true})), None).await.expect("complete succeeds");
    assert_eq!(completed.status, cb_core::TaskStatus::Completed);
}

#[tokio::test]
async fn complete_with_error_marks_failed() {
    let svc = service();
    svc.create("do it", 50, serde_json::Value::Null).await.expect("create succeeds");
    let claimed = svc.claim("w1").await.expect("claim succeeds").expect("a task was claimed");
    let completed = svc.complete(&claimed.id, None, Some("boom".to_string())).await.expect("complete succeeds");
    assert_eq!(completed.status, cb_core::TaskStatus::Failed);
    assert_eq!(completed.error.as_deref(), Some("boom"));
}

#[tokio::test]
async fn reassign_to_denied_target_is_rejected_up_front() {
    let svc = service();
    svc.create("do it", 50, serde_json::Value::Null).await.expect("create succeeds");
    let claimed = svc.claim("w1").await.expect("claim succeeds").expect("a task was claimed");
    // First reassignment denies w1 and falls back to pending.
    svc.reassign(&claimed.id, None, "heartbeat_timeout").await.expect("reassign succeeds");
    let err = svc.reassign(&claimed.id, Some("w1"), "manual").await.expect_err("denied target is rejected");
    assert!(matches!(err, TaskError::TargetDenied));
}

#[tokio::test]
async fn reassign_without_target_restores_pending() {
    let svc = service();
    svc.create("do it", 50, serde_json::Value::Null).await.expect("create succeeds");
    let claimed = svc.claim("w1").await.expect("claim succeeds").expect("a task was claimed");
    let reassigned = svc.reassign(&claimed.id, None, "heartbeat_timeout").await.expect("reassign succeeds");
    assert_eq!(reassigned.status, cb_core::TaskStatus::Pending);
    assert!(reassigned.is_denied("w1"));
}

#[tokio::test]
async fn delete_removes_the_task() {
    let svc = service();
    let created = svc.create("do it", 50, serde_json::Value::Null).await.expect("create succeeds");
    svc.delete(&created.id).await.expect("delete succeeds");
    let err = svc.load(&created.id).await.expect_err("task no longer exists");
    assert!(matches!(err, TaskError::NotFound));
}

#[tokio::test]
async fn auto_assign_claims_directly_into_in_progress() {
    let svc = service();
    svc.create("do it", 50, serde_json::Value::Null).await.expect("create succeeds");
    let assigned = svc.auto_assign("w1", 4).await.expect("auto_assign succeeds").expect("a task was assigned");
    assert_eq!(assigned.status, cb_core::TaskStatus::InProgress);
    assert_eq!(assigned.assigned_to.as_deref(), Some("w1"));
}

#[tokio::test]
async fn assign_then_unassign_round_trips_through_pending() {
    let svc = service();
    let created = svc.create("do it", 50, serde_json::Value::Null).await.expect("create succeeds");
    let assigned = svc.assign(&created.id, "w1").await.expect("assign succeeds");
    assert_eq!(assigned.status, cb_core::TaskStatus::InProgress);
    assert_eq!(assigned.assigned_to.as_deref(), Some("w1"));

    let (unassigned, previous) = svc.unassign(&created.id).await.expect("unassign succeeds");
    assert_eq!(unassigned.status, cb_core::TaskStatus::Pending);
    assert_eq!(previous.as_deref(), Some("w1"));
}

#[tokio::test]
async fn list_filters_by_status_and_orders_by_priority() {
    let svc = service();
    svc.create("low", 10, serde_json::Value::Null).await.expect("create succeeds");
    svc.create("high", 90, serde_json::Value::Null).await.expect("create succeeds");
    let claimed = svc.claim("w1").await.expect("claim succeeds").expect("claimed the high priority task");
    assert_eq!(claimed.priority, 90);

    let pending_only = svc
        .list(&TaskListFilter {
            status: Some(cb_core::TaskStatus::Pending),
            order_by: TaskOrderBy::Priority,
            order: TaskOrder::Asc,
            ..Default::default()
        })
        .await
        .expect("list succeeds");
    assert_eq!(pending_only.total_count, 1);
    assert_eq!(pending_only.tasks[0].text, "low");
}

#[tokio::test]
async fn list_respects_limit_and_reports_has_more() {
    let svc = service();
    for i in 0..3 {
        svc.create(&format!("t{i}"), 50, serde_json::Value::Null).await.expect("create succeeds");
    }
    let page = svc.list(&TaskListFilter { limit: 2, ..Default::default() }).await.expect("list succeeds");
    assert_eq!(page.tasks.len(), 2);
    assert_eq!(page.total_count, 3);
    assert!(page.has_more);
}

#[tokio::test]
async fn delete_removes_task_from_list_index() {
    let svc = service();
    let created = svc.create("do it", 50, serde_json::Value::Null).await.expect("create succeeds");
    svc.delete(&created.id).await.expect("delete succeeds");
    let page = svc.list(&TaskListFilter::default()).await.expect("list succeeds");
    assert_eq!(page.total_count, 0);
}

#[tokio::test]
async fn auto_assign_at_capacity_fails() {
    let svc = service();
    svc.create("do it", 50, serde_json::Value::Null).await.expect("create succeeds");
    svc.create("do it too", 50, serde_json::Value::Null).await.expect("create succeeds");
    svc.auto_assign("w1", 1).await.expect("first auto_assign succeeds");
    let err = svc.auto_assign("w1", 1).await.expect_err("capacity is exhausted");
    assert!(matches!(err, TaskError::AtCapacity));
}
