use super::*;
use cb_core::test_support::fixed_clock;
use cb_core::EventId;
use cb_store::fake::FakeStore;

fn service(snapshot_every_n: u64) -> SessionService<FakeStore, cb_core::FakeClock> {
    let clock = fixed_clock();
    SessionService::new(FakeStore::new(clock.clone()), clock, snapshot_every_n)
}

fn hook_event(sid: &str, hook: &str, payload: Value) -> Event {
    let clock = fixed_clock();
    let mut merged = payload;
    merged["sessionId"] = Value::String(sid.to_string());
    Event::new(EventId::generate(&clock), format!("hook.{hook}.executed"), merged, clock.epoch_ms())
}

#[tokio::test]
async fn fold_event_appends_stream_and_counters() {
    let svc = service(100);
    let event = hook_event("s1", "user_prompt_submit", json!({"prompt": "hello"}));
    svc.fold_event(&event).await.expect("fold succeeds");

    let context = svc.get_context("s1").await.expect("get_context succeeds");
    assert_eq!(context["context"]["lastPrompt"], "hello");
    assert_eq!(context["eventCount"], 1);
}

#[tokio::test]
async fn fold_event_rejects_missing_session_id() {
    let svc = service(100);
    let clock = fixed_clock();
    let event = Event::new(EventId::generate(&clock), "hook.pre_tool_use.executed", json!({}), clock.epoch_ms());
    let err = svc.fold_event(&event).await.expect_err("missing sessionId fails");
    assert!(matches!(err, SessionError::MissingSessionId));
}

#[tokio::test]
async fn snapshot_is_written_every_nth_event_and_served_thereafter() {
    let svc = service(3);
    for i in 0..3 {
        let event = hook_event("s1", "post_tool_use", json!({"toolName": format!("tool-{i}")}));
        svc.fold_event(&event).await.expect("fold succeeds");
    }

    let context = svc.get_context("s1").await.expect("get_context succeeds");
    assert_eq!(context["eventCount"], 3);
    assert_eq!(context["context"]["lastTools"][0], "tool-2");
}

#[tokio::test]
async fn get_context_without_any_events_folds_an_empty_stream() {
    let svc = service(100);
    let context = svc.get_context("ghost").await.expect("get_context succeeds on an unseen session");
    assert_eq!(context["eventCount"], 0);
}

#[tokio::test]
async fn rolling_tools_and_todos_fold_independently() {
    let svc = service(100);
    svc.fold_event(&hook_event("s1", "post_tool_use", json!({"toolName": "Bash"}))).await.expect("fold succeeds");
    svc.fold_event(&hook_event("s1", "todo_write", json!({"todos": [{"id": 1, "status": "pending"}]}))).await.expect("fold succeeds");

    let context = svc.get_context("s1").await.expect("get_context succeeds");
    assert_eq!(context["context"]["lastTools"][0], "Bash");
    assert_eq!(context["context"]["activeTodos"][0]["id"], 1);
}
