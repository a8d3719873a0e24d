use super::*;
use crate::clock::FakeClock;

#[test]
fn task_id_is_t_dash_epoch_ms() {
    let clock = FakeClock::new();
    clock.set_epoch_ms(1_700_000_000_123);
    let id = TaskId::generate(&clock);
    assert_eq!(id.as_str(), "t-1700000000123");
}

#[test]
fn event_id_is_evt_dash_ms_dash_rand() {
    let clock = FakeClock::new();
    clock.set_epoch_ms(42);
    let id = EventId::generate(&clock);
    assert!(id.as_str().starts_with("evt-42-"));
    let suffix = id.as_str().strip_prefix("evt-42-").unwrap();
    assert_eq!(suffix.len(), 8);
}

#[test]
fn instance_id_round_trips_from_string() {
    let id = InstanceId::from("worker-1");
    assert_eq!(id.as_str(), "worker-1");
    assert_eq!(id, *"worker-1");
}

#[test]
fn snapshot_id_combines_session_and_clock() {
    let clock = FakeClock::new();
    clock.set_epoch_ms(99);
    let sid = SessionId::from("sess-abc");
    let snap = SnapshotId::generate(&sid, &clock);
    assert_eq!(snap.as_str(), "sess-abc-99");
}

#[test]
fn short_truncates_without_panicking_on_short_input() {
    assert_eq!(short("hello", 3), "hel");
    assert_eq!(short("hi", 10), "hi");
}
