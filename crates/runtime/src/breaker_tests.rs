use super::*;

const EVENT: &str = "task.create";

#[test]
fn closed_breaker_admits_every_call() {
    let mut table = BreakerTable::new();
    assert!(table.admit(EVENT, 3, Duration::from_millis(1000), 0).is_ok());
    assert_eq!(table.state(EVENT), BreakerState::Closed);
}

#[test]
fn threshold_failures_open_the_breaker() {
    let mut table = BreakerTable::new();
    for _ in 0..3 {
        table.admit(EVENT, 3, Duration::from_millis(1000), 0).expect("closed breaker admits");
        table.record_failure(EVENT, 3, 0);
    }
    assert_eq!(table.state(EVENT), BreakerState::Open);
    assert!(table.admit(EVENT, 3, Duration::from_millis(1000), 0).is_err());
}

#[test]
fn reset_window_allows_one_half_open_probe() {
    let mut table = BreakerTable::new();
    for _ in 0..3 {
        table.admit(EVENT, 3, Duration::from_millis(1000), 0).expect("closed breaker admits");
        table.record_failure(EVENT, 3, 0);
    }
    assert!(table.admit(EVENT, 3, Duration::from_millis(1000), 500).is_err());
    assert!(table.admit(EVENT, 3, Duration::from_millis(1000), 1500).is_ok());
    assert_eq!(table.state(EVENT), BreakerState::HalfOpen);
    // A second caller during the same probe window is refused.
    assert!(table.admit(EVENT, 3, Duration::from_millis(1000), 1500).is_err());
}

#[test]
fn successful_probe_closes_the_breaker() {
    let mut table = BreakerTable::new();
    for _ in 0..3 {
        table.admit(EVENT, 3, Duration::from_millis(1000), 0).expect("closed breaker admits");
        table.record_failure(EVENT, 3, 0);
    }
    table.admit(EVENT, 3, Duration::from_millis(1000), 1500).expect("reset window opens a probe");
    table.record_success(EVENT);
    assert_eq!(table.state(EVENT), BreakerState::Closed);
    assert!(table.admit(EVENT, 3, Duration::from_millis(1000), 1600).is_ok());
}

#[test]
fn failed_probe_reopens_the_breaker() {
    let mut table = BreakerTable::new();
    for _ in 0..3 {
        table.admit(EVENT, 3, Duration::from_millis(1000), 0).expect("closed breaker admits");
        table.record_failure(EVENT, 3, 0);
    }
    table.admit(EVENT, 3, Duration::from_millis(1000), 1500).expect("reset window opens a probe");
    table.record_failure(EVENT, 3, 1500);
    assert_eq!(table.state(EVENT), BreakerState::Open);
    assert!(table.admit(EVENT, 3, Duration::from_millis(1000), 1600).is_err());
}

#[test]
fn zero_threshold_disables_the_breaker() {
    let mut table = BreakerTable::new();
    for _ in 0..10 {
        table.admit(EVENT, 0, Duration::from_millis(1000), 0).expect("disabled breaker always admits");
        table.record_failure(EVENT, 0, 0);
    }
    assert_eq!(table.state(EVENT), BreakerState::Closed);
}
