use super::*;

#[test]
fn fake_clock_advances_by_duration() {
    let clock = FakeClock::new();
    let start = clock.epoch_ms();
    clock.advance(Duration::from_millis(250));
    assert_eq!(clock.epoch_ms(), start + 250);
}

#[test]
fn fake_clock_set_epoch_ms_overrides_value() {
    let clock = FakeClock::new();
    clock.set_epoch_ms(42);
    assert_eq!(clock.epoch_ms(), 42);
}

#[test]
fn system_clock_is_monotonic_non_decreasing() {
    let clock = SystemClock;
    let a = clock.epoch_ms();
    let b = clock.epoch_ms();
    assert!(b >= a);
}
