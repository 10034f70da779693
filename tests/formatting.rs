use std::time::Duration;

use infiltrator::formatter::{get_tick_count, increment_tick, set_session, SessionStamp};
use pretty_assertions::assert_eq;
use speculoos::prelude::*;

#[test]
fn test_tick_counter_increments() {
    let before = get_tick_count();
    for _ in 0..3 {
        increment_tick();
    }
    assert_that(&get_tick_count()).is_greater_than_or_equal_to(before + 3);
}

#[test]
fn test_stamp_without_level() {
    let stamp = SessionStamp {
        tick: 0x1_002A,
        level: None,
        elapsed: Duration::ZERO,
    };
    assert_eq!(stamp.to_string(), "0x002A");
}

#[test]
fn test_stamp_with_level_and_clock() {
    let stamp = SessionStamp {
        tick: 255,
        level: Some(2),
        elapsed: Duration::from_millis(12_345),
    };
    assert_eq!(stamp.to_string(), "0x00FF L3 +12.345s");
}

#[test]
fn test_set_session_is_reflected_in_current_stamp() {
    set_session(1, Duration::from_millis(1_500));
    let stamp = SessionStamp::current();

    assert_eq!(stamp.level, Some(1));
    assert_eq!(stamp.elapsed, Duration::from_millis(1_500));
}
