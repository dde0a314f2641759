//! Tests for single-interval predicates and subtraction.

use chrono::{DateTime, Duration, TimeZone, Utc};
use slot_engine::Interval;

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2020, 1, 1, 10, 0, 0).unwrap()
}

fn minutes(offset_start: i64, offset_end: i64) -> Interval {
    Interval::new(
        start() + Duration::minutes(offset_start),
        start() + Duration::minutes(offset_end),
    )
}

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

#[test]
fn interval_overlaps_and_fits_itself() {
    let hour = minutes(0, 60);
    assert!(hour.is_overlap(&hour));
    assert!(hour.is_fit(&hour));
}

#[test]
fn touching_intervals_do_not_overlap() {
    let hour = minutes(0, 60);
    let next = Interval::new(hour.end, hour.end + Duration::seconds(1));

    assert!(!hour.is_overlap(&next));
    assert!(!next.is_overlap(&hour));
    assert!(!hour.is_fit(&next));
    assert!(hour.before(&next));
    assert!(!next.before(&hour));
}

#[test]
fn partial_overlap_is_not_fit() {
    let hour = minutes(0, 60);
    let straddling = Interval::new(hour.end - Duration::seconds(1), hour.end + Duration::seconds(1));

    assert!(hour.is_overlap(&straddling));
    assert!(!hour.is_fit(&straddling));
    assert!(!hour.before(&straddling));
}

#[test]
fn containment_is_one_directional() {
    let outer = minutes(0, 60);
    let inner = Interval::new(
        outer.start + Duration::seconds(1),
        outer.end - Duration::seconds(1),
    );

    assert!(outer.is_fit(&inner));
    assert!(!inner.is_fit(&outer));
    assert!(outer.is_overlap(&inner));
    assert!(inner.is_overlap(&outer));
}

#[test]
fn validity_is_strict() {
    assert!(minutes(0, 1).is_valid());
    assert!(!minutes(0, 0).is_valid());
    assert!(!minutes(5, 0).is_valid());
}

#[test]
fn try_new_rejects_empty_interval() {
    assert!(Interval::try_new(start(), start()).is_err());
    assert!(Interval::try_new(start(), start() + Duration::minutes(1)).is_ok());
}

#[test]
fn duration_of_invalid_interval_is_zero() {
    assert_eq!(minutes(0, 90).duration(), Duration::minutes(90));
    assert_eq!(minutes(30, 0).duration(), Duration::zero());
}

#[test]
fn intersection_clamps_to_shared_part() {
    let a = minutes(0, 60);
    let b = minutes(30, 90);
    assert_eq!(a.intersection(&b), minutes(30, 60));
    assert_eq!(b.intersection(&a), minutes(30, 60));

    // Disjoint intervals give an invalid intersection.
    assert!(!a.intersection(&minutes(60, 90)).is_valid());
}

// ---------------------------------------------------------------------------
// Subtraction
// ---------------------------------------------------------------------------

#[test]
fn subtract_self_is_empty() {
    let hour = minutes(0, 60);
    assert!(hour.subtract(&hour).is_empty());
}

#[test]
fn subtract_trailing_part() {
    let hour = minutes(0, 60);
    assert_eq!(hour.subtract(&minutes(30, 60)), vec![minutes(0, 30)]);
    assert_eq!(hour.subtract(&minutes(31, 61)), vec![minutes(0, 31)]);
}

#[test]
fn subtract_leading_part() {
    let hour = minutes(0, 60);
    assert_eq!(hour.subtract(&minutes(0, 30)), vec![minutes(30, 60)]);
    assert_eq!(hour.subtract(&minutes(-1, 31)), vec![minutes(31, 60)]);
}

#[test]
fn subtract_interior_part_splits() {
    let hour = minutes(0, 60);
    assert_eq!(
        hour.subtract(&minutes(10, 50)),
        vec![minutes(0, 10), minutes(50, 60)]
    );
}

#[test]
fn subtract_disjoint_is_noop() {
    let hour = minutes(0, 60);
    assert_eq!(hour.subtract(&minutes(60, 120)), vec![hour]);
    assert_eq!(hour.subtract(&minutes(-60, -1)), vec![hour]);
}

#[test]
fn subtract_covering_interval_is_empty() {
    let hour = minutes(0, 60);
    assert!(hour.subtract(&minutes(-10, 70)).is_empty());
}

#[test]
fn display_is_half_open_rfc3339() {
    let hour = minutes(0, 60);
    assert_eq!(
        hour.to_string(),
        "[2020-01-01T10:00:00+00:00, 2020-01-01T11:00:00+00:00)"
    );
}
