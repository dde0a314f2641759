//! Tests for interval sequences: sorting, union-merge, clipping and the
//! set-difference sweep.

use chrono::{DateTime, Duration, TimeZone, Utc};
use slot_engine::{Interval, Intervals};

/// Helper: a timestamp on 2024-10-09.
fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 10, 9, hour, minute, 0).unwrap()
}

/// Helper: an interval between two whole hours on 2024-10-09.
fn hours(start: u32, end: u32) -> Interval {
    Interval::new(at(start, 0), at(end, 0))
}

fn seq(items: &[Interval]) -> Intervals {
    Intervals::from(items.to_vec())
}

// ---------------------------------------------------------------------------
// Sorting and overlap detection
// ---------------------------------------------------------------------------

#[test]
fn sort_by_start_orders_and_breaks_ties_by_end() {
    let mut intervals = seq(&[hours(12, 13), hours(9, 11), hours(9, 10)]);
    assert!(!intervals.is_sorted());

    intervals.sort_by_start();

    assert!(intervals.is_sorted());
    assert_eq!(&*intervals, &[hours(9, 10), hours(9, 11), hours(12, 13)]);
}

#[test]
fn duplicate_intervals_overlap() {
    let mut intervals = seq(&[hours(9, 10), hours(9, 10)]);
    intervals.sort_by_start();
    assert!(intervals.has_overlaps());
}

#[test]
fn consecutive_minutes_do_not_overlap() {
    let base = at(9, 0);
    let mut intervals: Intervals = (0..10)
        .map(|i| Interval::starting_at(base + Duration::minutes(i), Duration::minutes(1)))
        .collect();
    intervals.sort_by_start();
    assert!(!intervals.has_overlaps());

    let first = intervals[0];
    intervals.push(first);
    assert!(!intervals.is_sorted());
    intervals.sort_by_start();
    assert!(intervals.is_sorted());
    assert!(intervals.has_overlaps());
}

#[test]
fn fit_overlap_and_first_overlapped() {
    let intervals = seq(&[hours(9, 12), hours(14, 18)]);

    assert!(intervals.is_fit(&hours(15, 16)));
    assert!(!intervals.is_fit(&hours(11, 15)));
    assert!(intervals.is_overlap(&hours(11, 15)));
    assert!(!intervals.is_overlap(&hours(12, 14)));

    assert_eq!(intervals.first_overlapped(&hours(11, 15)), Some(0));
    assert_eq!(intervals.first_overlapped(&hours(13, 15)), Some(1));
    assert_eq!(intervals.first_overlapped(&hours(12, 14)), None);
}

// ---------------------------------------------------------------------------
// Unite
// ---------------------------------------------------------------------------

#[test]
fn unite_empty_and_single() {
    assert!(Intervals::new().unite().is_empty());
    let single = seq(&[hours(9, 10)]);
    assert_eq!(single.clone().unite(), single);
}

#[test]
fn unite_keeps_disjoint_intervals() {
    let disjoint = seq(&[hours(9, 10), hours(11, 12), hours(13, 14)]);
    assert_eq!(disjoint.clone().unite(), disjoint);
}

#[test]
fn unite_collapses_overlapping_and_touching_runs() {
    let base = at(0, 0);
    let span = |a: i64, b: i64| {
        Interval::new(base + Duration::minutes(a), base + Duration::minutes(b))
    };

    let united = seq(&[span(0, 10), span(5, 15), span(15, 20)]).unite();

    assert_eq!(&*united, &[span(0, 20)]);
}

#[test]
fn unite_merges_chains_and_contained_intervals() {
    let intervals = seq(&[
        Interval::new(at(9, 0), at(11, 0)),
        Interval::new(at(10, 30), at(12, 1)),
        Interval::new(at(12, 0), at(13, 0)),
        Interval::new(at(15, 0), at(18, 0)),
        Interval::new(at(16, 0), at(17, 0)),
    ]);

    let united = intervals.unite();

    assert_eq!(&*united, &[hours(9, 13), hours(15, 18)]);
}

#[test]
fn prepare_united_sorts_first() {
    let united = seq(&[hours(15, 16), hours(9, 12), hours(11, 13)]).prepare_united();
    assert_eq!(&*united, &[hours(9, 13), hours(15, 16)]);
    assert!(!united.has_overlaps());
}

// ---------------------------------------------------------------------------
// UnitedBetween
// ---------------------------------------------------------------------------

#[test]
fn united_between_clips_to_window() {
    let intervals = seq(&[hours(8, 10), hours(11, 12), hours(13, 17), hours(18, 19)]);

    let clipped = intervals.united_between(&hours(9, 14));

    assert_eq!(&*clipped, &[hours(9, 10), hours(11, 12), hours(13, 14)]);
}

#[test]
fn united_between_drops_touching_pieces() {
    let intervals = seq(&[hours(8, 9), hours(14, 15)]);
    assert!(intervals.united_between(&hours(9, 14)).is_empty());
}

#[test]
fn united_between_invalid_restriction_is_empty() {
    let intervals = seq(&[hours(8, 18)]);
    assert!(intervals.united_between(&hours(12, 12)).is_empty());
    assert!(intervals.united_between(&hours(14, 12)).is_empty());
    assert!(Intervals::new().united_between(&hours(8, 18)).is_empty());
}

// ---------------------------------------------------------------------------
// PassedIntervals
// ---------------------------------------------------------------------------

#[test]
fn lunch_break_splits_working_day() {
    let free = seq(&[hours(9, 18)]).passed_intervals(&[hours(12, 13)]);
    assert_eq!(&*free, &[hours(9, 12), hours(13, 18)]);
}

#[test]
fn exclusion_trimming_trailing_edge() {
    let free = seq(&[hours(9, 18)]).passed_intervals(&[hours(12, 18)]);
    assert_eq!(&*free, &[hours(9, 12)]);
}

#[test]
fn covering_exclusion_removes_everything() {
    let free = seq(&[hours(9, 18)]).passed_intervals(&[hours(8, 18)]);
    assert!(free.is_empty());
}

#[test]
fn empty_availability_stays_empty() {
    let free = Intervals::new().passed_intervals(&[hours(8, 18)]);
    assert!(free.is_empty());
}

#[test]
fn no_exclusions_returns_input() {
    let availability = seq(&[hours(9, 12), hours(13, 18)]);
    assert_eq!(availability.passed_intervals(&[]), availability);
}

#[test]
fn several_exclusions_across_several_intervals() {
    let availability = seq(&[hours(9, 18), hours(20, 21)]);
    let exclusions = [hours(10, 11), hours(13, 14), hours(15, 16)];

    let free = availability.passed_intervals(&exclusions);

    assert_eq!(
        &*free,
        &[
            hours(9, 10),
            hours(11, 13),
            hours(14, 15),
            hours(16, 18),
            hours(20, 21),
        ]
    );
}

#[test]
fn exclusion_spanning_two_intervals() {
    let availability = seq(&[hours(9, 12), hours(13, 17)]);

    let free = availability.passed_intervals(&[hours(11, 14)]);

    assert_eq!(&*free, &[hours(9, 11), hours(14, 17)]);
}

#[test]
fn exclusions_before_and_after_are_ignored() {
    let availability = seq(&[hours(10, 12)]);

    let free = availability.passed_intervals(&[hours(7, 8), hours(8, 10), hours(12, 13)]);

    assert_eq!(&*free, &[hours(10, 12)]);
}

#[test]
fn leading_trim_then_interior_cut() {
    let availability = seq(&[hours(9, 18)]);

    let free = availability.passed_intervals(&[hours(8, 10), hours(12, 13), hours(17, 19)]);

    assert_eq!(&*free, &[hours(10, 12), hours(13, 17)]);
}

#[test]
fn passed_intervals_conserves_duration() {
    let availability = seq(&[hours(9, 18), hours(20, 21)]);
    let exclusions = seq(&[hours(10, 11), hours(13, 14), hours(17, 20)]);

    let free = availability.passed_intervals(&exclusions);

    let removed: Duration = availability
        .iter()
        .flat_map(|a| exclusions.iter().map(move |e| a.intersection(e).duration()))
        .fold(Duration::zero(), |acc, d| acc + d);
    assert_eq!(free.total_duration() + removed, availability.total_duration());
}

#[test]
fn serializes_as_plain_array() {
    let intervals = seq(&[hours(9, 10)]);
    let json = serde_json::to_value(&intervals).unwrap();
    assert!(json.is_array());
    assert_eq!(json[0]["start"], "2024-10-09T09:00:00Z");
    assert_eq!(json[0]["end"], "2024-10-09T10:00:00Z");
}
