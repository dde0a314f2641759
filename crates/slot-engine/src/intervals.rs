//! Ordered sequences of intervals: sorting, union-merge and set difference.
//!
//! Most operations assume the sequence is sorted by start, and the set
//! operations additionally assume it is "united" (pairwise disjoint).
//! [`Intervals::sort_by_start`] and [`Intervals::unite`] establish those
//! invariants; [`Intervals::prepare_united`] does both.

use std::ops::Deref;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::interval::Interval;

/// An ordered list of [`Interval`]s.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Intervals(Vec<Interval>);

impl Intervals {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, interval: Interval) {
        self.0.push(interval);
    }

    /// Sort ascending by start; equal starts are ordered by end.
    pub fn sort_by_start(&mut self) {
        self.0.sort_by_key(|interval| (interval.start, interval.end));
    }

    pub fn is_sorted(&self) -> bool {
        self.0.windows(2).all(|pair| pair[0].start <= pair[1].start)
    }

    /// Whether any two intervals overlap.
    ///
    /// Expects a sorted sequence: then an overlap anywhere implies an overlap
    /// between neighbours, so only adjacent pairs are checked.
    pub fn has_overlaps(&self) -> bool {
        debug_assert!(self.is_sorted(), "has_overlaps expects a sorted sequence");
        self.0.windows(2).any(|pair| pair[0].is_overlap(&pair[1]))
    }

    /// Merge overlapping and touching runs into maximal disjoint intervals.
    ///
    /// Expects a sorted sequence. Consumes `self` and reuses its storage, so
    /// the result may be shorter than the input.
    pub fn unite(self) -> Self {
        debug_assert!(self.is_sorted(), "unite expects a sorted sequence");
        let mut items = self.0;
        if items.is_empty() {
            return Self(items);
        }

        let mut last = 0;
        for index in 1..items.len() {
            let current = items[index];
            if current.start <= items[last].end {
                if current.end > items[last].end {
                    items[last].end = current.end;
                }
            } else {
                last += 1;
                items[last] = current;
            }
        }
        items.truncate(last + 1);
        Self(items)
    }

    /// Sort, then [`unite`](Self::unite).
    pub fn prepare_united(mut self) -> Self {
        self.sort_by_start();
        self.unite()
    }

    /// Clip every interval to `restriction`, dropping the pieces left empty.
    ///
    /// Returns an empty sequence when `self` is empty or `restriction` is
    /// itself invalid.
    pub fn united_between(&self, restriction: &Interval) -> Intervals {
        if self.0.is_empty() || !restriction.is_valid() {
            return Intervals::new();
        }

        self.0
            .iter()
            .map(|interval| interval.intersection(restriction))
            .filter(Interval::is_valid)
            .collect()
    }

    /// Some interval fully contains `query`.
    pub fn is_fit(&self, query: &Interval) -> bool {
        self.0.iter().any(|interval| interval.is_fit(query))
    }

    /// Some interval overlaps `query`.
    pub fn is_overlap(&self, query: &Interval) -> bool {
        self.0.iter().any(|interval| interval.is_overlap(query))
    }

    /// Index of the first interval overlapping `query`.
    pub fn first_overlapped(&self, query: &Interval) -> Option<usize> {
        self.0.iter().position(|interval| interval.is_overlap(query))
    }

    /// Combined length of every interval in the sequence.
    pub fn total_duration(&self) -> Duration {
        self.0
            .iter()
            .fold(Duration::zero(), |total, interval| total + interval.duration())
    }

    /// Set difference `self - exclusions`, preserving order.
    ///
    /// Both sequences must be sorted and internally disjoint. A single sweep
    /// carries the not-yet-emitted remainder of the current interval and
    /// moves past exclusions once they lie entirely behind it.
    pub fn passed_intervals(&self, exclusions: &[Interval]) -> Intervals {
        if self.0.is_empty() {
            return Intervals::new();
        }
        if exclusions.is_empty() {
            return self.clone();
        }

        let intervals = &self.0;
        let mut out = Vec::with_capacity(intervals.len());
        let mut remainder: Option<Interval> = None;
        let mut next = 0;
        let mut excluded = 0;

        while (next < intervals.len() || remainder.is_some()) && excluded < exclusions.len() {
            let current = match remainder.take() {
                Some(current) => current,
                None => {
                    next += 1;
                    intervals[next - 1]
                }
            };
            let exclusion = &exclusions[excluded];

            if current.before(exclusion) {
                // Later exclusions start even later, so `current` is final.
                out.push(current);
            } else if exclusion.before(&current) {
                excluded += 1;
                remainder = Some(current);
            } else {
                match current.subtract(exclusion).as_slice() {
                    [] => {}
                    [piece] if piece.before(exclusion) => out.push(*piece),
                    [piece] => remainder = Some(*piece),
                    [head, tail] => {
                        out.push(*head);
                        remainder = Some(*tail);
                    }
                    _ => unreachable!("subtracting one interval leaves at most two pieces"),
                }
            }
        }

        if let Some(current) = remainder {
            out.push(current);
        }
        out.extend_from_slice(&intervals[next..]);

        tracing::trace!(
            input = intervals.len(),
            exclusions = exclusions.len(),
            output = out.len(),
            "passed intervals computed"
        );
        Intervals(out)
    }
}

impl Deref for Intervals {
    type Target = [Interval];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<Interval>> for Intervals {
    fn from(intervals: Vec<Interval>) -> Self {
        Self(intervals)
    }
}

impl From<Intervals> for Vec<Interval> {
    fn from(intervals: Intervals) -> Self {
        intervals.0
    }
}

impl FromIterator<Interval> for Intervals {
    fn from_iter<I: IntoIterator<Item = Interval>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<Interval> for Intervals {
    fn extend<I: IntoIterator<Item = Interval>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl IntoIterator for Intervals {
    type Item = Interval;
    type IntoIter = std::vec::IntoIter<Interval>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Intervals {
    type Item = &'a Interval;
    type IntoIter = std::slice::Iter<'a, Interval>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
