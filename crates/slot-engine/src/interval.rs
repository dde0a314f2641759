//! A single half-open time range `[start, end)` and its pairwise predicates.
//!
//! Touching intervals (`a.end == b.start`) never overlap. Every predicate is
//! pure; none of them validate their inputs, so callers check
//! [`Interval::is_valid`] where it matters.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// A half-open time range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Interval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Build an interval, rejecting empty or inverted ranges.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidInterval` unless `start < end`.
    pub fn try_new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        let interval = Self { start, end };
        if interval.is_valid() {
            Ok(interval)
        } else {
            Err(EngineError::InvalidInterval(interval))
        }
    }

    /// An interval of the given length starting at `start`.
    pub fn starting_at(start: DateTime<Utc>, length: Duration) -> Self {
        Self {
            start,
            end: start + length,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.start < self.end
    }

    /// Strict overlap: intervals sharing only a boundary do not overlap.
    pub fn is_overlap(&self, other: &Interval) -> bool {
        self.start < other.end && self.end > other.start
    }

    /// `self` ends at or before `other` begins.
    pub fn before(&self, other: &Interval) -> bool {
        self.end <= other.start
    }

    /// `self` fully contains `other`.
    pub fn is_fit(&self, other: &Interval) -> bool {
        self.start <= other.start && self.end >= other.end
    }

    /// Clamp `self` to the part shared with `other`.
    ///
    /// The result is only valid when the two intervals overlap.
    pub fn intersection(&self, other: &Interval) -> Interval {
        Interval {
            start: self.start.max(other.start),
            end: self.end.min(other.end),
        }
    }

    /// Length of the interval, zero for an invalid one.
    pub fn duration(&self) -> Duration {
        if self.is_valid() {
            self.end - self.start
        } else {
            Duration::zero()
        }
    }

    /// Remove `other` from `self`, leaving zero, one or two pieces in order.
    pub fn subtract(&self, other: &Interval) -> Vec<Interval> {
        if !self.is_overlap(other) {
            return vec![*self];
        }

        if other.is_fit(self) {
            return Vec::new();
        }

        if self.start < other.start {
            let head = Interval::new(self.start, other.start);
            if self.end <= other.end {
                vec![head]
            } else {
                vec![head, Interval::new(other.end, self.end)]
            }
        } else {
            vec![Interval::new(other.end, self.end)]
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {})",
            self.start.to_rfc3339(),
            self.end.to_rfc3339()
        )
    }
}
