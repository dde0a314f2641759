//! An availability union paired with the exclusions carved out of it.

use crate::error::{EngineError, Result};
use crate::interval::Interval;
use crate::intervals::Intervals;

/// A validated pair of an availability union and an exclusion collection.
///
/// Every interval on either side is valid. The union is always sorted and
/// pairwise disjoint. Exclusions are sorted; they are disjoint at
/// construction, but [`IntervalSet::add_exclusion`] does not re-check that.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IntervalSet {
    union: Intervals,
    exclusion: Intervals,
}

impl IntervalSet {
    /// Copy and sort both sequences, rejecting internal overlaps on either side.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidInterval` for an empty or inverted
    /// interval, and `EngineError::OverlappingUnion` or
    /// `EngineError::OverlappingExclusion`; no partially built set is returned.
    pub fn new(union: &[Interval], exclusion: &[Interval]) -> Result<Self> {
        if let Some(invalid) = union.iter().chain(exclusion).find(|i| !i.is_valid()) {
            return Err(EngineError::InvalidInterval(*invalid));
        }

        let mut union = Intervals::from(union.to_vec());
        union.sort_by_start();
        if union.has_overlaps() {
            return Err(EngineError::OverlappingUnion);
        }

        let mut exclusion = Intervals::from(exclusion.to_vec());
        exclusion.sort_by_start();
        if exclusion.has_overlaps() {
            return Err(EngineError::OverlappingExclusion);
        }

        Ok(Self { union, exclusion })
    }

    pub fn union(&self) -> &Intervals {
        &self.union
    }

    pub fn exclusion(&self) -> &Intervals {
        &self.exclusion
    }

    /// `query` lies inside one union interval and touches no exclusion.
    pub fn is_fit(&self, query: &Interval) -> bool {
        self.union.is_fit(query) && !self.exclusion.is_overlap(query)
    }

    /// Append an exclusion and keep the exclusions sorted.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidInterval` for an empty or inverted interval.
    pub fn add_exclusion(&mut self, interval: Interval) -> Result<()> {
        if !interval.is_valid() {
            return Err(EngineError::InvalidInterval(interval));
        }
        self.exclusion.push(interval);
        self.exclusion.sort_by_start();
        Ok(())
    }

    /// Append a union interval.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidInterval` for an empty or inverted interval
    /// and `EngineError::UnionConflict` if it overlaps the existing union.
    pub fn add(&mut self, interval: Interval) -> Result<()> {
        if !interval.is_valid() {
            return Err(EngineError::InvalidInterval(interval));
        }
        if self.union.is_overlap(&interval) {
            return Err(EngineError::UnionConflict(interval));
        }
        self.union.push(interval);
        self.union.sort_by_start();
        Ok(())
    }

    /// The union minus every exclusion.
    pub fn passed_intervals(&self) -> Intervals {
        let exclusion = self.exclusion.clone().unite();
        self.union.passed_intervals(&exclusion)
    }
}
