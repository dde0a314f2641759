//! Availability orchestration: rules and bookings in, free windows out.
//!
//! Each query decodes the business's rules afresh, expands them, clips the
//! result to the query window and only then subtracts the busy slots the
//! store reports for that window. Nothing survives between calls.

use chrono::{DateTime, Utc};

use crate::booking::{self, BookingError};
use crate::calculator::calculate_intervals;
use crate::config::Config;
use crate::error::{EngineError, Result};
use crate::interval::Interval;
use crate::interval_set::IntervalSet;
use crate::intervals::Intervals;
use crate::recurrence::{ExpansionLimits, TaggedRule};
use crate::store::{BusySlotStore, RuleStore};

/// Decode every persisted rule, applying `limits` to each.
///
/// # Errors
/// All-or-nothing: the first undecodable rule fails the whole batch.
pub fn decode_rules(encoded: &[String], limits: ExpansionLimits) -> Result<Vec<TaggedRule>> {
    encoded
        .iter()
        .map(|raw| {
            TaggedRule::decode(raw).map(|mut tagged| {
                tagged.rule = tagged.rule.with_limits(limits);
                tagged
            })
        })
        .collect()
}

/// Answers availability and booking-fit queries on top of a store.
#[derive(Debug)]
pub struct AvailabilityService<S> {
    store: S,
    limits: ExpansionLimits,
    reject_past: bool,
}

impl<S> AvailabilityService<S>
where
    S: RuleStore + BusySlotStore,
{
    pub fn new(store: S) -> Self {
        Self::with_config(store, &Config::default())
    }

    pub fn with_config(store: S, config: &Config) -> Self {
        Self {
            store,
            limits: config.expansion_limits(),
            reject_past: config.booking.reject_past,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Clipped availability of `business` paired with its busy slots in `window`.
    ///
    /// When no availability falls inside the window the busy slots are not
    /// loaded and the exclusion side is empty.
    ///
    /// # Errors
    /// An empty or inverted busy slot from the store fails the query with
    /// `EngineError::InvalidInterval`.
    pub fn availability_set(&self, business: &str, window: &Interval) -> Result<IntervalSet> {
        let encoded = self.store.business_rules(business)?;
        let rules = decode_rules(&encoded, self.limits)?;

        let available = calculate_intervals(&rules)?.united_between(window);
        if available.is_empty() {
            tracing::debug!(business, %window, "no declared availability in window");
            return Ok(IntervalSet::default());
        }

        let busy: Intervals = self
            .store
            .busy_slots_in_range(business, window)?
            .into_iter()
            .map(|slot| slot.interval)
            .collect();
        if let Some(invalid) = busy.iter().find(|slot| !slot.is_valid()) {
            tracing::warn!(business, slot = %invalid, "store returned an invalid busy slot");
            return Err(EngineError::InvalidInterval(*invalid));
        }
        let busy = busy.prepare_united();

        IntervalSet::new(&available, &busy)
    }

    /// Free, bookable intervals of `business` inside `window`, ordered by start.
    pub fn available_slots_in_range(&self, business: &str, window: &Interval) -> Result<Intervals> {
        let free = self.availability_set(business, window)?.passed_intervals();
        tracing::info!(business, %window, slots = free.len(), "computed available slots");
        Ok(free)
    }

    /// Whether `candidate` could be booked right now.
    pub fn is_fit(&self, business: &str, candidate: &Interval) -> Result<bool> {
        if !candidate.is_valid() {
            return Ok(false);
        }
        Ok(self.availability_set(business, candidate)?.is_fit(candidate))
    }

    /// Validate a batch of candidate slots against current availability.
    ///
    /// Returns the accepted candidates, sorted, for the caller to persist.
    ///
    /// # Errors
    /// Returns `EngineError::Booking` when the batch is rejected, or any
    /// decode, expansion or store error met while computing availability.
    pub fn check_booking(
        &self,
        business: &str,
        candidates: Vec<Interval>,
        now: DateTime<Utc>,
    ) -> Result<Intervals> {
        let not_before = self.reject_past.then_some(now);
        let prepared = booking::prepare_candidates(candidates, not_before).inspect_err(|e| {
            tracing::warn!(business, error = %e, "rejected booking request");
        })?;

        let set = self.availability_set(business, &prepared.envelope)?;
        if let Some(slot) = prepared.slots.iter().find(|slot| !set.is_fit(slot)) {
            tracing::warn!(business, %slot, "booking conflicts with availability");
            return Err(BookingError::Unavailable(*slot).into());
        }

        Ok(prepared.slots)
    }
}
