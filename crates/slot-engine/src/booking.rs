//! Validation of a booking request before it is checked against availability.
//!
//! A request is a batch of candidate intervals. [`prepare_candidates`] does
//! the checks that need no availability data and computes the envelope
//! window the service must query to check fit.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::interval::Interval;
use crate::intervals::Intervals;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
    #[error("Booking request has no slots")]
    Empty,

    #[error("Booking slot {0} is empty or inverted")]
    InvalidSlot(Interval),

    #[error("Booking slot {0} starts in the past")]
    InPast(Interval),

    #[error("Booking slots overlap each other")]
    Overlapping,

    #[error("Booking slot {0} is not available")]
    Unavailable(Interval),
}

/// Sorted candidates plus the smallest window covering all of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedBooking {
    pub slots: Intervals,
    pub envelope: Interval,
}

/// Sort and sanity-check candidates.
///
/// `not_before`, when given, rejects candidates starting before it.
pub fn prepare_candidates(
    candidates: Vec<Interval>,
    not_before: Option<DateTime<Utc>>,
) -> Result<PreparedBooking, BookingError> {
    let mut slots = Intervals::from(candidates);
    let mut envelope = *slots.first().ok_or(BookingError::Empty)?;

    for slot in slots.iter() {
        if !slot.is_valid() {
            return Err(BookingError::InvalidSlot(*slot));
        }
        if matches!(not_before, Some(now) if slot.start < now) {
            return Err(BookingError::InPast(*slot));
        }
        envelope.start = envelope.start.min(slot.start);
        envelope.end = envelope.end.max(slot.end);
    }

    slots.sort_by_start();
    if slots.has_overlaps() {
        return Err(BookingError::Overlapping);
    }

    Ok(PreparedBooking { slots, envelope })
}
