//! Error types for slot-engine operations.

use thiserror::Error;

use crate::booking::BookingError;
use crate::interval::Interval;
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid RRULE: {0}")]
    InvalidRule(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Recurrence is unbounded: COUNT or UNTIL is required")]
    UnboundedRule,

    #[error("Recurrence expands to more than {limit} occurrences")]
    OccurrenceLimit { limit: u16 },

    #[error("Recurrence spans more than {limit_days} days")]
    SpanLimit { limit_days: i64 },

    #[error("Invalid interval: {0}")]
    InvalidInterval(Interval),

    #[error("Union intervals overlap")]
    OverlappingUnion,

    #[error("Exclusion intervals overlap")]
    OverlappingExclusion,

    #[error("Interval {0} overlaps the existing union")]
    UnionConflict(Interval),

    #[error("Failed to decode rule: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Booking(#[from] BookingError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, EngineError>;
