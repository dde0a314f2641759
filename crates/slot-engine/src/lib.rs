//! # slot-engine
//!
//! Interval algebra and recurrence expansion for appointment booking.
//!
//! A business declares its availability as recurring inclusion rules
//! (working hours) and exclusion rules (breaks, holidays). The engine expands
//! those rules into concrete intervals, subtracts exclusions and already
//! booked slots, and answers whether a requested booking fits. Every call is
//! synchronous and works on request-local data only.
//!
//! ## Modules
//!
//! - [`interval`]: a half-open `[start, end)` range and its predicates
//! - [`intervals`]: sorted sequences: union-merge, clipping, set difference
//! - [`interval_set`]: validated union/exclusion pair with a fit test
//! - [`recurrence`]: bounded RRULE patterns, tagged rules, serialization
//! - [`calculator`]: inclusions minus exclusions over a set of rules
//! - [`service`]: availability and booking queries over a store
//! - [`booking`]: sanity checks on a batch of candidate slots
//! - [`calendar`]: week-sized query windows
//! - [`store`]: persistence contracts and an in-memory store
//! - [`config`]: TOML configuration
//! - [`error`]: Error types

pub mod booking;
pub mod calculator;
pub mod calendar;
pub mod config;
pub mod error;
pub mod interval;
pub mod interval_set;
pub mod intervals;
pub mod recurrence;
pub mod service;
pub mod store;

pub use booking::BookingError;
pub use calculator::calculate_intervals;
pub use config::Config;
pub use error::EngineError;
pub use interval::Interval;
pub use interval_set::IntervalSet;
pub use intervals::Intervals;
pub use recurrence::{
    Bound, ExpansionLimits, Frequency, RecurrencePattern, RecurrenceRule, RuleKind, TaggedRule,
};
pub use service::AvailabilityService;
pub use store::{BusySlot, BusySlotStore, MemoryStore, RuleStore, StoreError};
