//! Persistence contracts consumed by the availability service.
//!
//! The engine only reads: a business's encoded rules and the busy slots
//! already booked inside a window. [`MemoryStore`] implements both, along
//! with the write side a booking API would use, and backs the CLI and tests.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::interval::Interval;

pub type BusinessId = String;
pub type OwnerId = String;
pub type RuleId = u64;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid busy slot: {0}")]
    InvalidSlot(Interval),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// A concrete booked range, owned by the client who booked it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusySlot {
    pub owner: OwnerId,
    #[serde(flatten)]
    pub interval: Interval,
}

/// A persisted rule and the id the store assigned to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRule {
    pub id: RuleId,
    pub rule: String,
}

pub trait RuleStore {
    /// Every encoded tagged rule of `business`; empty if it has none.
    fn business_rules(&self, business: &str) -> Result<Vec<String>, StoreError>;
}

pub trait BusySlotStore {
    /// Busy slots of `business` intersecting `window`, ordered by start.
    fn busy_slots_in_range(
        &self,
        business: &str,
        window: &Interval,
    ) -> Result<Vec<BusySlot>, StoreError>;
}

impl<S: RuleStore + ?Sized> RuleStore for &S {
    fn business_rules(&self, business: &str) -> Result<Vec<String>, StoreError> {
        (**self).business_rules(business)
    }
}

impl<S: BusySlotStore + ?Sized> BusySlotStore for &S {
    fn busy_slots_in_range(
        &self,
        business: &str,
        window: &Interval,
    ) -> Result<Vec<BusySlot>, StoreError> {
        (**self).busy_slots_in_range(business, window)
    }
}

/// In-process store keyed by business.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rules: HashMap<BusinessId, Vec<StoredRule>>,
    busy: HashMap<BusinessId, Vec<BusySlot>>,
    next_rule_id: RuleId,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Persist an encoded rule as-is and return its id.
    pub fn add_rule(&mut self, business: &str, rule: impl Into<String>) -> RuleId {
        self.next_rule_id += 1;
        let id = self.next_rule_id;
        self.rules
            .entry(business.to_string())
            .or_default()
            .push(StoredRule {
                id,
                rule: rule.into(),
            });
        id
    }

    pub fn rules(&self, business: &str) -> Vec<StoredRule> {
        self.rules.get(business).cloned().unwrap_or_default()
    }

    pub fn remove_rule(&mut self, business: &str, id: RuleId) -> Result<(), StoreError> {
        let rules = self
            .rules
            .get_mut(business)
            .ok_or_else(|| StoreError::NotFound(format!("business {}", business)))?;
        let before = rules.len();
        rules.retain(|stored| stored.id != id);
        if rules.len() == before {
            return Err(StoreError::NotFound(format!("rule {}", id)));
        }
        Ok(())
    }

    /// Record bookings for `owner`. Overlap checks belong to the caller.
    ///
    /// The batch is rejected as a whole if any slot is empty or inverted.
    pub fn add_busy_slots(
        &mut self,
        business: &str,
        owner: &str,
        slots: &[Interval],
    ) -> Result<(), StoreError> {
        if let Some(invalid) = slots.iter().find(|slot| !slot.is_valid()) {
            return Err(StoreError::InvalidSlot(*invalid));
        }
        let busy = self.busy.entry(business.to_string()).or_default();
        busy.extend(slots.iter().map(|interval| BusySlot {
            owner: owner.to_string(),
            interval: *interval,
        }));
        busy.sort_by_key(|slot| (slot.interval.start, slot.interval.end));
        Ok(())
    }

    /// Drop every slot of `owner` that starts inside `window`; returns how many.
    pub fn delete_busy_slots(&mut self, business: &str, owner: &str, window: &Interval) -> usize {
        let Some(busy) = self.busy.get_mut(business) else {
            return 0;
        };
        let before = busy.len();
        busy.retain(|slot| {
            !(slot.owner == owner
                && slot.interval.start >= window.start
                && slot.interval.start < window.end)
        });
        before - busy.len()
    }
}

impl RuleStore for MemoryStore {
    fn business_rules(&self, business: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .rules
            .get(business)
            .map(|rules| rules.iter().map(|stored| stored.rule.clone()).collect())
            .unwrap_or_default())
    }
}

impl BusySlotStore for MemoryStore {
    fn busy_slots_in_range(
        &self,
        business: &str,
        window: &Interval,
    ) -> Result<Vec<BusySlot>, StoreError> {
        Ok(self
            .busy
            .get(business)
            .map(|busy| {
                busy.iter()
                    .filter(|slot| slot.interval.is_overlap(window))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}
