use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;

use crate::types::{Advance, AdvanceId, CustomerId, MissedAdvance};

/// charge attempts waiting for revenue, grouped by customer in the order they were missed
#[derive(Debug, Clone, Default)]
pub struct MissedPaymentRegistry {
    entries: HashMap<CustomerId, Vec<MissedAdvance>>,
}

impl MissedPaymentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// queue a missed attempt; returns false if the advance already has one pending
    ///
    /// Deduplication is by advance, so a later miss keeps the first attempt date.
    pub fn record(&mut self, advance: &Advance, attempt_date: NaiveDate) -> bool {
        let misses = self.entries.entry(advance.customer_id).or_default();
        if misses.iter().any(|m| m.advance.id == advance.id) {
            return false;
        }
        misses.push(MissedAdvance {
            advance: advance.clone(),
            attempt_date,
        });
        true
    }

    /// pending misses for a customer, oldest first
    pub fn pending(&self, customer_id: CustomerId) -> &[MissedAdvance] {
        self.entries
            .get(&customer_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn has_pending(&self, customer_id: CustomerId) -> bool {
        !self.pending(customer_id).is_empty()
    }

    /// drop the pending miss for an advance once it has been charged
    pub fn clear(&mut self, customer_id: CustomerId, advance_id: AdvanceId) -> Option<MissedAdvance> {
        let misses = self.entries.get_mut(&customer_id)?;
        let position = misses.iter().position(|m| m.advance.id == advance_id)?;
        let cleared = misses.remove(position);
        if misses.is_empty() {
            self.entries.remove(&customer_id);
        }
        Some(cleared)
    }

    /// number of pending misses across all customers
    pub fn total_pending(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// ordered copy of every customer's pending misses
    pub fn entries(&self) -> BTreeMap<CustomerId, Vec<MissedAdvance>> {
        self.entries
            .iter()
            .map(|(customer_id, misses)| (*customer_id, misses.clone()))
            .collect()
    }
}
