use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{AdvanceId, CustomerId, MandateId};

/// all events that can be emitted while billing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // ledger events
    AdvanceTracked {
        advance_id: AdvanceId,
        customer_id: CustomerId,
        amount_owed: Money,
        timestamp: DateTime<Utc>,
    },
    AdvancePaidOff {
        advance_id: AdvanceId,
        today: NaiveDate,
        timestamp: DateTime<Utc>,
    },
    BillingCompleteFailed {
        advance_id: AdvanceId,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    // charge events
    ChargePosted {
        advance_id: AdvanceId,
        mandate_id: MandateId,
        amount: Money,
        remaining_balance: Option<Money>,
        today: NaiveDate,
        timestamp: DateTime<Utc>,
    },
    ChargeFailed {
        advance_id: AdvanceId,
        mandate_id: MandateId,
        amount: Money,
        reason: String,
        today: NaiveDate,
        timestamp: DateTime<Utc>,
    },

    // missed payment events
    RevenueUnavailable {
        advance_id: AdvanceId,
        customer_id: CustomerId,
        charge_date: NaiveDate,
        timestamp: DateTime<Utc>,
    },
    MissedPaymentQueued {
        advance_id: AdvanceId,
        customer_id: CustomerId,
        attempt_date: NaiveDate,
        timestamp: DateTime<Utc>,
    },
    MissedPaymentCleared {
        advance_id: AdvanceId,
        customer_id: CustomerId,
        attempt_date: NaiveDate,
        timestamp: DateTime<Utc>,
    },

    // failures
    AdvanceFailed {
        advance_id: AdvanceId,
        today: NaiveDate,
        reason: String,
        timestamp: DateTime<Utc>,
    },
    DayAbandoned {
        today: NaiveDate,
        reason: String,
        timestamp: DateTime<Utc>,
    },
}

impl Event {
    /// advance the event concerns, if any
    pub fn advance_id(&self) -> Option<AdvanceId> {
        match self {
            Event::AdvanceTracked { advance_id, .. }
            | Event::AdvancePaidOff { advance_id, .. }
            | Event::BillingCompleteFailed { advance_id, .. }
            | Event::ChargePosted { advance_id, .. }
            | Event::ChargeFailed { advance_id, .. }
            | Event::RevenueUnavailable { advance_id, .. }
            | Event::MissedPaymentQueued { advance_id, .. }
            | Event::MissedPaymentCleared { advance_id, .. }
            | Event::AdvanceFailed { advance_id, .. } => Some(*advance_id),
            Event::DayAbandoned { .. } => None,
        }
    }
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_events_drains_store() {
        let mut store = EventStore::new();
        let now = Utc::now();
        store.emit(Event::AdvancePaidOff {
            advance_id: 4,
            today: NaiveDate::from_ymd_opt(2022, 1, 10).unwrap(),
            timestamp: now,
        });
        store.emit(Event::DayAbandoned {
            today: NaiveDate::from_ymd_opt(2022, 1, 11).unwrap(),
            reason: "503 - Service Unavailable".to_string(),
            timestamp: now,
        });

        assert_eq!(store.events().len(), 2);
        assert_eq!(store.events()[0].advance_id(), Some(4));
        assert_eq!(store.events()[1].advance_id(), None);

        let taken = store.take_events();
        assert_eq!(taken.len(), 2);
        assert!(store.events().is_empty());
    }
}
