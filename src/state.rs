use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::ledger::{BalanceLedger, MissedPaymentRegistry};
use crate::types::{AdvanceId, CustomerId, MissedAdvance};

/// process-lifetime billing state, owned by the orchestrator
#[derive(Debug, Clone, Default)]
pub struct BillingState {
    pub ledger: BalanceLedger,
    pub missed: MissedPaymentRegistry,
}

impl BillingState {
    pub fn new() -> Self {
        Self::default()
    }

    /// capture a serializable view of the current state
    pub fn snapshot(&self, timestamp: DateTime<Utc>) -> BillingSnapshot {
        BillingSnapshot {
            snapshot_id: Uuid::new_v4(),
            timestamp,
            outstanding: self.ledger.outstanding(),
            balances: self.ledger.balances(),
            paid_off: self.ledger.paid_off(),
            missed: self.missed.entries(),
        }
    }
}

/// state snapshot for audit trail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingSnapshot {
    pub snapshot_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub outstanding: Money,
    pub balances: BTreeMap<AdvanceId, Money>,
    pub paid_off: BTreeSet<AdvanceId>,
    pub missed: BTreeMap<CustomerId, Vec<MissedAdvance>>,
}

impl BillingSnapshot {
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
