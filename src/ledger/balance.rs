use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::decimal::Money;
use crate::types::AdvanceId;

/// remaining balance per advance, plus the advances already paid off
///
/// An advance lives in exactly one of the two collections: once settled its
/// balance entry is dropped and it can never be tracked again.
#[derive(Debug, Clone, Default)]
pub struct BalanceLedger {
    balances: HashMap<AdvanceId, Money>,
    paid_off: HashSet<AdvanceId>,
}

impl BalanceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// start tracking an advance; returns false if it is already tracked or paid off
    pub fn track(&mut self, advance_id: AdvanceId, amount_owed: Money) -> bool {
        if self.paid_off.contains(&advance_id) || self.balances.contains_key(&advance_id) {
            return false;
        }
        self.balances.insert(advance_id, amount_owed);
        true
    }

    pub fn is_tracked(&self, advance_id: AdvanceId) -> bool {
        self.balances.contains_key(&advance_id)
    }

    pub fn is_paid_off(&self, advance_id: AdvanceId) -> bool {
        self.paid_off.contains(&advance_id)
    }

    /// remaining balance, if tracked
    pub fn balance(&self, advance_id: AdvanceId) -> Option<Money> {
        self.balances.get(&advance_id).copied()
    }

    /// subtract a posted charge; returns the new balance
    pub fn debit(&mut self, advance_id: AdvanceId, amount: Money) -> Option<Money> {
        let balance = self.balances.get_mut(&advance_id)?;
        *balance -= amount;
        Some(*balance)
    }

    /// move an advance into the paid-off set; returns the final balance it held
    pub fn settle(&mut self, advance_id: AdvanceId) -> Option<Money> {
        self.paid_off.insert(advance_id);
        self.balances.remove(&advance_id)
    }

    pub fn tracked_count(&self) -> usize {
        self.balances.len()
    }

    pub fn paid_off_count(&self) -> usize {
        self.paid_off.len()
    }

    /// total still owed across tracked advances
    pub fn outstanding(&self) -> Money {
        self.balances.values().copied().sum()
    }

    /// ordered copy of the balances
    pub fn balances(&self) -> BTreeMap<AdvanceId, Money> {
        self.balances.iter().map(|(id, b)| (*id, *b)).collect()
    }

    /// ordered copy of the paid-off ids
    pub fn paid_off(&self) -> BTreeSet<AdvanceId> {
        self.paid_off.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_and_debit() {
        let mut ledger = BalanceLedger::new();
        assert!(ledger.track(1, Money::from_major(110)));
        assert!(!ledger.track(1, Money::from_major(999)));
        assert_eq!(ledger.balance(1), Some(Money::from_major(110)));

        assert_eq!(ledger.debit(1, Money::from_major(5)), Some(Money::from_major(105)));
        assert_eq!(ledger.balance(1), Some(Money::from_major(105)));
        assert_eq!(ledger.debit(2, Money::from_major(5)), None);
    }

    #[test]
    fn test_settle_is_terminal() {
        let mut ledger = BalanceLedger::new();
        ledger.track(1, Money::from_major(10));
        ledger.debit(1, Money::from_major(10));

        assert_eq!(ledger.settle(1), Some(Money::ZERO));
        assert!(ledger.is_paid_off(1));
        assert!(!ledger.is_tracked(1));
        assert_eq!(ledger.balance(1), None);

        // a paid-off advance is never tracked again
        assert!(!ledger.track(1, Money::from_major(10)));
        assert!(!ledger.is_tracked(1));
    }

    #[test]
    fn test_outstanding_and_views() {
        let mut ledger = BalanceLedger::new();
        ledger.track(2, Money::from_major(20));
        ledger.track(1, Money::from_major(10));
        ledger.track(3, Money::from_major(30));
        ledger.settle(3);

        assert_eq!(ledger.outstanding(), Money::from_major(30));
        assert_eq!(ledger.tracked_count(), 2);
        assert_eq!(ledger.paid_off_count(), 1);
        assert_eq!(ledger.balances().keys().copied().collect::<Vec<_>>(), vec![1, 2]);
        assert!(ledger.paid_off().contains(&3));
    }
}
