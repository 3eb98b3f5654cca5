use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{BillingError, Result};

/// unique identifier for an advance
pub type AdvanceId = u64;

/// unique identifier for a customer
pub type CustomerId = u64;

/// unique identifier for a payment mandate
pub type MandateId = u64;

/// a revenue-share cash advance as listed by the billing gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advance {
    pub id: AdvanceId,
    pub customer_id: CustomerId,
    pub created: NaiveDate,
    /// principal, as a decimal string
    pub total_advanced: String,
    /// fee, as a decimal string
    pub fee: String,
    pub mandate_id: MandateId,
    pub repayment_start_date: NaiveDate,
    /// share of daily revenue collected, 0 to 100
    pub repayment_percentage: Decimal,
}

impl Advance {
    /// total owed: principal plus fee
    pub fn amount_owed(&self) -> Result<Money> {
        Ok(self.parse_amount(&self.total_advanced)? + self.parse_amount(&self.fee)?)
    }

    /// repayment has begun on or before `today`
    pub fn repayment_started(&self, today: NaiveDate) -> bool {
        today >= self.repayment_start_date
    }

    fn parse_amount(&self, value: &str) -> Result<Money> {
        Money::from_str_exact(value).map_err(|_| BillingError::InvalidAmount {
            advance_id: self.id,
            value: value.to_string(),
        })
    }
}

/// a charge attempt that could not proceed because revenue was unavailable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissedAdvance {
    pub advance: Advance,
    pub attempt_date: NaiveDate,
}

/// result of pricing a charge against a revenue figure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChargeQuote {
    /// amount to charge, already clamped to the remaining balance
    Amount(Money),
    /// no revenue data for the charge date
    Unavailable,
}

impl ChargeQuote {
    /// amount worth posting, if any
    pub fn chargeable(&self) -> Option<Money> {
        match self {
            ChargeQuote::Amount(amount) if amount.is_positive() => Some(*amount),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn advance(total: &str, fee: &str) -> Advance {
        Advance {
            id: 1,
            customer_id: 123,
            created: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            total_advanced: total.to_string(),
            fee: fee.to_string(),
            mandate_id: 123,
            repayment_start_date: NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(),
            repayment_percentage: dec!(10),
        }
    }

    #[test]
    fn test_amount_owed() {
        assert_eq!(advance("100", "10").amount_owed().unwrap(), Money::from_major(110));
        assert_eq!(
            advance("60000.00", "3000.50").amount_owed().unwrap(),
            Money::from_str_exact("63000.50").unwrap()
        );
    }

    #[test]
    fn test_invalid_amount() {
        let err = advance("abc", "10").amount_owed().unwrap_err();
        assert!(matches!(err, BillingError::InvalidAmount { advance_id: 1, .. }));
    }

    #[test]
    fn test_repayment_started() {
        let advance = advance("100", "10");
        assert!(!advance.repayment_started(NaiveDate::from_ymd_opt(2024, 8, 31).unwrap()));
        assert!(advance.repayment_started(NaiveDate::from_ymd_opt(2024, 9, 1).unwrap()));
        assert!(advance.repayment_started(NaiveDate::from_ymd_opt(2024, 9, 10).unwrap()));
    }

    #[test]
    fn test_deserialize_gateway_payload() {
        let json = r#"{
            "id": 7,
            "customer_id": 3,
            "created": "2022-01-02",
            "total_advanced": "60000.00",
            "fee": "3000.00",
            "mandate_id": 2,
            "repayment_start_date": "2022-01-05",
            "repayment_percentage": 11
        }"#;
        let advance: Advance = serde_json::from_str(json).unwrap();
        assert_eq!(advance.id, 7);
        assert_eq!(advance.repayment_percentage, dec!(11));
        assert_eq!(advance.repayment_start_date, NaiveDate::from_ymd_opt(2022, 1, 5).unwrap());
    }

    #[test]
    fn test_chargeable() {
        assert_eq!(ChargeQuote::Amount(Money::from_major(5)).chargeable(), Some(Money::from_major(5)));
        assert_eq!(ChargeQuote::Amount(Money::ZERO).chargeable(), None);
        assert_eq!(ChargeQuote::Unavailable.chargeable(), None);
    }
}
