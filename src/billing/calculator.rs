use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::decimal::Money;
use crate::errors::{BillingError, Result};
use crate::gateway::{BillingGateway, GatewayResponse};
use crate::types::{ChargeQuote, CustomerId};

/// revenue share owed for a day, rounded to cents and capped at what is still owed
///
/// The cap is the balance rounded to cents; a remainder under half a cent caps at zero.
pub fn repayment_amount(revenue: Money, repayment_percentage: Decimal, remaining_balance: Money) -> Money {
    revenue
        .percentage(repayment_percentage)
        .round_currency()
        .min(remaining_balance.round_currency())
}

/// price a charge for `charge_date` from the customer's revenue
///
/// Revenue the gateway has no data for yields `ChargeQuote::Unavailable`; the
/// caller decides whether that is a missed payment. Transport failures are
/// errors, not misses.
pub async fn compute_charge<G>(
    gateway: &G,
    customer_id: CustomerId,
    charge_date: NaiveDate,
    today: NaiveDate,
    remaining_balance: Money,
    repayment_percentage: Decimal,
) -> Result<ChargeQuote>
where
    G: BillingGateway + ?Sized,
{
    match gateway.fetch_revenue(customer_id, today, charge_date).await {
        GatewayResponse::Ok(revenue) => {
            let amount = repayment_amount(revenue, repayment_percentage, remaining_balance);
            debug!(customer_id, %charge_date, %revenue, %amount, "computed charge");
            Ok(ChargeQuote::Amount(amount))
        }
        GatewayResponse::NoData => {
            warn!(customer_id, %charge_date, "revenue not available");
            Ok(ChargeQuote::Unavailable)
        }
        GatewayResponse::TransportError(message) => Err(BillingError::Gateway {
            operation: "fetch_revenue",
            message,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MockGateway;
    use rust_decimal_macros::dec;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, day).unwrap()
    }

    #[test]
    fn test_repayment_amount() {
        let amount = repayment_amount(Money::from_major(50), dec!(10), Money::from_major(100));
        assert_eq!(amount, Money::from_major(5));
        assert_eq!(amount.to_currency_string(), "5.00");
    }

    #[test]
    fn test_repayment_amount_is_capped_by_balance() {
        let amount = repayment_amount(Money::from_major(1_000), dec!(10), Money::from_major(42));
        assert_eq!(amount, Money::from_major(42));

        let remaining = Money::from_str_exact("0.004").unwrap();
        let amount = repayment_amount(Money::from_major(1_000), dec!(10), remaining);
        assert_eq!(amount, Money::ZERO);

        let remaining = Money::from_str_exact("12.345").unwrap();
        let amount = repayment_amount(Money::from_major(1_000), dec!(10), remaining);
        assert_eq!(amount.to_currency_string(), "12.35");
    }

    #[test]
    fn test_repayment_amount_rounds_to_cents() {
        let amount = repayment_amount(
            Money::from_str_exact("123.45").unwrap(),
            dec!(11),
            Money::from_major(1_000),
        );
        // 13.5795
        assert_eq!(amount, Money::from_str_exact("13.58").unwrap());
    }

    #[test]
    fn test_zero_revenue_is_zero_charge() {
        let amount = repayment_amount(Money::ZERO, dec!(10), Money::from_major(100));
        assert_eq!(amount, Money::ZERO);
    }

    #[tokio::test]
    async fn test_compute_charge_uses_charge_date_and_today() {
        let gateway = MockGateway::new();
        gateway.set_revenue_on(123, date(9), GatewayResponse::Ok(Money::from_major(50)));

        let quote = compute_charge(&gateway, 123, date(9), date(10), Money::from_major(100), dec!(10))
            .await
            .unwrap();
        assert_eq!(quote, ChargeQuote::Amount(Money::from_major(5)));

        let request = gateway.revenue_requests()[0];
        assert_eq!(request.for_date, date(9));
        assert_eq!(request.as_of, date(10));
    }

    #[tokio::test]
    async fn test_compute_charge_unavailable() {
        let gateway = MockGateway::new();
        let quote = compute_charge(&gateway, 123, date(9), date(10), Money::from_major(100), dec!(10))
            .await
            .unwrap();
        assert_eq!(quote, ChargeQuote::Unavailable);
        assert_eq!(gateway.revenue_requests().len(), 1);
    }

    #[tokio::test]
    async fn test_compute_charge_zero_revenue_is_not_unavailable() {
        let gateway = MockGateway::new();
        gateway.set_revenue_on(123, date(9), GatewayResponse::Ok(Money::ZERO));

        let quote = compute_charge(&gateway, 123, date(9), date(10), Money::from_major(100), dec!(10))
            .await
            .unwrap();
        assert_eq!(quote, ChargeQuote::Amount(Money::ZERO));
    }

    #[tokio::test]
    async fn test_compute_charge_transport_error() {
        let gateway = MockGateway::new();
        gateway.set_revenue_on(
            123,
            date(9),
            GatewayResponse::TransportError("500 - Internal Server Error".to_string()),
        );

        let err = compute_charge(&gateway, 123, date(9), date(10), Money::from_major(100), dec!(10))
            .await
            .unwrap_err();
        assert!(matches!(err, BillingError::Gateway { operation: "fetch_revenue", .. }));
    }
}
