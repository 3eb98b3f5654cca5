pub mod http;
pub mod mock;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{Advance, AdvanceId, CustomerId, MandateId};

pub use http::HttpGateway;
pub use mock::{MockGateway, PostedCharge};

/// status code the gateway uses for "no data for this date"
pub const NO_DATA_STATUS: u16 = 530;

/// tagged result of a gateway call
///
/// `NoData` is a normal answer (nothing published for that date) and is kept
/// distinct from a failed request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GatewayResponse<T> {
    Ok(T),
    NoData,
    TransportError(String),
}

impl<T> GatewayResponse<T> {
    pub fn is_ok(&self) -> bool {
        matches!(self, GatewayResponse::Ok(_))
    }

    /// the value, discarding the reason for its absence
    pub fn ok(self) -> Option<T> {
        match self {
            GatewayResponse::Ok(value) => Some(value),
            _ => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> GatewayResponse<U> {
        match self {
            GatewayResponse::Ok(value) => GatewayResponse::Ok(f(value)),
            GatewayResponse::NoData => GatewayResponse::NoData,
            GatewayResponse::TransportError(reason) => GatewayResponse::TransportError(reason),
        }
    }
}

/// classify an http status into the gateway's three outcomes
pub fn classify_status(status: u16, reason: &str) -> GatewayResponse<()> {
    match status {
        200..=299 => GatewayResponse::Ok(()),
        NO_DATA_STATUS => GatewayResponse::NoData,
        _ => GatewayResponse::TransportError(format!("{status} - {reason}")),
    }
}

/// remote billing system consumed by the orchestrator
#[async_trait]
pub trait BillingGateway: Send + Sync {
    /// advances active as of a date
    async fn fetch_advances(&self, as_of: NaiveDate) -> GatewayResponse<Vec<Advance>>;

    /// a customer's revenue for `for_date`, as known on `as_of`
    async fn fetch_revenue(
        &self,
        customer_id: CustomerId,
        as_of: NaiveDate,
        for_date: NaiveDate,
    ) -> GatewayResponse<Money>;

    /// pull `amount` (two-decimal string) from a mandate
    async fn post_charge(
        &self,
        mandate_id: MandateId,
        amount: &str,
        as_of: NaiveDate,
    ) -> GatewayResponse<()>;

    /// tell the gateway an advance needs no further billing
    async fn mark_billing_complete(
        &self,
        advance_id: AdvanceId,
        as_of: NaiveDate,
    ) -> GatewayResponse<()>;
}
