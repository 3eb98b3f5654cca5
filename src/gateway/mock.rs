use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::Mutex;

use crate::decimal::Money;
use crate::gateway::{BillingGateway, GatewayResponse};
use crate::types::{Advance, AdvanceId, CustomerId, MandateId};

/// a charge the mock accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedCharge {
    pub mandate_id: MandateId,
    pub amount: String,
    pub as_of: NaiveDate,
}

/// a revenue lookup the mock served
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevenueRequest {
    pub customer_id: CustomerId,
    pub as_of: NaiveDate,
    pub for_date: NaiveDate,
}

#[derive(Default)]
struct MockScript {
    advances_by_date: HashMap<NaiveDate, GatewayResponse<Vec<Advance>>>,
    default_advances: Option<Vec<Advance>>,
    revenue_by_date: HashMap<(CustomerId, NaiveDate), GatewayResponse<Money>>,
    default_revenue: HashMap<CustomerId, Money>,
    failing_mandates: HashSet<MandateId>,
    fail_billing_complete: bool,
}

#[derive(Default)]
struct MockLog {
    charges: Vec<PostedCharge>,
    rejected_charges: Vec<PostedCharge>,
    completions: Vec<(AdvanceId, NaiveDate)>,
    revenue_requests: Vec<RevenueRequest>,
    advance_requests: Vec<NaiveDate>,
}

/// scripted in-memory gateway for tests and demos
///
/// Anything not scripted answers `NoData`.
#[derive(Default)]
pub struct MockGateway {
    script: Mutex<MockScript>,
    log: Mutex<MockLog>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// advances returned on every date without a specific script
    pub fn set_advances(&self, advances: Vec<Advance>) {
        self.script.lock().default_advances = Some(advances);
    }

    /// response for one date
    pub fn set_advances_on(&self, date: NaiveDate, response: GatewayResponse<Vec<Advance>>) {
        self.script.lock().advances_by_date.insert(date, response);
    }

    /// revenue reported for every date without a specific script
    pub fn set_daily_revenue(&self, customer_id: CustomerId, amount: Money) {
        self.script.lock().default_revenue.insert(customer_id, amount);
    }

    /// revenue response for one customer and date
    pub fn set_revenue_on(
        &self,
        customer_id: CustomerId,
        for_date: NaiveDate,
        response: GatewayResponse<Money>,
    ) {
        self.script
            .lock()
            .revenue_by_date
            .insert((customer_id, for_date), response);
    }

    /// make every charge against a mandate fail (or succeed again)
    pub fn set_mandate_failing(&self, mandate_id: MandateId, failing: bool) {
        let mut script = self.script.lock();
        if failing {
            script.failing_mandates.insert(mandate_id);
        } else {
            script.failing_mandates.remove(&mandate_id);
        }
    }

    pub fn set_billing_complete_failing(&self, failing: bool) {
        self.script.lock().fail_billing_complete = failing;
    }

    pub fn charges(&self) -> Vec<PostedCharge> {
        self.log.lock().charges.clone()
    }

    pub fn rejected_charges(&self) -> Vec<PostedCharge> {
        self.log.lock().rejected_charges.clone()
    }

    pub fn completions(&self) -> Vec<(AdvanceId, NaiveDate)> {
        self.log.lock().completions.clone()
    }

    pub fn revenue_requests(&self) -> Vec<RevenueRequest> {
        self.log.lock().revenue_requests.clone()
    }

    pub fn advance_requests(&self) -> Vec<NaiveDate> {
        self.log.lock().advance_requests.clone()
    }

    /// total of accepted charges against a mandate
    pub fn charged_to(&self, mandate_id: MandateId) -> Money {
        self.log
            .lock()
            .charges
            .iter()
            .filter(|c| c.mandate_id == mandate_id)
            .filter_map(|c| Money::from_str_exact(&c.amount).ok())
            .sum()
    }
}

#[async_trait]
impl BillingGateway for MockGateway {
    async fn fetch_advances(&self, as_of: NaiveDate) -> GatewayResponse<Vec<Advance>> {
        self.log.lock().advance_requests.push(as_of);
        let script = self.script.lock();
        if let Some(response) = script.advances_by_date.get(&as_of) {
            return response.clone();
        }
        match &script.default_advances {
            Some(advances) => GatewayResponse::Ok(advances.clone()),
            None => GatewayResponse::NoData,
        }
    }

    async fn fetch_revenue(
        &self,
        customer_id: CustomerId,
        as_of: NaiveDate,
        for_date: NaiveDate,
    ) -> GatewayResponse<Money> {
        self.log.lock().revenue_requests.push(RevenueRequest {
            customer_id,
            as_of,
            for_date,
        });
        let script = self.script.lock();
        if let Some(response) = script.revenue_by_date.get(&(customer_id, for_date)) {
            return response.clone();
        }
        match script.default_revenue.get(&customer_id) {
            Some(amount) => GatewayResponse::Ok(*amount),
            None => GatewayResponse::NoData,
        }
    }

    async fn post_charge(
        &self,
        mandate_id: MandateId,
        amount: &str,
        as_of: NaiveDate,
    ) -> GatewayResponse<()> {
        let charge = PostedCharge {
            mandate_id,
            amount: amount.to_string(),
            as_of,
        };
        let failing = self.script.lock().failing_mandates.contains(&mandate_id);
        let mut log = self.log.lock();
        if failing {
            log.rejected_charges.push(charge);
            return GatewayResponse::TransportError("500 - Internal Server Error".to_string());
        }
        log.charges.push(charge);
        GatewayResponse::Ok(())
    }

    async fn mark_billing_complete(
        &self,
        advance_id: AdvanceId,
        as_of: NaiveDate,
    ) -> GatewayResponse<()> {
        self.log.lock().completions.push((advance_id, as_of));
        if self.script.lock().fail_billing_complete {
            return GatewayResponse::TransportError("503 - Service Unavailable".to_string());
        }
        GatewayResponse::Ok(())
    }
}
