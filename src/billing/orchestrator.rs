use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::billing::calculator::compute_charge;
use crate::decimal::Money;
use crate::errors::Result;
use crate::events::{Event, EventStore};
use crate::gateway::{BillingGateway, GatewayResponse};
use crate::simulation::previous_day;
use crate::state::{BillingSnapshot, BillingState};
use crate::types::{Advance, AdvanceId, ChargeQuote, CustomerId, MandateId};

/// what happened when a day was run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayOutcome {
    /// the gateway listed no advances
    NoAdvances,
    /// fetching the advance list failed; nothing was processed
    Abandoned { reason: String },
    /// every listed advance was visited
    Processed { advances: usize },
}

/// drives one simulated day of billing against a gateway
pub struct BillingOrchestrator<G: BillingGateway> {
    gateway: G,
    state: BillingState,
    events: EventStore,
    time: SafeTimeProvider,
}

impl<G: BillingGateway> BillingOrchestrator<G> {
    pub fn new(gateway: G, time: SafeTimeProvider) -> Self {
        Self::with_state(gateway, BillingState::new(), time)
    }

    pub fn with_state(gateway: G, state: BillingState, time: SafeTimeProvider) -> Self {
        Self {
            gateway,
            state,
            events: EventStore::new(),
            time,
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn state(&self) -> &BillingState {
        &self.state
    }

    pub fn events(&self) -> &[Event] {
        self.events.events()
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        self.events.take_events()
    }

    pub fn snapshot(&self) -> BillingSnapshot {
        self.state.snapshot(self.time.now())
    }

    /// run billing for one day
    pub async fn run_day(&mut self, today: NaiveDate) -> DayOutcome {
        info!(%today, "commencing billing");

        match self.gateway.fetch_advances(today).await {
            GatewayResponse::Ok(advances) if !advances.is_empty() => {
                self.process_day(today, &advances).await;
                DayOutcome::Processed {
                    advances: advances.len(),
                }
            }
            GatewayResponse::Ok(_) | GatewayResponse::NoData => {
                info!(%today, "no advances found");
                DayOutcome::NoAdvances
            }
            GatewayResponse::TransportError(reason) => {
                error!(%today, %reason, "error retrieving advances, abandoning day");
                self.events.emit(Event::DayAbandoned {
                    today,
                    reason: reason.clone(),
                    timestamp: self.time.now(),
                });
                DayOutcome::Abandoned { reason }
            }
        }
    }

    /// bill each advance in the order given; one failing advance does not stop the rest
    pub async fn process_day(&mut self, today: NaiveDate, advances: &[Advance]) {
        for advance in advances {
            if let Err(e) = self.process_advance(today, advance).await {
                error!(advance_id = advance.id, %today, error = %e, "error processing billing for advance");
                self.events.emit(Event::AdvanceFailed {
                    advance_id: advance.id,
                    today,
                    reason: e.to_string(),
                    timestamp: self.time.now(),
                });
            }
        }
    }

    async fn process_advance(&mut self, today: NaiveDate, advance: &Advance) -> Result<()> {
        if self.state.ledger.is_paid_off(advance.id) {
            debug!(advance_id = advance.id, "skipping advance, fully paid off");
            return Ok(());
        }

        if !self.state.ledger.is_tracked(advance.id) {
            let amount_owed = advance.amount_owed()?;
            self.state.ledger.track(advance.id, amount_owed);
            info!(advance_id = advance.id, %amount_owed, "tracking advance");
            self.events.emit(Event::AdvanceTracked {
                advance_id: advance.id,
                customer_id: advance.customer_id,
                amount_owed,
                timestamp: self.time.now(),
            });
        }

        if !advance.repayment_started(today) {
            debug!(
                advance_id = advance.id,
                starts = %advance.repayment_start_date,
                "skipping advance, repayment not started"
            );
            return Ok(());
        }

        self.retry_missed(advance.customer_id, today).await?;

        // the retry may already have settled this advance
        let remaining = match self.state.ledger.balance(advance.id) {
            Some(balance) if balance.is_positive() => balance,
            _ => return Ok(()),
        };

        let charge_date = previous_day(today);
        let quote = self.quote_charge(advance, charge_date, today, remaining).await?;

        match quote.chargeable() {
            Some(amount) => {
                if !self
                    .mandate_repayment(amount, advance.id, advance.mandate_id, today)
                    .await
                {
                    return Ok(());
                }
            }
            None => {
                info!(
                    advance_id = advance.id,
                    %today,
                    %remaining,
                    "unable to charge advance"
                );
            }
        }

        self.check_payoff(advance.id, today).await;
        Ok(())
    }

    /// retry a customer's missed charges, each against the revenue of the day it was missed
    ///
    /// Stops at the first entry whose advance is already settled.
    pub async fn retry_missed(&mut self, customer_id: CustomerId, today: NaiveDate) -> Result<()> {
        if !self.state.missed.has_pending(customer_id) {
            return Ok(());
        }

        let pending = self.state.missed.pending(customer_id).to_vec();
        for miss in pending {
            let advance_id = miss.advance.id;

            if self.check_payoff(advance_id, today).await {
                return Ok(());
            }

            let Some(remaining) = self.state.ledger.balance(advance_id) else {
                warn!(advance_id, customer_id, "missed advance is not tracked, leaving it queued");
                continue;
            };

            let quote = self
                .quote_charge(&miss.advance, miss.attempt_date, today, remaining)
                .await?;

            match quote.chargeable() {
                Some(amount) => {
                    let charged = self
                        .mandate_repayment(amount, advance_id, miss.advance.mandate_id, today)
                        .await;
                    if charged {
                        if let Some(cleared) = self.state.missed.clear(customer_id, advance_id) {
                            info!(advance_id, customer_id, attempt = %cleared.attempt_date, "missed payment recovered");
                            self.events.emit(Event::MissedPaymentCleared {
                                advance_id,
                                customer_id,
                                attempt_date: cleared.attempt_date,
                                timestamp: self.time.now(),
                            });
                        }
                    }
                }
                None => {
                    info!(
                        advance_id,
                        attempt = %miss.attempt_date,
                        %remaining,
                        "unable to charge missed advance"
                    );
                }
            }
        }

        Ok(())
    }

    /// post a charge and, if it went through, take it off the ledger
    pub async fn mandate_repayment(
        &mut self,
        amount: Money,
        advance_id: AdvanceId,
        mandate_id: MandateId,
        today: NaiveDate,
    ) -> bool {
        info!(advance_id, mandate_id, %amount, "attempting charge");

        match self
            .gateway
            .post_charge(mandate_id, &amount.to_currency_string(), today)
            .await
        {
            GatewayResponse::Ok(()) => {
                let remaining_balance = self.state.ledger.debit(advance_id, amount);
                match remaining_balance {
                    Some(balance) => info!(advance_id, remaining = %balance, "charge posted"),
                    None => warn!(advance_id, "charge posted for an untracked advance"),
                }
                self.events.emit(Event::ChargePosted {
                    advance_id,
                    mandate_id,
                    amount,
                    remaining_balance,
                    today,
                    timestamp: self.time.now(),
                });
                true
            }
            GatewayResponse::NoData => {
                self.record_failed_charge(amount, advance_id, mandate_id, today, "no data".to_string())
            }
            GatewayResponse::TransportError(reason) => {
                self.record_failed_charge(amount, advance_id, mandate_id, today, reason)
            }
        }
    }

    fn record_failed_charge(
        &mut self,
        amount: Money,
        advance_id: AdvanceId,
        mandate_id: MandateId,
        today: NaiveDate,
        reason: String,
    ) -> bool {
        error!(advance_id, mandate_id, %today, %reason, "failed to post charge");
        self.events.emit(Event::ChargeFailed {
            advance_id,
            mandate_id,
            amount,
            reason,
            today,
            timestamp: self.time.now(),
        });
        false
    }

    /// settle an advance whose balance has reached zero; true if it is (now) paid off
    ///
    /// A balance under half a cent counts as zero, since no charge can collect
    /// it. Local state moves to paid off even when the gateway rejects the
    /// billing-complete call.
    pub async fn check_payoff(&mut self, advance_id: AdvanceId, today: NaiveDate) -> bool {
        if self.state.ledger.is_paid_off(advance_id) {
            return true;
        }

        match self.state.ledger.balance(advance_id) {
            Some(balance) if !balance.round_currency().is_positive() => {}
            _ => return false,
        }

        let failure = match self.gateway.mark_billing_complete(advance_id, today).await {
            GatewayResponse::Ok(()) => None,
            GatewayResponse::NoData => Some("no data".to_string()),
            GatewayResponse::TransportError(reason) => Some(reason),
        };
        if let Some(reason) = failure {
            warn!(advance_id, %today, %reason, "could not mark billing complete");
            self.events.emit(Event::BillingCompleteFailed {
                advance_id,
                reason,
                timestamp: self.time.now(),
            });
        }

        self.state.ledger.settle(advance_id);
        info!(advance_id, %today, "advance fully paid off and marked as complete");
        self.events.emit(Event::AdvancePaidOff {
            advance_id,
            today,
            timestamp: self.time.now(),
        });
        true
    }

    /// compute a charge and queue a missed payment when revenue is unavailable
    async fn quote_charge(
        &mut self,
        advance: &Advance,
        charge_date: NaiveDate,
        today: NaiveDate,
        remaining: Money,
    ) -> Result<ChargeQuote> {
        let quote = compute_charge(
            &self.gateway,
            advance.customer_id,
            charge_date,
            today,
            remaining,
            advance.repayment_percentage,
        )
        .await?;

        if quote == ChargeQuote::Unavailable {
            let timestamp = self.time.now();
            self.events.emit(Event::RevenueUnavailable {
                advance_id: advance.id,
                customer_id: advance.customer_id,
                charge_date,
                timestamp,
            });
            if self.state.missed.record(advance, charge_date) {
                self.events.emit(Event::MissedPaymentQueued {
                    advance_id: advance.id,
                    customer_id: advance.customer_id,
                    attempt_date: charge_date,
                    timestamp,
                });
            }
        }

        Ok(quote)
    }
}
