use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::billing::{BillingOrchestrator, DayOutcome};
use crate::decimal::Money;
use crate::events::Event;
use crate::gateway::BillingGateway;
use crate::types::AdvanceId;

/// every date from `start` to `end` inclusive; empty when `start > end`
pub fn date_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let mut current = Some(start);
    while let Some(date) = current {
        if date > end {
            break;
        }
        dates.push(date);
        current = date.succ_opt();
    }
    dates
}

/// the calendar day before `date`
pub fn previous_day(date: NaiveDate) -> NaiveDate {
    date.checked_sub_signed(Duration::days(1)).unwrap_or(date)
}

/// one simulated day and what it produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub outcome: DayOutcome,
    pub events: Vec<Event>,
}

impl DaySummary {
    pub fn charges_posted(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, Event::ChargePosted { .. }))
            .count()
    }

    pub fn amount_collected(&self) -> Money {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::ChargePosted { amount, .. } => Some(*amount),
                _ => None,
            })
            .sum()
    }
}

/// result of a full simulation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationReport {
    pub run_id: Uuid,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: Vec<DaySummary>,
    pub outstanding: Money,
    pub pending_missed: usize,
}

impl SimulationReport {
    pub fn charges_posted(&self) -> usize {
        self.days.iter().map(DaySummary::charges_posted).sum()
    }

    pub fn amount_collected(&self) -> Money {
        self.days.iter().map(DaySummary::amount_collected).sum()
    }

    /// advances paid off during the run, in the order they settled
    pub fn advances_paid_off(&self) -> Vec<AdvanceId> {
        self.days
            .iter()
            .flat_map(|d| d.events.iter())
            .filter_map(|e| match e {
                Event::AdvancePaidOff { advance_id, .. } => Some(*advance_id),
                _ => None,
            })
            .collect()
    }

    pub fn days_abandoned(&self) -> usize {
        self.days
            .iter()
            .filter(|d| matches!(d.outcome, DayOutcome::Abandoned { .. }))
            .count()
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// runs the orchestrator over a date range, one day at a time
pub struct Simulation<G: BillingGateway> {
    orchestrator: BillingOrchestrator<G>,
}

impl<G: BillingGateway> Simulation<G> {
    pub fn new(orchestrator: BillingOrchestrator<G>) -> Self {
        Self { orchestrator }
    }

    pub fn orchestrator(&self) -> &BillingOrchestrator<G> {
        &self.orchestrator
    }

    /// bill every day from `start` to `end`; each day finishes before the next begins
    pub async fn run(&mut self, start: NaiveDate, end: NaiveDate) -> SimulationReport {
        let run_id = Uuid::new_v4();
        info!(%run_id, %start, %end, "starting billing simulation");

        let mut days = Vec::new();
        for date in date_range(start, end) {
            let outcome = self.orchestrator.run_day(date).await;
            days.push(DaySummary {
                date,
                outcome,
                events: self.orchestrator.take_events(),
            });
        }

        let state = self.orchestrator.state();
        let report = SimulationReport {
            run_id,
            start,
            end,
            days,
            outstanding: state.ledger.outstanding(),
            pending_missed: state.missed.total_pending(),
        };

        info!(
            %run_id,
            days = report.days.len(),
            charges = report.charges_posted(),
            collected = %report.amount_collected(),
            paid_off = report.advances_paid_off().len(),
            "simulation finished"
        );
        report
    }
}
