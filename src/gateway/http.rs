use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::config::GatewayConfig;
use crate::decimal::Money;
use crate::errors::Result;
use crate::gateway::{classify_status, BillingGateway, GatewayResponse};
use crate::types::{Advance, AdvanceId, CustomerId, MandateId};

#[derive(Debug, Deserialize)]
struct AdvancesResponse {
    advances: Option<Vec<Advance>>,
}

#[derive(Debug, Deserialize)]
struct RevenueResponse {
    amount: Option<Decimal>,
}

impl RevenueResponse {
    /// a null or missing amount means nothing is published yet
    fn into_revenue(self) -> GatewayResponse<Money> {
        match self.amount {
            Some(amount) => GatewayResponse::Ok(Money::from_decimal(amount)),
            None => GatewayResponse::NoData,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChargeRequest<'a> {
    amount: &'a str,
}

/// billing gateway over http
pub struct HttpGateway {
    client: Client,
    base_url: String,
    today_header: String,
}

impl HttpGateway {
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            today_header: config.today_header.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn with_today(&self, request: RequestBuilder, as_of: NaiveDate) -> RequestBuilder {
        request.header(self.today_header.as_str(), as_of.to_string())
    }

    /// send a request and map failures onto the gateway outcomes
    async fn send(&self, request: RequestBuilder, context: &str) -> GatewayResponse<reqwest::Response> {
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                error!(context, error = %e, "gateway request failed");
                return GatewayResponse::TransportError(e.to_string());
            }
        };

        let status = response.status();
        match classify_status(status.as_u16(), status.canonical_reason().unwrap_or("Unknown Error")) {
            GatewayResponse::Ok(()) => GatewayResponse::Ok(response),
            GatewayResponse::NoData => {
                debug!(context, "gateway has no data");
                GatewayResponse::NoData
            }
            GatewayResponse::TransportError(reason) => {
                let details = response.text().await.unwrap_or_default();
                error!(context, %reason, %details, "gateway returned an error");
                GatewayResponse::TransportError(reason)
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        as_of: NaiveDate,
        context: &str,
    ) -> GatewayResponse<T> {
        let request = self.with_today(self.client.get(self.url(path)), as_of);
        match self.send(request, context).await {
            GatewayResponse::Ok(response) => match response.json::<T>().await {
                Ok(body) => GatewayResponse::Ok(body),
                Err(e) => {
                    error!(context, error = %e, "could not decode gateway response");
                    GatewayResponse::TransportError(e.to_string())
                }
            },
            GatewayResponse::NoData => GatewayResponse::NoData,
            GatewayResponse::TransportError(reason) => GatewayResponse::TransportError(reason),
        }
    }

    async fn post<B: Serialize + ?Sized + Sync>(
        &self,
        path: &str,
        body: &B,
        as_of: NaiveDate,
        context: &str,
    ) -> GatewayResponse<()> {
        let request = self.with_today(self.client.post(self.url(path)).json(body), as_of);
        self.send(request, context).await.map(|_| ())
    }
}

#[async_trait]
impl BillingGateway for HttpGateway {
    async fn fetch_advances(&self, as_of: NaiveDate) -> GatewayResponse<Vec<Advance>> {
        let context = format!("fetching advances on {as_of}");
        match self.get_json::<AdvancesResponse>("/advances", as_of, &context).await {
            GatewayResponse::Ok(AdvancesResponse { advances: Some(advances) }) => {
                GatewayResponse::Ok(advances)
            }
            GatewayResponse::Ok(AdvancesResponse { advances: None }) => GatewayResponse::NoData,
            other => other.map(|_| Vec::new()),
        }
    }

    async fn fetch_revenue(
        &self,
        customer_id: CustomerId,
        as_of: NaiveDate,
        for_date: NaiveDate,
    ) -> GatewayResponse<Money> {
        let path = format!("/customers/{customer_id}/revenues/{for_date}");
        let context = format!("fetching revenue for customer {customer_id} on {for_date}");
        match self.get_json::<RevenueResponse>(&path, as_of, &context).await {
            GatewayResponse::Ok(body) => body.into_revenue(),
            GatewayResponse::NoData => GatewayResponse::NoData,
            GatewayResponse::TransportError(reason) => GatewayResponse::TransportError(reason),
        }
    }

    async fn post_charge(
        &self,
        mandate_id: MandateId,
        amount: &str,
        as_of: NaiveDate,
    ) -> GatewayResponse<()> {
        let path = format!("/mandates/{mandate_id}/charge");
        let context = format!("posting charge for mandate {mandate_id} on {as_of}");
        self.post(&path, &ChargeRequest { amount }, as_of, &context).await
    }

    async fn mark_billing_complete(
        &self,
        advance_id: AdvanceId,
        as_of: NaiveDate,
    ) -> GatewayResponse<()> {
        let path = format!("/advances/{advance_id}/billing_complete");
        let context = format!("marking billing complete for advance {advance_id}");
        self.post(&path, &serde_json::json!({}), as_of, &context).await
    }
}
