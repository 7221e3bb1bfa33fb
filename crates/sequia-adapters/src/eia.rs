// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of Sequia.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! EIA Open Data client for electricity and natural gas prices.
//!
//! Retail electricity comes back in cents/kWh (1 cent/kWh = 10 USD/MWh);
//! gas is the Henry Hub spot in USD/MMBtu. Lookup failures degrade to the
//! configured fallback prices tagged `source = fallback`.

use crate::errors::{SourceError, SourceResult};
use crate::retry::RetryPolicy;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

const DEFAULT_BASE_URL: &str = "https://api.eia.gov/v2";
const PRICE_HISTORY_MONTHS: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceSource {
    Eia,
    Fallback,
}

impl PriceSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eia => "eia",
            Self::Fallback => "fallback",
        }
    }
}

/// Current prices for the economic engine.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentPrices {
    pub marginal_price_usd_mwh: f64,
    pub fuel_price_usd_mmbtu: f64,
    pub region: String,
    pub source: PriceSource,
}

/// Price lookup seam used by the economic operation.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    async fn current_prices(&self, state: Option<&str>) -> CurrentPrices;
}

#[derive(Debug, Deserialize)]
struct EiaEnvelope {
    response: Option<EiaResponse>,
}

#[derive(Debug, Deserialize)]
struct EiaResponse {
    #[serde(default)]
    data: Vec<serde_json::Value>,
}

#[derive(Debug, Clone)]
pub struct EiaClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    fallback_marginal_usd_mwh: f64,
    fallback_fuel_usd_mmbtu: f64,
    policy: RetryPolicy,
}

impl EiaClient {
    pub fn new(
        api_key: &str,
        fallback_marginal_usd_mwh: f64,
        fallback_fuel_usd_mmbtu: f64,
    ) -> SourceResult<Self> {
        Self::with_base_url(
            DEFAULT_BASE_URL,
            api_key,
            fallback_marginal_usd_mwh,
            fallback_fuel_usd_mmbtu,
        )
    }

    pub fn with_base_url(
        base_url: &str,
        api_key: &str,
        fallback_marginal_usd_mwh: f64,
        fallback_fuel_usd_mmbtu: f64,
    ) -> SourceResult<Self> {
        if api_key.is_empty() {
            return Err(SourceError::Config("EIA API key is required".to_owned()));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| SourceError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_key: api_key.to_owned(),
            fallback_marginal_usd_mwh,
            fallback_fuel_usd_mmbtu,
            policy: RetryPolicy::default(),
        })
    }

    async fn get_data(
        &self,
        path: &str,
        query: Vec<(String, String)>,
    ) -> SourceResult<Vec<serde_json::Value>> {
        let url = format!("{}{path}", self.base_url);
        let envelope = self
            .policy
            .run("eia", SourceError::is_transient, || async {
                let mut request_query = vec![("api_key".to_owned(), self.api_key.clone())];
                request_query.extend(query.iter().cloned());
                let resp = self
                    .client
                    .get(&url)
                    .query(&request_query)
                    .send()
                    .await
                    .map_err(SourceError::from)?;
                let status = resp.status();
                if !status.is_success() {
                    return Err(SourceError::Api {
                        status: status.as_u16(),
                        message: resp.text().await.unwrap_or_default(),
                    });
                }
                resp.json::<EiaEnvelope>().await.map_err(SourceError::from)
            })
            .await?;

        Ok(envelope.response.map(|r| r.data).unwrap_or_default())
    }

    /// Last 12 months of retail electricity prices, USD/MWh, newest first.
    pub async fn electricity_price_history(
        &self,
        state: Option<&str>,
    ) -> SourceResult<Vec<(String, f64)>> {
        let mut query = vec![
            ("data[0]".to_owned(), "price".to_owned()),
            ("facets[sectorid][]".to_owned(), "ALL".to_owned()),
            ("sort[0][column]".to_owned(), "period".to_owned()),
            ("sort[0][direction]".to_owned(), "desc".to_owned()),
            ("length".to_owned(), PRICE_HISTORY_MONTHS.to_string()),
        ];
        if let Some(state) = state {
            query.push(("facets[stateid][]".to_owned(), state.to_owned()));
        }

        let rows = self.get_data("/electricity/retail-sales/data", query).await?;
        Ok(rows
            .iter()
            .filter_map(|row| {
                let period = row.get("period")?.as_str()?.to_owned();
                let cents_kwh = numeric_field(row, "price")?;
                Some((period, cents_kwh * 10.0))
            })
            .collect())
    }

    /// Recent Henry Hub spot prices, USD/MMBtu, newest first.
    pub async fn natural_gas_price_history(&self) -> SourceResult<Vec<(String, f64)>> {
        let query = vec![
            ("data[0]".to_owned(), "value".to_owned()),
            ("facets[series][]".to_owned(), "RNGWHHD".to_owned()),
            ("sort[0][column]".to_owned(), "period".to_owned()),
            ("sort[0][direction]".to_owned(), "desc".to_owned()),
            ("length".to_owned(), "30".to_owned()),
        ];
        let rows = self.get_data("/natural-gas/pri/fut/data", query).await?;
        Ok(rows
            .iter()
            .filter_map(|row| {
                let period = row.get("period")?.as_str()?.to_owned();
                let price = numeric_field(row, "value")?;
                Some((period, price))
            })
            .collect())
    }
}

/// EIA serializes numbers inconsistently (numeric or string).
fn numeric_field(row: &serde_json::Value, key: &str) -> Option<f64> {
    let v = row.get(key)?;
    v.as_f64().or_else(|| v.as_str()?.parse().ok())
}

#[async_trait]
impl PriceProvider for EiaClient {
    /// Most recent prices; every failure path falls back rather than
    /// erroring, tagged with the source used.
    async fn current_prices(&self, state: Option<&str>) -> CurrentPrices {
        let region = state.map_or_else(|| "US".to_owned(), str::to_owned);

        let marginal = match self.electricity_price_history(state).await {
            Ok(history) => history.first().map(|(_, p)| *p),
            Err(e) => {
                warn!("EIA electricity lookup failed: {e}");
                None
            }
        };
        let fuel = match self.natural_gas_price_history().await {
            Ok(history) => history.first().map(|(_, p)| *p),
            Err(e) => {
                warn!("EIA gas lookup failed: {e}");
                None
            }
        };

        match (marginal, fuel) {
            (Some(marginal), Some(fuel)) => CurrentPrices {
                marginal_price_usd_mwh: marginal,
                fuel_price_usd_mmbtu: fuel,
                region,
                source: PriceSource::Eia,
            },
            _ => CurrentPrices {
                marginal_price_usd_mwh: marginal.unwrap_or(self.fallback_marginal_usd_mwh),
                fuel_price_usd_mmbtu: fuel.unwrap_or(self.fallback_fuel_usd_mmbtu),
                region,
                source: PriceSource::Fallback,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn electricity_prices_convert_to_usd_mwh() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/electricity/retail-sales/data")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(
                r#"{"response": {"data": [
                    {"period": "2025-06", "price": 9.5},
                    {"period": "2025-05", "price": "9.1"}
                ]}}"#,
            )
            .create_async()
            .await;

        let client = EiaClient::with_base_url(&server.url(), "key", 100.0, 3.0).unwrap();
        let history = client.electricity_price_history(Some("TX")).await.unwrap();
        assert_eq!(history.len(), 2);
        assert!((history[0].1 - 95.0).abs() < 1e-9);
        assert!((history[1].1 - 91.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn unreachable_api_degrades_to_fallback_prices() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", mockito::Matcher::Any)
            .with_status(403)
            .with_body("denied")
            .create_async()
            .await;

        let client = EiaClient::with_base_url(&server.url(), "key", 100.0, 3.0).unwrap();
        let prices = client.current_prices(Some("TX")).await;
        assert_eq!(prices.source, PriceSource::Fallback);
        assert_eq!(prices.marginal_price_usd_mwh, 100.0);
        assert_eq!(prices.fuel_price_usd_mmbtu, 3.0);
        assert_eq!(prices.region, "TX");
    }

    #[tokio::test]
    async fn both_series_present_tags_eia_source() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/electricity/retail-sales/data")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"response": {"data": [{"period": "2025-06", "price": 9.5}]}}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/natural-gas/pri/fut/data")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"response": {"data": [{"period": "2025-06-30", "value": 2.8}]}}"#)
            .create_async()
            .await;

        let client = EiaClient::with_base_url(&server.url(), "key", 100.0, 3.0).unwrap();
        let prices = client.current_prices(None).await;
        assert_eq!(prices.source, PriceSource::Eia);
        assert!((prices.marginal_price_usd_mwh - 95.0).abs() < 1e-9);
        assert!((prices.fuel_price_usd_mmbtu - 2.8).abs() < 1e-9);
        assert_eq!(prices.region, "US");
    }

    #[test]
    fn empty_api_key_is_rejected() {
        assert!(matches!(
            EiaClient::new("", 100.0, 3.0),
            Err(SourceError::Config(_))
        ));
    }
}
