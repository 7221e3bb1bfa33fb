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

//! Open-Meteo archive client: batch daily precipitation for a coordinate
//! and date window, fetched in multi-year chunks to stay under API limits.

use crate::errors::{SourceError, SourceResult};
use crate::retry::RetryPolicy;
use crate::PrecipitationSource;
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use sequia_types::DailyPrecipitation;
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, warn};

const DEFAULT_BASE_URL: &str = "https://archive-api.open-meteo.com";
const CHUNK_YEARS: i32 = 5;

#[derive(Debug, Deserialize)]
struct ArchiveResponse {
    daily: Option<DailyBlock>,
}

#[derive(Debug, Deserialize)]
struct DailyBlock {
    time: Vec<NaiveDate>,
    precipitation_sum: Vec<Option<f64>>,
}

#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    client: reqwest::Client,
    base_url: String,
    timezone: String,
    policy: RetryPolicy,
}

impl OpenMeteoClient {
    pub fn new() -> SourceResult<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> SourceResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| SourceError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            timezone: "UTC".to_owned(),
            policy: RetryPolicy::default(),
        })
    }

    /// Timezone the archive coerces daily sums to (zone-local days).
    pub fn with_timezone(mut self, timezone: &str) -> Self {
        self.timezone = timezone.to_owned();
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    async fn fetch_window(
        &self,
        latitude: f64,
        longitude: f64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> SourceResult<Vec<DailyPrecipitation>> {
        let url = format!("{}/v1/archive", self.base_url);
        let response = self
            .policy
            .run("open-meteo", SourceError::is_transient, || async {
                let resp = self
                    .client
                    .get(&url)
                    .query(&[
                        ("latitude", latitude.to_string()),
                        ("longitude", longitude.to_string()),
                        ("start_date", from.to_string()),
                        ("end_date", to.to_string()),
                        ("daily", "precipitation_sum".to_owned()),
                        ("timezone", self.timezone.clone()),
                    ])
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
                resp.json::<ArchiveResponse>().await.map_err(SourceError::from)
            })
            .await?;

        let Some(daily) = response.daily else {
            return Ok(Vec::new());
        };

        // Nulls in the archive become zero-rain days.
        Ok(daily
            .time
            .into_iter()
            .zip(daily.precipitation_sum)
            .map(|(date, mm)| DailyPrecipitation {
                date,
                value_mm: mm.unwrap_or(0.0).max(0.0),
            })
            .collect())
    }

    /// Fetch a long window in multi-year chunks; failed chunks are logged
    /// and skipped rather than failing the whole history.
    pub async fn fetch_history(
        &self,
        latitude: f64,
        longitude: f64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> SourceResult<Vec<DailyPrecipitation>> {
        if from > to {
            return Err(SourceError::Config(format!(
                "invalid window: {from} > {to}"
            )));
        }

        let mut all = Vec::new();
        let mut current = from;
        while current <= to {
            let chunk_end = NaiveDate::from_ymd_opt(current.year() + CHUNK_YEARS, 12, 31)
                .unwrap_or(to)
                .min(to);
            match self.fetch_window(latitude, longitude, current, chunk_end).await {
                Ok(mut chunk) => all.append(&mut chunk),
                Err(e) => {
                    warn!("open-meteo chunk {current}..{chunk_end} failed: {e}");
                }
            }
            let Some(next) = NaiveDate::from_ymd_opt(chunk_end.year() + 1, 1, 1) else {
                break;
            };
            current = next;
        }

        all.sort_by_key(|r| r.date);
        all.dedup_by_key(|r| r.date);
        info!(
            records = all.len(),
            "open-meteo history fetched for ({latitude:.3}, {longitude:.3})"
        );
        Ok(all)
    }
}

#[async_trait]
impl PrecipitationSource for OpenMeteoClient {
    fn name(&self) -> &'static str {
        "openmeteo"
    }

    async fn fetch_daily(
        &self,
        latitude: f64,
        longitude: f64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> SourceResult<Vec<DailyPrecipitation>> {
        self.fetch_history(latitude, longitude, from, to).await
    }
}
