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

//! NOAA Climate Data Online client: nearest-station lookup plus paginated
//! GHCND daily precipitation. NOAA reports PRCP in tenths of a millimeter.

use crate::errors::{SourceError, SourceResult};
use crate::retry::RetryPolicy;
use crate::PrecipitationSource;
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use sequia_types::DailyPrecipitation;
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

const DEFAULT_BASE_URL: &str = "https://www.ncei.noaa.gov/cdo-web/api/v2";
const PAGE_LIMIT: usize = 1000;
const STATION_SEARCH_EXTENT_DEG: f64 = 0.5;

#[derive(Debug, Deserialize)]
struct StationsResponse {
    #[serde(default)]
    results: Vec<Station>,
}

#[derive(Debug, Deserialize)]
struct Station {
    id: String,
}

#[derive(Debug, Deserialize)]
struct DataResponse {
    #[serde(default)]
    results: Vec<DataPoint>,
}

#[derive(Debug, Deserialize)]
struct DataPoint {
    date: String,
    value: f64,
}

#[derive(Debug, Clone)]
pub struct NoaaClient {
    client: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
    policy: RetryPolicy,
}

impl NoaaClient {
    pub fn new(api_token: Option<String>) -> SourceResult<Self> {
        Self::with_base_url(DEFAULT_BASE_URL, api_token)
    }

    pub fn with_base_url(base_url: &str, api_token: Option<String>) -> SourceResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| SourceError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_token,
            policy: RetryPolicy::default(),
        })
    }

    fn request(&self, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .get(format!("{}{path}", self.base_url))
            .header("Accept", "application/json");
        if let Some(token) = &self.api_token {
            builder = builder.header("token", token);
        }
        builder
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> SourceResult<T> {
        self.policy
            .run("noaa", SourceError::is_transient, || async {
                let resp = self
                    .request(path)
                    .query(query)
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
                resp.json::<T>().await.map_err(SourceError::from)
            })
            .await
    }

    /// Nearest GHCND station inside a half-degree bounding box.
    pub async fn find_nearest_station(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> SourceResult<Option<String>> {
        let extent = STATION_SEARCH_EXTENT_DEG;
        let bbox = format!(
            "{},{},{},{}",
            latitude - extent,
            longitude - extent,
            latitude + extent,
            longitude + extent
        );
        let query = vec![
            ("datasetid".to_owned(), "GHCND".to_owned()),
            ("extent".to_owned(), bbox),
            ("limit".to_owned(), "10".to_owned()),
        ];
        let response: StationsResponse = self.get_json("/stations", &query).await?;
        Ok(response.results.into_iter().next().map(|s| s.id))
    }

    /// Daily PRCP for one station and window, following pagination.
    pub async fn fetch_station_precipitation(
        &self,
        station_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> SourceResult<Vec<DailyPrecipitation>> {
        let mut all = Vec::new();
        let mut offset = 1usize;

        loop {
            let query = vec![
                ("datasetid".to_owned(), "GHCND".to_owned()),
                ("stationid".to_owned(), station_id.to_owned()),
                ("startdate".to_owned(), from.to_string()),
                ("enddate".to_owned(), to.to_string()),
                ("datatypeid".to_owned(), "PRCP".to_owned()),
                ("units".to_owned(), "metric".to_owned()),
                ("limit".to_owned(), PAGE_LIMIT.to_string()),
                ("offset".to_owned(), offset.to_string()),
            ];
            let page: DataResponse = self.get_json("/data", &query).await?;
            let count = page.results.len();
            for point in page.results {
                // Timestamps come as "2020-01-01T00:00:00".
                let Ok(date) = NaiveDate::parse_from_str(&point.date[..10.min(point.date.len())], "%Y-%m-%d")
                else {
                    continue;
                };
                all.push(DailyPrecipitation {
                    date,
                    // Tenths of a millimeter.
                    value_mm: (point.value / 10.0).max(0.0),
                });
            }
            if count < PAGE_LIMIT {
                break;
            }
            offset += PAGE_LIMIT;
        }

        Ok(all)
    }
}

#[async_trait]
impl PrecipitationSource for NoaaClient {
    fn name(&self) -> &'static str {
        "noaa"
    }

    /// Nearest-station fetch in yearly chunks (the CDO API caps requests
    /// at one year). Failed years are skipped, not fatal.
    async fn fetch_daily(
        &self,
        latitude: f64,
        longitude: f64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> SourceResult<Vec<DailyPrecipitation>> {
        let Some(station) = self.find_nearest_station(latitude, longitude).await? else {
            return Err(SourceError::NoData(format!(
                "no NOAA station near ({latitude:.3}, {longitude:.3})"
            )));
        };

        let mut all = Vec::new();
        let mut current = from;
        while current <= to {
            let year_end = NaiveDate::from_ymd_opt(current.year(), 12, 31)
                .unwrap_or(to)
                .min(to);
            match self
                .fetch_station_precipitation(&station, current, year_end)
                .await
            {
                Ok(mut chunk) => all.append(&mut chunk),
                Err(e) => warn!("noaa chunk {current}..{year_end} failed: {e}"),
            }
            let Some(next) = NaiveDate::from_ymd_opt(current.year() + 1, 1, 1) else {
                break;
            };
            current = next;
        }

        all.sort_by_key(|r| r.date);
        all.dedup_by_key(|r| r.date);
        Ok(all)
    }
}
