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

//! Upstream adapters: Open-Meteo and NOAA precipitation archives, the EIA
//! energy price API, and the OpenAI-compatible completion endpoint. Every
//! client shares the same retry policy and per-request timeout discipline.

pub mod eia;
pub mod errors;
pub mod noaa;
pub mod openai;
pub mod openmeteo;
pub mod retry;

pub use eia::{CurrentPrices, EiaClient, PriceProvider, PriceSource};
pub use errors::{SourceError, SourceResult};
pub use noaa::NoaaClient;
pub use openai::OpenAiClient;
pub use openmeteo::OpenMeteoClient;
pub use retry::RetryPolicy;

use async_trait::async_trait;
use chrono::NaiveDate;
use sequia_types::DailyPrecipitation;

/// Narrow interface the ingestion orchestrator consumes: one daily
/// precipitation window per call, errors reported but non-fatal to the
/// batch.
#[async_trait]
pub trait PrecipitationSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch_daily(
        &self,
        latitude: f64,
        longitude: f64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> SourceResult<Vec<DailyPrecipitation>>;
}
