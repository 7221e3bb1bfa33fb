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

//! The immutable evaluation context shared by every heuristic.
//!
//! A `Context` is assembled once per request by the context builder and is
//! read-only afterwards; rules never mutate it and may be evaluated in any
//! order. Absent analyzer outputs are `None`, never sentinel values.

use crate::enums::{DroughtState, MkDirection, Profile, RiskLevel, SeverityTier, Trend};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Context {
    pub zone_slug: String,
    pub profile: Profile,
    pub risk_level: RiskLevel,
    pub trend: Trend,
    pub days_to_critical: Option<u32>,
    /// Last SPI-6 sample dropped by more than 20% of the previous value.
    pub rapid_deterioration: bool,

    // Current SPI at all six scales; a scale is None when its history is
    // too short to fit.
    pub spi_1: Option<f64>,
    pub spi_3: Option<f64>,
    pub spi_6: Option<f64>,
    pub spi_12: Option<f64>,
    pub spi_24: Option<f64>,
    pub spi_48: Option<f64>,

    /// Trailing run of SPI-3 samples below -1.0.
    pub consecutive_dry_periods: u32,
    /// Flash-drought category pair: (previous sample, current sample).
    pub spi_category_4w_ago: Option<u8>,
    pub spi_category_now: Option<u8>,

    pub is_dry_season: bool,
    pub seasonal_deficit_mm: Option<f64>,
    pub seasonal_deficit_threshold_mm: f64,
    pub wet_season_avg_spi: Option<f64>,
    pub wet_season_locked: bool,

    pub is_critical_phenological_window: bool,
    pub crops_affected: Vec<String>,
    pub phenological_stages: Vec<String>,
    pub severity_multiplier: f64,

    pub sen_slope_per_month: Option<f64>,
    pub mk_confidence_pct: Option<f64>,
    pub mk_direction: Option<MkDirection>,

    pub magnitude: Option<f64>,
    pub magnitude_percentile: Option<f64>,
    pub drought_duration_months: u32,
    pub drought_min_spi: Option<f64>,
    pub severity_tier: Option<SeverityTier>,

    pub markov_state: Option<DroughtState>,
    pub prob_to_severe: Option<f64>,
    pub prob_to_extreme: Option<f64>,

    /// |SPI-1 - SPI-12|.
    pub scale_differential: Option<f64>,
    pub false_recovery: bool,

    pub weather_whiplash: bool,
    pub months_since_wet: Option<u32>,

    pub industrial_coc: Option<f64>,
    pub demand_capacity_ratio: Option<f64>,
    pub reservoir_storage_pct: Option<f64>,

    /// Consecutive months with SPI-3, SPI-6 and SPI-12 all positive.
    pub all_scales_positive_months: u32,
}

impl Context {
    /// Headline SPI used by window-based rules. SPI-6, or 0 when unavailable.
    pub fn spi(&self) -> f64 {
        self.spi_6.unwrap_or(0.0)
    }
}

impl Default for Context {
    fn default() -> Self {
        Self {
            zone_slug: String::new(),
            profile: Profile::Government,
            risk_level: RiskLevel::Low,
            trend: Trend::Stable,
            days_to_critical: None,
            rapid_deterioration: false,
            spi_1: None,
            spi_3: None,
            spi_6: None,
            spi_12: None,
            spi_24: None,
            spi_48: None,
            consecutive_dry_periods: 0,
            spi_category_4w_ago: None,
            spi_category_now: None,
            is_dry_season: false,
            seasonal_deficit_mm: None,
            seasonal_deficit_threshold_mm: 50.0,
            wet_season_avg_spi: None,
            wet_season_locked: false,
            is_critical_phenological_window: false,
            crops_affected: Vec::new(),
            phenological_stages: Vec::new(),
            severity_multiplier: 1.0,
            sen_slope_per_month: None,
            mk_confidence_pct: None,
            mk_direction: None,
            magnitude: None,
            magnitude_percentile: None,
            drought_duration_months: 0,
            drought_min_spi: None,
            severity_tier: None,
            markov_state: None,
            prob_to_severe: None,
            prob_to_extreme: None,
            scale_differential: None,
            false_recovery: false,
            weather_whiplash: false,
            months_since_wet: None,
            industrial_coc: None,
            demand_capacity_ratio: None,
            reservoir_storage_pct: None,
            all_scales_positive_months: 0,
        }
    }
}
