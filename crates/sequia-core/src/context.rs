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

//! Context assembly.
//!
//! Runs the SPI engine once for all six scales and every analyzer over the
//! same daily series, then fuses the outputs with optional external
//! signals into one immutable [`Context`]. An analyzer that cannot produce
//! an output contributes `None` for its fields; nothing here aborts the
//! build.

use crate::analytics::{
    MagnitudeCache, MagnitudeCalculator, MarkovAnalyzer, PhenologyCalendar, SeasonalityDetector,
    StatisticalTrendAnalyzer, TrendAnalyzer,
};
use crate::scenario::CriticalEstimator;
use crate::spi::{MultiScaleSpi, SpiPoint, monthly_totals};
use chrono::NaiveDate;
use sequia_types::{Context, DailyPrecipitation, Profile, RiskLevel, spi_category};
use std::sync::Arc;
use tracing::debug;

/// Scalar inputs the analytics cannot derive from precipitation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExternalSignals {
    pub reservoir_storage_pct: Option<f64>,
    pub demand_capacity_ratio: Option<f64>,
    pub industrial_coc: Option<f64>,
    /// Evaluation date; defaults to today.
    pub ref_date: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct ContextBuilder {
    zone_slug: String,
    profile: Profile,
    multi: MultiScaleSpi,
    trend: TrendAnalyzer,
    stat_trend: StatisticalTrendAnalyzer,
    estimator: CriticalEstimator,
    seasonality: SeasonalityDetector,
    phenology: PhenologyCalendar,
    magnitude_cache: Option<Arc<MagnitudeCache>>,
}

impl ContextBuilder {
    pub fn new(zone_slug: &str, profile: Profile) -> Self {
        Self {
            zone_slug: zone_slug.to_owned(),
            profile,
            multi: MultiScaleSpi::new(),
            trend: TrendAnalyzer::new(),
            stat_trend: StatisticalTrendAnalyzer::new(),
            estimator: CriticalEstimator::new(),
            seasonality: SeasonalityDetector::new(zone_slug),
            phenology: PhenologyCalendar::default(),
            magnitude_cache: None,
        }
    }

    pub fn with_crops(mut self, crops: &[&str]) -> Self {
        self.phenology = PhenologyCalendar::new(crops);
        self
    }

    /// Share a process-wide cache of fitted magnitude populations.
    pub fn with_magnitude_cache(mut self, cache: Arc<MagnitudeCache>) -> Self {
        self.magnitude_cache = Some(cache);
        self
    }

    /// Build the immutable evaluation context. Pure given the same inputs
    /// (including `ref_date`).
    pub fn build(&self, daily: &[DailyPrecipitation], signals: &ExternalSignals) -> Context {
        let ref_date = signals
            .ref_date
            .unwrap_or_else(|| chrono::Utc::now().date_naive());

        let all_scales = self.multi.compute_all(daily);
        let current = self.multi.current(&all_scales);
        let spi_6_series: Vec<f64> = all_scales
            .get(&6)
            .map(|s| s.iter().map(|p| p.spi).collect())
            .unwrap_or_default();
        let spi_3_series: Vec<f64> = all_scales
            .get(&3)
            .map(|s| s.iter().map(|p| p.spi).collect())
            .unwrap_or_default();
        let spi_6_points: &[SpiPoint] = all_scales.get(&6).map_or(&[], Vec::as_slice);

        let spi_6 = current.spi_6;
        let headline = spi_6.unwrap_or(0.0);

        // Basic trend and runway.
        let trend_summary = self.trend.summary(&spi_6_series);
        let days_to_critical = if spi_6_series.is_empty() {
            None
        } else {
            self.estimator
                .days_to_critical(headline, trend_summary.trend, Some(&spi_6_series))
        };

        // Statistical trend needs a minimally useful record.
        let stat = (spi_6_series.len() >= 6).then(|| self.stat_trend.analyze(&spi_6_series));

        // Markov transitions.
        let markov = (spi_6_series.len() >= 12).then(|| {
            let mut analyzer = MarkovAnalyzer::new();
            analyzer.analyze(headline, &spi_6_series)
        });

        // Run-theory magnitude, with the fitted population cached per zone.
        let magnitude = if spi_6_series.is_empty() {
            None
        } else {
            let historical = match self
                .magnitude_cache
                .as_ref()
                .and_then(|c| c.get(&self.zone_slug))
            {
                Some(hist) => hist,
                None => {
                    let mut calc = MagnitudeCalculator::new();
                    calc.fit_historical(&spi_6_series);
                    let hist = calc.historical_magnitudes().to_vec();
                    if let Some(cache) = &self.magnitude_cache {
                        cache.insert(&self.zone_slug, hist.clone());
                    }
                    hist
                }
            };
            Some(MagnitudeCalculator::with_historical(historical).current(&spi_6_series))
        };

        // Seasonality.
        let monthly = monthly_totals(daily);
        let is_dry_season = self.seasonality.is_dry_season(ref_date);
        let wet_season_avg = self.seasonality.wet_season_avg(spi_6_points);
        let wet_season_locked = self.seasonality.wet_season_locked(spi_6_points);
        let seasonal_deficit = self.seasonality.seasonal_deficit(&monthly, ref_date);

        // Phenology.
        let pheno = self.phenology.status(ref_date);

        // Flash-drought category pair from the last two SPI-6 samples.
        let (cat_before, cat_now) = match spi_6_series.as_slice() {
            [.., prev, last] => (Some(spi_category(*prev)), Some(spi_category(*last))),
            [only] => (Some(spi_category(*only)), Some(spi_category(*only))),
            [] => (None, None),
        };

        // Persistence: trailing SPI-3 run below -1.0.
        let consecutive_dry_periods = spi_3_series
            .iter()
            .rev()
            .take_while(|v| **v < -1.0)
            .count() as u32;

        // Scale differential and green-drought flag.
        let scale_differential = self.multi.scale_differential(&current);
        let false_recovery = match (current.spi_1, current.spi_12) {
            (Some(short), Some(long)) => {
                (short - long).abs() > 1.5 && long < -1.0 && short > long
            }
            _ => false,
        };

        // Weather whiplash over the last 12 SPI-6 samples.
        let (weather_whiplash, months_since_wet) = detect_whiplash(&spi_6_series);

        let all_scales_positive_months = self.multi.all_scales_positive_months(&all_scales);

        if spi_6.is_none() {
            debug!(zone = %self.zone_slug, "SPI-6 unavailable; context degrades to defaults");
        }

        Context {
            zone_slug: self.zone_slug.clone(),
            profile: self.profile,
            risk_level: RiskLevel::from_spi(headline),
            trend: trend_summary.trend,
            days_to_critical,
            rapid_deterioration: trend_summary.rapid_deterioration,
            spi_1: current.spi_1,
            spi_3: current.spi_3,
            spi_6: current.spi_6,
            spi_12: current.spi_12,
            spi_24: current.spi_24,
            spi_48: current.spi_48,
            consecutive_dry_periods,
            spi_category_4w_ago: cat_before,
            spi_category_now: cat_now,
            is_dry_season,
            seasonal_deficit_mm: seasonal_deficit,
            seasonal_deficit_threshold_mm: self.seasonality.deficit_threshold_mm(),
            wet_season_avg_spi: wet_season_avg,
            wet_season_locked,
            is_critical_phenological_window: pheno.is_critical,
            crops_affected: pheno.crops_affected,
            phenological_stages: pheno.stages,
            severity_multiplier: pheno.max_severity_multiplier,
            sen_slope_per_month: stat.as_ref().map(|s| s.sen_slope_per_month),
            mk_confidence_pct: stat.as_ref().map(|s| s.mann_kendall.confidence_pct),
            mk_direction: stat.as_ref().map(|s| s.mann_kendall.direction),
            magnitude: magnitude.as_ref().map(|m| m.magnitude),
            magnitude_percentile: magnitude.as_ref().map(|m| m.percentile),
            drought_duration_months: magnitude.as_ref().map_or(0, |m| m.duration_months),
            drought_min_spi: magnitude.as_ref().map(|m| m.min_spi),
            severity_tier: magnitude.as_ref().map(|m| m.tier),
            markov_state: markov.as_ref().map(|m| m.state),
            prob_to_severe: markov.as_ref().map(|m| m.prob_to_severe),
            prob_to_extreme: markov.as_ref().map(|m| m.prob_to_extreme),
            scale_differential,
            false_recovery,
            weather_whiplash,
            months_since_wet,
            industrial_coc: signals.industrial_coc,
            demand_capacity_ratio: signals.demand_capacity_ratio,
            reservoir_storage_pct: signals.reservoir_storage_pct,
            all_scales_positive_months,
        }
    }
}

/// Wet extreme (> 1.5) within the trailing 12 samples followed by a
/// current dry extreme (< -1.5).
fn detect_whiplash(spi_series: &[f64]) -> (bool, Option<u32>) {
    if spi_series.len() < 12 {
        return (false, None);
    }
    let recent = &spi_series[spi_series.len() - 12..];
    let Some(last) = recent.last() else {
        return (false, None);
    };
    if *last >= -1.5 {
        return (false, None);
    }
    let last_wet = recent.iter().rposition(|v| *v > 1.5);
    match last_wet {
        Some(idx) => {
            let months_since = (recent.len() - 1 - idx) as u32;
            (months_since < 12, Some(months_since))
        }
        None => (false, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{synthetic_daily, synthetic_daily_with_dry_tail};
    use chrono::NaiveDate;

    fn signals(date: (i32, u32, u32)) -> ExternalSignals {
        ExternalSignals {
            ref_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2),
            ..ExternalSignals::default()
        }
    }

    #[test]
    fn builder_is_deterministic() {
        let daily = synthetic_daily(15);
        let builder = ContextBuilder::new("cdmx", Profile::Government);
        let s = signals((2004, 7, 15));
        let a = builder.build(&daily, &s);
        let b = builder.build(&daily, &s);
        assert_eq!(format!("{a:?}"), format!("{b:?}"));
    }

    #[test]
    fn all_scales_populated_on_long_record() {
        let daily = synthetic_daily(15);
        let ctx = ContextBuilder::new("cdmx", Profile::Government)
            .build(&daily, &signals((2004, 7, 15)));
        assert!(ctx.spi_1.is_some());
        assert!(ctx.spi_3.is_some());
        assert!(ctx.spi_6.is_some());
        assert!(ctx.spi_12.is_some());
        assert!(ctx.spi_24.is_some());
        assert!(ctx.spi_48.is_some());
        assert_eq!(ctx.risk_level, RiskLevel::from_spi(ctx.spi_6.unwrap()));
        assert!(ctx.mk_confidence_pct.is_some());
        assert!(ctx.prob_to_severe.is_some());
    }

    #[test]
    fn short_record_degrades_without_aborting() {
        let daily = synthetic_daily(1);
        let ctx = ContextBuilder::new("cdmx", Profile::Industry)
            .build(&daily, &signals((1990, 10, 1)));
        assert!(ctx.spi_6.is_none());
        assert!(ctx.sen_slope_per_month.is_none());
        assert!(ctx.markov_state.is_none());
        assert_eq!(ctx.profile, Profile::Industry);
    }

    #[test]
    fn dry_tail_flows_into_persistence_and_magnitude() {
        let daily = synthetic_daily_with_dry_tail(15, 400);
        let ctx = ContextBuilder::new("cdmx", Profile::Government)
            .build(&daily, &signals((2004, 12, 15)));
        assert!(ctx.spi_6.unwrap() < 0.0);
        assert!(ctx.consecutive_dry_periods >= 1);
        assert!(ctx.magnitude_percentile.is_some());
    }

    #[test]
    fn external_signals_pass_through() {
        let daily = synthetic_daily(10);
        let ctx = ContextBuilder::new("monterrey", Profile::Government).build(
            &daily,
            &ExternalSignals {
                reservoir_storage_pct: Some(44.0),
                demand_capacity_ratio: Some(0.97),
                industrial_coc: Some(3.5),
                ref_date: NaiveDate::from_ymd_opt(1999, 3, 1),
            },
        );
        assert_eq!(ctx.reservoir_storage_pct, Some(44.0));
        assert_eq!(ctx.demand_capacity_ratio, Some(0.97));
        assert_eq!(ctx.industrial_coc, Some(3.5));
        assert!(ctx.is_dry_season);
    }

    #[test]
    fn whiplash_detector_window() {
        let mut series = vec![0.0; 10];
        series.extend([1.8, -1.7]);
        let (detected, months) = detect_whiplash(&series);
        assert!(detected);
        assert_eq!(months, Some(1));

        let calm = vec![0.1; 12];
        assert_eq!(detect_whiplash(&calm), (false, None));

        let mut no_wet = vec![-0.2; 11];
        no_wet.push(-1.8);
        assert_eq!(detect_whiplash(&no_wet), (false, None));
    }
}
