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

//! Days-to-critical estimation and constant-rate trajectory projection.

use sequia_types::{RiskLevel, Trend};
use serde::{Deserialize, Serialize};

/// Heuristic constants of the scenario engine. Defaults match observed
/// behavior of the production tuning; override for experiments.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioParams {
    pub critical_threshold: f64,
    /// Baseline SPI decline per day before trend multipliers.
    pub base_decline_rate: f64,
    pub worsening_multiplier: f64,
    pub improving_multiplier: f64,
    /// Practical floor for projected SPI.
    pub spi_floor: f64,
    pub days_cap: u32,
    /// SPI improvement contributed per day gained by an action.
    pub spi_per_day_gained: f64,
    /// Days from activation to full action effect.
    pub ramp_days: f64,
}

impl Default for ScenarioParams {
    fn default() -> Self {
        Self {
            critical_threshold: -2.0,
            base_decline_rate: 0.02,
            worsening_multiplier: 1.5,
            improving_multiplier: 0.5,
            spi_floor: -4.0,
            days_cap: 365,
            spi_per_day_gained: 0.02,
            ramp_days: 14.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    pub day: u32,
    pub projected_spi: f64,
    pub risk_level: RiskLevel,
    /// Cumulative action improvement applied to this day; zero on the
    /// no-action trajectory.
    pub improvement_applied: f64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CriticalEstimator {
    params: ScenarioParams,
}

impl CriticalEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(params: ScenarioParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ScenarioParams {
        &self.params
    }

    /// Effective daily decline: base rate times the trend multiplier,
    /// blended with the historical decline rate when a series is supplied.
    pub fn decline_rate(&self, trend: Trend, spi_series: Option<&[f64]>) -> f64 {
        let mut rate = self.params.base_decline_rate
            * match trend {
                Trend::Worsening => self.params.worsening_multiplier,
                Trend::Improving => self.params.improving_multiplier,
                Trend::Stable => 1.0,
            };

        if let Some(series) = spi_series
            && series.len() >= 3
        {
            let historical = historical_daily_decline(series);
            if historical > 0.0 {
                rate = (rate + 2.0 * historical) / 3.0;
            }
        }
        rate
    }

    /// Projected days until SPI-6 crosses the critical threshold.
    ///
    /// `None` means the crossing is not projected: either the zone is
    /// improving from a mild position, or the effective rate is
    /// non-positive.
    pub fn days_to_critical(
        &self,
        current_spi: f64,
        trend: Trend,
        spi_series: Option<&[f64]>,
    ) -> Option<u32> {
        if current_spi <= self.params.critical_threshold {
            return Some(0);
        }
        if trend == Trend::Improving && current_spi > -1.0 {
            return None;
        }

        let rate = self.decline_rate(trend, spi_series);
        if rate <= 0.0 {
            return None;
        }

        let days = ((current_spi - self.params.critical_threshold) / rate).max(0.0) as u32;
        Some(days.min(self.params.days_cap))
    }

    /// Day-by-day projection for `days` days. Zero days yields an empty
    /// trajectory.
    pub fn project_trajectory(
        &self,
        current_spi: f64,
        trend: Trend,
        days: u32,
        spi_series: Option<&[f64]>,
    ) -> Vec<TrajectoryPoint> {
        if days == 0 {
            return Vec::new();
        }
        let rate = self.decline_rate(trend, spi_series);
        let mut out = Vec::with_capacity(days as usize + 1);
        let mut spi = current_spi;
        for day in 0..=days {
            out.push(TrajectoryPoint {
                day,
                projected_spi: spi,
                risk_level: RiskLevel::from_spi(spi),
                improvement_applied: 0.0,
            });
            spi = (spi - rate).max(self.params.spi_floor);
        }
        out
    }

    /// Rough probability of reaching critical within `days_ahead`.
    pub fn critical_probability(&self, current_spi: f64, trend: Trend, days_ahead: u32) -> f64 {
        if current_spi <= self.params.critical_threshold {
            return 1.0;
        }
        let Some(days) = self.days_to_critical(current_spi, trend, None) else {
            return 0.05;
        };
        if days <= days_ahead {
            return 0.9;
        }
        let ratio = f64::from(days_ahead) / f64::from(days);
        let mut prob = 0.1 + 0.8 * ratio;
        match trend {
            Trend::Worsening => prob *= 1.2,
            Trend::Improving => prob *= 0.5,
            Trend::Stable => {}
        }
        prob.clamp(0.0, 1.0)
    }
}

/// Mean absolute negative month-over-month change, scaled to a daily rate.
fn historical_daily_decline(series: &[f64]) -> f64 {
    let declines: Vec<f64> = series
        .windows(2)
        .map(|w| w[1] - w[0])
        .filter(|d| *d < 0.0)
        .collect();
    if declines.is_empty() {
        return 0.0;
    }
    let avg_monthly = declines.iter().map(|d| d.abs()).sum::<f64>() / declines.len() as f64;
    avg_monthly / 30.0
}
