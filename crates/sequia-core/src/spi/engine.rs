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

//! Single-scale SPI computation from daily precipitation.
//!
//! Pipeline: aggregate to monthly totals, form the k-month rolling sum
//! ending at each month, fit a zero-inflated gamma per calendar month
//! across years, and transform each sum through the mixed CDF and the
//! inverse standard normal.

use super::gamma::GammaParams;
use crate::error::{EngineError, Result};
use chrono::Datelike;
use sequia_types::DailyPrecipitation;
use std::collections::BTreeMap;
use tracing::warn;

/// Fewer distinct post-rolling years than this and the scale is refused.
const MIN_YEARS_HARD: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthlyTotal {
    pub year: i32,
    pub month: u32,
    pub total_mm: f64,
}

/// One SPI observation. At most one per (scale, year, month).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpiPoint {
    pub year: i32,
    pub month: u32,
    pub precip_sum_mm: f64,
    pub spi: f64,
}

/// Aggregate a daily series to calendar-month totals, ascending.
pub fn monthly_totals(daily: &[DailyPrecipitation]) -> Vec<MonthlyTotal> {
    let mut by_month: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    for rec in daily {
        *by_month
            .entry((rec.date.year(), rec.date.month()))
            .or_insert(0.0) += rec.value_mm;
    }
    by_month
        .into_iter()
        .map(|((year, month), total_mm)| MonthlyTotal {
            year,
            month,
            total_mm,
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct SpiEngine {
    scale_months: usize,
    min_years: usize,
}

impl SpiEngine {
    /// Default recommended record length is 30 years; shorter records are
    /// fitted anyway with a warning, down to the hard five-year floor.
    pub fn new(scale_months: usize) -> Self {
        Self {
            scale_months,
            min_years: 30,
        }
    }

    pub fn with_min_years(mut self, min_years: usize) -> Self {
        self.min_years = min_years;
        self
    }

    pub fn scale_months(&self) -> usize {
        self.scale_months
    }

    /// Compute the full SPI series for this scale.
    pub fn compute(&self, daily: &[DailyPrecipitation]) -> Result<Vec<SpiPoint>> {
        if self.scale_months == 0 {
            return Err(EngineError::InvalidInput(
                "scale_months must be positive".to_owned(),
            ));
        }
        if daily.iter().any(|r| r.value_mm < 0.0) {
            return Err(EngineError::InvalidInput(
                "negative precipitation value".to_owned(),
            ));
        }

        let monthly = monthly_totals(daily);
        let rolled = self.rolling_sums(&monthly);
        if rolled.is_empty() {
            return Err(EngineError::InsufficientData(format!(
                "need at least {} months of precipitation for SPI-{}",
                self.scale_months, self.scale_months
            )));
        }

        let years: std::collections::BTreeSet<i32> = rolled.iter().map(|p| p.year).collect();
        if years.len() < MIN_YEARS_HARD {
            return Err(EngineError::InsufficientData(format!(
                "SPI-{} requires {} years of data, found {}",
                self.scale_months,
                MIN_YEARS_HARD,
                years.len()
            )));
        }
        if years.len() < self.min_years {
            warn!(
                scale = self.scale_months,
                years = years.len(),
                recommended = self.min_years,
                "fitting SPI on a short record"
            );
        }

        let mut points = Vec::with_capacity(rolled.len());
        for calendar_month in 1..=12u32 {
            let month_points: Vec<&MonthlyTotal> =
                rolled.iter().filter(|p| p.month == calendar_month).collect();
            if month_points.is_empty() {
                continue;
            }
            let values: Vec<f64> = month_points.iter().map(|p| p.total_mm).collect();
            let params = GammaParams::fit(&values)?;
            for p in month_points {
                let spi = params.spi(p.total_mm)?;
                points.push(SpiPoint {
                    year: p.year,
                    month: p.month,
                    precip_sum_mm: p.total_mm,
                    spi,
                });
            }
        }

        points.sort_by_key(|p| (p.year, p.month));
        Ok(points)
    }

    /// Most recent SPI value for this scale.
    pub fn current(&self, daily: &[DailyPrecipitation]) -> Result<f64> {
        let series = self.compute(daily)?;
        series
            .last()
            .map(|p| p.spi)
            .ok_or_else(|| EngineError::InsufficientData("empty SPI series".to_owned()))
    }

    /// k-month rolling sums; months before the first full window are skipped.
    fn rolling_sums(&self, monthly: &[MonthlyTotal]) -> Vec<MonthlyTotal> {
        if monthly.len() < self.scale_months {
            return Vec::new();
        }
        let mut out = Vec::with_capacity(monthly.len() - self.scale_months + 1);
        for end in (self.scale_months - 1)..monthly.len() {
            let window = &monthly[end + 1 - self.scale_months..=end];
            let sum: f64 = window.iter().map(|m| m.total_mm).sum();
            out.push(MonthlyTotal {
                year: monthly[end].year,
                month: monthly[end].month,
                total_mm: sum,
            });
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::synthetic_daily;

    #[test]
    fn one_point_per_year_month() {
        let daily = synthetic_daily(12);
        let series = SpiEngine::new(6).compute(&daily).unwrap();
        let mut seen = std::collections::BTreeSet::new();
        for p in &series {
            assert!(seen.insert((p.year, p.month)), "duplicate {}-{}", p.year, p.month);
        }
        assert!(!series.is_empty());
    }

    #[test]
    fn short_windows_are_skipped() {
        let daily = synthetic_daily(12);
        let monthly = monthly_totals(&daily);
        let series = SpiEngine::new(6).compute(&daily).unwrap();
        // First five months have no complete 6-month window.
        assert_eq!(series.len(), monthly.len() - 5);
    }

    #[test]
    fn refuses_under_five_years() {
        let daily = synthetic_daily(3);
        let err = SpiEngine::new(6).compute(&daily);
        assert!(matches!(err, Err(EngineError::InsufficientData(_))));
    }

    #[test]
    fn rejects_negative_values() {
        let mut daily = synthetic_daily(8);
        daily[10].value_mm = -1.0;
        assert!(matches!(
            SpiEngine::new(1).compute(&daily),
            Err(EngineError::InvalidInput(_))
        ));
    }

    #[test]
    fn spi_values_are_standardized() {
        let daily = synthetic_daily(20);
        let series = SpiEngine::new(6).compute(&daily).unwrap();
        let mean: f64 = series.iter().map(|p| p.spi).sum::<f64>() / series.len() as f64;
        // Roughly standard normal: the mean of the fitted series stays near 0.
        assert!(mean.abs() < 0.35, "mean = {mean}");
        assert!(series.iter().all(|p| p.spi.is_finite()));
    }

    #[test]
    fn scaling_rainfall_leaves_spi_unchanged() {
        let daily = synthetic_daily(15);
        let doubled: Vec<DailyPrecipitation> = daily
            .iter()
            .map(|r| DailyPrecipitation {
                date: r.date,
                value_mm: r.value_mm * 2.0,
            })
            .collect();
        let a = SpiEngine::new(6).compute(&daily).unwrap();
        let b = SpiEngine::new(6).compute(&doubled).unwrap();
        assert_eq!(a.len(), b.len());
        let max_delta = a
            .iter()
            .zip(&b)
            .map(|(x, y)| (x.spi - y.spi).abs())
            .fold(0.0f64, f64::max);
        assert!(max_delta < 1e-9, "max delta = {max_delta}");
    }
}
