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

//! Risk classification over the SPI-6 series.

use crate::analytics::{TrendAnalyzer, TrendSummary};
use crate::error::Result;
use crate::scenario::CriticalEstimator;
use crate::spi::SpiEngine;
use sequia_types::{DailyPrecipitation, RiskLevel, Trend};

/// Assessment result; the ops layer persists it as a `RiskSnapshot`.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskAssessment {
    pub spi_6m: f64,
    pub risk_level: RiskLevel,
    pub trend: Trend,
    pub days_to_critical: Option<u32>,
    pub trend_summary: TrendSummary,
}

#[derive(Debug, Clone, Default)]
pub struct RiskClassifier {
    trend: TrendAnalyzer,
    estimator: CriticalEstimator,
}

impl RiskClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn classify(&self, spi: f64) -> RiskLevel {
        RiskLevel::from_spi(spi)
    }

    /// Full assessment: SPI-6 series, basic trend, days-to-critical.
    pub fn assess(&self, daily: &[DailyPrecipitation]) -> Result<RiskAssessment> {
        let series = SpiEngine::new(6).compute(daily)?;
        let spis: Vec<f64> = series.iter().map(|p| p.spi).collect();
        let current = spis.last().copied().ok_or_else(|| {
            crate::error::EngineError::InsufficientData("empty SPI-6 series".to_owned())
        })?;

        let trend_summary = self.trend.summary(&spis);
        let days_to_critical =
            self.estimator
                .days_to_critical(current, trend_summary.trend, Some(&spis));

        Ok(RiskAssessment {
            spi_6m: current,
            risk_level: self.classify(current),
            trend: trend_summary.trend,
            days_to_critical,
            trend_summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{synthetic_daily, synthetic_daily_with_dry_tail};

    #[test]
    fn classify_matches_boundary_table() {
        let c = RiskClassifier::new();
        assert_eq!(c.classify(0.0), RiskLevel::Low);
        assert_eq!(c.classify(-0.5), RiskLevel::Medium);
        assert_eq!(c.classify(-1.0), RiskLevel::High);
        assert_eq!(c.classify(-1.5), RiskLevel::Critical);
        assert_eq!(c.classify(-2.0), RiskLevel::Critical);
    }

    #[test]
    fn assessment_produces_consistent_fields() {
        let daily = synthetic_daily(15);
        let assessment = RiskClassifier::new().assess(&daily).unwrap();
        assert_eq!(assessment.risk_level, RiskLevel::from_spi(assessment.spi_6m));
        assert_eq!(assessment.trend, assessment.trend_summary.trend);
    }

    #[test]
    fn dry_tail_raises_risk() {
        let wet = RiskClassifier::new()
            .assess(&synthetic_daily(15))
            .unwrap();
        let dry = RiskClassifier::new()
            .assess(&synthetic_daily_with_dry_tail(15, 270))
            .unwrap();
        assert!(dry.spi_6m < wet.spi_6m);
        assert!(dry.risk_level.rank() <= wet.risk_level.rank());
    }

    #[test]
    fn insufficient_history_is_an_error() {
        let daily = synthetic_daily(2);
        assert!(RiskClassifier::new().assess(&daily).is_err());
    }
}
