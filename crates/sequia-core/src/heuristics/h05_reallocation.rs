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

//! H5 family: emergency source reallocation and statistical trend alerts.

use super::{Activation, Heuristic, Window, cap, params};
use sequia_types::{Context, MkDirection, ParamValue, Trend};

/// Emergency supply measures at extreme SPI with a 15-30 day runway:
/// backup wells, tankers, inter-basin transfers.
pub struct SourceReallocation;

impl SourceReallocation {
    const WINDOW: Window = Window {
        spi_min: f64::NEG_INFINITY,
        spi_max: -2.0,
        days_min: Some(15),
        days_max: Some(30),
        trends: &[Trend::Stable, Trend::Worsening],
    };
}

impl Heuristic for SourceReallocation {
    fn id(&self) -> &'static str {
        "H5_REALLOCATION"
    }

    fn tag(&self) -> &'static str {
        "H5"
    }

    fn evaluate(&self, ctx: &Context) -> Option<Activation> {
        if !Self::WINDOW.matches(ctx) {
            return None;
        }
        let spi = ctx.spi();

        let mut priority = 80.0 + (spi.abs() - 2.0) * 10.0;
        if ctx.trend == Trend::Worsening {
            priority += 5.0;
        }
        priority += 5.0;
        match ctx.days_to_critical {
            Some(d) if d < 20 => priority += 10.0,
            Some(d) if d < 25 => priority += 5.0,
            _ => {}
        }

        Some(Activation {
            rule_id: self.id(),
            tag: self.tag(),
            priority: cap(priority),
            action_codes: vec![
                "H5_EMERGENCY_WELLS",
                "H5_TANKER_DEPLOYMENT",
                "H5_INTERBASIN_TRANSFER",
            ],
            parameters: params(&[
                ("wells_to_activate", ParamValue::Int(3)),
                ("extraction_rate_pct_of_max", ParamValue::Int(75)),
                ("tankers_count", ParamValue::Int(30)),
                ("priority_areas", ParamValue::Text("hospitals".to_owned())),
            ]),
            justification: format!(
                "SPI-6 = {:.2} ({}): exceptional drought with a short runway. Emergency \
                 source reallocation is warranted; a 5% supply increase buys +5 days.",
                spi, ctx.risk_level
            ),
        })
    }
}

/// Statistically confirmed degradation: Sen slope at or below -0.1
/// SPI/month with Mann-Kendall confidence of 90% or better. Acts before
/// any threshold is crossed.
pub struct TrendPrediction;

impl TrendPrediction {
    const SEN_SLOPE_THRESHOLD: f64 = -0.1;
    const CONFIDENCE_THRESHOLD_PCT: f64 = 90.0;
}

impl Heuristic for TrendPrediction {
    fn id(&self) -> &'static str {
        "H5_TREND"
    }

    fn tag(&self) -> &'static str {
        "H5"
    }

    fn evaluate(&self, ctx: &Context) -> Option<Activation> {
        let slope = ctx.sen_slope_per_month?;
        let confidence = ctx.mk_confidence_pct?;
        if slope > Self::SEN_SLOPE_THRESHOLD
            || confidence < Self::CONFIDENCE_THRESHOLD_PCT
            || ctx.mk_direction != Some(MkDirection::Decreasing)
        {
            return None;
        }

        let mut priority = 60.0 + (slope.abs() * 50.0).min(20.0);
        if confidence > 95.0 {
            priority += 10.0;
        } else {
            priority += 5.0;
        }
        if ctx.spi() < -1.0 {
            priority += 10.0;
        }

        let restriction_level = if slope < -0.2 {
            "mandatory"
        } else if slope < -0.15 {
            "recommended"
        } else {
            "voluntary"
        };

        Some(Activation {
            rule_id: self.id(),
            tag: self.tag(),
            priority: cap(priority),
            action_codes: vec![
                "H5_TREND_ALERT",
                "H5_SCENARIO_PROJECTION",
                "H5_PREEMPTIVE_RESTRICTIONS",
            ],
            parameters: params(&[
                ("restriction_level", ParamValue::Text(restriction_level.to_owned())),
                ("projection_months", ParamValue::Int(6)),
            ]),
            justification: format!(
                "[TENDENCIA CONFIRMADA] Sen slope = {slope:.3} SPI/mes (Mann-Kendall \
                 {confidence:.0}% confianza). Proyección a 3 meses: {:.2} unidades SPI de \
                 deterioro; iniciar medidas preventivas.",
                (slope * 3.0).abs()
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sequia_types::RiskLevel;

    fn ctx() -> Context {
        Context {
            trend: Trend::Worsening,
            risk_level: RiskLevel::Critical,
            ..Context::default()
        }
    }

    #[test]
    fn reallocation_window_requires_extreme_spi() {
        let mut c = ctx();
        c.spi_6 = Some(-2.0);
        c.days_to_critical = Some(20);
        assert!(SourceReallocation.evaluate(&c).is_some());
        c.spi_6 = Some(-1.9);
        assert!(SourceReallocation.evaluate(&c).is_none());
    }

    #[test]
    fn reallocation_priority_is_emergency_grade() {
        let mut c = ctx();
        c.spi_6 = Some(-2.4);
        c.days_to_critical = Some(16);
        let a = SourceReallocation.evaluate(&c).unwrap();
        assert!(a.priority >= 90.0);
    }

    #[test]
    fn trend_rule_requires_all_three_signals() {
        let mut c = ctx();
        c.sen_slope_per_month = Some(-0.15);
        c.mk_confidence_pct = Some(95.0);
        assert!(TrendPrediction.evaluate(&c).is_none());
        c.mk_direction = Some(MkDirection::Decreasing);
        assert!(TrendPrediction.evaluate(&c).is_some());
        c.mk_confidence_pct = Some(85.0);
        assert!(TrendPrediction.evaluate(&c).is_none());
        c.mk_confidence_pct = Some(95.0);
        c.sen_slope_per_month = Some(-0.05);
        assert!(TrendPrediction.evaluate(&c).is_none());
    }

    #[test]
    fn boundary_slope_activates() {
        let mut c = ctx();
        c.sen_slope_per_month = Some(-0.1);
        c.mk_confidence_pct = Some(92.0);
        c.mk_direction = Some(MkDirection::Decreasing);
        let a = TrendPrediction.evaluate(&c).unwrap();
        assert_eq!(
            a.parameters.get("restriction_level"),
            Some(&ParamValue::Text("voluntary".to_owned()))
        );
    }

    #[test]
    fn steep_slopes_mandate_restrictions() {
        let mut c = ctx();
        c.sen_slope_per_month = Some(-0.3);
        c.mk_confidence_pct = Some(97.0);
        c.mk_direction = Some(MkDirection::Decreasing);
        let a = TrendPrediction.evaluate(&c).unwrap();
        assert_eq!(
            a.parameters.get("restriction_level"),
            Some(&ParamValue::Text("mandatory".to_owned()))
        );
    }
}
