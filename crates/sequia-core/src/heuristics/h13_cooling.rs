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

//! H13 family: borderline-high watch and industrial cooling efficiency.

use super::{Activation, Heuristic, Window, cap, params};
use sequia_types::{Context, ParamValue, Profile, Trend};

/// Borderline conditions drifting worse with a wide runway: watch-level
/// measures aimed mostly at industry.
pub struct BorderlineHigh;

impl BorderlineHigh {
    const WINDOW: Window = Window {
        spi_min: -1.2,
        spi_max: -0.8,
        days_min: Some(20),
        days_max: Some(70),
        trends: &[Trend::Worsening],
    };
}

impl Heuristic for BorderlineHigh {
    fn id(&self) -> &'static str {
        "H13_BORDERLINE"
    }

    fn tag(&self) -> &'static str {
        "H13"
    }

    fn evaluate(&self, ctx: &Context) -> Option<Activation> {
        if !Self::WINDOW.matches(ctx) {
            return None;
        }
        let spi = ctx.spi();

        let mut priority = 45.0 + spi.abs() * 15.0;
        if ctx.days_to_critical.is_some_and(|d| d < 40) {
            priority += 8.0;
        }
        priority += if ctx.profile == Profile::Industry {
            7.0
        } else {
            3.0
        };

        Some(Activation {
            rule_id: self.id(),
            tag: self.tag(),
            priority: cap(priority),
            action_codes: vec![
                "H3_AWARENESS_CAMPAIGN",
                "H1_INDUSTRIAL_AUDIT",
                "H2_LEAK_DETECTION",
            ],
            parameters: params(&[
                ("intensity_level", ParamValue::Text("moderate".to_owned())),
                ("reduction_target_pct", ParamValue::Int(3)),
            ]),
            justification: format!(
                "SPI-6 = {:.2} ({}), worsening slowly. Borderline conditions justify \
                 watch-level audits and awareness before thresholds are crossed.",
                spi, ctx.risk_level
            ),
        })
    }
}

/// A 12-month deficit makes once-through industrial water uneconomic: raise
/// cycles of concentration in cooling towers.
pub struct CoolingTowers;

impl CoolingTowers {
    const SPI_12_THRESHOLD: f64 = -1.5;
    const TARGET_COC: f64 = 5.0;
}

impl Heuristic for CoolingTowers {
    fn id(&self) -> &'static str {
        "H13_COOLING"
    }

    fn tag(&self) -> &'static str {
        "H13"
    }

    fn evaluate(&self, ctx: &Context) -> Option<Activation> {
        let spi_12 = ctx.spi_12?;
        if spi_12 >= Self::SPI_12_THRESHOLD {
            return None;
        }

        let mut priority = 55.0;
        if spi_12 < -2.0 {
            priority += 20.0;
        } else if spi_12 < -1.7 {
            priority += 15.0;
        } else {
            priority += 10.0;
        }
        priority += if ctx.profile == Profile::Industry {
            15.0
        } else {
            5.0
        };
        if ctx.industrial_coc.is_some_and(|coc| coc < Self::TARGET_COC) {
            priority += 5.0;
        }

        Some(Activation {
            rule_id: self.id(),
            tag: self.tag(),
            priority: cap(priority),
            action_codes: vec![
                "H13_COC_MANDATE",
                "H13_INDUSTRIAL_AUDIT",
                "H13_WATER_TREATMENT_UPGRADE",
            ],
            parameters: params(&[("minimum_coc", ParamValue::Int(5))]),
            justification: format!(
                "[TORRES DE ENFRIAMIENTO] SPI-12 = {spi_12:.2}{}. Elevar ciclos de \
                 concentración a >= 5 reduce el consumo industrial hasta 25%.",
                ctx.industrial_coc
                    .map_or_else(String::new, |c| format!(", CoC actual {c:.1}"))
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sequia_types::RiskLevel;

    #[test]
    fn borderline_prefers_industry_profile() {
        let mut c = Context {
            trend: Trend::Worsening,
            risk_level: RiskLevel::Medium,
            spi_6: Some(-1.0),
            days_to_critical: Some(50),
            ..Context::default()
        };
        let gov = BorderlineHigh.evaluate(&c).unwrap();
        c.profile = Profile::Industry;
        let ind = BorderlineHigh.evaluate(&c).unwrap();
        assert!(ind.priority > gov.priority);
    }

    #[test]
    fn cooling_keyed_on_long_scale_only() {
        let mut c = Context {
            spi_6: Some(-0.4),
            spi_12: Some(-1.6),
            ..Context::default()
        };
        assert!(CoolingTowers.evaluate(&c).is_some());
        c.spi_12 = Some(-1.4);
        assert!(CoolingTowers.evaluate(&c).is_none());
        c.spi_12 = None;
        assert!(CoolingTowers.evaluate(&c).is_none());
    }

    #[test]
    fn low_coc_adds_urgency() {
        let mut c = Context {
            spi_12: Some(-1.8),
            ..Context::default()
        };
        let plain = CoolingTowers.evaluate(&c).unwrap();
        c.industrial_coc = Some(3.2);
        let with_coc = CoolingTowers.evaluate(&c).unwrap();
        assert!(with_coc.priority > plain.priority);
        assert!(with_coc.justification.contains("3.2"));
    }
}
