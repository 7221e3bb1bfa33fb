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

//! H15 family: full emergency at exceptional SPI, and the step-down
//! protocol once every scale has recovered.

use super::{Activation, Heuristic, Window, cap, params};
use sequia_types::{Context, ParamValue, Trend};

/// Exceptional drought, any trend: everything at once.
pub struct ExtremeLastChance;

impl ExtremeLastChance {
    const WINDOW: Window = Window {
        spi_min: f64::NEG_INFINITY,
        spi_max: -2.0,
        days_min: None,
        days_max: None,
        trends: &[Trend::Improving, Trend::Stable, Trend::Worsening],
    };
}

impl Heuristic for ExtremeLastChance {
    fn id(&self) -> &'static str {
        "H15_EXTREME"
    }

    fn tag(&self) -> &'static str {
        "H15"
    }

    fn evaluate(&self, ctx: &Context) -> Option<Activation> {
        if !Self::WINDOW.matches(ctx) {
            return None;
        }
        let spi = ctx.spi();

        let mut priority: f64 = if spi < -2.5 { 100.0 } else { 95.0 };
        if ctx.days_to_critical.is_some_and(|d| d < 15) {
            priority = (priority + 5.0).min(100.0);
        }

        Some(Activation {
            rule_id: self.id(),
            tag: self.tag(),
            priority: cap(priority),
            action_codes: vec![
                "H6_EMERGENCY_DECLARATION",
                "H5_EMERGENCY_WELLS",
                "H5_TANKER_DEPLOYMENT",
                "H4_LAWN_BAN",
                "H4_CARWASH_RESTRICTION",
                "H4_POOL_RESTRICTION",
                "H4_FOUNTAIN_SHUTDOWN",
                "H3_AWARENESS_CAMPAIGN",
            ],
            parameters: params(&[
                ("emergency_level", ParamValue::Text("level_3".to_owned())),
                ("duration_days", ParamValue::Int(60)),
                ("intensity_level", ParamValue::Text("emergency".to_owned())),
            ]),
            justification: format!(
                "[EXTREME] SPI-6 = {spi:.2}, exceptionally dry. Full emergency response: \
                 wells, tankers, all restrictions and a formal declaration. Conditions \
                 exceed every normal threshold."
            ),
        })
    }
}

/// Recovery confirmed on SPI-3/6/12 for at least two consecutive months:
/// start the phased relaxation rather than dropping everything at once.
pub struct StepdownRecovery;

impl StepdownRecovery {
    const MONTHS_REQUIRED: u32 = 2;
}

impl Heuristic for StepdownRecovery {
    fn id(&self) -> &'static str {
        "H15_STEPDOWN"
    }

    fn tag(&self) -> &'static str {
        "H15"
    }

    fn evaluate(&self, ctx: &Context) -> Option<Activation> {
        let all_positive = ctx.spi_3.is_some_and(|v| v > 0.0)
            && ctx.spi_6.is_some_and(|v| v > 0.0)
            && ctx.spi_12.is_some_and(|v| v > 0.0);
        if !all_positive || ctx.all_scales_positive_months < Self::MONTHS_REQUIRED {
            return None;
        }

        let mut priority = 40.0;
        priority += if ctx.all_scales_positive_months >= 4 {
            15.0
        } else if ctx.all_scales_positive_months >= 3 {
            10.0
        } else {
            5.0
        };
        let weakest = ctx
            .spi_3
            .unwrap_or(0.0)
            .min(ctx.spi_6.unwrap_or(0.0))
            .min(ctx.spi_12.unwrap_or(0.0));
        if weakest > 0.5 {
            priority += 10.0;
        }

        Some(Activation {
            rule_id: self.id(),
            tag: self.tag(),
            priority: cap(priority),
            action_codes: vec![
                "H15_PHASED_RELAXATION",
                "H15_RECOVERY_MONITORING",
                "H15_PUBLIC_ANNOUNCEMENT",
            ],
            parameters: params(&[("phase_duration_days", ParamValue::Int(30))]),
            justification: format!(
                "[RECUPERACIÓN] SPI-3/6/12 positivos por {} meses consecutivos. Iniciar \
                 relajación escalonada: recreativo, riego y por último industrial.",
                ctx.all_scales_positive_months
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extreme_activates_on_any_trend() {
        for trend in [Trend::Improving, Trend::Stable, Trend::Worsening] {
            let c = Context {
                trend,
                spi_6: Some(-2.1),
                ..Context::default()
            };
            let a = ExtremeLastChance.evaluate(&c).unwrap();
            assert!(a.priority >= 95.0);
            assert!(a.action_codes.contains(&"H5_EMERGENCY_WELLS"));
        }
    }

    #[test]
    fn extreme_boundary_is_closed() {
        let mut c = Context {
            spi_6: Some(-2.0),
            ..Context::default()
        };
        assert!(ExtremeLastChance.evaluate(&c).is_some());
        c.spi_6 = Some(-1.99);
        assert!(ExtremeLastChance.evaluate(&c).is_none());
    }

    #[test]
    fn stepdown_needs_two_positive_months_on_all_scales() {
        let mut c = Context {
            spi_3: Some(0.4),
            spi_6: Some(0.3),
            spi_12: Some(0.2),
            all_scales_positive_months: 1,
            ..Context::default()
        };
        assert!(StepdownRecovery.evaluate(&c).is_none());
        c.all_scales_positive_months = 2;
        assert!(StepdownRecovery.evaluate(&c).is_some());
        c.spi_12 = Some(-0.1);
        assert!(StepdownRecovery.evaluate(&c).is_none());
    }

    #[test]
    fn sustained_recovery_raises_confidence() {
        let mut c = Context {
            spi_3: Some(0.8),
            spi_6: Some(0.7),
            spi_12: Some(0.6),
            all_scales_positive_months: 2,
            ..Context::default()
        };
        let early = StepdownRecovery.evaluate(&c).unwrap();
        c.all_scales_positive_months = 5;
        let later = StepdownRecovery.evaluate(&c).unwrap();
        assert!(later.priority > early.priority);
    }
}
