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

//! H6 family: emergency escalation and wet-season failure lock.

use super::{Activation, Heuristic, cap, params};
use sequia_types::{Context, ParamValue, Trend};

/// Rapid deterioration under a worsening trend escalates straight to an
/// emergency declaration.
pub struct SeverityEscalation;

impl Heuristic for SeverityEscalation {
    fn id(&self) -> &'static str {
        "H6_ESCALATION"
    }

    fn tag(&self) -> &'static str {
        "H6"
    }

    fn evaluate(&self, ctx: &Context) -> Option<Activation> {
        if ctx.trend != Trend::Worsening || !ctx.rapid_deterioration {
            return None;
        }
        let spi = ctx.spi();

        let mut priority: f64 = if spi <= -2.5 {
            100.0
        } else if spi <= -2.0 {
            95.0
        } else {
            90.0
        };
        if ctx.days_to_critical.is_some_and(|d| d < 15) {
            priority = (priority + 5.0).min(100.0);
        }

        let level = if spi <= -2.0 { "level_2" } else { "level_1" };

        Some(Activation {
            rule_id: self.id(),
            tag: self.tag(),
            priority: cap(priority),
            action_codes: vec!["H6_EMERGENCY_DECLARATION"],
            parameters: params(&[
                ("emergency_level", ParamValue::Text(level.to_owned())),
                ("duration_days", ParamValue::Int(30)),
            ]),
            justification: format!(
                "SPI-6 = {spi:.2} with rapid deterioration (>20% drop in one sample). \
                 Escalation to a formal water emergency enables special powers and \
                 compounds the effect of every other measure."
            ),
        })
    }
}

/// The rainy season failed to refill the system: once the last completed
/// wet season averages below -1.0, restrictions stay latched until a later
/// season closes at or above zero.
pub struct WetSeasonFailure;

impl WetSeasonFailure {
    const FAILURE_THRESHOLD: f64 = -1.0;
}

impl Heuristic for WetSeasonFailure {
    fn id(&self) -> &'static str {
        "H6_WET_SEASON"
    }

    fn tag(&self) -> &'static str {
        "H6"
    }

    fn evaluate(&self, ctx: &Context) -> Option<Activation> {
        let failed = ctx
            .wet_season_avg_spi
            .is_some_and(|avg| avg < Self::FAILURE_THRESHOLD);
        if !ctx.wet_season_locked && !failed {
            return None;
        }

        let mut priority = 65.0;
        if ctx.wet_season_locked {
            priority += 15.0;
        }
        if let Some(avg) = ctx.wet_season_avg_spi {
            if avg < -1.5 {
                priority += 10.0;
            } else if avg < -1.2 {
                priority += 5.0;
            }
        }

        let avg_str = ctx
            .wet_season_avg_spi
            .map_or_else(|| "n/d".to_owned(), |a| format!("{a:.2}"));

        Some(Activation {
            rule_id: self.id(),
            tag: self.tag(),
            priority: cap(priority),
            action_codes: vec![
                "H6_SUSTAINED_RESTRICTIONS",
                "H6_LONG_TERM_PLANNING",
                "H6_RESERVE_MANAGEMENT",
            ],
            parameters: params(&[("review_period_days", ParamValue::Int(90))]),
            justification: format!(
                "[CERROJO ESTACIONAL] Temporada húmeda fallida (SPI promedio {avg_str}). \
                 Sin recarga estacional el déficit es estructural: mantener restricciones \
                 hasta una temporada húmeda exitosa."
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escalation_needs_rapid_drop_and_worsening() {
        let mut c = Context {
            trend: Trend::Worsening,
            spi_6: Some(-1.6),
            ..Context::default()
        };
        assert!(SeverityEscalation.evaluate(&c).is_none());
        c.rapid_deterioration = true;
        let a = SeverityEscalation.evaluate(&c).unwrap();
        assert!(a.priority >= 90.0);
        c.trend = Trend::Stable;
        assert!(SeverityEscalation.evaluate(&c).is_none());
    }

    #[test]
    fn escalation_level_scales_with_spi() {
        let mut c = Context {
            trend: Trend::Worsening,
            rapid_deterioration: true,
            spi_6: Some(-2.2),
            ..Context::default()
        };
        let a = SeverityEscalation.evaluate(&c).unwrap();
        assert_eq!(
            a.parameters.get("emergency_level"),
            Some(&ParamValue::Text("level_2".to_owned()))
        );
        c.spi_6 = Some(-2.6);
        assert_eq!(SeverityEscalation.evaluate(&c).unwrap().priority, 100.0);
    }

    #[test]
    fn wet_season_lock_is_sticky() {
        let mut c = Context {
            wet_season_locked: true,
            // Current season looks fine, but the latch holds.
            wet_season_avg_spi: Some(-0.4),
            ..Context::default()
        };
        let a = WetSeasonFailure.evaluate(&c).unwrap();
        assert!(a.priority >= 80.0);
        c.wet_season_locked = false;
        assert!(WetSeasonFailure.evaluate(&c).is_none());
    }

    #[test]
    fn fresh_failure_activates_without_latch() {
        let c = Context {
            wet_season_avg_spi: Some(-1.3),
            ..Context::default()
        };
        let a = WetSeasonFailure.evaluate(&c).unwrap();
        assert!(a.justification.contains("-1.30"));
    }
}
