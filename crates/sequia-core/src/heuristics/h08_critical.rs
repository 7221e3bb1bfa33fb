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

//! H8 family: approach to the critical threshold and the groundwater
//! proxy on multi-year SPI scales.

use super::{Activation, Heuristic, Window, cap, params};
use sequia_types::{Context, ParamValue, Profile, Trend};

/// Worsening conditions just above critical with a shrinking runway:
/// combine restrictions, pressure management and awareness now.
pub struct CriticalApproaching;

impl CriticalApproaching {
    const WINDOW: Window = Window {
        spi_min: -1.85,
        spi_max: -1.5,
        days_min: None,
        days_max: Some(35),
        trends: &[Trend::Worsening],
    };
}

impl Heuristic for CriticalApproaching {
    fn id(&self) -> &'static str {
        "H8_CRITICAL"
    }

    fn tag(&self) -> &'static str {
        "H8"
    }

    fn evaluate(&self, ctx: &Context) -> Option<Activation> {
        if !Self::WINDOW.matches(ctx) {
            return None;
        }
        let spi = ctx.spi();

        let mut priority = 75.0 + (spi.abs() - 1.5) * 15.0;
        match ctx.days_to_critical {
            Some(d) if d < 15 => priority += 15.0,
            Some(d) if d < 25 => priority += 8.0,
            _ => {}
        }
        if ctx.profile == Profile::Government {
            priority += 5.0;
        }

        let days_str = ctx
            .days_to_critical
            .map_or_else(|| "limited time".to_owned(), |d| format!("{d} days"));

        Some(Activation {
            rule_id: self.id(),
            tag: self.tag(),
            priority: cap(priority),
            action_codes: vec![
                "H4_LAWN_BAN",
                "H3_AWARENESS_CAMPAIGN",
                "H2_PRESSURE_REDUCTION",
                "H2_LEAK_DETECTION",
            ],
            parameters: params(&[
                ("hours_allowed_per_day", ParamValue::Int(1)),
                ("compliance_target_pct", ParamValue::Int(85)),
                ("pressure_reduction_pct", ParamValue::Int(12)),
                ("intensity_level", ParamValue::Text("high".to_owned())),
            ]),
            justification: format!(
                "[URGENT] SPI-6 = {:.2} ({}), worsening, {days_str} to critical. Lawn \
                 limits, pressure management, leak detection and awareness together can \
                 add a 5-15 day buffer.",
                spi, ctx.risk_level
            ),
        })
    }
}

/// Multi-year SPI as a groundwater-recharge proxy: a deficit on the 24- or
/// 48-month scale signals aquifer stress no rain shower fixes.
pub struct GroundwaterProxy;

impl GroundwaterProxy {
    const LONG_SCALE_THRESHOLD: f64 = -1.5;
}

impl Heuristic for GroundwaterProxy {
    fn id(&self) -> &'static str {
        "H8_GROUNDWATER"
    }

    fn tag(&self) -> &'static str {
        "H8"
    }

    fn evaluate(&self, ctx: &Context) -> Option<Activation> {
        let hit_24 = ctx.spi_24.is_some_and(|v| v < Self::LONG_SCALE_THRESHOLD);
        let hit_48 = ctx.spi_48.is_some_and(|v| v < Self::LONG_SCALE_THRESHOLD);
        if !hit_24 && !hit_48 {
            return None;
        }

        let worst = ctx
            .spi_24
            .unwrap_or(0.0)
            .min(ctx.spi_48.unwrap_or(0.0));
        let mut priority = 60.0;
        if worst < -2.0 {
            priority += 20.0;
        } else if worst < -1.8 {
            priority += 10.0;
        }
        if hit_24 && hit_48 {
            priority += 5.0;
        }

        let fmt = |v: Option<f64>| v.map_or_else(|| "N/A".to_owned(), |x| format!("{x:.2}"));

        Some(Activation {
            rule_id: self.id(),
            tag: self.tag(),
            priority: cap(priority),
            action_codes: vec![
                "H8_PUMPING_RESTRICTION",
                "H8_AQUIFER_MONITORING",
                "H8_ALTERNATIVE_SOURCES",
            ],
            parameters: params(&[
                ("reduction_pct", ParamValue::Int(20)),
                ("monitoring_frequency", ParamValue::Text("biweekly".to_owned())),
            ]),
            justification: format!(
                "[ACUÍFEROS] SPI-24 = {}, SPI-48 = {}. Déficit de recarga multianual: \
                 proteger acuíferos con restricción de bombeo y monitoreo freático.",
                fmt(ctx.spi_24),
                fmt(ctx.spi_48)
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sequia_types::RiskLevel;

    #[test]
    fn critical_approaching_emits_cross_family_actions() {
        let c = Context {
            trend: Trend::Worsening,
            risk_level: RiskLevel::Critical,
            spi_6: Some(-1.72),
            days_to_critical: Some(24),
            ..Context::default()
        };
        let a = CriticalApproaching.evaluate(&c).unwrap();
        assert!(a.action_codes.contains(&"H4_LAWN_BAN"));
        assert!(a.action_codes.contains(&"H2_PRESSURE_REDUCTION"));
        assert!(a.action_codes.contains(&"H3_AWARENESS_CAMPAIGN"));
        assert!(a.priority >= 85.0);
    }

    #[test]
    fn critical_approaching_window_edges() {
        let mut c = Context {
            trend: Trend::Worsening,
            spi_6: Some(-1.9),
            days_to_critical: Some(20),
            ..Context::default()
        };
        assert!(CriticalApproaching.evaluate(&c).is_none());
        c.spi_6 = Some(-1.85);
        assert!(CriticalApproaching.evaluate(&c).is_some());
        c.days_to_critical = Some(40);
        assert!(CriticalApproaching.evaluate(&c).is_none());
    }

    #[test]
    fn groundwater_fires_on_either_long_scale() {
        let mut c = Context {
            spi_24: Some(-1.6),
            ..Context::default()
        };
        assert!(GroundwaterProxy.evaluate(&c).is_some());
        c.spi_24 = None;
        c.spi_48 = Some(-1.7);
        assert!(GroundwaterProxy.evaluate(&c).is_some());
        c.spi_48 = Some(-1.2);
        assert!(GroundwaterProxy.evaluate(&c).is_none());
    }

    #[test]
    fn compounded_deficit_raises_priority() {
        let single = GroundwaterProxy
            .evaluate(&Context {
                spi_24: Some(-1.6),
                ..Context::default()
            })
            .unwrap();
        let both = GroundwaterProxy
            .evaluate(&Context {
                spi_24: Some(-1.6),
                spi_48: Some(-1.6),
                ..Context::default()
            })
            .unwrap();
        assert!(both.priority > single.priority);
    }
}
