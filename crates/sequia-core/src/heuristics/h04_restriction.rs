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

//! H4 family: non-essential use restrictions and phenological crop stress.

use super::{Activation, Heuristic, Window, cap, params};
use sequia_types::{Context, ParamValue, Profile, Trend};

/// Mandatory restrictions on lawns, car washes, pools and fountains once
/// the drought is severe and the runway short. Non-essential uses are 5-8%
/// of urban consumption.
pub struct NonessentialRestriction;

impl NonessentialRestriction {
    const WINDOW: Window = Window {
        spi_min: f64::NEG_INFINITY,
        spi_max: -1.8,
        days_min: None,
        days_max: Some(30),
        trends: &[Trend::Worsening],
    };
}

impl Heuristic for NonessentialRestriction {
    fn id(&self) -> &'static str {
        "H4_RESTRICTION"
    }

    fn tag(&self) -> &'static str {
        "H4"
    }

    fn evaluate(&self, ctx: &Context) -> Option<Activation> {
        if !Self::WINDOW.matches(ctx) {
            return None;
        }
        let spi = ctx.spi();

        let mut priority = 70.0 + (spi.abs() - 1.8) * 20.0 + 5.0;
        priority += if ctx.profile == Profile::Government {
            5.0
        } else {
            10.0
        };
        match ctx.days_to_critical {
            Some(d) if d < 15 => priority += 15.0,
            Some(d) if d < 20 => priority += 10.0,
            Some(d) if d < 25 => priority += 5.0,
            _ => {}
        }

        // Restriction depth scales with how little runway remains.
        let parameters = match ctx.days_to_critical {
            Some(d) if d < 15 => params(&[
                ("hours_allowed_per_day", ParamValue::Int(0)),
                ("days_per_week", ParamValue::Int(1)),
                ("compliance_target_pct", ParamValue::Int(95)),
                ("commercial_days_allowed", ParamValue::Int(2)),
                ("home_wash_ban", ParamValue::Flag(true)),
                ("pool_types_affected", ParamValue::Text("all".to_owned())),
                ("scope", ParamValue::Text("all".to_owned())),
            ]),
            Some(d) if d < 25 => params(&[
                ("hours_allowed_per_day", ParamValue::Int(1)),
                ("days_per_week", ParamValue::Int(2)),
                ("compliance_target_pct", ParamValue::Int(85)),
                ("commercial_days_allowed", ParamValue::Int(3)),
                ("home_wash_ban", ParamValue::Flag(true)),
                ("pool_types_affected", ParamValue::Text("private".to_owned())),
                ("scope", ParamValue::Text("all".to_owned())),
            ]),
            _ => params(&[
                ("hours_allowed_per_day", ParamValue::Int(2)),
                ("days_per_week", ParamValue::Int(2)),
                ("compliance_target_pct", ParamValue::Int(80)),
                ("commercial_days_allowed", ParamValue::Int(4)),
                ("home_wash_ban", ParamValue::Flag(true)),
                ("pool_types_affected", ParamValue::Text("private".to_owned())),
                ("scope", ParamValue::Text("commercial_only".to_owned())),
            ]),
        };

        let days_str = ctx
            .days_to_critical
            .map_or_else(|| "limited time".to_owned(), |d| format!("{d} days"));
        let urgency = if ctx.days_to_critical.is_some_and(|d| d < 20) {
            "URGENT"
        } else {
            "HIGH PRIORITY"
        };

        Some(Activation {
            rule_id: self.id(),
            tag: self.tag(),
            priority: cap(priority),
            action_codes: vec![
                "H4_LAWN_BAN",
                "H4_CARWASH_RESTRICTION",
                "H4_POOL_RESTRICTION",
                "H4_FOUNTAIN_SHUTDOWN",
            ],
            parameters,
            justification: format!(
                "[{urgency}] SPI-6 = {:.2} ({}), worsening with only {days_str} to critical. \
                 Non-essential restrictions extend supply: 1% of demand removed = +1.3 days.",
                spi, ctx.risk_level
            ),
        })
    }
}

/// Phenological stress: the same meteorological deficit is far more
/// damaging inside a critical crop window, so the activation keys on SPI-3
/// or SPI-6 rather than the headline scale alone.
pub struct PhenologicalStress;

impl PhenologicalStress {
    const SPI_THRESHOLD: f64 = -1.5;
}

impl Heuristic for PhenologicalStress {
    fn id(&self) -> &'static str {
        "H4_PHENOLOGY"
    }

    fn tag(&self) -> &'static str {
        "H4"
    }

    fn evaluate(&self, ctx: &Context) -> Option<Activation> {
        if !ctx.is_critical_phenological_window {
            return None;
        }
        let spi_3_hit = ctx.spi_3.is_some_and(|s| s < Self::SPI_THRESHOLD);
        let spi_6_hit = ctx.spi_6.is_some_and(|s| s < Self::SPI_THRESHOLD);
        if !spi_3_hit && !spi_6_hit {
            return None;
        }

        let mut priority = 70.0 + (ctx.severity_multiplier - 1.0) * 40.0;
        let worst = ctx
            .spi_3
            .unwrap_or(0.0)
            .min(ctx.spi_6.unwrap_or(0.0));
        if worst < -2.0 {
            priority += 10.0;
        }

        let crops = if ctx.crops_affected.is_empty() {
            "cultivos monitoreados".to_owned()
        } else {
            ctx.crops_affected.join(", ")
        };

        Some(Activation {
            rule_id: self.id(),
            tag: self.tag(),
            priority: cap(priority),
            action_codes: vec![
                "H4_AGRICULTURAL_ALERT",
                "H4_IRRIGATION_PRIORITY",
                "H4_CROP_INSURANCE_ACTIVATION",
            ],
            parameters: params(&[
                (
                    "crops",
                    ParamValue::Text(
                        ctx.crops_affected
                            .first()
                            .cloned()
                            .unwrap_or_else(|| "maiz".to_owned()),
                    ),
                ),
                ("allocation_pct", ParamValue::Int(25)),
            ]),
            justification: format!(
                "[ESTRÉS FENOLÓGICO] SPI = {worst:.2} durante ventana crítica ({crops}; \
                 multiplicador {:.1}). Estrés hídrico en esta etapa causa pérdidas de \
                 rendimiento desproporcionadas.",
                ctx.severity_multiplier
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
    fn restriction_boundary_is_closed_at_minus_one_eight() {
        let mut c = ctx();
        c.spi_6 = Some(-1.8);
        c.days_to_critical = Some(20);
        assert!(NonessentialRestriction.evaluate(&c).is_some());
        c.spi_6 = Some(-1.79);
        assert!(NonessentialRestriction.evaluate(&c).is_none());
    }

    #[test]
    fn restriction_depth_scales_with_urgency() {
        let mut c = ctx();
        c.spi_6 = Some(-2.1);
        c.days_to_critical = Some(10);
        let severe = NonessentialRestriction.evaluate(&c).unwrap();
        assert_eq!(
            severe.parameters.get("hours_allowed_per_day"),
            Some(&ParamValue::Int(0))
        );
        c.days_to_critical = Some(28);
        let baseline = NonessentialRestriction.evaluate(&c).unwrap();
        assert_eq!(
            baseline.parameters.get("hours_allowed_per_day"),
            Some(&ParamValue::Int(2))
        );
        assert!(severe.priority > baseline.priority);
    }

    #[test]
    fn phenology_needs_window_and_deficit() {
        let mut c = ctx();
        c.spi_3 = Some(-1.6);
        assert!(PhenologicalStress.evaluate(&c).is_none());
        c.is_critical_phenological_window = true;
        c.severity_multiplier = 1.5;
        c.crops_affected = vec!["maiz".to_owned()];
        let a = PhenologicalStress.evaluate(&c).unwrap();
        assert!(a.priority >= 90.0);
        assert_eq!(a.parameters.get("crops"), Some(&ParamValue::Text("maiz".to_owned())));
    }

    #[test]
    fn phenology_ignores_mild_windows() {
        let mut c = ctx();
        c.is_critical_phenological_window = true;
        c.spi_3 = Some(-1.2);
        c.spi_6 = Some(-1.4);
        assert!(PhenologicalStress.evaluate(&c).is_none());
    }
}
