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

//! H14 family: improving-phase maintenance and infrastructure defense
//! under long-term extreme deficit.

use super::{Activation, Heuristic, Window, cap, params};
use sequia_types::{Context, ParamValue, Profile, Trend};

/// Recovery under way but the drought is not over: keep light-touch
/// communication alive so conservation habits survive the rebound.
pub struct ImprovingMaintenance;

impl ImprovingMaintenance {
    const WINDOW: Window = Window {
        spi_min: -1.5,
        spi_max: -0.5,
        days_min: None,
        days_max: None,
        trends: &[Trend::Improving],
    };
}

impl Heuristic for ImprovingMaintenance {
    fn id(&self) -> &'static str {
        "H14_IMPROVING"
    }

    fn tag(&self) -> &'static str {
        "H14"
    }

    fn evaluate(&self, ctx: &Context) -> Option<Activation> {
        if !Self::WINDOW.matches(ctx) {
            return None;
        }
        let spi = ctx.spi();

        let mut priority = 30.0 + spi.abs() * 10.0;
        if spi < -1.0 {
            priority += 10.0;
        }
        if ctx.profile == Profile::Government {
            priority += 5.0;
        }

        Some(Activation {
            rule_id: self.id(),
            tag: self.tag(),
            priority: cap(priority),
            action_codes: vec!["H3_AWARENESS_CAMPAIGN", "H3_HOTLINE_LAUNCH"],
            parameters: params(&[(
                "intensity_level",
                ParamValue::Text("moderate".to_owned()),
            )]),
            justification: format!(
                "SPI-6 = {spi:.2}, improving. Conditions are recovering but still dry; \
                 maintained communication prevents an early return to old habits."
            ),
        })
    }
}

/// Long-term extreme deficit with the system running near capacity: defend
/// the network itself with pressure and demand management.
pub struct InfrastructureDefense;

impl InfrastructureDefense {
    const SPI_24_THRESHOLD: f64 = -2.0;
    const DEMAND_CAPACITY_THRESHOLD: f64 = 0.90;
}

impl Heuristic for InfrastructureDefense {
    fn id(&self) -> &'static str {
        "H14_INFRA"
    }

    fn tag(&self) -> &'static str {
        "H14"
    }

    fn evaluate(&self, ctx: &Context) -> Option<Activation> {
        let spi_24 = ctx.spi_24?;
        let ratio = ctx.demand_capacity_ratio?;
        if spi_24 >= Self::SPI_24_THRESHOLD || ratio <= Self::DEMAND_CAPACITY_THRESHOLD {
            return None;
        }

        let mut priority = 70.0 + ((ratio - 0.9) * 150.0).clamp(0.0, 15.0);
        if spi_24 < -2.5 {
            priority += 10.0;
        }

        Some(Activation {
            rule_id: self.id(),
            tag: self.tag(),
            priority: cap(priority),
            action_codes: vec![
                "H14_NIGHT_PRESSURE_REDUCTION",
                "H14_DEMAND_MANAGEMENT",
                "H14_INFRASTRUCTURE_PROTECTION",
            ],
            parameters: params(&[("pressure_reduction_pct", ParamValue::Int(20))]),
            justification: format!(
                "[DEFENSA DE INFRAESTRUCTURA] SPI-24 = {spi_24:.2} con demanda al \
                 {:.0}% de capacidad. El sistema opera sin margen: reducir presión \
                 nocturna y gestionar demanda pico.",
                ratio * 100.0
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn improving_band_only() {
        let mut c = Context {
            trend: Trend::Improving,
            spi_6: Some(-1.1),
            ..Context::default()
        };
        let a = ImprovingMaintenance.evaluate(&c).unwrap();
        assert!(a.priority <= 60.0);
        c.trend = Trend::Stable;
        assert!(ImprovingMaintenance.evaluate(&c).is_none());
        c.trend = Trend::Improving;
        c.spi_6 = Some(-0.3);
        assert!(ImprovingMaintenance.evaluate(&c).is_none());
    }

    #[test]
    fn defense_needs_both_signals() {
        let mut c = Context {
            spi_24: Some(-2.2),
            demand_capacity_ratio: Some(0.85),
            ..Context::default()
        };
        assert!(InfrastructureDefense.evaluate(&c).is_none());
        c.demand_capacity_ratio = Some(0.95);
        let a = InfrastructureDefense.evaluate(&c).unwrap();
        assert!(a.priority >= 75.0);
        c.spi_24 = Some(-1.8);
        assert!(InfrastructureDefense.evaluate(&c).is_none());
    }
}
