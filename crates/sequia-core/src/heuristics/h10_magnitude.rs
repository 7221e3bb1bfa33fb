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

//! H10 family: moderate-but-urgent window and run-theory magnitude ranking.

use super::{Activation, Heuristic, Window, cap, params};
use sequia_types::{Context, ParamValue, Profile, Trend};

/// Moderate drought worsening into a mid-length runway: standard measures
/// applied early.
pub struct ModerateUrgent;

impl ModerateUrgent {
    const WINDOW: Window = Window {
        spi_min: -1.5,
        spi_max: -1.0,
        days_min: Some(15),
        days_max: Some(55),
        trends: &[Trend::Worsening],
    };
}

impl Heuristic for ModerateUrgent {
    fn id(&self) -> &'static str {
        "H10_MODERATE"
    }

    fn tag(&self) -> &'static str {
        "H10"
    }

    fn evaluate(&self, ctx: &Context) -> Option<Activation> {
        if !Self::WINDOW.matches(ctx) {
            return None;
        }
        let spi = ctx.spi();

        let mut priority = 55.0 + (spi.abs() - 1.0) * 20.0;
        if ctx.days_to_critical.is_some_and(|d| d < 30) {
            priority += 10.0;
        }
        if ctx.profile == Profile::Government {
            priority += 5.0;
        }

        Some(Activation {
            rule_id: self.id(),
            tag: self.tag(),
            priority: cap(priority),
            action_codes: vec![
                "H3_AWARENESS_CAMPAIGN",
                "H2_PRESSURE_REDUCTION",
                "H1_INDUSTRIAL_AUDIT",
            ],
            parameters: params(&[
                ("intensity_level", ParamValue::Text("high".to_owned())),
                ("reduction_target_pct", ParamValue::Int(5)),
            ]),
            justification: format!(
                "SPI-6 = {:.2} ({}), worsening with a {} day runway. Moderate drought \
                 moving fast enough to justify immediate standard measures.",
                spi,
                ctx.risk_level,
                ctx.days_to_critical
                    .map_or_else(|| "mid-length".to_owned(), |d| d.to_string())
            ),
        })
    }
}

/// Cumulative magnitude ranking: the current event's run-theory magnitude
/// against the zone's historical population. Captures duration and
/// intensity together, unlike point-in-time SPI.
pub struct DroughtMagnitude;

impl DroughtMagnitude {
    const PERCENTILE_MODERATE: f64 = 50.0;
    const PERCENTILE_SEVERE: f64 = 75.0;
    const PERCENTILE_EXTREME: f64 = 90.0;
}

impl Heuristic for DroughtMagnitude {
    fn id(&self) -> &'static str {
        "H10_MAGNITUDE"
    }

    fn tag(&self) -> &'static str {
        "H10"
    }

    fn evaluate(&self, ctx: &Context) -> Option<Activation> {
        let percentile = ctx.magnitude_percentile?;
        if percentile < Self::PERCENTILE_MODERATE {
            return None;
        }

        let (priority, tier) = if percentile >= Self::PERCENTILE_EXTREME {
            (90.0, "tier_3")
        } else if percentile >= Self::PERCENTILE_SEVERE {
            (75.0, "tier_2")
        } else {
            (55.0, "tier_1")
        };

        Some(Activation {
            rule_id: self.id(),
            tag: self.tag(),
            priority: cap(priority),
            action_codes: vec![
                "H10_MAGNITUDE_BASED_RESPONSE",
                "H10_HISTORICAL_COMPARISON",
                "H10_ESCALATED_MEASURES",
            ],
            parameters: params(&[("response_tier", ParamValue::Text(tier.to_owned()))]),
            justification: format!(
                "[MAGNITUD ACUMULADA] Magnitud = {:.1} (percentil {percentile:.0}, \
                 {} meses de duración). El evento actual supera la mediana histórica; \
                 escalar respuesta proporcionalmente.",
                ctx.magnitude.unwrap_or(0.0),
                ctx.drought_duration_months
            ),
        })
    }
}
