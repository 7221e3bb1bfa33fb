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

//! H1 family: drought onset confirmation and industrial demand reduction.

use super::{Activation, Heuristic, Window, cap, params};
use sequia_types::{Context, ParamValue, Profile, Trend};

/// SPI-3 below -1.0 for two or more consecutive periods confirms an
/// established drought pattern rather than transient noise; SPI-1 is too
/// volatile and SPI-3 tracks soil moisture better.
pub struct PersistenceTrigger;

impl PersistenceTrigger {
    const SPI_3_THRESHOLD: f64 = -1.0;
    const PERIODS_REQUIRED: u32 = 2;
}

impl Heuristic for PersistenceTrigger {
    fn id(&self) -> &'static str {
        "H1_PERSISTENCE"
    }

    fn tag(&self) -> &'static str {
        "H1"
    }

    fn evaluate(&self, ctx: &Context) -> Option<Activation> {
        let spi_3 = ctx.spi_3?;
        if spi_3 >= Self::SPI_3_THRESHOLD
            || ctx.consecutive_dry_periods < Self::PERIODS_REQUIRED
        {
            return None;
        }

        let mut priority = 50.0;
        priority += f64::from(ctx.consecutive_dry_periods.saturating_sub(2)).min(4.0) * 5.0;
        if spi_3 < -1.5 {
            priority += 15.0;
        } else if spi_3 < -1.3 {
            priority += 10.0;
        }
        if ctx.trend == Trend::Worsening {
            priority += 10.0;
        }

        let level = if ctx.consecutive_dry_periods >= 4 {
            "high"
        } else {
            "moderate"
        };

        Some(Activation {
            rule_id: self.id(),
            tag: self.tag(),
            priority: cap(priority),
            action_codes: vec![
                "H1_MONITORING_INTENSIFICATION",
                "H1_STAKEHOLDER_ALERT",
                "H1_RESOURCE_PREPOSITION",
            ],
            parameters: params(&[
                ("monitoring_frequency", ParamValue::Text("weekly".to_owned())),
                ("alert_sectors", ParamValue::Text("all".to_owned())),
                ("resource_level", ParamValue::Text(level.to_owned())),
            ]),
            justification: format!(
                "[INICIO CONFIRMADO] SPI-3 = {:.2} por {} periodos consecutivos. \
                 Patrón de sequía meteorológica establecido; intensificar monitoreo y \
                 preposicionar recursos de respuesta.",
                spi_3, ctx.consecutive_dry_periods
            ),
        })
    }
}

/// Classical industrial reduction window: moderate drought with a long
/// runway, targeting facility efficiency programs.
pub struct IndustrialReduction;

impl IndustrialReduction {
    const WINDOW: Window = Window {
        spi_min: -1.5,
        spi_max: -1.0,
        days_min: Some(45),
        days_max: None,
        trends: &[Trend::Stable, Trend::Worsening],
    };
}

impl Heuristic for IndustrialReduction {
    fn id(&self) -> &'static str {
        "H1_INDUSTRIAL"
    }

    fn tag(&self) -> &'static str {
        "H1"
    }

    fn evaluate(&self, ctx: &Context) -> Option<Activation> {
        if !Self::WINDOW.matches(ctx) {
            return None;
        }
        let spi = ctx.spi();

        let mut priority = 50.0 + (spi.abs() - 1.0) * 20.0;
        if ctx.trend == Trend::Worsening {
            priority += 10.0;
        }
        priority += if ctx.profile == Profile::Industry {
            15.0
        } else {
            5.0
        };
        if ctx.days_to_critical.is_some_and(|d| d < 60) {
            priority += 5.0;
        }

        let (reduction_target, threshold_m3) = if spi < -1.3 { (10, 8000) } else { (5, 10000) };

        Some(Activation {
            rule_id: self.id(),
            tag: self.tag(),
            priority: cap(priority),
            action_codes: vec!["H1_INDUSTRIAL_AUDIT", "H1_RECYCLING_MANDATE"],
            parameters: params(&[
                ("reduction_target_pct", ParamValue::Int(reduction_target)),
                ("facility_threshold_m3", ParamValue::Int(threshold_m3)),
                (
                    "sectors_affected",
                    ParamValue::Text("manufacturing".to_owned()),
                ),
            ]),
            justification: format!(
                "SPI-6 = {:.2} ({}), {} trend. Industrial water reduction recommended as a \
                 proactive measure; a {}% cut in industrial consumption buys roughly +3-6 days.",
                spi,
                ctx.risk_level,
                ctx.trend.as_str().to_ascii_lowercase(),
                reduction_target
            ),
        })
    }
}
