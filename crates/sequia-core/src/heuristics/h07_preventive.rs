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

//! H7 family: preventive measures while conditions are stable, and the
//! reservoir-lag guard against relaxing restrictions too early.

use super::{Activation, Heuristic, Window, cap, params};
use sequia_types::{Context, ParamValue, Profile, Trend};

/// Stable moderate drought with a comfortable runway: cheap preventive
/// measures (awareness, leak checks, audits) rather than restrictions.
pub struct PreventiveMonitoring;

impl PreventiveMonitoring {
    const WINDOW: Window = Window {
        spi_min: -1.5,
        spi_max: -1.0,
        days_min: Some(30),
        days_max: Some(50),
        trends: &[Trend::Stable],
    };
}

impl Heuristic for PreventiveMonitoring {
    fn id(&self) -> &'static str {
        "H7_PREVENTIVE"
    }

    fn tag(&self) -> &'static str {
        "H7"
    }

    fn evaluate(&self, ctx: &Context) -> Option<Activation> {
        if !Self::WINDOW.matches(ctx) {
            return None;
        }
        let spi = ctx.spi();

        let mut priority = 40.0 + (spi.abs() - 1.0) * 20.0;
        match ctx.days_to_critical {
            Some(d) if d < 40 => priority += 10.0,
            Some(d) if d < 45 => priority += 5.0,
            _ => {}
        }
        priority += if ctx.profile == Profile::Government {
            10.0
        } else {
            5.0
        };

        Some(Activation {
            rule_id: self.id(),
            tag: self.tag(),
            priority: cap(priority),
            action_codes: vec![
                "H3_AWARENESS_CAMPAIGN",
                "H2_LEAK_DETECTION",
                "H1_INDUSTRIAL_AUDIT",
            ],
            parameters: params(&[
                ("intensity_level", ParamValue::Text("moderate".to_owned())),
                ("coverage_pct", ParamValue::Int(60)),
            ]),
            justification: format!(
                "SPI-6 = {:.2} ({}), stable with a {} day runway. Conditions allow \
                 low-cost preventive action before restrictions become necessary.",
                spi,
                ctx.risk_level,
                ctx.days_to_critical
                    .map_or_else(|| "comfortable".to_owned(), |d| d.to_string())
            ),
        })
    }
}

/// Hydrological inertia: short-scale SPI recovers months before reservoirs
/// do. Restrictions are held while the long scale is still in deficit or
/// physical storage is low.
pub struct ReservoirLag;

impl ReservoirLag {
    const SPI_12_THRESHOLD: f64 = -1.0;
    const RESERVOIR_MIN_PCT: f64 = 60.0;
}

impl Heuristic for ReservoirLag {
    fn id(&self) -> &'static str {
        "H7_RESERVOIR"
    }

    fn tag(&self) -> &'static str {
        "H7"
    }

    fn evaluate(&self, ctx: &Context) -> Option<Activation> {
        let divergence = match (ctx.spi_6, ctx.spi_12) {
            (Some(short), Some(long)) => short > long && long < Self::SPI_12_THRESHOLD,
            _ => false,
        };
        let low_storage = ctx
            .reservoir_storage_pct
            .is_some_and(|pct| pct < Self::RESERVOIR_MIN_PCT);
        if !divergence && !low_storage {
            return None;
        }

        let mut priority = 55.0;
        if let Some(pct) = ctx.reservoir_storage_pct {
            if pct < 40.0 {
                priority += 25.0;
            } else if pct < 50.0 {
                priority += 15.0;
            } else if pct < 60.0 {
                priority += 10.0;
            }
        }
        if let (Some(short), Some(long)) = (ctx.spi_6, ctx.spi_12) {
            priority += ((short - long) * 10.0).clamp(0.0, 15.0);
        }

        let storage_str = ctx
            .reservoir_storage_pct
            .map_or_else(|| "sin dato".to_owned(), |p| format!("{p:.0}%"));

        Some(Activation {
            rule_id: self.id(),
            tag: self.tag(),
            priority: cap(priority),
            action_codes: vec![
                "H7_RESTRICTION_HOLD",
                "H7_RESERVOIR_VALIDATION",
                "H7_PHASED_RELAXATION",
            ],
            parameters: params(&[("reservoir_threshold_pct", ParamValue::Int(60))]),
            justification: format!(
                "[INERCIA HIDROLÓGICA] SPI-12 = {} con almacenamiento en {storage_str}. \
                 La mejora de corto plazo no implica recarga física: validar embalses \
                 antes de relajar restricciones.",
                ctx.spi_12.map_or_else(|| "n/d".to_owned(), |v| format!("{v:.2}"))
            ),
        })
    }
}
