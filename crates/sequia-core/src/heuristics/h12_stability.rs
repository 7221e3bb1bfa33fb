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

//! H12 family: entrenched severe drought and weather whiplash.

use super::{Activation, Heuristic, Window, cap, params};
use sequia_types::{Context, ParamValue, Profile, Trend};

/// Severe but stable drought: no acute trigger, yet conditions warrant a
/// sustained maintenance posture.
pub struct StableSevere;

impl StableSevere {
    const WINDOW: Window = Window {
        spi_min: -2.0,
        spi_max: -1.2,
        days_min: None,
        days_max: None,
        trends: &[Trend::Stable],
    };
}

impl Heuristic for StableSevere {
    fn id(&self) -> &'static str {
        "H12_STABLE"
    }

    fn tag(&self) -> &'static str {
        "H12"
    }

    fn evaluate(&self, ctx: &Context) -> Option<Activation> {
        if !Self::WINDOW.matches(ctx) {
            return None;
        }
        let spi = ctx.spi();

        let mut priority = 50.0 + (spi.abs() - 1.2) * 15.0;
        priority += if ctx.profile == Profile::Government {
            8.0
        } else {
            4.0
        };

        Some(Activation {
            rule_id: self.id(),
            tag: self.tag(),
            priority: cap(priority),
            action_codes: vec![
                "H3_AWARENESS_CAMPAIGN",
                "H2_PRESSURE_REDUCTION",
                "H2_LEAK_DETECTION",
                "H4_LAWN_BAN",
            ],
            parameters: params(&[
                ("intensity_level", ParamValue::Text("moderate".to_owned())),
                ("pressure_reduction_pct", ParamValue::Int(10)),
            ]),
            justification: format!(
                "SPI-6 = {:.2} ({}), stable. Entrenched drought without an acute trigger: \
                 maintain conservation pressure so conditions do not quietly erode.",
                spi, ctx.risk_level
            ),
        })
    }
}

/// Weather whiplash: a wet extreme within the last year followed by the
/// current dry extreme. Infrastructure and reservoirs are stressed by the
/// swing itself.
pub struct WeatherWhiplash;

impl WeatherWhiplash {
    const MONTHS_THRESHOLD: u32 = 12;
}

impl Heuristic for WeatherWhiplash {
    fn id(&self) -> &'static str {
        "H12_WHIPLASH"
    }

    fn tag(&self) -> &'static str {
        "H12"
    }

    fn evaluate(&self, ctx: &Context) -> Option<Activation> {
        if !ctx.weather_whiplash {
            return None;
        }
        let months = ctx.months_since_wet?;
        if months >= Self::MONTHS_THRESHOLD {
            return None;
        }

        let mut priority = 65.0;
        priority += if months < 6 {
            20.0
        } else if months < 9 {
            10.0
        } else {
            5.0
        };
        if ctx.spi() < -1.5 {
            priority += 10.0;
        }

        Some(Activation {
            rule_id: self.id(),
            tag: self.tag(),
            priority: cap(priority),
            action_codes: vec![
                "H12_MAXIMUM_CONSERVATION",
                "H12_INFRASTRUCTURE_PROTECTION",
                "H12_VOLATILITY_MANAGEMENT",
            ],
            parameters: params(&[("conservation_target_pct", ParamValue::Int(15))]),
            justification: format!(
                "[VOLATILIDAD] Transición húmedo→seco en {months} meses. El latigazo \
                 climático estresa infraestructura y reglas de operación de embalses; \
                 aplicar conservación máxima."
            ),
        })
    }
}
