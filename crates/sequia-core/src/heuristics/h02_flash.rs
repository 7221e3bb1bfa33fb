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

//! H2 family: flash-drought detection and network pressure management.

use super::{Activation, Heuristic, Window, cap, params};
use sequia_types::{Context, ParamValue, Profile, Trend};

const CATEGORY_NAMES: [&str; 6] = ["Húmedo", "Normal", "Leve", "Moderado", "Severo", "Extremo"];

/// Flash drought: a drop of two or more SPI categories within four weeks.
/// Rate of intensification matters more than the absolute level; monthly
/// threshold methods react too slowly to protect crops.
pub struct FlashDrought;

impl FlashDrought {
    const CATEGORY_DROP: u8 = 2;
}

impl Heuristic for FlashDrought {
    fn id(&self) -> &'static str {
        "H2_FLASH"
    }

    fn tag(&self) -> &'static str {
        "H2"
    }

    fn evaluate(&self, ctx: &Context) -> Option<Activation> {
        let now = ctx.spi_category_now?;
        let before = ctx.spi_category_4w_ago?;
        let drop = now.saturating_sub(before);
        if drop < Self::CATEGORY_DROP {
            return None;
        }

        let mut priority = 75.0;
        priority += (f64::from(drop) - 2.0).max(0.0).min(2.5) * 8.0;
        if now >= 4 {
            priority += 5.0;
        }
        if ctx.is_critical_phenological_window {
            priority += 10.0;
        }

        let (alert_level, teams) = if now >= 4 {
            ("critical", 8)
        } else if now >= 3 {
            ("urgent", 5)
        } else {
            ("warning", 3)
        };

        Some(Activation {
            rule_id: self.id(),
            tag: self.tag(),
            priority: cap(priority),
            action_codes: vec![
                "H2_FLASH_DROUGHT_ALERT",
                "H2_RAPID_RESPONSE_ACTIVATION",
                "H2_EMERGENCY_COMMUNICATION",
            ],
            parameters: params(&[
                ("alert_level", ParamValue::Text(alert_level.to_owned())),
                ("response_teams", ParamValue::Int(teams)),
                ("channels", ParamValue::Text("sms".to_owned())),
            ]),
            justification: format!(
                "[SEQUÍA RELÁMPAGO] Caída de {} categorías SPI en 4 semanas ({} → {}). \
                 Velocidad de intensificación anormal; se requiere respuesta acelerada \
                 para proteger cultivos.",
                drop,
                CATEGORY_NAMES[usize::from(before.min(5))],
                CATEGORY_NAMES[usize::from(now.min(5))]
            ),
        })
    }
}

/// Classical pressure-management window: worsening moderate drought with a
/// 30-45 day runway, where network pressure and leak programs still pay off.
pub struct PressureManagement;

impl PressureManagement {
    const WINDOW: Window = Window {
        spi_min: -1.8,
        spi_max: -1.2,
        days_min: Some(30),
        days_max: Some(45),
        trends: &[Trend::Worsening],
    };
}

impl Heuristic for PressureManagement {
    fn id(&self) -> &'static str {
        "H2_PRESSURE"
    }

    fn tag(&self) -> &'static str {
        "H2"
    }

    fn evaluate(&self, ctx: &Context) -> Option<Activation> {
        if !Self::WINDOW.matches(ctx) {
            return None;
        }
        let spi = ctx.spi();

        let mut priority = 55.0 + (spi.abs() - 1.2) * 25.0 + 10.0;
        priority += if ctx.profile == Profile::Government {
            10.0
        } else {
            5.0
        };
        match ctx.days_to_critical {
            Some(d) if d < 35 => priority += 10.0,
            Some(d) if d < 40 => priority += 5.0,
            _ => {}
        }

        let (pressure_reduction, coverage) = if spi < -1.6 {
            (15, 90)
        } else if spi < -1.4 {
            (12, 80)
        } else {
            (10, 75)
        };

        let days_str = ctx
            .days_to_critical
            .map_or_else(|| "moderate time".to_owned(), |d| format!("{d} days"));

        Some(Activation {
            rule_id: self.id(),
            tag: self.tag(),
            priority: cap(priority),
            action_codes: vec!["H2_PRESSURE_REDUCTION", "H2_LEAK_DETECTION"],
            parameters: params(&[
                ("pressure_reduction_pct", ParamValue::Int(pressure_reduction)),
                ("hours_start", ParamValue::Int(23)),
                ("hours_end", ParamValue::Int(5)),
                ("coverage_pct", ParamValue::Int(coverage)),
                ("repair_priority_threshold_lps", ParamValue::Number(1.0)),
            ]),
            justification: format!(
                "SPI-6 = {:.2} ({}), worsening trend, an estimated {} to critical. Network \
                 pressure management and leak detection reduce losses: 10% pressure \
                 reduction = +4 days, each 1% of leaks repaired = +2 days.",
                spi, ctx.risk_level, days_str
            ),
        })
    }
}
