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

//! H9 family: early warning on a mild worsening signal, and the green
//! drought (false recovery) alert from scale divergence.

use super::{Activation, Heuristic, Window, cap, params};
use sequia_types::{Context, ParamValue, Profile, Trend};

/// Mild but worsening conditions: cheapest moment for awareness measures.
pub struct EarlyWarning;

impl EarlyWarning {
    const WINDOW: Window = Window {
        spi_min: -0.8,
        spi_max: -0.3,
        days_min: None,
        days_max: None,
        trends: &[Trend::Worsening],
    };
}

impl Heuristic for EarlyWarning {
    fn id(&self) -> &'static str {
        "H9_EARLY"
    }

    fn tag(&self) -> &'static str {
        "H9"
    }

    fn evaluate(&self, ctx: &Context) -> Option<Activation> {
        if !Self::WINDOW.matches(ctx) {
            return None;
        }
        let spi = ctx.spi();

        let mut priority = 35.0 + spi.abs() * 15.0;
        if ctx.profile == Profile::Government {
            priority += 10.0;
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
                "SPI-6 = {spi:.2}, worsening from near-normal conditions. Low-cost \
                 awareness now avoids harsher measures later."
            ),
        })
    }
}

/// Green drought: short-scale SPI rebounds while the 12-month scale stays
/// deep in deficit, misleading casual observers into premature relaxation.
pub struct ScaleDifferential;

impl Heuristic for ScaleDifferential {
    fn id(&self) -> &'static str {
        "H9_SCALE_DIFF"
    }

    fn tag(&self) -> &'static str {
        "H9"
    }

    fn evaluate(&self, ctx: &Context) -> Option<Activation> {
        if !ctx.false_recovery {
            return None;
        }
        let differential = ctx.scale_differential.unwrap_or(0.0);

        let mut priority = 55.0 + ((differential - 1.5) * 10.0).clamp(0.0, 15.0);
        if ctx.spi_12.is_some_and(|v| v < -1.5) {
            priority += 10.0;
        }

        Some(Activation {
            rule_id: self.id(),
            tag: self.tag(),
            priority: cap(priority),
            action_codes: vec![
                "H9_FALSE_RECOVERY_ALERT",
                "H9_SUSTAINED_MONITORING",
                "H9_PUBLIC_COMMUNICATION",
            ],
            parameters: params(&[("channels", ParamValue::Text("official".to_owned()))]),
            justification: format!(
                "[SEQUÍA VERDE] Diferencial de escalas = {differential:.2} con SPI-12 = {}. \
                 La lluvia reciente no significa fin de la sequía: sostener monitoreo y \
                 comunicación pública.",
                ctx.spi_12.map_or_else(|| "n/d".to_owned(), |v| format!("{v:.2}"))
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn early_warning_band_is_narrow() {
        let mut c = Context {
            trend: Trend::Worsening,
            spi_6: Some(-0.5),
            ..Context::default()
        };
        assert!(EarlyWarning.evaluate(&c).is_some());
        c.spi_6 = Some(-0.2);
        assert!(EarlyWarning.evaluate(&c).is_none());
        c.spi_6 = Some(-0.9);
        assert!(EarlyWarning.evaluate(&c).is_none());
    }

    #[test]
    fn false_recovery_flag_drives_activation() {
        let mut c = Context {
            false_recovery: true,
            scale_differential: Some(1.9),
            spi_1: Some(0.3),
            spi_12: Some(-1.6),
            ..Context::default()
        };
        let a = ScaleDifferential.evaluate(&c).unwrap();
        assert!(a.priority >= 65.0);
        c.false_recovery = false;
        assert!(ScaleDifferential.evaluate(&c).is_none());
    }
}
