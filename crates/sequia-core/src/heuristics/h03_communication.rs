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

//! H3 family: season-validated monitoring and public communication.

use super::{Activation, Heuristic, Window, cap, params};
use sequia_types::{Context, ParamValue, Profile, Trend};

/// Seasonal validation: a negative SPI during the dry season is only a
/// genuine signal when the absolute deficit clears the zone threshold.
/// Outside the dry season the SPI signal stands on its own.
pub struct SeasonalityCheck;

impl SeasonalityCheck {
    const SPI_THRESHOLD: f64 = -1.0;
}

impl Heuristic for SeasonalityCheck {
    fn id(&self) -> &'static str {
        "H3_SEASONALITY"
    }

    fn tag(&self) -> &'static str {
        "H3"
    }

    fn evaluate(&self, ctx: &Context) -> Option<Activation> {
        let spi = ctx.spi();
        if spi >= Self::SPI_THRESHOLD {
            return None;
        }
        if ctx.is_dry_season {
            let deficit = ctx.seasonal_deficit_mm?;
            if deficit <= ctx.seasonal_deficit_threshold_mm {
                return None;
            }
        }

        let mut priority = 45.0;
        if let Some(deficit) = ctx.seasonal_deficit_mm {
            let ratio = deficit / ctx.seasonal_deficit_threshold_mm;
            priority += (ratio * 10.0).min(25.0);
        }
        if spi < -1.5 {
            priority += 15.0;
        } else if spi < -1.2 {
            priority += 8.0;
        }

        let season = if ctx.is_dry_season {
            "temporada seca (déficit validado)"
        } else {
            "temporada húmeda"
        };

        Some(Activation {
            rule_id: self.id(),
            tag: self.tag(),
            priority: cap(priority),
            action_codes: vec!["H3_VALIDATED_MONITORING", "H3_SEASONAL_ADVISORY"],
            parameters: params(&[(
                "validated_deficit_mm",
                ParamValue::Number(ctx.seasonal_deficit_mm.unwrap_or(0.0)),
            )]),
            justification: format!(
                "SPI-6 = {spi:.2} en {season}. Señal de sequía validada en contexto \
                 estacional; mantener monitoreo y comunicación contextualizada."
            ),
        })
    }
}

/// Classical communication window: worsening drought with at least a month
/// of runway, where voluntary-conservation messaging still has time to work.
pub struct PublicCommunication;

impl PublicCommunication {
    const WINDOW: Window = Window {
        spi_min: -2.0,
        spi_max: -1.0,
        days_min: Some(30),
        days_max: None,
        trends: &[Trend::Worsening],
    };
}

impl Heuristic for PublicCommunication {
    fn id(&self) -> &'static str {
        "H3_COMMUNICATION"
    }

    fn tag(&self) -> &'static str {
        "H3"
    }

    fn evaluate(&self, ctx: &Context) -> Option<Activation> {
        if !Self::WINDOW.matches(ctx) {
            return None;
        }
        let spi = ctx.spi();

        let mut priority = 45.0 + (spi.abs() - 1.0) * 15.0 + 5.0;
        priority += if ctx.profile == Profile::Government {
            15.0
        } else {
            5.0
        };
        if ctx.days_to_critical.is_some_and(|d| d < 40) {
            priority += 5.0;
        }

        let intensity = if spi < -1.5 { "high" } else { "moderate" };

        Some(Activation {
            rule_id: self.id(),
            tag: self.tag(),
            priority: cap(priority),
            action_codes: vec![
                "H3_AWARENESS_CAMPAIGN",
                "H3_SCHOOL_PROGRAM",
                "H3_HOTLINE_LAUNCH",
            ],
            parameters: params(&[
                ("channels", ParamValue::Text("social_media".to_owned())),
                ("intensity_level", ParamValue::Text(intensity.to_owned())),
                ("schools_pct", ParamValue::Int(50)),
            ]),
            justification: format!(
                "SPI-6 = {:.2} ({}), worsening. Early public communication: a 3% voluntary \
                 reduction buys +2 days, and campaigns need lead time to change behavior.",
                spi, ctx.risk_level
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
            risk_level: RiskLevel::High,
            ..Context::default()
        }
    }

    #[test]
    fn wet_season_signal_passes_without_deficit() {
        let mut c = ctx();
        c.spi_6 = Some(-1.3);
        c.is_dry_season = false;
        assert!(SeasonalityCheck.evaluate(&c).is_some());
    }

    #[test]
    fn dry_season_requires_deficit_over_threshold() {
        let mut c = ctx();
        c.spi_6 = Some(-1.3);
        c.is_dry_season = true;
        assert!(SeasonalityCheck.evaluate(&c).is_none());
        c.seasonal_deficit_mm = Some(30.0);
        assert!(SeasonalityCheck.evaluate(&c).is_none());
        c.seasonal_deficit_mm = Some(120.0);
        let a = SeasonalityCheck.evaluate(&c).unwrap();
        assert!(a.justification.contains("validado"));
    }

    #[test]
    fn mild_spi_never_activates_seasonality() {
        let mut c = ctx();
        c.spi_6 = Some(-0.8);
        assert!(SeasonalityCheck.evaluate(&c).is_none());
    }

    #[test]
    fn communication_prefers_government_profile() {
        let mut c = ctx();
        c.spi_6 = Some(-1.4);
        c.days_to_critical = Some(45);
        let gov = PublicCommunication.evaluate(&c).unwrap();
        c.profile = Profile::Industry;
        let ind = PublicCommunication.evaluate(&c).unwrap();
        assert!(gov.priority > ind.priority);
    }

    #[test]
    fn communication_needs_runway() {
        let mut c = ctx();
        c.spi_6 = Some(-1.4);
        c.days_to_critical = Some(20);
        assert!(PublicCommunication.evaluate(&c).is_none());
    }
}
