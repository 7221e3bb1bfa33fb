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

//! H11 family: short-runway emergency and the Markov transition trigger.

use super::{Activation, Heuristic, Window, cap, params};
use sequia_types::{Context, ParamValue, Trend};

/// Less than 25 days of runway under a worsening trend: emergency posture
/// regardless of how the drought got here.
pub struct ShortRunwayEmergency;

impl ShortRunwayEmergency {
    const WINDOW: Window = Window {
        spi_min: f64::NEG_INFINITY,
        spi_max: -1.2,
        days_min: None,
        days_max: Some(25),
        trends: &[Trend::Worsening],
    };
}

impl Heuristic for ShortRunwayEmergency {
    fn id(&self) -> &'static str {
        "H11_SHORT_RUNWAY"
    }

    fn tag(&self) -> &'static str {
        "H11"
    }

    fn evaluate(&self, ctx: &Context) -> Option<Activation> {
        if !Self::WINDOW.matches(ctx) {
            return None;
        }
        // Without an estimate there is no runway to be short of.
        let days = ctx.days_to_critical?;
        let spi = ctx.spi();

        let mut priority = 85.0;
        if days < 15 {
            priority += 10.0;
        }
        if spi < -1.8 {
            priority += 5.0;
        }

        Some(Activation {
            rule_id: self.id(),
            tag: self.tag(),
            priority: cap(priority),
            action_codes: vec![
                "H6_EMERGENCY_DECLARATION",
                "H4_LAWN_BAN",
                "H4_CARWASH_RESTRICTION",
                "H3_AWARENESS_CAMPAIGN",
                "H2_PRESSURE_REDUCTION",
            ],
            parameters: params(&[
                ("emergency_level", ParamValue::Text("level_2".to_owned())),
                ("duration_days", ParamValue::Int(30)),
                ("hours_allowed_per_day", ParamValue::Int(1)),
            ]),
            justification: format!(
                "SPI-6 = {spi:.2} with only {days} days to critical and a worsening trend. \
                 Combined emergency measures are the only way to stretch the runway."
            ),
        })
    }
}

/// Probabilistic trigger: fitted transition matrix puts the one-step
/// probability of reaching the severe state above 60%.
pub struct MarkovTransition;

impl MarkovTransition {
    const PROBABILITY_THRESHOLD: f64 = 0.60;
}

impl Heuristic for MarkovTransition {
    fn id(&self) -> &'static str {
        "H11_MARKOV"
    }

    fn tag(&self) -> &'static str {
        "H11"
    }

    fn evaluate(&self, ctx: &Context) -> Option<Activation> {
        let prob = ctx.prob_to_severe?;
        if prob <= Self::PROBABILITY_THRESHOLD {
            return None;
        }

        let (priority, contingency) = if prob > 0.80 {
            (95.0, "full")
        } else if prob > 0.70 {
            (85.0, "enhanced")
        } else {
            (70.0, "standard")
        };

        Some(Activation {
            rule_id: self.id(),
            tag: self.tag(),
            priority: cap(priority),
            action_codes: vec![
                "H11_PREEMPTIVE_ACTIVATION",
                "H11_PROBABILITY_ALERT",
                "H11_CONTINGENCY_PREPARATION",
            ],
            parameters: params(&[
                ("probability_threshold", ParamValue::Number(0.6)),
                ("contingency_level", ParamValue::Text(contingency.to_owned())),
            ]),
            justification: format!(
                "[TRANSICIÓN MARKOVIANA] P(severo | {}) = {:.0}% a un mes. Activar \
                 medidas preventivas antes de la transición probable.",
                ctx.markov_state
                    .map_or_else(|| "estado actual".to_owned(), |s| s.to_string()),
                prob * 100.0
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sequia_types::DroughtState;

    #[test]
    fn short_runway_requires_an_estimate() {
        let mut c = Context {
            trend: Trend::Worsening,
            spi_6: Some(-1.5),
            days_to_critical: None,
            ..Context::default()
        };
        assert!(ShortRunwayEmergency.evaluate(&c).is_none());
        c.days_to_critical = Some(20);
        assert!(ShortRunwayEmergency.evaluate(&c).is_some());
        c.days_to_critical = Some(30);
        assert!(ShortRunwayEmergency.evaluate(&c).is_none());
    }

    #[test]
    fn very_short_runway_raises_priority() {
        let mut c = Context {
            trend: Trend::Worsening,
            spi_6: Some(-1.9),
            days_to_critical: Some(10),
            ..Context::default()
        };
        let urgent = ShortRunwayEmergency.evaluate(&c).unwrap();
        assert_eq!(urgent.priority, 100.0);
        c.days_to_critical = Some(22);
        c.spi_6 = Some(-1.4);
        let merely_bad = ShortRunwayEmergency.evaluate(&c).unwrap();
        assert!(merely_bad.priority < urgent.priority);
    }

    #[test]
    fn markov_threshold_is_strict() {
        let mut c = Context {
            prob_to_severe: Some(0.60),
            markov_state: Some(DroughtState::Moderate),
            ..Context::default()
        };
        assert!(MarkovTransition.evaluate(&c).is_none());
        c.prob_to_severe = Some(0.65);
        let a = MarkovTransition.evaluate(&c).unwrap();
        assert_eq!(a.priority, 70.0);
        c.prob_to_severe = Some(0.85);
        let a = MarkovTransition.evaluate(&c).unwrap();
        assert_eq!(a.priority, 95.0);
        assert_eq!(
            a.parameters.get("contingency_level"),
            Some(&ParamValue::Text("full".to_owned()))
        );
    }
}
