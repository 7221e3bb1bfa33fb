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

//! Deterministic parameter generation when the LLM is unavailable.
//!
//! Trend picks the percentile: worsening conditions take the 75th
//! percentile of each numeric range, stable the 50th, improving the 25th.
//! Enumerations take the last, middle or first option respectively, and
//! booleans follow the worsening flag.

use sequia_types::{Confidence, Context, ExpectedEffect, ParamMap, ParamSchema, ParamSpec, ParamValue, Trend};

#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackHandler;

impl FallbackHandler {
    pub fn percentile_for(trend: Trend) -> f64 {
        match trend {
            Trend::Worsening => 0.75,
            Trend::Stable => 0.50,
            Trend::Improving => 0.25,
        }
    }

    /// Value for one schema entry under the given trend.
    pub fn value_for(spec: &ParamSpec, trend: Trend) -> Option<ParamValue> {
        match spec {
            ParamSpec::Numeric { min, max, .. } => {
                let value = min + (max - min) * Self::percentile_for(trend);
                if spec.has_integer_bounds() {
                    Some(ParamValue::Int(value.round() as i64))
                } else {
                    Some(ParamValue::Number(value))
                }
            }
            ParamSpec::Choice { options, default } => {
                if options.is_empty() {
                    return default.clone().map(ParamValue::Text);
                }
                let idx = match trend {
                    Trend::Worsening => options.len() - 1,
                    Trend::Improving => 0,
                    Trend::Stable => options.len() / 2,
                };
                Some(ParamValue::Text(options[idx].clone()))
            }
            ParamSpec::Flag { .. } => Some(ParamValue::Flag(trend == Trend::Worsening)),
        }
    }

    /// Full parameter map: heuristic defaults win, the rest comes from the
    /// trend percentile.
    pub fn generate(&self, schema: &ParamSchema, trend: Trend, defaults: &ParamMap) -> ParamMap {
        if schema.is_empty() {
            return defaults.clone();
        }
        let mut out = ParamMap::new();
        for (name, spec) in schema {
            if let Some(value) = defaults.get(name) {
                out.insert(name.clone(), value.clone());
                continue;
            }
            if let Some(value) = Self::value_for(spec, trend).or_else(|| spec.default_value()) {
                out.insert(name.clone(), value);
            }
        }
        out
    }

    /// Parse "+N days" out of an impact formula. Formulas without a days
    /// figure yield zero.
    pub fn estimate_effect(&self, impact_formula: &str) -> ExpectedEffect {
        ExpectedEffect {
            days_gained: extract_days(impact_formula),
            confidence: Confidence::Low,
        }
    }

    pub fn justification(&self, ctx: &Context) -> String {
        let percentile = (Self::percentile_for(ctx.trend) * 100.0) as i64;
        let trend_desc = match ctx.trend {
            Trend::Worsening => "deteriorating",
            Trend::Stable => "stable",
            Trend::Improving => "improving",
        };
        let days_str = ctx
            .days_to_critical
            .map_or_else(String::new, |d| format!(" with {d} days to critical threshold"));
        format!(
            "[auto-generated] Parameters set using {percentile}th percentile defaults based on \
             {trend_desc} SPI trend (current: {:.2}){days_str}. Review and adjust as needed.",
            ctx.spi()
        )
    }
}

fn extract_days(formula: &str) -> f64 {
    let lower = formula.to_ascii_lowercase();
    let tokens: Vec<&str> = lower.split_whitespace().collect();
    for (i, token) in tokens.iter().enumerate() {
        if token.starts_with("days") && i > 0 {
            let candidate = tokens[i - 1].trim_start_matches('+');
            if let Ok(days) = candidate.parse::<f64>() {
                return days;
            }
        }
    }
    0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worsening_takes_seventy_fifth_percentile() {
        let spec = ParamSpec::numeric(5.0, 30.0, 10.0);
        assert_eq!(
            FallbackHandler::value_for(&spec, Trend::Worsening),
            Some(ParamValue::Int(24))
        );
        assert_eq!(
            FallbackHandler::value_for(&spec, Trend::Stable),
            Some(ParamValue::Int(18))
        );
        assert_eq!(
            FallbackHandler::value_for(&spec, Trend::Improving),
            Some(ParamValue::Int(11))
        );
    }

    #[test]
    fn float_bounds_keep_fractions() {
        let spec = ParamSpec::numeric(0.5, 2.0, 1.0);
        assert_eq!(
            FallbackHandler::value_for(&spec, Trend::Worsening),
            Some(ParamValue::Number(0.5 + 1.5 * 0.75))
        );
    }

    #[test]
    fn choices_map_trend_to_position() {
        let spec = ParamSpec::choice(&["voluntary", "recommended", "mandatory"], "recommended");
        assert_eq!(
            FallbackHandler::value_for(&spec, Trend::Worsening),
            Some(ParamValue::Text("mandatory".to_owned()))
        );
        assert_eq!(
            FallbackHandler::value_for(&spec, Trend::Stable),
            Some(ParamValue::Text("recommended".to_owned()))
        );
        assert_eq!(
            FallbackHandler::value_for(&spec, Trend::Improving),
            Some(ParamValue::Text("voluntary".to_owned()))
        );
    }

    #[test]
    fn flags_follow_worsening() {
        let spec = ParamSpec::flag(false);
        assert_eq!(
            FallbackHandler::value_for(&spec, Trend::Worsening),
            Some(ParamValue::Flag(true))
        );
        assert_eq!(
            FallbackHandler::value_for(&spec, Trend::Stable),
            Some(ParamValue::Flag(false))
        );
    }

    #[test]
    fn heuristic_defaults_take_precedence() {
        let mut schema = ParamSchema::new();
        schema.insert("level".to_owned(), ParamSpec::numeric(1.0, 10.0, 5.0));
        let mut defaults = ParamMap::new();
        defaults.insert("level".to_owned(), ParamValue::Int(3));
        let out = FallbackHandler.generate(&schema, Trend::Worsening, &defaults);
        assert_eq!(out.get("level"), Some(&ParamValue::Int(3)));
    }

    #[test]
    fn days_extraction_from_formulas() {
        let f = FallbackHandler;
        assert_eq!(f.estimate_effect("5% reduction = +3 days").days_gained, 3.0);
        assert_eq!(f.estimate_effect("1% removed = +1.3 days").days_gained, 1.3);
        assert_eq!(f.estimate_effect("10% pressure = +4 days").days_gained, 4.0);
        assert_eq!(f.estimate_effect("combined effects * 0.8").days_gained, 0.0);
        assert_eq!(f.estimate_effect("").days_gained, 0.0);
    }

    #[test]
    fn justification_names_percentile_and_trend() {
        let ctx = Context {
            trend: Trend::Worsening,
            spi_6: Some(-1.72),
            days_to_critical: Some(24),
            ..Context::default()
        };
        let text = FallbackHandler.justification(&ctx);
        assert!(text.contains("75th percentile"));
        assert!(text.contains("deteriorating"));
        assert!(text.contains("24 days"));
    }
}
