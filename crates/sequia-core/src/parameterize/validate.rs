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

//! Schema validation for model-produced parameters.

use sequia_types::{ParamMap, ParamSchema, ParamSpec, ParamValue};

/// Clamp and coerce a raw parameter map against the archetype schema.
///
/// - numeric values clamp into `[min, max]`, rounding to integers when both
///   bounds are integral;
/// - enumerated values outside `options` fall back to the default (or the
///   first option);
/// - values of the wrong shape are replaced by the schema default when one
///   exists, dropped otherwise;
/// - parameters the schema does not know are kept untouched;
/// - schema entries missing from the input are filled from their defaults.
pub fn validate_parameters(raw: &ParamMap, schema: &ParamSchema) -> ParamMap {
    if schema.is_empty() {
        return raw.clone();
    }

    let mut out = ParamMap::new();

    for (name, value) in raw {
        let Some(spec) = schema.get(name) else {
            out.insert(name.clone(), value.clone());
            continue;
        };
        if let Some(valid) = coerce(value, spec) {
            out.insert(name.clone(), valid);
        }
    }

    for (name, spec) in schema {
        if !out.contains_key(name)
            && let Some(default) = spec.default_value()
        {
            out.insert(name.clone(), default);
        }
    }

    out
}

fn coerce(value: &ParamValue, spec: &ParamSpec) -> Option<ParamValue> {
    match spec {
        ParamSpec::Numeric { min, max, .. } => match value.as_f64() {
            Some(v) => {
                let clamped = v.clamp(*min, *max);
                if spec.has_integer_bounds() {
                    Some(ParamValue::Int(clamped.round() as i64))
                } else {
                    Some(ParamValue::Number(clamped))
                }
            }
            None => spec.default_value(),
        },
        ParamSpec::Choice { options, default } => match value {
            ParamValue::Text(s) if options.contains(s) => Some(value.clone()),
            _ => default
                .clone()
                .map(ParamValue::Text)
                .or_else(|| options.first().cloned().map(ParamValue::Text)),
        },
        ParamSpec::Flag { .. } => match value {
            ParamValue::Flag(_) => Some(value.clone()),
            _ => spec.default_value(),
        },
    }
}
