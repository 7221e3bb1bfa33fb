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

//! Action parameter schemas and values.
//!
//! Archetype parameters are described by a tagged union: a numeric range,
//! an enumeration, or a boolean flag. Validation is monomorphic per
//! variant; numeric values are clamped to `[min, max]` and coerced to
//! integers when both bounds are integral.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Schema entry for a single action parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParamSpec {
    Numeric {
        min: f64,
        max: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<f64>,
    },
    Choice {
        options: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<String>,
    },
    Flag {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<bool>,
    },
}

impl ParamSpec {
    pub fn numeric(min: f64, max: f64, default: f64) -> Self {
        Self::Numeric {
            min,
            max,
            default: Some(default),
        }
    }

    pub fn choice(options: &[&str], default: &str) -> Self {
        Self::Choice {
            options: options.iter().map(|o| (*o).to_owned()).collect(),
            default: Some(default.to_owned()),
        }
    }

    pub fn flag(default: bool) -> Self {
        Self::Flag {
            default: Some(default),
        }
    }

    /// Both bounds integral, so validated values are rounded to integers.
    pub fn has_integer_bounds(&self) -> bool {
        match self {
            Self::Numeric { min, max, .. } => min.fract() == 0.0 && max.fract() == 0.0,
            Self::Choice { .. } | Self::Flag { .. } => false,
        }
    }

    /// Schema-declared default, if any, as a concrete value.
    pub fn default_value(&self) -> Option<ParamValue> {
        match self {
            Self::Numeric { default, .. } => default.map(|d| {
                if self.has_integer_bounds() {
                    ParamValue::Int(d.round() as i64)
                } else {
                    ParamValue::Number(d)
                }
            }),
            Self::Choice { default, .. } => default.clone().map(ParamValue::Text),
            Self::Flag { default } => default.map(ParamValue::Flag),
        }
    }
}

/// A concrete parameter value.
///
/// Untagged, so `24`, `23.75`, `true` and `"all"` all round-trip through
/// JSON the way an LLM would emit them. `Flag` and `Int` must precede
/// `Number` for deserialization to keep integers integral.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Flag(bool),
    Int(i64),
    Number(f64),
    Text(String),
}

impl ParamValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Number(n) => Some(*n),
            Self::Flag(_) | Self::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Flag(_) | Self::Int(_) | Self::Number(_) => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Ordered parameter schema; ordering keeps prompts and serialized
/// instances reproducible.
pub type ParamSchema = BTreeMap<String, ParamSpec>;

/// Ordered parameter values bound to an action instance.
pub type ParamMap = BTreeMap<String, ParamValue>;
