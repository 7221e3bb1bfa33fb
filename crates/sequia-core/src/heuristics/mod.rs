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

//! Activation heuristics.
//!
//! Every rule is a pure function of the shared read-only [`Context`]: it
//! either declines or returns an [`Activation`] with a 0-100 priority,
//! applicable action codes, default parameters and a justification.
//! Several rules share a tag (e.g. the flash-drought and pressure rules
//! are both `H2`); internal ids are unique and the tag is metadata.

mod h01_persistence;
mod h02_flash;
mod h03_communication;
mod h04_restriction;
mod h05_reallocation;
mod h06_escalation;
mod h07_preventive;
mod h08_critical;
mod h09_early_warning;
mod h10_magnitude;
mod h11_runway;
mod h12_stability;
mod h13_cooling;
mod h14_defense;
mod h15_extreme;

use sequia_types::{Context, ParamMap, ParamValue, Trend};

/// Result of one activated rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Activation {
    pub rule_id: &'static str,
    pub tag: &'static str,
    /// Priority score in [0, 100].
    pub priority: f64,
    pub action_codes: Vec<&'static str>,
    pub parameters: ParamMap,
    pub justification: String,
}

/// An action code selected after per-code deduplication, carrying the
/// winning rule's rationale and defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendedAction {
    pub action_code: &'static str,
    pub rule_id: &'static str,
    pub tag: &'static str,
    pub priority: f64,
    pub justification: String,
    pub default_parameters: ParamMap,
}

pub trait Heuristic: Send + Sync {
    fn id(&self) -> &'static str;
    fn tag(&self) -> &'static str;
    fn evaluate(&self, ctx: &Context) -> Option<Activation>;
}

/// Declarative activation window shared by the classical rules: a closed
/// SPI interval, optional days-to-critical bounds (only checked when an
/// estimate exists), and an allowed trend set.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Window {
    pub spi_min: f64,
    pub spi_max: f64,
    pub days_min: Option<u32>,
    pub days_max: Option<u32>,
    pub trends: &'static [Trend],
}

impl Window {
    pub fn matches(&self, ctx: &Context) -> bool {
        let spi = ctx.spi();
        if spi < self.spi_min || spi > self.spi_max {
            return false;
        }
        if !self.trends.contains(&ctx.trend) {
            return false;
        }
        if let Some(days) = ctx.days_to_critical {
            if self.days_min.is_some_and(|min| days < min) {
                return false;
            }
            if self.days_max.is_some_and(|max| days > max) {
                return false;
            }
        }
        true
    }
}

pub(crate) fn cap(priority: f64) -> f64 {
    priority.min(100.0)
}

pub(crate) fn params(entries: &[(&str, ParamValue)]) -> ParamMap {
    entries
        .iter()
        .map(|(k, v)| ((*k).to_owned(), v.clone()))
        .collect()
}

/// Flat, fixed-order rule bank.
#[derive(Debug)]
pub struct HeuristicRegistry {
    rules: Vec<Box<dyn Heuristic>>,
}

impl std::fmt::Debug for dyn Heuristic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Heuristic({})", self.id())
    }
}

impl Default for HeuristicRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl HeuristicRegistry {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(h01_persistence::PersistenceTrigger),
                Box::new(h01_persistence::IndustrialReduction),
                Box::new(h02_flash::FlashDrought),
                Box::new(h02_flash::PressureManagement),
                Box::new(h03_communication::SeasonalityCheck),
                Box::new(h03_communication::PublicCommunication),
                Box::new(h04_restriction::NonessentialRestriction),
                Box::new(h04_restriction::PhenologicalStress),
                Box::new(h05_reallocation::SourceReallocation),
                Box::new(h05_reallocation::TrendPrediction),
                Box::new(h06_escalation::SeverityEscalation),
                Box::new(h06_escalation::WetSeasonFailure),
                Box::new(h07_preventive::PreventiveMonitoring),
                Box::new(h07_preventive::ReservoirLag),
                Box::new(h08_critical::CriticalApproaching),
                Box::new(h08_critical::GroundwaterProxy),
                Box::new(h09_early_warning::EarlyWarning),
                Box::new(h09_early_warning::ScaleDifferential),
                Box::new(h10_magnitude::ModerateUrgent),
                Box::new(h10_magnitude::DroughtMagnitude),
                Box::new(h11_runway::ShortRunwayEmergency),
                Box::new(h11_runway::MarkovTransition),
                Box::new(h12_stability::StableSevere),
                Box::new(h12_stability::WeatherWhiplash),
                Box::new(h13_cooling::BorderlineHigh),
                Box::new(h13_cooling::CoolingTowers),
                Box::new(h14_defense::ImprovingMaintenance),
                Box::new(h14_defense::InfrastructureDefense),
                Box::new(h15_extreme::ExtremeLastChance),
                Box::new(h15_extreme::StepdownRecovery),
            ],
        }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn get(&self, rule_id: &str) -> Option<&dyn Heuristic> {
        self.rules
            .iter()
            .find(|r| r.id() == rule_id)
            .map(|r| r.as_ref())
    }

    /// Evaluate every rule; activated results sorted by priority descending,
    /// ties broken by registration order (the sort is stable).
    pub fn evaluate_all(&self, ctx: &Context) -> Vec<Activation> {
        let mut results: Vec<Activation> =
            self.rules.iter().filter_map(|r| r.evaluate(ctx)).collect();
        results.sort_by(|a, b| {
            b.priority
                .partial_cmp(&a.priority)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results
    }

    /// Flatten activations into per-action recommendations. When two rules
    /// emit the same code, the higher-priority activation wins and the
    /// other rationale is dropped.
    pub fn recommended_actions(&self, activations: &[Activation]) -> Vec<RecommendedAction> {
        let mut out: Vec<RecommendedAction> = Vec::new();
        for activation in activations {
            for code in &activation.action_codes {
                if out.iter().any(|r| r.action_code == *code) {
                    continue;
                }
                out.push(RecommendedAction {
                    action_code: *code,
                    rule_id: activation.rule_id,
                    tag: activation.tag,
                    priority: activation.priority,
                    justification: activation.justification.clone(),
                    default_parameters: activation.parameters.clone(),
                });
            }
        }
        out
    }
}
