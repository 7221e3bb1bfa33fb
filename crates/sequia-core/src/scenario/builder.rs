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

//! No-action and with-action scenario construction.
//!
//! The with-action trajectory overlays the base projection with each
//! action's SPI improvement, ramped in linearly over `ramp_days` starting
//! at the action's activation day.

use super::delta::{DeltaCalculator, ScenarioDelta};
use super::estimator::{CriticalEstimator, ScenarioParams, TrajectoryPoint};
use sequia_types::{ActionArchetype, ActionInstance, RiskLevel, ScenarioType, Trend};
use serde::{Deserialize, Serialize};

/// Effect of one parameterized action on the projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionEffect {
    pub archetype_code: String,
    pub days_gained: f64,
    pub spi_improvement: f64,
    /// Day the effect starts ramping in.
    pub activation_day: u32,
}

impl ActionEffect {
    /// Derive the effect from a persisted instance and its archetype; the
    /// activation day is the archetype's default urgency.
    pub fn from_instance(
        instance: &ActionInstance,
        archetype: &ActionArchetype,
        params: &ScenarioParams,
    ) -> Self {
        let days_gained = instance.expected_effect.days_gained.max(0.0);
        Self {
            archetype_code: instance.archetype_code.clone(),
            days_gained,
            spi_improvement: days_gained * params.spi_per_day_gained,
            activation_day: archetype.default_urgency_days,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioProjection {
    pub scenario_type: ScenarioType,
    pub projection_days: u32,
    pub starting_spi: f64,
    pub ending_spi: f64,
    pub starting_risk: RiskLevel,
    pub ending_risk: RiskLevel,
    pub days_to_critical: Option<u32>,
    pub trajectory: Vec<TrajectoryPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioComparison {
    pub no_action: ScenarioProjection,
    pub with_action: ScenarioProjection,
    pub delta: ScenarioDelta,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScenarioBuilder {
    estimator: CriticalEstimator,
}

impl ScenarioBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(params: ScenarioParams) -> Self {
        Self {
            estimator: CriticalEstimator::with_params(params),
        }
    }

    pub fn estimator(&self) -> &CriticalEstimator {
        &self.estimator
    }

    pub fn no_action(
        &self,
        current_spi: f64,
        trend: Trend,
        projection_days: u32,
        spi_series: Option<&[f64]>,
    ) -> ScenarioProjection {
        let trajectory =
            self.estimator
                .project_trajectory(current_spi, trend, projection_days, spi_series);
        let ending_spi = trajectory.last().map_or(current_spi, |p| p.projected_spi);
        ScenarioProjection {
            scenario_type: ScenarioType::NoAction,
            projection_days,
            starting_spi: current_spi,
            ending_spi,
            starting_risk: RiskLevel::from_spi(current_spi),
            ending_risk: RiskLevel::from_spi(ending_spi),
            days_to_critical: self
                .estimator
                .days_to_critical(current_spi, trend, spi_series),
            trajectory,
        }
    }

    pub fn with_action(
        &self,
        current_spi: f64,
        trend: Trend,
        effects: &[ActionEffect],
        projection_days: u32,
        spi_series: Option<&[f64]>,
    ) -> ScenarioProjection {
        let base = self.no_action(current_spi, trend, projection_days, spi_series);
        if effects.is_empty() {
            return ScenarioProjection {
                scenario_type: ScenarioType::WithAction,
                ..base
            };
        }

        let ramp_days = self.estimator.params().ramp_days;
        let trajectory: Vec<TrajectoryPoint> = base
            .trajectory
            .iter()
            .map(|point| {
                let improvement = cumulative_improvement(effects, point.day, ramp_days);
                let improved = point.projected_spi + improvement;
                TrajectoryPoint {
                    day: point.day,
                    projected_spi: improved,
                    risk_level: RiskLevel::from_spi(improved),
                    improvement_applied: improvement,
                }
            })
            .collect();

        let ending_spi = trajectory.last().map_or(current_spi, |p| p.projected_spi);
        let total_days_gained: f64 = effects.iter().map(|e| e.days_gained).sum();
        let days_to_critical = base
            .days_to_critical
            .map(|d| d.saturating_add(total_days_gained.round() as u32));

        ScenarioProjection {
            scenario_type: ScenarioType::WithAction,
            projection_days,
            starting_spi: current_spi,
            ending_spi,
            starting_risk: RiskLevel::from_spi(current_spi),
            ending_risk: RiskLevel::from_spi(ending_spi),
            days_to_critical,
            trajectory,
        }
    }

    pub fn compare(
        &self,
        current_spi: f64,
        trend: Trend,
        effects: &[ActionEffect],
        projection_days: u32,
        spi_series: Option<&[f64]>,
    ) -> ScenarioComparison {
        let no_action = self.no_action(current_spi, trend, projection_days, spi_series);
        let with_action =
            self.with_action(current_spi, trend, effects, projection_days, spi_series);
        let delta = DeltaCalculator::with_threshold(self.estimator.params().critical_threshold)
            .calculate(&no_action, &with_action);
        ScenarioComparison {
            no_action,
            with_action,
            delta,
        }
    }
}

/// Sum of each effect's improvement, ramped linearly from its activation
/// day to full effect `ramp_days` later.
fn cumulative_improvement(effects: &[ActionEffect], day: u32, ramp_days: f64) -> f64 {
    effects
        .iter()
        .map(|e| {
            let since = f64::from(day) - f64::from(e.activation_day);
            let ramp = (since / ramp_days).clamp(0.0, 1.0);
            e.spi_improvement * ramp
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn effect(code: &str, days_gained: f64, activation_day: u32) -> ActionEffect {
        ActionEffect {
            archetype_code: code.to_owned(),
            days_gained,
            spi_improvement: days_gained * 0.02,
            activation_day,
        }
    }

    #[test]
    fn empty_action_list_equals_no_action() {
        let b = ScenarioBuilder::new();
        let no = b.no_action(-1.5, Trend::Worsening, 60, None);
        let with = b.with_action(-1.5, Trend::Worsening, &[], 60, None);
        assert_eq!(no.trajectory.len(), with.trajectory.len());
        assert_eq!(no.ending_spi, with.ending_spi);
        assert_eq!(with.scenario_type, ScenarioType::WithAction);
    }

    #[test]
    fn improvement_ramps_in_over_fourteen_days() {
        let effects = [effect("X", 10.0, 0)];
        assert_eq!(cumulative_improvement(&effects, 0, 14.0), 0.0);
        let half = cumulative_improvement(&effects, 7, 14.0);
        assert!((half - 0.1).abs() < 1e-12);
        let full = cumulative_improvement(&effects, 14, 14.0);
        assert!((full - 0.2).abs() < 1e-12);
        assert_eq!(cumulative_improvement(&effects, 60, 14.0), full);
    }

    #[test]
    fn activation_day_delays_the_ramp() {
        let effects = [effect("X", 10.0, 20)];
        assert_eq!(cumulative_improvement(&effects, 10, 14.0), 0.0);
        assert_eq!(cumulative_improvement(&effects, 20, 14.0), 0.0);
        assert!(cumulative_improvement(&effects, 27, 14.0) > 0.0);
    }

    #[test]
    fn with_action_ending_never_below_no_action() {
        let b = ScenarioBuilder::new();
        let effects = [effect("A", 19.0, 3), effect("B", 6.0, 14), effect("C", 3.0, 7)];
        let cmp = b.compare(-1.72, Trend::Worsening, &effects, 90, None);
        assert!(cmp.with_action.ending_spi >= cmp.no_action.ending_spi);
        assert!(cmp.delta.days_gained >= 0);
        for (n, w) in cmp
            .no_action
            .trajectory
            .iter()
            .zip(&cmp.with_action.trajectory)
        {
            assert!(w.projected_spi >= n.projected_spi);
        }
    }

    #[test]
    fn days_to_critical_extends_by_days_gained() {
        let b = ScenarioBuilder::new();
        let effects = [effect("A", 19.0, 3), effect("B", 6.0, 14), effect("C", 3.0, 7)];
        let cmp = b.compare(-1.72, Trend::Worsening, &effects, 90, None);
        let base = cmp.no_action.days_to_critical.unwrap();
        let with = cmp.with_action.days_to_critical.unwrap();
        assert_eq!(with, base + 28);
        assert_eq!(cmp.delta.days_gained, 28);
    }

    #[test]
    fn negative_days_gained_are_clamped_at_zero_effect() {
        use sequia_types::{Confidence, ExpectedEffect, Method, ParamSchema, Profile};
        let archetype = ActionArchetype {
            code: "X".to_owned(),
            title: String::new(),
            description: String::new(),
            heuristic_tag: "H1".to_owned(),
            spi_min: f64::NEG_INFINITY,
            spi_max: f64::INFINITY,
            impact_formula: String::new(),
            base_cost_usd: 0.0,
            default_urgency_days: 5,
            schema: ParamSchema::new(),
        };
        let instance = ActionInstance {
            id: 1,
            zone_id: 1,
            archetype_code: "X".to_owned(),
            profile: Profile::Government,
            parameters: Default::default(),
            justification: String::new(),
            expected_effect: ExpectedEffect {
                days_gained: -4.0,
                confidence: Confidence::Low,
            },
            priority_score: 10.0,
            method: Method::Fallback,
            created_at: chrono::Utc::now(),
        };
        let effect = ActionEffect::from_instance(&instance, &archetype, &ScenarioParams::default());
        assert_eq!(effect.days_gained, 0.0);
        assert_eq!(effect.spi_improvement, 0.0);
        assert_eq!(effect.activation_day, 5);
    }
}
