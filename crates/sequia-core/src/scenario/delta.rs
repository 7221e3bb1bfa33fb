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

//! Quantified difference between the two scenarios.

use super::builder::ScenarioProjection;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioDelta {
    /// Extra days before the critical threshold; `projection_days` when the
    /// actions avoid the crossing entirely.
    pub days_gained: i64,
    /// Ending with-action SPI minus ending no-action SPI.
    pub spi_improvement: f64,
    /// Discrete risk-level steps improved at the horizon.
    pub risk_level_improvement: i32,
    pub reaches_critical_no_action: bool,
    pub reaches_critical_with_action: bool,
    pub critical_delayed_by: Option<i64>,
}

#[derive(Debug, Clone, Copy)]
pub struct DeltaCalculator {
    critical_threshold: f64,
}

impl Default for DeltaCalculator {
    fn default() -> Self {
        Self {
            critical_threshold: -2.0,
        }
    }
}

impl DeltaCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_threshold(critical_threshold: f64) -> Self {
        Self { critical_threshold }
    }

    pub fn calculate(
        &self,
        no_action: &ScenarioProjection,
        with_action: &ScenarioProjection,
    ) -> ScenarioDelta {
        let days_gained = match (no_action.days_to_critical, with_action.days_to_critical) {
            (Some(no), Some(with)) => i64::from(with) - i64::from(no),
            // Actions avoid critical within the horizon.
            (Some(_), None) => i64::from(no_action.projection_days),
            _ => 0,
        };

        let critical_delayed_by =
            match (no_action.days_to_critical, with_action.days_to_critical) {
                (Some(no), Some(with)) => Some(i64::from(with) - i64::from(no)),
                _ => None,
            };

        ScenarioDelta {
            days_gained,
            spi_improvement: with_action.ending_spi - no_action.ending_spi,
            risk_level_improvement: with_action.ending_risk.rank() - no_action.ending_risk.rank(),
            reaches_critical_no_action: no_action.ending_spi <= self.critical_threshold,
            reaches_critical_with_action: with_action.ending_spi <= self.critical_threshold,
            critical_delayed_by,
        }
    }

    /// Deterministic human-readable summary; no model involvement.
    pub fn summary(&self, delta: &ScenarioDelta) -> String {
        let mut lines = Vec::new();

        if delta.days_gained > 0 {
            lines.push(format!(
                "Gains {} days before the critical threshold",
                delta.days_gained
            ));
        } else if delta.days_gained < 0 {
            lines.push(format!(
                "Loses {} days (review action parameters)",
                delta.days_gained.abs()
            ));
        } else {
            lines.push("No change in days to critical".to_owned());
        }

        if delta.spi_improvement > 0.0 {
            lines.push(format!("SPI improves by +{:.2}", delta.spi_improvement));
        } else if delta.spi_improvement < 0.0 {
            lines.push(format!("SPI worsens by {:.2}", delta.spi_improvement));
        }

        if delta.risk_level_improvement > 0 {
            lines.push(format!(
                "Risk level improves by {} step(s)",
                delta.risk_level_improvement
            ));
        }

        match (
            delta.reaches_critical_no_action,
            delta.reaches_critical_with_action,
        ) {
            (true, false) => lines.push("Actions prevent reaching the critical threshold".to_owned()),
            (true, true) => match delta.critical_delayed_by {
                Some(d) if d > 0 => {
                    lines.push(format!("Critical still reached, but delayed by {d} days"));
                }
                _ => lines.push("Critical threshold still reached".to_owned()),
            },
            _ => {}
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::{ActionEffect, ScenarioBuilder};
    use sequia_types::Trend;

    fn effects(days: &[f64]) -> Vec<ActionEffect> {
        days.iter()
            .enumerate()
            .map(|(i, d)| ActionEffect {
                archetype_code: format!("A{i}"),
                days_gained: *d,
                spi_improvement: d * 0.02,
                activation_day: 3,
            })
            .collect()
    }

    #[test]
    fn delta_sign_law_holds_for_nonnegative_gains() {
        let b = ScenarioBuilder::new();
        let cmp = b.compare(-1.6, Trend::Worsening, &effects(&[5.0, 0.0, 12.0]), 90, None);
        assert!(cmp.delta.days_gained >= 0);
        assert!(cmp.delta.spi_improvement >= 0.0);
        assert!(cmp.with_action.ending_spi >= cmp.no_action.ending_spi);
    }

    #[test]
    fn avoiding_critical_counts_full_horizon() {
        let b = ScenarioBuilder::new();
        // Improving from -1.4: base estimate exists but with-action stays None
        // only when base is None; craft via stable shallow case instead.
        let no = b.no_action(-1.9, Trend::Worsening, 90, None);
        let mut with = no.clone();
        with.days_to_critical = None;
        let delta = DeltaCalculator::new().calculate(&no, &with);
        assert_eq!(delta.days_gained, 90);
        assert_eq!(delta.critical_delayed_by, None);
    }

    #[test]
    fn summary_mentions_prevention() {
        let calc = DeltaCalculator::new();
        let delta = ScenarioDelta {
            days_gained: 28,
            spi_improvement: 0.56,
            risk_level_improvement: 1,
            reaches_critical_no_action: true,
            reaches_critical_with_action: false,
            critical_delayed_by: Some(28),
        };
        let text = calc.summary(&delta);
        assert!(text.contains("Gains 28 days"));
        assert!(text.contains("prevent"));
        assert!(text.contains("+0.56"));
    }

    #[test]
    fn summary_handles_delay_only() {
        let calc = DeltaCalculator::new();
        let delta = ScenarioDelta {
            days_gained: 10,
            spi_improvement: 0.2,
            risk_level_improvement: 0,
            reaches_critical_no_action: true,
            reaches_critical_with_action: true,
            critical_delayed_by: Some(10),
        };
        let text = calc.summary(&delta);
        assert!(text.contains("delayed by 10 days"));
    }
}
