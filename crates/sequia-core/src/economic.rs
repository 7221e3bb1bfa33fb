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

//! Avoided-cost estimation for water-cooled power plants.
//!
//! SPI buckets map to base capacity-loss fractions; plant water dependency
//! and cooling type scale the base, capped at 80%. Costs integrate day by
//! day over the two SPI trajectories. Replacement power is the primary
//! figure; emergency fuel is reported as informational.

use crate::scenario::TrajectoryPoint;
use sequia_types::{CoolingType, PowerPlant, WaterDependency};
use serde::{Deserialize, Serialize};

const MAX_CAPACITY_LOSS: f64 = 0.80;
const HOURS_PER_DAY: f64 = 24.0;

/// Base capacity-loss fraction for an SPI value.
pub fn capacity_loss_base(spi: f64) -> f64 {
    if spi > -0.5 {
        0.0
    } else if spi > -1.0 {
        0.05
    } else if spi > -1.5 {
        0.15
    } else if spi > -2.0 {
        0.30
    } else {
        0.50
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EconomicScenarioResult {
    pub capacity_loss_pct: f64,
    pub capacity_lost_mw: f64,
    pub lost_generation_mwh: f64,
    pub replacement_cost_usd: f64,
    pub emergency_fuel_cost_usd: f64,
    pub total_cost_usd: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantEconomicDelta {
    pub no_action: EconomicScenarioResult,
    pub with_action: EconomicScenarioResult,
    pub savings_usd: f64,
    pub savings_pct: f64,
    pub summary: String,
}

/// Per-plant line of the aggregate breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantBreakdown {
    pub plant_id: i64,
    pub plant_name: String,
    pub capacity_mw: f64,
    pub cost_no_action_usd: f64,
    pub cost_with_action_usd: f64,
    pub savings_usd: f64,
    pub capacity_loss_no_action: f64,
    pub capacity_loss_with_action: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomicAggregate {
    pub plants_analyzed: usize,
    pub total_capacity_mw: f64,
    pub total_cost_no_action_usd: f64,
    pub total_cost_with_action_usd: f64,
    pub total_savings_usd: f64,
    pub savings_pct: f64,
    pub per_plant: Vec<PlantBreakdown>,
    pub summary: String,
}

#[derive(Debug, Clone, Copy)]
pub struct EconomicEngine {
    heat_rate_mmbtu_per_mwh: f64,
}

impl Default for EconomicEngine {
    fn default() -> Self {
        Self {
            heat_rate_mmbtu_per_mwh: 7.0,
        }
    }
}

impl EconomicEngine {
    pub fn new(heat_rate_mmbtu_per_mwh: f64) -> Self {
        Self {
            heat_rate_mmbtu_per_mwh,
        }
    }

    /// Adjusted capacity-loss fraction for a plant at a given SPI.
    pub fn capacity_loss_pct(
        &self,
        spi: f64,
        dependency: WaterDependency,
        cooling: CoolingType,
    ) -> f64 {
        let adjusted = capacity_loss_base(spi) * dependency.loss_factor() * cooling.loss_factor();
        adjusted.min(MAX_CAPACITY_LOSS)
    }

    pub fn replacement_cost(
        &self,
        capacity_lost_mw: f64,
        hours: f64,
        marginal_price_usd_mwh: f64,
    ) -> f64 {
        capacity_lost_mw * hours * marginal_price_usd_mwh
    }

    pub fn emergency_fuel_cost(
        &self,
        capacity_lost_mw: f64,
        hours: f64,
        fuel_price_usd_mmbtu: f64,
    ) -> f64 {
        capacity_lost_mw * hours * self.heat_rate_mmbtu_per_mwh * fuel_price_usd_mmbtu
    }

    /// Single-point scenario cost over a flat SPI.
    pub fn scenario_cost(
        &self,
        plant: &PowerPlant,
        spi: f64,
        projection_days: u32,
        marginal_price_usd_mwh: f64,
        fuel_price_usd_mmbtu: f64,
    ) -> EconomicScenarioResult {
        let loss_pct = self.capacity_loss_pct(spi, plant.water_dependency, plant.cooling_type);
        let capacity_lost_mw = plant.capacity_mw * loss_pct;
        let hours = f64::from(projection_days) * HOURS_PER_DAY;
        let replacement = self.replacement_cost(capacity_lost_mw, hours, marginal_price_usd_mwh);
        let fuel = self.emergency_fuel_cost(capacity_lost_mw, hours, fuel_price_usd_mmbtu);

        EconomicScenarioResult {
            capacity_loss_pct: loss_pct,
            capacity_lost_mw,
            lost_generation_mwh: capacity_lost_mw * hours,
            replacement_cost_usd: replacement,
            emergency_fuel_cost_usd: fuel,
            // Replacement power is the primary estimate.
            total_cost_usd: replacement,
        }
    }

    pub fn plant_delta(
        &self,
        plant: &PowerPlant,
        spi_no_action: f64,
        spi_with_action: f64,
        projection_days: u32,
        marginal_price_usd_mwh: f64,
        fuel_price_usd_mmbtu: f64,
    ) -> PlantEconomicDelta {
        let no_action = self.scenario_cost(
            plant,
            spi_no_action,
            projection_days,
            marginal_price_usd_mwh,
            fuel_price_usd_mmbtu,
        );
        let with_action = self.scenario_cost(
            plant,
            spi_with_action,
            projection_days,
            marginal_price_usd_mwh,
            fuel_price_usd_mmbtu,
        );

        let savings_usd = no_action.total_cost_usd - with_action.total_cost_usd;
        let savings_pct = if no_action.total_cost_usd > 0.0 {
            savings_usd / no_action.total_cost_usd * 100.0
        } else {
            0.0
        };

        let summary = plant_summary(plant, &no_action, &with_action, savings_usd);
        PlantEconomicDelta {
            no_action,
            with_action,
            savings_usd,
            savings_pct,
            summary,
        }
    }

    /// Day-by-day integration over the two SPI trajectories. Captures days
    /// where actions keep the plant in a better loss bucket.
    pub fn daily_costs(
        &self,
        plant: &PowerPlant,
        trajectory_no_action: &[TrajectoryPoint],
        trajectory_with_action: &[TrajectoryPoint],
        marginal_price_usd_mwh: f64,
    ) -> (f64, f64) {
        let mut total_no = 0.0;
        let mut total_with = 0.0;

        for (i, day_no) in trajectory_no_action.iter().enumerate() {
            let spi_no = day_no.projected_spi;
            let spi_with = trajectory_with_action
                .get(i)
                .map_or(spi_no, |p| p.projected_spi);

            let loss_no =
                self.capacity_loss_pct(spi_no, plant.water_dependency, plant.cooling_type);
            let loss_with =
                self.capacity_loss_pct(spi_with, plant.water_dependency, plant.cooling_type);

            total_no += plant.capacity_mw * loss_no * HOURS_PER_DAY * marginal_price_usd_mwh;
            total_with += plant.capacity_mw * loss_with * HOURS_PER_DAY * marginal_price_usd_mwh;
        }
        (total_no, total_with)
    }

    /// Aggregate across plants, day-by-day when trajectories are supplied.
    #[allow(clippy::too_many_arguments)]
    pub fn aggregate(
        &self,
        plants: &[PowerPlant],
        spi_no_action: f64,
        spi_with_action: f64,
        projection_days: u32,
        marginal_price_usd_mwh: f64,
        fuel_price_usd_mmbtu: f64,
        trajectories: Option<(&[TrajectoryPoint], &[TrajectoryPoint])>,
    ) -> EconomicAggregate {
        let mut per_plant = Vec::with_capacity(plants.len());
        let mut total_no = 0.0;
        let mut total_with = 0.0;

        for plant in plants {
            let (cost_no, cost_with, loss_no, loss_with) = match trajectories {
                Some((traj_no, traj_with)) if !traj_no.is_empty() => {
                    let (no, with) =
                        self.daily_costs(plant, traj_no, traj_with, marginal_price_usd_mwh);
                    let hours = traj_no.len() as f64 * HOURS_PER_DAY;
                    let max_cost = plant.capacity_mw * hours * marginal_price_usd_mwh;
                    let eff_no = if max_cost > 0.0 { no / max_cost } else { 0.0 };
                    let eff_with = if max_cost > 0.0 { with / max_cost } else { 0.0 };
                    (no, with, eff_no, eff_with)
                }
                _ => {
                    let delta = self.plant_delta(
                        plant,
                        spi_no_action,
                        spi_with_action,
                        projection_days,
                        marginal_price_usd_mwh,
                        fuel_price_usd_mmbtu,
                    );
                    (
                        delta.no_action.total_cost_usd,
                        delta.with_action.total_cost_usd,
                        delta.no_action.capacity_loss_pct,
                        delta.with_action.capacity_loss_pct,
                    )
                }
            };

            total_no += cost_no;
            total_with += cost_with;
            per_plant.push(PlantBreakdown {
                plant_id: plant.id,
                plant_name: plant.name.clone(),
                capacity_mw: plant.capacity_mw,
                cost_no_action_usd: cost_no,
                cost_with_action_usd: cost_with,
                savings_usd: cost_no - cost_with,
                capacity_loss_no_action: loss_no,
                capacity_loss_with_action: loss_with,
            });
        }

        let total_savings = total_no - total_with;
        let savings_pct = if total_no > 0.0 {
            total_savings / total_no * 100.0
        } else {
            0.0
        };
        let total_capacity: f64 = plants.iter().map(|p| p.capacity_mw).sum();
        let summary = aggregate_summary(plants.len(), total_capacity, total_savings, savings_pct);

        EconomicAggregate {
            plants_analyzed: plants.len(),
            total_capacity_mw: total_capacity,
            total_cost_no_action_usd: total_no,
            total_cost_with_action_usd: total_with,
            total_savings_usd: total_savings,
            savings_pct,
            per_plant,
            summary,
        }
    }
}

fn plant_summary(
    plant: &PowerPlant,
    no_action: &EconomicScenarioResult,
    with_action: &EconomicScenarioResult,
    savings_usd: f64,
) -> String {
    if savings_usd <= 0.0 {
        return format!(
            "No economic benefit from intervention for {}. Water stress does not \
             significantly impact this plant's capacity.",
            plant.name
        );
    }
    format!(
        "Implementing water actions for {} ({:.0} MW) reduces capacity loss from {:.0}% to \
         {:.0}%, avoiding ${:.0} in replacement power and emergency fuel costs.",
        plant.name,
        plant.capacity_mw,
        no_action.capacity_loss_pct * 100.0,
        with_action.capacity_loss_pct * 100.0,
        savings_usd
    )
}

fn aggregate_summary(
    plants: usize,
    total_capacity_mw: f64,
    total_savings_usd: f64,
    savings_pct: f64,
) -> String {
    if total_savings_usd <= 0.0 {
        return format!(
            "No net avoided cost across {plants} plant(s) ({total_capacity_mw:.0} MW) under the \
             simulated drought trajectories."
        );
    }
    format!(
        "Across {plants} plant(s) totaling {total_capacity_mw:.0} MW, early action avoids \
         ${total_savings_usd:.0} ({savings_pct:.1}%) in replacement power costs."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use sequia_types::{PlantStatus, PlantType};

    fn plant(dep: WaterDependency, cooling: CoolingType, mw: f64) -> PowerPlant {
        PowerPlant {
            id: 1,
            zone_id: 1,
            name: "Unit 1".to_owned(),
            plant_type: PlantType::Thermoelectric,
            capacity_mw: mw,
            water_dependency: dep,
            cooling_type: cooling,
            status: PlantStatus::Active,
        }
    }

    #[test]
    fn base_loss_buckets() {
        assert_eq!(capacity_loss_base(0.2), 0.0);
        assert_eq!(capacity_loss_base(-0.5), 0.05);
        assert_eq!(capacity_loss_base(-1.0), 0.15);
        assert_eq!(capacity_loss_base(-1.5), 0.30);
        assert_eq!(capacity_loss_base(-1.72), 0.30);
        assert_eq!(capacity_loss_base(-2.0), 0.50);
        assert_eq!(capacity_loss_base(-3.0), 0.50);
    }

    #[test]
    fn dependency_and_cooling_scale_the_base() {
        let e = EconomicEngine::default();
        let high =
            e.capacity_loss_pct(-1.72, WaterDependency::High, CoolingType::Recirculating);
        assert!((high - 0.30).abs() < 1e-12);
        let medium =
            e.capacity_loss_pct(-1.72, WaterDependency::Medium, CoolingType::Recirculating);
        assert!((medium - 0.18).abs() < 1e-12);
        let dry = e.capacity_loss_pct(-2.5, WaterDependency::High, CoolingType::Dry);
        assert!((dry - 0.10).abs() < 1e-12);
    }

    #[test]
    fn loss_is_capped_at_eighty_pct() {
        let e = EconomicEngine::default();
        // 0.50 * 1.0 * 1.2 = 0.60 stays under the cap; force it with a
        // hypothetical stacking via once-through at extreme SPI.
        let v = e.capacity_loss_pct(-2.5, WaterDependency::High, CoolingType::OnceThrough);
        assert!(v <= MAX_CAPACITY_LOSS);
    }

    #[test]
    fn replacement_is_primary_cost() {
        let e = EconomicEngine::default();
        let p = plant(WaterDependency::High, CoolingType::Recirculating, 1000.0);
        let result = e.scenario_cost(&p, -1.72, 90, 95.0, 3.0);
        assert!((result.capacity_loss_pct - 0.30).abs() < 1e-12);
        assert!((result.capacity_lost_mw - 300.0).abs() < 1e-9);
        assert_eq!(result.total_cost_usd, result.replacement_cost_usd);
        // 300 MW * 2160 h * 95 $/MWh
        assert!((result.replacement_cost_usd - 300.0 * 2160.0 * 95.0).abs() < 1e-3);
        // Emergency fuel: 300 MW * 2160 h * 7 MMBtu/MWh * 3 $/MMBtu
        assert!((result.emergency_fuel_cost_usd - 300.0 * 2160.0 * 7.0 * 3.0).abs() < 1e-3);
    }

    #[test]
    fn savings_positive_when_action_improves_spi() {
        let e = EconomicEngine::default();
        let p = plant(WaterDependency::High, CoolingType::Recirculating, 2500.0);
        let delta = e.plant_delta(&p, -1.72, -1.42, 90, 95.0, 3.0);
        assert!(delta.savings_usd > 0.0);
        assert!(delta.savings_pct > 0.0 && delta.savings_pct <= 100.0);
        assert!(delta.summary.contains("Unit 1"));
    }

    #[test]
    fn zero_cost_baseline_yields_zero_pct() {
        let e = EconomicEngine::default();
        let p = plant(WaterDependency::Low, CoolingType::Dry, 500.0);
        let delta = e.plant_delta(&p, 0.5, 0.8, 90, 95.0, 3.0);
        assert_eq!(delta.savings_usd, 0.0);
        assert_eq!(delta.savings_pct, 0.0);
    }

    #[test]
    fn daily_integration_tracks_bucket_crossings() {
        use sequia_types::RiskLevel;
        let e = EconomicEngine::default();
        let p = plant(WaterDependency::High, CoolingType::Recirculating, 1000.0);
        let mk = |spi: f64, day: u32| TrajectoryPoint {
            day,
            projected_spi: spi,
            risk_level: RiskLevel::from_spi(spi),
            improvement_applied: 0.0,
        };
        let traj_no: Vec<_> = (0..10).map(|d| mk(-1.6 - 0.06 * f64::from(d), d)).collect();
        let traj_with: Vec<_> = (0..10).map(|d| mk(-1.3, d)).collect();
        let (no, with) = e.daily_costs(&p, &traj_no, &traj_with, 100.0);
        assert!(no > with);
        // With-action stays in the 0.15 bucket: 1000 * 0.15 * 24 * 100 per day.
        assert!((with - 10.0 * 1000.0 * 0.15 * 24.0 * 100.0).abs() < 1e-6);
    }

    #[test]
    fn aggregate_combines_plants() {
        let e = EconomicEngine::default();
        let plants = vec![
            plant(WaterDependency::High, CoolingType::Recirculating, 3000.0),
            plant(WaterDependency::Medium, CoolingType::Recirculating, 2000.0),
            plant(WaterDependency::Low, CoolingType::Dry, 1000.0),
        ];
        let agg = e.aggregate(&plants, -1.72, -1.42, 90, 95.0, 3.0, None);
        assert_eq!(agg.plants_analyzed, 3);
        assert!((agg.total_capacity_mw - 6000.0).abs() < 1e-9);
        assert!(agg.total_savings_usd > 0.0);
        assert!(agg.savings_pct > 0.0 && agg.savings_pct < 100.0);
        assert_eq!(agg.per_plant.len(), 3);
    }
}
