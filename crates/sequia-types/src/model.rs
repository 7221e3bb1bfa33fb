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

//! Persisted entity shapes and exchange records.

use crate::enums::{
    Confidence, CoolingType, IngestStatus, Method, PlantStatus, PlantType, Profile, RiskLevel,
    ScenarioType, Trend, WaterDependency,
};
use crate::params::{ParamMap, ParamSchema};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A monitored geography.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zone {
    pub id: i64,
    pub slug: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub country_code: Option<String>,
    pub state_code: Option<String>,
    /// IANA timezone for coercing upstream data to local calendar days.
    pub timezone: Option<String>,
    /// Zone-local electricity price override, USD/MWh.
    pub marginal_price_usd_mwh: Option<f64>,
    /// Zone-local fuel price override, USD/MMBtu.
    pub fuel_price_usd_mmbtu: Option<f64>,
}

impl Zone {
    /// Client-input validation: slug shape and coordinate ranges.
    pub fn validate(&self) -> Result<(), String> {
        if self.slug.is_empty()
            || !self
                .slug
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
        {
            return Err(format!("malformed zone slug: {:?}", self.slug));
        }
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(format!("latitude out of range: {}", self.latitude));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(format!("longitude out of range: {}", self.longitude));
        }
        Ok(())
    }
}

/// One day of precipitation for a zone/source pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyPrecipitation {
    pub date: NaiveDate,
    pub value_mm: f64,
}

/// Append-only risk assessment result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskSnapshot {
    pub id: i64,
    pub zone_id: i64,
    pub spi_6m: f64,
    pub risk_level: RiskLevel,
    pub trend: Trend,
    /// `None` means the critical threshold is not projected to be reached.
    pub days_to_critical: Option<u32>,
    pub created_at: DateTime<Utc>,
}

/// Catalogued response action archetype.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionArchetype {
    pub code: String,
    pub title: String,
    pub description: String,
    pub heuristic_tag: String,
    /// SPI applicability window; unbounded sides are +/- infinity.
    pub spi_min: f64,
    pub spi_max: f64,
    pub impact_formula: String,
    pub base_cost_usd: f64,
    pub default_urgency_days: u32,
    pub schema: ParamSchema,
}

impl ActionArchetype {
    pub fn applies_to_spi(&self, spi: f64) -> bool {
        self.spi_min <= spi && spi <= self.spi_max
    }
}

/// Expected effect of a parameterized action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectedEffect {
    pub days_gained: f64,
    pub confidence: Confidence,
}

/// An archetype bound to a zone, profile and concrete parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionInstance {
    pub id: i64,
    pub zone_id: i64,
    pub archetype_code: String,
    pub profile: Profile,
    pub parameters: ParamMap,
    pub justification: String,
    pub expected_effect: ExpectedEffect,
    pub priority_score: f64,
    pub method: Method,
    pub created_at: DateTime<Utc>,
}

/// Persisted scenario outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationRecord {
    pub id: i64,
    pub zone_id: i64,
    pub scenario_type: ScenarioType,
    pub input_snapshot_id: Option<i64>,
    pub action_instance_ids: Vec<i64>,
    pub future_spi: f64,
    pub future_risk_level: RiskLevel,
    pub days_to_critical: Option<u32>,
    pub projection_days: u32,
    pub created_at: DateTime<Utc>,
}

/// Water-cooled generation asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerPlant {
    pub id: i64,
    pub zone_id: i64,
    pub name: String,
    pub plant_type: PlantType,
    pub capacity_mw: f64,
    pub water_dependency: WaterDependency,
    pub cooling_type: CoolingType,
    pub status: PlantStatus,
}

impl PowerPlant {
    pub fn validate(&self) -> Result<(), String> {
        if self.capacity_mw <= 0.0 {
            return Err(format!(
                "plant {:?} has non-positive capacity: {}",
                self.name, self.capacity_mw
            ));
        }
        Ok(())
    }
}

/// Per-plant economic simulation row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EconomicSimulationRow {
    pub id: i64,
    pub plant_id: i64,
    pub capacity_loss_pct_no_action: f64,
    pub capacity_loss_pct_with_action: f64,
    pub cost_no_action_usd: f64,
    pub cost_with_action_usd: f64,
    pub savings_usd: f64,
    pub marginal_price_usd_mwh: f64,
    pub fuel_price_usd_mmbtu: f64,
    pub projection_days: u32,
    pub created_at: DateTime<Utc>,
}

/// Per-(zone, source) ingestion outcome; failures of one pair never abort
/// the batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestReport {
    pub zone: String,
    pub source: String,
    pub records_added: u64,
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub status: IngestStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}
