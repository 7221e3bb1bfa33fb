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

use serde::{Deserialize, Serialize};
use std::fmt;

/// Risk classification derived from SPI-6.
///
/// Boundary values belong to the more severe class: `from_spi(-1.0)` is
/// `High`, not `Medium`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn from_spi(spi: f64) -> Self {
        if spi > -0.5 {
            Self::Low
        } else if spi > -1.0 {
            Self::Medium
        } else if spi > -1.5 {
            Self::High
        } else {
            Self::Critical
        }
    }

    /// Ordering index with `Critical` lowest, used for level-delta math.
    pub fn rank(self) -> i32 {
        match self {
            Self::Critical => 0,
            Self::High => 1,
            Self::Medium => 2,
            Self::Low => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of recent SPI movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Trend {
    Improving,
    Stable,
    Worsening,
}

impl Trend {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Improving => "IMPROVING",
            Self::Stable => "STABLE",
            Self::Worsening => "WORSENING",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Consumer profile the recommendations are tuned for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    Government,
    Industry,
}

impl Profile {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Government => "government",
            Self::Industry => "industry",
        }
    }
}

impl std::str::FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "government" => Ok(Self::Government),
            "industry" => Ok(Self::Industry),
            other => Err(format!("unknown profile: {other}")),
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discrete drought state used by the Markov transition analyzer.
///
/// Cut points at -0.5, -1.0, -1.5, -2.0; like risk levels, the boundary
/// belongs to the drier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DroughtState {
    Normal,
    Mild,
    Moderate,
    Severe,
    Extreme,
}

impl DroughtState {
    pub const ALL: [Self; 5] = [
        Self::Normal,
        Self::Mild,
        Self::Moderate,
        Self::Severe,
        Self::Extreme,
    ];

    pub fn from_spi(spi: f64) -> Self {
        if spi > -0.5 {
            Self::Normal
        } else if spi > -1.0 {
            Self::Mild
        } else if spi > -1.5 {
            Self::Moderate
        } else if spi > -2.0 {
            Self::Severe
        } else {
            Self::Extreme
        }
    }

    pub fn index(self) -> usize {
        match self {
            Self::Normal => 0,
            Self::Mild => 1,
            Self::Moderate => 2,
            Self::Severe => 3,
            Self::Extreme => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Mild => "mild",
            Self::Moderate => "moderate",
            Self::Severe => "severe",
            Self::Extreme => "extreme",
        }
    }
}

impl fmt::Display for DroughtState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// SPI category on a 0..=5 scale (0 wet, 5 extreme drought), used by the
/// flash-drought detector to measure category drops between samples.
pub fn spi_category(spi: f64) -> u8 {
    if spi > 0.0 {
        0
    } else if spi > -0.5 {
        1
    } else if spi > -1.0 {
        2
    } else if spi > -1.5 {
        3
    } else if spi > -2.0 {
        4
    } else {
        5
    }
}

/// Severity tier of a drought event's magnitude percentile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityTier {
    BelowAverage,
    Mild,
    Moderate,
    Severe,
    Extreme,
}

impl SeverityTier {
    pub fn from_percentile(percentile: f64) -> Self {
        if percentile >= 90.0 {
            Self::Extreme
        } else if percentile >= 75.0 {
            Self::Severe
        } else if percentile >= 50.0 {
            Self::Moderate
        } else if percentile >= 25.0 {
            Self::Mild
        } else {
            Self::BelowAverage
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::BelowAverage => "below_average",
            Self::Mild => "mild",
            Self::Moderate => "moderate",
            Self::Severe => "severe",
            Self::Extreme => "extreme",
        }
    }
}

/// Mann-Kendall trend direction at the configured significance level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MkDirection {
    Increasing,
    Decreasing,
    NoTrend,
}

/// How an action instance was parameterized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Ai,
    Fallback,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ai => "ai",
            Self::Fallback => "fallback",
        }
    }
}

/// Confidence attached to an expected effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::str::FromStr for Confidence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!("unknown confidence: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioType {
    NoAction,
    WithAction,
}

impl ScenarioType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoAction => "no_action",
            Self::WithAction => "with_action",
        }
    }
}

/// Per-(zone, source) outcome of an ingestion run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestStatus {
    Success,
    UpToDate,
    NoData,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlantType {
    Thermoelectric,
    Nuclear,
    Hydroelectric,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaterDependency {
    High,
    Medium,
    Low,
}

impl WaterDependency {
    /// Multiplier applied to the SPI-bucket base capacity loss.
    pub fn loss_factor(self) -> f64 {
        match self {
            Self::High => 1.0,
            Self::Medium => 0.6,
            Self::Low => 0.3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoolingType {
    OnceThrough,
    Recirculating,
    Dry,
}

impl CoolingType {
    pub fn loss_factor(self) -> f64 {
        match self {
            Self::OnceThrough => 1.2,
            Self::Recirculating => 1.0,
            Self::Dry => 0.2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlantStatus {
    Active,
    Inactive,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_boundaries_belong_to_severe_side() {
        assert_eq!(RiskLevel::from_spi(0.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_spi(-0.5), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_spi(-0.5001), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_spi(-1.0), RiskLevel::High);
        assert_eq!(RiskLevel::from_spi(-1.0001), RiskLevel::High);
        assert_eq!(RiskLevel::from_spi(-1.5), RiskLevel::Critical);
        assert_eq!(RiskLevel::from_spi(-1.5001), RiskLevel::Critical);
        assert_eq!(RiskLevel::from_spi(-2.0), RiskLevel::Critical);
        assert_eq!(RiskLevel::from_spi(-2.0001), RiskLevel::Critical);
    }

    #[test]
    fn drought_state_cut_points() {
        assert_eq!(DroughtState::from_spi(0.3), DroughtState::Normal);
        assert_eq!(DroughtState::from_spi(-0.5), DroughtState::Mild);
        assert_eq!(DroughtState::from_spi(-1.0), DroughtState::Moderate);
        assert_eq!(DroughtState::from_spi(-1.5), DroughtState::Severe);
        assert_eq!(DroughtState::from_spi(-2.0), DroughtState::Extreme);
        assert_eq!(DroughtState::from_spi(-3.2), DroughtState::Extreme);
    }

    #[test]
    fn categories_track_dryness() {
        assert_eq!(spi_category(1.2), 0);
        assert_eq!(spi_category(-0.2), 1);
        assert_eq!(spi_category(-0.8), 2);
        assert_eq!(spi_category(-1.2), 3);
        assert_eq!(spi_category(-1.8), 4);
        assert_eq!(spi_category(-2.4), 5);
    }

    #[test]
    fn severity_tier_thresholds() {
        assert_eq!(SeverityTier::from_percentile(95.0), SeverityTier::Extreme);
        assert_eq!(SeverityTier::from_percentile(90.0), SeverityTier::Extreme);
        assert_eq!(SeverityTier::from_percentile(80.0), SeverityTier::Severe);
        assert_eq!(SeverityTier::from_percentile(60.0), SeverityTier::Moderate);
        assert_eq!(SeverityTier::from_percentile(30.0), SeverityTier::Mild);
        assert_eq!(
            SeverityTier::from_percentile(10.0),
            SeverityTier::BelowAverage
        );
    }

    #[test]
    fn risk_rank_orders_from_critical() {
        assert!(RiskLevel::Critical.rank() < RiskLevel::High.rank());
        assert!(RiskLevel::High.rank() < RiskLevel::Medium.rank());
        assert!(RiskLevel::Medium.rank() < RiskLevel::Low.rank());
    }
}
