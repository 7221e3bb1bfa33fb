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

//! Application configuration.
//!
//! Loaded from `sequia.toml`; unknown keys are a startup error. API keys may
//! come from the file or from `OPENAI_API_KEY` / `EIA_API_KEY` environment
//! variables, with the environment winning.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Path to the SQLite database file. Ignored in demo mode.
    #[serde(default = "default_database_url")]
    pub database_url: String,

    #[serde(default)]
    pub openai_api_key: Option<String>,

    #[serde(default = "default_openai_model")]
    pub openai_model: String,

    #[serde(default = "default_openai_max_tokens")]
    pub openai_max_tokens: u32,

    #[serde(default = "default_openai_temperature")]
    pub openai_temperature: f64,

    #[serde(default = "default_openai_max_retries")]
    pub openai_max_retries: u32,

    #[serde(default = "default_openai_retry_delay_seconds")]
    pub openai_retry_delay_seconds: f64,

    #[serde(default)]
    pub eia_api_key: Option<String>,

    #[serde(default = "default_ingestion_history_years")]
    pub ingestion_history_years: u32,

    #[serde(default = "default_projection_days")]
    pub projection_days_default: u32,

    #[serde(default = "default_heat_rate")]
    pub heat_rate_mmbtu_per_mwh: f64,

    #[serde(default = "default_fallback_marginal_price")]
    pub fallback_marginal_price_usd_mwh: f64,

    #[serde(default = "default_fallback_fuel_price")]
    pub fallback_fuel_price_usd_mmbtu: f64,

    /// Demo mode runs against an in-memory database and never calls the LLM.
    #[serde(default)]
    pub demo_mode: bool,
}

fn default_database_url() -> String {
    "sequia.db".to_owned()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_owned()
}

fn default_openai_max_tokens() -> u32 {
    1000
}

fn default_openai_temperature() -> f64 {
    0.3
}

fn default_openai_max_retries() -> u32 {
    3
}

fn default_openai_retry_delay_seconds() -> f64 {
    1.0
}

fn default_ingestion_history_years() -> u32 {
    30
}

fn default_projection_days() -> u32 {
    90
}

fn default_heat_rate() -> f64 {
    7.0
}

fn default_fallback_marginal_price() -> f64 {
    100.0
}

fn default_fallback_fuel_price() -> f64 {
    3.0
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            openai_api_key: None,
            openai_model: default_openai_model(),
            openai_max_tokens: default_openai_max_tokens(),
            openai_temperature: default_openai_temperature(),
            openai_max_retries: default_openai_max_retries(),
            openai_retry_delay_seconds: default_openai_retry_delay_seconds(),
            eia_api_key: None,
            ingestion_history_years: default_ingestion_history_years(),
            projection_days_default: default_projection_days(),
            heat_rate_mmbtu_per_mwh: default_heat_rate(),
            fallback_marginal_price_usd_mwh: default_fallback_marginal_price(),
            fallback_fuel_price_usd_mmbtu: default_fallback_fuel_price(),
            demo_mode: false,
        }
    }
}

impl AppConfig {
    /// Environment variables override file-provided secrets.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("OPENAI_API_KEY")
            && !key.is_empty()
        {
            self.openai_api_key = Some(key);
        }
        if let Ok(key) = std::env::var("EIA_API_KEY")
            && !key.is_empty()
        {
            self.eia_api_key = Some(key);
        }
        if let Ok(url) = std::env::var("SEQUIA_DATABASE_URL")
            && !url.is_empty()
        {
            self.database_url = url;
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.projection_days_default == 0 {
            return Err("projection_days_default must be positive".to_owned());
        }
        if self.ingestion_history_years == 0 {
            return Err("ingestion_history_years must be positive".to_owned());
        }
        if !(0.0..=2.0).contains(&self.openai_temperature) {
            return Err(format!(
                "openai_temperature out of range: {}",
                self.openai_temperature
            ));
        }
        if self.heat_rate_mmbtu_per_mwh <= 0.0 {
            return Err("heat_rate_mmbtu_per_mwh must be positive".to_owned());
        }
        Ok(())
    }

    /// LLM parameterization is available only with a key and outside demo mode.
    pub fn ai_enabled(&self) -> bool {
        !self.demo_mode && self.openai_api_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.openai_model, "gpt-4o-mini");
        assert_eq!(cfg.openai_max_tokens, 1000);
        assert!((cfg.openai_temperature - 0.3).abs() < 1e-12);
        assert_eq!(cfg.openai_max_retries, 3);
        assert_eq!(cfg.ingestion_history_years, 30);
        assert_eq!(cfg.projection_days_default, 90);
        assert!((cfg.heat_rate_mmbtu_per_mwh - 7.0).abs() < 1e-12);
        assert!((cfg.fallback_marginal_price_usd_mwh - 100.0).abs() < 1e-12);
        assert!((cfg.fallback_fuel_price_usd_mmbtu - 3.0).abs() < 1e-12);
        assert!(!cfg.demo_mode);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn unknown_options_are_rejected() {
        let err = toml::from_str::<AppConfig>("definitely_not_an_option = 1");
        assert!(err.is_err());
    }

    #[test]
    fn partial_config_fills_defaults() {
        let cfg: AppConfig = toml::from_str("demo_mode = true").unwrap();
        assert!(cfg.demo_mode);
        assert_eq!(cfg.projection_days_default, 90);
        assert!(!cfg.ai_enabled());
    }

    #[test]
    fn ai_requires_key_and_live_mode() {
        let mut cfg = AppConfig::default();
        assert!(!cfg.ai_enabled());
        cfg.openai_api_key = Some("sk-test".to_owned());
        assert!(cfg.ai_enabled());
        cfg.demo_mode = true;
        assert!(!cfg.ai_enabled());
    }
}
