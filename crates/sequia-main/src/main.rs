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

//! Sequia CLI: the thin outer layer over the five core operations.

mod ops;
mod seed;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use ops::Ops;
use sequia_types::{AppConfig, Profile};
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sequia", version, about = "Drought decision-intelligence engine")]
struct Cli {
    /// Path to the configuration file.
    #[arg(long, default_value = "sequia.toml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize the database and seed pilot zones and plants.
    Init,
    /// Fetch precipitation for a zone from the configured sources.
    Ingest {
        #[arg(long)]
        zone: String,
        /// Comma-separated source list.
        #[arg(long, default_value = "openmeteo")]
        sources: String,
        #[arg(long)]
        force_full: bool,
    },
    /// Assess drought risk and append a snapshot.
    Assess {
        #[arg(long)]
        zone: String,
    },
    /// Evaluate the heuristic bank and persist parameterized actions.
    Recommend {
        #[arg(long)]
        zone: String,
        #[arg(long, default_value = "government")]
        profile: String,
    },
    /// Simulate no-action vs with-action SPI trajectories.
    Simulate {
        #[arg(long)]
        zone: String,
        /// Comma-separated action instance ids.
        #[arg(long, default_value = "")]
        actions: String,
        #[arg(long)]
        days: Option<u32>,
    },
    /// Estimate avoided generation losses for the zone's plants.
    Economic {
        #[arg(long)]
        zone: String,
        /// Comma-separated plant ids; all active plants when omitted.
        #[arg(long, default_value = "")]
        plants: String,
        #[arg(long, default_value = "")]
        actions: String,
        #[arg(long)]
        days: Option<u32>,
    },
}

fn load_config(path: &str) -> Result<AppConfig> {
    let mut config = match std::fs::read_to_string(path) {
        Ok(raw) => toml::from_str(&raw).with_context(|| format!("invalid config {path}"))?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => AppConfig::default(),
        Err(e) => return Err(e).with_context(|| format!("failed to read config {path}")),
    };
    config.apply_env_overrides();
    Ok(config)
}

fn parse_ids(raw: &str) -> Result<Vec<i64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<i64>().with_context(|| format!("invalid id {s:?}")))
        .collect()
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => eprintln!("failed to render output: {e}"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    let ops = Ops::open(config)?;

    match cli.command {
        Command::Init => {
            seed::seed(&ops.db)?;
            print_json(&json!({"status": "initialized"}));
        }
        Command::Ingest {
            zone,
            sources,
            force_full,
        } => {
            let sources: Vec<String> = sources
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect();
            let reports = ops::ingest::ingest_zone(&ops, &zone, &sources, force_full).await?;
            print_json(&serde_json::to_value(&reports)?);
        }
        Command::Assess { zone } => {
            let snapshot = ops::risk::assess_risk(&ops, &zone)?;
            print_json(&serde_json::to_value(&snapshot)?);
        }
        Command::Recommend { zone, profile } => {
            let profile: Profile = profile
                .parse()
                .map_err(|m: String| anyhow::anyhow!(m))?;
            let outcome = ops::recommend::recommend_actions(&ops, &zone, profile).await?;
            print_json(&json!({
                "context": outcome.context,
                "activated_rules": outcome.activated_rules,
                "recommended_actions": outcome.actions,
            }));
        }
        Command::Simulate { zone, actions, days } => {
            let action_ids = parse_ids(&actions)?;
            let projection_days = days.unwrap_or(ops.config.projection_days_default);
            let outcome = ops::simulate::simulate(&ops, &zone, &action_ids, projection_days)?;
            print_json(&json!({
                "no_action": outcome.comparison.no_action,
                "with_action": outcome.comparison.with_action,
                "delta": outcome.comparison.delta,
                "summary": outcome.summary,
                "simulation_ids": {
                    "no_action": outcome.no_action_simulation_id,
                    "with_action": outcome.with_action_simulation_id,
                },
            }));
        }
        Command::Economic {
            zone,
            plants,
            actions,
            days,
        } => {
            let plant_ids = parse_ids(&plants)?;
            let action_ids = parse_ids(&actions)?;
            let projection_days = days.unwrap_or(ops.config.projection_days_default);
            let outcome = ops::economic::simulate_economic(
                &ops,
                &zone,
                if plant_ids.is_empty() {
                    None
                } else {
                    Some(&plant_ids)
                },
                &action_ids,
                projection_days,
            )
            .await?;
            print_json(&json!({
                "aggregate": outcome.aggregate,
                "marginal_price_usd_mwh": outcome.marginal_price_usd_mwh,
                "fuel_price_usd_mmbtu": outcome.fuel_price_usd_mmbtu,
                "price_source": outcome.price_source,
                "economic_simulation_ids": outcome.row_ids,
            }));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_lists_parse_and_reject_garbage() {
        assert_eq!(parse_ids("1, 2,3").unwrap(), vec![1, 2, 3]);
        assert!(parse_ids("").unwrap().is_empty());
        assert!(parse_ids("1,x").is_err());
    }

    #[test]
    fn missing_config_file_uses_defaults() {
        let config = load_config("/definitely/not/here/sequia.toml").unwrap();
        assert_eq!(config.projection_days_default, 90);
    }

    #[test]
    fn malformed_config_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sequia.toml");
        std::fs::write(&path, "not_an_option = true").unwrap();
        assert!(load_config(path.to_str().unwrap()).is_err());
    }
}
