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

//! SimulateEconomic: avoided generation losses per plant under the two SPI
//! trajectories, with price precedence zone-local -> cached/EIA -> fallback.

use super::{Ops, OpsError};
use chrono::{Duration as ChronoDuration, Utc};
use sequia_adapters::{EiaClient, PriceProvider, PriceSource};
use sequia_core::catalog::ActionCatalog;
use sequia_core::economic::{EconomicAggregate, EconomicEngine};
use sequia_core::scenario::{ActionEffect, ScenarioBuilder};
use sequia_types::Zone;
use tracing::{info, warn};

const OP: &str = "SimulateEconomic";
const PRICE_CACHE_HOURS: i64 = 24;

#[derive(Debug)]
pub struct EconomicOutcome {
    pub aggregate: EconomicAggregate,
    pub marginal_price_usd_mwh: f64,
    pub fuel_price_usd_mmbtu: f64,
    pub price_source: String,
    pub row_ids: Vec<i64>,
}

pub async fn simulate_economic(
    ops: &Ops,
    zone_slug: &str,
    plant_ids: Option<&[i64]>,
    action_instance_ids: &[i64],
    projection_days: u32,
) -> Result<EconomicOutcome, OpsError> {
    if projection_days == 0 {
        return Err(OpsError::input(OP, "projection_days must be positive"));
    }
    let zone = ops.require_zone(OP, zone_slug)?;

    let plants = ops
        .db
        .list_power_plants(zone.id, plant_ids)
        .map_err(|e| OpsError::storage(OP, &e))?;
    if plants.is_empty() {
        return Err(OpsError::missing(
            OP,
            format!("no power plants registered for zone {zone_slug:?}; seed plants first"),
        ));
    }

    let snapshot = ops
        .db
        .latest_snapshot(zone.id)
        .map_err(|e| OpsError::storage(OP, &e))?
        .ok_or_else(|| {
            OpsError::missing(OP, format!("no risk snapshot for {zone_slug:?}; run AssessRisk first"))
        })?;

    // Trajectories with and without the selected actions.
    let instances = ops
        .db
        .get_action_instances(action_instance_ids)
        .map_err(|e| OpsError::storage(OP, &e))?;
    let catalog = ActionCatalog::global();
    let builder = ScenarioBuilder::new();
    let effects: Vec<ActionEffect> = instances
        .iter()
        .filter_map(|instance| {
            catalog.get(&instance.archetype_code).map(|archetype| {
                ActionEffect::from_instance(instance, archetype, builder.estimator().params())
            })
        })
        .collect();
    let comparison = builder.compare(
        snapshot.spi_6m,
        snapshot.trend,
        &effects,
        projection_days,
        None,
    );

    let (marginal, fuel, price_source) = resolve_prices(ops, &zone).await;

    let engine = EconomicEngine::new(ops.config.heat_rate_mmbtu_per_mwh);
    let aggregate = engine.aggregate(
        &plants,
        comparison.no_action.ending_spi,
        comparison.with_action.ending_spi,
        projection_days,
        marginal,
        fuel,
        Some((
            &comparison.no_action.trajectory,
            &comparison.with_action.trajectory,
        )),
    );

    let rows: Vec<sequia_store::NewEconomicRow> = aggregate
        .per_plant
        .iter()
        .map(|p| sequia_store::NewEconomicRow {
            plant_id: p.plant_id,
            capacity_loss_pct_no_action: p.capacity_loss_no_action,
            capacity_loss_pct_with_action: p.capacity_loss_with_action,
            cost_no_action_usd: p.cost_no_action_usd,
            cost_with_action_usd: p.cost_with_action_usd,
            savings_usd: p.savings_usd,
            marginal_price_usd_mwh: marginal,
            fuel_price_usd_mmbtu: fuel,
            projection_days,
        })
        .collect();
    let row_ids = ops
        .db
        .insert_economic_rows(&rows)
        .map_err(|e| OpsError::storage(OP, &e))?;

    info!(
        zone = %zone.slug,
        plants = plants.len(),
        savings_usd = format!("{:.0}", aggregate.total_savings_usd),
        "economic simulation stored"
    );

    Ok(EconomicOutcome {
        aggregate,
        marginal_price_usd_mwh: marginal,
        fuel_price_usd_mmbtu: fuel,
        price_source,
        row_ids,
    })
}

/// Price precedence: zone-local overrides, then the cached regional lookup
/// (EIA behind a 24 h cache), then the configured fallback prices.
async fn resolve_prices(ops: &Ops, zone: &Zone) -> (f64, f64, String) {
    if let (Some(marginal), Some(fuel)) = (zone.marginal_price_usd_mwh, zone.fuel_price_usd_mmbtu) {
        return (marginal, fuel, "zone".to_owned());
    }

    let region = zone.state_code.clone().unwrap_or_else(|| "US".to_owned());
    match ops.db.price_cache_get(&region) {
        Ok(Some((marginal, fuel, source))) => return (marginal, fuel, source),
        Ok(None) => {}
        Err(e) => warn!("price cache read failed: {e:#}"),
    }

    if !ops.config.demo_mode
        && let Some(key) = ops.config.eia_api_key.as_deref().filter(|k| !k.is_empty())
    {
        match EiaClient::new(
            key,
            ops.config.fallback_marginal_price_usd_mwh,
            ops.config.fallback_fuel_price_usd_mmbtu,
        ) {
            Ok(client) => {
                let prices = client.current_prices(zone.state_code.as_deref()).await;
                let source = prices.source.as_str().to_owned();
                if prices.source == PriceSource::Eia
                    && let Err(e) = ops.db.price_cache_put(
                        &region,
                        prices.marginal_price_usd_mwh,
                        prices.fuel_price_usd_mmbtu,
                        &source,
                        Utc::now() + ChronoDuration::hours(PRICE_CACHE_HOURS),
                    )
                {
                    warn!("price cache write failed: {e:#}");
                }
                return (
                    prices.marginal_price_usd_mwh,
                    prices.fuel_price_usd_mmbtu,
                    source,
                );
            }
            Err(e) => warn!("EIA client unavailable: {e}"),
        }
    }

    (
        ops.config.fallback_marginal_price_usd_mwh,
        ops.config.fallback_fuel_price_usd_mmbtu,
        "fallback".to_owned(),
    )
}
