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

//! Pilot zone and power-plant fixtures. Seeding is idempotent: zones
//! upsert on slug and plants are only inserted when the zone has none.

use anyhow::Result;
use sequia_store::{Database, NewPowerPlant, ZoneSeed};
use sequia_types::{CoolingType, PlantStatus, PlantType, WaterDependency};
use tracing::info;

fn pilot_zones() -> Vec<ZoneSeed> {
    let mexican = |slug: &str, name: &str, lat: f64, lon: f64| ZoneSeed {
        slug: slug.to_owned(),
        name: name.to_owned(),
        latitude: lat,
        longitude: lon,
        country_code: Some("MEX".to_owned()),
        state_code: None,
        timezone: Some("America/Mexico_City".to_owned()),
        marginal_price_usd_mwh: None,
        fuel_price_usd_mmbtu: None,
    };
    vec![
        mexican("cdmx", "Mexico City", 19.4326, -99.1332),
        mexican("monterrey", "Monterrey", 25.6866, -100.3161),
        mexican("guadalajara", "Guadalajara", 20.6597, -103.3496),
        mexican("sonora", "Hermosillo", 29.0729, -110.9559),
        mexican("yucatan", "Merida", 20.9674, -89.5926),
        ZoneSeed {
            slug: "texas".to_owned(),
            name: "Texas Gulf".to_owned(),
            latitude: 29.7604,
            longitude: -95.3698,
            country_code: Some("USA".to_owned()),
            state_code: Some("TX".to_owned()),
            timezone: Some("America/Chicago".to_owned()),
            marginal_price_usd_mwh: None,
            fuel_price_usd_mmbtu: None,
        },
    ]
}

fn texas_plants(zone_id: i64) -> Vec<NewPowerPlant> {
    let plant = |name: &str,
                 plant_type: PlantType,
                 capacity_mw: f64,
                 water_dependency: WaterDependency,
                 cooling_type: CoolingType| NewPowerPlant {
        zone_id,
        name: name.to_owned(),
        plant_type,
        capacity_mw,
        water_dependency,
        cooling_type,
        status: PlantStatus::Active,
    };
    vec![
        plant(
            "W.A. Parish",
            PlantType::Thermoelectric,
            3653.0,
            WaterDependency::High,
            CoolingType::OnceThrough,
        ),
        plant(
            "South Texas Project",
            PlantType::Nuclear,
            2708.0,
            WaterDependency::High,
            CoolingType::Recirculating,
        ),
        plant(
            "Comanche Peak",
            PlantType::Nuclear,
            2400.0,
            WaterDependency::High,
            CoolingType::Recirculating,
        ),
        plant(
            "Martin Lake",
            PlantType::Thermoelectric,
            2250.0,
            WaterDependency::Medium,
            CoolingType::Recirculating,
        ),
        plant(
            "Fayette Power Project",
            PlantType::Thermoelectric,
            1842.0,
            WaterDependency::Medium,
            CoolingType::Recirculating,
        ),
    ]
}

/// Seed pilot zones and the Texas plant fleet.
pub fn seed(db: &Database) -> Result<()> {
    for zone in pilot_zones() {
        let id = db.upsert_zone(&zone)?;
        info!(slug = %zone.slug, id, "zone seeded");
        if zone.slug == "texas" && db.list_power_plants(id, None)?.is_empty() {
            for plant in texas_plants(id) {
                db.insert_power_plant(&plant)?;
            }
            info!("texas plant fleet seeded");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeding_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        seed(&db).unwrap();
        seed(&db).unwrap();
        let zones = db.list_zones().unwrap();
        assert_eq!(zones.len(), 6);
        let texas = db.get_zone_by_slug("texas").unwrap().unwrap();
        let plants = db.list_power_plants(texas.id, None).unwrap();
        assert_eq!(plants.len(), 5);
        let total: f64 = plants.iter().map(|p| p.capacity_mw).sum();
        assert!((total - 12_853.0).abs() < 1e-9);
    }

    #[test]
    fn mexican_zones_carry_local_timezone() {
        let db = Database::open_in_memory().unwrap();
        seed(&db).unwrap();
        let cdmx = db.get_zone_by_slug("cdmx").unwrap().unwrap();
        assert_eq!(cdmx.timezone.as_deref(), Some("America/Mexico_City"));
        assert!(cdmx.validate().is_ok());
    }
}
