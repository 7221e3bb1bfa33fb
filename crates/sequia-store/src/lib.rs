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

//! SQLite repository.
//!
//! One `Database` wraps a mutex-guarded connection; the schema is created
//! idempotently on open. Precipitation upserts are keyed on
//! (zone, variable, date, source); snapshots, simulations and economic
//! rows are append-only; action instances insert in one transaction and
//! return their assigned ids.

pub mod retry;

use anyhow::{Context as _, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::params;
use sequia_types::{
    ActionInstance, Confidence, CoolingType, DailyPrecipitation, ExpectedEffect, Method,
    ParamMap, PlantStatus, PlantType, PowerPlant, Profile, RiskLevel, RiskSnapshot, ScenarioType,
    SimulationRecord, Trend, WaterDependency, Zone,
};
use std::path::Path;
use std::sync::Mutex;

pub use retry::with_retry;

/// Input row for the batched action-instance insert.
#[derive(Debug, Clone)]
pub struct NewActionInstance {
    pub archetype_code: String,
    pub parameters: ParamMap,
    pub justification: String,
    pub expected_effect: ExpectedEffect,
    pub priority_score: f64,
    pub method: Method,
}

/// Zone fields under caller control; the id is assigned by the store.
#[derive(Debug, Clone)]
pub struct ZoneSeed {
    pub slug: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub country_code: Option<String>,
    pub state_code: Option<String>,
    pub timezone: Option<String>,
    pub marginal_price_usd_mwh: Option<f64>,
    pub fuel_price_usd_mmbtu: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct NewPowerPlant {
    pub zone_id: i64,
    pub name: String,
    pub plant_type: PlantType,
    pub capacity_mw: f64,
    pub water_dependency: WaterDependency,
    pub cooling_type: CoolingType,
    pub status: PlantStatus,
}

/// Economic simulation row to persist, one per plant.
#[derive(Debug, Clone)]
pub struct NewEconomicRow {
    pub plant_id: i64,
    pub capacity_loss_pct_no_action: f64,
    pub capacity_loss_pct_with_action: f64,
    pub cost_no_action_usd: f64,
    pub cost_with_action_usd: f64,
    pub savings_usd: f64,
    pub marginal_price_usd_mwh: f64,
    pub fuel_price_usd_mmbtu: f64,
    pub projection_days: u32,
}

#[derive(Debug)]
pub struct Database {
    conn: Mutex<rusqlite::Connection>,
}

impl Database {
    pub fn open(path: &str) -> Result<Self> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create database directory: {}", parent.display())
            })?;
        }
        let conn = rusqlite::Connection::open(path)
            .with_context(|| format!("Failed to open database: {path}"))?;
        Self::from_connection(conn)
    }

    /// In-memory database for demo mode and tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = rusqlite::Connection::open_in_memory()
            .context("Failed to open in-memory database")?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: rusqlite::Connection) -> Result<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS zones (
                id                      INTEGER PRIMARY KEY AUTOINCREMENT,
                slug                    TEXT NOT NULL UNIQUE,
                name                    TEXT NOT NULL,
                latitude                REAL NOT NULL,
                longitude               REAL NOT NULL,
                country_code            TEXT,
                state_code              TEXT,
                timezone                TEXT,
                marginal_price_usd_mwh  REAL,
                fuel_price_usd_mmbtu    REAL
            );

            CREATE TABLE IF NOT EXISTS precipitation (
                zone_id    INTEGER NOT NULL,
                variable   TEXT NOT NULL DEFAULT 'precipitation',
                date       TEXT NOT NULL,
                value_mm   REAL NOT NULL,
                source     TEXT NOT NULL,
                PRIMARY KEY (zone_id, variable, date, source),
                FOREIGN KEY (zone_id) REFERENCES zones(id)
            );

            CREATE INDEX IF NOT EXISTS idx_precip_zone_source_date
                ON precipitation(zone_id, source, date);

            CREATE TABLE IF NOT EXISTS risk_snapshots (
                id                INTEGER PRIMARY KEY AUTOINCREMENT,
                zone_id           INTEGER NOT NULL,
                spi_6m            REAL NOT NULL,
                risk_level        TEXT NOT NULL,
                trend             TEXT NOT NULL,
                days_to_critical  INTEGER,
                created_at        TEXT NOT NULL,
                FOREIGN KEY (zone_id) REFERENCES zones(id)
            );

            CREATE INDEX IF NOT EXISTS idx_snapshots_zone_created
                ON risk_snapshots(zone_id, created_at DESC);

            CREATE TABLE IF NOT EXISTS action_instances (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                zone_id         INTEGER NOT NULL,
                archetype_code  TEXT NOT NULL,
                profile         TEXT NOT NULL,
                parameters      TEXT NOT NULL,
                justification   TEXT NOT NULL,
                days_gained     REAL NOT NULL,
                confidence      TEXT NOT NULL,
                priority_score  REAL NOT NULL,
                method          TEXT NOT NULL,
                created_at      TEXT NOT NULL,
                FOREIGN KEY (zone_id) REFERENCES zones(id)
            );

            CREATE TABLE IF NOT EXISTS simulations (
                id                   INTEGER PRIMARY KEY AUTOINCREMENT,
                zone_id              INTEGER NOT NULL,
                scenario_type        TEXT NOT NULL,
                input_snapshot_id    INTEGER,
                action_instance_ids  TEXT NOT NULL,
                future_spi           REAL NOT NULL,
                future_risk_level    TEXT NOT NULL,
                days_to_critical     INTEGER,
                projection_days      INTEGER NOT NULL,
                created_at           TEXT NOT NULL,
                FOREIGN KEY (zone_id) REFERENCES zones(id)
            );

            CREATE TABLE IF NOT EXISTS power_plants (
                id                INTEGER PRIMARY KEY AUTOINCREMENT,
                zone_id           INTEGER NOT NULL,
                name              TEXT NOT NULL,
                plant_type        TEXT NOT NULL,
                capacity_mw       REAL NOT NULL,
                water_dependency  TEXT NOT NULL,
                cooling_type      TEXT NOT NULL,
                status            TEXT NOT NULL,
                FOREIGN KEY (zone_id) REFERENCES zones(id)
            );

            CREATE TABLE IF NOT EXISTS economic_simulations (
                id                             INTEGER PRIMARY KEY AUTOINCREMENT,
                plant_id                       INTEGER NOT NULL,
                capacity_loss_pct_no_action    REAL NOT NULL,
                capacity_loss_pct_with_action  REAL NOT NULL,
                cost_no_action_usd             REAL NOT NULL,
                cost_with_action_usd           REAL NOT NULL,
                savings_usd                    REAL NOT NULL,
                marginal_price_usd_mwh         REAL NOT NULL,
                fuel_price_usd_mmbtu           REAL NOT NULL,
                projection_days                INTEGER NOT NULL,
                created_at                     TEXT NOT NULL,
                FOREIGN KEY (plant_id) REFERENCES power_plants(id)
            );

            CREATE TABLE IF NOT EXISTS price_cache (
                region                  TEXT PRIMARY KEY,
                marginal_price_usd_mwh  REAL NOT NULL,
                fuel_price_usd_mmbtu    REAL NOT NULL,
                source                  TEXT NOT NULL,
                valid_until             TEXT NOT NULL
            );",
        )
        .context("Failed to initialize database schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    // ---- zones ----

    pub fn upsert_zone(&self, seed: &ZoneSeed) -> Result<i64> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        conn.execute(
            "INSERT INTO zones (slug, name, latitude, longitude, country_code, state_code, timezone, marginal_price_usd_mwh, fuel_price_usd_mmbtu)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(slug) DO UPDATE SET
                country_code = COALESCE(?5, country_code),
                state_code = COALESCE(?6, state_code),
                timezone = COALESCE(?7, timezone),
                marginal_price_usd_mwh = COALESCE(?8, marginal_price_usd_mwh),
                fuel_price_usd_mmbtu = COALESCE(?9, fuel_price_usd_mmbtu)",
            params![
                seed.slug,
                seed.name,
                seed.latitude,
                seed.longitude,
                seed.country_code,
                seed.state_code,
                seed.timezone,
                seed.marginal_price_usd_mwh,
                seed.fuel_price_usd_mmbtu,
            ],
        )?;
        let id: i64 = conn.query_row(
            "SELECT id FROM zones WHERE slug = ?1",
            params![seed.slug],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    pub fn get_zone_by_slug(&self, slug: &str) -> Result<Option<Zone>> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, slug, name, latitude, longitude, country_code, state_code, timezone,
                    marginal_price_usd_mwh, fuel_price_usd_mmbtu
             FROM zones WHERE slug = ?1",
        )?;
        let mut rows = stmt.query_map(params![slug], zone_from_row)?;
        rows.next().transpose().map_err(Into::into)
    }

    pub fn list_zones(&self) -> Result<Vec<Zone>> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, slug, name, latitude, longitude, country_code, state_code, timezone,
                    marginal_price_usd_mwh, fuel_price_usd_mmbtu
             FROM zones ORDER BY slug",
        )?;
        let rows = stmt
            .query_map([], zone_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    // ---- precipitation store (C1) ----

    /// Idempotent upsert keyed on (zone, variable, date, source). Negative
    /// values are rejected before anything is written.
    pub fn upsert_precipitation(
        &self,
        zone_id: i64,
        source: &str,
        records: &[DailyPrecipitation],
    ) -> Result<u64> {
        if let Some(bad) = records.iter().find(|r| r.value_mm < 0.0) {
            anyhow::bail!(
                "negative precipitation value {} on {}",
                bad.value_mm,
                bad.date
            );
        }

        let mut conn = self.conn.lock().expect("database mutex poisoned");
        let tx = conn.transaction()?;
        let mut written = 0u64;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO precipitation (zone_id, variable, date, value_mm, source)
                 VALUES (?1, 'precipitation', ?2, ?3, ?4)
                 ON CONFLICT(zone_id, variable, date, source) DO UPDATE SET value_mm = ?3",
            )?;
            for record in records {
                stmt.execute(params![zone_id, record.date, record.value_mm, source])?;
                written += 1;
            }
        }
        tx.commit()?;
        Ok(written)
    }

    /// Ordered range query: ascending dates, no duplicates.
    pub fn query_precipitation(
        &self,
        zone_id: i64,
        source: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<DailyPrecipitation>> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        let mut stmt = conn.prepare(
            "SELECT date, value_mm FROM precipitation
             WHERE zone_id = ?1 AND source = ?2 AND variable = 'precipitation'
               AND (?3 IS NULL OR date >= ?3)
               AND (?4 IS NULL OR date <= ?4)
             ORDER BY date ASC",
        )?;
        let rows = stmt
            .query_map(params![zone_id, source, from, to], |row| {
                Ok(DailyPrecipitation {
                    date: row.get(0)?,
                    value_mm: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn last_precipitation_date(&self, zone_id: i64, source: &str) -> Result<Option<NaiveDate>> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        let date = conn
            .query_row(
                "SELECT MAX(date) FROM precipitation
                 WHERE zone_id = ?1 AND source = ?2 AND variable = 'precipitation'",
                params![zone_id, source],
                |row| row.get::<_, Option<NaiveDate>>(0),
            )
            .unwrap_or(None);
        Ok(date)
    }

    // ---- risk snapshots ----

    pub fn insert_snapshot(
        &self,
        zone_id: i64,
        spi_6m: f64,
        risk_level: RiskLevel,
        trend: Trend,
        days_to_critical: Option<u32>,
    ) -> Result<RiskSnapshot> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        let created_at = Utc::now();
        conn.execute(
            "INSERT INTO risk_snapshots (zone_id, spi_6m, risk_level, trend, days_to_critical, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                zone_id,
                spi_6m,
                risk_level.as_str(),
                trend.as_str(),
                days_to_critical,
                created_at,
            ],
        )?;
        Ok(RiskSnapshot {
            id: conn.last_insert_rowid(),
            zone_id,
            spi_6m,
            risk_level,
            trend,
            days_to_critical,
            created_at,
        })
    }

    pub fn latest_snapshot(&self, zone_id: i64) -> Result<Option<RiskSnapshot>> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, zone_id, spi_6m, risk_level, trend, days_to_critical, created_at
             FROM risk_snapshots WHERE zone_id = ?1
             ORDER BY id DESC LIMIT 1",
        )?;
        let mut rows = stmt.query_map(params![zone_id], snapshot_from_row)?;
        rows.next().transpose().map_err(Into::into)
    }

    // ---- action instances ----

    /// Batch insert in one transaction; returns ids in input order (the
    /// caller links them into simulations later).
    pub fn insert_action_instances(
        &self,
        zone_id: i64,
        profile: Profile,
        instances: &[NewActionInstance],
    ) -> Result<Vec<i64>> {
        let mut conn = self.conn.lock().expect("database mutex poisoned");
        let tx = conn.transaction()?;
        let created_at = Utc::now();
        let mut ids = Vec::with_capacity(instances.len());
        {
            let mut stmt = tx.prepare(
                "INSERT INTO action_instances (zone_id, archetype_code, profile, parameters, justification,
                    days_gained, confidence, priority_score, method, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            )?;
            for instance in instances {
                let parameters = serde_json::to_string(&instance.parameters)?;
                stmt.execute(params![
                    zone_id,
                    instance.archetype_code,
                    profile.as_str(),
                    parameters,
                    instance.justification,
                    instance.expected_effect.days_gained,
                    instance.expected_effect.confidence.as_str(),
                    instance.priority_score,
                    instance.method.as_str(),
                    created_at,
                ])?;
                ids.push(tx.last_insert_rowid());
            }
        }
        tx.commit()?;
        Ok(ids)
    }

    pub fn get_action_instances(&self, ids: &[i64]) -> Result<Vec<ActionInstance>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.conn.lock().expect("database mutex poisoned");
        let mut out = Vec::with_capacity(ids.len());
        let mut stmt = conn.prepare(
            "SELECT id, zone_id, archetype_code, profile, parameters, justification,
                    days_gained, confidence, priority_score, method, created_at
             FROM action_instances WHERE id = ?1",
        )?;
        for id in ids {
            let mut rows = stmt.query_map(params![id], action_instance_from_row)?;
            if let Some(instance) = rows.next().transpose()? {
                out.push(instance);
            }
        }
        Ok(out)
    }

    // ---- simulations ----

    #[allow(clippy::too_many_arguments)]
    pub fn insert_simulation(
        &self,
        zone_id: i64,
        scenario_type: ScenarioType,
        input_snapshot_id: Option<i64>,
        action_instance_ids: &[i64],
        future_spi: f64,
        future_risk_level: RiskLevel,
        days_to_critical: Option<u32>,
        projection_days: u32,
    ) -> Result<i64> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        conn.execute(
            "INSERT INTO simulations (zone_id, scenario_type, input_snapshot_id, action_instance_ids,
                future_spi, future_risk_level, days_to_critical, projection_days, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                zone_id,
                scenario_type.as_str(),
                input_snapshot_id,
                serde_json::to_string(action_instance_ids)?,
                future_spi,
                future_risk_level.as_str(),
                days_to_critical,
                projection_days,
                Utc::now(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn list_simulations(&self, zone_id: i64, limit: u32) -> Result<Vec<SimulationRecord>> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, zone_id, scenario_type, input_snapshot_id, action_instance_ids,
                    future_spi, future_risk_level, days_to_critical, projection_days, created_at
             FROM simulations WHERE zone_id = ?1 ORDER BY id DESC LIMIT ?2",
        )?;
        let rows = stmt
            .query_map(params![zone_id, limit], simulation_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    // ---- power plants ----

    pub fn insert_power_plant(&self, plant: &NewPowerPlant) -> Result<i64> {
        if plant.capacity_mw <= 0.0 {
            anyhow::bail!("plant {:?} has non-positive capacity", plant.name);
        }
        let conn = self.conn.lock().expect("database mutex poisoned");
        conn.execute(
            "INSERT INTO power_plants (zone_id, name, plant_type, capacity_mw, water_dependency, cooling_type, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                plant.zone_id,
                plant.name,
                plant_type_str(plant.plant_type),
                plant.capacity_mw,
                dependency_str(plant.water_dependency),
                cooling_str(plant.cooling_type),
                status_str(plant.status),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Active plants in a zone, optionally narrowed to specific ids.
    pub fn list_power_plants(&self, zone_id: i64, ids: Option<&[i64]>) -> Result<Vec<PowerPlant>> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, zone_id, name, plant_type, capacity_mw, water_dependency, cooling_type, status
             FROM power_plants WHERE zone_id = ?1 ORDER BY id",
        )?;
        let rows = stmt
            .query_map(params![zone_id], plant_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(match ids {
            Some(ids) => rows.into_iter().filter(|p| ids.contains(&p.id)).collect(),
            None => rows,
        })
    }

    // ---- economic simulations ----

    pub fn insert_economic_rows(&self, rows: &[NewEconomicRow]) -> Result<Vec<i64>> {
        let mut conn = self.conn.lock().expect("database mutex poisoned");
        let tx = conn.transaction()?;
        let created_at = Utc::now();
        let mut ids = Vec::with_capacity(rows.len());
        {
            let mut stmt = tx.prepare(
                "INSERT INTO economic_simulations (plant_id, capacity_loss_pct_no_action,
                    capacity_loss_pct_with_action, cost_no_action_usd, cost_with_action_usd,
                    savings_usd, marginal_price_usd_mwh, fuel_price_usd_mmbtu, projection_days, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            )?;
            for row in rows {
                stmt.execute(params![
                    row.plant_id,
                    row.capacity_loss_pct_no_action,
                    row.capacity_loss_pct_with_action,
                    row.cost_no_action_usd,
                    row.cost_with_action_usd,
                    row.savings_usd,
                    row.marginal_price_usd_mwh,
                    row.fuel_price_usd_mmbtu,
                    row.projection_days,
                    created_at,
                ])?;
                ids.push(tx.last_insert_rowid());
            }
        }
        tx.commit()?;
        Ok(ids)
    }

    // ---- price cache ----

    pub fn price_cache_put(
        &self,
        region: &str,
        marginal_price_usd_mwh: f64,
        fuel_price_usd_mmbtu: f64,
        source: &str,
        valid_until: DateTime<Utc>,
    ) -> Result<()> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        conn.execute(
            "INSERT INTO price_cache (region, marginal_price_usd_mwh, fuel_price_usd_mmbtu, source, valid_until)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(region) DO UPDATE SET
                marginal_price_usd_mwh = ?2,
                fuel_price_usd_mmbtu = ?3,
                source = ?4,
                valid_until = ?5",
            params![region, marginal_price_usd_mwh, fuel_price_usd_mmbtu, source, valid_until],
        )?;
        Ok(())
    }

    /// Cached prices for a region, if still valid.
    pub fn price_cache_get(&self, region: &str) -> Result<Option<(f64, f64, String)>> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        let row = conn
            .query_row(
                "SELECT marginal_price_usd_mwh, fuel_price_usd_mmbtu, source, valid_until
                 FROM price_cache WHERE region = ?1",
                params![region],
                |row| {
                    Ok((
                        row.get::<_, f64>(0)?,
                        row.get::<_, f64>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, DateTime<Utc>>(3)?,
                    ))
                },
            )
            .map(Some)
            .unwrap_or(None);
        Ok(row.and_then(|(marginal, fuel, source, valid_until)| {
            (valid_until > Utc::now()).then_some((marginal, fuel, source))
        }))
    }
}

// ---- row mappers and enum text round-trips ----

fn zone_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Zone> {
    Ok(Zone {
        id: row.get(0)?,
        slug: row.get(1)?,
        name: row.get(2)?,
        latitude: row.get(3)?,
        longitude: row.get(4)?,
        country_code: row.get(5)?,
        state_code: row.get(6)?,
        timezone: row.get(7)?,
        marginal_price_usd_mwh: row.get(8)?,
        fuel_price_usd_mmbtu: row.get(9)?,
    })
}

fn snapshot_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RiskSnapshot> {
    Ok(RiskSnapshot {
        id: row.get(0)?,
        zone_id: row.get(1)?,
        spi_6m: row.get(2)?,
        risk_level: parse_risk_level(&row.get::<_, String>(3)?),
        trend: parse_trend(&row.get::<_, String>(4)?),
        days_to_critical: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn action_instance_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ActionInstance> {
    let parameters: String = row.get(4)?;
    Ok(ActionInstance {
        id: row.get(0)?,
        zone_id: row.get(1)?,
        archetype_code: row.get(2)?,
        profile: parse_profile(&row.get::<_, String>(3)?),
        parameters: serde_json::from_str(&parameters).unwrap_or_default(),
        justification: row.get(5)?,
        expected_effect: ExpectedEffect {
            days_gained: row.get(6)?,
            confidence: parse_confidence(&row.get::<_, String>(7)?),
        },
        priority_score: row.get(8)?,
        method: parse_method(&row.get::<_, String>(9)?),
        created_at: row.get(10)?,
    })
}

fn simulation_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SimulationRecord> {
    let ids_json: String = row.get(4)?;
    Ok(SimulationRecord {
        id: row.get(0)?,
        zone_id: row.get(1)?,
        scenario_type: if row.get::<_, String>(2)? == "with_action" {
            ScenarioType::WithAction
        } else {
            ScenarioType::NoAction
        },
        input_snapshot_id: row.get(3)?,
        action_instance_ids: serde_json::from_str(&ids_json).unwrap_or_default(),
        future_spi: row.get(5)?,
        future_risk_level: parse_risk_level(&row.get::<_, String>(6)?),
        days_to_critical: row.get(7)?,
        projection_days: row.get(8)?,
        created_at: row.get(9)?,
    })
}

fn plant_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PowerPlant> {
    Ok(PowerPlant {
        id: row.get(0)?,
        zone_id: row.get(1)?,
        name: row.get(2)?,
        plant_type: parse_plant_type(&row.get::<_, String>(3)?),
        capacity_mw: row.get(4)?,
        water_dependency: parse_dependency(&row.get::<_, String>(5)?),
        cooling_type: parse_cooling(&row.get::<_, String>(6)?),
        status: if row.get::<_, String>(7)? == "inactive" {
            PlantStatus::Inactive
        } else {
            PlantStatus::Active
        },
    })
}

fn parse_risk_level(s: &str) -> RiskLevel {
    match s {
        "MEDIUM" => RiskLevel::Medium,
        "HIGH" => RiskLevel::High,
        "CRITICAL" => RiskLevel::Critical,
        _ => RiskLevel::Low,
    }
}

fn parse_trend(s: &str) -> Trend {
    match s {
        "IMPROVING" => Trend::Improving,
        "WORSENING" => Trend::Worsening,
        _ => Trend::Stable,
    }
}

fn parse_profile(s: &str) -> Profile {
    if s == "industry" {
        Profile::Industry
    } else {
        Profile::Government
    }
}

fn parse_confidence(s: &str) -> Confidence {
    match s {
        "medium" => Confidence::Medium,
        "high" => Confidence::High,
        _ => Confidence::Low,
    }
}

fn parse_method(s: &str) -> Method {
    if s == "ai" { Method::Ai } else { Method::Fallback }
}

fn plant_type_str(t: PlantType) -> &'static str {
    match t {
        PlantType::Thermoelectric => "thermoelectric",
        PlantType::Nuclear => "nuclear",
        PlantType::Hydroelectric => "hydroelectric",
    }
}

fn parse_plant_type(s: &str) -> PlantType {
    match s {
        "nuclear" => PlantType::Nuclear,
        "hydroelectric" => PlantType::Hydroelectric,
        _ => PlantType::Thermoelectric,
    }
}

fn dependency_str(d: WaterDependency) -> &'static str {
    match d {
        WaterDependency::High => "high",
        WaterDependency::Medium => "medium",
        WaterDependency::Low => "low",
    }
}

fn parse_dependency(s: &str) -> WaterDependency {
    match s {
        "medium" => WaterDependency::Medium,
        "low" => WaterDependency::Low,
        _ => WaterDependency::High,
    }
}

fn cooling_str(c: CoolingType) -> &'static str {
    match c {
        CoolingType::OnceThrough => "once_through",
        CoolingType::Recirculating => "recirculating",
        CoolingType::Dry => "dry",
    }
}

fn parse_cooling(s: &str) -> CoolingType {
    match s {
        "once_through" => CoolingType::OnceThrough,
        "dry" => CoolingType::Dry,
        _ => CoolingType::Recirculating,
    }
}

fn status_str(s: PlantStatus) -> &'static str {
    match s {
        PlantStatus::Active => "active",
        PlantStatus::Inactive => "inactive",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sequia_types::ParamValue;

    fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn zone(db: &Database) -> i64 {
        db.upsert_zone(&ZoneSeed {
            slug: "cdmx".to_owned(),
            name: "Mexico City".to_owned(),
            latitude: 19.4326,
            longitude: -99.1332,
            country_code: Some("MEX".to_owned()),
            state_code: None,
            timezone: Some("America/Mexico_City".to_owned()),
            marginal_price_usd_mwh: None,
            fuel_price_usd_mmbtu: None,
        })
        .unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn precipitation_upsert_is_idempotent() {
        let db = db();
        let zone_id = zone(&db);
        let records = vec![
            DailyPrecipitation { date: date(2024, 1, 1), value_mm: 2.0 },
            DailyPrecipitation { date: date(2024, 1, 2), value_mm: 0.0 },
        ];
        db.upsert_precipitation(zone_id, "openmeteo", &records).unwrap();
        db.upsert_precipitation(zone_id, "openmeteo", &records).unwrap();

        let stored = db.query_precipitation(zone_id, "openmeteo", None, None).unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored, records);
    }

    #[test]
    fn duplicate_key_updates_value() {
        let db = db();
        let zone_id = zone(&db);
        db.upsert_precipitation(
            zone_id,
            "openmeteo",
            &[DailyPrecipitation { date: date(2024, 1, 1), value_mm: 2.0 }],
        )
        .unwrap();
        db.upsert_precipitation(
            zone_id,
            "openmeteo",
            &[DailyPrecipitation { date: date(2024, 1, 1), value_mm: 5.5 }],
        )
        .unwrap();
        let stored = db.query_precipitation(zone_id, "openmeteo", None, None).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].value_mm, 5.5);
    }

    #[test]
    fn negative_values_are_rejected() {
        let db = db();
        let zone_id = zone(&db);
        let err = db.upsert_precipitation(
            zone_id,
            "openmeteo",
            &[DailyPrecipitation { date: date(2024, 1, 1), value_mm: -1.0 }],
        );
        assert!(err.is_err());
        assert!(db.query_precipitation(zone_id, "openmeteo", None, None).unwrap().is_empty());
    }

    #[test]
    fn range_query_is_ordered_and_bounded() {
        let db = db();
        let zone_id = zone(&db);
        let records: Vec<DailyPrecipitation> = (1..=10)
            .rev()
            .map(|d| DailyPrecipitation { date: date(2024, 3, d), value_mm: d as f64 })
            .collect();
        db.upsert_precipitation(zone_id, "noaa", &records).unwrap();
        let stored = db
            .query_precipitation(zone_id, "noaa", Some(date(2024, 3, 3)), Some(date(2024, 3, 7)))
            .unwrap();
        assert_eq!(stored.len(), 5);
        assert!(stored.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn last_date_tracks_source_separately() {
        let db = db();
        let zone_id = zone(&db);
        assert_eq!(db.last_precipitation_date(zone_id, "openmeteo").unwrap(), None);
        db.upsert_precipitation(
            zone_id,
            "openmeteo",
            &[DailyPrecipitation { date: date(2024, 2, 10), value_mm: 1.0 }],
        )
        .unwrap();
        assert_eq!(
            db.last_precipitation_date(zone_id, "openmeteo").unwrap(),
            Some(date(2024, 2, 10))
        );
        assert_eq!(db.last_precipitation_date(zone_id, "noaa").unwrap(), None);
    }

    #[test]
    fn snapshots_append_and_latest_wins() {
        let db = db();
        let zone_id = zone(&db);
        db.insert_snapshot(zone_id, -1.2, RiskLevel::High, Trend::Stable, Some(40)).unwrap();
        let second = db
            .insert_snapshot(zone_id, -1.7, RiskLevel::Critical, Trend::Worsening, Some(22))
            .unwrap();
        let latest = db.latest_snapshot(zone_id).unwrap().unwrap();
        assert_eq!(latest.id, second.id);
        assert_eq!(latest.risk_level, RiskLevel::Critical);
        assert_eq!(latest.trend, Trend::Worsening);
        assert_eq!(latest.days_to_critical, Some(22));
    }

    #[test]
    fn action_instances_round_trip_with_ids() {
        let db = db();
        let zone_id = zone(&db);
        let mut parameters = ParamMap::new();
        parameters.insert("pressure_reduction_pct".to_owned(), ParamValue::Int(24));
        let new = vec![
            NewActionInstance {
                archetype_code: "H2_PRESSURE_REDUCTION".to_owned(),
                parameters: parameters.clone(),
                justification: "test".to_owned(),
                expected_effect: ExpectedEffect { days_gained: 4.0, confidence: Confidence::Low },
                priority_score: 88.0,
                method: Method::Fallback,
            },
            NewActionInstance {
                archetype_code: "H4_LAWN_BAN".to_owned(),
                parameters: ParamMap::new(),
                justification: "test2".to_owned(),
                expected_effect: ExpectedEffect { days_gained: 1.3, confidence: Confidence::Low },
                priority_score: 95.0,
                method: Method::Ai,
            },
        ];
        let ids = db.insert_action_instances(zone_id, Profile::Government, &new).unwrap();
        assert_eq!(ids.len(), 2);
        assert!(ids[1] > ids[0]);

        let stored = db.get_action_instances(&ids).unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].archetype_code, "H2_PRESSURE_REDUCTION");
        assert_eq!(stored[0].parameters, parameters);
        assert_eq!(stored[1].method, Method::Ai);
    }

    #[test]
    fn simulations_link_action_ids() {
        let db = db();
        let zone_id = zone(&db);
        let sim_id = db
            .insert_simulation(
                zone_id,
                ScenarioType::WithAction,
                None,
                &[3, 5, 8],
                -2.1,
                RiskLevel::Critical,
                Some(37),
                90,
            )
            .unwrap();
        let sims = db.list_simulations(zone_id, 10).unwrap();
        assert_eq!(sims.len(), 1);
        assert_eq!(sims[0].id, sim_id);
        assert_eq!(sims[0].action_instance_ids, vec![3, 5, 8]);
        assert_eq!(sims[0].scenario_type, ScenarioType::WithAction);
    }

    #[test]
    fn plants_filter_by_ids() {
        let db = db();
        let zone_id = zone(&db);
        let mk = |name: &str| NewPowerPlant {
            zone_id,
            name: name.to_owned(),
            plant_type: PlantType::Thermoelectric,
            capacity_mw: 1000.0,
            water_dependency: WaterDependency::High,
            cooling_type: CoolingType::Recirculating,
            status: PlantStatus::Active,
        };
        let a = db.insert_power_plant(&mk("A")).unwrap();
        let _b = db.insert_power_plant(&mk("B")).unwrap();
        assert_eq!(db.list_power_plants(zone_id, None).unwrap().len(), 2);
        let only_a = db.list_power_plants(zone_id, Some(&[a])).unwrap();
        assert_eq!(only_a.len(), 1);
        assert_eq!(only_a[0].name, "A");
    }

    #[test]
    fn zero_capacity_plants_are_rejected() {
        let db = db();
        let zone_id = zone(&db);
        let plant = NewPowerPlant {
            zone_id,
            name: "Broken".to_owned(),
            plant_type: PlantType::Nuclear,
            capacity_mw: 0.0,
            water_dependency: WaterDependency::High,
            cooling_type: CoolingType::OnceThrough,
            status: PlantStatus::Active,
        };
        assert!(db.insert_power_plant(&plant).is_err());
    }

    #[test]
    fn price_cache_respects_validity() {
        let db = db();
        db.price_cache_put("TX", 95.0, 2.8, "eia", Utc::now() + chrono::Duration::hours(6))
            .unwrap();
        let hit = db.price_cache_get("TX").unwrap().unwrap();
        assert_eq!(hit.0, 95.0);
        assert_eq!(hit.2, "eia");

        db.price_cache_put("CA", 80.0, 3.1, "eia", Utc::now() - chrono::Duration::hours(1))
            .unwrap();
        assert!(db.price_cache_get("CA").unwrap().is_none());
        assert!(db.price_cache_get("NY").unwrap().is_none());
    }

    #[test]
    fn persists_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sequia.db");
        let path_str = path.to_str().unwrap();
        {
            let db = Database::open(path_str).unwrap();
            let zone_id = zone(&db);
            db.upsert_precipitation(
                zone_id,
                "openmeteo",
                &[DailyPrecipitation { date: date(2024, 1, 1), value_mm: 3.0 }],
            )
            .unwrap();
        }
        let db = Database::open(path_str).unwrap();
        let zone = db.get_zone_by_slug("cdmx").unwrap().unwrap();
        let stored = db.query_precipitation(zone.id, "openmeteo", None, None).unwrap();
        assert_eq!(stored.len(), 1);
    }
}
