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

//! AssessRisk: SPI-6 classification, basic trend, days-to-critical, and an
//! appended risk snapshot.

use super::{ErrorKind, Ops, OpsError};
use sequia_core::EngineError;
use sequia_core::risk::RiskClassifier;
use sequia_types::RiskSnapshot;
use tracing::info;

const OP: &str = "AssessRisk";

pub fn assess_risk(ops: &Ops, zone_slug: &str) -> Result<RiskSnapshot, OpsError> {
    let zone = ops.require_zone(OP, zone_slug)?;
    let daily = ops.load_precipitation(OP, &zone)?;

    let assessment = RiskClassifier::new().assess(&daily).map_err(|e| match e {
        EngineError::InsufficientData(m) => {
            OpsError::missing(OP, format!("{m}; run IngestZone first"))
        }
        EngineError::InvalidInput(m) => OpsError::input(OP, m),
        EngineError::Numerical(m) => OpsError::new(OP, ErrorKind::Internal, m),
    })?;

    let snapshot = sequia_store::with_retry("insert_snapshot", || {
        ops.db.insert_snapshot(
            zone.id,
            assessment.spi_6m,
            assessment.risk_level,
            assessment.trend,
            assessment.days_to_critical,
        )
    })
    .map_err(|e| OpsError::storage(OP, &e))?;

    info!(
        zone = %zone.slug,
        spi_6m = format!("{:.2}", snapshot.spi_6m),
        risk = %snapshot.risk_level,
        trend = %snapshot.trend,
        "risk snapshot recorded"
    );
    Ok(snapshot)
}
