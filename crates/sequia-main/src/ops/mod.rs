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

//! The public callable surface: the five operations a thin outer layer
//! (here, the CLI) exposes. Each returns either a structured result or an
//! [`OpsError`] carrying the operation name, a machine-readable kind and a
//! one-sentence explanation.

pub mod economic;
pub mod ingest;
pub mod recommend;
pub mod risk;
pub mod simulate;

use sequia_core::analytics::MagnitudeCache;
use sequia_store::Database;
use sequia_types::{AppConfig, Zone};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InputValidation,
    MissingData,
    Upstream,
    TransientStorage,
    Ai,
    Internal,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InputValidation => "input_validation",
            Self::MissingData => "missing_data",
            Self::Upstream => "upstream_failure",
            Self::TransientStorage => "transient_storage",
            Self::Ai => "ai_failure",
            Self::Internal => "internal_invariant",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client-visible operation failure.
#[derive(Debug, Error)]
#[error("{operation}: [{kind}] {message}")]
pub struct OpsError {
    pub operation: &'static str,
    pub kind: ErrorKind,
    pub message: String,
}

impl OpsError {
    pub fn new(operation: &'static str, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
        }
    }

    pub fn input(operation: &'static str, message: impl Into<String>) -> Self {
        Self::new(operation, ErrorKind::InputValidation, message)
    }

    pub fn missing(operation: &'static str, message: impl Into<String>) -> Self {
        Self::new(operation, ErrorKind::MissingData, message)
    }

    /// Classify a storage error: transient connection trouble or internal.
    pub fn storage(operation: &'static str, error: &anyhow::Error) -> Self {
        let kind = if sequia_store::retry::is_transient_error(error) {
            ErrorKind::TransientStorage
        } else {
            ErrorKind::Internal
        };
        Self::new(operation, kind, format!("{error:#}"))
    }
}

/// Shared operation environment: configuration, the store, and the
/// process-wide magnitude cache.
pub struct Ops {
    pub config: AppConfig,
    pub db: Database,
    pub magnitude_cache: Arc<MagnitudeCache>,
}

impl fmt::Debug for Ops {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ops")
            .field("demo_mode", &self.config.demo_mode)
            .finish()
    }
}

impl Ops {
    /// Open the environment. Demo mode runs on an in-memory database.
    pub fn open(config: AppConfig) -> Result<Self, OpsError> {
        const OP: &str = "Startup";
        config
            .validate()
            .map_err(|m| OpsError::input(OP, m))?;
        let db = if config.demo_mode {
            Database::open_in_memory().map_err(|e| OpsError::storage(OP, &e))?
        } else {
            Database::open(&config.database_url).map_err(|e| OpsError::storage(OP, &e))?
        };
        Ok(Self {
            config,
            db,
            magnitude_cache: Arc::new(MagnitudeCache::default()),
        })
    }

    /// Zone lookup shared by every operation.
    pub fn require_zone(&self, operation: &'static str, slug: &str) -> Result<Zone, OpsError> {
        if slug.is_empty()
            || !slug
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
        {
            return Err(OpsError::input(
                operation,
                format!("malformed zone slug: {slug:?}"),
            ));
        }
        self.db
            .get_zone_by_slug(slug)
            .map_err(|e| OpsError::storage(operation, &e))?
            .ok_or_else(|| {
                OpsError::missing(operation, format!("unknown zone {slug:?}; run `sequia init` or seed zones first"))
            })
    }

    /// Daily precipitation for analytics: the first source with data, in
    /// preference order.
    pub fn load_precipitation(
        &self,
        operation: &'static str,
        zone: &Zone,
    ) -> Result<Vec<sequia_types::DailyPrecipitation>, OpsError> {
        for source in ["openmeteo", "noaa"] {
            let records = self
                .db
                .query_precipitation(zone.id, source, None, None)
                .map_err(|e| OpsError::storage(operation, &e))?;
            if !records.is_empty() {
                return Ok(records);
            }
        }
        Err(OpsError::missing(
            operation,
            format!(
                "no precipitation stored for zone {:?}; run IngestZone first",
                zone.slug
            ),
        ))
    }
}
