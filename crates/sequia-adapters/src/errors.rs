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

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("no data available: {0}")]
    NoData(String),

    #[error("adapter configuration error: {0}")]
    Config(String),
}

impl SourceError {
    /// Transient failures are worth retrying: connect/timeout errors, rate
    /// limits and upstream 5xx.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            Self::NoData(_) | Self::Config(_) => false,
        }
    }
}

pub type SourceResult<T> = std::result::Result<T, SourceError>;
