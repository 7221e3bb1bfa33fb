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

//! Transient-error retry for storage operations.
//!
//! Connection-level failures (reset, refused, SSL termination, a locked
//! SQLite file) are retried with exponential backoff; anything else
//! propagates immediately.

use anyhow::Result;
use std::time::Duration;
use tracing::warn;

const MAX_RETRIES: u32 = 3;
const RETRY_DELAY: Duration = Duration::from_millis(500);

const TRANSIENT_INDICATORS: [&str; 8] = [
    "ssl connection has been closed unexpectedly",
    "connection refused",
    "connection reset",
    "connection timed out",
    "server closed the connection unexpectedly",
    "terminating connection",
    "database is locked",
    "database table is locked",
];

/// Whether an error message looks like a transient connection problem.
pub fn is_transient_error(error: &anyhow::Error) -> bool {
    let message = format!("{error:#}").to_ascii_lowercase();
    TRANSIENT_INDICATORS.iter().any(|i| message.contains(i))
}

/// Run a storage operation with up to three attempts on transient errors.
pub fn with_retry<T>(label: &str, mut operation: impl FnMut() -> Result<T>) -> Result<T> {
    let mut attempt = 1u32;
    loop {
        match operation() {
            Ok(value) => return Ok(value),
            Err(e) if attempt < MAX_RETRIES && is_transient_error(&e) => {
                let delay = RETRY_DELAY * attempt;
                warn!("{label}: transient storage error (attempt {attempt}/{MAX_RETRIES}): {e:#}");
                std::thread::sleep(delay);
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn transient_messages_are_recognized() {
        assert!(is_transient_error(&anyhow::anyhow!("database is locked")));
        assert!(is_transient_error(&anyhow::anyhow!(
            "SSL connection has been closed unexpectedly"
        )));
        assert!(is_transient_error(&anyhow::anyhow!("Connection reset by peer")));
        assert!(!is_transient_error(&anyhow::anyhow!("UNIQUE constraint failed")));
    }

    #[test]
    fn transient_errors_retry_to_success() {
        let calls = Cell::new(0u32);
        let result = with_retry("test", || {
            calls.set(calls.get() + 1);
            if calls.get() < 2 {
                Err(anyhow::anyhow!("connection reset"))
            } else {
                Ok(42)
            }
        });
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn non_transient_errors_propagate_once() {
        let calls = Cell::new(0u32);
        let result: Result<()> = with_retry("test", || {
            calls.set(calls.get() + 1);
            Err(anyhow::anyhow!("syntax error"))
        });
        assert!(result.is_err());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn budget_is_exhausted_after_three_attempts() {
        let calls = Cell::new(0u32);
        let result: Result<()> = with_retry("test", || {
            calls.set(calls.get() + 1);
            Err(anyhow::anyhow!("connection refused"))
        });
        assert!(result.is_err());
        assert_eq!(calls.get(), 3);
    }
}
