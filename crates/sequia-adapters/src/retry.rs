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

//! Retry policy shared by every outbound client: bounded attempts,
//! exponential backoff, optional jitter, and a caller-supplied transient
//! predicate.

use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_base: Duration,
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base: Duration::from_millis(500),
            jitter: true,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff_base: Duration) -> Self {
        Self {
            max_attempts,
            backoff_base,
            jitter: true,
        }
    }

    /// Backoff before retry number `attempt` (1-based): base * 2^(n-1),
    /// plus up to 50% jitter.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = self.backoff_base.saturating_mul(1u32 << attempt.min(6).saturating_sub(1));
        if self.jitter {
            let factor = 1.0 + rand::thread_rng().gen_range(0.0..0.5);
            exp.mul_f64(factor)
        } else {
            exp
        }
    }

    /// Run `operation` until it succeeds, the error is not transient, or
    /// the attempt budget is exhausted.
    pub async fn run<T, E, F, Fut>(
        &self,
        label: &str,
        is_transient: impl Fn(&E) -> bool,
        mut operation: F,
    ) -> Result<T, E>
    where
        E: std::fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt = 1u32;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.max_attempts && is_transient(&e) => {
                    let delay = self.delay_for(attempt);
                    warn!(
                        "{label}: attempt {attempt}/{} failed ({e}), retrying in {delay:?}",
                        self.max_attempts
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
