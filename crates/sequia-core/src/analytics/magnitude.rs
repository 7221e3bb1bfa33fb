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

//! Run-theory drought magnitude.
//!
//! A drought event is a maximal run of months with SPI below the threshold;
//! its magnitude is the sum of |SPI| over the run, capturing intensity and
//! duration together. The current event is ranked against the zone's
//! fitted historical population.

use parking_lot::RwLock;
use sequia_types::SeverityTier;
use std::collections::HashMap;
use std::time::{Duration, Instant};

const DEFAULT_THRESHOLD: f64 = -1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct DroughtEvent {
    pub start_index: usize,
    /// Exclusive end index; `None` while the run is still open.
    pub end_index: Option<usize>,
    pub duration_months: u32,
    pub magnitude: f64,
    pub min_spi: f64,
    pub is_ongoing: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MagnitudeSummary {
    pub magnitude: f64,
    pub duration_months: u32,
    pub min_spi: f64,
    pub percentile: f64,
    pub is_ongoing: bool,
    pub tier: SeverityTier,
}

#[derive(Debug, Clone)]
pub struct MagnitudeCalculator {
    threshold: f64,
    historical: Vec<f64>,
}

impl Default for MagnitudeCalculator {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            historical: Vec::new(),
        }
    }
}

impl MagnitudeCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_historical(historical: Vec<f64>) -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            historical,
        }
    }

    /// All maximal sub-threshold runs in chronological order.
    pub fn identify_events(&self, series: &[f64]) -> Vec<DroughtEvent> {
        let mut events = Vec::new();
        let mut start: Option<usize> = None;
        let mut acc = 0.0;
        let mut min_spi = f64::INFINITY;

        for (i, &spi) in series.iter().enumerate() {
            if spi < self.threshold {
                if start.is_none() {
                    start = Some(i);
                    acc = 0.0;
                    min_spi = f64::INFINITY;
                }
                acc += spi.abs();
                min_spi = min_spi.min(spi);
            } else if let Some(s) = start.take() {
                events.push(DroughtEvent {
                    start_index: s,
                    end_index: Some(i),
                    duration_months: (i - s) as u32,
                    magnitude: acc,
                    min_spi,
                    is_ongoing: false,
                });
            }
        }
        if let Some(s) = start {
            events.push(DroughtEvent {
                start_index: s,
                end_index: None,
                duration_months: (series.len() - s) as u32,
                magnitude: acc,
                min_spi,
                is_ongoing: true,
            });
        }
        events
    }

    /// Fit the historical population from a full series.
    pub fn fit_historical(&mut self, series: &[f64]) {
        self.historical = self
            .identify_events(series)
            .iter()
            .map(|e| e.magnitude)
            .collect();
    }

    pub fn historical_magnitudes(&self) -> &[f64] {
        &self.historical
    }

    /// Magnitude context for the current (ongoing) event; zeros when the
    /// series ends above threshold.
    pub fn current(&self, series: &[f64]) -> MagnitudeSummary {
        let empty = MagnitudeSummary {
            magnitude: 0.0,
            duration_months: 0,
            min_spi: 0.0,
            percentile: 0.0,
            is_ongoing: false,
            tier: SeverityTier::BelowAverage,
        };

        let events = self.identify_events(series);
        let Some(latest) = events.last() else {
            return empty;
        };
        if !latest.is_ongoing {
            return empty;
        }

        let percentile = self.percentile(latest.magnitude);
        MagnitudeSummary {
            magnitude: latest.magnitude,
            duration_months: latest.duration_months,
            min_spi: latest.min_spi,
            percentile,
            is_ongoing: true,
            tier: SeverityTier::from_percentile(percentile),
        }
    }

    /// Rank a magnitude against the fitted population, 0..100.
    pub fn percentile(&self, magnitude: f64) -> f64 {
        if self.historical.is_empty() {
            return if magnitude > 0.0 { 50.0 } else { 0.0 };
        }
        let below = self.historical.iter().filter(|m| **m < magnitude).count();
        below as f64 / self.historical.len() as f64 * 100.0
    }

    /// Ratio of the current magnitude to each of the top-N historical events.
    pub fn compare_to_top(&self, magnitude: f64, top_n: usize) -> Vec<(f64, f64)> {
        let mut sorted = self.historical.clone();
        sorted.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
        sorted
            .into_iter()
            .take(top_n)
            .map(|hist| (hist, if hist > 0.0 { magnitude / hist } else { 0.0 }))
            .collect()
    }
}

/// Bounded per-zone cache of fitted historical magnitude populations.
/// Entries expire after 24 h; beyond the size bound the stalest entry is
/// dropped.
#[derive(Debug)]
pub struct MagnitudeCache {
    max_entries: usize,
    ttl: Duration,
    entries: RwLock<HashMap<String, (Instant, Vec<f64>)>>,
}

impl Default for MagnitudeCache {
    fn default() -> Self {
        Self::new(64, Duration::from_secs(24 * 60 * 60))
    }
}

impl MagnitudeCache {
    pub fn new(max_entries: usize, ttl: Duration) -> Self {
        Self {
            max_entries,
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn get(&self, zone_slug: &str) -> Option<Vec<f64>> {
        let entries = self.entries.read();
        let (at, mags) = entries.get(zone_slug)?;
        if at.elapsed() > self.ttl {
            return None;
        }
        Some(mags.clone())
    }

    pub fn insert(&self, zone_slug: &str, magnitudes: Vec<f64>) {
        let mut entries = self.entries.write();
        if entries.len() >= self.max_entries && !entries.contains_key(zone_slug) {
            let stalest = entries
                .iter()
                .min_by_key(|(_, (at, _))| *at)
                .map(|(k, _)| k.clone());
            if let Some(k) = stalest {
                entries.remove(&k);
            }
        }
        entries.insert(zone_slug.to_owned(), (Instant::now(), magnitudes));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magnitude_is_sum_of_absolute_spi() {
        let series = [0.2, -1.2, -1.5, -1.1, 0.3, -1.3, -1.6];
        let calc = MagnitudeCalculator::new();
        let events = calc.identify_events(&series);
        assert_eq!(events.len(), 2);
        assert!((events[0].magnitude - (1.2 + 1.5 + 1.1)).abs() < 1e-12);
        assert_eq!(events[0].duration_months, 3);
        assert!(!events[0].is_ongoing);
        assert!((events[1].magnitude - (1.3 + 1.6)).abs() < 1e-12);
        assert!(events[1].is_ongoing);
        assert!((events[1].min_spi + 1.6).abs() < 1e-12);
    }

    #[test]
    fn threshold_boundary_is_exclusive() {
        // Exactly -1.0 is not a drought month.
        let events = MagnitudeCalculator::new().identify_events(&[-1.0, -1.0]);
        assert!(events.is_empty());
    }

    #[test]
    fn percentile_ranks_within_history() {
        let calc = MagnitudeCalculator::with_historical(vec![1.0, 2.0, 3.0, 4.0]);
        assert!((calc.percentile(2.5) - 50.0).abs() < 1e-12);
        assert!((calc.percentile(10.0) - 100.0).abs() < 1e-12);
        assert!((calc.percentile(0.5) - 0.0).abs() < 1e-12);
    }

    #[test]
    fn percentile_stays_in_bounds() {
        let calc = MagnitudeCalculator::with_historical(vec![0.5, 1.5, 2.5]);
        for m in [0.0, 0.5, 1.0, 5.0] {
            let p = calc.percentile(m);
            assert!((0.0..=100.0).contains(&p));
        }
    }

    #[test]
    fn ended_event_yields_empty_summary() {
        let calc = MagnitudeCalculator::new();
        let summary = calc.current(&[-1.5, -1.2, 0.5]);
        assert_eq!(summary.magnitude, 0.0);
        assert!(!summary.is_ongoing);
    }

    #[test]
    fn no_history_means_median_rank_for_active_events() {
        let calc = MagnitudeCalculator::new();
        let summary = calc.current(&[0.1, -1.4, -1.8]);
        assert!(summary.is_ongoing);
        assert!((summary.percentile - 50.0).abs() < 1e-12);
        assert_eq!(summary.tier, SeverityTier::Moderate);
    }

    #[test]
    fn cache_bounds_and_returns_entries() {
        let cache = MagnitudeCache::new(2, Duration::from_secs(60));
        cache.insert("a", vec![1.0]);
        cache.insert("b", vec![2.0]);
        cache.insert("c", vec![3.0]);
        let live = ["a", "b", "c"]
            .iter()
            .filter(|z| cache.get(z).is_some())
            .count();
        assert_eq!(live, 2);
        assert_eq!(cache.get("c"), Some(vec![3.0]));
    }
}
