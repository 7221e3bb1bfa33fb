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

//! Dry/wet season context.
//!
//! Zones with a pronounced rainy season need SPI signals interpreted in
//! season context: a dry-season deficit is validated against an absolute
//! threshold, and a failed wet season engages a restriction latch that only
//! a subsequent non-deficit season releases.

use crate::spi::{MonthlyTotal, SpiPoint};
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;
use std::sync::LazyLock;

const DEFAULT_DEFICIT_THRESHOLD_MM: f64 = 50.0;
const WET_SEASON_FAILURE_SPI: f64 = -1.0;
const WET_SEASON_RELEASE_SPI: f64 = 0.0;

#[derive(Debug, Clone, Copy)]
struct SeasonTable {
    dry: &'static [u32],
    wet: &'static [u32],
}

static ZONE_SEASONS: LazyLock<BTreeMap<&'static str, SeasonTable>> = LazyLock::new(|| {
    let mut m = BTreeMap::new();
    m.insert(
        "cdmx",
        SeasonTable {
            dry: &[11, 12, 1, 2, 3, 4, 5],
            wet: &[6, 7, 8, 9, 10],
        },
    );
    m.insert(
        "monterrey",
        SeasonTable {
            dry: &[11, 12, 1, 2, 3, 4, 5],
            wet: &[6, 7, 8, 9, 10],
        },
    );
    m.insert(
        "guadalajara",
        SeasonTable {
            dry: &[11, 12, 1, 2, 3, 4, 5],
            wet: &[6, 7, 8, 9, 10],
        },
    );
    m.insert(
        "sonora",
        SeasonTable {
            dry: &[10, 11, 12, 1, 2, 3, 4, 5],
            wet: &[6, 7, 8, 9],
        },
    );
    m.insert(
        "yucatan",
        SeasonTable {
            dry: &[11, 12, 1, 2, 3, 4],
            wet: &[5, 6, 7, 8, 9, 10],
        },
    );
    m.insert(
        "default",
        SeasonTable {
            dry: &[11, 12, 1, 2, 3, 4],
            wet: &[5, 6, 7, 8, 9, 10],
        },
    );
    m
});

#[derive(Debug, Clone)]
pub struct SeasonalityDetector {
    deficit_threshold_mm: f64,
    seasons: SeasonTable,
}

impl SeasonalityDetector {
    pub fn new(zone_slug: &str) -> Self {
        let key = zone_slug.to_ascii_lowercase();
        let seasons = ZONE_SEASONS
            .get(key.as_str())
            .or_else(|| ZONE_SEASONS.get("default"))
            .copied()
            .expect("default season table is always present");
        Self {
            deficit_threshold_mm: DEFAULT_DEFICIT_THRESHOLD_MM,
            seasons,
        }
    }

    pub fn with_deficit_threshold(mut self, threshold_mm: f64) -> Self {
        self.deficit_threshold_mm = threshold_mm;
        self
    }

    pub fn deficit_threshold_mm(&self) -> f64 {
        self.deficit_threshold_mm
    }

    pub fn is_dry_season(&self, date: NaiveDate) -> bool {
        self.seasons.dry.contains(&date.month())
    }

    pub fn wet_months(&self) -> &'static [u32] {
        self.seasons.wet
    }

    /// Per-year wet-season SPI averages, ascending by year; only seasons
    /// with every wet month observed count as completed.
    fn wet_season_averages(&self, series: &[SpiPoint]) -> Vec<(i32, f64)> {
        let mut by_year: BTreeMap<i32, Vec<f64>> = BTreeMap::new();
        for p in series {
            if self.seasons.wet.contains(&p.month) {
                by_year.entry(p.year).or_default().push(p.spi);
            }
        }
        by_year
            .into_iter()
            .filter(|(_, spis)| spis.len() == self.seasons.wet.len())
            .map(|(year, spis)| (year, spis.iter().sum::<f64>() / spis.len() as f64))
            .collect()
    }

    /// Mean SPI over the most recent completed wet season.
    pub fn wet_season_avg(&self, series: &[SpiPoint]) -> Option<f64> {
        self.wet_season_averages(series).last().map(|(_, avg)| *avg)
    }

    /// Latch: engaged when a completed wet season averaged below -1.0, and
    /// held until a later season averages at or above 0.
    pub fn wet_season_locked(&self, series: &[SpiPoint]) -> bool {
        let mut locked = false;
        for (_, avg) in self.wet_season_averages(series) {
            if avg < WET_SEASON_FAILURE_SPI {
                locked = true;
            } else if avg >= WET_SEASON_RELEASE_SPI {
                locked = false;
            }
        }
        locked
    }

    /// Absolute precipitation deficit for the current season: historical
    /// same-season average minus this year's total.
    pub fn seasonal_deficit(&self, monthly: &[MonthlyTotal], ref_date: NaiveDate) -> Option<f64> {
        let season = if self.is_dry_season(ref_date) {
            self.seasons.dry
        } else {
            self.seasons.wet
        };
        let current_year = ref_date.year();

        let current_total: f64 = monthly
            .iter()
            .filter(|m| m.year == current_year && season.contains(&m.month))
            .map(|m| m.total_mm)
            .sum();

        let mut by_year: BTreeMap<i32, f64> = BTreeMap::new();
        let mut seen_current = false;
        for m in monthly {
            if !season.contains(&m.month) {
                continue;
            }
            if m.year == current_year {
                seen_current = true;
            } else if m.year < current_year {
                *by_year.entry(m.year).or_insert(0.0) += m.total_mm;
            }
        }
        if !seen_current || by_year.is_empty() {
            return None;
        }

        let historical_avg = by_year.values().sum::<f64>() / by_year.len() as f64;
        Some(historical_avg - current_total)
    }

    /// A negative dry-season SPI only counts as a drought signal when the
    /// absolute deficit clears the threshold.
    pub fn validates_drought_signal(
        &self,
        spi: f64,
        deficit_mm: Option<f64>,
        ref_date: NaiveDate,
    ) -> bool {
        if spi >= -1.0 {
            return false;
        }
        if !self.is_dry_season(ref_date) {
            return true;
        }
        deficit_mm.is_some_and(|d| d > self.deficit_threshold_mm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn season_series(yearly: &[(i32, f64)]) -> Vec<SpiPoint> {
        // Full calendar years with wet months pinned at the given average.
        let mut out = Vec::new();
        for (year, wet_avg) in yearly {
            for month in 1..=12u32 {
                let wet = [6, 7, 8, 9, 10].contains(&month);
                out.push(SpiPoint {
                    year: *year,
                    month,
                    precip_sum_mm: 50.0,
                    spi: if wet { *wet_avg } else { 0.0 },
                });
            }
        }
        out
    }

    #[test]
    fn cdmx_dry_season_lookup() {
        let s = SeasonalityDetector::new("cdmx");
        assert!(s.is_dry_season(date(2024, 2, 10)));
        assert!(!s.is_dry_season(date(2024, 7, 10)));
    }

    #[test]
    fn unknown_zone_uses_default_table() {
        let s = SeasonalityDetector::new("atlantis");
        assert!(s.is_dry_season(date(2024, 12, 1)));
        assert!(!s.is_dry_season(date(2024, 6, 1)));
    }

    #[test]
    fn wet_season_average_tracks_last_completed_season() {
        let s = SeasonalityDetector::new("cdmx");
        let series = season_series(&[(2021, 0.4), (2022, -1.2)]);
        let avg = s.wet_season_avg(&series).unwrap();
        assert!((avg + 1.2).abs() < 1e-9);
    }

    #[test]
    fn lock_engages_on_failed_season_and_releases_on_recovery() {
        let s = SeasonalityDetector::new("cdmx");
        let failed = season_series(&[(2021, 0.2), (2022, -1.2)]);
        assert!(s.wet_season_locked(&failed));

        // A later season at +0.3 releases the latch.
        let recovered = season_series(&[(2021, 0.2), (2022, -1.2), (2023, 0.3)]);
        assert!(!s.wet_season_locked(&recovered));

        // A later season between -1 and 0 holds the latch.
        let limbo = season_series(&[(2022, -1.2), (2023, -0.4)]);
        assert!(s.wet_season_locked(&limbo));
    }

    #[test]
    fn deficit_compares_against_historical_average() {
        let s = SeasonalityDetector::new("cdmx");
        let mut monthly = Vec::new();
        for year in 2020..=2022 {
            for month in [6u32, 7, 8, 9, 10] {
                let mm = if year == 2022 { 40.0 } else { 100.0 };
                monthly.push(MonthlyTotal {
                    year,
                    month,
                    total_mm: mm,
                });
            }
        }
        let deficit = s.seasonal_deficit(&monthly, date(2022, 8, 15)).unwrap();
        // Historical 500 mm per season vs 200 mm this year.
        assert!((deficit - 300.0).abs() < 1e-9);
    }

    #[test]
    fn dry_season_signal_needs_deficit_validation() {
        let s = SeasonalityDetector::new("cdmx");
        let in_dry = date(2024, 3, 1);
        let in_wet = date(2024, 7, 1);
        assert!(s.validates_drought_signal(-1.4, None, in_wet));
        assert!(!s.validates_drought_signal(-1.4, None, in_dry));
        assert!(!s.validates_drought_signal(-1.4, Some(30.0), in_dry));
        assert!(s.validates_drought_signal(-1.4, Some(80.0), in_dry));
        assert!(!s.validates_drought_signal(-0.4, Some(80.0), in_dry));
    }
}
