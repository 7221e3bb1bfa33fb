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

//! Multi-scale SPI: the six standard aggregation windows computed
//! independently over one daily series.
//!
//! Scales share no state; a scale whose history is too short simply
//! yields an empty series rather than failing the batch.

use super::engine::{SpiEngine, SpiPoint};
use crate::error::Result;
use sequia_types::DailyPrecipitation;
use std::collections::BTreeMap;
use tracing::debug;

pub const SCALES: [usize; 6] = [1, 3, 6, 12, 24, 48];

/// Most recent SPI value per scale; `None` where the scale could not fit.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CurrentSpi {
    pub spi_1: Option<f64>,
    pub spi_3: Option<f64>,
    pub spi_6: Option<f64>,
    pub spi_12: Option<f64>,
    pub spi_24: Option<f64>,
    pub spi_48: Option<f64>,
}

impl CurrentSpi {
    pub fn get(&self, scale: usize) -> Option<f64> {
        match scale {
            1 => self.spi_1,
            3 => self.spi_3,
            6 => self.spi_6,
            12 => self.spi_12,
            24 => self.spi_24,
            48 => self.spi_48,
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MultiScaleSpi;

impl MultiScaleSpi {
    pub fn new() -> Self {
        Self
    }

    /// Compute every scale. Scales without enough history come back empty.
    pub fn compute_all(&self, daily: &[DailyPrecipitation]) -> BTreeMap<usize, Vec<SpiPoint>> {
        let mut out = BTreeMap::new();
        for scale in SCALES {
            let series = match SpiEngine::new(scale).compute(daily) {
                Ok(series) => series,
                Err(e) => {
                    debug!(scale, error = %e, "scale unavailable");
                    Vec::new()
                }
            };
            out.insert(scale, series);
        }
        out
    }

    pub fn current(&self, all: &BTreeMap<usize, Vec<SpiPoint>>) -> CurrentSpi {
        let last = |scale: usize| -> Option<f64> {
            all.get(&scale).and_then(|s| s.last()).map(|p| p.spi)
        };
        CurrentSpi {
            spi_1: last(1),
            spi_3: last(3),
            spi_6: last(6),
            spi_12: last(12),
            spi_24: last(24),
            spi_48: last(48),
        }
    }

    /// |SPI-1 - SPI-12|, the short/long divergence behind green-drought
    /// detection.
    pub fn scale_differential(&self, current: &CurrentSpi) -> Option<f64> {
        match (current.spi_1, current.spi_12) {
            (Some(short), Some(long)) => Some((short - long).abs()),
            _ => None,
        }
    }

    /// Trailing months in which SPI-3, SPI-6 and SPI-12 are all positive.
    pub fn all_scales_positive_months(&self, all: &BTreeMap<usize, Vec<SpiPoint>>) -> u32 {
        let scales = [3usize, 6, 12];
        let min_len = scales
            .iter()
            .map(|s| all.get(s).map_or(0, Vec::len))
            .min()
            .unwrap_or(0);
        if min_len == 0 {
            return 0;
        }

        let mut count = 0u32;
        'outer: for back in 1..=min_len {
            for s in scales {
                let series = &all[&s];
                if series[series.len() - back].spi <= 0.0 {
                    break 'outer;
                }
            }
            count += 1;
        }
        count
    }

    /// Full series for one scale, if it was computable.
    pub fn series(&self, daily: &[DailyPrecipitation], scale: usize) -> Result<Vec<SpiPoint>> {
        SpiEngine::new(scale).compute(daily)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::synthetic_daily;

    #[test]
    fn long_scales_drop_out_on_short_records() {
        let daily = synthetic_daily(6);
        let multi = MultiScaleSpi::new();
        let all = multi.compute_all(&daily);
        let current = multi.current(&all);
        assert!(current.spi_1.is_some());
        assert!(current.spi_6.is_some());
        // 48-month rolling over 6 years leaves 3 distinct years: refused.
        assert!(current.spi_48.is_none());
    }

    #[test]
    fn differential_requires_both_scales() {
        let multi = MultiScaleSpi::new();
        let mut current = CurrentSpi::default();
        assert_eq!(multi.scale_differential(&current), None);
        current.spi_1 = Some(0.4);
        current.spi_12 = Some(-1.4);
        let diff = multi.scale_differential(&current).unwrap();
        assert!((diff - 1.8).abs() < 1e-12);
    }

    #[test]
    fn positive_month_count_stops_at_first_dry_month() {
        use crate::spi::engine::SpiPoint;
        let mk = |spis: &[f64]| -> Vec<SpiPoint> {
            spis.iter()
                .enumerate()
                .map(|(i, s)| SpiPoint {
                    year: 2020,
                    month: (i + 1) as u32,
                    precip_sum_mm: 10.0,
                    spi: *s,
                })
                .collect()
        };
        let mut all = BTreeMap::new();
        all.insert(3usize, mk(&[-0.5, 0.2, 0.4, 0.6]));
        all.insert(6usize, mk(&[0.1, 0.3, 0.2, 0.5]));
        all.insert(12usize, mk(&[0.2, -0.1, 0.3, 0.4]));
        // Walking back: months 4 and 3 are all-positive, month 2 fails on SPI-12.
        assert_eq!(MultiScaleSpi::new().all_scales_positive_months(&all), 2);
    }
}
