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

//! Phenological calendar: crop growth windows in which water stress causes
//! disproportionate yield loss. Process-wide read-only table.

use chrono::{Datelike, NaiveDate};
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy)]
struct StageWindow {
    crop: &'static str,
    stage: &'static str,
    start: (u32, u32),
    end: (u32, u32),
    severity_multiplier: f64,
}

static CRITICAL_WINDOWS: LazyLock<Vec<StageWindow>> = LazyLock::new(|| {
    vec![
        StageWindow {
            crop: "maiz",
            stage: "siembra",
            start: (3, 15),
            end: (4, 30),
            severity_multiplier: 1.2,
        },
        StageWindow {
            crop: "maiz",
            stage: "floracion",
            start: (7, 1),
            end: (8, 15),
            severity_multiplier: 1.5,
        },
        StageWindow {
            crop: "maiz",
            stage: "llenado_grano",
            start: (8, 15),
            end: (9, 30),
            severity_multiplier: 1.4,
        },
        StageWindow {
            crop: "frijol",
            stage: "floracion",
            start: (7, 15),
            end: (8, 30),
            severity_multiplier: 1.5,
        },
        StageWindow {
            crop: "frijol",
            stage: "llenado",
            start: (8, 15),
            end: (9, 15),
            severity_multiplier: 1.4,
        },
        StageWindow {
            crop: "trigo",
            stage: "encanado",
            start: (1, 15),
            end: (2, 28),
            severity_multiplier: 1.3,
        },
        StageWindow {
            crop: "trigo",
            stage: "espigado",
            start: (2, 15),
            end: (3, 31),
            severity_multiplier: 1.5,
        },
        StageWindow {
            crop: "sorgo",
            stage: "floracion",
            start: (8, 1),
            end: (9, 15),
            severity_multiplier: 1.5,
        },
        StageWindow {
            crop: "sorgo",
            stage: "llenado_grano",
            start: (9, 1),
            end: (10, 15),
            severity_multiplier: 1.4,
        },
        StageWindow {
            crop: "cebada",
            stage: "espigado",
            start: (2, 1),
            end: (3, 15),
            severity_multiplier: 1.5,
        },
        StageWindow {
            crop: "avena",
            stage: "espigado",
            start: (2, 15),
            end: (4, 15),
            severity_multiplier: 1.4,
        },
    ]
});

const MOST_CRITICAL_STAGES: [&str; 4] = ["floracion", "espigado", "llenado", "llenado_grano"];

/// Active-window summary for a reference date.
#[derive(Debug, Clone, PartialEq)]
pub struct PhenoWindowStatus {
    pub is_critical: bool,
    pub crops_affected: Vec<String>,
    pub stages: Vec<String>,
    pub max_severity_multiplier: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpcomingWindow {
    pub crop: String,
    pub stage: String,
    pub start_date: NaiveDate,
    pub days_until: i64,
    pub severity_multiplier: f64,
}

#[derive(Debug, Clone)]
pub struct PhenologyCalendar {
    crops: Vec<String>,
}

impl Default for PhenologyCalendar {
    fn default() -> Self {
        Self::new(&["maiz", "frijol"])
    }
}

impl PhenologyCalendar {
    pub fn new(crops: &[&str]) -> Self {
        Self {
            crops: crops.iter().map(|c| (*c).to_owned()).collect(),
        }
    }

    fn monitored(&self) -> impl Iterator<Item = &'static StageWindow> + '_ {
        CRITICAL_WINDOWS
            .iter()
            .filter(|w| self.crops.iter().any(|c| c == w.crop))
    }

    /// Active windows at `date`; severity is the max among them.
    pub fn status(&self, date: NaiveDate) -> PhenoWindowStatus {
        let mut crops_affected = Vec::new();
        let mut stages = Vec::new();
        let mut max_multiplier = 1.0f64;

        for w in self.monitored() {
            if in_window(date, w.start, w.end) {
                if !crops_affected.iter().any(|c: &String| c == w.crop) {
                    crops_affected.push(w.crop.to_owned());
                }
                stages.push(format!("{}:{}", w.crop, w.stage));
                max_multiplier = max_multiplier.max(w.severity_multiplier);
            }
        }

        PhenoWindowStatus {
            is_critical: !stages.is_empty(),
            crops_affected,
            stages,
            max_severity_multiplier: max_multiplier,
        }
    }

    pub fn is_critical_window(&self, date: NaiveDate) -> bool {
        self.status(date).is_critical
    }

    pub fn stress_multiplier(&self, date: NaiveDate) -> f64 {
        self.status(date).max_severity_multiplier
    }

    /// Flowering and grain-fill stages carry the worst yield sensitivity.
    pub fn is_most_critical_stage(&self, date: NaiveDate) -> bool {
        self.status(date)
            .stages
            .iter()
            .any(|s| MOST_CRITICAL_STAGES.iter().any(|c| s.ends_with(c)))
    }

    /// Monitored windows opening within `days_ahead` days, nearest first.
    pub fn upcoming_windows(&self, date: NaiveDate, days_ahead: i64) -> Vec<UpcomingWindow> {
        let mut out = Vec::new();
        for w in self.monitored() {
            let Some(mut start) = NaiveDate::from_ymd_opt(date.year(), w.start.0, w.start.1) else {
                continue;
            };
            if start < date {
                let Some(next_year) = NaiveDate::from_ymd_opt(date.year() + 1, w.start.0, w.start.1)
                else {
                    continue;
                };
                start = next_year;
            }
            let days_until = (start - date).num_days();
            if days_until > 0 && days_until <= days_ahead {
                out.push(UpcomingWindow {
                    crop: w.crop.to_owned(),
                    stage: w.stage.to_owned(),
                    start_date: start,
                    days_until,
                    severity_multiplier: w.severity_multiplier,
                });
            }
        }
        out.sort_by_key(|w| w.days_until);
        out
    }
}

/// Windows expressed as (month, day) pairs; a window crossing the year
/// boundary wraps.
fn in_window(date: NaiveDate, start: (u32, u32), end: (u32, u32)) -> bool {
    let md = (date.month(), date.day());
    if start <= end {
        start <= md && md <= end
    } else {
        md >= start || md <= end
    }
}
