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

//! Static action catalog.
//!
//! The canonical archetype list: the 15 classical response actions plus the
//! extended per-heuristic set. Initialized once per process and shared
//! read-only across requests.

mod entries;

use sequia_types::ActionArchetype;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static CATALOG: LazyLock<ActionCatalog> = LazyLock::new(ActionCatalog::build);

#[derive(Debug)]
pub struct ActionCatalog {
    by_code: BTreeMap<String, ActionArchetype>,
}

impl ActionCatalog {
    fn build() -> Self {
        let mut by_code = BTreeMap::new();
        for archetype in entries::all() {
            by_code.insert(archetype.code.clone(), archetype);
        }
        Self { by_code }
    }

    /// Process-wide catalog instance.
    pub fn global() -> &'static Self {
        &CATALOG
    }

    pub fn get(&self, code: &str) -> Option<&ActionArchetype> {
        self.by_code.get(code)
    }

    pub fn all(&self) -> impl Iterator<Item = &ActionArchetype> {
        self.by_code.values()
    }

    pub fn by_tag(&self, heuristic_tag: &str) -> Vec<&ActionArchetype> {
        self.by_code
            .values()
            .filter(|a| a.heuristic_tag == heuristic_tag)
            .collect()
    }

    /// Archetypes whose SPI applicability window contains `spi`.
    pub fn applicable_for_spi(&self, spi: f64) -> Vec<&ActionArchetype> {
        self.by_code
            .values()
            .filter(|a| a.applies_to_spi(spi))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sequia_types::ParamSpec;

    #[test]
    fn catalog_has_classical_and_extended_sets() {
        let catalog = ActionCatalog::global();
        assert!(catalog.len() >= 55, "{} entries", catalog.len());
        assert!(catalog.get("H4_LAWN_BAN").is_some());
        assert!(catalog.get("H2_PRESSURE_REDUCTION").is_some());
        assert!(catalog.get("H3_AWARENESS_CAMPAIGN").is_some());
        assert!(catalog.get("H11_PREEMPTIVE_ACTIVATION").is_some());
        assert!(catalog.get("H15_PHASED_RELAXATION").is_some());
    }

    #[test]
    fn codes_are_unique_and_tagged() {
        let catalog = ActionCatalog::global();
        for a in catalog.all() {
            assert!(a.code.starts_with(&a.heuristic_tag), "{}", a.code);
            assert!(a.spi_min <= a.spi_max);
        }
    }

    #[test]
    fn spi_lookup_respects_windows() {
        let catalog = ActionCatalog::global();
        let at_deep = catalog.applicable_for_spi(-2.4);
        assert!(at_deep.iter().any(|a| a.code == "H5_EMERGENCY_WELLS"));
        assert!(at_deep.iter().any(|a| a.code == "H4_LAWN_BAN"));

        let at_mild = catalog.applicable_for_spi(-1.1);
        assert!(at_mild.iter().any(|a| a.code == "H1_INDUSTRIAL_AUDIT"));
        assert!(!at_mild.iter().any(|a| a.code == "H5_EMERGENCY_WELLS"));

        // Recovery actions only apply above zero.
        let at_wet = catalog.applicable_for_spi(0.5);
        assert!(at_wet.iter().any(|a| a.code == "H15_PHASED_RELAXATION"));
        assert!(!at_deep.iter().any(|a| a.code == "H15_PHASED_RELAXATION"));
    }

    #[test]
    fn lawn_ban_schema_shape() {
        let lawn = ActionCatalog::global().get("H4_LAWN_BAN").unwrap();
        assert_eq!(lawn.default_urgency_days, 3);
        match lawn.schema.get("hours_allowed_per_day") {
            Some(ParamSpec::Numeric { min, max, .. }) => {
                assert_eq!(*min, 0.0);
                assert_eq!(*max, 4.0);
            }
            other => panic!("unexpected spec: {other:?}"),
        }
    }

    #[test]
    fn tag_lookup_groups_families() {
        let h4 = ActionCatalog::global().by_tag("H4");
        assert!(h4.len() >= 7);
        assert!(h4.iter().all(|a| a.heuristic_tag == "H4"));
    }
}
