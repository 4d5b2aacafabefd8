//! Bundle name -> points price lookup.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::PricingResult;

/// Price assumed for bundles the catalog does not know (or lists as `null`).
pub const DEFAULT_BUNDLE_UNITS: u32 = 7100;

/// Bundle prices keyed by display name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BundleCatalog {
    prices: HashMap<String, Option<u32>>,
}

impl BundleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON object of `"bundle name": units | null`.
    pub fn from_json(raw: &str) -> PricingResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn insert(&mut self, name: impl Into<String>, units: Option<u32>) {
        self.prices.insert(name.into(), units);
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn units_for(&self, name: &str) -> u32 {
        self.prices
            .get(name)
            .copied()
            .flatten()
            .unwrap_or(DEFAULT_BUNDLE_UNITS)
    }

    /// Combined price of a selection of bundles.
    pub fn total_units<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> u64 {
        names
            .into_iter()
            .map(|name| u64::from(self.units_for(name)))
            .sum()
    }
}
