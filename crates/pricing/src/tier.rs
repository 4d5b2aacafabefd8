//! Purchasable currency denominations.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use skinvault_core::{Cents, ValueObject};

use crate::error::{PricingError, PricingResult};

/// One purchasable package: pay `cost`, receive `total_units` (base + bonus).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PricingTier {
    pub cost: Cents,
    pub total_units: u32,
}

impl PricingTier {
    pub const fn new(cost: Cents, total_units: u32) -> Self {
        Self { cost, total_units }
    }

    /// Cents per unit, for comparing tier efficiency.
    pub fn unit_price(&self) -> f64 {
        self.cost.minor() as f64 / f64::from(self.total_units)
    }
}

impl ValueObject for PricingTier {}

const VP_TIERS: [PricingTier; 6] = [
    PricingTier::new(Cents::from_parts(4, 99), 475),
    PricingTier::new(Cents::from_parts(9, 99), 1000),
    PricingTier::new(Cents::from_parts(19, 99), 2050),
    PricingTier::new(Cents::from_parts(34, 99), 3650),
    PricingTier::new(Cents::from_parts(49, 99), 5350),
    PricingTier::new(Cents::from_parts(99, 99), 11000),
];

/// The store's point packages, smallest first.
///
/// Larger packages carry more bonus points, so per-unit cost falls with size.
pub fn vp_tiers() -> Vec<PricingTier> {
    VP_TIERS.to_vec()
}

/// A usable tier table is non-empty, every tier provides units and no two tiers
/// provide the same number of units.
pub fn validate_tiers(tiers: &[PricingTier]) -> PricingResult<()> {
    if tiers.is_empty() {
        return Err(PricingError::NoTiers);
    }
    let mut seen = HashSet::with_capacity(tiers.len());
    for tier in tiers {
        if tier.total_units == 0 {
            return Err(PricingError::EmptyTier { cost: tier.cost });
        }
        if !seen.insert(tier.total_units) {
            return Err(PricingError::DuplicateTier(tier.total_units));
        }
    }
    Ok(())
}
