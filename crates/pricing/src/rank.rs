//! Competitive ranks and the account value they imply.

use core::ops::RangeInclusive;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use skinvault_core::Cents;

use crate::catalog::BundleCatalog;
use crate::error::{PricingError, PricingResult};
use crate::solver::{PurchasePlan, solve};
use crate::tier::PricingTier;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rank {
    Iron,
    Bronze,
    Silver,
    Gold,
    Platinum,
    Diamond,
    Ascendant,
    Immortal,
    Radiant,
}

impl Rank {
    pub const ALL: [Rank; 9] = [
        Rank::Iron,
        Rank::Bronze,
        Rank::Silver,
        Rank::Gold,
        Rank::Platinum,
        Rank::Diamond,
        Rank::Ascendant,
        Rank::Immortal,
        Rank::Radiant,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Rank::Iron => "Iron",
            Rank::Bronze => "Bronze",
            Rank::Silver => "Silver",
            Rank::Gold => "Gold",
            Rank::Platinum => "Platinum",
            Rank::Diamond => "Diamond",
            Rank::Ascendant => "Ascendant",
            Rank::Immortal => "Immortal",
            Rank::Radiant => "Radiant",
        }
    }

    /// Competitive tier numbers covered by this rank (three per rank, Radiant is 27 alone).
    pub fn tiers(self) -> RangeInclusive<u8> {
        if self == Rank::Radiant {
            return 27..=27;
        }
        let start = 3 + 3 * self as u8;
        start..=start + 2
    }

    /// The tier whose icon represents the rank: the middle one.
    pub fn representative_tier(self) -> u8 {
        let tiers = self.tiers();
        (tiers.start() + tiers.end()) / 2
    }

    /// Estimated market value of an account at this rank.
    pub fn account_value(self) -> Cents {
        match self {
            Rank::Iron => Cents::from_parts(3, 70),
            Rank::Bronze => Cents::from_parts(6, 0),
            Rank::Silver => Cents::from_parts(8, 50),
            Rank::Gold => Cents::from_parts(12, 0),
            Rank::Platinum => Cents::from_parts(18, 0),
            Rank::Diamond => Cents::from_parts(27, 50),
            Rank::Ascendant => Cents::from_parts(39, 99),
            Rank::Immortal => Cents::from_parts(124, 50),
            Rank::Radiant => Cents::from_parts(250, 0),
        }
    }
}

impl core::fmt::Display for Rank {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Rank {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Rank::ALL
            .into_iter()
            .find(|rank| rank.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| PricingError::UnknownRank(s.to_string()))
    }
}

/// Real-money value of an account: bundles it owns plus its rank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountValuation {
    pub bundle_units: u64,
    pub plan: PurchasePlan,
    pub rank: Option<Rank>,
    pub rank_value: Cents,
    pub total: Cents,
}

impl AccountValuation {
    pub fn compute<'a>(
        catalog: &BundleCatalog,
        bundles: impl IntoIterator<Item = &'a str>,
        rank: Option<Rank>,
        tiers: &[PricingTier],
    ) -> PricingResult<Self> {
        let bundle_units = catalog.total_units(bundles);
        let plan = solve(i64::try_from(bundle_units).unwrap_or(i64::MAX), tiers)?;
        let rank_value = rank.map(Rank::account_value).unwrap_or(Cents::ZERO);

        let total = plan
            .total_cost
            .checked_add(rank_value)
            .ok_or(PricingError::CostOverflow)?;

        Ok(Self {
            bundle_units,
            total,
            plan,
            rank,
            rank_value,
        })
    }
}
