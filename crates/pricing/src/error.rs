use skinvault_core::Cents;
use thiserror::Error;

pub type PricingResult<T> = Result<T, PricingError>;

#[derive(Debug, Error)]
pub enum PricingError {
    /// Nothing can be bought: a positive amount can never be covered.
    #[error("no pricing tiers configured")]
    NoTiers,

    #[error("pricing tier costing {cost} provides no units")]
    EmptyTier { cost: Cents },

    #[error("more than one pricing tier provides {0} units")]
    DuplicateTier(u32),

    /// A plan or valuation total does not fit in the money type.
    #[error("purchase cost overflows")]
    CostOverflow,

    #[error("invalid bundle catalog: {0}")]
    Catalog(#[from] serde_json::Error),

    #[error("unknown rank: {0}")]
    UnknownRank(String),
}
