//! What a pile of in-game points costs in real money.
//!
//! Pure functions only: no IO, no state between calls.

pub mod catalog;
pub mod error;
pub mod rank;
pub mod solver;
pub mod tier;

pub use catalog::{BundleCatalog, DEFAULT_BUNDLE_UNITS};
pub use error::{PricingError, PricingResult};
pub use rank::{AccountValuation, Rank};
pub use solver::{LineItem, PurchasePlan, estimate_cost, solve};
pub use tier::{PricingTier, validate_tiers, vp_tiers};
