//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**: `Cents(499)` is
/// `Cents(499)` wherever it came from. To "modify" one, build a new one.
///
/// - **Value Object**: no identity (`Cents`, `PricingTier`, `PurchasePlan`)
/// - **Entity**: has identity (`Item`, keyed by `ItemId`)
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
