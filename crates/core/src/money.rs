//! Fixed-point money in minor currency units.

use serde::{Deserialize, Serialize};

use crate::value_object::ValueObject;

/// An amount of real money in cents.
///
/// Storing the smallest currency unit keeps every sum exact, so totals never
/// need intermediate rounding and always display with two decimals.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cents(u64);

impl Cents {
    pub const ZERO: Cents = Cents(0);

    pub const fn new(minor: u64) -> Self {
        Self(minor)
    }

    /// Build from whole dollars and a cent remainder (`from_parts(49, 99)` is 49.99).
    pub const fn from_parts(dollars: u64, cents: u64) -> Self {
        Self(dollars * 100 + cents)
    }

    pub const fn minor(self) -> u64 {
        self.0
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    pub fn checked_mul(self, quantity: u64) -> Option<Self> {
        self.0.checked_mul(quantity).map(Self)
    }
}

impl ValueObject for Cents {}

impl core::fmt::Display for Cents {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_two_decimals() {
        assert_eq!(Cents::from_parts(69, 97).to_string(), "69.97");
        assert_eq!(Cents::new(5).to_string(), "0.05");
        assert_eq!(Cents::ZERO.to_string(), "0.00");
    }

    #[test]
    fn arithmetic_is_exact() {
        let total = Cents::new(999)
            .checked_add(Cents::new(999))
            .and_then(|t| t.checked_add(Cents::new(4999)));
        assert_eq!(total, Some(Cents::from_parts(69, 97)));
        assert_eq!(Cents::new(999).checked_mul(3), Some(Cents::new(2997)));
    }

    #[test]
    fn overflow_is_reported() {
        assert_eq!(Cents::new(u64::MAX).checked_add(Cents::new(1)), None);
        assert_eq!(Cents::new(u64::MAX / 2 + 1).checked_mul(2), None);
    }
}
