//! Entity trait: identity that survives relabelling.

/// Anything addressed by a stable identifier (catalog items, inventory entries).
pub trait Entity {
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;
}
