//! Identity for the domain's long-lived objects.

/// Something with a stable identity: a product, warehouse, order or return.
/// Field values change over an entity's life; its id never does.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
