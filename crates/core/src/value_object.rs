//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values. To
/// "modify" one, build a new one. Request filters and price summaries in the
/// catalog are modelled this way: parsed once, never mutated in place.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
