//! Entities: rows with a stable serial or uuid identity.

use std::collections::HashMap;

pub trait Entity {
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;
}

/// Key a batch of rows by id. On duplicate ids the last row wins.
pub fn index_by_id<E: Entity>(rows: impl IntoIterator<Item = E>) -> HashMap<E::Id, E> {
    rows.into_iter().map(|row| (*row.id(), row)).collect()
}
