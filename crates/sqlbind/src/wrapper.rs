//! Change tracking for entities

use crate::entity::{self, Entity};
use crate::value::Value;

/// Wraps an entity and remembers its scalar field values at wrap time,
/// so an update can carry only what actually changed.
#[derive(Debug, Clone)]
pub struct Tracked<T: Entity> {
    entity: T,
    original: Vec<(String, Value)>,
}

impl<T: Entity> Tracked<T> {
    pub fn new(entity: T) -> Self {
        let original = entity::scalar_values(&entity);
        Self { entity, original }
    }

    pub fn get(&self) -> &T {
        &self.entity
    }

    pub fn get_mut(&mut self) -> &mut T {
        &mut self.entity
    }

    /// Apply an edit through a closure, chainable
    pub fn edit(&mut self, f: impl FnOnce(&mut T)) -> &mut Self {
        f(&mut self.entity);
        self
    }

    /// Fields whose current value differs from the snapshot, in
    /// declaration order. Feeds a map-record update directly.
    pub fn updated_fields(&self) -> Vec<(String, Value)> {
        entity::scalar_values(&self.entity)
            .into_iter()
            .zip(self.original.iter())
            .filter(|(current, original)| current.1 != original.1)
            .map(|(current, _)| current)
            .collect()
    }

    /// Forget the snapshot and take the entity back
    pub fn into_inner(self) -> T {
        self.entity
    }

    /// Re-snapshot the current state, clearing the pending change set
    pub fn reset(&mut self) {
        self.original = entity::scalar_values(&self.entity);
    }
}
