//! Helpers summoned by the primary actor.

use praetor_core::types::EntityId;

/// Ordered list of summoned helper handles. Only the primary controller
/// mutates it.
#[derive(Debug, Clone, Default)]
pub struct SummonRoster {
    members: Vec<EntityId>,
}

impl SummonRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn summon(&mut self, id: EntityId) {
        self.members.push(id);
    }

    /// Drop one member after it died or despawned. Returns whether it was present.
    pub fn remove(&mut self, id: EntityId) -> bool {
        let before = self.members.len();
        self.members.retain(|&m| m != id);
        before != self.members.len()
    }

    /// Empty the roster, yielding every member in spawn order.
    pub fn drain(&mut self) -> impl Iterator<Item = EntityId> + '_ {
        self.members.drain(..)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.members.contains(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.members.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
