//! Errors surfaced by the simulation engine's public API.

use thiserror::Error;

use praetor_core::enums::EncounterStatus;
use praetor_core::types::EntityId;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// No controller drives this entity.
    #[error("no encounter actor with id {0}")]
    UnknownActor(EntityId),

    /// The entity does not exist in the world (or was despawned).
    #[error("no unit with id {0}")]
    UnknownUnit(EntityId),

    /// The operation is only valid before the encounter is pulled.
    #[error("encounter already started (status {0:?})")]
    AlreadyStarted(EncounterStatus),
}
