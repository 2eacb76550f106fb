//! Encounter snapshot, the complete observable state after each tick.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::events::PresentationEvent;
use crate::types::{EntityId, SimTime};

/// Everything an observer (test, replay, UI) can see after one tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EncounterSnapshot {
    pub time: SimTime,
    pub group_size: GroupSize,
    pub status: EncounterStatus,
    /// Current value of the invalid-kill instance flag.
    pub invalid_kill_flag: u32,
    /// Player damage still required before the primary's kill counts.
    pub player_damage_requirement: u32,
    /// Helpers currently owned by the primary, in spawn order.
    pub roster: Vec<EntityId>,
    pub actors: Vec<ActorView>,
    /// Presentation output produced during this tick.
    pub events: Vec<PresentationEvent>,
}

impl EncounterSnapshot {
    pub fn actor(&self, id: EntityId) -> Option<&ActorView> {
        self.actors.iter().find(|a| a.id == id)
    }

    pub fn primary(&self) -> Option<&ActorView> {
        self.actors.iter().find(|a| a.role == ActorRole::Primary)
    }
}

/// One controller-driven actor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorView {
    pub id: EntityId,
    pub role: ActorRole,
    pub phase: ActorPhase,
    pub casting: bool,
    /// Actions waiting in the actor's cooldown scheduler.
    pub pending_actions: usize,
    pub health: u32,
}
