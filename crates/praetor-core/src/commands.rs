//! Stimuli delivered by the host to one actor's controller.
//!
//! The host queues stimuli and drains them at the tick boundary, so a
//! controller reacting to one stimulus may safely cause others.

use serde::{Deserialize, Serialize};

use crate::types::{AbilityId, EntityId};

/// All external events an actor controller reacts to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Stimulus {
    /// First hostile contact, or a forced pull by another actor.
    EnterCombat { attacker: Option<EntityId> },
    /// Damage landed on the actor. `source` is `None` for environmental damage.
    DamageTaken {
        source: Option<EntityId>,
        amount: u32,
    },
    /// The actor dealt the killing blow to `victim`.
    UnitKilled { victim: EntityId },
    /// Health reached zero.
    Death { killer: Option<EntityId> },
    /// An ability effect landed on the actor.
    EffectApplied {
        effect: AbilityId,
        source: Option<EntityId>,
    },
    /// One of the actor's summons died or was despawned.
    SummonRemoved { summon: EntityId },
    /// Instance reset (wipe recovery, or initial spawn).
    Reset,
}
