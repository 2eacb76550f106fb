//! ECS components for hecs entities.
//!
//! Components are plain data structs with no behavior beyond trivial
//! accessors. Game logic lives in the host systems and the controllers.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::enums::UnitKind;
use crate::types::{EntityId, Placement};

/// What the entity is (player, or a creature of some template).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Unit {
    pub kind: UnitKind,
}

/// Hit points.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Health {
    pub current: u32,
    pub max: u32,
}

impl Health {
    pub fn full(max: u32) -> Self {
        Self { current: max, max }
    }

    pub fn is_dead(&self) -> bool {
        self.current == 0
    }
}

/// Combat bookkeeping owned by the combat service, not by the controllers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CombatState {
    /// Unit currently being fought.
    pub target: Option<EntityId>,
    /// Remaining cast time of the ability in flight (zero when free).
    pub cast_remaining: Duration,
    /// Time until the next basic melee swing is allowed.
    pub swing_cooldown: Duration,
    /// Under an external controlled/charmed effect.
    pub controlled: bool,
}

impl CombatState {
    pub fn is_casting(&self) -> bool {
        !self.cast_remaining.is_zero()
    }
}

/// Player damage a creature still has to take for its kill to grant credit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DamageRequirement {
    pub remaining: u32,
}

/// Marks a creature whose corpse is inert and lootable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Inert;

/// Links a summoned creature back to the unit that summoned it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Summoned {
    pub by: EntityId,
}

/// Where a creature was spawned. Evading puts it back here.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Home(pub Placement);
