//! Enumeration types used throughout the encounter.

use serde::{Deserialize, Serialize};

use crate::types::{EntityId, TemplateId};

/// Lifecycle phase of one actor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorPhase {
    /// Out of combat, running passive behavior (if any).
    #[default]
    Idle,
    /// Fighting.
    Engaged,
    /// Terminal. The controller no longer reacts to ticks.
    Dead,
}

/// Role an actor plays within its encounter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorRole {
    /// The boss.
    Primary,
    /// A summoned minion.
    Helper,
}

/// Raid size policy read at spawn and ability selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupSize {
    #[default]
    Small,
    Large,
}

impl GroupSize {
    pub fn is_large(self) -> bool {
        matches!(self, GroupSize::Large)
    }
}

/// What kind of unit an entity handle resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitKind {
    Player,
    Creature { template: TemplateId },
}

impl UnitKind {
    pub fn is_player(self) -> bool {
        matches!(self, UnitKind::Player)
    }

    pub fn is_creature_of(self, template: TemplateId) -> bool {
        matches!(self, UnitKind::Creature { template: t } if t == template)
    }
}

/// Progress of the whole encounter, as recorded in the shared context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EncounterStatus {
    #[default]
    NotStarted,
    InProgress,
    Done,
}

/// Who an ability is aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CastTarget {
    /// Centered on the caster, no explicit target.
    Caster,
    Unit(EntityId),
}
