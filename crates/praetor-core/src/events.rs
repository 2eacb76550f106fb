//! Events emitted for presentation (speech, animation, visible casts).

use serde::{Deserialize, Serialize};

use crate::enums::CastTarget;
use crate::types::{AbilityId, EmoteId, EntityId, LineId};

/// Fire-and-forget output of the decision layer, recorded by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PresentationEvent {
    /// A scripted line spoken by `speaker`, optionally directed at `target`.
    Announcement {
        speaker: EntityId,
        line: LineId,
        target: Option<EntityId>,
    },
    /// A one-shot animation.
    Emote { actor: EntityId, emote: EmoteId },
    /// A persistent stance.
    EmoteState { actor: EntityId, emote: EmoteId },
    /// The actor turned toward another unit.
    Facing { actor: EntityId, toward: EntityId },
    /// An ability cast began (or resolved, when instant).
    AbilityCast {
        caster: EntityId,
        ability: AbilityId,
        target: CastTarget,
        instant: bool,
    },
}

impl PresentationEvent {
    /// The unit that produced this event.
    pub fn source(&self) -> EntityId {
        match self {
            PresentationEvent::Announcement { speaker, .. } => *speaker,
            PresentationEvent::Emote { actor, .. }
            | PresentationEvent::EmoteState { actor, .. }
            | PresentationEvent::Facing { actor, .. } => *actor,
            PresentationEvent::AbilityCast { caster, .. } => *caster,
        }
    }
}
