//! Contracts of the external collaborators the controllers call into.
//!
//! The decision layer never resolves combat, moves units or renders
//! anything itself. A host implements these traits over its own world.
//! Every call names the acting unit explicitly since one host serves many
//! controllers.

use rand::RngCore;

use praetor_core::enums::{CastTarget, UnitKind};
use praetor_core::types::{AbilityId, EmoteId, EntityId, LineId, Placement, TemplateId};

/// What the directory knows about a resolved handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitInfo {
    pub kind: UnitKind,
    pub alive: bool,
}

/// Targeting and combat resolution.
pub trait CombatService {
    fn current_target(&self, actor: EntityId) -> Option<EntityId>;

    /// Begin (or, when `instant`, resolve) an ability.
    fn cast_ability(
        &mut self,
        caster: EntityId,
        ability: AbilityId,
        target: CastTarget,
        instant: bool,
    );

    /// Swing at the current target. No-op while casting, out of reach, or
    /// on swing cooldown.
    fn melee_attack_if_ready(&mut self, actor: EntityId);

    fn is_casting_or_busy(&self, actor: EntityId) -> bool;

    /// Under an external controlled/charmed effect.
    fn is_controlled(&self, actor: EntityId) -> bool;

    /// A random living hostile within `radius` of `actor`, if any.
    fn find_random_target_in_radius(&mut self, actor: EntityId, radius: f32) -> Option<EntityId>;

    /// Pull `actor` into combat against the zone, attacking `attacker` first.
    /// The host delivers the resulting enter-combat stimulus to `actor`.
    fn force_engage(&mut self, actor: EntityId, attacker: Option<EntityId>);

    /// Lower the player-damage threshold that kill accounting applies to
    /// `actor`.
    fn lower_player_damage_requirement(&mut self, actor: EntityId, amount: u32);

    /// Drop `actor` out of combat and restore it: full health, the full
    /// player-damage requirement, and its spawn placement. No-op on the dead.
    fn evade(&mut self, actor: EntityId);
}

/// Spawning and lookup.
pub trait EntityDirectory {
    fn spawn_entity(
        &mut self,
        template: TemplateId,
        placement: Placement,
        summoner: Option<EntityId>,
    ) -> EntityId;

    fn despawn_entity(&mut self, id: EntityId);

    /// Remove the corpses of everything `summoner` summoned.
    fn despawn_corpses(&mut self, summoner: EntityId);

    fn find_nearest_entity(
        &self,
        origin: EntityId,
        template: TemplateId,
        radius: f32,
    ) -> Option<EntityId>;

    fn resolve_entity(&self, id: EntityId) -> Option<UnitInfo>;
}

/// Speech and animation. Fire-and-forget.
pub trait Presentation {
    fn announce(&mut self, speaker: EntityId, line: LineId, target: Option<EntityId>);

    fn play_emote(&mut self, actor: EntityId, emote: EmoteId);

    fn set_emote_state(&mut self, actor: EntityId, emote: EmoteId);

    fn face_toward(&mut self, actor: EntityId, other: EntityId);
}

/// Raid-size detection.
pub trait GroupSizePolicy {
    fn is_large_group_mode(&self) -> bool;
}

/// Everything a controller needs from its host, plus the injected random
/// source.
pub trait EncounterHost: CombatService + EntityDirectory + Presentation + GroupSizePolicy {
    type Rng: RngCore;

    fn rng(&mut self) -> &mut Self::Rng;

    /// Resolve `id` and test it against `pred`; unresolvable handles fail.
    fn unit_matches(&self, id: EntityId, pred: impl FnOnce(UnitInfo) -> bool) -> bool {
        self.resolve_entity(id).is_some_and(pred)
    }
}
