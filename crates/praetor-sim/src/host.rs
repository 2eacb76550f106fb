//! The host side of the encounter: a hecs world behind the service traits.
//!
//! Controllers never see the world. Everything they ask for is answered
//! here, and everything they cause is either applied to components directly
//! or queued as a stimulus for the engine to deliver at the next drain.

use std::collections::VecDeque;

use hecs::World;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use praetor_ai::services::*;
use praetor_core::commands::Stimulus;
use praetor_core::components::*;
use praetor_core::constants::*;
use praetor_core::enums::{CastTarget, GroupSize};
use praetor_core::events::PresentationEvent;
use praetor_core::types::{AbilityId, EmoteId, EntityId, LineId, Placement, TemplateId};

use crate::world_setup::{self, to_entity, to_id};

/// World, randomness and output buffers shared by every controller.
pub struct SimHost {
    pub(crate) world: World,
    pub(crate) rng: ChaCha8Rng,
    pub(crate) group_size: GroupSize,
    /// Self-effect that leaves a corpse inert.
    pub(crate) death_effect: AbilityId,
    /// Stimuli waiting for delivery, in causal order.
    pub(crate) stimuli: VecDeque<(EntityId, Stimulus)>,
    /// Presentation output of the current tick.
    pub(crate) events: Vec<PresentationEvent>,
    /// Creatures spawned since the engine last synced its controllers.
    pub(crate) spawned: Vec<EntityId>,
    /// Creatures despawned since the engine last synced its controllers.
    pub(crate) despawned: Vec<EntityId>,
}

impl SimHost {
    pub fn new(rng: ChaCha8Rng, group_size: GroupSize, death_effect: AbilityId) -> Self {
        Self {
            world: World::new(),
            rng,
            group_size,
            death_effect,
            stimuli: VecDeque::new(),
            events: Vec::new(),
            spawned: Vec::new(),
            despawned: Vec::new(),
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub(crate) fn push_stimulus(&mut self, target: EntityId, stimulus: Stimulus) {
        self.stimuli.push_back((target, stimulus));
    }

    pub(crate) fn placement(&self, id: EntityId) -> Option<Placement> {
        let entity = to_entity(id)?;
        self.world.get::<&Placement>(entity).ok().map(|p| *p)
    }

    pub(crate) fn is_alive(&self, id: EntityId) -> bool {
        to_entity(id)
            .and_then(|entity| self.world.get::<&Health>(entity).ok().map(|h| !h.is_dead()))
            .unwrap_or(false)
    }

    pub(crate) fn health(&self, id: EntityId) -> u32 {
        to_entity(id)
            .and_then(|entity| self.world.get::<&Health>(entity).ok().map(|h| h.current))
            .unwrap_or(0)
    }

    pub(crate) fn damage_requirement(&self, id: EntityId) -> u32 {
        to_entity(id)
            .and_then(|entity| {
                self.world
                    .get::<&DamageRequirement>(entity)
                    .ok()
                    .map(|r| r.remaining)
            })
            .unwrap_or(0)
    }

    /// Point `actor` at `target` unless it already fights something alive.
    pub(crate) fn acquire_target(&mut self, actor: EntityId, target: EntityId) {
        let current = self.current_target(actor);
        let Some(entity) = to_entity(actor) else {
            return;
        };
        if let Ok(mut combat) = self.world.get::<&mut CombatState>(entity) {
            if current.is_none() && actor != target {
                combat.target = Some(target);
            }
        }
    }

    /// Land `amount` on `target` after any controller adjustment, queueing
    /// the death fallout when it drops to zero. Player damage counts toward
    /// the target's kill credit.
    pub(crate) fn apply_damage(&mut self, source: Option<EntityId>, target: EntityId, amount: u32) {
        let Some(entity) = to_entity(target) else {
            return;
        };
        let landed = match self.world.get::<&mut Health>(entity) {
            Ok(mut health) if !health.is_dead() => {
                health.current = health.current.saturating_sub(amount);
                Some(health.is_dead())
            }
            _ => None,
        };
        let Some(died) = landed else {
            return;
        };
        if source.is_some_and(|s| self.unit_matches(s, |unit| unit.kind.is_player())) {
            self.lower_player_damage_requirement(target, amount);
        }
        if !died {
            return;
        }

        debug!(unit = %target, killer = ?source, "unit died");
        if let Ok(mut combat) = self.world.get::<&mut CombatState>(entity) {
            *combat = CombatState::default();
        }
        self.push_stimulus(target, Stimulus::Death { killer: source });
        if let Some(killer) = source {
            self.push_stimulus(killer, Stimulus::UnitKilled { victim: target });
        }
        let summoner = self.world.get::<&Summoned>(entity).ok().map(|s| s.by);
        if let Some(by) = summoner {
            self.push_stimulus(by, Stimulus::SummonRemoved { summon: target });
        }
    }
}

impl CombatService for SimHost {
    fn current_target(&self, actor: EntityId) -> Option<EntityId> {
        let entity = to_entity(actor)?;
        let target = self.world.get::<&CombatState>(entity).ok()?.target?;
        self.is_alive(target).then_some(target)
    }

    fn cast_ability(
        &mut self,
        caster: EntityId,
        ability: AbilityId,
        target: CastTarget,
        instant: bool,
    ) {
        let Some(entity) = to_entity(caster) else {
            return;
        };
        if !instant {
            if let Ok(mut combat) = self.world.get::<&mut CombatState>(entity) {
                combat.cast_remaining = ABILITY_CAST_TIME;
            }
        }
        if ability == self.death_effect && target == CastTarget::Caster {
            let _ = self.world.insert_one(entity, Inert);
        }
        debug!(%caster, ability = ability.0, ?target, instant, "ability cast");
        self.events.push(PresentationEvent::AbilityCast {
            caster,
            ability,
            target,
            instant,
        });
    }

    fn melee_attack_if_ready(&mut self, actor: EntityId) {
        let Some(target) = self.current_target(actor) else {
            return;
        };
        if !self.is_alive(actor) {
            return;
        }
        let (Some(from), Some(to)) = (self.placement(actor), self.placement(target)) else {
            return;
        };
        if from.distance_to(&to) > MELEE_RANGE {
            return;
        }
        let Some(entity) = to_entity(actor) else {
            return;
        };
        let swung = match self.world.get::<&mut CombatState>(entity) {
            Ok(mut combat) if !combat.is_casting() && combat.swing_cooldown.is_zero() => {
                combat.swing_cooldown = MELEE_SWING_COOLDOWN;
                true
            }
            _ => false,
        };
        if swung {
            self.push_stimulus(
                target,
                Stimulus::DamageTaken {
                    source: Some(actor),
                    amount: MELEE_SWING_DAMAGE,
                },
            );
        }
    }

    fn is_casting_or_busy(&self, actor: EntityId) -> bool {
        to_entity(actor)
            .and_then(|entity| self.world.get::<&CombatState>(entity).ok().map(|c| c.is_casting()))
            .unwrap_or(false)
    }

    fn is_controlled(&self, actor: EntityId) -> bool {
        to_entity(actor)
            .and_then(|entity| self.world.get::<&CombatState>(entity).ok().map(|c| c.controlled))
            .unwrap_or(false)
    }

    fn find_random_target_in_radius(&mut self, actor: EntityId, radius: f32) -> Option<EntityId> {
        let origin = self.placement(actor)?;
        let mut candidates: Vec<EntityId> = self
            .world
            .query::<(&Unit, &Health, &Placement)>()
            .iter()
            .filter(|(_, (unit, health, placement))| {
                unit.kind.is_player()
                    && !health.is_dead()
                    && origin.distance_to(placement) <= radius
            })
            .map(|(entity, _)| to_id(entity))
            .collect();
        if candidates.is_empty() {
            return None;
        }
        candidates.sort();
        let index = self.rng.gen_range(0..candidates.len());
        Some(candidates[index])
    }

    fn force_engage(&mut self, actor: EntityId, attacker: Option<EntityId>) {
        if let Some(attacker) = attacker {
            self.acquire_target(actor, attacker);
        }
        self.push_stimulus(actor, Stimulus::EnterCombat { attacker });
    }

    fn lower_player_damage_requirement(&mut self, actor: EntityId, amount: u32) {
        let Some(entity) = to_entity(actor) else {
            return;
        };
        if let Ok(mut requirement) = self.world.get::<&mut DamageRequirement>(entity) {
            requirement.remaining = requirement.remaining.saturating_sub(amount);
        }
    }

    fn evade(&mut self, actor: EntityId) {
        let Some(entity) = to_entity(actor) else {
            return;
        };
        let Ok((health, combat, placement, home, requirement)) = self.world.query_one_mut::<(
            &mut Health,
            &mut CombatState,
            &mut Placement,
            &Home,
            Option<&mut DamageRequirement>,
        )>(entity) else {
            return;
        };
        if health.is_dead() {
            return;
        }
        *health = Health::full(health.max);
        *combat = CombatState {
            controlled: combat.controlled,
            ..CombatState::default()
        };
        *placement = home.0;
        if let Some(requirement) = requirement {
            requirement.remaining = PLAYER_DAMAGE_REQUIREMENT;
        }
        debug!(%actor, "evaded to spawn point");
    }
}

impl EntityDirectory for SimHost {
    fn spawn_entity(
        &mut self,
        template: TemplateId,
        placement: Placement,
        summoner: Option<EntityId>,
    ) -> EntityId {
        let id = world_setup::spawn_creature(&mut self.world, template, placement, summoner);
        debug!(%id, template = template.0, ?summoner, "spawned");
        self.spawned.push(id);
        id
    }

    fn despawn_entity(&mut self, id: EntityId) {
        let Some(entity) = to_entity(id) else {
            return;
        };
        if self.world.despawn(entity).is_ok() {
            debug!(%id, "despawned");
            self.despawned.push(id);
        }
    }

    fn despawn_corpses(&mut self, summoner: EntityId) {
        let corpses: Vec<EntityId> = self
            .world
            .query::<(&Summoned, &Health)>()
            .iter()
            .filter(|(_, (summoned, health))| summoned.by == summoner && health.is_dead())
            .map(|(entity, _)| to_id(entity))
            .collect();
        for corpse in corpses {
            self.despawn_entity(corpse);
        }
    }

    fn find_nearest_entity(
        &self,
        origin: EntityId,
        template: TemplateId,
        radius: f32,
    ) -> Option<EntityId> {
        let from = self.placement(origin)?;
        self.world
            .query::<(&Unit, &Placement)>()
            .iter()
            .filter(|(_, (unit, _))| unit.kind.is_creature_of(template))
            .map(|(entity, (_, placement))| (to_id(entity), from.distance_to(placement)))
            .filter(|&(id, distance)| id != origin && distance <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
            .map(|(id, _)| id)
    }

    fn resolve_entity(&self, id: EntityId) -> Option<UnitInfo> {
        let entity = to_entity(id)?;
        let unit = self.world.get::<&Unit>(entity).ok()?;
        let alive = self.world.get::<&Health>(entity).map_or(false, |h| !h.is_dead());
        Some(UnitInfo {
            kind: unit.kind,
            alive,
        })
    }
}

impl Presentation for SimHost {
    fn announce(&mut self, speaker: EntityId, line: LineId, target: Option<EntityId>) {
        info!(%speaker, line = line.0, ?target, "announcement");
        self.events.push(PresentationEvent::Announcement {
            speaker,
            line,
            target,
        });
    }

    fn play_emote(&mut self, actor: EntityId, emote: EmoteId) {
        self.events.push(PresentationEvent::Emote { actor, emote });
    }

    fn set_emote_state(&mut self, actor: EntityId, emote: EmoteId) {
        self.events.push(PresentationEvent::EmoteState { actor, emote });
    }

    fn face_toward(&mut self, actor: EntityId, other: EntityId) {
        let (Some(from), Some(to)) = (self.placement(actor), self.placement(other)) else {
            return;
        };
        if let Some(entity) = to_entity(actor) {
            if let Ok(mut placement) = self.world.get::<&mut Placement>(entity) {
                placement.facing = from.facing_toward(&to);
            }
        }
        self.events.push(PresentationEvent::Facing {
            actor,
            toward: other,
        });
    }
}

impl GroupSizePolicy for SimHost {
    fn is_large_group_mode(&self) -> bool {
        self.group_size.is_large()
    }
}

impl EncounterHost for SimHost {
    type Rng = ChaCha8Rng;

    fn rng(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }
}
