//! Combat timers and player auto-attacks.

use std::time::Duration;

use hecs::World;

use praetor_ai::services::CombatService;
use praetor_core::components::{CombatState, Health, Unit};
use praetor_core::types::{EntityId, Placement};

use crate::host::SimHost;
use crate::world_setup::{to_entity, to_id};

/// Count cast and swing timers down by `dt`. Dead units drop whatever they were doing.
pub fn run(world: &mut World, dt: Duration) {
    for (_entity, (combat, health)) in world.query_mut::<(&mut CombatState, &Health)>() {
        if health.is_dead() {
            combat.cast_remaining = Duration::ZERO;
            continue;
        }
        combat.cast_remaining = combat.cast_remaining.saturating_sub(dt);
        combat.swing_cooldown = combat.swing_cooldown.saturating_sub(dt);
    }
}

/// Creatures whose target died turn on the nearest living unit still
/// attacking them. With nobody left they keep the dead target, which the
/// controllers read as "no target" and evade.
pub fn retarget(world: &mut World) {
    struct Fighter {
        id: EntityId,
        alive: bool,
        creature: bool,
        target: Option<EntityId>,
        placement: Placement,
    }

    let fighters: Vec<Fighter> = world
        .query::<(&Unit, &Health, &CombatState, &Placement)>()
        .iter()
        .map(|(entity, (unit, health, combat, placement))| Fighter {
            id: to_id(entity),
            alive: !health.is_dead(),
            creature: !unit.kind.is_player(),
            target: combat.target,
            placement: *placement,
        })
        .collect();
    let is_alive = |id: EntityId| fighters.iter().any(|f| f.id == id && f.alive);

    let mut updates: Vec<(EntityId, EntityId)> = Vec::new();
    for fighter in fighters.iter().filter(|f| f.alive && f.creature) {
        let Some(target) = fighter.target else {
            continue;
        };
        if is_alive(target) {
            continue;
        }
        let replacement = fighters
            .iter()
            .filter(|other| other.alive && other.target == Some(fighter.id))
            .min_by(|a, b| {
                let da = fighter.placement.distance_to(&a.placement);
                let db = fighter.placement.distance_to(&b.placement);
                da.total_cmp(&db).then(a.id.cmp(&b.id))
            });
        if let Some(other) = replacement {
            updates.push((fighter.id, other.id));
        }
    }

    for (id, target) in updates {
        let Some(entity) = to_entity(id) else {
            continue;
        };
        if let Ok(mut combat) = world.get::<&mut CombatState>(entity) {
            combat.target = Some(target);
        }
    }
}

/// Living players swing at whatever they target.
pub fn player_attacks(host: &mut SimHost) {
    let players: Vec<EntityId> = host
        .world
        .query::<(&Unit, &Health, &CombatState)>()
        .iter()
        .filter(|(_, (unit, health, combat))| {
            unit.kind.is_player() && !health.is_dead() && combat.target.is_some()
        })
        .map(|(entity, _)| to_id(entity))
        .collect();

    for player in players {
        host.melee_attack_if_ready(player);
    }
}
