//! Closing movement: units with a living target run toward it until in reach.

use std::time::Duration;

use hecs::World;

use praetor_core::components::{CombatState, Health};
use praetor_core::constants::{MELEE_RANGE, MOVE_SPEED};
use praetor_core::types::{EntityId, Placement};

use crate::world_setup::to_entity;

/// Move every living, non-casting unit toward its target.
pub fn run(world: &mut World, dt: Duration) {
    // Resolve destinations first; a target's placement may be moved later in
    // the same pass.
    let mut moves: Vec<(hecs::Entity, EntityId)> = Vec::new();
    {
        let mut query = world.query::<(&CombatState, &Health)>();
        for (entity, (combat, health)) in query.iter() {
            if health.is_dead() || combat.is_casting() || combat.controlled {
                continue;
            }
            if let Some(target) = combat.target {
                moves.push((entity, target));
            }
        }
    }

    let step = MOVE_SPEED * dt.as_secs_f32();
    for (entity, target) in moves {
        let Some(goal) = to_entity(target).and_then(|t| world.get::<&Placement>(t).ok().map(|p| *p))
        else {
            continue;
        };
        let target_alive = to_entity(target)
            .and_then(|t| world.get::<&Health>(t).ok().map(|h| !h.is_dead()))
            .unwrap_or(false);
        if !target_alive {
            continue;
        }
        if let Ok(mut placement) = world.get::<&mut Placement>(entity) {
            let delta = goal.position - placement.position;
            // Stop a little short of reach so small drifts keep us in range.
            let remaining = delta.length() - MELEE_RANGE * 0.8;
            if remaining <= 0.0 {
                continue;
            }
            placement.position += delta.normalize_or_zero() * remaining.min(step);
            placement.facing = placement.facing_toward(&goal);
        }
    }
}
