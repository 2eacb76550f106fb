//! Entity spawn factories and handle conversion.
//!
//! Every unit carries `Unit`, `Health`, `CombatState` and a `Placement`.
//! Creatures additionally remember their spawn point and track the player
//! damage they still need to take.

use hecs::{Entity, World};

use praetor_core::components::*;
use praetor_core::constants::*;
use praetor_core::enums::UnitKind;
use praetor_core::types::{EntityId, Placement, TemplateId};

/// Stable handle for a hecs entity.
pub fn to_id(entity: Entity) -> EntityId {
    EntityId(entity.to_bits().get())
}

/// Entity behind a handle, if the bits are a valid entity encoding.
pub fn to_entity(id: EntityId) -> Option<Entity> {
    Entity::from_bits(id.0)
}

fn max_health(template: TemplateId) -> u32 {
    match template {
        PRIMARY_TEMPLATE => PRIMARY_MAX_HEALTH,
        HELPER_TEMPLATE => HELPER_MAX_HEALTH,
        _ => PLAYER_MAX_HEALTH,
    }
}

/// Spawn a creature of `template`. Summoned creatures remember their summoner.
pub fn spawn_creature(
    world: &mut World,
    template: TemplateId,
    placement: Placement,
    summoner: Option<EntityId>,
) -> EntityId {
    let entity = world.spawn((
        Unit {
            kind: UnitKind::Creature { template },
        },
        Health::full(max_health(template)),
        CombatState::default(),
        placement,
        Home(placement),
        DamageRequirement {
            remaining: PLAYER_DAMAGE_REQUIREMENT,
        },
    ));
    if let Some(by) = summoner {
        // The entity was spawned on the line above.
        let _ = world.insert_one(entity, Summoned { by });
    }
    to_id(entity)
}

/// Spawn a player at `placement`.
pub fn spawn_player(world: &mut World, placement: Placement) -> EntityId {
    let entity = world.spawn((
        Unit {
            kind: UnitKind::Player,
        },
        Health::full(PLAYER_MAX_HEALTH),
        CombatState::default(),
        placement,
    ));
    to_id(entity)
}

/// Spawn one practice dummy beside each helper spawn point, facing it.
pub fn spawn_practice_dummies(world: &mut World) -> Vec<EntityId> {
    HELPER_PLACEMENTS_BASE
        .iter()
        .chain(HELPER_PLACEMENTS_LARGE.iter())
        .map(|helper| {
            let offset = glam::Vec3::new(helper.facing.cos(), helper.facing.sin(), 0.0)
                * PRACTICE_DUMMY_OFFSET;
            let mut dummy = Placement {
                position: helper.position + offset,
                facing: 0.0,
            };
            dummy.facing = dummy.facing_toward(helper);
            spawn_creature(world, PRACTICE_DUMMY_TEMPLATE, dummy, None)
        })
        .collect()
}
