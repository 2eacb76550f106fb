//! Snapshot system: reads the world and the controllers into an
//! `EncounterSnapshot`.
//!
//! Read-only: never modifies the world.

use std::collections::BTreeMap;

use praetor_ai::context::EncounterContext;
use praetor_ai::controller::{ActorController, EncounterActor};
use praetor_core::constants::INVALID_KILL_FLAG;
use praetor_core::events::PresentationEvent;
use praetor_core::state::{ActorView, EncounterSnapshot};
use praetor_core::types::{EntityId, SimTime};

use crate::host::SimHost;

/// Build the snapshot for the tick that just finished.
pub fn build_snapshot(
    host: &SimHost,
    time: SimTime,
    context: &EncounterContext,
    primary: EntityId,
    controllers: &BTreeMap<EntityId, ActorController>,
    events: Vec<PresentationEvent>,
) -> EncounterSnapshot {
    let roster: Vec<EntityId> = controllers
        .get(&primary)
        .and_then(ActorController::as_primary)
        .map(|p| p.roster().iter().collect())
        .unwrap_or_default();

    EncounterSnapshot {
        time,
        group_size: host.group_size,
        status: context.status(),
        invalid_kill_flag: context.flag(INVALID_KILL_FLAG),
        player_damage_requirement: host.damage_requirement(primary),
        roster,
        actors: build_actors(host, controllers),
        events,
    }
}

fn build_actors(
    host: &SimHost,
    controllers: &BTreeMap<EntityId, ActorController>,
) -> Vec<ActorView> {
    controllers
        .iter()
        .map(|(&id, controller)| {
            let state = controller.state();
            ActorView {
                id,
                role: controller.role(),
                phase: state.phase(),
                casting: state.is_casting(),
                pending_actions: controller.pending_actions(),
                health: host.health(id),
            }
        })
        .collect()
}
