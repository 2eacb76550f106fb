//! Simulation engine: the host loop around the encounter controllers.
//!
//! `SimulationEngine` owns the hecs world (through [`SimHost`]), one
//! controller per encounter actor, and the shared encounter context. It
//! delivers queued stimuli, runs the host systems and every controller at a
//! fixed tick rate, and produces `EncounterSnapshot`s. Completely headless,
//! enabling deterministic testing.

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace};

use praetor_ai::context::{EncounterContext, SharedContext};
use praetor_ai::controller::{ActorController, EncounterActor};
use praetor_ai::helper::HelperActorController;
use praetor_ai::primary::PrimaryActorController;
use praetor_ai::profiles::EncounterProfile;
use praetor_ai::services::EntityDirectory;
use praetor_core::commands::Stimulus;
use praetor_core::components::CombatState;
use praetor_core::constants::*;
use praetor_core::enums::{EncounterStatus, GroupSize};
use praetor_core::state::EncounterSnapshot;
use praetor_core::types::{EntityId, Placement, SimTime};

use crate::error::SimError;
use crate::host::SimHost;
use crate::systems;
use crate::world_setup::{self, to_entity};

/// Configuration for starting a new encounter.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same encounter.
    pub seed: u64,
    /// Raid size the encounter is instanced for.
    pub group_size: GroupSize,
    /// Tunable parameters for both roles.
    pub profile: EncounterProfile,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            group_size: GroupSize::default(),
            profile: EncounterProfile::default(),
        }
    }
}

/// The simulation engine. Owns the world, the controllers and the context.
pub struct SimulationEngine {
    host: SimHost,
    context: SharedContext,
    /// Keyed by handle so iteration order is stable across runs.
    controllers: BTreeMap<EntityId, ActorController>,
    primary: EntityId,
    profile: EncounterProfile,
    time: SimTime,
}

impl SimulationEngine {
    /// Load the instance: dummies, the primary, and its initial reset.
    pub fn new(config: SimConfig) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        let mut host = SimHost::new(rng, config.group_size, config.profile.primary.death_effect);
        world_setup::spawn_practice_dummies(&mut host.world);

        let context = EncounterContext::new().shared();
        context.borrow_mut().set_flag(INVALID_KILL_FLAG, 1);

        let primary = world_setup::spawn_creature(
            &mut host.world,
            PRIMARY_TEMPLATE,
            PRIMARY_PLACEMENT,
            None,
        );
        let controller =
            PrimaryActorController::new(primary, &context, config.profile.primary.clone());

        let mut engine = Self {
            host,
            context,
            controllers: BTreeMap::new(),
            primary,
            profile: config.profile,
            time: SimTime::default(),
        };
        engine.controllers.insert(primary, controller.into());
        engine.host.push_stimulus(primary, Stimulus::Reset);
        engine.drain_stimuli();
        debug!(%primary, seed = config.seed, group_size = ?config.group_size, "encounter loaded");
        engine
    }

    /// Queue a stimulus for delivery at the next tick boundary.
    pub fn queue_stimulus(
        &mut self,
        target: EntityId,
        stimulus: Stimulus,
    ) -> Result<(), SimError> {
        if !self.controllers.contains_key(&target) {
            return Err(SimError::UnknownActor(target));
        }
        self.host.push_stimulus(target, stimulus);
        Ok(())
    }

    /// Add a player at `placement`.
    pub fn add_player(&mut self, placement: Placement) -> EntityId {
        let id = world_setup::spawn_player(&mut self.host.world, placement);
        debug!(%id, "player joined");
        id
    }

    /// `attacker` starts fighting `target`. An idle encounter actor enters
    /// combat at the next tick boundary.
    pub fn attack(&mut self, attacker: EntityId, target: EntityId) -> Result<(), SimError> {
        for id in [attacker, target] {
            if !self.host.is_alive(id) {
                return Err(SimError::UnknownUnit(id));
            }
        }
        self.set_target(attacker, Some(target))?;
        self.host.acquire_target(target, attacker);
        if self.controllers.contains_key(&target) {
            self.host.push_stimulus(
                target,
                Stimulus::EnterCombat {
                    attacker: Some(attacker),
                },
            );
        }
        Ok(())
    }

    /// Point `unit` at `target`, or clear its target with `None`.
    pub fn set_target(&mut self, unit: EntityId, target: Option<EntityId>) -> Result<(), SimError> {
        let entity = to_entity(unit).ok_or(SimError::UnknownUnit(unit))?;
        let mut combat = self
            .host
            .world
            .get::<&mut CombatState>(entity)
            .map_err(|_| SimError::UnknownUnit(unit))?;
        combat.target = target;
        Ok(())
    }

    /// Deal `amount` of damage from `source` at the next tick boundary.
    pub fn deal_damage(
        &mut self,
        source: Option<EntityId>,
        target: EntityId,
        amount: u32,
    ) -> Result<(), SimError> {
        if self.host.resolve_entity(target).is_none() {
            return Err(SimError::UnknownUnit(target));
        }
        self.host
            .push_stimulus(target, Stimulus::DamageTaken { source, amount });
        Ok(())
    }

    /// Start or stop an external control effect on `unit`.
    pub fn set_controlled(&mut self, unit: EntityId, controlled: bool) -> Result<(), SimError> {
        let entity = to_entity(unit).ok_or(SimError::UnknownUnit(unit))?;
        let mut combat = self
            .host
            .world
            .get::<&mut CombatState>(entity)
            .map_err(|_| SimError::UnknownUnit(unit))?;
        combat.controlled = controlled;
        Ok(())
    }

    /// Switch the raid size. Only before the pull; the roster is rebuilt at
    /// the next tick boundary.
    pub fn set_group_size(&mut self, group_size: GroupSize) -> Result<(), SimError> {
        let status = self.status();
        if status != EncounterStatus::NotStarted {
            return Err(SimError::AlreadyStarted(status));
        }
        self.host.group_size = group_size;
        self.host.push_stimulus(self.primary, Stimulus::Reset);
        Ok(())
    }

    /// Advance the encounter by one tick and return the resulting snapshot.
    pub fn tick(&mut self) -> EncounterSnapshot {
        self.drain_stimuli();

        systems::combat::run(&mut self.host.world, DT);
        systems::combat::retarget(&mut self.host.world);
        systems::movement::run(&mut self.host.world, DT);
        systems::combat::player_attacks(&mut self.host);
        self.drain_stimuli();

        let ids: Vec<EntityId> = self.controllers.keys().copied().collect();
        for id in ids {
            if let Some(controller) = self.controllers.get_mut(&id) {
                controller.on_tick(&mut self.host, DT);
            }
            self.drain_stimuli();
        }

        self.time.advance();
        let events = std::mem::take(&mut self.host.events);
        systems::snapshot::build_snapshot(
            &self.host,
            self.time,
            &self.context.borrow(),
            self.primary,
            &self.controllers,
            events,
        )
    }

    pub fn primary(&self) -> EntityId {
        self.primary
    }

    /// Helpers currently summoned by the primary, in spawn order.
    pub fn helpers(&self) -> Vec<EntityId> {
        self.controllers
            .get(&self.primary)
            .and_then(ActorController::as_primary)
            .map(|primary| primary.roster().iter().collect())
            .unwrap_or_default()
    }

    /// Whether `unit` exists and has health left.
    pub fn is_alive(&self, unit: EntityId) -> bool {
        self.host.is_alive(unit)
    }

    pub fn controller(&self, id: EntityId) -> Option<&ActorController> {
        self.controllers.get(&id)
    }

    pub fn status(&self) -> EncounterStatus {
        self.context.borrow().status()
    }

    pub fn context(&self) -> &SharedContext {
        &self.context
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &hecs::World {
        self.host.world()
    }

    /// Deliver every queued stimulus, including those caused by delivery.
    fn drain_stimuli(&mut self) {
        loop {
            self.sync_controllers();
            let Some((target, stimulus)) = self.host.stimuli.pop_front() else {
                break;
            };
            self.dispatch(target, stimulus);
        }
        self.sync_controllers();
    }

    fn dispatch(&mut self, target: EntityId, stimulus: Stimulus) {
        let Some(controller) = self.controllers.get_mut(&target) else {
            // Players and dummies have no controller; damage still lands.
            if let Stimulus::DamageTaken { source, amount } = stimulus {
                self.host.apply_damage(source, target, amount);
            } else {
                trace!(%target, ?stimulus, "no controller; dropped");
            }
            return;
        };
        let adjusted = controller.handle(&mut self.host, &stimulus);
        if let (Stimulus::DamageTaken { source, .. }, Some(amount)) = (stimulus, adjusted) {
            self.host.apply_damage(source, target, amount);
        }
    }

    /// Attach controllers to freshly summoned helpers and drop those of
    /// despawned ones.
    fn sync_controllers(&mut self) {
        for id in std::mem::take(&mut self.host.despawned) {
            if self.controllers.remove(&id).is_some() {
                debug!(%id, "controller detached");
            }
        }
        for id in std::mem::take(&mut self.host.spawned) {
            let is_helper = self
                .host
                .resolve_entity(id)
                .is_some_and(|unit| unit.kind.is_creature_of(HELPER_TEMPLATE));
            if !is_helper {
                continue;
            }
            let mut helper =
                HelperActorController::new(id, &self.context, self.profile.helper.clone());
            helper.on_reset(&mut self.host);
            self.controllers.insert(id, helper.into());
        }
    }
}
