//! The understudy: minion-role state machine.
//!
//! Idle understudies face their practice dummy and swing at it on a
//! randomized period. Engaging one drops that loop and pulls the
//! instructor into the fight; from then on it only melees.

use std::time::Duration;

use tracing::debug;

use praetor_core::constants::{
    EMOTE_ONESHOT_ATTACK_1H, EMOTE_STATE_READY_1H, IDLE_RP_GROUP, PRACTICE_DUMMY_TEMPLATE,
};
use praetor_core::enums::ActorRole;
use praetor_core::types::EntityId;

use crate::actor::ActorState;
use crate::context::SharedContext;
use crate::controller::EncounterActor;
use crate::profiles::HelperProfile;
use crate::scheduler::CooldownScheduler;
use crate::services::EncounterHost;

/// Actions a helper schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HelperAction {
    /// Cosmetic swing at the practice dummy, idle only.
    PracticeSwing,
}

#[derive(Debug)]
pub struct HelperActorController {
    state: ActorState,
    scheduler: CooldownScheduler<HelperAction>,
    profile: HelperProfile,
}

impl HelperActorController {
    pub fn new(id: EntityId, context: &SharedContext, profile: HelperProfile) -> Self {
        Self {
            state: ActorState::new(id, ActorRole::Helper, context),
            scheduler: CooldownScheduler::new(),
            profile,
        }
    }

    pub fn scheduler(&self) -> &CooldownScheduler<HelperAction> {
        &self.scheduler
    }

    fn id(&self) -> EntityId {
        self.state.id()
    }

    fn schedule_practice<H: EncounterHost>(&mut self, host: &mut H) {
        let id = self.id();
        host.set_emote_state(id, EMOTE_STATE_READY_1H);
        let radius = self.profile.practice_dummy_radius;
        if let Some(dummy) = host.find_nearest_entity(id, PRACTICE_DUMMY_TEMPLATE, radius) {
            host.face_toward(id, dummy);
        }
        self.scheduler.schedule(
            HelperAction::PracticeSwing,
            self.profile.practice_swing,
            Some(IDLE_RP_GROUP),
            host.rng(),
        );
    }
}

impl EncounterActor for HelperActorController {
    fn state(&self) -> &ActorState {
        &self.state
    }

    fn pending_actions(&self) -> usize {
        self.scheduler.len()
    }

    fn on_reset<H: EncounterHost>(&mut self, host: &mut H) {
        if !self.state.reset() {
            return;
        }
        self.scheduler.cancel_all();
        host.evade(self.id());
        self.schedule_practice(host);
    }

    fn on_tick<H: EncounterHost>(&mut self, host: &mut H, elapsed: Duration) {
        if !self.state.is_alive() {
            return;
        }
        let id = self.id();

        self.scheduler.advance(elapsed);
        if let Some(HelperAction::PracticeSwing) = self.scheduler.pop_ready() {
            host.play_emote(id, EMOTE_ONESHOT_ATTACK_1H);
            self.scheduler.repeat(self.profile.practice_swing, host.rng());
        }

        if !self.state.is_engaged() {
            return;
        }
        if host.current_target(id).is_none() {
            debug!(actor = %id, "no target left; evading");
            self.on_reset(host);
            return;
        }
        let casting = host.is_casting_or_busy(id);
        self.state.set_casting(casting);
        if !casting && !host.is_controlled(id) {
            host.melee_attack_if_ready(id);
        }
    }

    fn on_enter_combat<H: EncounterHost>(&mut self, host: &mut H, attacker: Option<EntityId>) {
        if !self.state.engage() {
            return;
        }
        let id = self.id();
        let dropped = self.scheduler.cancel_group(IDLE_RP_GROUP);
        debug!(actor = %id, dropped, "idle behavior cancelled");

        let primary = self
            .state
            .with_context(|ctx| ctx.lookup(ActorRole::Primary))
            .flatten();
        match primary {
            Some(primary) if host.unit_matches(primary, |unit| unit.alive) => {
                host.force_engage(primary, attacker);
            }
            _ => debug!(actor = %id, "no living primary to pull"),
        }
    }

    fn on_unit_killed<H: EncounterHost>(&mut self, host: &mut H, victim: EntityId) {
        if host.unit_matches(victim, |unit| unit.kind.is_player()) {
            self.state.with_context(|ctx| ctx.clear_invalid_kill());
        }
    }

    fn on_death<H: EncounterHost>(&mut self, _host: &mut H, _killer: Option<EntityId>) {
        if self.state.kill() {
            self.scheduler.cancel_all();
        }
    }
}
