//! The callback surface shared by every actor role.

use std::time::Duration;

use praetor_core::commands::Stimulus;
use praetor_core::enums::ActorRole;
use praetor_core::types::{AbilityId, EntityId};

use crate::actor::ActorState;
use crate::helper::HelperActorController;
use crate::primary::PrimaryActorController;
use crate::services::EncounterHost;

/// One combat actor driven by the host tick loop.
///
/// Roles share this state-machine shape and differ in idle behavior and
/// ability set. Every callback runs to completion before returning.
pub trait EncounterActor {
    fn state(&self) -> &ActorState;

    /// Actions waiting in this actor's scheduler.
    fn pending_actions(&self) -> usize;

    /// Instance reset or initial spawn. Cancels every pending action.
    fn on_reset<H: EncounterHost>(&mut self, host: &mut H);

    /// Advance by `elapsed`. Issues at most one scheduled action.
    fn on_tick<H: EncounterHost>(&mut self, host: &mut H, elapsed: Duration);

    fn on_enter_combat<H: EncounterHost>(&mut self, host: &mut H, attacker: Option<EntityId>);

    /// Returns the damage to apply after any adjustment.
    fn on_damage_taken<H: EncounterHost>(
        &mut self,
        _host: &mut H,
        _source: Option<EntityId>,
        amount: u32,
    ) -> u32 {
        amount
    }

    fn on_unit_killed<H: EncounterHost>(&mut self, host: &mut H, victim: EntityId);

    fn on_death<H: EncounterHost>(&mut self, host: &mut H, killer: Option<EntityId>);

    fn on_effect_applied<H: EncounterHost>(
        &mut self,
        _host: &mut H,
        _effect: AbilityId,
        _source: Option<EntityId>,
    ) {
    }

    fn on_summon_removed<H: EncounterHost>(&mut self, _host: &mut H, _summon: EntityId) {}

    /// Route a queued stimulus to its callback. Returns the adjusted amount
    /// for damage stimuli.
    fn handle<H: EncounterHost>(&mut self, host: &mut H, stimulus: &Stimulus) -> Option<u32> {
        match *stimulus {
            Stimulus::EnterCombat { attacker } => self.on_enter_combat(host, attacker),
            Stimulus::DamageTaken { source, amount } => {
                return Some(self.on_damage_taken(host, source, amount));
            }
            Stimulus::UnitKilled { victim } => self.on_unit_killed(host, victim),
            Stimulus::Death { killer } => self.on_death(host, killer),
            Stimulus::EffectApplied { effect, source } => {
                self.on_effect_applied(host, effect, source)
            }
            Stimulus::SummonRemoved { summon } => self.on_summon_removed(host, summon),
            Stimulus::Reset => self.on_reset(host),
        }
        None
    }
}

/// Tagged variant over the concrete roles.
#[derive(Debug)]
pub enum ActorController {
    Primary(PrimaryActorController),
    Helper(HelperActorController),
}

impl ActorController {
    pub fn role(&self) -> ActorRole {
        match self {
            ActorController::Primary(_) => ActorRole::Primary,
            ActorController::Helper(_) => ActorRole::Helper,
        }
    }

    pub fn as_primary(&self) -> Option<&PrimaryActorController> {
        match self {
            ActorController::Primary(primary) => Some(primary),
            ActorController::Helper(_) => None,
        }
    }
}

impl From<PrimaryActorController> for ActorController {
    fn from(controller: PrimaryActorController) -> Self {
        ActorController::Primary(controller)
    }
}

impl From<HelperActorController> for ActorController {
    fn from(controller: HelperActorController) -> Self {
        ActorController::Helper(controller)
    }
}

macro_rules! delegate {
    ($self:ident, $c:ident => $body:expr) => {
        match $self {
            ActorController::Primary($c) => $body,
            ActorController::Helper($c) => $body,
        }
    };
}

impl EncounterActor for ActorController {
    fn state(&self) -> &ActorState {
        delegate!(self, c => c.state())
    }

    fn pending_actions(&self) -> usize {
        delegate!(self, c => c.pending_actions())
    }

    fn on_reset<H: EncounterHost>(&mut self, host: &mut H) {
        delegate!(self, c => c.on_reset(host))
    }

    fn on_tick<H: EncounterHost>(&mut self, host: &mut H, elapsed: Duration) {
        delegate!(self, c => c.on_tick(host, elapsed))
    }

    fn on_enter_combat<H: EncounterHost>(&mut self, host: &mut H, attacker: Option<EntityId>) {
        delegate!(self, c => c.on_enter_combat(host, attacker))
    }

    fn on_damage_taken<H: EncounterHost>(
        &mut self,
        host: &mut H,
        source: Option<EntityId>,
        amount: u32,
    ) -> u32 {
        delegate!(self, c => c.on_damage_taken(host, source, amount))
    }

    fn on_unit_killed<H: EncounterHost>(&mut self, host: &mut H, victim: EntityId) {
        delegate!(self, c => c.on_unit_killed(host, victim))
    }

    fn on_death<H: EncounterHost>(&mut self, host: &mut H, killer: Option<EntityId>) {
        delegate!(self, c => c.on_death(host, killer))
    }

    fn on_effect_applied<H: EncounterHost>(
        &mut self,
        host: &mut H,
        effect: AbilityId,
        source: Option<EntityId>,
    ) {
        delegate!(self, c => c.on_effect_applied(host, effect, source))
    }

    fn on_summon_removed<H: EncounterHost>(&mut self, host: &mut H, summon: EntityId) {
        delegate!(self, c => c.on_summon_removed(host, summon))
    }
}
