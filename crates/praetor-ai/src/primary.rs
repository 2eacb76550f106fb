//! The instructor: boss-role state machine.
//!
//! Reset summons the understudies and leaves the actor idle. The first
//! attack engages it, arms three periodic abilities and pulls the whole
//! roster into the fight. While engaged it issues at most one ability per
//! tick, then swings at its target. Death is terminal.

use std::time::Duration;

use rand::Rng;
use tracing::debug;

use praetor_core::constants::{
    HELPER_TEMPLATE, LINE_AGGRO, LINE_DEATH, LINE_SLAY, LINE_TAUNTED, TAUNT,
};
use praetor_core::enums::{ActorRole, CastTarget, EncounterStatus};
use praetor_core::types::{AbilityId, EntityId};

use crate::actor::ActorState;
use crate::context::SharedContext;
use crate::controller::EncounterActor;
use crate::profiles::PrimaryProfile;
use crate::roster::SummonRoster;
use crate::scheduler::CooldownScheduler;
use crate::services::EncounterHost;

/// Abilities the primary actor schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimaryAction {
    /// Long period, melee-disrupting strike on the current target.
    UnbalancingStrike,
    /// Medium period, area disruption centered on self.
    DisruptingShout,
    /// Short period, ranged debuff on a random nearby target.
    JaggedKnife,
}

#[derive(Debug)]
pub struct PrimaryActorController {
    state: ActorState,
    scheduler: CooldownScheduler<PrimaryAction>,
    roster: SummonRoster,
    profile: PrimaryProfile,
}

impl PrimaryActorController {
    /// Build the controller and register `id` as the encounter's primary.
    pub fn new(id: EntityId, context: &SharedContext, profile: PrimaryProfile) -> Self {
        context.borrow_mut().register(ActorRole::Primary, id);
        Self {
            state: ActorState::new(id, ActorRole::Primary, context),
            scheduler: CooldownScheduler::new(),
            roster: SummonRoster::new(),
            profile,
        }
    }

    pub fn scheduler(&self) -> &CooldownScheduler<PrimaryAction> {
        &self.scheduler
    }

    pub fn roster(&self) -> &SummonRoster {
        &self.roster
    }

    pub fn profile(&self) -> &PrimaryProfile {
        &self.profile
    }

    fn id(&self) -> EntityId {
        self.state.id()
    }

    fn respawn_helpers<H: EncounterHost>(&mut self, host: &mut H) {
        for helper in self.roster.drain() {
            host.despawn_entity(helper);
        }
        host.despawn_corpses(self.id());
        let large = host.is_large_group_mode();
        for placement in self.profile.placements(large) {
            let helper = host.spawn_entity(HELPER_TEMPLATE, placement, Some(self.state.id()));
            self.roster.summon(helper);
        }
        debug!(actor = %self.id(), helpers = self.roster.len(), large, "summoned helpers");
    }

    fn execute<H: EncounterHost>(&mut self, host: &mut H, action: PrimaryAction) {
        let id = self.id();
        let period = match action {
            PrimaryAction::UnbalancingStrike => {
                if let Some(target) = host.current_target(id) {
                    let strike = self.profile.unbalancing_strike;
                    self.cast(host, strike, CastTarget::Unit(target));
                }
                self.profile.unbalancing_strike_period
            }
            PrimaryAction::DisruptingShout => {
                let shout = self.profile.shout(host.is_large_group_mode());
                self.cast(host, shout, CastTarget::Caster);
                self.profile.disrupting_shout_period
            }
            PrimaryAction::JaggedKnife => {
                match host.find_random_target_in_radius(id, self.profile.jagged_knife_radius) {
                    Some(target) => {
                        let knife = self.profile.jagged_knife;
                        self.cast(host, knife, CastTarget::Unit(target));
                    }
                    None => debug!(actor = %id, "no knife target in range; skipping cycle"),
                }
                self.profile.jagged_knife_period
            }
        };
        self.scheduler.repeat(period, host.rng());
    }

    fn cast<H: EncounterHost>(&self, host: &mut H, ability: AbilityId, target: CastTarget) {
        debug!(actor = %self.id(), ability = ability.0, ?target, "casting");
        host.cast_ability(self.id(), ability, target, false);
    }
}

impl EncounterActor for PrimaryActorController {
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
        self.state
            .with_context(|ctx| ctx.set_status(EncounterStatus::NotStarted));
        host.evade(self.id());
        self.respawn_helpers(host);
    }

    fn on_tick<H: EncounterHost>(&mut self, host: &mut H, elapsed: Duration) {
        if !self.state.is_engaged() {
            return;
        }
        let id = self.id();
        if host.current_target(id).is_none() {
            debug!(actor = %id, "no target left; evading");
            self.on_reset(host);
            return;
        }

        self.scheduler.advance(elapsed);
        let casting = host.is_casting_or_busy(id);
        self.state.set_casting(casting);
        if casting {
            return;
        }

        if let Some(action) = self.scheduler.pop_ready() {
            self.execute(host, action);
        }
        host.melee_attack_if_ready(id);
    }

    fn on_enter_combat<H: EncounterHost>(&mut self, host: &mut H, attacker: Option<EntityId>) {
        if !self.state.engage() {
            return;
        }
        let id = self.id();
        self.state
            .with_context(|ctx| ctx.set_status(EncounterStatus::InProgress));
        host.announce(id, LINE_AGGRO, None);

        let rng = host.rng();
        self.scheduler.schedule(
            PrimaryAction::UnbalancingStrike,
            self.profile.unbalancing_strike_period,
            None,
            rng,
        );
        self.scheduler.schedule(
            PrimaryAction::DisruptingShout,
            self.profile.disrupting_shout_period,
            None,
            rng,
        );
        self.scheduler.schedule(
            PrimaryAction::JaggedKnife,
            self.profile.jagged_knife_period,
            None,
            rng,
        );

        for helper in self.roster.iter() {
            host.force_engage(helper, attacker);
        }
    }

    fn on_damage_taken<H: EncounterHost>(
        &mut self,
        host: &mut H,
        source: Option<EntityId>,
        amount: u32,
    ) -> u32 {
        // Helper damage still counts as player damage for kill credit.
        let from_helper = source.is_some_and(|src| {
            host.unit_matches(src, |unit| unit.kind.is_creature_of(HELPER_TEMPLATE))
        });
        if from_helper {
            host.lower_player_damage_requirement(self.id(), amount);
        }
        amount
    }

    fn on_unit_killed<H: EncounterHost>(&mut self, host: &mut H, victim: EntityId) {
        let chance = self.profile.slay_line_chance;
        if host.rng().gen_bool(chance) {
            host.announce(self.id(), LINE_SLAY, None);
        }
        if host.unit_matches(victim, |unit| unit.kind.is_player()) {
            self.state.with_context(|ctx| ctx.clear_invalid_kill());
        }
    }

    fn on_death<H: EncounterHost>(&mut self, host: &mut H, _killer: Option<EntityId>) {
        if !self.state.kill() {
            return;
        }
        self.scheduler.cancel_all();
        self.state
            .with_context(|ctx| ctx.set_status(EncounterStatus::Done));
        let id = self.id();
        host.announce(id, LINE_DEATH, None);
        host.cast_ability(id, self.profile.death_effect, CastTarget::Caster, true);
    }

    fn on_effect_applied<H: EncounterHost>(
        &mut self,
        host: &mut H,
        effect: AbilityId,
        source: Option<EntityId>,
    ) {
        if effect == TAUNT {
            host.announce(self.id(), LINE_TAUNTED, source);
        }
    }

    fn on_summon_removed<H: EncounterHost>(&mut self, _host: &mut H, summon: EntityId) {
        if self.roster.remove(summon) {
            debug!(
                actor = %self.id(),
                %summon,
                remaining = self.roster.len(),
                "helper left roster"
            );
        }
    }
}
