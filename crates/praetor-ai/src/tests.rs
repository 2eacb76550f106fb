//! Tests for the scheduler, the shared context, and both controllers.

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};
    use std::time::Duration;

    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use praetor_core::constants::*;
    use praetor_core::enums::*;
    use praetor_core::types::*;

    use crate::context::{EncounterContext, SharedContext};
    use crate::controller::EncounterActor;
    use crate::error::{ProfileError, ScheduleError};
    use crate::helper::{HelperAction, HelperActorController};
    use crate::primary::{PrimaryAction, PrimaryActorController};
    use crate::profiles::{EncounterProfile, HelperProfile, PrimaryProfile};
    use crate::scheduler::{CooldownScheduler, DelayRange};
    use crate::services::*;

    // ---- Recording host ----

    struct MockHost {
        rng: ChaCha8Rng,
        large: bool,
        next_id: u64,
        units: HashMap<EntityId, UnitInfo>,
        targets: HashMap<EntityId, EntityId>,
        casting: HashSet<EntityId>,
        controlled: HashSet<EntityId>,
        random_target: Option<EntityId>,
        dummy: Option<EntityId>,
        spawned: Vec<(EntityId, TemplateId)>,
        despawned: Vec<EntityId>,
        casts: Vec<(EntityId, AbilityId, CastTarget, bool)>,
        swings: Vec<EntityId>,
        lines: Vec<(EntityId, LineId, Option<EntityId>)>,
        emotes: Vec<(EntityId, EmoteId)>,
        stances: Vec<(EntityId, EmoteId)>,
        facings: Vec<(EntityId, EntityId)>,
        pulls: Vec<(EntityId, Option<EntityId>)>,
        damage_requirement: HashMap<EntityId, u32>,
        evaded: Vec<EntityId>,
        corpse_sweeps: Vec<EntityId>,
    }

    impl MockHost {
        fn new(seed: u64) -> Self {
            Self {
                rng: ChaCha8Rng::seed_from_u64(seed),
                large: false,
                next_id: 1,
                units: HashMap::new(),
                targets: HashMap::new(),
                casting: HashSet::new(),
                controlled: HashSet::new(),
                random_target: None,
                dummy: None,
                spawned: Vec::new(),
                despawned: Vec::new(),
                casts: Vec::new(),
                swings: Vec::new(),
                lines: Vec::new(),
                emotes: Vec::new(),
                stances: Vec::new(),
                facings: Vec::new(),
                pulls: Vec::new(),
                damage_requirement: HashMap::new(),
                evaded: Vec::new(),
                corpse_sweeps: Vec::new(),
            }
        }

        fn add_unit(&mut self, kind: UnitKind) -> EntityId {
            let id = EntityId(self.next_id);
            self.next_id += 1;
            self.units.insert(id, UnitInfo { kind, alive: true });
            id
        }

        fn lines_of(&self, line: LineId) -> usize {
            self.lines.iter().filter(|(_, l, _)| *l == line).count()
        }

        fn casts_of(&self, ability: AbilityId) -> usize {
            self.casts.iter().filter(|(_, a, _, _)| *a == ability).count()
        }
    }

    impl CombatService for MockHost {
        fn current_target(&self, actor: EntityId) -> Option<EntityId> {
            self.targets.get(&actor).copied()
        }

        fn cast_ability(
            &mut self,
            caster: EntityId,
            ability: AbilityId,
            target: CastTarget,
            instant: bool,
        ) {
            self.casts.push((caster, ability, target, instant));
        }

        fn melee_attack_if_ready(&mut self, actor: EntityId) {
            self.swings.push(actor);
        }

        fn is_casting_or_busy(&self, actor: EntityId) -> bool {
            self.casting.contains(&actor)
        }

        fn is_controlled(&self, actor: EntityId) -> bool {
            self.controlled.contains(&actor)
        }

        fn find_random_target_in_radius(
            &mut self,
            _actor: EntityId,
            _radius: f32,
        ) -> Option<EntityId> {
            self.random_target
        }

        fn force_engage(&mut self, actor: EntityId, attacker: Option<EntityId>) {
            self.pulls.push((actor, attacker));
        }

        fn lower_player_damage_requirement(&mut self, actor: EntityId, amount: u32) {
            let remaining = self
                .damage_requirement
                .entry(actor)
                .or_insert(PLAYER_DAMAGE_REQUIREMENT);
            *remaining = remaining.saturating_sub(amount);
        }

        fn evade(&mut self, actor: EntityId) {
            self.evaded.push(actor);
        }
    }

    impl EntityDirectory for MockHost {
        fn spawn_entity(
            &mut self,
            template: TemplateId,
            _placement: Placement,
            _summoner: Option<EntityId>,
        ) -> EntityId {
            let id = self.add_unit(UnitKind::Creature { template });
            self.spawned.push((id, template));
            id
        }

        fn despawn_entity(&mut self, id: EntityId) {
            self.units.remove(&id);
            self.despawned.push(id);
        }

        fn despawn_corpses(&mut self, summoner: EntityId) {
            self.corpse_sweeps.push(summoner);
        }

        fn find_nearest_entity(
            &self,
            _origin: EntityId,
            template: TemplateId,
            _radius: f32,
        ) -> Option<EntityId> {
            if template == PRACTICE_DUMMY_TEMPLATE {
                self.dummy
            } else {
                None
            }
        }

        fn resolve_entity(&self, id: EntityId) -> Option<UnitInfo> {
            self.units.get(&id).copied()
        }
    }

    impl Presentation for MockHost {
        fn announce(&mut self, speaker: EntityId, line: LineId, target: Option<EntityId>) {
            self.lines.push((speaker, line, target));
        }

        fn play_emote(&mut self, actor: EntityId, emote: EmoteId) {
            self.emotes.push((actor, emote));
        }

        fn set_emote_state(&mut self, actor: EntityId, emote: EmoteId) {
            self.stances.push((actor, emote));
        }

        fn face_toward(&mut self, actor: EntityId, other: EntityId) {
            self.facings.push((actor, other));
        }
    }

    impl GroupSizePolicy for MockHost {
        fn is_large_group_mode(&self) -> bool {
            self.large
        }
    }

    impl EncounterHost for MockHost {
        type Rng = ChaCha8Rng;

        fn rng(&mut self) -> &mut ChaCha8Rng {
            &mut self.rng
        }
    }

    /// Host, context, reset primary, and one player the primary is fighting.
    fn setup(large: bool) -> (MockHost, SharedContext, PrimaryActorController, EntityId) {
        let mut host = MockHost::new(7);
        host.large = large;
        let context = EncounterContext::new().shared();
        context.borrow_mut().set_flag(INVALID_KILL_FLAG, 1);

        let primary_id = host.add_unit(UnitKind::Creature {
            template: PRIMARY_TEMPLATE,
        });
        let mut primary =
            PrimaryActorController::new(primary_id, &context, PrimaryProfile::default());
        primary.on_reset(&mut host);

        let player = host.add_unit(UnitKind::Player);
        host.targets.insert(primary_id, player);
        host.random_target = Some(player);
        (host, context, primary, player)
    }

    fn tick_for<A: EncounterActor>(actor: &mut A, host: &mut MockHost, total: Duration) {
        let steps = total.as_millis() / DT.as_millis();
        for _ in 0..steps {
            actor.on_tick(host, DT);
        }
    }

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    // ---- Scheduler ----

    #[test]
    fn test_cancel_all_leaves_nothing_ready() {
        let mut rng = rng();
        let mut scheduler = CooldownScheduler::new();
        for delay in [0, 5, 10] {
            let range = DelayRange::fixed(Duration::from_secs(delay));
            scheduler.schedule(PrimaryAction::JaggedKnife, range, None, &mut rng);
        }
        scheduler.advance(Duration::from_secs(60));
        scheduler.cancel_all();

        for _ in 0..10 {
            assert_eq!(scheduler.pop_ready(), None);
            scheduler.advance(Duration::from_secs(60));
        }
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_ready_exactly_at_delay() {
        let mut rng = rng();
        let mut scheduler = CooldownScheduler::new();
        let delay = Duration::from_secs(10);
        scheduler.schedule(PrimaryAction::JaggedKnife, DelayRange::fixed(delay), None, &mut rng);

        scheduler.advance(delay - Duration::from_nanos(1));
        assert_eq!(scheduler.pop_ready(), None, "not ready before its delay");
        assert_eq!(scheduler.len(), 1);

        scheduler.advance(Duration::from_nanos(1));
        assert_eq!(scheduler.pop_ready(), Some(PrimaryAction::JaggedKnife));
        assert!(scheduler.is_empty(), "a popped action is gone until re-armed");
    }

    #[test]
    fn test_advance_fires_nothing_by_itself() {
        let mut rng = rng();
        let mut scheduler = CooldownScheduler::new();
        let second = DelayRange::fixed(Duration::from_secs(1));
        scheduler.schedule(HelperAction::PracticeSwing, second, None, &mut rng);
        scheduler.advance(Duration::from_secs(30));
        assert_eq!(scheduler.len(), 1);
        assert_eq!(scheduler.remaining(HelperAction::PracticeSwing), Some(Duration::ZERO));
    }

    #[test]
    fn test_pop_order_smallest_delay_then_insertion() {
        let mut rng = rng();
        let mut scheduler = CooldownScheduler::new();
        let secs = |s| DelayRange::fixed(Duration::from_secs(s));
        scheduler.schedule(PrimaryAction::UnbalancingStrike, secs(5), None, &mut rng);
        scheduler.schedule(PrimaryAction::DisruptingShout, secs(3), None, &mut rng);
        scheduler.schedule(PrimaryAction::JaggedKnife, secs(3), None, &mut rng);
        scheduler.advance(Duration::from_secs(10));

        assert_eq!(scheduler.pop_ready(), Some(PrimaryAction::DisruptingShout));
        assert_eq!(scheduler.pop_ready(), Some(PrimaryAction::JaggedKnife));
        assert_eq!(scheduler.pop_ready(), Some(PrimaryAction::UnbalancingStrike));
        assert_eq!(scheduler.pop_ready(), None);
    }

    #[test]
    fn test_duplicate_kinds_are_independent() {
        let mut rng = rng();
        let mut scheduler = CooldownScheduler::new();
        let secs = |s| DelayRange::fixed(Duration::from_secs(s));
        scheduler.schedule(PrimaryAction::JaggedKnife, secs(1), None, &mut rng);
        scheduler.schedule(PrimaryAction::JaggedKnife, secs(2), None, &mut rng);
        scheduler.advance(Duration::from_secs(1));
        assert_eq!(scheduler.pop_ready(), Some(PrimaryAction::JaggedKnife));
        assert_eq!(scheduler.pop_ready(), None);
        assert_eq!(scheduler.remaining(PrimaryAction::JaggedKnife), Some(Duration::from_secs(1)));
    }

    #[test]
    fn test_repeat_keeps_action_alive_indefinitely() {
        let mut rng = rng();
        let mut scheduler = CooldownScheduler::new();
        let period = DelayRange::fixed(JAGGED_KNIFE_PERIOD);
        scheduler.schedule(PrimaryAction::JaggedKnife, period, None, &mut rng);

        for cycle in 0..200 {
            scheduler.advance(JAGGED_KNIFE_PERIOD);
            assert_eq!(
                scheduler.pop_ready(),
                Some(PrimaryAction::JaggedKnife),
                "cycle {cycle}"
            );
            assert_eq!(scheduler.repeat(period, &mut rng), Some(PrimaryAction::JaggedKnife));
            assert_eq!(scheduler.len(), 1);
        }
    }

    #[test]
    fn test_repeat_without_pop_is_noop() {
        let mut rng = rng();
        let mut scheduler: CooldownScheduler<PrimaryAction> = CooldownScheduler::new();
        let period = DelayRange::fixed(Duration::from_secs(1));
        assert_eq!(scheduler.repeat(period, &mut rng), None);

        scheduler.schedule(PrimaryAction::JaggedKnife, period, None, &mut rng);
        scheduler.advance(Duration::from_secs(1));
        scheduler.pop_ready();
        scheduler.cancel_all();
        assert_eq!(scheduler.repeat(period, &mut rng), None);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_cancel_group_only_drops_tagged_actions() {
        let mut rng = rng();
        let mut scheduler = CooldownScheduler::new();
        let range = DelayRange::fixed(Duration::from_secs(1));
        for _ in 0..3 {
            scheduler.schedule(HelperAction::PracticeSwing, range, Some(IDLE_RP_GROUP), &mut rng);
        }
        scheduler.schedule(HelperAction::PracticeSwing, range, None, &mut rng);

        assert_eq!(scheduler.cancel_group(IDLE_RP_GROUP), 3);
        assert_eq!(scheduler.len(), 1);
        assert_eq!(scheduler.cancel_group(IDLE_RP_GROUP), 0);
    }

    #[test]
    fn test_repeat_preserves_group() {
        let mut rng = rng();
        let mut scheduler = CooldownScheduler::new();
        let range = DelayRange::fixed(Duration::from_secs(1));
        scheduler.schedule(HelperAction::PracticeSwing, range, Some(IDLE_RP_GROUP), &mut rng);
        scheduler.advance(Duration::from_secs(1));
        scheduler.pop_ready();
        scheduler.repeat(range, &mut rng);

        assert_eq!(scheduler.iter().next().and_then(|a| a.group), Some(IDLE_RP_GROUP));
        assert_eq!(scheduler.cancel_group(IDLE_RP_GROUP), 1);
    }

    #[test]
    fn test_random_delay_within_range() {
        let mut rng = rng();
        let mut scheduler = CooldownScheduler::new();
        let range = DelayRange::between(PRACTICE_SWING_MIN, PRACTICE_SWING_MAX);
        let mut delays = HashSet::new();
        for _ in 0..200 {
            let delay = scheduler.schedule(HelperAction::PracticeSwing, range, None, &mut rng);
            assert!(delay >= PRACTICE_SWING_MIN && delay <= PRACTICE_SWING_MAX, "{delay:?}");
            delays.insert(delay);
        }
        assert!(delays.len() > 100, "delays should vary");
    }

    #[test]
    fn test_same_seed_same_delays() {
        let range = DelayRange::between(PRACTICE_SWING_MIN, PRACTICE_SWING_MAX);
        let draw = |seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            (0..20).map(|_| range.sample(&mut rng)).collect::<Vec<_>>()
        };
        assert_eq!(draw(9), draw(9));
        assert_ne!(draw(9), draw(10));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let err = DelayRange::try_new(Duration::from_secs(9), Duration::from_secs(6)).unwrap_err();
        assert_eq!(
            err,
            ScheduleError::InvertedRange {
                min: Duration::from_secs(9),
                max: Duration::from_secs(6),
            }
        );
        assert!(DelayRange::try_new(Duration::from_secs(6), Duration::from_secs(6)).is_ok());
    }

    #[test]
    fn test_delay_range_json() {
        let range: DelayRange =
            serde_json::from_str(r#"{"min_secs": 6.0, "max_secs": 9.0}"#).unwrap();
        assert_eq!(range, DelayRange::between(PRACTICE_SWING_MIN, PRACTICE_SWING_MAX));

        let parse = |json: &str| serde_json::from_str::<DelayRange>(json);
        assert!(parse(r#"{"min_secs": 9.0, "max_secs": 6.0}"#).is_err());
        assert!(parse(r#"{"min_secs": -1.0, "max_secs": 6.0}"#).is_err());
    }

    // ---- Context ----

    #[test]
    fn test_context_roles_and_flags() {
        let mut context = EncounterContext::new();
        assert_eq!(context.lookup(ActorRole::Primary), None);
        assert_eq!(context.flag(INVALID_KILL_FLAG), 0);

        context.register(ActorRole::Primary, EntityId(5));
        context.unregister(ActorRole::Primary, EntityId(6));
        assert_eq!(context.lookup(ActorRole::Primary), Some(EntityId(5)));
        context.unregister(ActorRole::Primary, EntityId(5));
        assert_eq!(context.lookup(ActorRole::Primary), None);

        context.set_flag(INVALID_KILL_FLAG, 1);
        context.clear_invalid_kill();
        assert_eq!(context.flag(INVALID_KILL_FLAG), 0);
    }

    // ---- Primary controller ----

    #[test]
    fn test_reset_spawns_two_helpers_small_group() {
        let (host, context, primary, _) = setup(false);
        assert_eq!(primary.roster().len(), 2);
        assert_eq!(host.spawned.len(), 2);
        assert!(host.spawned.iter().all(|(_, t)| *t == HELPER_TEMPLATE));
        assert_eq!(primary.state().phase(), ActorPhase::Idle);
        assert_eq!(primary.pending_actions(), 0);
        assert_eq!(context.borrow().lookup(ActorRole::Primary), Some(primary.state().id()));
    }

    #[test]
    fn test_reset_spawns_four_helpers_large_group() {
        let (host, _context, primary, _) = setup(true);
        assert_eq!(primary.roster().len(), 4);
        assert_eq!(host.spawned.len(), 4);
    }

    #[test]
    fn test_reset_replaces_previous_roster() {
        let (mut host, _context, mut primary, _) = setup(false);
        let first: Vec<EntityId> = primary.roster().iter().collect();
        primary.on_reset(&mut host);

        assert_eq!(host.despawned, first);
        assert_eq!(primary.roster().len(), 2);
        assert!(primary.roster().iter().all(|id| !first.contains(&id)));
    }

    #[test]
    fn test_reset_restores_unit_and_sweeps_corpses() {
        let (mut host, _context, mut primary, _) = setup(false);
        let id = primary.state().id();
        assert_eq!(host.evaded, vec![id]);
        assert_eq!(host.corpse_sweeps, vec![id]);

        primary.on_reset(&mut host);
        assert_eq!(host.evaded, vec![id, id]);
        assert_eq!(host.corpse_sweeps, vec![id, id]);
    }

    #[test]
    fn test_engage_arms_three_abilities() {
        let (mut host, context, mut primary, player) = setup(false);
        primary.on_enter_combat(&mut host, Some(player));

        assert_eq!(primary.state().phase(), ActorPhase::Engaged);
        assert_eq!(context.borrow().status(), EncounterStatus::InProgress);
        assert_eq!(host.lines_of(LINE_AGGRO), 1);

        let scheduler = primary.scheduler();
        assert_eq!(scheduler.len(), 3);
        assert_eq!(
            scheduler.remaining(PrimaryAction::UnbalancingStrike),
            Some(Duration::from_secs(20))
        );
        assert_eq!(
            scheduler.remaining(PrimaryAction::DisruptingShout),
            Some(Duration::from_secs(15))
        );
        assert_eq!(scheduler.remaining(PrimaryAction::JaggedKnife), Some(Duration::from_secs(10)));

        // Every helper is pulled in against the same attacker.
        let pulled: Vec<EntityId> = host.pulls.iter().map(|(id, _)| *id).collect();
        assert_eq!(pulled, primary.roster().iter().collect::<Vec<_>>());
        assert!(host.pulls.iter().all(|(_, attacker)| *attacker == Some(player)));

        // A second stimulus while engaged changes nothing.
        primary.on_enter_combat(&mut host, Some(player));
        assert_eq!(host.lines_of(LINE_AGGRO), 1);
        assert_eq!(primary.pending_actions(), 3);
    }

    #[test]
    fn test_helper_pull_engages_primary() {
        let (mut host, context, mut primary, player) = setup(false);
        let primary_id = primary.state().id();
        let helper_id = primary.roster().iter().next().unwrap();
        let mut helper = HelperActorController::new(helper_id, &context, HelperProfile::default());
        helper.on_reset(&mut host);

        helper.on_enter_combat(&mut host, Some(player));
        assert_eq!(helper.state().phase(), ActorPhase::Engaged);
        assert_eq!(host.pulls, vec![(primary_id, Some(player))]);

        // The host delivers the pull to the primary.
        primary.on_enter_combat(&mut host, Some(player));
        assert_eq!(primary.state().phase(), ActorPhase::Engaged);
        assert_eq!(
            primary.scheduler().remaining(PrimaryAction::UnbalancingStrike),
            Some(Duration::from_secs(20))
        );
        assert_eq!(
            primary.scheduler().remaining(PrimaryAction::DisruptingShout),
            Some(Duration::from_secs(15))
        );
        assert_eq!(
            primary.scheduler().remaining(PrimaryAction::JaggedKnife),
            Some(Duration::from_secs(10))
        );
    }

    #[test]
    fn test_knife_fires_on_period_and_rearms() {
        let (mut host, _context, mut primary, player) = setup(false);
        primary.on_enter_combat(&mut host, Some(player));

        tick_for(&mut primary, &mut host, Duration::from_secs(10) - DT);
        assert_eq!(host.casts_of(JAGGED_KNIFE), 0);

        primary.on_tick(&mut host, DT);
        assert_eq!(host.casts_of(JAGGED_KNIFE), 1);
        let (caster, _, target, instant) = host.casts[0];
        assert_eq!(caster, primary.state().id());
        assert_eq!(target, CastTarget::Unit(player));
        assert!(!instant);
        assert_eq!(
            primary.scheduler().remaining(PrimaryAction::JaggedKnife),
            Some(JAGGED_KNIFE_PERIOD)
        );
    }

    #[test]
    fn test_knife_without_target_skips_but_rearms() {
        let (mut host, _context, mut primary, player) = setup(false);
        host.random_target = None;
        primary.on_enter_combat(&mut host, Some(player));

        tick_for(&mut primary, &mut host, Duration::from_secs(10));
        assert_eq!(host.casts_of(JAGGED_KNIFE), 0);
        assert_eq!(
            primary.scheduler().remaining(PrimaryAction::JaggedKnife),
            Some(JAGGED_KNIFE_PERIOD)
        );
        assert_eq!(primary.pending_actions(), 3);
    }

    #[test]
    fn test_melee_attempted_every_free_tick() {
        let (mut host, _context, mut primary, player) = setup(false);
        primary.on_enter_combat(&mut host, Some(player));
        tick_for(&mut primary, &mut host, Duration::from_secs(1));
        assert_eq!(host.swings.len(), TICK_RATE as usize);
    }

    #[test]
    fn test_busy_delays_keep_counting() {
        let (mut host, _context, mut primary, player) = setup(false);
        let id = primary.state().id();
        primary.on_enter_combat(&mut host, Some(player));

        host.casting.insert(id);
        tick_for(&mut primary, &mut host, Duration::from_secs(25));
        assert!(host.casts.is_empty(), "nothing fires while busy");
        assert!(host.swings.is_empty());
        assert!(primary.state().is_casting());
        assert_eq!(
            primary.scheduler().remaining(PrimaryAction::UnbalancingStrike),
            Some(Duration::ZERO)
        );

        // Free again: one overdue ability per tick, most overdue first.
        host.casting.remove(&id);
        primary.on_tick(&mut host, DT);
        assert_eq!(host.casts.len(), 1);
        assert_eq!(host.casts[0].1, JAGGED_KNIFE);
        primary.on_tick(&mut host, DT);
        assert_eq!(host.casts[1].1, DISRUPTING_SHOUT_SMALL);
        primary.on_tick(&mut host, DT);
        assert_eq!(host.casts[2].1, UNBALANCING_STRIKE);
        assert_eq!(host.casts[2].2, CastTarget::Unit(player));
        primary.on_tick(&mut host, DT);
        assert_eq!(host.casts.len(), 3);
    }

    #[test]
    fn test_shout_variant_follows_group_size() {
        for (large, expected) in [(false, DISRUPTING_SHOUT_SMALL), (true, DISRUPTING_SHOUT_LARGE)] {
            let (mut host, _context, mut primary, player) = setup(large);
            primary.on_enter_combat(&mut host, Some(player));
            tick_for(&mut primary, &mut host, Duration::from_secs(15));

            let shout = host
                .casts
                .iter()
                .find(|(_, ability, _, _)| *ability == expected)
                .expect("shout cast");
            assert_eq!(shout.2, CastTarget::Caster);
        }
    }

    #[test]
    fn test_damage_from_helper_lowers_requirement() {
        let (mut host, _context, mut primary, player) = setup(false);
        let id = primary.state().id();
        let helper = primary.roster().iter().next().unwrap();

        let applied = primary.on_damage_taken(&mut host, Some(helper), 100);
        assert_eq!(applied, 100);
        assert_eq!(host.damage_requirement[&id], PLAYER_DAMAGE_REQUIREMENT - 100);

        // Player and unattributed damage leave the requirement alone.
        primary.on_damage_taken(&mut host, Some(player), 500);
        primary.on_damage_taken(&mut host, None, 500);
        assert_eq!(host.damage_requirement[&id], PLAYER_DAMAGE_REQUIREMENT - 100);
    }

    #[test]
    fn test_player_kill_clears_invalid_kill_flag() {
        let (mut host, context, mut primary, player) = setup(false);
        primary.on_unit_killed(&mut host, player);
        assert_eq!(context.borrow().flag(INVALID_KILL_FLAG), 0);

        // Idempotent regardless of prior value.
        primary.on_unit_killed(&mut host, player);
        assert_eq!(context.borrow().flag(INVALID_KILL_FLAG), 0);
    }

    #[test]
    fn test_creature_kill_keeps_invalid_kill_flag() {
        let (mut host, context, mut primary, _) = setup(false);
        let dummy = host.add_unit(UnitKind::Creature {
            template: PRACTICE_DUMMY_TEMPLATE,
        });
        primary.on_unit_killed(&mut host, dummy);
        assert_eq!(context.borrow().flag(INVALID_KILL_FLAG), 1);
    }

    #[test]
    fn test_slay_line_chance() {
        let (mut host, _context, mut primary, player) = setup(false);
        for _ in 0..2000 {
            primary.on_unit_killed(&mut host, player);
        }
        let slays = host.lines_of(LINE_SLAY);
        assert!((500..=700).contains(&slays), "expected ~600 slay lines, got {slays}");
    }

    #[test]
    fn test_taunt_announces_at_taunter() {
        let (mut host, _context, mut primary, player) = setup(false);
        primary.on_effect_applied(&mut host, JAGGED_KNIFE, Some(player));
        assert!(host.lines.is_empty());

        primary.on_effect_applied(&mut host, TAUNT, Some(player));
        assert_eq!(host.lines, vec![(primary.state().id(), LINE_TAUNTED, Some(player))]);
    }

    #[test]
    fn test_death_is_terminal() {
        let (mut host, context, mut primary, player) = setup(false);
        let id = primary.state().id();
        primary.on_enter_combat(&mut host, Some(player));
        tick_for(&mut primary, &mut host, Duration::from_secs(5));

        primary.on_death(&mut host, Some(player));
        assert_eq!(primary.state().phase(), ActorPhase::Dead);
        assert_eq!(host.lines_of(LINE_DEATH), 1);
        assert_eq!(host.casts.last(), Some(&(id, HOPELESS, CastTarget::Caster, true)));
        assert_eq!(primary.pending_actions(), 0);
        assert_eq!(context.borrow().status(), EncounterStatus::Done);

        let casts = host.casts.len();
        let swings = host.swings.len();
        tick_for(&mut primary, &mut host, Duration::from_secs(60));
        primary.on_death(&mut host, Some(player));
        primary.on_enter_combat(&mut host, Some(player));
        primary.on_reset(&mut host);

        assert_eq!(host.casts.len(), casts);
        assert_eq!(host.swings.len(), swings);
        assert_eq!(host.lines_of(LINE_DEATH), 1);
        assert_eq!(primary.state().phase(), ActorPhase::Dead);
        assert_eq!(primary.pending_actions(), 0);
        assert_eq!(host.evaded, vec![id], "a corpse is never restored");
    }

    #[test]
    fn test_evade_without_target_resets() {
        let (mut host, context, mut primary, player) = setup(false);
        let id = primary.state().id();
        primary.on_enter_combat(&mut host, Some(player));
        let old_roster: Vec<EntityId> = primary.roster().iter().collect();

        host.targets.remove(&id);
        host.evaded.clear();
        primary.on_tick(&mut host, DT);

        assert_eq!(host.evaded, vec![id]);
        assert_eq!(primary.state().phase(), ActorPhase::Idle);
        assert_eq!(primary.pending_actions(), 0);
        assert_eq!(context.borrow().status(), EncounterStatus::NotStarted);
        assert_eq!(host.despawned, old_roster);
        assert_eq!(primary.roster().len(), 2);
    }

    #[test]
    fn test_summon_removed_leaves_roster() {
        let (mut host, _context, mut primary, _) = setup(false);
        let helper = primary.roster().iter().next().unwrap();
        primary.on_summon_removed(&mut host, helper);
        assert_eq!(primary.roster().len(), 1);
        assert!(!primary.roster().contains(helper));
        primary.on_summon_removed(&mut host, helper);
        assert_eq!(primary.roster().len(), 1);
    }

    #[test]
    fn test_dropped_context_is_tolerated() {
        let (mut host, context, mut primary, player) = setup(false);
        drop(context);
        primary.on_unit_killed(&mut host, player);
        primary.on_enter_combat(&mut host, Some(player));
        assert_eq!(primary.state().phase(), ActorPhase::Engaged);
    }

    // ---- Helper controller ----

    fn helper_setup() -> (MockHost, SharedContext, HelperActorController, EntityId) {
        let mut host = MockHost::new(11);
        let context = EncounterContext::new().shared();
        let id = host.add_unit(UnitKind::Creature {
            template: HELPER_TEMPLATE,
        });
        let dummy = host.add_unit(UnitKind::Creature {
            template: PRACTICE_DUMMY_TEMPLATE,
        });
        host.dummy = Some(dummy);
        let mut helper = HelperActorController::new(id, &context, HelperProfile::default());
        helper.on_reset(&mut host);
        (host, context, helper, id)
    }

    #[test]
    fn test_helper_idle_practice_loop() {
        let (mut host, _context, mut helper, id) = helper_setup();
        let dummy = host.dummy.unwrap();
        assert_eq!(host.stances, vec![(id, EMOTE_STATE_READY_1H)]);
        assert_eq!(host.facings, vec![(id, dummy)]);
        assert_eq!(helper.pending_actions(), 1);

        tick_for(&mut helper, &mut host, Duration::from_secs(60));
        let swings = host.emotes.iter().filter(|(_, e)| *e == EMOTE_ONESHOT_ATTACK_1H).count();
        assert!((6..=10).contains(&swings), "got {swings} practice swings in 60s");
        assert!(host.swings.is_empty(), "idle helpers never melee");
        assert_eq!(helper.pending_actions(), 1);
    }

    #[test]
    fn test_helper_without_dummy_still_practices() {
        let (mut host, _context, mut helper, _) = helper_setup();
        host.dummy = None;
        host.facings.clear();
        helper.on_reset(&mut host);
        assert!(host.facings.is_empty());
        assert_eq!(helper.pending_actions(), 1);
    }

    #[test]
    fn test_helper_engage_cancels_idle_group() {
        let (mut host, _context, mut helper, id) = helper_setup();
        let player = host.add_unit(UnitKind::Player);
        host.targets.insert(id, player);

        helper.on_enter_combat(&mut host, Some(player));
        assert_eq!(helper.state().phase(), ActorPhase::Engaged);
        assert_eq!(helper.pending_actions(), 0);
        assert_eq!(helper.scheduler().remaining(HelperAction::PracticeSwing), None);

        host.emotes.clear();
        tick_for(&mut helper, &mut host, Duration::from_secs(30));
        assert!(host.emotes.is_empty(), "no practice swings once engaged");
    }

    #[test]
    fn test_helper_evades_without_target() {
        let (mut host, _context, mut helper, id) = helper_setup();
        assert_eq!(host.evaded, vec![id]);
        let player = host.add_unit(UnitKind::Player);
        host.targets.insert(id, player);
        helper.on_enter_combat(&mut host, Some(player));

        host.targets.remove(&id);
        helper.on_tick(&mut host, DT);
        assert_eq!(helper.state().phase(), ActorPhase::Idle);
        assert_eq!(host.evaded, vec![id, id]);
        assert_eq!(helper.pending_actions(), 1, "practice resumes");
    }

    #[test]
    fn test_helper_engages_without_primary() {
        let (mut host, _context, mut helper, _) = helper_setup();
        helper.on_enter_combat(&mut host, None);
        assert_eq!(helper.state().phase(), ActorPhase::Engaged);
        assert!(host.pulls.is_empty());
    }

    #[test]
    fn test_helper_skips_dead_primary() {
        let (mut host, context, mut helper, _) = helper_setup();
        let primary = host.add_unit(UnitKind::Creature {
            template: PRIMARY_TEMPLATE,
        });
        context.borrow_mut().register(ActorRole::Primary, primary);
        host.units.get_mut(&primary).unwrap().alive = false;

        helper.on_enter_combat(&mut host, None);
        assert_eq!(helper.state().phase(), ActorPhase::Engaged);
        assert!(host.pulls.is_empty());
    }

    #[test]
    fn test_helper_melee_gate() {
        let (mut host, _context, mut helper, id) = helper_setup();
        let player = host.add_unit(UnitKind::Player);
        host.targets.insert(id, player);
        helper.on_enter_combat(&mut host, Some(player));

        helper.on_tick(&mut host, DT);
        assert_eq!(host.swings, vec![id]);

        host.controlled.insert(id);
        helper.on_tick(&mut host, DT);
        assert_eq!(host.swings.len(), 1, "controlled helpers do not swing");

        host.controlled.clear();
        host.casting.insert(id);
        helper.on_tick(&mut host, DT);
        assert_eq!(host.swings.len(), 1, "casting helpers do not swing");

        host.casting.clear();
        helper.on_tick(&mut host, DT);
        assert_eq!(host.swings.len(), 2);
    }

    #[test]
    fn test_helper_player_kill_clears_flag() {
        let (mut host, context, mut helper, _) = helper_setup();
        context.borrow_mut().set_flag(INVALID_KILL_FLAG, 1);
        let player = host.add_unit(UnitKind::Player);
        helper.on_unit_killed(&mut host, player);
        assert_eq!(context.borrow().flag(INVALID_KILL_FLAG), 0);
    }

    #[test]
    fn test_helper_death_stops_ticking() {
        let (mut host, _context, mut helper, _) = helper_setup();
        helper.on_death(&mut host, None);
        assert_eq!(helper.state().phase(), ActorPhase::Dead);
        assert_eq!(helper.pending_actions(), 0);

        host.emotes.clear();
        tick_for(&mut helper, &mut host, Duration::from_secs(30));
        helper.on_reset(&mut host);
        assert!(host.emotes.is_empty());
        assert_eq!(helper.pending_actions(), 0);
    }

    // ---- Profiles ----

    #[test]
    fn test_profile_defaults_match_constants() {
        let profile = EncounterProfile::default();
        assert_eq!(profile.primary.jagged_knife_period, DelayRange::fixed(JAGGED_KNIFE_PERIOD));
        assert_eq!(profile.primary.placements(false).count(), 2);
        assert_eq!(profile.primary.placements(true).count(), 4);
        assert!(profile.validate().is_ok());
    }

    #[test]
    fn test_profile_partial_json() {
        let profile = EncounterProfile::from_json(
            r#"{"helper": {"practice_swing": {"min_secs": 2.0, "max_secs": 3.0}}}"#,
        )
        .unwrap();
        assert_eq!(
            profile.helper.practice_swing,
            DelayRange::between(Duration::from_secs(2), Duration::from_secs(3))
        );
        assert_eq!(profile.primary, PrimaryProfile::default());
    }

    #[test]
    fn test_profile_rejects_bad_values() {
        let json = r#"{"primary": {"slay_line_chance": 1.5}}"#;
        let err = EncounterProfile::from_json(json).unwrap_err();
        assert!(matches!(err, ProfileError::Probability { .. }), "{err}");

        let json = r#"{"helper": {"practice_dummy_radius": 0.0}}"#;
        let err = EncounterProfile::from_json(json).unwrap_err();
        assert!(matches!(err, ProfileError::Radius { .. }), "{err}");

        let err = EncounterProfile::from_json(
            r#"{"primary": {"jagged_knife_period": {"min_secs": 12.0, "max_secs": 10.0}}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ProfileError::Parse(_)), "{err}");
    }
}
