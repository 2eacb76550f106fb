//! Encounter constants and tuning parameters.

use std::time::Duration;

use crate::types::{AbilityId, EmoteId, FlagId, GroupId, LineId, Placement, TemplateId};

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 10;

/// Duration of one tick.
pub const DT: Duration = Duration::from_millis(1000 / TICK_RATE as u64);

// --- Templates ---

/// The instructor (primary actor).
pub const PRIMARY_TEMPLATE: TemplateId = TemplateId(16061);

/// Understudy (helper actor) summoned by the instructor.
pub const HELPER_TEMPLATE: TemplateId = TemplateId(16803);

/// Practice dummy the understudies train against while idle.
pub const PRACTICE_DUMMY_TEMPLATE: TemplateId = TemplateId(16211);

// --- Abilities ---

/// Heavy melee strike on the current target.
pub const UNBALANCING_STRIKE: AbilityId = AbilityId(26613);

/// Area shout centered on the caster, small group variant.
pub const DISRUPTING_SHOUT_SMALL: AbilityId = AbilityId(55543);

/// Area shout centered on the caster, large group variant.
pub const DISRUPTING_SHOUT_LARGE: AbilityId = AbilityId(29107);

/// Ranged bleed thrown at a random nearby target.
pub const JAGGED_KNIFE: AbilityId = AbilityId(55550);

/// Terminal self-effect applied on death.
pub const HOPELESS: AbilityId = AbilityId(29125);

/// Taunt effect that triggers the taunted line when it lands on the instructor.
pub const TAUNT: AbilityId = AbilityId(29060);

// --- Announcement lines ---

pub const LINE_AGGRO: LineId = LineId(0);
pub const LINE_SLAY: LineId = LineId(1);
pub const LINE_TAUNTED: LineId = LineId(2);
pub const LINE_DEATH: LineId = LineId(3);

// --- Emotes ---

/// Persistent one-handed ready stance.
pub const EMOTE_STATE_READY_1H: EmoteId = EmoteId(333);

/// One-shot one-handed attack swing.
pub const EMOTE_ONESHOT_ATTACK_1H: EmoteId = EmoteId(36);

// --- Instance flags ---

/// Written to zero whenever an actor defeats a player; read by the external
/// achievement tracker to decide whether the kill was clean.
pub const INVALID_KILL_FLAG: FlagId = FlagId(1);

// --- Scheduler groups ---

/// Idle-only cosmetic behavior, dropped on engagement.
pub const IDLE_RP_GROUP: GroupId = GroupId(0);

// --- Primary abilities ---

/// Initial delay and period of the unbalancing strike.
pub const UNBALANCING_STRIKE_PERIOD: Duration = Duration::from_secs(20);

/// Initial delay and period of the disrupting shout.
pub const DISRUPTING_SHOUT_PERIOD: Duration = Duration::from_secs(15);

/// Initial delay and period of the jagged knife.
pub const JAGGED_KNIFE_PERIOD: Duration = Duration::from_secs(10);

/// Radius within which the jagged knife picks a random target.
pub const JAGGED_KNIFE_RADIUS: f32 = 45.0;

/// Probability of the slay line on any kill.
pub const SLAY_LINE_CHANCE: f64 = 0.30;

// --- Helper idle behavior ---

/// Shortest gap between practice swings.
pub const PRACTICE_SWING_MIN: Duration = Duration::from_secs(6);

/// Longest gap between practice swings.
pub const PRACTICE_SWING_MAX: Duration = Duration::from_secs(9);

/// Search radius for the nearest practice dummy.
pub const PRACTICE_DUMMY_RADIUS: f32 = 10.0;

// --- Helper spawns ---

/// Helpers summoned in every group size.
pub const HELPER_PLACEMENTS_BASE: [Placement; 2] = [
    Placement::new(2762.23, -3085.07, 267.685, 1.95),
    Placement::new(2758.24, -3110.97, 267.685, 3.94),
];

/// Extra pair summoned in large group mode.
pub const HELPER_PLACEMENTS_LARGE: [Placement; 2] = [
    Placement::new(2782.45, -3088.03, 267.685, 0.75),
    Placement::new(2778.56, -3113.74, 267.685, 5.28),
];

/// Where the instructor stands.
pub const PRIMARY_PLACEMENT: Placement = Placement::new(2772.56, -3099.57, 267.685, 3.14);

// --- Host simulation ---

/// Instructor health pool.
pub const PRIMARY_MAX_HEALTH: u32 = 3_000_000;

/// Understudy health pool.
pub const HELPER_MAX_HEALTH: u32 = 800_000;

/// Player health pool.
pub const PLAYER_MAX_HEALTH: u32 = 30_000;

/// Player damage a creature must take before the kill grants credit.
pub const PLAYER_DAMAGE_REQUIREMENT: u32 = PRIMARY_MAX_HEALTH / 2;

/// Swing timer between basic melee strikes.
pub const MELEE_SWING_COOLDOWN: Duration = Duration::from_secs(2);

/// Damage of one basic melee strike.
pub const MELEE_SWING_DAMAGE: u32 = 1_500;

/// Cast time of every non-instant ability.
pub const ABILITY_CAST_TIME: Duration = Duration::from_millis(500);

/// Reach of a basic melee strike.
pub const MELEE_RANGE: f32 = 5.0;

/// Run speed (units/s) of a unit closing to melee reach.
pub const MOVE_SPEED: f32 = 7.0;

/// Spacing between the practice dummies and the helpers training on them.
pub const PRACTICE_DUMMY_OFFSET: f32 = 3.0;
