//! Tunable parameters for each role.
//!
//! Defaults reproduce the stock encounter; a profile can also be loaded
//! from JSON, where any omitted field keeps its default.

use serde::{Deserialize, Serialize};

use praetor_core::constants::*;
use praetor_core::types::{AbilityId, Placement};

use crate::error::ProfileError;
use crate::scheduler::DelayRange;

const STRIKE_PERIOD: DelayRange = DelayRange::fixed(UNBALANCING_STRIKE_PERIOD);
const SHOUT_PERIOD: DelayRange = DelayRange::fixed(DISRUPTING_SHOUT_PERIOD);
const KNIFE_PERIOD: DelayRange = DelayRange::fixed(JAGGED_KNIFE_PERIOD);
const PRACTICE_SWING: DelayRange = DelayRange::between(PRACTICE_SWING_MIN, PRACTICE_SWING_MAX);

/// Parameters for both roles of one encounter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncounterProfile {
    pub primary: PrimaryProfile,
    pub helper: HelperProfile,
}

impl EncounterProfile {
    /// Parse and validate a profile.
    pub fn from_json(json: &str) -> Result<Self, ProfileError> {
        let profile: Self = serde_json::from_str(json).map_err(ProfileError::Parse)?;
        profile.validate()?;
        Ok(profile)
    }

    /// Reject values the controllers cannot act on. Delay ranges are already
    /// validated when they are built.
    pub fn validate(&self) -> Result<(), ProfileError> {
        let chance = self.primary.slay_line_chance;
        if !(0.0..=1.0).contains(&chance) {
            return Err(ProfileError::Probability {
                field: "primary.slay_line_chance",
                value: chance,
            });
        }
        check_radius("primary.jagged_knife_radius", self.primary.jagged_knife_radius)?;
        check_radius("helper.practice_dummy_radius", self.helper.practice_dummy_radius)?;
        Ok(())
    }
}

fn check_radius(field: &'static str, value: f32) -> Result<(), ProfileError> {
    // Also rejects NaN.
    if value > 0.0 {
        Ok(())
    } else {
        Err(ProfileError::Radius { field, value })
    }
}

/// The boss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrimaryProfile {
    /// Initial delay and period of the melee-disrupting strike.
    pub unbalancing_strike_period: DelayRange,
    /// Initial delay and period of the area shout.
    pub disrupting_shout_period: DelayRange,
    /// Initial delay and period of the ranged debuff.
    pub jagged_knife_period: DelayRange,
    pub jagged_knife_radius: f32,
    pub slay_line_chance: f64,
    pub unbalancing_strike: AbilityId,
    pub jagged_knife: AbilityId,
    pub shout_small: AbilityId,
    pub shout_large: AbilityId,
    /// Self-effect cast on death, rendering the corpse inert.
    pub death_effect: AbilityId,
    /// Helpers summoned in every group size.
    pub helper_placements: Vec<Placement>,
    /// Extra helpers summoned in large group mode.
    pub large_group_placements: Vec<Placement>,
}

impl Default for PrimaryProfile {
    fn default() -> Self {
        Self {
            unbalancing_strike_period: STRIKE_PERIOD,
            disrupting_shout_period: SHOUT_PERIOD,
            jagged_knife_period: KNIFE_PERIOD,
            jagged_knife_radius: JAGGED_KNIFE_RADIUS,
            slay_line_chance: SLAY_LINE_CHANCE,
            unbalancing_strike: UNBALANCING_STRIKE,
            jagged_knife: JAGGED_KNIFE,
            shout_small: DISRUPTING_SHOUT_SMALL,
            shout_large: DISRUPTING_SHOUT_LARGE,
            death_effect: HOPELESS,
            helper_placements: HELPER_PLACEMENTS_BASE.to_vec(),
            large_group_placements: HELPER_PLACEMENTS_LARGE.to_vec(),
        }
    }
}

impl PrimaryProfile {
    /// Spawn points for one reset.
    pub fn placements(&self, large_group: bool) -> impl Iterator<Item = Placement> + '_ {
        let extra: &[Placement] = if large_group {
            &self.large_group_placements
        } else {
            &[]
        };
        self.helper_placements.iter().chain(extra).copied()
    }

    pub fn shout(&self, large_group: bool) -> AbilityId {
        if large_group {
            self.shout_large
        } else {
            self.shout_small
        }
    }
}

/// A summoned minion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HelperProfile {
    /// Gap between idle practice swings.
    pub practice_swing: DelayRange,
    pub practice_dummy_radius: f32,
}

impl Default for HelperProfile {
    fn default() -> Self {
        Self {
            practice_swing: PRACTICE_SWING,
            practice_dummy_radius: PRACTICE_DUMMY_RADIUS,
        }
    }
}
