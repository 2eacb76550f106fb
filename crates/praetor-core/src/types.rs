//! Fundamental identity, placement, and time types.

use std::fmt;
use std::time::Duration;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Opaque handle to a unit in the world (actor, player, dummy).
///
/// Controllers never own what a handle points at; they resolve it through
/// the entity directory each time they need it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Creature template identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TemplateId(pub u32);

/// Ability (spell) identifier understood by the combat service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AbilityId(pub u32);

/// Index of a scripted announcement line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineId(pub u8);

/// Emote identifier (one-shot animation or persistent stance).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmoteId(pub u32);

/// Instance-level flag identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlagId(pub u32);

/// Label on scheduled actions enabling bulk cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupId(pub u8);

/// Position plus facing (radians) of a unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub position: Vec3,
    pub facing: f32,
}

impl Placement {
    pub const fn new(x: f32, y: f32, z: f32, facing: f32) -> Self {
        Self {
            position: Vec3::new(x, y, z),
            facing,
        }
    }

    /// Straight-line distance to another placement.
    pub fn distance_to(&self, other: &Placement) -> f32 {
        self.position.distance(other.position)
    }

    /// Facing (radians, counter-clockwise from +X) that points at `other`.
    pub fn facing_toward(&self, other: &Placement) -> f32 {
        let delta = other.position - self.position;
        delta.y.atan2(delta.x).rem_euclid(std::f32::consts::TAU)
    }
}

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SimTime {
    /// Current tick number (increments by 1 each tick).
    pub tick: u64,
    /// Elapsed simulation time.
    pub elapsed: Duration,
}

impl SimTime {
    /// Duration of one tick at the default tick rate.
    pub fn dt(&self) -> Duration {
        crate::constants::DT
    }

    /// Advance by one tick.
    pub fn advance(&mut self) {
        self.tick += 1;
        self.elapsed += self.dt();
    }
}
