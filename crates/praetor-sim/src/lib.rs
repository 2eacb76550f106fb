//! Headless host for the PRAETOR encounter.
//!
//! Owns the hecs ECS world, implements the services the controllers call
//! into, delivers stimuli at a fixed tick rate, and produces
//! `EncounterSnapshot`s.

pub mod engine;
pub mod error;
pub mod host;
pub mod systems;
pub mod world_setup;

pub use engine::{SimConfig, SimulationEngine};
pub use error::SimError;
pub use praetor_ai as ai;
pub use praetor_core as core;
