//! Encounter AI for PRAETOR.
//!
//! Implements the cooldown scheduler, per-actor lifecycle state, the shared
//! encounter context, and the boss and minion controllers. Everything the
//! controllers cannot decide themselves goes through the host traits in
//! [`services`].

pub mod actor;
pub mod context;
pub mod controller;
pub mod error;
pub mod helper;
pub mod primary;
pub mod profiles;
pub mod roster;
pub mod scheduler;
pub mod services;

pub use controller::{ActorController, EncounterActor};
pub use praetor_core as core;

#[cfg(test)]
mod tests;
