//! Host systems run by the engine each tick.
//!
//! Systems are plain functions over the world (or the host wrapping it).
//! They own no state; everything lives in components.

pub mod combat;
pub mod movement;
pub mod snapshot;
