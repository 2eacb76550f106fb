//! Core types and definitions for the PRAETOR encounter.
//!
//! This crate defines the vocabulary shared across all other crates:
//! identity handles, components, stimuli, presentation events, snapshots,
//! and constants. It has no dependency on any runtime or decision logic.

pub mod commands;
pub mod components;
pub mod constants;
pub mod enums;
pub mod events;
pub mod state;
pub mod types;
