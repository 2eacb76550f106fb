//! Scripted run of the encounter: a raid pulls a helper, fights the
//! instructor down, and the outcome is logged.
//!
//! Usage: `praetor-sim [SEED] [--large] [--profile PATH]`
//! Log filter comes from `PRAETOR_LOG`, then `RUST_LOG`, default `info`.

use std::error::Error;

use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use praetor_sim::ai::profiles::EncounterProfile;
use praetor_sim::core::constants::{PRIMARY_PLACEMENT, TICK_RATE};
use praetor_sim::core::enums::{EncounterStatus, GroupSize};
use praetor_sim::core::events::PresentationEvent;
use praetor_sim::core::types::Placement;
use praetor_sim::{SimConfig, SimulationEngine};

/// Give up after this much simulated time.
const MAX_SECONDS: u64 = 600;

/// Damage each raider adds on top of auto-attacks, once per second.
const RAID_DPS: u32 = 12_000;

fn init_logging() {
    let directive = std::env::var("PRAETOR_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());
    let filter = EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();
}

fn parse_config() -> Result<SimConfig, Box<dyn Error>> {
    let mut config = SimConfig::default();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--large" => config.group_size = GroupSize::Large,
            "--profile" => {
                let path = args.next().ok_or("--profile needs a path")?;
                let json = std::fs::read_to_string(&path)?;
                config.profile = EncounterProfile::from_json(&json)?;
                info!(%path, "loaded encounter profile");
            }
            seed => config.seed = seed.parse()?,
        }
    }
    Ok(config)
}

fn main() -> Result<(), Box<dyn Error>> {
    init_logging();
    let config = parse_config()?;
    info!(seed = config.seed, group_size = ?config.group_size, "starting encounter");

    let mut engine = SimulationEngine::new(config.clone());
    let primary = engine.primary();
    let raid_size = if config.group_size.is_large() { 10 } else { 5 };
    let raid: Vec<_> = (0..raid_size)
        .map(|i| {
            let angle = i as f32 * std::f32::consts::TAU / raid_size as f32;
            let origin = PRIMARY_PLACEMENT.position;
            engine.add_player(Placement::new(
                origin.x + 30.0 * angle.cos(),
                origin.y + 30.0 * angle.sin(),
                origin.z,
                0.0,
            ))
        })
        .collect();

    // The tank opens on a helper; everyone else goes for the instructor.
    let helpers = engine.helpers();
    let opener = helpers.first().copied().unwrap_or(primary);
    engine.attack(raid[0], opener)?;
    for &player in &raid[1..] {
        engine.attack(player, primary)?;
    }

    let ticks_per_second = u64::from(TICK_RATE);
    for tick in 0..MAX_SECONDS * ticks_per_second {
        if tick % ticks_per_second == 0 {
            for &player in &raid {
                if engine.is_alive(player) {
                    engine.deal_damage(Some(player), primary, RAID_DPS)?;
                }
            }
        }

        let snapshot = engine.tick();
        for event in &snapshot.events {
            if let PresentationEvent::AbilityCast { caster, ability, .. } = event {
                info!(%caster, ability = ability.0, "cast");
            }
        }
        if snapshot.status == EncounterStatus::Done {
            info!(
                seconds = snapshot.time.elapsed.as_secs_f32(),
                invalid_kill_flag = snapshot.invalid_kill_flag,
                player_damage_requirement = snapshot.player_damage_requirement,
                "instructor defeated"
            );
            return Ok(());
        }
    }

    info!(status = ?engine.status(), "encounter did not finish");
    Ok(())
}
