//! Top Shelf entry point
//!
//! Runs a headless match: the autopilot drives the user team, events feed
//! the scoreboard, and the final frame is printed as JSON.

use top_shelf::consts::*;
use top_shelf::input::{ControlKey, InputState};
use top_shelf::sim::{FixedStep, GameEvent, GamePhase, MatchState};
use top_shelf::{MatchConfig, Scoreboard, TeamSize};

/// Host frame time for the headless loop (a slightly uneven 60 Hz display)
const FRAME_DT: f32 = 1.0 / 58.0;

fn load_config() -> Option<MatchConfig> {
    let mut config = match std::env::args().nth(1) {
        Some(path) => match MatchConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("{e}");
                return None;
            }
        },
        None => MatchConfig::default(),
    };

    if let Ok(size) = std::env::var("TOP_SHELF_TEAM_SIZE") {
        match TeamSize::from_str(&size) {
            Some(size) => config.team_size = size,
            None => log::warn!("Ignoring TOP_SHELF_TEAM_SIZE={size}: expected 3, 4 or 5"),
        }
    }

    if let Ok(seed) = std::env::var("TOP_SHELF_SEED") {
        match seed.parse() {
            Ok(seed) => config.seed = seed,
            Err(_) => log::warn!("Ignoring TOP_SHELF_SEED={seed}: not a number"),
        }
    }

    Some(config)
}

fn main() {
    env_logger::init();
    log::info!("Top Shelf (headless) starting...");

    let Some(config) = load_config() else {
        std::process::exit(1);
    };
    log::info!(
        "{} skaters a side, {}s period, seed {}",
        config.team_size.count(),
        config.period_secs,
        config.seed
    );

    let mut state = MatchState::new(config);
    let mut scoreboard = Scoreboard::new(&state.clock);
    let mut stepper = FixedStep::default();
    let mut input = InputState::default();

    let mut frame: u64 = 0;
    while state.phase != GamePhase::GameOver {
        // A short scripted opening before the autopilot takes over
        match frame {
            1 => input.key_down(ControlKey::Up),
            20 => input.key_down(ControlKey::Right),
            40 => {
                input.key_up(ControlKey::Right);
                input.key_up(ControlKey::Up);
                input.set_idle_mode(true);
            }
            _ => {}
        }

        stepper.advance(&mut state, input.frame_input(), FRAME_DT);

        for event in state.drain_events() {
            match &event {
                GameEvent::GoalScored { .. } | GameEvent::PeriodEnded { .. } => {
                    log::info!("{event:?}")
                }
                GameEvent::PuckHitBoards | GameEvent::RolesReassigned { .. } => {
                    log::trace!("{event:?}")
                }
                _ => log::debug!("{event:?}"),
            }
            scoreboard.apply(&event);
        }
        scoreboard.sync_clock(&state.clock);

        if frame % (60 * 30) == 0 {
            log::info!("{} | {}", scoreboard.clock_text, scoreboard.summary());
        }
        frame += 1;
    }

    println!("Final: {}", scoreboard.summary());
    println!(
        "Played {} ticks ({:.1}s of game time)",
        state.time_ticks,
        state.time_ticks as f32 * SIM_DT
    );
    match serde_json::to_string_pretty(&state.snapshot()) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Failed to serialize snapshot: {e}"),
    }
}
