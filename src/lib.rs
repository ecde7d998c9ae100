//! Top Shelf - A top-down 2D hockey game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (steering AI, possession, physics, goals)
//! - `input`: Keyboard and joystick input folded into per-tick commands
//! - `scoreboard`: Score and game clock model driven by simulation events
//! - `config`: Match configuration (JSON) with validation

pub mod config;
pub mod error;
pub mod input;
pub mod scoreboard;
pub mod sim;

pub use config::{AgentTuning, MatchConfig, TeamColor, TeamSize};
pub use error::ConfigError;
pub use scoreboard::Scoreboard;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one tick per rendered frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Rink scene dimensions (origin at center ice)
    pub const RINK_WIDTH: f32 = 728.0;
    pub const RINK_HEIGHT: f32 = 1024.0;
    /// Playing surface inside the boards
    pub const BOARDS_HALF_WIDTH: f32 = 256.5;
    pub const BOARDS_HALF_HEIGHT: f32 = 512.0;
    pub const BOARDS_CORNER_RADIUS: f32 = RINK_WIDTH / 6.0;
    pub const CENTER_CIRCLE_WIDTH: f32 = 155.0;

    /// Player sprite footprint
    pub const PLAYER_WIDTH: f32 = 25.0;
    pub const PLAYER_HEIGHT: f32 = 50.0;
    pub const PLAYER_RADIUS: f32 = PLAYER_WIDTH / 2.0;
    /// Per-frame displacement of the user-controlled player
    pub const USER_SKATE_STEP: f32 = 3.0;
    /// Glide speed after the user lets go of the controls
    pub const GLIDE_SPEED: f32 = 75.0;
    /// Glide decay per second (fraction of speed lost)
    pub const GLIDE_DAMPING: f32 = 2.5;

    /// Steering agent defaults
    pub const AGENT_MAX_SPEED: f32 = 150.0;
    pub const AGENT_MAX_ACCELERATION: f32 = 100.0;
    pub const AGENT_MASS: f32 = 0.3;

    /// Puck
    pub const PUCK_DIAMETER: f32 = 4.0;
    pub const PUCK_RADIUS: f32 = PUCK_DIAMETER / 2.0;
    /// Linear damping applied to a free puck (per second)
    pub const PUCK_DAMPING: f32 = 0.1;
    /// Speed lost against the boards
    pub const PUCK_BOARD_RESTITUTION: f32 = 0.5;
    /// Stick offsets in the carrier's local frame (x across, y forward)
    pub const STICK_FORWARD: f32 = 17.0;
    pub const STICK_IDLE_X: f32 = -9.0;
    pub const STICK_SKATING_X: f32 = -4.0;
    pub const STICK_DEKE_LEFT_X: f32 = -15.0;
    pub const STICK_DEKE_RIGHT_X: f32 = 7.0;

    /// Shot and pass strength; launch speed = magnitude * PUCK_IMPULSE_SCALE
    pub const SHOT_MAGNITUDE: f32 = 10.0;
    pub const PASS_MAGNITUDE: f32 = 3.5;
    pub const PUCK_IMPULSE_SCALE: f32 = 90.0;
    /// Speed of a puck knocked off a carrier's stick
    pub const KNOCK_LOOSE_SPEED: f32 = 60.0;
    /// Collision is re-enabled this long after a pass or shot
    pub const RELEASE_COOLDOWN_SECS: f32 = 0.5;

    /// Nets
    pub const NET_WIDTH: f32 = 55.0;
    pub const NET_DEPTH: f32 = 21.9;
    pub const NET_X: f32 = 2.0;
    pub const NET_Y: f32 = 452.0;

    /// Goal celebration window before the faceoff
    pub const CELEBRATION_SECS: f32 = 5.0;
    /// Default period length
    pub const PERIOD_SECS: f32 = 300.0;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Unit vector pointing along `angle`
#[inline]
pub fn direction(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Heading (radians) that faces `target` from `from`
#[inline]
pub fn heading_to_face(from: Vec2, target: Vec2) -> f32 {
    let d = target - from;
    d.y.atan2(d.x)
}

/// Rotate a point in a player's local frame (y forward) into world space
#[inline]
pub fn local_to_world(origin: Vec2, heading: f32, local: Vec2) -> Vec2 {
    // Local +y is the facing direction, local +x is to the right of it
    let forward = direction(heading);
    let right = Vec2::new(forward.y, -forward.x);
    origin + right * local.x + forward * local.y
}
