//! Fixed timestep simulation tick
//!
//! Order within a tick: pause, celebration, timers, clock, user actions,
//! user movement, AI steering, AI carrier decision, integration, collisions,
//! possession, goal detection.

use glam::Vec2;

use super::collision;
use super::faceoff::{self, FaceoffLocation};
use super::goal::{self, RinkEnd};
use super::possession;
use super::state::{DekeSide, GamePhase, MatchState, TeamSide};
use super::steering::SteeringWorld;
use super::timers;
use crate::consts::*;
use crate::direction;

/// Autopilot shoots from inside this range of the net
const AUTOPILOT_SHOT_RANGE: f32 = 160.0;
/// Ticks between autopilot selection switches
const AUTOPILOT_SWITCH_INTERVAL: u64 = 90;

/// Deke commands from the arrow keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DekeCommand {
    Left,
    Right,
    /// Key released, puck back to the normal stick position
    Release,
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    /// Raw movement direction for the selected player (None = not skating)
    pub movement: Option<Vec2>,
    /// Shoot at the top net
    pub shoot: bool,
    /// Pass if holding the puck, then switch to the player closest to it
    pub switch_player: bool,
    pub deke: Option<DekeCommand>,
    /// Any input at all; ends the goal celebration early
    pub dismiss: bool,
    /// Pause toggle
    pub pause: bool,
    /// Demo mode - the autopilot drives the selected player
    pub idle_mode: bool,
}

impl TickInput {
    /// Clear one-shot inputs after they've been consumed
    pub fn clear_one_shots(&mut self) {
        self.shoot = false;
        self.switch_player = false;
        self.deke = None;
        self.dismiss = false;
        self.pause = false;
    }
}

/// Advance the match by one fixed timestep
pub fn tick(state: &mut MatchState, input: &TickInput, dt: f32) {
    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                state.clock.pause();
                return;
            }
            GamePhase::Paused => {
                state.phase = GamePhase::Playing;
                state.clock.resume();
            }
            _ => {}
        }
    }

    match state.phase {
        GamePhase::Paused | GamePhase::GameOver => return,
        GamePhase::Celebration => {
            state.celebration_ticks = state.celebration_ticks.saturating_sub(1);
            if input.dismiss || state.celebration_ticks == 0 {
                faceoff::reset_for_faceoff(state, FaceoffLocation::CenterIce);
            }
            return;
        }
        GamePhase::Playing => {}
    }

    state.time_ticks += 1;
    timers::fire_due_timers(state);

    if state.clock.advance(dt) {
        state.end_period();
        return;
    }

    let mut input = input.clone();
    if input.idle_mode {
        autopilot(state, &mut input);
    }
    let input = &input;

    apply_user_actions(state, input);
    move_user_player(state, input, dt);
    steer_agents(state, dt);
    possession::opponent_carrier_decision(state);

    let prev_puck = integrate(state, dt);

    collision::resolve_boards(state);
    collision::resolve_nets(state, prev_puck);
    collision::detect_contacts(state);
    possession::process_contacts(state);
    state.sync_held_puck();

    goal::check_goal(state);
}

fn apply_user_actions(state: &mut MatchState, input: &TickInput) {
    if input.switch_player {
        possession::select_closest_to_puck(state);
    }

    let Some(id) = state.selected_player() else {
        return;
    };

    if input.shoot && state.player(id).has_puck {
        possession::shoot_puck(state, id, TeamSide::Home.attacking_end());
    }

    if let Some(deke) = input.deke {
        let player = state.player_mut(id);
        if player.has_puck {
            player.deke = match deke {
                DekeCommand::Left => DekeSide::Left,
                DekeCommand::Right => DekeSide::Right,
                DekeCommand::Release => DekeSide::None,
            };
        }
    }
}

/// Direct control: fixed step while skating, decaying glide after
fn move_user_player(state: &mut MatchState, input: &TickInput, dt: f32) {
    let Some(id) = state.selected_player() else {
        return;
    };
    let step = state.config.user_skate_step;
    let player = state.player_mut(id);

    match input.movement.and_then(|m| m.try_normalize()) {
        Some(dir) => {
            player.heading = dir.y.atan2(dir.x);
            player.vel = dir * (step / dt);
            player.skating = true;
        }
        None if player.skating => {
            player.skating = false;
            player.vel = direction(player.heading) * GLIDE_SPEED;
        }
        None => {
            player.vel *= (1.0 - GLIDE_DAMPING * dt).max(0.0);
        }
    }
}

/// Run every AI agent against the start-of-frame world
fn steer_agents(state: &mut MatchState, dt: f32) {
    let world = SteeringWorld::capture(state);

    for player in state.players.iter_mut() {
        if player.is_selected() {
            continue;
        }
        player.agent.update(player.id, &world, &mut state.rng, dt);
        player.vel = player.agent.velocity;
        if player.vel.length_squared() > 1.0 {
            player.heading = player.vel.y.atan2(player.vel.x);
        }
    }
}

/// Move everything; returns where the puck was before moving
fn integrate(state: &mut MatchState, dt: f32) -> Vec2 {
    let prev_puck = state.puck.pos;

    for player in state.players.iter_mut() {
        player.pos += player.vel * dt;
        player.agent.position = player.pos;
    }

    if state.puck.is_free() {
        state.puck.vel *= (1.0 - PUCK_DAMPING * dt).max(0.0);
        state.puck.pos += state.puck.vel * dt;
    } else {
        state.sync_held_puck();
    }

    prev_puck
}

/// Demo driver for the selected player
fn autopilot(state: &MatchState, input: &mut TickInput) {
    let Some(id) = state.selected_player() else {
        return;
    };
    let player = state.player(id);
    let net = state.net(RinkEnd::Top).center;

    if player.has_puck {
        if player.pos.distance(net) < AUTOPILOT_SHOT_RANGE {
            input.shoot = true;
        } else {
            input.movement = Some(net - player.pos);
        }
        return;
    }

    input.movement = Some(state.puck.pos - player.pos);

    // Hand off to a teammate who is much closer to a loose puck
    if state.puck.is_free() && state.time_ticks % AUTOPILOT_SWITCH_INTERVAL == 0 {
        let mine = player.pos.distance(state.puck.pos);
        let nearest = state
            .roster(TeamSide::Home)
            .filter(|p| p.id != id)
            .map(|p| p.pos.distance(state.puck.pos))
            .fold(f32::INFINITY, f32::min);
        if nearest * 2.0 < mine {
            input.switch_player = true;
        }
    }
}

/// Host-side accumulator that runs whole ticks for a variable frame time
#[derive(Debug, Clone, Default)]
pub struct FixedStep {
    accumulator: f32,
}

impl FixedStep {
    /// Run as many ticks as `frame_dt` covers (capped at `MAX_SUBSTEPS`).
    /// One-shot inputs are cleared after the first tick that sees them; a
    /// frame too short for a tick leaves them pending.
    pub fn advance(&mut self, state: &mut MatchState, input: &mut TickInput, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick(state, input, SIM_DT);
            input.clear_one_shots();
            self.accumulator -= SIM_DT;
            substeps += 1;
        }

        if substeps == MAX_SUBSTEPS {
            self.accumulator = 0.0;
        }
        substeps
    }
}
