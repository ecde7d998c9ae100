//! Faceoff locations and lineups
//!
//! Player placement is a pure function of side, position and location.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::possession;
use super::roles;
use super::state::{DekeSide, GamePhase, MatchState, PlayerPosition, PuckState, TeamSide};
use crate::consts::*;
use crate::heading_to_face;

/// Forward offset from the dot
const FORWARD_DEPTH: f32 = PLAYER_HEIGHT / 1.9;
/// Wingers line up on the edge of the circle
const WING_SPREAD: f32 = CENTER_CIRCLE_WIDTH / 2.0;
/// Defense depth behind the dot
const DEFENSE_DEPTH: f32 = CENTER_CIRCLE_WIDTH / 2.0;
const DEFENSE_SPREAD: f32 = CENTER_CIRCLE_WIDTH / 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FaceoffLocation {
    OffsideTopRight,
    OffsideTopLeft,
    OffsideBottomRight,
    OffsideBottomLeft,
    CenterIce,
}

impl FaceoffLocation {
    pub const ALL: [FaceoffLocation; 5] = [
        FaceoffLocation::OffsideTopRight,
        FaceoffLocation::OffsideTopLeft,
        FaceoffLocation::OffsideBottomRight,
        FaceoffLocation::OffsideBottomLeft,
        FaceoffLocation::CenterIce,
    ];

    /// Faceoff dot
    pub fn coordinate(self) -> Vec2 {
        match self {
            FaceoffLocation::OffsideTopRight => Vec2::new(126.0, 147.0),
            FaceoffLocation::OffsideTopLeft => Vec2::new(-126.0, 147.0),
            FaceoffLocation::OffsideBottomRight => Vec2::new(126.0, -147.0),
            FaceoffLocation::OffsideBottomLeft => Vec2::new(-126.0, -147.0),
            FaceoffLocation::CenterIce => Vec2::ZERO,
        }
    }

    /// Where a player lines up for this faceoff
    pub fn player_position(self, side: TeamSide, position: PlayerPosition) -> Vec2 {
        let dot = self.coordinate();
        // Home lines up below the dot, away above it; wings mirror
        let (depth_sign, wing_sign) = match side {
            TeamSide::Home => (-1.0, 1.0),
            TeamSide::Away => (1.0, -1.0),
        };

        let offset = match position {
            PlayerPosition::Center => Vec2::new(0.0, depth_sign * FORWARD_DEPTH),
            PlayerPosition::LeftWing => Vec2::new(-wing_sign * WING_SPREAD, depth_sign * FORWARD_DEPTH),
            PlayerPosition::RightWing => Vec2::new(wing_sign * WING_SPREAD, depth_sign * FORWARD_DEPTH),
            PlayerPosition::LeftDefense => Vec2::new(-DEFENSE_SPREAD, depth_sign * DEFENSE_DEPTH),
            PlayerPosition::RightDefense => Vec2::new(DEFENSE_SPREAD, depth_sign * DEFENSE_DEPTH),
            PlayerPosition::Goalie => Vec2::ZERO,
        };

        dot + offset
    }
}

/// Move every player to their spot for `location`, facing the dot
pub fn position_players(state: &mut MatchState, location: FaceoffLocation) {
    let dot = location.coordinate();
    for player in &mut state.players {
        player.pos = location.player_position(player.side, player.position);
        player.heading = heading_to_face(player.pos, dot);
        player.vel = Vec2::ZERO;
        player.agent.position = player.pos;
        player.agent.velocity = Vec2::ZERO;
        player.deke = DekeSide::None;
        player.skating = false;
        player.collision_enabled = true;
    }
}

/// Drop the puck at `location` and restart play
pub fn reset_for_faceoff(state: &mut MatchState, location: FaceoffLocation) {
    possession::drop_puck(state);
    state.puck.pos = location.coordinate();
    state.puck.vel = Vec2::ZERO;
    state.puck.state = PuckState::Free;
    state.contacts.clear();

    position_players(state, location);
    roles::reassign_for_possession(state);
    if let Some(closest) = possession::closest_user_player(state) {
        possession::select_player(state, closest);
    }

    state.phase = GamePhase::Playing;
    state.celebration_ticks = 0;
    state.clock.resume();
    state.push_event(super::GameEvent::PlayResumed);
}
