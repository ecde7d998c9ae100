//! Nets and goal detection
//!
//! Goal detection runs once per tick while the puck is live. A goal freezes
//! play for the celebration window; the faceoff reset happens when the
//! window runs out or the user dismisses it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::Rect;
use super::possession;
use super::state::{GameEvent, GamePhase, MatchState, TeamSide};
use crate::consts::*;

/// Which end of the rink a net sits at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RinkEnd {
    Top,
    Bottom,
}

impl RinkEnd {
    pub fn opposite(self) -> RinkEnd {
        match self {
            RinkEnd::Top => RinkEnd::Bottom,
            RinkEnd::Bottom => RinkEnd::Top,
        }
    }

    /// Team credited when the puck goes in at this end
    pub fn credited_side(self) -> TeamSide {
        match self {
            RinkEnd::Top => TeamSide::Home,
            RinkEnd::Bottom => TeamSide::Away,
        }
    }

    /// Unit vector out of the net mouth toward center ice
    pub fn mouth_normal(self) -> Vec2 {
        match self {
            RinkEnd::Top => Vec2::NEG_Y,
            RinkEnd::Bottom => Vec2::Y,
        }
    }
}

/// A goal net: fixed frame with its mouth facing center ice
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Net {
    pub end: RinkEnd,
    pub center: Vec2,
    pub frame: Rect,
}

impl Net {
    pub fn new(end: RinkEnd) -> Self {
        let center = match end {
            RinkEnd::Top => Vec2::new(NET_X, NET_Y),
            RinkEnd::Bottom => Vec2::new(NET_X, -NET_Y),
        };
        Self {
            end,
            center,
            frame: Rect::new(center, Vec2::new(NET_WIDTH, NET_DEPTH)),
        }
    }

    /// Puck strictly inside the frame
    pub fn contains(&self, point: Vec2) -> bool {
        self.frame.contains_point(point)
    }

    /// Whether `point` is on the open (mouth) side of the net
    pub fn is_in_front(&self, point: Vec2) -> bool {
        (point - self.center).dot(self.end.mouth_normal()) > 0.0
    }

    /// Whether `point` lies beyond the mouth line, out toward center ice
    pub fn is_past_mouth(&self, point: Vec2) -> bool {
        (point - self.center).dot(self.end.mouth_normal()) >= self.frame.half_extents.y
    }
}

/// Net the puck currently counts as being in, if any
pub fn puck_in_net(state: &MatchState) -> Option<RinkEnd> {
    let carrier = state.puck_carrier().map(|id| state.player(id));
    state
        .nets
        .iter()
        .find(|net| {
            if !net.contains(state.puck.pos) {
                return false;
            }
            match carrier {
                // A carried puck only counts from in front of the net
                Some(player) => net.is_in_front(player.pos),
                None => true,
            }
        })
        .map(|net| net.end)
}

/// Score a goal if the puck is in a net. Returns the credited side.
pub fn check_goal(state: &mut MatchState) -> Option<TeamSide> {
    if state.phase != GamePhase::Playing {
        return None;
    }
    let end = puck_in_net(state)?;
    let side = end.credited_side();
    score_goal(state, side);
    Some(side)
}

/// Credit a goal and freeze play for the celebration
pub fn score_goal(state: &mut MatchState, side: TeamSide) {
    state.score.record(side);
    possession::drop_puck(state);
    state.puck.vel = Vec2::ZERO;
    for player in &mut state.players {
        player.vel = Vec2::ZERO;
        player.agent.velocity = Vec2::ZERO;
        player.skating = false;
    }

    state.phase = GamePhase::Celebration;
    state.celebration_ticks = state.config.celebration_ticks();
    state.clock.pause();

    log::info!(
        "GOAL {}! Home {} - Away {}",
        side.as_str(),
        state.score.home,
        state.score.away
    );
    state.push_event(GameEvent::GoalScored {
        side,
        home: state.score.home,
        away: state.score.away,
    });
}
