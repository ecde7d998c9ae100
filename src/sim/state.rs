//! Match state and core simulation types
//!
//! Everything the simulation mutates lives in [`MatchState`]. Subsystems take
//! it by reference; players are addressed by [`PlayerId`] (an index into the
//! player table), never by shared pointers.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::ContactEvent;
use super::faceoff::{self, FaceoffLocation};
use super::goal::{Net, RinkEnd};
use super::possession;
use super::roles::SteeringRole;
use super::steering::Agent;
use super::timers::Timers;
use crate::config::{MatchConfig, TeamColor};
use crate::consts::*;
use crate::local_to_world;
use crate::scoreboard::GameClock;

/// Index into [`MatchState::players`]
pub type PlayerId = u32;

/// Which bench a player belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeamSide {
    /// User-controlled team
    Home,
    /// AI-controlled opposing team
    Away,
}

impl TeamSide {
    pub fn opponent(self) -> TeamSide {
        match self {
            TeamSide::Home => TeamSide::Away,
            TeamSide::Away => TeamSide::Home,
        }
    }

    pub fn is_user(self) -> bool {
        self == TeamSide::Home
    }

    /// Net this side shoots at
    pub fn attacking_end(self) -> RinkEnd {
        match self {
            TeamSide::Home => RinkEnd::Top,
            TeamSide::Away => RinkEnd::Bottom,
        }
    }

    /// Net this side protects
    pub fn defending_end(self) -> RinkEnd {
        self.attacking_end().opposite()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TeamSide::Home => "Home",
            TeamSide::Away => "Away",
        }
    }
}

/// Position role on the ice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerPosition {
    LeftWing = 0,
    RightWing = 1,
    Center = 2,
    LeftDefense = 3,
    RightDefense = 4,
    Goalie = 5,
}

impl PlayerPosition {
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(PlayerPosition::LeftWing),
            1 => Some(PlayerPosition::RightWing),
            2 => Some(PlayerPosition::Center),
            3 => Some(PlayerPosition::LeftDefense),
            4 => Some(PlayerPosition::RightDefense),
            5 => Some(PlayerPosition::Goalie),
            _ => None,
        }
    }

    pub fn is_forward(self) -> bool {
        matches!(
            self,
            PlayerPosition::LeftWing | PlayerPosition::RightWing | PlayerPosition::Center
        )
    }

    pub fn is_defenseman(self) -> bool {
        matches!(self, PlayerPosition::LeftDefense | PlayerPosition::RightDefense)
    }

    pub fn is_goalie(self) -> bool {
        self == PlayerPosition::Goalie
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PlayerPosition::LeftWing => "LW",
            PlayerPosition::RightWing => "RW",
            PlayerPosition::Center => "C",
            PlayerPosition::LeftDefense => "LD",
            PlayerPosition::RightDefense => "RD",
            PlayerPosition::Goalie => "G",
        }
    }
}

/// Which way the carrier is pulling the puck
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DekeSide {
    #[default]
    None,
    Left,
    Right,
}

/// Who drives a player's movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlMode {
    /// Selected player, moved directly by user input
    UserControlled,
    /// Steered by its agent using the given role
    AiControlled(SteeringRole),
}

/// A skater
#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub side: TeamSide,
    pub position: PlayerPosition,
    pub color: TeamColor,
    /// Authoritative position (what a renderer draws)
    pub pos: Vec2,
    pub vel: Vec2,
    /// Facing direction (radians, 0 = +x)
    pub heading: f32,
    pub has_puck: bool,
    pub control: ControlMode,
    pub agent: Agent,
    /// Cleared for a short window after passing, shooting or losing the puck
    pub collision_enabled: bool,
    pub deke: DekeSide,
    /// User player is actively skating (controls held)
    pub skating: bool,
}

impl Player {
    pub fn is_selected(&self) -> bool {
        self.control == ControlMode::UserControlled
    }

    pub fn role(&self) -> Option<SteeringRole> {
        match self.control {
            ControlMode::AiControlled(role) => Some(role),
            ControlMode::UserControlled => None,
        }
    }

    /// Where the puck sits on this player's stick
    pub fn stick_position(&self) -> Vec2 {
        let x = match self.deke {
            DekeSide::Left => STICK_DEKE_LEFT_X,
            DekeSide::Right => STICK_DEKE_RIGHT_X,
            DekeSide::None if self.skating || self.vel.length_squared() > 1.0 => STICK_SKATING_X,
            DekeSide::None => STICK_IDLE_X,
        };
        local_to_world(self.pos, self.heading, Vec2::new(x, STICK_FORWARD))
    }
}

/// A team's bench: side, jersey color, and roster in position order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub side: TeamSide,
    pub color: TeamColor,
    pub roster: Vec<PlayerId>,
}

/// Puck ownership
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PuckState {
    /// Sliding on the ice
    Free,
    /// On a player's stick
    Held(PlayerId),
}

/// The puck
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Puck {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub state: PuckState,
}

impl Puck {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            radius: PUCK_RADIUS,
            state: PuckState::Free,
        }
    }

    pub fn carrier(&self) -> Option<PlayerId> {
        match self.state {
            PuckState::Held(id) => Some(id),
            PuckState::Free => None,
        }
    }

    pub fn is_free(&self) -> bool {
        self.state == PuckState::Free
    }
}

/// Goals per side
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub home: u32,
    pub away: u32,
}

impl Score {
    /// Credit a goal and return the new total for that side
    pub fn record(&mut self, side: TeamSide) -> u32 {
        match side {
            TeamSide::Home => {
                self.home += 1;
                self.home
            }
            TeamSide::Away => {
                self.away += 1;
                self.away
            }
        }
    }

    pub fn get(&self, side: TeamSide) -> u32 {
        match side {
            TeamSide::Home => self.home,
            TeamSide::Away => self.away,
        }
    }
}

/// Current phase of play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Puck is live
    Playing,
    /// Goal scored, play frozen until the window ends or is dismissed
    Celebration,
    /// Game is paused
    Paused,
    /// Period clock ran out
    GameOver,
}

/// How the puck left a player's stick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReleaseKind {
    Pass { to: PlayerId },
    Shot { at: RinkEnd },
    KnockedLoose { by: PlayerId },
    /// Detached because a goal was scored
    Goal,
}

/// Outgoing notifications for the scoreboard, overlay, and audio hosts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    PuckPickedUp {
        player: PlayerId,
        side: TeamSide,
    },
    PuckReleased {
        player: PlayerId,
        kind: ReleaseKind,
    },
    SelectionChanged {
        from: Option<PlayerId>,
        to: PlayerId,
    },
    RolesReassigned {
        offense: Option<TeamSide>,
    },
    GoalScored {
        side: TeamSide,
        home: u32,
        away: u32,
    },
    PlayResumed,
    PuckHitBoards,
    PeriodEnded {
        home: u32,
        away: u32,
    },
}

/// Complete match state
#[derive(Debug, Clone)]
pub struct MatchState {
    pub config: MatchConfig,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub phase: GamePhase,
    /// Ticks left in the goal celebration window
    pub celebration_ticks: u32,
    /// Player table (sorted by id)
    pub players: Vec<Player>,
    pub home: Team,
    pub away: Team,
    pub puck: Puck,
    /// Top and bottom nets
    pub nets: [Net; 2],
    pub score: Score,
    /// Period countdown (runs only while playing)
    pub clock: GameClock,
    /// Contacts detected this tick, drained by the possession machine
    pub contacts: Vec<ContactEvent>,
    pub timers: Timers,
    /// Events for the host (drain with [`MatchState::drain_events`])
    pub events: Vec<GameEvent>,
    pub rng: Pcg32,
}

impl MatchState {
    /// Build both teams, drop the puck at center ice, and select the user
    /// player closest to it
    pub fn new(config: MatchConfig) -> Self {
        let rng = Pcg32::seed_from_u64(config.seed);
        let mut state = Self {
            time_ticks: 0,
            phase: GamePhase::Playing,
            celebration_ticks: 0,
            players: Vec::new(),
            home: Team {
                side: TeamSide::Home,
                color: config.home_color,
                roster: Vec::new(),
            },
            away: Team {
                side: TeamSide::Away,
                color: TeamColor::White,
                roster: Vec::new(),
            },
            puck: Puck::new(FaceoffLocation::CenterIce.coordinate()),
            nets: [Net::new(RinkEnd::Top), Net::new(RinkEnd::Bottom)],
            score: Score::default(),
            clock: GameClock::new(config.period_secs),
            contacts: Vec::new(),
            timers: Timers::default(),
            events: Vec::new(),
            rng,
            config,
        };

        state.generate_teams();
        faceoff::reset_for_faceoff(&mut state, FaceoffLocation::CenterIce);
        // Opening faceoff is not a resumption
        state.events.clear();

        log::info!(
            "Match ready: {}v{}, home in {}",
            state.home.roster.len(),
            state.away.roster.len(),
            state.home.color.as_str()
        );

        state
    }

    fn generate_teams(&mut self) {
        let count = self.config.team_size.count();
        for side in [TeamSide::Home, TeamSide::Away] {
            let color = self.team(side).color;
            for index in 0..count {
                let Some(position) = PlayerPosition::from_index(index) else {
                    continue;
                };
                let id = self.players.len() as PlayerId;
                self.players.push(Player {
                    id,
                    side,
                    position,
                    color,
                    pos: Vec2::ZERO,
                    vel: Vec2::ZERO,
                    heading: 0.0,
                    has_puck: false,
                    control: ControlMode::AiControlled(SteeringRole::ChasePuck),
                    agent: Agent::new(&self.config.agent),
                    collision_enabled: true,
                    deke: DekeSide::None,
                    skating: false,
                });
                self.team_mut(side).roster.push(id);
            }
        }
    }

    #[inline]
    pub fn player(&self, id: PlayerId) -> &Player {
        &self.players[id as usize]
    }

    #[inline]
    pub fn player_mut(&mut self, id: PlayerId) -> &mut Player {
        &mut self.players[id as usize]
    }

    pub fn team(&self, side: TeamSide) -> &Team {
        match side {
            TeamSide::Home => &self.home,
            TeamSide::Away => &self.away,
        }
    }

    pub fn team_mut(&mut self, side: TeamSide) -> &mut Team {
        match side {
            TeamSide::Home => &mut self.home,
            TeamSide::Away => &mut self.away,
        }
    }

    /// Players on a side, in roster order
    pub fn roster(&self, side: TeamSide) -> impl Iterator<Item = &Player> + '_ {
        self.team(side).roster.iter().map(move |&id| self.player(id))
    }

    pub fn forwards(&self, side: TeamSide) -> Vec<PlayerId> {
        self.roster(side)
            .filter(|p| p.position.is_forward())
            .map(|p| p.id)
            .collect()
    }

    pub fn defensemen(&self, side: TeamSide) -> Vec<PlayerId> {
        self.roster(side)
            .filter(|p| p.position.is_defenseman())
            .map(|p| p.id)
            .collect()
    }

    pub fn goalie(&self, side: TeamSide) -> Option<PlayerId> {
        self.roster(side).find(|p| p.position.is_goalie()).map(|p| p.id)
    }

    pub fn player_with_position(&self, side: TeamSide, position: PlayerPosition) -> Option<PlayerId> {
        self.roster(side).find(|p| p.position == position).map(|p| p.id)
    }

    /// The player holding the puck, if any
    pub fn puck_carrier(&self) -> Option<PlayerId> {
        self.puck.carrier()
    }

    pub fn team_has_puck(&self, side: TeamSide) -> bool {
        self.puck_carrier()
            .is_some_and(|id| self.player(id).side == side)
    }

    /// The user team's selected player
    pub fn selected_player(&self) -> Option<PlayerId> {
        self.roster(TeamSide::Home).find(|p| p.is_selected()).map(|p| p.id)
    }

    pub fn net(&self, end: RinkEnd) -> &Net {
        match end {
            RinkEnd::Top => &self.nets[0],
            RinkEnd::Bottom => &self.nets[1],
        }
    }

    /// Keep the puck glued to its carrier's stick
    pub fn sync_held_puck(&mut self) {
        if let Some(id) = self.puck_carrier() {
            self.puck.pos = self.player(id).stick_position();
            self.puck.vel = self.player(id).vel;
        }
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all events produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Stop play for good (period clock ran out)
    pub fn end_period(&mut self) {
        if self.phase == GamePhase::GameOver {
            return;
        }
        self.phase = GamePhase::GameOver;
        self.clock.pause();
        possession::drop_puck(self);
        log::info!(
            "Period over: Home {} - Away {}",
            self.score.home,
            self.score.away
        );
        self.push_event(GameEvent::PeriodEnded {
            home: self.score.home,
            away: self.score.away,
        });
    }

    /// Read-only view for a renderer
    pub fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot {
            tick: self.time_ticks,
            phase: self.phase,
            score: self.score,
            clock_remaining: self.clock.remaining(),
            puck: self.puck.pos,
            puck_carrier: self.puck_carrier(),
            players: self
                .players
                .iter()
                .map(|p| PlayerSnapshot {
                    id: p.id,
                    side: p.side,
                    position: p.position,
                    color: p.color,
                    pos: p.pos,
                    heading: p.heading,
                    selected: p.is_selected(),
                    has_puck: p.has_puck,
                    role: p.role(),
                })
                .collect(),
        }
    }
}

/// Per-player data a renderer needs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub side: TeamSide,
    pub position: PlayerPosition,
    pub color: TeamColor,
    pub pos: Vec2,
    pub heading: f32,
    pub selected: bool,
    pub has_puck: bool,
    pub role: Option<SteeringRole>,
}

/// Serializable frame of the match
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub tick: u64,
    pub phase: GamePhase,
    pub score: Score,
    pub clock_remaining: f32,
    pub puck: Vec2,
    pub puck_carrier: Option<PlayerId>,
    pub players: Vec<PlayerSnapshot>,
}
