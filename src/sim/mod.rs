//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by player ID)
//! - No rendering or platform dependencies

pub mod collision;
pub mod faceoff;
pub mod geometry;
pub mod goal;
pub mod possession;
pub mod roles;
pub mod sdf;
pub mod state;
pub mod steering;
pub mod tick;
pub mod timers;

pub use collision::{CollisionResult, ContactEvent, circle_circle};
pub use faceoff::FaceoffLocation;
pub use geometry::Rect;
pub use goal::{Net, RinkEnd};
pub use possession::{PASS_SPEED, SHOT_SPEED, select_closest_to_puck};
pub use roles::SteeringRole;
pub use sdf::{check_board_collision, reflect, sd_boards};
pub use state::{
    ControlMode, DekeSide, GameEvent, GamePhase, MatchSnapshot, MatchState, Player, PlayerId,
    PlayerPosition, Puck, PuckState, ReleaseKind, Score, Team, TeamSide,
};
pub use steering::{Agent, GoalKind, SteeringGoal, SteeringTarget, WeightedGoal};
pub use tick::{DekeCommand, FixedStep, TickInput, tick};
pub use timers::{TimerAction, Timers};
