//! AI steering roles
//!
//! A [`SteeringRole`] is a discrete behavior (chase the puck, defend the net,
//! ...) that resolves into a weighted list of steering goals. Goals are
//! resolved when a role is applied: the puck carrier and rosters are looked
//! up then, while target positions are read live every frame.

use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_2, PI};

use super::state::{ControlMode, MatchState, PlayerId, TeamSide};
use super::steering::{GoalKind, SteeringGoal, SteeringTarget, WeightedGoal};
use crate::sim::GameEvent;

/// Avoidance look-ahead in seconds
pub const AVOID_PREDICTION_SECS: f32 = 0.2;
/// Speed used by the wander role
pub const WANDER_SPEED: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SteeringRole {
    ChasePuck,
    DefendGoal,
    SupportPuckCarrier,
    AttackPuckCarrier,
    AttackGoal,
    Wander,
}

impl SteeringRole {
    pub fn as_str(self) -> &'static str {
        match self {
            SteeringRole::ChasePuck => "chase puck",
            SteeringRole::DefendGoal => "defend goal",
            SteeringRole::SupportPuckCarrier => "support carrier",
            SteeringRole::AttackPuckCarrier => "attack carrier",
            SteeringRole::AttackGoal => "attack goal",
            SteeringRole::Wander => "wander",
        }
    }

    /// Roles used by the team holding the puck
    pub fn is_offense(self) -> bool {
        matches!(self, SteeringRole::AttackGoal | SteeringRole::SupportPuckCarrier)
    }

    /// Roles used by the team without the puck
    pub fn is_defense(self) -> bool {
        matches!(self, SteeringRole::DefendGoal | SteeringRole::AttackPuckCarrier)
    }

    /// Goal kinds and weights, in order, when a carrier is present
    pub fn weight_table(self) -> &'static [(GoalKind, f32)] {
        match self {
            SteeringRole::ChasePuck => &[(GoalKind::Seek, 1.0)],
            SteeringRole::DefendGoal => &[
                (GoalKind::Seek, 0.3),
                (GoalKind::Seek, 0.3),
                (GoalKind::Align, 0.8),
                (GoalKind::Avoid, 1.0),
            ],
            SteeringRole::SupportPuckCarrier => &[
                (GoalKind::Align, 0.4),
                (GoalKind::Seek, 0.7),
                (GoalKind::Avoid, 1.0),
            ],
            SteeringRole::AttackPuckCarrier => &[(GoalKind::Seek, 1.0)],
            SteeringRole::AttackGoal => &[(GoalKind::Seek, 1.0), (GoalKind::Avoid, 0.6)],
            SteeringRole::Wander => &[(GoalKind::Wander, 1.0)],
        }
    }
}

fn chase_puck() -> Vec<WeightedGoal> {
    vec![WeightedGoal::new(SteeringGoal::Seek(SteeringTarget::Puck), 1.0)]
}

fn attack_goal(state: &MatchState, side: TeamSide) -> Vec<WeightedGoal> {
    vec![
        WeightedGoal::new(SteeringGoal::Seek(SteeringTarget::Net(side.attacking_end())), 1.0),
        WeightedGoal::new(
            SteeringGoal::Avoid {
                agents: state.team(side.opponent()).roster.clone(),
                prediction_time: AVOID_PREDICTION_SECS,
            },
            0.6,
        ),
    ]
}

/// Resolve a role into concrete goals for one player
pub fn resolve_goals(state: &MatchState, player: PlayerId, role: SteeringRole) -> Vec<WeightedGoal> {
    let side = state.player(player).side;
    let carrier = state.puck_carrier();
    let own_net = SteeringTarget::Net(side.defending_end());

    match role {
        SteeringRole::ChasePuck => chase_puck(),

        SteeringRole::DefendGoal => match carrier {
            Some(carrier) if carrier != player => {
                let teammates = state
                    .team(side)
                    .roster
                    .iter()
                    .copied()
                    .filter(|&id| id != player)
                    .collect();
                vec![
                    WeightedGoal::new(SteeringGoal::Seek(own_net), 0.3),
                    WeightedGoal::new(SteeringGoal::Seek(SteeringTarget::Player(carrier)), 0.3),
                    WeightedGoal::new(
                        SteeringGoal::Align {
                            agents: vec![carrier],
                            max_distance: 1500.0,
                            max_angle: FRAC_PI_2,
                        },
                        0.8,
                    ),
                    WeightedGoal::new(
                        SteeringGoal::Avoid {
                            agents: teammates,
                            prediction_time: AVOID_PREDICTION_SECS,
                        },
                        1.0,
                    ),
                ]
            }
            _ => vec![WeightedGoal::new(SteeringGoal::Seek(own_net), 0.3)],
        },

        SteeringRole::SupportPuckCarrier => match carrier {
            Some(carrier) if carrier == player => attack_goal(state, side),
            Some(carrier) => {
                let carrier_side = state.player(carrier).side;
                vec![
                    WeightedGoal::new(
                        SteeringGoal::Align {
                            agents: vec![carrier],
                            max_distance: 1000.0,
                            max_angle: PI,
                        },
                        0.4,
                    ),
                    WeightedGoal::new(SteeringGoal::Seek(SteeringTarget::Player(carrier)), 0.7),
                    WeightedGoal::new(
                        SteeringGoal::Avoid {
                            agents: state.team(carrier_side.opponent()).roster.clone(),
                            prediction_time: AVOID_PREDICTION_SECS,
                        },
                        1.0,
                    ),
                ]
            }
            None => chase_puck(),
        },

        SteeringRole::AttackPuckCarrier => match carrier {
            Some(carrier) if carrier != player => vec![WeightedGoal::new(
                SteeringGoal::Seek(SteeringTarget::Player(carrier)),
                1.0,
            )],
            _ => chase_puck(),
        },

        SteeringRole::AttackGoal => attack_goal(state, side),

        SteeringRole::Wander => vec![WeightedGoal::new(
            SteeringGoal::Wander { speed: WANDER_SPEED },
            1.0,
        )],
    }
}

/// Give a player a role. The user-controlled player keeps driving itself.
pub fn apply_role(state: &mut MatchState, player: PlayerId, role: SteeringRole) {
    if state.player(player).is_selected() {
        return;
    }
    let goals = resolve_goals(state, player, role);
    let p = state.player_mut(player);
    p.control = ControlMode::AiControlled(role);
    p.agent.goals = goals;
}

/// Role a player should take for the current possession
pub fn role_for_possession(state: &MatchState, player: PlayerId) -> SteeringRole {
    let p = state.player(player);
    match state.puck_carrier() {
        None => SteeringRole::ChasePuck,
        Some(carrier) if state.player(carrier).side == p.side => {
            if carrier == player {
                SteeringRole::AttackGoal
            } else {
                SteeringRole::SupportPuckCarrier
            }
        }
        Some(_) => {
            if p.position.is_forward() {
                SteeringRole::AttackPuckCarrier
            } else {
                SteeringRole::DefendGoal
            }
        }
    }
}

/// Carrier attacks the net, everyone else supports
pub fn assign_offense(state: &mut MatchState, side: TeamSide) {
    let carrier = state.puck_carrier();
    let roster = state.team(side).roster.clone();
    for id in roster {
        let role = if Some(id) == carrier {
            SteeringRole::AttackGoal
        } else {
            SteeringRole::SupportPuckCarrier
        };
        apply_role(state, id, role);
    }
}

/// Defensemen and goalie hold the net, forwards hunt the carrier
pub fn assign_defense(state: &mut MatchState, side: TeamSide) {
    let roster = state.team(side).roster.clone();
    for id in roster {
        let role = if state.player(id).position.is_forward() {
            SteeringRole::AttackPuckCarrier
        } else {
            SteeringRole::DefendGoal
        };
        apply_role(state, id, role);
    }
}

pub fn assign_chase(state: &mut MatchState, side: TeamSide) {
    let roster = state.team(side).roster.clone();
    for id in roster {
        apply_role(state, id, SteeringRole::ChasePuck);
    }
}

/// Re-run the team fan-out for whoever holds the puck now
pub fn reassign_for_possession(state: &mut MatchState) {
    let offense = state
        .puck_carrier()
        .map(|carrier| state.player(carrier).side);

    match offense {
        Some(side) => {
            assign_offense(state, side);
            assign_defense(state, side.opponent());
        }
        None => {
            assign_chase(state, TeamSide::Home);
            assign_chase(state, TeamSide::Away);
        }
    }

    log::trace!("Roles reassigned, offense: {:?}", offense);
    state.push_event(GameEvent::RolesReassigned { offense });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MatchConfig;
    use crate::sim::possession;
    use crate::sim::state::PlayerPosition;

    fn kinds(goals: &[WeightedGoal]) -> Vec<(GoalKind, f32)> {
        goals.iter().map(|g| (g.goal.kind(), g.weight)).collect()
    }

    fn state_with_away_carrier() -> (MatchState, PlayerId) {
        let mut state = MatchState::new(MatchConfig::default());
        let carrier = state
            .player_with_position(TeamSide::Away, PlayerPosition::Center)
            .expect("away center");
        assert!(possession::pick_up_puck(&mut state, carrier));
        (state, carrier)
    }

    #[test]
    fn test_resolved_goals_match_weight_tables() {
        let (state, carrier) = state_with_away_carrier();
        let defender = state
            .player_with_position(TeamSide::Home, PlayerPosition::LeftDefense)
            .expect("home defense");
        let supporter = state
            .player_with_position(TeamSide::Away, PlayerPosition::LeftWing)
            .expect("away wing");

        for (player, role) in [
            (defender, SteeringRole::DefendGoal),
            (defender, SteeringRole::AttackPuckCarrier),
            (supporter, SteeringRole::SupportPuckCarrier),
            (carrier, SteeringRole::AttackGoal),
            (supporter, SteeringRole::ChasePuck),
            (supporter, SteeringRole::Wander),
        ] {
            let goals = resolve_goals(&state, player, role);
            assert_eq!(kinds(&goals), role.weight_table().to_vec(), "{}", role.as_str());
        }
    }

    #[test]
    fn test_defend_goal_targets_own_net_and_carrier() {
        let (state, carrier) = state_with_away_carrier();
        let defender = state
            .player_with_position(TeamSide::Home, PlayerPosition::RightDefense)
            .expect("home defense");
        let goals = resolve_goals(&state, defender, SteeringRole::DefendGoal);

        assert_eq!(goals[0].goal, SteeringGoal::Seek(SteeringTarget::Net(TeamSide::Home.defending_end())));
        assert_eq!(goals[1].goal, SteeringGoal::Seek(SteeringTarget::Player(carrier)));
        match &goals[3].goal {
            SteeringGoal::Avoid { agents, .. } => {
                assert!(!agents.contains(&defender));
                assert_eq!(agents.len(), 4);
            }
            other => panic!("expected avoid, got {other:?}"),
        }
    }

    #[test]
    fn test_fallbacks_without_carrier() {
        let state = MatchState::new(MatchConfig::default());
        let id = state.away.roster[0];

        let defend = resolve_goals(&state, id, SteeringRole::DefendGoal);
        assert_eq!(kinds(&defend), vec![(GoalKind::Seek, 0.3)]);

        for role in [SteeringRole::SupportPuckCarrier, SteeringRole::AttackPuckCarrier] {
            let goals = resolve_goals(&state, id, role);
            assert_eq!(goals, chase_puck());
        }
    }

    #[test]
    fn test_carrier_supporting_itself_attacks() {
        let (state, carrier) = state_with_away_carrier();
        let goals = resolve_goals(&state, carrier, SteeringRole::SupportPuckCarrier);
        assert_eq!(goals, resolve_goals(&state, carrier, SteeringRole::AttackGoal));
        assert_eq!(
            goals[0].goal,
            SteeringGoal::Seek(SteeringTarget::Net(TeamSide::Away.attacking_end()))
        );
    }

    #[test]
    fn test_selected_player_keeps_control() {
        let mut state = MatchState::new(MatchConfig::default());
        let selected = state.selected_player().expect("selected");
        apply_role(&mut state, selected, SteeringRole::Wander);
        assert!(state.player(selected).is_selected());
        assert!(state.player(selected).role().is_none());
    }

    #[test]
    fn test_fan_out_on_possession() {
        let (state, carrier) = state_with_away_carrier();
        assert_eq!(state.player(carrier).role(), Some(SteeringRole::AttackGoal));
        for p in state.roster(TeamSide::Away) {
            assert!(p.role().is_some_and(|r| r.is_offense()));
        }
        for p in state.roster(TeamSide::Home) {
            if let Some(role) = p.role() {
                assert!(role.is_defense());
                assert_eq!(role == SteeringRole::AttackPuckCarrier, p.position.is_forward());
            }
        }
    }
}
