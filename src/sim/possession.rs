//! Puck possession and player selection
//!
//! The puck is either free or held by exactly one player. Contacts queued
//! during collision detection are drained here once per tick; every change
//! of possession fans out new roles to both teams in the same tick.

use glam::Vec2;
use rand::Rng;

use super::collision::ContactEvent;
use super::goal::RinkEnd;
use super::roles;
use super::state::{
    ControlMode, DekeSide, GameEvent, GamePhase, MatchState, PlayerId, PuckState, ReleaseKind,
    TeamSide,
};
use super::timers::TimerAction;
use crate::consts::*;
use crate::{direction, heading_to_face};

/// Launch speed of a shot
pub const SHOT_SPEED: f32 = SHOT_MAGNITUDE * PUCK_IMPULSE_SCALE;
/// Launch speed of a pass
pub const PASS_SPEED: f32 = PASS_MAGNITUDE * PUCK_IMPULSE_SCALE;

/// Drain this tick's contact queue
pub fn process_contacts(state: &mut MatchState) {
    let contacts = std::mem::take(&mut state.contacts);
    for contact in contacts {
        match contact {
            ContactEvent::PlayerPuck(id) => {
                pick_up_puck(state, id);
            }
            ContactEvent::PlayerPlayer(a, b) => {
                let Some(carrier) = state.puck_carrier() else {
                    continue;
                };
                let checker = if carrier == a {
                    b
                } else if carrier == b {
                    a
                } else {
                    continue;
                };
                if state.player(checker).side != state.player(carrier).side
                    && state.player(checker).collision_enabled
                    && state.player(carrier).collision_enabled
                {
                    knock_loose(state, carrier, checker);
                }
            }
        }
    }
}

/// Free -> Held. Returns false if the puck can't be taken right now.
pub fn pick_up_puck(state: &mut MatchState, id: PlayerId) -> bool {
    if state.phase != GamePhase::Playing
        || !state.puck.is_free()
        || !state.player(id).collision_enabled
    {
        return false;
    }

    state.puck.state = PuckState::Held(id);
    let side = {
        let player = state.player_mut(id);
        player.has_puck = true;
        player.deke = DekeSide::None;
        player.side
    };
    if side.is_user() {
        select_player(state, id);
    }
    state.sync_held_puck();

    log::debug!("{} {} picked up the puck", side.as_str(), id);
    state.push_event(GameEvent::PuckPickedUp { player: id, side });
    roles::reassign_for_possession(state);
    true
}

/// Held -> Free with a launch velocity
fn release_puck(state: &mut MatchState, id: PlayerId, velocity: Vec2, kind: ReleaseKind) -> bool {
    if state.puck_carrier() != Some(id) {
        return false;
    }

    state.sync_held_puck();
    state.puck.state = PuckState::Free;
    state.puck.vel = velocity;
    {
        let player = state.player_mut(id);
        player.has_puck = false;
        player.deke = DekeSide::None;
        player.collision_enabled = false;
    }
    state
        .timers
        .schedule(state.time_ticks, RELEASE_COOLDOWN_SECS, TimerAction::RestoreCollision(id));

    log::debug!("Player {} released the puck: {:?}", id, kind);
    state.push_event(GameEvent::PuckReleased { player: id, kind });
    roles::reassign_for_possession(state);
    true
}

/// Launch the puck from `id`'s stick toward `target`
fn launch_toward(state: &mut MatchState, id: PlayerId, target: Vec2, speed: f32, kind: ReleaseKind) -> bool {
    if state.puck_carrier() != Some(id) {
        return false;
    }
    let player = state.player_mut(id);
    player.heading = heading_to_face(player.pos, target);
    let stick = player.stick_position();
    let aim = (target - stick).normalize_or(direction(player.heading));
    release_puck(state, id, aim * speed, kind)
}

/// Pass from the carrier to a teammate's current position
pub fn pass_puck(state: &mut MatchState, from: PlayerId, to: PlayerId) -> bool {
    if from == to {
        return false;
    }
    let target = state.player(to).pos;
    launch_toward(state, from, target, PASS_SPEED, ReleaseKind::Pass { to })
}

/// Shoot at a net
pub fn shoot_puck(state: &mut MatchState, id: PlayerId, at: RinkEnd) -> bool {
    let target = state.net(at).center;
    launch_toward(state, id, target, SHOT_SPEED, ReleaseKind::Shot { at })
}

/// An opponent checked the carrier off the puck
pub fn knock_loose(state: &mut MatchState, carrier: PlayerId, checker: PlayerId) -> bool {
    let carrier_player = state.player(carrier);
    let away = (carrier_player.pos - state.player(checker).pos)
        .normalize_or(direction(carrier_player.heading));
    release_puck(
        state,
        carrier,
        away * KNOCK_LOOSE_SPEED,
        ReleaseKind::KnockedLoose { by: checker },
    )
}

/// Detach the puck silently (goal, faceoff, end of period)
pub fn drop_puck(state: &mut MatchState) {
    if let Some(id) = state.puck_carrier() {
        let player = state.player_mut(id);
        player.has_puck = false;
        player.deke = DekeSide::None;
    }
    state.puck.state = PuckState::Free;
}

/// Hand user control to `id`, returning the previous selection to the AI
pub fn select_player(state: &mut MatchState, id: PlayerId) {
    let previous = state.selected_player();
    if previous == Some(id) {
        return;
    }
    if let Some(previous) = previous {
        deselect_player(state, previous);
    }

    let player = state.player_mut(id);
    player.control = ControlMode::UserControlled;
    player.agent.goals.clear();
    player.skating = false;

    log::debug!("Selected player {} (was {:?})", id, previous);
    state.push_event(GameEvent::SelectionChanged { from: previous, to: id });
}

/// Give a user player back to its agent with the role for the current play
pub fn deselect_player(state: &mut MatchState, id: PlayerId) {
    let role = roles::role_for_possession(state, id);
    let player = state.player_mut(id);
    player.control = ControlMode::AiControlled(role);
    player.skating = false;
    player.agent.velocity = player.vel;
    roles::apply_role(state, id, role);
}

/// User team sorted nearest-first to the puck (ties by id)
fn user_players_by_puck_distance(state: &MatchState) -> Vec<(f32, PlayerId)> {
    let puck = state.puck.pos;
    let mut candidates: Vec<(f32, PlayerId)> = state
        .roster(TeamSide::Home)
        .map(|p| (p.pos.distance(puck), p.id))
        .collect();
    candidates.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    candidates
}

/// The user player nearest the puck
pub fn closest_user_player(state: &MatchState) -> Option<PlayerId> {
    user_players_by_puck_distance(state).first().map(|&(_, id)| id)
}

/// Switch to the user player best placed to play the puck. If the current
/// selection is already closest, the next closest gets it. A selection that
/// holds the puck passes to the new one.
pub fn select_closest_to_puck(state: &mut MatchState) {
    let candidates = user_players_by_puck_distance(state);
    let Some(&(_, closest)) = candidates.first() else {
        return;
    };
    let previous = state.selected_player();
    let chosen = if Some(closest) == previous {
        candidates.get(1).map_or(closest, |&(_, id)| id)
    } else {
        closest
    };
    if Some(chosen) == previous {
        return;
    }

    let passer = previous.filter(|&id| state.player(id).has_puck);
    select_player(state, chosen);
    if let Some(passer) = passer {
        pass_puck(state, passer, chosen);
    }
}

/// The opposing carrier's per-frame shoot/pass roll
pub fn opponent_carrier_decision(state: &mut MatchState) {
    let Some(carrier) = state.puck_carrier() else {
        return;
    };
    let player = state.player(carrier);
    if player.side != TeamSide::Away || player.is_selected() {
        return;
    }

    let target_end = TeamSide::Away.attacking_end();
    let distance = player.pos.distance(state.net(target_end).center) as u32;
    let roll = state.rng.random_range(0..=distance);

    if roll == 7 {
        shoot_puck(state, carrier, target_end);
    } else if roll < 5 && roll % 2 == 0 {
        let teammates: Vec<PlayerId> = state
            .team(TeamSide::Away)
            .roster
            .iter()
            .copied()
            .filter(|&id| id != carrier)
            .collect();
        if teammates.is_empty() {
            return;
        }
        let to = teammates[state.rng.random_range(0..teammates.len())];
        pass_puck(state, carrier, to);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MatchConfig;
    use crate::sim::roles::SteeringRole;
    use crate::sim::state::PlayerPosition;

    fn new_state() -> MatchState {
        MatchState::new(MatchConfig::default())
    }

    fn home(state: &MatchState, position: PlayerPosition) -> PlayerId {
        state
            .player_with_position(TeamSide::Home, position)
            .expect("home player")
    }

    fn away(state: &MatchState, position: PlayerPosition) -> PlayerId {
        state
            .player_with_position(TeamSide::Away, position)
            .expect("away player")
    }

    #[test]
    fn test_home_pickup_moves_selection() {
        let mut state = new_state();
        let carrier = home(&state, PlayerPosition::RightDefense);
        assert_ne!(state.selected_player(), Some(carrier));

        assert!(pick_up_puck(&mut state, carrier));

        assert_eq!(state.selected_player(), Some(carrier));
        assert_eq!(state.players.iter().filter(|p| p.is_selected()).count(), 1);
        assert_eq!(state.puck.state, PuckState::Held(carrier));
        assert!(state.player(carrier).has_puck);
        for p in state.roster(TeamSide::Home).filter(|p| !p.is_selected()) {
            assert_eq!(p.role(), Some(SteeringRole::SupportPuckCarrier));
        }
    }

    #[test]
    fn test_pickup_needs_free_puck_and_collision() {
        let mut state = new_state();
        let a = away(&state, PlayerPosition::Center);
        let b = away(&state, PlayerPosition::LeftWing);

        state.player_mut(a).collision_enabled = false;
        assert!(!pick_up_puck(&mut state, a));

        assert!(pick_up_puck(&mut state, b));
        state.player_mut(a).collision_enabled = true;
        assert!(!pick_up_puck(&mut state, a));
        assert_eq!(state.puck_carrier(), Some(b));
    }

    #[test]
    fn test_first_contact_wins() {
        let mut state = new_state();
        let a = away(&state, PlayerPosition::Center);
        let b = home(&state, PlayerPosition::Center);
        state.contacts = vec![ContactEvent::PlayerPuck(a), ContactEvent::PlayerPuck(b)];

        process_contacts(&mut state);

        assert_eq!(state.puck_carrier(), Some(a));
        assert_eq!(state.players.iter().filter(|p| p.has_puck).count(), 1);
        assert!(state.contacts.is_empty());
    }

    #[test]
    fn test_pass_releases_and_disables_collision() {
        let mut state = new_state();
        let from = away(&state, PlayerPosition::Center);
        let to = away(&state, PlayerPosition::LeftDefense);
        pick_up_puck(&mut state, from);

        assert!(pass_puck(&mut state, from, to));

        assert!(state.puck.is_free());
        assert!((state.puck.vel.length() - 315.0).abs() < 1e-2);
        assert!(!state.player(from).has_puck);
        assert!(!state.player(from).collision_enabled);
        assert_eq!(state.timers.len(), 1);
        for p in state.players.iter().filter(|p| !p.is_selected()) {
            assert_eq!(p.role(), Some(SteeringRole::ChasePuck));
        }
    }

    #[test]
    fn test_shot_speed_and_direction() {
        let mut state = new_state();
        let shooter = away(&state, PlayerPosition::Center);
        pick_up_puck(&mut state, shooter);

        assert!(shoot_puck(&mut state, shooter, RinkEnd::Bottom));
        assert!((state.puck.vel.length() - 900.0).abs() < 1e-2);
        assert!(state.puck.vel.y < 0.0);
        assert!(state.events.iter().any(|e| matches!(
            e,
            GameEvent::PuckReleased { kind: ReleaseKind::Shot { at: RinkEnd::Bottom }, .. }
        )));
    }

    #[test]
    fn test_only_carrier_can_release() {
        let mut state = new_state();
        let a = away(&state, PlayerPosition::Center);
        let b = away(&state, PlayerPosition::LeftWing);
        assert!(!shoot_puck(&mut state, a, RinkEnd::Bottom));
        pick_up_puck(&mut state, a);
        assert!(!pass_puck(&mut state, b, a));
        assert!(!pass_puck(&mut state, a, a));
    }

    #[test]
    fn test_switch_while_holding_passes_to_new_selection() {
        let mut state = new_state();
        let selected = state.selected_player().expect("selected");
        pick_up_puck(&mut state, selected);

        select_closest_to_puck(&mut state);

        let now = state.selected_player().expect("selected");
        assert_ne!(now, selected);
        assert!(state.puck.is_free());
        assert!(state.events.iter().any(|e| matches!(
            e,
            GameEvent::PuckReleased { player, kind: ReleaseKind::Pass { to } } if *player == selected && *to == now
        )));
        assert_eq!(state.player(selected).role(), Some(SteeringRole::ChasePuck));
    }

    #[test]
    fn test_select_closest_skips_current_selection() {
        let mut state = new_state();
        let previous = state.selected_player().expect("selected");
        state.player_mut(previous).pos = state.puck.pos;

        select_closest_to_puck(&mut state);
        assert_ne!(state.selected_player(), Some(previous));
        assert!(!state.player(previous).is_selected());
    }

    #[test]
    fn test_checking_knocks_puck_loose() {
        let mut state = new_state();
        let carrier = away(&state, PlayerPosition::Center);
        let checker = home(&state, PlayerPosition::LeftWing);
        pick_up_puck(&mut state, carrier);

        state.contacts.push(ContactEvent::PlayerPlayer(checker, carrier));
        process_contacts(&mut state);

        assert!(state.puck.is_free());
        assert!(!state.player(carrier).collision_enabled);
        assert!((state.puck.vel.length() - KNOCK_LOOSE_SPEED).abs() < 1e-3);
    }

    #[test]
    fn test_teammates_bumping_keep_the_puck() {
        let mut state = new_state();
        let carrier = away(&state, PlayerPosition::Center);
        let mate = away(&state, PlayerPosition::RightWing);
        pick_up_puck(&mut state, carrier);

        state.contacts.push(ContactEvent::PlayerPlayer(carrier, mate));
        process_contacts(&mut state);
        assert_eq!(state.puck_carrier(), Some(carrier));
    }

    #[test]
    fn test_home_carrier_ignores_opponent_roll() {
        let mut state = new_state();
        let selected = state.selected_player().expect("selected");
        pick_up_puck(&mut state, selected);
        for _ in 0..500 {
            opponent_carrier_decision(&mut state);
        }
        assert_eq!(state.puck_carrier(), Some(selected));
    }

    #[test]
    fn test_opponent_carrier_eventually_moves_the_puck() {
        let mut state = new_state();
        let carrier = away(&state, PlayerPosition::Center);
        pick_up_puck(&mut state, carrier);
        // Close to the net so the roll range is small
        state.player_mut(carrier).pos = Vec2::new(2.0, -420.0);

        for _ in 0..2000 {
            opponent_carrier_decision(&mut state);
            if state.puck_carrier() != Some(carrier) {
                break;
            }
        }
        assert_ne!(state.puck_carrier(), Some(carrier));
    }
}
