//! Collision detection and response
//!
//! Boards and nets are static; players and the puck are circles. Contacts
//! that matter for possession are not acted on here: they are queued as
//! [`ContactEvent`]s and drained once per tick by the possession machine.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::sdf::{check_board_collision, reflect};
use super::state::{GameEvent, MatchState, PlayerId};
use crate::consts::*;

/// Speed kept by a free puck bouncing off a net frame
const NET_RESTITUTION: f32 = 0.3;
/// How close a free puck must get to a player's center to be touched
pub const PICKUP_REACH: f32 = PLAYER_HEIGHT / 2.0 + PUCK_RADIUS;

/// A contact worth telling the possession machine about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContactEvent {
    /// A player touched the free puck
    PlayerPuck(PlayerId),
    /// Two players bumped into each other
    PlayerPlayer(PlayerId, PlayerId),
}

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    pub hit: bool,
    /// Contact point on the surface of `b`
    pub point: Vec2,
    /// Points from `b` toward `a`
    pub normal: Vec2,
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec2::ZERO,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Circle vs circle
pub fn circle_circle(a: Vec2, ra: f32, b: Vec2, rb: f32) -> CollisionResult {
    let delta = a - b;
    let dist = delta.length();
    let reach = ra + rb;

    if dist >= reach {
        return CollisionResult::miss();
    }

    // Coincident centers: pick a stable axis
    let normal = if dist > f32::EPSILON { delta / dist } else { Vec2::X };
    CollisionResult {
        hit: true,
        point: b + normal * rb,
        normal,
        penetration: reach - dist,
    }
}

/// Drop the velocity component heading into a surface
#[inline]
fn strip_inward(vel: Vec2, normal: Vec2) -> Vec2 {
    let into = vel.dot(normal);
    if into < 0.0 { vel - into * normal } else { vel }
}

/// Keep the free puck and every player inside the boards
pub fn resolve_boards(state: &mut MatchState) {
    if state.puck.is_free() {
        let hit = check_board_collision(state.puck.pos, state.puck.radius);
        if hit.hit {
            state.puck.pos += hit.normal * hit.penetration;
            if state.puck.vel.dot(hit.normal) < 0.0 {
                state.puck.vel = reflect(state.puck.vel, hit.normal) * PUCK_BOARD_RESTITUTION;
                state.push_event(GameEvent::PuckHitBoards);
            }
        }
    }

    for player in &mut state.players {
        let hit = check_board_collision(player.pos, player.agent.radius);
        if hit.hit {
            player.pos += hit.normal * hit.penetration;
            player.vel = strip_inward(player.vel, hit.normal);
            player.agent.velocity = strip_inward(player.agent.velocity, hit.normal);
        }
    }
}

/// Nets block players; a free puck only gets in through the mouth
pub fn resolve_nets(state: &mut MatchState, prev_puck: Vec2) {
    let nets = state.nets;

    if state.puck.is_free() {
        for net in &nets {
            if !net.contains(state.puck.pos) || net.contains(prev_puck) || net.is_past_mouth(prev_puck) {
                continue;
            }
            let min = net.frame.min();
            let max = net.frame.max();
            let normal = if prev_puck.x <= min.x {
                Vec2::NEG_X
            } else if prev_puck.x >= max.x {
                Vec2::X
            } else {
                -net.end.mouth_normal()
            };
            state.puck.pos = prev_puck;
            state.puck.vel = reflect(state.puck.vel, normal) * NET_RESTITUTION;
        }
    }

    for player in &mut state.players {
        for net in &nets {
            if let Some((normal, depth)) = net.frame.circle_overlap(player.pos, player.agent.radius) {
                player.pos += normal * depth;
                player.vel = strip_inward(player.vel, normal);
                player.agent.velocity = strip_inward(player.agent.velocity, normal);
            }
        }
    }
}

/// Separate overlapping players and queue possession contacts
pub fn detect_contacts(state: &mut MatchState) {
    let count = state.players.len();

    for i in 0..count {
        for j in (i + 1)..count {
            let (a, b) = (&state.players[i], &state.players[j]);
            if !a.collision_enabled || !b.collision_enabled {
                continue;
            }
            let hit = circle_circle(a.pos, a.agent.radius, b.pos, b.agent.radius);
            if !hit.hit {
                continue;
            }

            let push = hit.normal * (hit.penetration * 0.5);
            state.players[i].pos += push;
            state.players[j].pos -= push;
            state.contacts.push(ContactEvent::PlayerPlayer(i as PlayerId, j as PlayerId));
        }
    }

    if state.puck.is_free() {
        let puck = state.puck.pos;
        let mut touching: Vec<(f32, PlayerId)> = state
            .players
            .iter()
            .filter(|p| p.collision_enabled)
            .map(|p| (p.pos.distance(puck), p.id))
            .filter(|&(dist, _)| dist < PICKUP_REACH)
            .collect();
        touching.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        state
            .contacts
            .extend(touching.into_iter().map(|(_, id)| ContactEvent::PlayerPuck(id)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MatchConfig;
    use crate::sim::goal::RinkEnd;

    #[test]
    fn test_circle_circle() {
        let hit = circle_circle(Vec2::new(20.0, 0.0), 12.5, Vec2::ZERO, 12.5);
        assert!(hit.hit);
        assert_eq!(hit.normal, Vec2::X);
        assert!((hit.penetration - 5.0).abs() < 1e-5);

        assert!(!circle_circle(Vec2::new(30.0, 0.0), 12.5, Vec2::ZERO, 12.5).hit);
    }

    #[test]
    fn test_puck_bounces_off_boards() {
        let mut state = MatchState::new(MatchConfig::default());
        state.puck.pos = Vec2::new(BOARDS_HALF_WIDTH + 3.0, 0.0);
        state.puck.vel = Vec2::new(200.0, 0.0);
        state.events.clear();

        resolve_boards(&mut state);

        assert!(state.puck.pos.x < BOARDS_HALF_WIDTH);
        assert!((state.puck.vel.x + 100.0).abs() < 1.0);
        assert_eq!(state.events, vec![GameEvent::PuckHitBoards]);
    }

    #[test]
    fn test_players_stay_on_ice() {
        let mut state = MatchState::new(MatchConfig::default());
        state.players[0].pos = Vec2::new(-BOARDS_HALF_WIDTH, 0.0);
        state.players[0].vel = Vec2::new(-50.0, 10.0);

        resolve_boards(&mut state);

        let p = &state.players[0];
        assert!(p.pos.x > -BOARDS_HALF_WIDTH + PLAYER_RADIUS - 0.5);
        assert!(p.vel.x.abs() < 1.0);
        assert!((p.vel.y - 10.0).abs() < 1.0);
    }

    #[test]
    fn test_puck_deflects_off_back_of_net() {
        let mut state = MatchState::new(MatchConfig::default());
        let net = *state.net(RinkEnd::Top);
        let prev = Vec2::new(2.0, net.frame.max().y + 3.0);
        state.puck.pos = Vec2::new(2.0, net.frame.max().y - 3.0);
        state.puck.vel = Vec2::new(0.0, -300.0);

        resolve_nets(&mut state, prev);

        assert_eq!(state.puck.pos, prev);
        assert!(state.puck.vel.y > 0.0);
    }

    #[test]
    fn test_puck_enters_through_mouth() {
        let mut state = MatchState::new(MatchConfig::default());
        let net = *state.net(RinkEnd::Top);
        let prev = Vec2::new(2.0, net.frame.min().y - 3.0);
        let inside = Vec2::new(2.0, net.frame.min().y + 3.0);
        state.puck.pos = inside;
        state.puck.vel = Vec2::new(0.0, 300.0);

        resolve_nets(&mut state, prev);
        assert_eq!(state.puck.pos, inside);
    }

    #[test]
    fn test_player_puck_contacts_sorted_by_distance() {
        let mut state = MatchState::new(MatchConfig::default());
        for p in &mut state.players {
            p.pos = Vec2::new(p.id as f32 * 100.0 - 200.0, 300.0);
        }
        state.puck.pos = Vec2::ZERO;
        state.players[2].pos = Vec2::new(10.0, 0.0);
        state.players[7].pos = Vec2::new(-5.0, 0.0);
        state.contacts.clear();

        detect_contacts(&mut state);

        let puck_contacts: Vec<_> = state
            .contacts
            .iter()
            .filter(|c| matches!(c, ContactEvent::PlayerPuck(_)))
            .copied()
            .collect();
        assert_eq!(
            puck_contacts,
            vec![ContactEvent::PlayerPuck(7), ContactEvent::PlayerPuck(2)]
        );
    }

    #[test]
    fn test_disabled_players_do_not_collide() {
        let mut state = MatchState::new(MatchConfig::default());
        for p in &mut state.players {
            p.pos = Vec2::new(p.id as f32 * 100.0 - 500.0, 300.0);
        }
        state.players[0].pos = Vec2::new(0.0, 0.0);
        state.players[1].pos = Vec2::new(5.0, 0.0);
        state.players[0].collision_enabled = false;
        state.puck.pos = Vec2::new(0.0, -200.0);
        state.contacts.clear();

        detect_contacts(&mut state);
        assert!(state.contacts.is_empty());
        assert_eq!(state.players[0].pos, Vec2::ZERO);
    }
}
