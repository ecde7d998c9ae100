//! Steering agents and goal forces
//!
//! An [`Agent`] carries a weighted list of [`SteeringGoal`]s. Each frame the
//! goal forces are summed, divided by mass, clamped to the agent's maximum
//! acceleration and integrated into a speed-limited velocity. Goal targets
//! are entity handles resolved against a [`SteeringWorld`] captured at the
//! start of the frame, so every agent sees the same positions.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::goal::RinkEnd;
use super::state::{MatchState, PlayerId};
use crate::config::AgentTuning;

/// Wander angle jitter (radians per second at full deflection)
const WANDER_JITTER: f32 = 4.0;

/// Something a goal can point at; resolved to a live position every frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SteeringTarget {
    Puck,
    Player(PlayerId),
    Net(RinkEnd),
}

/// Goal kinds, used for weight tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GoalKind {
    Seek,
    Align,
    Avoid,
    Wander,
}

/// A single steering objective
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SteeringGoal {
    /// Head straight for a target
    Seek(SteeringTarget),
    /// Match the heading of nearby agents within a view cone
    Align {
        agents: Vec<PlayerId>,
        max_distance: f32,
        max_angle: f32,
    },
    /// Steer away from predicted collisions
    Avoid {
        agents: Vec<PlayerId>,
        prediction_time: f32,
    },
    /// Random drift
    Wander { speed: f32 },
}

impl SteeringGoal {
    pub fn kind(&self) -> GoalKind {
        match self {
            SteeringGoal::Seek(_) => GoalKind::Seek,
            SteeringGoal::Align { .. } => GoalKind::Align,
            SteeringGoal::Avoid { .. } => GoalKind::Avoid,
            SteeringGoal::Wander { .. } => GoalKind::Wander,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedGoal {
    pub goal: SteeringGoal,
    pub weight: f32,
}

impl WeightedGoal {
    pub fn new(goal: SteeringGoal, weight: f32) -> Self {
        Self { goal, weight }
    }
}

/// Kinematics of one player as seen by the steering pass
#[derive(Debug, Clone, Copy)]
pub struct Body {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
}

/// Start-of-frame positions every agent steers against
#[derive(Debug, Clone)]
pub struct SteeringWorld {
    pub puck: Vec2,
    pub bodies: Vec<Body>,
    pub top_net: Vec2,
    pub bottom_net: Vec2,
}

impl SteeringWorld {
    pub fn capture(state: &MatchState) -> Self {
        Self {
            puck: state.puck.pos,
            bodies: state
                .players
                .iter()
                .map(|p| Body {
                    pos: p.pos,
                    vel: p.vel,
                    radius: p.agent.radius,
                })
                .collect(),
            top_net: state.net(RinkEnd::Top).center,
            bottom_net: state.net(RinkEnd::Bottom).center,
        }
    }

    pub fn body(&self, id: PlayerId) -> Option<&Body> {
        self.bodies.get(id as usize)
    }

    pub fn resolve(&self, target: SteeringTarget) -> Option<Vec2> {
        match target {
            SteeringTarget::Puck => Some(self.puck),
            SteeringTarget::Player(id) => self.body(id).map(|b| b.pos),
            SteeringTarget::Net(RinkEnd::Top) => Some(self.top_net),
            SteeringTarget::Net(RinkEnd::Bottom) => Some(self.bottom_net),
        }
    }
}

/// Steering agent attached to an AI-controlled player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub max_speed: f32,
    pub max_acceleration: f32,
    pub mass: f32,
    pub radius: f32,
    pub position: Vec2,
    pub velocity: Vec2,
    pub wander_angle: f32,
    pub goals: Vec<WeightedGoal>,
}

impl Agent {
    pub fn new(tuning: &AgentTuning) -> Self {
        Self {
            max_speed: tuning.max_speed,
            max_acceleration: tuning.max_acceleration,
            mass: tuning.mass,
            radius: tuning.radius,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            wander_angle: 0.0,
            goals: Vec::new(),
        }
    }

    /// Weighted sum of every goal's force (before mass and clamping)
    pub fn blended_force(&mut self, me: PlayerId, world: &SteeringWorld, rng: &mut impl Rng, dt: f32) -> Vec2 {
        let mut total = Vec2::ZERO;
        for i in 0..self.goals.len() {
            let weight = self.goals[i].weight;
            let force = match &self.goals[i].goal {
                SteeringGoal::Seek(target) => match world.resolve(*target) {
                    Some(point) => self.seek(point),
                    None => Vec2::ZERO,
                },
                SteeringGoal::Align {
                    agents,
                    max_distance,
                    max_angle,
                } => self.align(world, agents, *max_distance, *max_angle),
                SteeringGoal::Avoid {
                    agents,
                    prediction_time,
                } => self.avoid(me, world, agents, *prediction_time),
                SteeringGoal::Wander { speed } => {
                    let speed = *speed;
                    self.wander(speed, rng, dt)
                }
            };
            total += force * weight;
        }
        total
    }

    /// Run one steering step: pull position, blend, integrate, clamp
    pub fn update(&mut self, me: PlayerId, world: &SteeringWorld, rng: &mut impl Rng, dt: f32) {
        if let Some(body) = world.body(me) {
            self.position = body.pos;
        }

        let force = self.blended_force(me, world, rng, dt);
        let accel = (force / self.mass).clamp_length_max(self.max_acceleration);
        self.velocity = (self.velocity + accel * dt).clamp_length_max(self.max_speed);
    }

    fn seek(&self, target: Vec2) -> Vec2 {
        let desired = (target - self.position).normalize_or_zero() * self.max_speed;
        desired - self.velocity
    }

    fn align(&self, world: &SteeringWorld, agents: &[PlayerId], max_distance: f32, max_angle: f32) -> Vec2 {
        let forward = self.velocity.normalize_or_zero();
        let mut heading_sum = Vec2::ZERO;

        for body in agents.iter().filter_map(|&id| world.body(id)) {
            let offset = body.pos - self.position;
            if offset.length() > max_distance {
                continue;
            }
            if forward != Vec2::ZERO && offset != Vec2::ZERO && forward.angle_to(offset).abs() > max_angle {
                continue;
            }
            heading_sum += body.vel.normalize_or_zero();
        }

        let heading = heading_sum.normalize_or_zero();
        if heading == Vec2::ZERO {
            return Vec2::ZERO;
        }
        heading * self.max_speed - self.velocity
    }

    fn avoid(&self, me: PlayerId, world: &SteeringWorld, agents: &[PlayerId], prediction_time: f32) -> Vec2 {
        let mut force = Vec2::ZERO;

        for &id in agents {
            if id == me {
                continue;
            }
            let Some(other) = world.body(id) else {
                continue;
            };

            let rel_pos = other.pos - self.position;
            let rel_vel = other.vel - self.velocity;
            let reach = self.radius + other.radius;

            // Time of closest approach, limited to the prediction window
            let speed_sq = rel_vel.length_squared();
            let t = if speed_sq > f32::EPSILON {
                (-rel_pos.dot(rel_vel) / speed_sq).clamp(0.0, prediction_time)
            } else {
                0.0
            };

            let separation = rel_pos + rel_vel * t;
            let gap = separation.length();
            if gap >= reach {
                continue;
            }

            let away = if gap > f32::EPSILON {
                -separation / gap
            } else {
                -rel_pos.normalize_or(Vec2::X)
            };
            force += away * self.max_acceleration * (1.0 - gap / reach);
        }

        force
    }

    fn wander(&mut self, speed: f32, rng: &mut impl Rng, dt: f32) -> Vec2 {
        self.wander_angle =
            crate::normalize_angle(self.wander_angle + rng.random_range(-1.0..=1.0) * WANDER_JITTER * dt);
        let desired = crate::direction(self.wander_angle) * speed;
        desired - self.velocity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn world(bodies: Vec<Body>) -> SteeringWorld {
        SteeringWorld {
            puck: Vec2::new(100.0, 0.0),
            bodies,
            top_net: Vec2::new(2.0, 452.0),
            bottom_net: Vec2::new(2.0, -452.0),
        }
    }

    fn body(pos: Vec2, vel: Vec2) -> Body {
        Body {
            pos,
            vel,
            radius: 12.5,
        }
    }

    #[test]
    fn test_seek_accelerates_toward_target() {
        let mut agent = Agent::new(&AgentTuning::default());
        agent.goals = vec![WeightedGoal::new(SteeringGoal::Seek(SteeringTarget::Puck), 1.0)];
        let w = world(vec![body(Vec2::ZERO, Vec2::ZERO)]);
        let mut rng = Pcg32::seed_from_u64(1);

        agent.update(0, &w, &mut rng, 1.0 / 60.0);
        assert!(agent.velocity.x > 0.0);
        assert!(agent.velocity.y.abs() < 1e-4);
    }

    #[test]
    fn test_acceleration_is_clamped() {
        let tuning = AgentTuning::default();
        let mut agent = Agent::new(&tuning);
        agent.goals = vec![WeightedGoal::new(SteeringGoal::Seek(SteeringTarget::Puck), 50.0)];
        let w = world(vec![body(Vec2::ZERO, Vec2::ZERO)]);
        let mut rng = Pcg32::seed_from_u64(1);

        let dt = 1.0 / 60.0;
        agent.update(0, &w, &mut rng, dt);
        assert!(agent.velocity.length() <= tuning.max_acceleration * dt + 1e-4);
    }

    #[test]
    fn test_speed_is_clamped() {
        let tuning = AgentTuning::default();
        let mut agent = Agent::new(&tuning);
        agent.goals = vec![WeightedGoal::new(SteeringGoal::Seek(SteeringTarget::Puck), 1.0)];
        let w = world(vec![body(Vec2::ZERO, Vec2::ZERO)]);
        let mut rng = Pcg32::seed_from_u64(1);

        for _ in 0..600 {
            agent.update(0, &w, &mut rng, 1.0 / 60.0);
        }
        assert!(agent.velocity.length() <= tuning.max_speed + 1e-3);
    }

    #[test]
    fn test_missing_target_contributes_nothing() {
        let mut agent = Agent::new(&AgentTuning::default());
        agent.goals = vec![WeightedGoal::new(SteeringGoal::Seek(SteeringTarget::Player(9)), 1.0)];
        let w = world(vec![body(Vec2::ZERO, Vec2::ZERO)]);
        let mut rng = Pcg32::seed_from_u64(1);

        agent.update(0, &w, &mut rng, 1.0 / 60.0);
        assert_eq!(agent.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_avoid_pushes_away_from_oncoming() {
        let mut agent = Agent::new(&AgentTuning::default());
        agent.position = Vec2::ZERO;
        let w = world(vec![
            body(Vec2::ZERO, Vec2::ZERO),
            body(Vec2::new(20.0, 0.0), Vec2::new(-60.0, 0.0)),
        ]);

        let force = agent.avoid(0, &w, &[0, 1], 0.2);
        assert!(force.x < 0.0);
    }

    #[test]
    fn test_avoid_ignores_distant_agents() {
        let agent = Agent::new(&AgentTuning::default());
        let w = world(vec![
            body(Vec2::ZERO, Vec2::ZERO),
            body(Vec2::new(300.0, 0.0), Vec2::ZERO),
        ]);
        assert_eq!(agent.avoid(0, &w, &[1], 0.2), Vec2::ZERO);
    }

    #[test]
    fn test_align_respects_view_cone() {
        let mut agent = Agent::new(&AgentTuning::default());
        agent.velocity = Vec2::new(10.0, 0.0);
        let w = world(vec![
            body(Vec2::ZERO, Vec2::ZERO),
            // Behind the agent, heading north
            body(Vec2::new(-100.0, 0.0), Vec2::new(0.0, 50.0)),
        ]);

        let narrow = agent.align(&w, &[1], 1500.0, std::f32::consts::FRAC_PI_2);
        assert_eq!(narrow, Vec2::ZERO);

        let wide = agent.align(&w, &[1], 1500.0, std::f32::consts::PI);
        assert!(wide.y > 0.0);
    }

    #[test]
    fn test_wander_is_seeded() {
        let w = world(vec![body(Vec2::ZERO, Vec2::ZERO)]);
        let run = |seed| {
            let mut agent = Agent::new(&AgentTuning::default());
            agent.goals = vec![WeightedGoal::new(SteeringGoal::Wander { speed: 100.0 }, 1.0)];
            let mut rng = Pcg32::seed_from_u64(seed);
            for _ in 0..30 {
                agent.update(0, &w, &mut rng, 1.0 / 60.0);
            }
            agent.velocity
        };
        assert_eq!(run(5), run(5));
    }
}
