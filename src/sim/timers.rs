//! Single-shot deferred actions keyed by simulation tick

use serde::{Deserialize, Serialize};

use super::state::{MatchState, PlayerId};
use crate::consts::SIM_DT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerAction {
    /// Let a player touch the puck (and other players) again
    RestoreCollision(PlayerId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledTimer {
    pub fire_at: u64,
    pub action: TimerAction,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Timers {
    pending: Vec<ScheduledTimer>,
}

impl Timers {
    /// Schedule `action` to fire `delay_secs` after tick `now`
    pub fn schedule(&mut self, now: u64, delay_secs: f32, action: TimerAction) {
        let delay = (delay_secs / SIM_DT).round().max(1.0) as u64;
        self.pending.push(ScheduledTimer {
            fire_at: now + delay,
            action,
        });
    }

    /// Remove and return every action due at or before `now`, in schedule order
    pub fn take_due(&mut self, now: u64) -> Vec<TimerAction> {
        let mut due = Vec::new();
        self.pending.retain(|timer| {
            if timer.fire_at <= now {
                due.push(timer.action);
                false
            } else {
                true
            }
        });
        due
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Run every timer that has come due this tick
pub fn fire_due_timers(state: &mut MatchState) {
    for action in state.timers.take_due(state.time_ticks) {
        match action {
            TimerAction::RestoreCollision(id) => {
                if let Some(player) = state.players.get_mut(id as usize) {
                    player.collision_enabled = true;
                }
            }
        }
    }
}
