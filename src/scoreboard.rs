//! Scoreboard and game clock
//!
//! The clock is owned by the match (it only runs during live play); the
//! [`Scoreboard`] is the display model a host keeps in sync by feeding it
//! drained [`GameEvent`]s and the current clock.

use serde::{Deserialize, Serialize};

use crate::sim::{GameEvent, TeamSide};

/// Period countdown
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GameClock {
    total: f32,
    remaining: f32,
    running: bool,
}

impl GameClock {
    /// A running clock with `total` seconds on it
    pub fn new(total: f32) -> Self {
        Self {
            total,
            remaining: total,
            running: true,
        }
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Resume counting (no effect once expired)
    pub fn resume(&mut self) {
        if self.remaining > 0.0 {
            self.running = true;
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    pub fn total(&self) -> f32 {
        self.total
    }

    pub fn is_expired(&self) -> bool {
        self.remaining <= 0.0
    }

    /// Count down; returns true on the call that runs the clock out
    pub fn advance(&mut self, dt: f32) -> bool {
        if !self.running || self.is_expired() {
            return false;
        }
        self.remaining -= dt;
        if self.remaining <= 0.0 {
            self.remaining = 0.0;
            self.running = false;
            return true;
        }
        false
    }

    pub fn text(&self) -> String {
        format_clock(self.remaining)
    }
}

/// "m:ss" above a minute, ":s.hh" in the last minute
pub fn format_clock(seconds: f32) -> String {
    let seconds = seconds.max(0.0);
    if seconds > 60.0 {
        let whole = seconds as u32;
        format!("{}:{:02}", whole / 60, whole % 60)
    } else {
        format!(":{:04.2}", seconds)
    }
}

/// Display model for the score bug
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scoreboard {
    pub home_label: String,
    pub away_label: String,
    pub home: u32,
    pub away: u32,
    pub clock_text: String,
    /// Side whose goal is being celebrated
    pub goal_overlay: Option<TeamSide>,
    pub period_over: bool,
}

impl Scoreboard {
    pub fn new(clock: &GameClock) -> Self {
        Self {
            home_label: TeamSide::Home.as_str().to_string(),
            away_label: TeamSide::Away.as_str().to_string(),
            home: 0,
            away: 0,
            clock_text: clock.text(),
            goal_overlay: None,
            period_over: false,
        }
    }

    /// Fold one simulation event into the display
    pub fn apply(&mut self, event: &GameEvent) {
        match *event {
            GameEvent::GoalScored { side, home, away } => {
                self.home = home;
                self.away = away;
                self.goal_overlay = Some(side);
            }
            GameEvent::PlayResumed => {
                self.goal_overlay = None;
            }
            GameEvent::PeriodEnded { home, away } => {
                self.home = home;
                self.away = away;
                self.goal_overlay = None;
                self.period_over = true;
                log::info!("Final: {}", self.summary());
            }
            _ => {}
        }
    }

    pub fn sync_clock(&mut self, clock: &GameClock) {
        self.clock_text = clock.text();
    }

    /// Celebration banner, while one is showing
    pub fn overlay_text(&self) -> Option<String> {
        self.goal_overlay.map(|side| {
            let label = match side {
                TeamSide::Home => &self.home_label,
                TeamSide::Away => &self.away_label,
            };
            format!("GOAL! {label}")
        })
    }

    pub fn summary(&self) -> String {
        format!(
            "{} {} - {} {}",
            self.home_label, self.home, self.away, self.away_label
        )
    }
}
