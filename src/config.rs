//! Match configuration
//!
//! Loaded from JSON (all fields optional) and validated before a match starts.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// Number of skaters per side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TeamSize {
    Three,
    Four,
    #[default]
    Five,
}

impl TeamSize {
    pub fn count(&self) -> usize {
        match self {
            TeamSize::Three => 3,
            TeamSize::Four => 4,
            TeamSize::Five => 5,
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "3" | "three" => Some(TeamSize::Three),
            "4" | "four" => Some(TeamSize::Four),
            "5" | "five" => Some(TeamSize::Five),
            _ => None,
        }
    }
}

/// Jersey colors a renderer can tint players with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TeamColor {
    #[default]
    Red,
    Black,
    Cyan,
    Blue,
    White,
}

impl TeamColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            TeamColor::Red => "Red",
            TeamColor::Black => "Black",
            TeamColor::Cyan => "Cyan",
            TeamColor::Blue => "Blue",
            TeamColor::White => "White",
        }
    }
}

/// Steering agent parameters for AI-controlled players
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentTuning {
    pub max_speed: f32,
    pub max_acceleration: f32,
    pub mass: f32,
    pub radius: f32,
}

impl Default for AgentTuning {
    fn default() -> Self {
        Self {
            max_speed: AGENT_MAX_SPEED,
            max_acceleration: AGENT_MAX_ACCELERATION,
            mass: AGENT_MASS,
            radius: PLAYER_RADIUS,
        }
    }
}

/// Everything needed to start a match
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Skaters per side
    pub team_size: TeamSize,
    /// Color of the user ("home") team; the opposing team wears white
    pub home_color: TeamColor,
    /// Seed for wander jitter and AI decisions
    pub seed: u64,
    /// Period length in seconds
    pub period_secs: f32,
    /// Goal celebration window in seconds
    pub celebration_secs: f32,
    /// Per-frame displacement of the user-controlled player
    pub user_skate_step: f32,
    /// AI agent parameters
    pub agent: AgentTuning,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            team_size: TeamSize::Five,
            home_color: TeamColor::Red,
            seed: 2017,
            period_secs: PERIOD_SECS,
            celebration_secs: CELEBRATION_SECS,
            user_skate_step: USER_SKATE_STEP,
            agent: AgentTuning::default(),
        }
    }
}

impl MatchConfig {
    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: MatchConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded match config from {}", path.display());
        Ok(config)
    }

    /// Serialize for logging or saving a template
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("period_secs", self.period_secs)?;
        positive("celebration_secs", self.celebration_secs)?;
        positive("user_skate_step", self.user_skate_step)?;
        positive("agent.max_speed", self.agent.max_speed)?;
        positive("agent.max_acceleration", self.agent.max_acceleration)?;
        positive("agent.mass", self.agent.mass)?;
        positive("agent.radius", self.agent.radius)?;
        Ok(())
    }

    /// Celebration window in ticks
    pub fn celebration_ticks(&self) -> u32 {
        (self.celebration_secs / SIM_DT).round() as u32
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("must be a positive number, got {value}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = MatchConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.team_size.count(), 5);
        assert_eq!(config.celebration_ticks(), 300);
    }

    #[test]
    fn test_from_json_partial() {
        let config = MatchConfig::from_json(r#"{"team_size": "three", "home_color": "black", "seed": 7}"#)
            .expect("valid config");
        assert_eq!(config.team_size, TeamSize::Three);
        assert_eq!(config.home_color, TeamColor::Black);
        assert_eq!(config.seed, 7);
        assert_eq!(config.period_secs, PERIOD_SECS);
        assert_eq!(config.agent, AgentTuning::default());
    }

    #[test]
    fn test_from_json_rejects_bad_values() {
        let err = MatchConfig::from_json(r#"{"period_secs": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "period_secs", .. }));

        let err = MatchConfig::from_json(r#"{"agent": {"mass": -1.0}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "agent.mass", .. }));
    }

    #[test]
    fn test_from_json_parse_error() {
        let err = MatchConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = MatchConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_team_size_from_str() {
        assert_eq!(TeamSize::from_str("Four"), Some(TeamSize::Four));
        assert_eq!(TeamSize::from_str("5"), Some(TeamSize::Five));
        assert_eq!(TeamSize::from_str("six"), None);
    }
}
