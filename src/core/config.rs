//! Engine configuration: selection policy and scoring weights, loadable from RON.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub selection: SelectionConfig,
    pub scoring: ScoringConfig,
}

/// How the selector blends gold cards with templates and how hard it retries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Probability of trying the gold bank before templates, 0.0..=1.0.
    pub gold_blend: f64,
    /// Render attempts per request before giving up.
    pub max_attempts: u32,
    /// Try gold cards when the template path comes up empty.
    pub gold_fallback: bool,
    /// Substituted for slots whose lexicon is missing or empty.
    pub placeholder: String,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            gold_blend: 0.25,
            max_attempts: 4,
            gold_fallback: true,
            placeholder: "something".to_string(),
        }
    }
}

/// Weights for converting feedback into points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Points per positive reaction.
    pub positive_weight: f64,
    /// Points subtracted per negative reaction.
    pub negative_weight: f64,
    /// Reactions faster than this earn `fast_bonus` (if anyone laughed).
    pub fast_reaction_ms: u64,
    pub fast_bonus: f64,
    /// Reactions at or beyond this latency lose `slow_penalty`. Disabled when unset.
    pub slow_reaction_ms: Option<u64>,
    pub slow_penalty: f64,
    /// Share of voters (0.0..=1.0) that makes the room "hot" or "trashed".
    pub room_heat_threshold: f64,
    pub room_heat_bonus: f64,
    /// Extra bonus when the room is hot and at least one reaction was positive.
    pub consensus_bonus: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            positive_weight: 2.0,
            negative_weight: 1.0,
            fast_reaction_ms: 1_200,
            fast_bonus: 1.0,
            slow_reaction_ms: None,
            slow_penalty: 0.0,
            room_heat_threshold: 0.65,
            room_heat_bonus: 2.0,
            consensus_bonus: 2.0,
        }
    }
}

impl ScoringConfig {
    /// Weights must be finite and non-negative; the threshold must lie in (0.0, 1.0].
    pub fn validate(&self) -> Result<(), ConfigError> {
        let weights = [
            ("positive_weight", self.positive_weight),
            ("negative_weight", self.negative_weight),
            ("fast_bonus", self.fast_bonus),
            ("slow_penalty", self.slow_penalty),
            ("room_heat_bonus", self.room_heat_bonus),
            ("consensus_bonus", self.consensus_bonus),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        if !(self.room_heat_threshold > 0.0 && self.room_heat_threshold <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "room_heat_threshold must be within (0.0, 1.0], got {}",
                self.room_heat_threshold
            )));
        }
        Ok(())
    }
}

impl EngineConfig {
    /// Load and validate a configuration from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<EngineConfig, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse and validate a configuration from a RON string. Missing
    /// fields take their defaults.
    pub fn parse_ron(input: &str) -> Result<EngineConfig, ConfigError> {
        let config: EngineConfig = ron::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let sel = &self.selection;
        if !(0.0..=1.0).contains(&sel.gold_blend) {
            return Err(ConfigError::Invalid(format!(
                "gold_blend must be within 0.0..=1.0, got {}",
                sel.gold_blend
            )));
        }
        if sel.max_attempts == 0 {
            return Err(ConfigError::Invalid("max_attempts must be at least 1".to_string()));
        }
        if sel.placeholder.contains('{') || sel.placeholder.contains('}') {
            return Err(ConfigError::Invalid("placeholder must not contain braces".to_string()));
        }

        self.scoring.validate()
    }
}
