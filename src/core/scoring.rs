//! Feedback scorer: converts audience reactions into points.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::config::{ConfigError, ScoringConfig};
use crate::schema::feedback::{Feedback, RoundResult};

/// Pure, configuration-driven feedback scoring.
///
/// Points never decrease as `positive` grows and never increase as
/// `negative` grows, for fixed `neutral` and `latency_ms`.
#[derive(Debug, Clone, Default)]
pub struct FeedbackScorer {
    config: ScoringConfig,
}

impl FeedbackScorer {
    /// Rejects negative or non-finite weights, which would break monotonicity.
    pub fn new(config: ScoringConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn score(&self, feedback: &Feedback) -> i32 {
        let cfg = &self.config;
        let positive = feedback.positive as f64;
        let negative = feedback.negative as f64;

        let mut raw = cfg.positive_weight * positive - cfg.negative_weight * negative;

        if feedback.positive > 0 && feedback.latency_ms < cfg.fast_reaction_ms {
            raw += cfg.fast_bonus;
        }
        if let Some(slow) = cfg.slow_reaction_ms {
            if feedback.latency_ms >= slow {
                raw -= cfg.slow_penalty;
            }
        }

        let voters = feedback.voters();
        if voters > 0 {
            let voters = voters as f64;
            if positive / voters >= cfg.room_heat_threshold {
                raw += cfg.room_heat_bonus;
                if feedback.positive > 0 {
                    raw += cfg.consensus_bonus;
                }
            }
            if negative / voters >= cfg.room_heat_threshold {
                raw -= cfg.negative_weight;
            }
        }

        raw.round().clamp(i32::MIN as f64, i32::MAX as f64) as i32
    }
}

/// Caller-owned session and per-player point totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunningTotals {
    pub session: i64,
    pub rounds: u32,
    pub players: FxHashMap<String, i64>,
}

impl RunningTotals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one round's points in, crediting `player` if given.
    pub fn record(&mut self, round: &RoundResult, player: Option<&str>) {
        self.session += round.points as i64;
        self.rounds += 1;
        if let Some(player) = player {
            *self.players.entry(player.to_string()).or_insert(0) += round.points as i64;
        }
    }

    pub fn player(&self, name: &str) -> i64 {
        self.players.get(name).copied().unwrap_or(0)
    }

    /// Players ordered by total, highest first; ties by name.
    pub fn leaderboard(&self) -> Vec<(&str, i64)> {
        let mut board: Vec<(&str, i64)> =
            self.players.iter().map(|(name, pts)| (name.as_str(), *pts)).collect();
        board.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        board
    }
}
