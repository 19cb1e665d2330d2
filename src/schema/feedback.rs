use serde::{Deserialize, Serialize};

use super::card::FilledCard;

/// Aggregated audience reactions for one round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Feedback {
    pub positive: u32,
    pub neutral: u32,
    pub negative: u32,
    /// Time from card reveal to first reaction.
    pub latency_ms: u64,
}

impl Feedback {
    pub fn new(positive: u32, neutral: u32, negative: u32, latency_ms: u64) -> Self {
        Self {
            positive,
            neutral,
            negative,
            latency_ms,
        }
    }

    pub fn voters(&self) -> u64 {
        self.positive as u64 + self.neutral as u64 + self.negative as u64
    }
}

/// The outcome of one generate-and-score cycle. Owned by the caller once
/// created; the engine never persists it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundResult {
    pub card_id: String,
    pub game: String,
    pub filled_text: String,
    pub feedback: Feedback,
    pub points: i32,
    pub timestamp_ms: u64,
}

impl RoundResult {
    pub fn new(card: &FilledCard, feedback: Feedback, points: i32, timestamp_ms: u64) -> Self {
        Self {
            card_id: card.id.clone(),
            game: card.game.clone(),
            filled_text: card.text.clone(),
            feedback,
            points,
            timestamp_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::card::GoldCard;

    #[test]
    fn voters_sum_all_reactions() {
        let fb = Feedback::new(5, 1, 3, 800);
        assert_eq!(fb.voters(), 9);
        assert_eq!(Feedback::default().voters(), 0);
    }

    #[test]
    fn round_result_copies_card_fields() {
        let card = FilledCard::from_gold(&GoldCard::new("g7", "ROAST", "You alphabetize snacks."));
        let fb = Feedback::new(2, 0, 0, 500);
        let round = RoundResult::new(&card, fb, 6, 1_700_000_000_000);
        assert_eq!(round.card_id, "g7");
        assert_eq!(round.game, "ROAST");
        assert_eq!(round.filled_text, "You alphabetize snacks.");
        assert_eq!(round.points, 6);
        assert_eq!(round.feedback, fb);
    }
}
