use serde::{Deserialize, Serialize};

/// How players respond to a card, as declared by its template or gold card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseMechanic {
    #[default]
    None,
    /// The audience names a winner. Candidates are supplied at display time.
    PlayerVote,
    /// Exactly two options.
    TwoChoice { a: ChoiceSide, b: ChoiceSide },
}

impl ResponseMechanic {
    pub fn two_literals(a: &str, b: &str) -> Self {
        Self::TwoChoice {
            a: ChoiceSide::Literal(a.to_string()),
            b: ChoiceSide::Literal(b.to_string()),
        }
    }

    pub fn two_slots(slot_a: (&str, &str), slot_b: (&str, &str)) -> Self {
        Self::TwoChoice {
            a: ChoiceSide::slot(slot_a.0, slot_a.1),
            b: ChoiceSide::slot(slot_b.0, slot_b.1),
        }
    }
}

/// One side of a two-choice mechanic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChoiceSide {
    Literal(String),
    /// Reuse the word drawn for `slot` while rendering the card body;
    /// `fallback` is shown when that slot was never filled.
    Slot { slot: String, fallback: String },
}

impl ChoiceSide {
    pub fn slot(slot: &str, fallback: &str) -> Self {
        Self::Slot {
            slot: slot.to_string(),
            fallback: fallback.to_string(),
        }
    }
}

/// Concrete, displayable options for a drawn card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderedOptions {
    Empty,
    OpenVote,
    TwoChoice { a: String, b: String },
}
