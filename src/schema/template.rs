use serde::{Deserialize, Serialize};

use super::mechanic::ResponseMechanic;
use super::tone::{Tier, Toned};

fn default_max_words() -> usize {
    24
}

/// A procedural card skeleton: text with `{slot}` placeholders plus the
/// tags the selector filters on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub game: String,
    pub text: String,
    #[serde(default)]
    pub family: String,
    #[serde(default)]
    pub spice: Tier,
    #[serde(default)]
    pub locality: Tier,
    #[serde(default = "default_max_words")]
    pub max_words: usize,
    #[serde(default)]
    pub options: ResponseMechanic,
    /// Smallest party this card makes sense for.
    #[serde(default)]
    pub min_players: Option<usize>,
    /// When set, different slot names never receive the same word.
    #[serde(default)]
    pub distinct_slots: bool,
}

impl Template {
    pub fn new(id: &str, game: &str, text: &str, max_words: usize) -> Self {
        Self {
            id: id.to_string(),
            game: normalize_game(game),
            text: text.to_string(),
            family: String::new(),
            spice: Tier::MIN,
            locality: Tier::MIN,
            max_words,
            options: ResponseMechanic::None,
            min_players: None,
            distinct_slots: false,
        }
    }

    pub fn with_family(mut self, family: &str) -> Self {
        self.family = family.to_string();
        self
    }

    pub fn with_tiers(mut self, spice: i64, locality: i64) -> Self {
        self.spice = Tier::new(spice);
        self.locality = Tier::new(locality);
        self
    }

    pub fn with_options(mut self, options: ResponseMechanic) -> Self {
        self.options = options;
        self
    }

    pub fn with_min_players(mut self, min_players: usize) -> Self {
        self.min_players = Some(min_players);
        self
    }

    pub fn with_distinct_slots(mut self) -> Self {
        self.distinct_slots = true;
        self
    }
}

impl Toned for Template {
    fn id(&self) -> &str {
        &self.id
    }
    fn family(&self) -> &str {
        &self.family
    }
    fn spice(&self) -> Tier {
        self.spice
    }
    fn locality(&self) -> Tier {
        self.locality
    }
    fn min_players(&self) -> Option<usize> {
        self.min_players
    }
}

/// Game mode tags are compared case-insensitively; the canonical form is
/// trimmed upper case.
pub fn normalize_game(game: &str) -> String {
    game.trim().to_uppercase()
}
