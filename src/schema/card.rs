use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::mechanic::ResponseMechanic;
use super::template::normalize_game;
use super::tone::{Tier, Toned};

/// A curated, fully authored card. Its text contains no slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoldCard {
    pub id: String,
    pub game: String,
    pub text: String,
    #[serde(default)]
    pub family: String,
    #[serde(default)]
    pub spice: Tier,
    #[serde(default)]
    pub locality: Tier,
    #[serde(default)]
    pub options: ResponseMechanic,
}

impl GoldCard {
    pub fn new(id: &str, game: &str, text: &str) -> Self {
        Self {
            id: id.to_string(),
            game: normalize_game(game),
            text: text.trim().to_string(),
            family: String::new(),
            spice: Tier::MIN,
            locality: Tier::MIN,
            options: ResponseMechanic::None,
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
}

impl Toned for GoldCard {
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
}

/// Words drawn for each slot name during one render, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilledSlots {
    order: Vec<String>,
    words: FxHashMap<String, String>,
}

impl FilledSlots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the word for `slot`. A slot keeps its first word.
    pub fn insert(&mut self, slot: &str, word: &str) {
        if self.words.contains_key(slot) {
            return;
        }
        self.order.push(slot.to_string());
        self.words.insert(slot.to_string(), word.to_string());
    }

    pub fn get(&self, slot: &str) -> Option<&str> {
        self.words.get(slot).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// `(slot, word)` pairs in the order slots first appeared in the text.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.order
            .iter()
            .filter_map(|slot| self.words.get(slot).map(|w| (slot.as_str(), w.as_str())))
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for FilledSlots {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut slots = FilledSlots::new();
        for (slot, word) in iter {
            slots.insert(slot, word);
        }
        slots
    }
}

/// Where a drawn card came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardSource {
    Gold,
    Template,
}

/// A fully rendered card ready for display. Never contains placeholders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilledCard {
    pub id: String,
    pub game: String,
    pub text: String,
    pub family: String,
    pub spice: Tier,
    pub locality: Tier,
    pub source: CardSource,
    pub slots: FilledSlots,
}

impl FilledCard {
    pub fn from_gold(card: &GoldCard) -> Self {
        Self {
            id: card.id.clone(),
            game: card.game.clone(),
            text: card.text.clone(),
            family: card.family.clone(),
            spice: card.spice,
            locality: card.locality,
            source: CardSource::Gold,
            slots: FilledSlots::new(),
        }
    }

    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filled_slots_keep_first_word_and_order() {
        let mut slots = FilledSlots::new();
        slots.insert("noun", "socks");
        slots.insert("verb", "yells");
        slots.insert("noun", "lasagna");
        assert_eq!(slots.get("noun"), Some("socks"));
        assert_eq!(slots.len(), 2);
        let pairs: Vec<_> = slots.iter().collect();
        assert_eq!(pairs, vec![("noun", "socks"), ("verb", "yells")]);
    }

    #[test]
    fn filled_slots_from_pairs() {
        let slots: FilledSlots = [("perk", "a raise")].into_iter().collect();
        assert_eq!(slots.get("perk"), Some("a raise"));
        assert_eq!(slots.get("gross"), None);
    }

    #[test]
    fn gold_card_converts_without_slots() {
        let gold = GoldCard::new("g1", "confession", "  I once ate cereal with a fork.  ")
            .with_family("food")
            .with_tiers(2, 1);
        let filled = FilledCard::from_gold(&gold);
        assert_eq!(filled.game, "CONFESSION");
        assert_eq!(filled.text, "I once ate cereal with a fork.");
        assert_eq!(filled.source, CardSource::Gold);
        assert!(filled.slots.is_empty());
        assert_eq!(filled.spice.get(), 2);
    }
}
