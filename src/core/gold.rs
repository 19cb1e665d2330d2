//! Gold card bank: curated cards grouped by game.

use rand::seq::SliceRandom;
use rand::Rng;
use rustc_hash::FxHashMap;
use tracing::warn;

use crate::core::slots;
use crate::schema::card::GoldCard;
use crate::schema::template::normalize_game;

#[derive(Debug, Clone, Default)]
pub struct GoldBank {
    by_game: FxHashMap<String, Vec<GoldCard>>,
}

impl GoldBank {
    pub fn new(cards: Vec<GoldCard>) -> Self {
        let mut by_game: FxHashMap<String, Vec<GoldCard>> = FxHashMap::default();
        for mut card in cards {
            if card.text.trim().is_empty() {
                continue;
            }
            if slots::has_placeholders(&card.text) {
                warn!(id = %card.id, "gold card contains a slot placeholder, skipping");
                continue;
            }
            card.game = normalize_game(&card.game);
            by_game.entry(card.game.clone()).or_default().push(card);
        }
        Self { by_game }
    }

    /// A uniformly random gold card for `game`, or `None` if it has none.
    pub fn draw<R: Rng + ?Sized>(&self, game: &str, rng: &mut R) -> Option<&GoldCard> {
        self.cards(game).choose(rng)
    }

    /// A uniformly random gold card for `game` among those matching `keep`.
    pub fn draw_where<R, F>(&self, game: &str, keep: F, rng: &mut R) -> Option<&GoldCard>
    where
        R: Rng + ?Sized,
        F: Fn(&GoldCard) -> bool,
    {
        let pool: Vec<&GoldCard> = self.cards(game).iter().filter(|&c| keep(c)).collect();
        pool.choose(rng).copied()
    }

    pub fn cards(&self, game: &str) -> &[GoldCard] {
        self.by_game
            .get(&normalize_game(game))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn games(&self) -> Vec<&str> {
        let mut games: Vec<&str> = self.by_game.keys().map(String::as_str).collect();
        games.sort_unstable();
        games
    }

    pub fn len(&self) -> usize {
        self.by_game.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_game.is_empty()
    }
}
