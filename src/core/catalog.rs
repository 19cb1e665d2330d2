//! Template catalog: procedural card skeletons indexed by game.

use rustc_hash::FxHashMap;
use tracing::warn;

use crate::schema::template::{normalize_game, Template};
use crate::schema::tone::{Tier, Toned};

/// Read-only set of templates, indexed by game at construction.
#[derive(Debug, Clone, Default)]
pub struct TemplateCatalog {
    by_game: FxHashMap<String, Vec<Template>>,
    len: usize,
}

impl TemplateCatalog {
    /// Build the catalog. Game tags are normalized; a repeated template id
    /// replaces the earlier definition in place.
    pub fn new(templates: Vec<Template>) -> Self {
        let mut by_game: FxHashMap<String, Vec<Template>> = FxHashMap::default();
        let mut seen: FxHashMap<String, (String, usize)> = FxHashMap::default();

        for mut template in templates {
            template.game = normalize_game(&template.game);
            if let Some((game, pos)) = seen.get(&template.id).cloned() {
                warn!(template = %template.id, "duplicate template id, keeping the later one");
                if game == template.game {
                    if let Some(list) = by_game.get_mut(&game) {
                        list[pos] = template;
                    }
                    continue;
                }
                if let Some(list) = by_game.get_mut(&game) {
                    list.remove(pos);
                    for (_, (g, p)) in seen.iter_mut() {
                        if *g == game && *p > pos {
                            *p -= 1;
                        }
                    }
                }
            }
            let list = by_game.entry(template.game.clone()).or_default();
            seen.insert(template.id.clone(), (template.game.clone(), list.len()));
            list.push(template);
        }

        by_game.retain(|_, list| !list.is_empty());
        let len = by_game.values().map(Vec::len).sum();
        Self { by_game, len }
    }

    /// Templates for `game`, in load order. Unknown games yield an empty slice.
    pub fn by_game(&self, game: &str) -> &[Template] {
        self.by_game
            .get(&normalize_game(game))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn get(&self, id: &str) -> Option<&Template> {
        self.by_game.values().flatten().find(|t| t.id == id)
    }

    /// Game tags with at least one template, sorted.
    pub fn games(&self) -> Vec<&str> {
        let mut games: Vec<&str> = self.by_game.keys().map(String::as_str).collect();
        games.sort_unstable();
        games
    }

    pub fn iter(&self) -> impl Iterator<Item = &Template> {
        self.by_game.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

// Predicate helpers for `Iterator::filter`. They compose by chaining.

pub fn by_family<'a, T: Toned>(family: &'a str) -> impl Fn(&&T) -> bool + 'a {
    move |item| item.family() == family
}

pub fn by_spice<T: Toned>(min: Tier) -> impl Fn(&&T) -> bool {
    move |item| item.spice() >= min
}

pub fn by_locality<T: Toned>(min: Tier) -> impl Fn(&&T) -> bool {
    move |item| item.locality() >= min
}
