//! Lexicon store: named word banks keyed by slot name, with freshness queries.
use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::warn;

use crate::schema::lexicon::Lexicon;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LexiconError {
    #[error("lexicon not found: {0}")]
    NotFound(String),
}

#[derive(Debug, Clone)]
struct Entry {
    name: String,
    words: Vec<String>,
    updated_at: u64,
}

/// Read-only word banks indexed by name and alias.
///
/// A store is never mutated after construction. Refreshing content builds a
/// new store with [`LexiconStore::replaced`] and publishes it as a new
/// snapshot.
#[derive(Debug, Clone, Default)]
pub struct LexiconStore {
    entries: Vec<Entry>,
    index: FxHashMap<String, usize>,
}

impl LexiconStore {
    pub fn new(lexicons: Vec<Lexicon>) -> Self {
        let mut store = LexiconStore::default();
        for lexicon in lexicons {
            store.insert(lexicon);
        }
        store
    }

    fn insert(&mut self, lexicon: Lexicon) {
        let key = lexicon.name.trim().to_lowercase();
        let entry = Entry {
            name: lexicon.name.trim().to_string(),
            words: lexicon.normalized_words(),
            updated_at: lexicon.updated_at,
        };

        let slot = match self.index.get(&key) {
            Some(&existing) if self.entries[existing].name.to_lowercase() == key => {
                warn!(lexicon = %entry.name, "duplicate lexicon definition, keeping the later one");
                self.entries[existing] = entry;
                existing
            }
            _ => {
                self.entries.push(entry);
                self.entries.len() - 1
            }
        };
        self.index.insert(key, slot);

        for alias in &lexicon.aliases {
            let alias_key = alias.trim().to_lowercase();
            if alias_key.is_empty() {
                continue;
            }
            // A real lexicon name always wins over an alias.
            match self.index.get(&alias_key) {
                Some(&owner) if self.entries[owner].name.to_lowercase() == alias_key => {}
                _ => {
                    self.index.insert(alias_key, slot);
                }
            }
        }
    }

    /// Words for a slot name or alias. Lookups are case-insensitive.
    pub fn get(&self, name: &str) -> Result<&[String], LexiconError> {
        self.entry(name)
            .map(|e| e.words.as_slice())
            .ok_or_else(|| LexiconError::NotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entry(name).is_some()
    }

    /// True iff the lexicon was last updated at or before `cutoff`.
    /// Unknown names are not stale; there is nothing to refresh.
    pub fn is_stale(&self, name: &str, cutoff: u64) -> bool {
        self.entry(name).is_some_and(|e| e.updated_at <= cutoff)
    }

    /// Canonical names of every stale lexicon, sorted.
    pub fn list_stale(&self, cutoff: u64) -> Vec<String> {
        let mut names: Vec<String> = self
            .entries
            .iter()
            .filter(|e| e.updated_at <= cutoff)
            .map(|e| e.name.clone())
            .collect();
        names.sort();
        names
    }

    /// Canonical lexicon names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.iter().map(|e| e.name.clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// A new snapshot with `fresh` lexicons replacing same-named ones.
    /// `self` is left untouched.
    pub fn replaced(&self, fresh: Vec<Lexicon>) -> LexiconStore {
        let mut next = self.clone();
        for lexicon in fresh {
            next.insert(lexicon);
        }
        next
    }

    fn entry(&self, name: &str) -> Option<&Entry> {
        let key = name.trim().to_lowercase();
        self.index.get(&key).map(|&i| &self.entries[i])
    }
}
