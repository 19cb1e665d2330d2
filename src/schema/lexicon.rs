use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// A named word bank used to fill template slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lexicon {
    pub name: String,
    #[serde(default)]
    pub words: Vec<String>,
    /// Freshness timestamp, epoch milliseconds.
    #[serde(default)]
    pub updated_at: u64,
    /// Alternate slot names that resolve to this lexicon.
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl Lexicon {
    pub fn new(name: &str, words: &[&str], updated_at: u64) -> Self {
        Self {
            name: name.to_string(),
            words: words.iter().map(|w| w.to_string()).collect(),
            updated_at,
            aliases: Vec::new(),
        }
    }

    pub fn with_aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases = aliases.iter().map(|a| a.to_string()).collect();
        self
    }

    /// Trimmed, brace-free, non-empty words with duplicates removed.
    /// First occurrence order is kept.
    pub fn normalized_words(&self) -> Vec<String> {
        let mut seen: FxHashSet<String> = FxHashSet::default();
        let mut out: Vec<String> = Vec::with_capacity(self.words.len());
        for raw in &self.words {
            let cleaned: String = raw.chars().filter(|c| *c != '{' && *c != '}').collect();
            let cleaned = cleaned.trim();
            if cleaned.is_empty() || !seen.insert(cleaned.to_string()) {
                continue;
            }
            out.push(cleaned.to_string());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_drops_empties_and_duplicates() {
        let lex = Lexicon::new("noun", &["socks", "", "  ", " socks ", "lasagna", "{x}"], 0);
        assert_eq!(lex.normalized_words(), vec!["socks", "lasagna", "x"]);
    }

    #[test]
    fn normalization_scales_to_large_lists() {
        let words: Vec<String> = (0..20_000).map(|i| format!("word{}", i % 5_000)).collect();
        let refs: Vec<&str> = words.iter().map(String::as_str).collect();
        let normalized = Lexicon::new("big", &refs, 0).normalized_words();
        assert_eq!(normalized.len(), 5_000);
        assert_eq!(normalized[0], "word0");
        assert_eq!(normalized[4_999], "word4999");
    }

    #[test]
    fn lexicon_parses_with_defaults() {
        let lex: Lexicon = ron::from_str(r#"(name: "perk", words: ["a raise"])"#).unwrap();
        assert_eq!(lex.updated_at, 0);
        assert!(lex.aliases.is_empty());
    }
}
