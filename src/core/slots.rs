//! Slot resolver: parses `{slot}` placeholders and fills them from lexicons.
//!
//! Parsing is permissive: empty, whitespace-only, unclosed, or
//! nested braces are literal text, never an error.

use rand::seq::SliceRandom;
use rand::Rng;
use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;
use tracing::debug;

use crate::core::lexicon::LexiconStore;
use crate::schema::card::{CardSource, FilledCard, FilledSlots};
use crate::schema::template::Template;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("template {template_id} renders to {words} words (max {max_words})")]
    WordBudgetExceeded {
        template_id: String,
        words: usize,
        max_words: usize,
    },
    #[error("template {template_id} still contains a placeholder after rendering")]
    UnresolvedPlaceholder { template_id: String },
}

/// Post-processing applied to one slot occurrence: `{name:upper,a_an}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    Upper,
    Lower,
    Title,
    /// Prefix the indefinite article.
    Article,
    /// Draw a word not yet used anywhere in this card.
    Unique,
}

impl Modifier {
    fn parse(token: &str) -> Option<Modifier> {
        match token.trim().to_lowercase().as_str() {
            "upper" => Some(Self::Upper),
            "lower" => Some(Self::Lower),
            "title" => Some(Self::Title),
            "a_an" => Some(Self::Article),
            "unique" => Some(Self::Unique),
            _ => None,
        }
    }
}

/// A slot occurrence in template text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotRef {
    pub name: String,
    pub modifiers: Vec<Modifier>,
}

impl SlotRef {
    fn parse(content: &str) -> Option<SlotRef> {
        let (name, mods) = match content.split_once(':') {
            Some((name, mods)) => (name.trim(), mods),
            None => (content.trim(), ""),
        };
        if name.is_empty() {
            return None;
        }
        let mut modifiers = Vec::new();
        for token in mods.split(',').filter(|t| !t.trim().is_empty()) {
            match Modifier::parse(token) {
                Some(m) => modifiers.push(m),
                None => debug!(slot = name, modifier = token.trim(), "ignoring unknown slot modifier"),
            }
        }
        Some(SlotRef {
            name: name.to_string(),
            modifiers,
        })
    }
}

/// A segment of parsed template text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Slot(SlotRef),
}

/// Split `text` into literal and slot segments, left to right.
pub fn parse(text: &str) -> Vec<Segment> {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut i = 0;

    while i < len {
        if chars[i] == '{' {
            let mut end = i + 1;
            while end < len && chars[end] != '{' && chars[end] != '}' {
                end += 1;
            }
            if end < len && chars[end] == '}' {
                let content: String = chars[i + 1..end].iter().collect();
                if let Some(slot) = SlotRef::parse(&content) {
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Slot(slot));
                    i = end + 1;
                    continue;
                }
            }
        }
        literal.push(chars[i]);
        i += 1;
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    segments
}

/// Distinct slot names in order of first appearance.
pub fn slot_names(text: &str) -> Vec<String> {
    let mut seen = FxHashSet::default();
    parse(text)
        .into_iter()
        .filter_map(|seg| match seg {
            Segment::Slot(slot) if seen.insert(slot.name.clone()) => Some(slot.name),
            _ => None,
        })
        .collect()
}

pub fn has_placeholders(text: &str) -> bool {
    parse(text).iter().any(|seg| matches!(seg, Segment::Slot(_)))
}

/// Collapse whitespace runs and drop spaces before `,` `!` `?`.
pub fn tidy(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, word) in text.split_whitespace().enumerate() {
        let attaches = word.starts_with(&[',', '!', '?'][..]);
        if i > 0 && !attaches {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Text and slot words produced by one render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub text: String,
    pub slots: FilledSlots,
}

/// Slot filled from the party's player names rather than a lexicon.
pub const TARGET_SLOT: &str = "target_name";

/// Shown for `{target_name}` when there are no players and no lexicon.
pub const TARGET_FALLBACK: &str = "someone";

/// Fills templates from a lexicon snapshot.
pub struct SlotResolver<'a> {
    lexicons: &'a LexiconStore,
    placeholder: &'a str,
    players: &'a [String],
}

impl<'a> SlotResolver<'a> {
    pub fn new(lexicons: &'a LexiconStore, placeholder: &'a str) -> Self {
        Self {
            lexicons,
            placeholder,
            players: &[],
        }
    }

    /// Names that fill `{target_name}` ahead of any lexicon.
    pub fn with_players(mut self, players: &'a [String]) -> Self {
        self.players = players;
        self
    }

    /// Render `template` into a card, or reject it if it exceeds its word
    /// budget. Output is never truncated.
    pub fn fill<R: Rng + ?Sized>(
        &self,
        template: &Template,
        rng: &mut R,
    ) -> Result<FilledCard, RenderError> {
        let rendered = self.render_with(
            &template.id,
            &template.text,
            template.max_words,
            template.distinct_slots,
            rng,
        )?;
        Ok(FilledCard {
            id: template.id.clone(),
            game: template.game.clone(),
            text: rendered.text,
            family: template.family.clone(),
            spice: template.spice,
            locality: template.locality,
            source: CardSource::Template,
            slots: rendered.slots,
        })
    }

    pub fn render<R: Rng + ?Sized>(
        &self,
        template_id: &str,
        text: &str,
        max_words: usize,
        rng: &mut R,
    ) -> Result<Rendered, RenderError> {
        self.render_with(template_id, text, max_words, false, rng)
    }

    /// Fill slots left to right. A name keeps its first word for every
    /// later plain occurrence. With `distinct_slots`, each new name skips
    /// words already used; a `unique` occurrence always does. Skipping falls
    /// back to any word once nothing fresh is left.
    fn render_with<R: Rng + ?Sized>(
        &self,
        template_id: &str,
        text: &str,
        max_words: usize,
        distinct_slots: bool,
        rng: &mut R,
    ) -> Result<Rendered, RenderError> {
        let segments = parse(text);
        let mut slots = FilledSlots::new();
        let mut drawn: FxHashMap<&str, &'a str> = FxHashMap::default();
        let mut used: Vec<&'a str> = Vec::new();
        let mut unresolved: FxHashSet<&str> = FxHashSet::default();

        let mut out = String::with_capacity(text.len());
        for seg in &segments {
            let slot = match seg {
                Segment::Literal(lit) => {
                    out.push_str(lit);
                    continue;
                }
                Segment::Slot(slot) => slot,
            };
            let name = slot.name.as_str();
            let unique = slot.modifiers.contains(&Modifier::Unique);

            let known = drawn.get(name).copied();
            let word = match known {
                Some(word) if !unique => Some(word),
                _ if unresolved.contains(name) => None,
                _ => {
                    let avoid: &[&'a str] = if unique || distinct_slots { &used } else { &[] };
                    let pick = self.resolve(name, avoid, rng);
                    match pick {
                        Some(word) => {
                            used.push(word);
                            if !drawn.contains_key(name) {
                                drawn.insert(name, word);
                                slots.insert(name, word);
                            }
                        }
                        None => {
                            debug!(template = template_id, slot = name, "slot unresolvable, using fallback");
                            unresolved.insert(name);
                        }
                    }
                    pick
                }
            };
            let word = word.unwrap_or_else(|| self.fallback(name));
            out.push_str(&apply_modifiers(word, &slot.modifiers));
        }

        let text = tidy(&out);
        let words = word_count(&text);
        if words > max_words {
            debug!(template = template_id, words, max_words, "render over word budget");
            return Err(RenderError::WordBudgetExceeded {
                template_id: template_id.to_string(),
                words,
                max_words,
            });
        }
        if has_placeholders(&text) {
            return Err(RenderError::UnresolvedPlaceholder {
                template_id: template_id.to_string(),
            });
        }

        Ok(Rendered { text, slots })
    }

    /// A uniformly random word for `slot`, skipping `avoid` (case-insensitive).
    /// `None` if the pool is missing, empty, or has nothing but `avoid`.
    pub fn draw<R: Rng + ?Sized>(
        &self,
        slot: &str,
        avoid: Option<&str>,
        rng: &mut R,
    ) -> Option<&'a str> {
        let words = self.pool(slot)?;
        match avoid {
            None => words.choose(rng).map(String::as_str),
            Some(avoid) => {
                let pool: Vec<&'a String> = words
                    .iter()
                    .filter(|w| !w.eq_ignore_ascii_case(avoid))
                    .collect();
                pool.choose(rng).map(|w| w.as_str())
            }
        }
    }

    /// Prefer words outside `avoid`; any word if none are left.
    fn resolve<R: Rng + ?Sized>(&self, slot: &str, avoid: &[&str], rng: &mut R) -> Option<&'a str> {
        let words = self.pool(slot)?;
        let fresh: Vec<&'a String> = words
            .iter()
            .filter(|w| !avoid.iter().any(|a| a.eq_ignore_ascii_case(w)))
            .collect();
        match fresh.choose(rng) {
            Some(word) => Some(word.as_str()),
            None => words.choose(rng).map(String::as_str),
        }
    }

    fn pool(&self, slot: &str) -> Option<&'a [String]> {
        if slot.eq_ignore_ascii_case(TARGET_SLOT) && !self.players.is_empty() {
            return Some(self.players);
        }
        self.lexicons.get(slot).ok()
    }

    fn fallback(&self, slot: &str) -> &'a str {
        if slot.eq_ignore_ascii_case(TARGET_SLOT) {
            TARGET_FALLBACK
        } else {
            self.placeholder
        }
    }
}

fn apply_modifiers(word: &str, modifiers: &[Modifier]) -> String {
    let mut out = word.to_string();
    if modifiers.contains(&Modifier::Upper) {
        out = out.to_uppercase();
    }
    if modifiers.contains(&Modifier::Lower) {
        out = out.to_lowercase();
    }
    if modifiers.contains(&Modifier::Title) {
        out = out
            .split(' ')
            .map(capitalize)
            .collect::<Vec<_>>()
            .join(" ");
    }
    if modifiers.contains(&Modifier::Article) {
        out = with_article(&out);
    }
    out
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn with_article(word: &str) -> String {
    let first = word.trim().chars().next().map(|c| c.to_ascii_lowercase());
    match first {
        Some('a' | 'e' | 'i' | 'o' | 'u') => format!("an {}", word),
        Some(_) => format!("a {}", word),
        None => word.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::lexicon::Lexicon;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn slot(name: &str) -> Segment {
        Segment::Slot(SlotRef {
            name: name.to_string(),
            modifiers: Vec::new(),
        })
    }

    fn lit(text: &str) -> Segment {
        Segment::Literal(text.to_string())
    }

    fn lexicons() -> LexiconStore {
        LexiconStore::new(vec![
            Lexicon::new("noun", &["socks", "lasagna"], 0),
            Lexicon::new("friend", &["Sam", "Alex", "Jo"], 0),
            Lexicon::new("fruit", &["apple", "banana"], 0),
            Lexicon::new("long", &["a very long phrase indeed"], 0),
            Lexicon::new("empty", &[""], 0),
            Lexicon::new("side", &["left", "right"], 0).with_aliases(&["other_side"]),
        ])
    }

    fn players() -> Vec<String> {
        vec!["Riley".to_string(), "Casey".to_string()]
    }

    #[test]
    fn parse_literal_only() {
        assert_eq!(parse("Hello, world."), vec![lit("Hello, world.")]);
        assert!(parse("").is_empty());
    }

    #[test]
    fn parse_slots_in_order() {
        assert_eq!(
            parse("{friend} smells like {noun}"),
            vec![slot("friend"), lit(" smells like "), slot("noun")]
        );
    }

    #[test]
    fn parse_treats_malformed_braces_as_literal() {
        assert_eq!(parse("Bad {} here"), vec![lit("Bad {} here")]);
        assert_eq!(parse("Bad {   } here"), vec![lit("Bad {   } here")]);
        assert_eq!(parse("Bad {unclosed here"), vec![lit("Bad {unclosed here")]);
        assert_eq!(parse("Bad } here"), vec![lit("Bad } here")]);
        assert_eq!(
            parse("{outer{inner}}"),
            vec![lit("{outer"), slot("inner"), lit("}")]
        );
    }

    #[test]
    fn parse_modifiers() {
        let segs = parse("{fruit:a_an, upper} {noun:wiggle}");
        assert_eq!(
            segs[0],
            Segment::Slot(SlotRef {
                name: "fruit".to_string(),
                modifiers: vec![Modifier::Article, Modifier::Upper],
            })
        );
        assert_eq!(segs[2], slot("noun"));
    }

    #[test]
    fn slot_names_are_distinct_and_ordered() {
        assert_eq!(
            slot_names("{b} and {a} and {b:upper}"),
            vec!["b".to_string(), "a".to_string()]
        );
    }

    #[test]
    fn tidy_normalizes_spacing() {
        assert_eq!(tidy("  so   much \t space  "), "so much space");
        assert_eq!(tidy("wait , what ?"), "wait, what?");
    }

    #[test]
    fn render_cursed_scenario() {
        let lex = lexicons();
        let resolver = SlotResolver::new(&lex, "something");
        let template = Template::new("t1", "ROAST", "{noun} is cursed", 4);
        for seed in 0..30 {
            let mut rng = StdRng::seed_from_u64(seed);
            let card = resolver.fill(&template, &mut rng).unwrap();
            assert!(
                card.text == "socks is cursed" || card.text == "lasagna is cursed",
                "unexpected text: {}",
                card.text
            );
            assert_eq!(card.word_count(), 3);
            assert_eq!(card.source, CardSource::Template);
        }
    }

    #[test]
    fn repeated_slot_reuses_word() {
        let lex = lexicons();
        let resolver = SlotResolver::new(&lex, "something");
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let out = resolver
                .render("t", "{friend} and {friend:upper}", 10, &mut rng)
                .unwrap();
            let friend = out.slots.get("friend").unwrap();
            assert_eq!(out.text, format!("{} and {}", friend, friend.to_uppercase()));
        }
    }

    #[test]
    fn missing_or_empty_lexicon_uses_placeholder() {
        let lex = lexicons();
        let resolver = SlotResolver::new(&lex, "something");
        let mut rng = StdRng::seed_from_u64(3);
        let out = resolver
            .render("t", "{nothing_here} beats {empty}", 10, &mut rng)
            .unwrap();
        assert_eq!(out.text, "something beats something");
        assert!(out.slots.is_empty());
    }

    #[test]
    fn word_budget_rejects_instead_of_truncating() {
        let lex = lexicons();
        let resolver = SlotResolver::new(&lex, "something");
        let mut rng = StdRng::seed_from_u64(0);
        let err = resolver.render("t9", "Behold {long}", 4, &mut rng).unwrap_err();
        assert_eq!(
            err,
            RenderError::WordBudgetExceeded {
                template_id: "t9".to_string(),
                words: 6,
                max_words: 4,
            }
        );
    }

    #[test]
    fn decorative_braces_survive() {
        let lex = lexicons();
        let resolver = SlotResolver::new(&lex, "something");
        let mut rng = StdRng::seed_from_u64(0);
        let out = resolver.render("t", "{} {noun} }{", 10, &mut rng).unwrap();
        assert!(out.text.starts_with("{} "));
        assert!(!has_placeholders(&out.text));
    }

    #[test]
    fn braces_forming_placeholder_are_rejected() {
        let lex = lexicons();
        let resolver = SlotResolver::new(&lex, "something");
        let mut rng = StdRng::seed_from_u64(0);
        let err = resolver.render("t", "{ {noun} }", 10, &mut rng).unwrap_err();
        assert!(matches!(err, RenderError::UnresolvedPlaceholder { .. }));
    }

    #[test]
    fn article_and_case_modifiers() {
        assert_eq!(apply_modifiers("apple", &[Modifier::Article]), "an apple");
        assert_eq!(apply_modifiers("banana", &[Modifier::Article]), "a banana");
        assert_eq!(apply_modifiers("hot dog", &[Modifier::Title]), "Hot Dog");
        assert_eq!(apply_modifiers("Loud", &[Modifier::Lower]), "loud");
        assert_eq!(
            apply_modifiers("egg", &[Modifier::Upper, Modifier::Article]),
            "an EGG"
        );
    }

    #[test]
    fn draw_avoids_word() {
        let lex = lexicons();
        let resolver = SlotResolver::new(&lex, "something");
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            assert_eq!(resolver.draw("noun", Some("SOCKS"), &mut rng), Some("lasagna"));
        }
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(resolver.draw("long", Some("a very long phrase indeed"), &mut rng), None);
        assert_eq!(resolver.draw("missing", None, &mut rng), None);
    }

    #[test]
    fn render_is_deterministic_per_seed() {
        let lex = lexicons();
        let resolver = SlotResolver::new(&lex, "something");
        let a = resolver
            .render("t", "{friend} ate {noun}", 10, &mut StdRng::seed_from_u64(11))
            .unwrap();
        let b = resolver
            .render("t", "{friend} ate {noun}", 10, &mut StdRng::seed_from_u64(11))
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn parse_unique_modifier() {
        assert_eq!(
            parse("{noun:unique,upper}")[0],
            Segment::Slot(SlotRef {
                name: "noun".to_string(),
                modifiers: vec![Modifier::Unique, Modifier::Upper],
            })
        );
        assert_eq!(apply_modifiers("socks", &[Modifier::Unique]), "socks");
    }

    #[test]
    fn target_name_uses_players() {
        let lex = lexicons();
        let players = players();
        let resolver = SlotResolver::new(&lex, "something").with_players(&players);
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let out = resolver
                .render("t", "{target_name} owns {noun}", 10, &mut rng)
                .unwrap();
            let target = out.slots.get("target_name").unwrap();
            assert!(players.iter().any(|p| p == target), "not a player: {}", target);
            assert!(out.text.starts_with(&format!("{} owns ", target)));
        }
    }

    #[test]
    fn target_name_rotates_unused_players() {
        let lex = lexicons();
        let players = players();
        let resolver = SlotResolver::new(&lex, "something").with_players(&players);
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let out = resolver
                .render("t", "{target_name} roasts {target_name:unique}", 10, &mut rng)
                .unwrap();
            assert!(
                out.text == "Riley roasts Casey" || out.text == "Casey roasts Riley",
                "unexpected text: {}",
                out.text
            );
        }
    }

    #[test]
    fn target_name_without_players() {
        let mut rng = StdRng::seed_from_u64(1);

        let bare = LexiconStore::new(vec![Lexicon::new("noun", &["socks"], 0)]);
        let resolver = SlotResolver::new(&bare, "something");
        let out = resolver
            .render("t", "{target_name} owns {noun}", 10, &mut rng)
            .unwrap();
        assert_eq!(out.text, "someone owns socks");
        assert!(out.slots.get("target_name").is_none());

        let aliased = LexiconStore::new(vec![
            Lexicon::new("friend", &["Sam"], 0).with_aliases(&["target_name"]),
        ]);
        let resolver = SlotResolver::new(&aliased, "something");
        let out = resolver.render("t", "{target_name} wins", 10, &mut rng).unwrap();
        assert_eq!(out.text, "Sam wins");
    }

    #[test]
    fn unique_occurrence_skips_used_words() {
        let lex = lexicons();
        let resolver = SlotResolver::new(&lex, "something");
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let out = resolver
                .render("t", "{noun} beats {noun:unique}", 10, &mut rng)
                .unwrap();
            assert!(
                out.text == "socks beats lasagna" || out.text == "lasagna beats socks",
                "unexpected text: {}",
                out.text
            );
        }
        // a one-word lexicon has nothing fresh left, so the word repeats
        let mut rng = StdRng::seed_from_u64(0);
        let out = resolver
            .render("t", "{long} {long:unique}", 20, &mut rng)
            .unwrap();
        assert_eq!(out.text, "a very long phrase indeed a very long phrase indeed");
    }

    #[test]
    fn distinct_slots_never_share_a_word() {
        let lex = lexicons();
        let resolver = SlotResolver::new(&lex, "something");
        let template = Template::new("t", "ROAST", "{side} or {other_side}", 10).with_distinct_slots();
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let card = resolver.fill(&template, &mut rng).unwrap();
            assert_ne!(
                card.slots.get("side"),
                card.slots.get("other_side"),
                "seed {} repeated a word: {}",
                seed,
                card.text
            );
        }
    }
}
