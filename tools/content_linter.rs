/// Content Linter: validates templates, lexicons, and gold cards.
///
/// Usage: content_linter <content_dir> [--stale-before <epoch_ms>]

use party_card_engine::content::{ContentError, ContentProvider, RonContentProvider};
use party_card_engine::core::lexicon::LexiconStore;
use party_card_engine::core::slots::{self, Segment};
use party_card_engine::schema::card::GoldCard;
use party_card_engine::schema::lexicon::Lexicon;
use party_card_engine::schema::mechanic::{ChoiceSide, ResponseMechanic};
use party_card_engine::schema::template::{normalize_game, Template};
use rustc_hash::{FxHashMap, FxHashSet};
use std::path::Path;
use std::process;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        println!("Usage: content_linter <content_dir> [--stale-before <epoch_ms>]");
        process::exit(0);
    }

    let content_dir = &args[1];
    let mut stale_before = None;

    let mut i = 2;
    while i < args.len() {
        if args[i] == "--stale-before" && i + 1 < args.len() {
            i += 1;
            match args[i].parse::<u64>() {
                Ok(cutoff) => stale_before = Some(cutoff),
                Err(_) => {
                    eprintln!("ERROR: --stale-before expects epoch milliseconds, got '{}'", args[i]);
                    process::exit(1);
                }
            }
        }
        i += 1;
    }

    if !Path::new(content_dir).is_dir() {
        eprintln!("ERROR: Path '{}' is not a directory", content_dir);
        process::exit(1);
    }

    let provider = RonContentProvider::new(content_dir);
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let templates = load("templates", provider.templates(), &mut errors);
    let lexicons = load("lexicons", provider.lexicons(), &mut errors);
    let gold_cards = load("gold_cards", provider.gold_cards(), &mut errors);

    println!(
        "Loaded {} templates, {} lexicons, {} gold cards",
        templates.len(),
        lexicons.len(),
        gold_cards.len()
    );

    let store = LexiconStore::new(lexicons.clone());
    lint_lexicons(&lexicons, &mut warnings);
    lint_templates(&templates, &store, &mut errors, &mut warnings);
    lint_gold(&gold_cards, &mut errors, &mut warnings);
    lint_games(&templates, &gold_cards, &mut warnings);

    if let Some(cutoff) = stale_before {
        for name in store.list_stale(cutoff) {
            warnings.push(format!(
                "Lexicon '{}' was last updated at or before {}",
                name, cutoff
            ));
        }
    }

    // Print report
    println!("\n=== Content Lint Report ===\n");

    if errors.is_empty() && warnings.is_empty() {
        println!("All checks passed!");
    }

    for warning in &warnings {
        println!("WARNING: {}", warning);
    }

    for error in &errors {
        println!("ERROR: {}", error);
    }

    println!(
        "\nSummary: {} errors, {} warnings",
        errors.len(),
        warnings.len()
    );

    if errors.is_empty() {
        process::exit(0);
    } else {
        process::exit(1);
    }
}

fn load<T>(kind: &str, loaded: Result<Vec<T>, ContentError>, errors: &mut Vec<String>) -> Vec<T> {
    match loaded {
        Ok(items) => items,
        Err(e) => {
            errors.push(format!("Failed to load {}: {}", kind, e));
            Vec::new()
        }
    }
}

fn lint_lexicons(lexicons: &[Lexicon], warnings: &mut Vec<String>) {
    let mut names = FxHashSet::default();
    for lexicon in lexicons {
        if !names.insert(lexicon.name.trim().to_lowercase()) {
            warnings.push(format!(
                "Lexicon '{}' is defined more than once; the last definition wins",
                lexicon.name
            ));
        }
        let words = lexicon.normalized_words();
        if words.is_empty() {
            warnings.push(format!("Lexicon '{}' has no usable words", lexicon.name));
        } else if words.len() < 3 {
            warnings.push(format!(
                "Lexicon '{}' has only {} words (minimum 3 recommended)",
                lexicon.name,
                words.len()
            ));
        }
        if words.len() < lexicon.words.len() {
            warnings.push(format!(
                "Lexicon '{}' has {} empty or duplicate entries",
                lexicon.name,
                lexicon.words.len() - words.len()
            ));
        }
    }
}

fn lint_templates(
    templates: &[Template],
    store: &LexiconStore,
    errors: &mut Vec<String>,
    warnings: &mut Vec<String>,
) {
    let mut ids = FxHashSet::default();
    for template in templates {
        if !ids.insert(template.id.as_str()) {
            warnings.push(format!(
                "Template '{}' is defined more than once; the last definition wins",
                template.id
            ));
        }
        if template.text.trim().is_empty() {
            errors.push(format!("Template '{}' has empty text", template.id));
            continue;
        }

        let segments = slots::parse(&template.text);
        let mut skeleton = String::new();
        for segment in &segments {
            match segment {
                Segment::Literal(lit) => {
                    if lit.contains('{') || lit.contains('}') {
                        warnings.push(format!(
                            "Template '{}' has a brace that is not a slot: {:?}",
                            template.id, lit
                        ));
                    }
                    skeleton.push_str(lit);
                }
                Segment::Slot(_) => skeleton.push('x'),
            }
        }

        let min_words = slots::word_count(&skeleton);
        if min_words > template.max_words {
            errors.push(format!(
                "Template '{}' needs at least {} words but max_words is {}",
                template.id, min_words, template.max_words
            ));
        }

        let names = slots::slot_names(&template.text);
        for name in &names {
            if name.eq_ignore_ascii_case(slots::TARGET_SLOT) {
                continue;
            }
            if !store.contains(name) {
                warnings.push(format!(
                    "Template '{}' uses slot '{}' with no lexicon (placeholder will be shown)",
                    template.id, name
                ));
            }
        }

        if template.min_players == Some(0) {
            warnings.push(format!(
                "Template '{}' has min_players 0, which never filters anything",
                template.id
            ));
        }
        if template.distinct_slots && names.len() < 2 {
            warnings.push(format!(
                "Template '{}' sets distinct_slots but has fewer than two slot names",
                template.id
            ));
        }

        if let ResponseMechanic::TwoChoice { a, b } = &template.options {
            for side in [a, b] {
                if let ChoiceSide::Slot { slot, .. } = side {
                    if !names.iter().any(|n| n == slot) {
                        warnings.push(format!(
                            "Template '{}' option uses slot '{}' which is not in its text (fallback will be shown)",
                            template.id, slot
                        ));
                    }
                }
            }
        }
    }
}

fn lint_gold(cards: &[GoldCard], errors: &mut Vec<String>, warnings: &mut Vec<String>) {
    let mut ids = FxHashSet::default();
    for card in cards {
        if !ids.insert(card.id.as_str()) {
            warnings.push(format!("Gold card '{}' is defined more than once", card.id));
        }
        if card.text.trim().is_empty() {
            warnings.push(format!("Gold card '{}' has empty text and will be skipped", card.id));
        }
        if slots::has_placeholders(&card.text) {
            errors.push(format!(
                "Gold card '{}' contains a slot placeholder and will be skipped: {}",
                card.id, card.text
            ));
        }
    }
}

fn lint_games(templates: &[Template], cards: &[GoldCard], warnings: &mut Vec<String>) {
    let mut per_game: FxHashMap<String, (usize, usize)> = FxHashMap::default();
    for template in templates {
        per_game.entry(normalize_game(&template.game)).or_default().0 += 1;
    }
    for card in cards.iter().filter(|c| !c.text.trim().is_empty()) {
        per_game.entry(normalize_game(&card.game)).or_default().1 += 1;
    }

    let mut games: Vec<_> = per_game.into_iter().collect();
    games.sort();
    for (game, (template_count, gold_count)) in games {
        println!("  {}: {} templates, {} gold cards", game, template_count, gold_count);
        if template_count == 0 {
            warnings.push(format!(
                "Game '{}' has no templates; only gold cards can be drawn",
                game
            ));
        }
    }
}
