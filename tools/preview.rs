/// Preview: interactive shell for drawing cards and scoring rounds.
///
/// Usage: preview --content <dir> [--config <path>] [--seed <n>]
///
/// Commands:
///   draw <game> [spice] [locality]  draw a card
///   score <pos> <neu> <neg> <latency_ms>  score the last drawn card
///   players <name>...  set the names at the table
///   totals  show session points
///   seed <n>  reset the RNG seed
///   forget  clear recently shown cards
///   stale <epoch_ms>  list lexicons updated at or before a time
///   help  list commands
///   quit  exit
///
/// Set RUST_LOG=debug to see selection decisions.

use party_card_engine::core::engine::CardEngine;
use party_card_engine::core::scoring::RunningTotals;
use party_card_engine::core::selector::DrawnCard;
use party_card_engine::schema::feedback::{Feedback, RoundResult};
use party_card_engine::schema::mechanic::RenderedOptions;
use party_card_engine::schema::tone::ToneRequest;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rustc_hash::FxHashSet;
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing_subscriber::EnvFilter;

/// How many recent families the next draw steers away from.
const FAMILY_WINDOW: usize = 2;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return;
    }

    let mut content_dir = None;
    let mut config_path = None;
    let mut seed: u64 = 42;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--content" if i + 1 < args.len() => {
                i += 1;
                content_dir = Some(args[i].clone());
            }
            "--config" if i + 1 < args.len() => {
                i += 1;
                config_path = Some(args[i].clone());
            }
            "--seed" if i + 1 < args.len() => {
                i += 1;
                seed = args[i].parse().unwrap_or(42);
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let mut builder = CardEngine::builder();
    if let Some(ref dir) = content_dir {
        builder = builder.content_dir(dir);
    }
    if let Some(ref path) = config_path {
        builder = builder.config_path(path);
    }
    let engine = match builder.build() {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };

    println!(
        "Loaded {} templates, {} gold cards, {} lexicons",
        engine.catalog().len(),
        engine.gold().len(),
        engine.lexicons().len()
    );
    println!("Games: {}", engine.catalog().games().join(", "));
    println!("Seed: {}", seed);
    println!("Type 'help' for commands.\n");

    // Session state
    let mut rng = StdRng::seed_from_u64(seed);
    let mut recent: FxHashSet<String> = FxHashSet::default();
    let mut recent_families: VecDeque<String> = VecDeque::new();
    let mut players: Vec<String> = Vec::new();
    let mut last: Option<DrawnCard> = None;
    let mut totals = RunningTotals::new();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("preview> ");
        stdout.flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).is_err() || line.is_empty() {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        let cmd = parts[0].to_lowercase();

        match cmd.as_str() {
            "quit" | "exit" | "q" => {
                println!("Goodbye.");
                break;
            }
            "help" | "h" | "?" => {
                print_help();
            }
            "draw" => {
                if parts.len() < 2 {
                    println!("Usage: draw <game> [spice] [locality]");
                    continue;
                }
                let spice = parts.get(2).and_then(|s| s.parse().ok()).unwrap_or(1);
                let locality = parts.get(3).and_then(|s| s.parse().ok()).unwrap_or(1);
                let mut tone = ToneRequest::new(spice, locality).with_players(&players);
                for family in &recent_families {
                    tone = tone.avoid_recent_family(family);
                }
                match engine.select(parts[1], &tone, &recent, &mut rng) {
                    Ok(drawn) => {
                        print_card(&drawn);
                        recent.insert(drawn.card.id.clone());
                        if !drawn.card.family.is_empty() {
                            recent_families.push_back(drawn.card.family.clone());
                            if recent_families.len() > FAMILY_WINDOW {
                                recent_families.pop_front();
                            }
                        }
                        last = Some(drawn);
                    }
                    Err(e) => println!("  {}", e),
                }
            }
            "score" => {
                let numbers: Vec<u64> = parts[1..].iter().filter_map(|s| s.parse().ok()).collect();
                if numbers.len() != 4 || parts.len() != 5 {
                    println!("Usage: score <pos> <neu> <neg> <latency_ms>");
                    continue;
                }
                let Some(ref drawn) = last else {
                    println!("  Draw a card first.");
                    continue;
                };
                let feedback = Feedback::new(
                    clamp_count(numbers[0]),
                    clamp_count(numbers[1]),
                    clamp_count(numbers[2]),
                    numbers[3],
                );
                let points = engine.score(&feedback);
                let round = RoundResult::new(&drawn.card, feedback, points, now_ms());
                totals.record(&round, None);
                println!("  {} points (session: {})", points, totals.session);
            }
            "players" => {
                players = parts[1..].iter().map(|p| p.to_string()).collect();
                if players.is_empty() {
                    println!("  No players; {{target_name}} shows 'someone'");
                } else {
                    println!("  Players: {}", players.join(", "));
                }
            }
            "totals" => {
                println!("  {} rounds, {} points", totals.rounds, totals.session);
            }
            "seed" => {
                match parts.get(1).and_then(|s| s.parse::<u64>().ok()) {
                    Some(n) => {
                        rng = StdRng::seed_from_u64(n);
                        println!("  Seed set to {}", n);
                    }
                    None => println!("Usage: seed <n>"),
                }
            }
            "forget" => {
                println!("  Forgot {} recent cards", recent.len());
                recent.clear();
                recent_families.clear();
            }
            "stale" => {
                match parts.get(1).and_then(|s| s.parse::<u64>().ok()) {
                    Some(cutoff) => {
                        let stale = engine.stale_lexicons(cutoff);
                        if stale.is_empty() {
                            println!("  No stale lexicons");
                        } else {
                            println!("  {}", stale.join(", "));
                        }
                    }
                    None => println!("Usage: stale <epoch_ms>"),
                }
            }
            _ => {
                println!("Unknown command: {}. Type 'help' for commands.", cmd);
            }
        }
    }
}

fn print_card(drawn: &DrawnCard) {
    let card = &drawn.card;
    println!(
        "  [{}] {} (spice {}, locality {}, {:?})",
        card.game,
        card.id,
        card.spice.get(),
        card.locality.get(),
        card.source
    );
    println!("  {}", card.text);
    match &drawn.options {
        RenderedOptions::Empty => {}
        RenderedOptions::OpenVote => println!("  -> vote for a player"),
        RenderedOptions::TwoChoice { a, b } => println!("  -> {}  |  {}", a, b),
    }
}

fn clamp_count(n: u64) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn print_usage() {
    println!("Usage: preview --content <dir> [--config <path>] [--seed <n>]");
}

fn print_help() {
    println!("Commands:");
    println!("  draw <game> [spice] [locality]        Draw a card");
    println!("  score <pos> <neu> <neg> <latency_ms>  Score the last drawn card");
    println!("  players <name>...                     Set the names at the table");
    println!("  totals                                Show session points");
    println!("  seed <n>                              Reset the RNG seed");
    println!("  forget                                Clear recently shown cards");
    println!("  stale <epoch_ms>                      List stale lexicons");
    println!("  help                                  Show this help");
    println!("  quit                                  Exit");
}
