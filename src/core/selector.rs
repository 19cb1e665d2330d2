//! Card selector: picks a gold card or renders a template for a request.
//!
//! Blends gold cards with templates, filters by tone and party size,
//! steers away from recent ids and families, and retries rejected
//! renders a bounded number of times.

use rand::Rng;
use rustc_hash::FxHashSet;
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::catalog::TemplateCatalog;
use crate::core::config::SelectionConfig;
use crate::core::gold::GoldBank;
use crate::core::lexicon::LexiconStore;
use crate::core::options;
use crate::core::slots::SlotResolver;
use crate::schema::card::{FilledCard, FilledSlots, GoldCard};
use crate::schema::mechanic::RenderedOptions;
use crate::schema::template::{normalize_game, Template};
use crate::schema::tone::{ToneRequest, Toned};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SelectError {
    #[error("no eligible content for game {game}")]
    NoEligibleContent { game: String },
}

/// A rendered card together with its response options.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawnCard {
    pub card: FilledCard,
    pub options: RenderedOptions,
}

/// Borrowed view over the content needed for one selection.
pub struct CardSelector<'a> {
    catalog: &'a TemplateCatalog,
    gold: &'a GoldBank,
    lexicons: &'a LexiconStore,
    config: &'a SelectionConfig,
}

impl<'a> CardSelector<'a> {
    pub fn new(
        catalog: &'a TemplateCatalog,
        gold: &'a GoldBank,
        lexicons: &'a LexiconStore,
        config: &'a SelectionConfig,
    ) -> Self {
        Self {
            catalog,
            gold,
            lexicons,
            config,
        }
    }

    /// Produce one card for `game`.
    ///
    /// `recent` holds card ids shown earlier in the session. Both sources
    /// are searched for fresh content before any recent id is allowed, and
    /// cards from `tone.recent_families` are passed over while something
    /// else fits. The blend roll only decides which source is tried first
    /// at each step. Render retries share one `max_attempts` budget.
    pub fn select<R: Rng + ?Sized>(
        &self,
        game: &str,
        tone: &ToneRequest,
        recent: &FxHashSet<String>,
        rng: &mut R,
    ) -> Result<DrawnCard, SelectError> {
        let game = normalize_game(game);
        let resolver =
            SlotResolver::new(self.lexicons, &self.config.placeholder).with_players(&tone.players);

        let gold_first = rng.gen_bool(self.blend());
        let sources: &[Source] = match (gold_first, self.config.gold_fallback) {
            (true, _) => &[Source::Gold, Source::Templates],
            (false, true) => &[Source::Templates, Source::Gold],
            (false, false) => &[Source::Templates],
        };

        let admitted: Vec<&Template> = self
            .catalog
            .by_game(&game)
            .iter()
            .filter(|t| tone.admits(*t))
            .collect();
        let mut failed: FxHashSet<&str> = FxHashSet::default();
        let mut attempts = self.config.max_attempts;

        for (step, avoid) in AVOIDANCE.iter().enumerate() {
            for source in sources {
                let drawn = match source {
                    Source::Gold => self.draw_gold(
                        &game,
                        |c: &GoldCard| tone.admits(c) && avoid.allows(c, tone, recent),
                        &resolver,
                        rng,
                    ),
                    Source::Templates => {
                        let pool: Vec<&Template> = admitted
                            .iter()
                            .copied()
                            .filter(|t| !failed.contains(t.id.as_str()) && avoid.allows(*t, tone, recent))
                            .collect();
                        self.render_first(pool, &resolver, &mut failed, &mut attempts, rng)
                    }
                };
                if let Some(drawn) = drawn {
                    if step > 0 {
                        debug!(game = %game, card = %drawn.card.id, ?avoid, "nothing fresher fit");
                    }
                    return Ok(drawn);
                }
            }
        }

        // Rejected templates get fresh word draws while the budget lasts.
        while attempts > 0 && !admitted.is_empty() {
            if let Some(drawn) =
                self.render_first(admitted.clone(), &resolver, &mut failed, &mut attempts, rng)
            {
                return Ok(drawn);
            }
        }

        if !admitted.is_empty() {
            warn!(
                game = %game,
                attempts = self.config.max_attempts,
                "template renders exhausted"
            );
        }
        warn!(game = %game, "no eligible content");
        Err(SelectError::NoEligibleContent { game })
    }

    fn blend(&self) -> f64 {
        let blend = self.config.gold_blend;
        if blend.is_finite() {
            blend.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    fn draw_gold<R, F>(
        &self,
        game: &str,
        keep: F,
        resolver: &SlotResolver<'_>,
        rng: &mut R,
    ) -> Option<DrawnCard>
    where
        R: Rng + ?Sized,
        F: Fn(&GoldCard) -> bool,
    {
        let gold = self.gold.draw_where(game, keep, rng)?;
        let options = options::build_distinct(&gold.options, &FilledSlots::new(), resolver, rng);
        Some(DrawnCard {
            card: FilledCard::from_gold(gold),
            options,
        })
    }

    /// Render a random template from `pool`, dropping each one that is
    /// rejected, until one succeeds or the budget runs out.
    fn render_first<'t, R: Rng + ?Sized>(
        &self,
        mut pool: Vec<&'t Template>,
        resolver: &SlotResolver<'_>,
        failed: &mut FxHashSet<&'t str>,
        attempts: &mut u32,
        rng: &mut R,
    ) -> Option<DrawnCard> {
        while *attempts > 0 && !pool.is_empty() {
            *attempts -= 1;
            let template = pool.swap_remove(rng.gen_range(0..pool.len()));
            match resolver.fill(template, rng) {
                Ok(card) => {
                    let options =
                        options::build_distinct(&template.options, &card.slots, resolver, rng);
                    return Some(DrawnCard { card, options });
                }
                Err(err) => {
                    debug!(template = %template.id, remaining = *attempts, error = %err, "render rejected");
                    failed.insert(template.id.as_str());
                }
            }
        }
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Gold,
    Templates,
}

/// What counts as "shown recently" at one step of the search.
#[derive(Debug, Clone, Copy)]
struct Avoidance {
    ids: bool,
    families: bool,
}

/// Strictest first. Recent ids are only allowed once no fresh card fits.
const AVOIDANCE: [Avoidance; 4] = [
    Avoidance { ids: true, families: true },
    Avoidance { ids: true, families: false },
    Avoidance { ids: false, families: true },
    Avoidance { ids: false, families: false },
];

impl Avoidance {
    fn allows<T: Toned + ?Sized>(
        self,
        item: &T,
        tone: &ToneRequest,
        recent: &FxHashSet<String>,
    ) -> bool {
        !(self.ids && recent.contains(item.id())) && !(self.families && tone.is_recent_family(item))
    }
}
