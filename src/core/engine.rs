//! The card engine: selection and scoring over shared content snapshots.
//!
//! Built via `CardEngine::builder()`. Content is immutable and shared
//! through `Arc`, so an engine clones cheaply and can be used from any
//! thread. Lexicon refresh swaps in a new snapshot.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rand::Rng;
use rustc_hash::FxHashSet;
use thiserror::Error;
use tracing::debug;

use crate::content::{ContentError, ContentProvider, LoadedContent, RonContentProvider};
use crate::core::catalog::TemplateCatalog;
use crate::core::config::{ConfigError, EngineConfig};
use crate::core::gold::GoldBank;
use crate::core::lexicon::LexiconStore;
use crate::core::scoring::FeedbackScorer;
use crate::core::selector::{CardSelector, DrawnCard, SelectError};
use crate::schema::card::GoldCard;
use crate::schema::feedback::Feedback;
use crate::schema::lexicon::Lexicon;
use crate::schema::template::Template;
use crate::schema::tone::ToneRequest;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("content error: {0}")]
    Content(#[from] ContentError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

/// The top-level card engine. Built via `CardEngine::builder()`.
#[derive(Debug, Clone)]
pub struct CardEngine {
    catalog: Arc<TemplateCatalog>,
    gold: Arc<GoldBank>,
    lexicons: Arc<LexiconStore>,
    config: Arc<EngineConfig>,
    scorer: FeedbackScorer,
}

/// Builder for constructing a `CardEngine`.
#[derive(Default)]
pub struct CardEngineBuilder {
    content_dir: Option<PathBuf>,
    config_path: Option<PathBuf>,
    config: Option<EngineConfig>,
    provider: Option<Box<dyn ContentProvider>>,
    /// Directly provided content, added after any provider content.
    templates: Vec<Template>,
    lexicons: Vec<Lexicon>,
    gold_cards: Vec<GoldCard>,
}

impl CardEngine {
    pub fn builder() -> CardEngineBuilder {
        CardEngineBuilder::default()
    }

    /// Draw one card for `game` under `tone`, avoiding `recent` ids.
    pub fn select<R: Rng + ?Sized>(
        &self,
        game: &str,
        tone: &ToneRequest,
        recent: &FxHashSet<String>,
        rng: &mut R,
    ) -> Result<DrawnCard, SelectError> {
        CardSelector::new(
            &self.catalog,
            &self.gold,
            &self.lexicons,
            &self.config.selection,
        )
        .select(game, tone, recent, rng)
    }

    pub fn score(&self, feedback: &Feedback) -> i32 {
        self.scorer.score(feedback)
    }

    /// A copy of this engine reading from `lexicons`. Clones holding the
    /// previous snapshot are unaffected.
    pub fn with_lexicons(&self, lexicons: Arc<LexiconStore>) -> CardEngine {
        debug!(lexicons = lexicons.len(), "publishing lexicon snapshot");
        CardEngine {
            lexicons,
            ..self.clone()
        }
    }

    /// Lexicons last updated at or before `cutoff`, sorted by name.
    pub fn stale_lexicons(&self, cutoff: u64) -> Vec<String> {
        self.lexicons.list_stale(cutoff)
    }

    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    pub fn gold(&self) -> &GoldBank {
        &self.gold
    }

    pub fn lexicons(&self) -> &Arc<LexiconStore> {
        &self.lexicons
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

impl CardEngineBuilder {
    /// Read `templates.ron`, `lexicons.ron`, and `gold_cards.ron` from `dir`.
    pub fn content_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.content_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Load configuration from a RON file at build time.
    pub fn config_path(mut self, path: impl AsRef<Path>) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn provider(mut self, provider: impl ContentProvider + 'static) -> Self {
        self.provider = Some(Box::new(provider));
        self
    }

    /// Provide templates directly (for testing without files).
    pub fn with_templates(mut self, templates: Vec<Template>) -> Self {
        self.templates.extend(templates);
        self
    }

    /// Provide lexicons directly (for testing without files).
    pub fn with_lexicons(mut self, lexicons: Vec<Lexicon>) -> Self {
        self.lexicons.extend(lexicons);
        self
    }

    /// Provide gold cards directly (for testing without files).
    pub fn with_gold_cards(mut self, cards: Vec<GoldCard>) -> Self {
        self.gold_cards.extend(cards);
        self
    }

    pub fn build(self) -> Result<CardEngine, EngineError> {
        let config = match (self.config, &self.config_path) {
            (Some(config), _) => {
                config.validate()?;
                config
            }
            (None, Some(path)) => EngineConfig::load_from_ron(path)?,
            (None, None) => EngineConfig::default(),
        };

        let mut content = LoadedContent::default();
        if let Some(ref dir) = self.content_dir {
            append(&mut content, LoadedContent::load(&RonContentProvider::new(dir)));
        }
        if let Some(ref provider) = self.provider {
            append(&mut content, LoadedContent::load(provider.as_ref()));
        }
        content.templates.extend(self.templates);
        content.lexicons.extend(self.lexicons);
        content.gold_cards.extend(self.gold_cards);

        let catalog = TemplateCatalog::new(content.templates);
        let gold = GoldBank::new(content.gold_cards);
        let lexicons = LexiconStore::new(content.lexicons);
        debug!(
            templates = catalog.len(),
            gold_cards = gold.len(),
            lexicons = lexicons.len(),
            "card engine built"
        );

        let scorer = FeedbackScorer::new(config.scoring.clone())?;
        Ok(CardEngine {
            catalog: Arc::new(catalog),
            gold: Arc::new(gold),
            lexicons: Arc::new(lexicons),
            scorer,
            config: Arc::new(config),
        })
    }
}

fn append(into: &mut LoadedContent, from: LoadedContent) {
    into.templates.extend(from.templates);
    into.lexicons.extend(from.lexicons);
    into.gold_cards.extend(from.gold_cards);
}
