//! Content loading: templates, lexicons, and gold cards from RON or memory.
//!
//! A content directory holds `templates.ron`, `lexicons.ron`, and
//! `gold_cards.ron`, each a RON list. Sibling directories `templates/`,
//! `lexicons/`, and `gold_cards/` may hold more `.ron` lists that are
//! appended in file-name order.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use crate::schema::card::GoldCard;
use crate::schema::lexicon::Lexicon;
use crate::schema::template::Template;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error in {path}: {source}")]
    Ron {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
}

/// Source of raw card content.
pub trait ContentProvider {
    fn templates(&self) -> Result<Vec<Template>, ContentError>;
    fn lexicons(&self) -> Result<Vec<Lexicon>, ContentError>;
    fn gold_cards(&self) -> Result<Vec<GoldCard>, ContentError>;
}

/// Everything a provider yielded, with failures replaced by empty lists.
#[derive(Debug, Clone, Default)]
pub struct LoadedContent {
    pub templates: Vec<Template>,
    pub lexicons: Vec<Lexicon>,
    pub gold_cards: Vec<GoldCard>,
}

impl LoadedContent {
    /// Pull every collection from `provider`. A failing collection is
    /// logged and left empty.
    pub fn load(provider: &dyn ContentProvider) -> Self {
        Self {
            templates: or_empty("templates", provider.templates()),
            lexicons: or_empty("lexicons", provider.lexicons()),
            gold_cards: or_empty("gold_cards", provider.gold_cards()),
        }
    }
}

fn or_empty<T>(kind: &str, loaded: Result<Vec<T>, ContentError>) -> Vec<T> {
    match loaded {
        Ok(items) => {
            debug!(kind, count = items.len(), "content loaded");
            items
        }
        Err(err) => {
            warn!(kind, error = %err, "content failed to load, continuing without it");
            Vec::new()
        }
    }
}

/// Reads content from a directory of RON files.
#[derive(Debug, Clone)]
pub struct RonContentProvider {
    dir: PathBuf,
}

impl RonContentProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn load_kind<T: DeserializeOwned>(&self, kind: &str) -> Result<Vec<T>, ContentError> {
        let file = self.dir.join(format!("{}.ron", kind));
        let subdir = self.dir.join(kind);
        if !file.exists() && !subdir.is_dir() {
            return Err(ContentError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no {} in {}", kind, self.dir.display()),
            )));
        }

        let mut items = Vec::new();
        if file.exists() {
            items.extend(parse_ron_list::<T>(&file)?);
        }
        if subdir.is_dir() {
            load_ron_files_from_dir(&subdir, |path| {
                items.extend(parse_ron_list::<T>(path)?);
                Ok(())
            })?;
        }
        Ok(items)
    }
}

impl ContentProvider for RonContentProvider {
    fn templates(&self) -> Result<Vec<Template>, ContentError> {
        self.load_kind("templates")
    }

    fn lexicons(&self) -> Result<Vec<Lexicon>, ContentError> {
        self.load_kind("lexicons")
    }

    fn gold_cards(&self) -> Result<Vec<GoldCard>, ContentError> {
        self.load_kind("gold_cards")
    }
}

/// In-memory content, mainly for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct StaticContent {
    pub templates: Vec<Template>,
    pub lexicons: Vec<Lexicon>,
    pub gold_cards: Vec<GoldCard>,
}

impl ContentProvider for StaticContent {
    fn templates(&self) -> Result<Vec<Template>, ContentError> {
        Ok(self.templates.clone())
    }

    fn lexicons(&self) -> Result<Vec<Lexicon>, ContentError> {
        Ok(self.lexicons.clone())
    }

    fn gold_cards(&self) -> Result<Vec<GoldCard>, ContentError> {
        Ok(self.gold_cards.clone())
    }
}

/// Parse one RON file holding a list of `T`.
pub fn parse_ron_list<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, ContentError> {
    let contents = std::fs::read_to_string(path)?;
    ron::from_str(&contents).map_err(|source| ContentError::Ron {
        path: path.to_path_buf(),
        source,
    })
}

/// Load all .ron files from a directory in file-name order, calling
/// `loader` for each.
fn load_ron_files_from_dir<F>(dir: &Path, mut loader: F) -> Result<(), ContentError>
where
    F: FnMut(&Path) -> Result<(), ContentError>,
{
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|s| s.to_str()) == Some("ron") {
            paths.push(path);
        }
    }
    paths.sort();
    for path in &paths {
        loader(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Broken;

    impl ContentProvider for Broken {
        fn templates(&self) -> Result<Vec<Template>, ContentError> {
            Err(ContentError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk on fire",
            )))
        }
        fn lexicons(&self) -> Result<Vec<Lexicon>, ContentError> {
            Ok(vec![Lexicon::new("noun", &["socks"], 0)])
        }
        fn gold_cards(&self) -> Result<Vec<GoldCard>, ContentError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn failing_collection_degrades_to_empty() {
        let loaded = LoadedContent::load(&Broken);
        assert!(loaded.templates.is_empty());
        assert_eq!(loaded.lexicons.len(), 1);
    }

    #[test]
    fn static_content_round_trips() {
        let content = StaticContent {
            templates: vec![Template::new("t1", "roast", "{noun} is cursed", 10)],
            ..StaticContent::default()
        };
        let loaded = LoadedContent::load(&content);
        assert_eq!(loaded.templates[0].game, "ROAST");
        assert!(loaded.gold_cards.is_empty());
    }

    #[test]
    fn missing_directory_is_io_error() {
        let provider = RonContentProvider::new("does/not/exist");
        assert!(matches!(provider.templates(), Err(ContentError::Io(_))));
    }

    #[test]
    fn reads_fixture_directory() {
        let provider = RonContentProvider::new("tests/fixtures/content");
        let templates = provider.templates().unwrap();
        assert!(templates.iter().any(|t| t.id == "roast_cursed"));
        let lexicons = provider.lexicons().unwrap();
        assert!(lexicons.iter().any(|l| l.name == "noun"));
    }

    #[test]
    fn subdirectory_lists_are_appended() {
        let provider = RonContentProvider::new("tests/fixtures/content");
        let gold = provider.gold_cards().unwrap();
        assert!(gold.iter().any(|g| g.id == "gold_roast_1"));
        assert!(gold.iter().any(|g| g.id == "gold_extra_1"));
    }

    #[test]
    fn malformed_file_reports_path() {
        let err = parse_ron_list::<Template>(Path::new("tests/fixtures/malformed.ron")).unwrap_err();
        match err {
            ContentError::Ron { path, .. } => assert!(path.ends_with("malformed.ron")),
            other => panic!("expected RON error, got {:?}", other),
        }
    }
}
