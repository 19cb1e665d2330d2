//! Party Card Engine: card generation and scoring for party games.
//!
//! Produces ready-to-display cards by blending curated gold cards with
//! templates filled from word banks, attaches response options, and turns
//! audience reactions into points. All randomness comes from a caller
//! supplied RNG, so identical seeds and content give identical cards.

pub mod content;
pub mod core;
pub mod schema;

pub use crate::content::{ContentProvider, RonContentProvider, StaticContent};
pub use crate::core::config::EngineConfig;
pub use crate::core::engine::{CardEngine, EngineError};
pub use crate::core::selector::{DrawnCard, SelectError};
