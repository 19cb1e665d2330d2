pub mod catalog;
pub mod config;
pub mod engine;
pub mod gold;
pub mod lexicon;
pub mod options;
pub mod scoring;
pub mod selector;
pub mod slots;
