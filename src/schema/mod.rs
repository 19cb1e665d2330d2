pub mod card;
pub mod feedback;
pub mod lexicon;
pub mod mechanic;
pub mod template;
pub mod tone;
