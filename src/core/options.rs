//! Response option builder: turns a declared mechanic into displayable options.

use rand::Rng;
use tracing::debug;

use crate::core::slots::SlotResolver;
use crate::schema::card::FilledSlots;
use crate::schema::mechanic::{ChoiceSide, RenderedOptions, ResponseMechanic};

/// Resolve `mechanic` against the slot words drawn for the card body.
/// Slot-derived sides whose slot was never filled use their fallback.
pub fn build(mechanic: &ResponseMechanic, filled: &FilledSlots) -> RenderedOptions {
    match mechanic {
        ResponseMechanic::None => RenderedOptions::Empty,
        ResponseMechanic::PlayerVote => RenderedOptions::OpenVote,
        ResponseMechanic::TwoChoice { a, b } => RenderedOptions::TwoChoice {
            a: resolve_side(a, filled).to_string(),
            b: resolve_side(b, filled).to_string(),
        },
    }
}

/// Like [`build`], but when both sides of a two-choice pair come out equal
/// and side B is slot-derived, side B is redrawn from its lexicon so the
/// pair never echoes one word.
pub fn build_distinct<R: Rng + ?Sized>(
    mechanic: &ResponseMechanic,
    filled: &FilledSlots,
    resolver: &SlotResolver<'_>,
    rng: &mut R,
) -> RenderedOptions {
    let (a, b) = match build(mechanic, filled) {
        RenderedOptions::TwoChoice { a, b } => (a, b),
        other => return other,
    };
    let ResponseMechanic::TwoChoice {
        b: ChoiceSide::Slot { slot, fallback },
        ..
    } = mechanic
    else {
        return RenderedOptions::TwoChoice { a, b };
    };
    if !a.eq_ignore_ascii_case(&b) {
        return RenderedOptions::TwoChoice { a, b };
    }

    let b = match resolver.draw(slot, Some(a.as_str()), rng) {
        Some(word) => word.to_string(),
        None if !fallback.eq_ignore_ascii_case(&a) => fallback.clone(),
        None => {
            debug!(slot = %slot, "no distinct word for side B, keeping duplicate pair");
            b
        }
    };
    RenderedOptions::TwoChoice { a, b }
}

fn resolve_side<'a>(side: &'a ChoiceSide, filled: &'a FilledSlots) -> &'a str {
    match side {
        ChoiceSide::Literal(text) => text,
        ChoiceSide::Slot { slot, fallback } => filled.get(slot).unwrap_or(fallback),
    }
}
