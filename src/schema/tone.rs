use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// Intensity or cultural-specificity tier, always in 1..=3.
///
/// Out-of-range values are clamped on construction and when deserialized,
/// so a `Tier` read from content data can never escape the valid range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "u8")]
pub struct Tier(u8);

impl Tier {
    pub const MIN: Tier = Tier(1);
    pub const MAX: Tier = Tier(3);

    pub fn new(value: i64) -> Self {
        Tier(value.clamp(1, 3) as u8)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Tier {
    fn default() -> Self {
        Self::MIN
    }
}

impl From<i64> for Tier {
    fn from(value: i64) -> Self {
        Tier::new(value)
    }
}

impl From<Tier> for u8 {
    fn from(tier: Tier) -> Self {
        tier.0
    }
}

/// Anything that carries tone tags and can be matched against a request.
pub trait Toned {
    fn id(&self) -> &str;
    fn family(&self) -> &str;
    fn spice(&self) -> Tier;
    fn locality(&self) -> Tier;

    /// Smallest party the item is meant for, if any.
    fn min_players(&self) -> Option<usize> {
        None
    }
}

/// The caller's constraints for one generation call.
///
/// `spice` and `locality` are minimum tiers. Family include/exclude sets
/// are optional; an empty include set admits every family. `players` are
/// the names at the table: they fill `{target_name}` slots and gate
/// content with a `min_players` requirement. `recent_families` is a soft
/// preference, never a filter: see `CardSelector::select`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToneRequest {
    #[serde(default)]
    pub spice: Tier,
    #[serde(default)]
    pub locality: Tier,
    #[serde(default)]
    pub include_families: FxHashSet<String>,
    #[serde(default)]
    pub exclude_families: FxHashSet<String>,
    #[serde(default)]
    pub players: Vec<String>,
    #[serde(default)]
    pub recent_families: FxHashSet<String>,
}

impl ToneRequest {
    /// A request with the given minimum tiers. Values outside 1..=3 are
    /// clamped, which never narrows the accepted range.
    pub fn new(spice: i64, locality: i64) -> Self {
        Self {
            spice: Tier::new(spice),
            locality: Tier::new(locality),
            ..Self::default()
        }
    }

    pub fn include_family(mut self, family: &str) -> Self {
        self.include_families.insert(family.to_string());
        self
    }

    pub fn exclude_family(mut self, family: &str) -> Self {
        self.exclude_families.insert(family.to_string());
        self
    }

    /// Trimmed, non-blank names; a name repeated case-insensitively is kept once.
    pub fn with_players<S: AsRef<str>>(mut self, players: &[S]) -> Self {
        self.players.clear();
        for name in players {
            let name = name.as_ref().trim();
            if !name.is_empty() && !self.players.iter().any(|p| p.eq_ignore_ascii_case(name)) {
                self.players.push(name.to_string());
            }
        }
        self
    }

    pub fn avoid_recent_family(mut self, family: &str) -> Self {
        self.recent_families.insert(family.to_string());
        self
    }

    /// True if `item` satisfies every constraint of this request.
    pub fn admits<T: Toned + ?Sized>(&self, item: &T) -> bool {
        item.spice() >= self.spice
            && item.locality() >= self.locality
            && (self.include_families.is_empty() || self.include_families.contains(item.family()))
            && !self.exclude_families.contains(item.family())
            && item.min_players().map_or(true, |n| self.players.len() >= n)
    }

    /// True if `item` belongs to a family shown recently.
    pub fn is_recent_family<T: Toned + ?Sized>(&self, item: &T) -> bool {
        self.recent_families.contains(item.family())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Tagged {
        family: &'static str,
        spice: i64,
        locality: i64,
    }

    struct PartyCard {
        min_players: usize,
    }

    impl Toned for PartyCard {
        fn id(&self) -> &str {
            "party"
        }
        fn family(&self) -> &str {
            "party"
        }
        fn spice(&self) -> Tier {
            Tier::MIN
        }
        fn locality(&self) -> Tier {
            Tier::MIN
        }
        fn min_players(&self) -> Option<usize> {
            Some(self.min_players)
        }
    }

    impl Toned for Tagged {
        fn id(&self) -> &str {
            "tagged"
        }
        fn family(&self) -> &str {
            self.family
        }
        fn spice(&self) -> Tier {
            Tier::new(self.spice)
        }
        fn locality(&self) -> Tier {
            Tier::new(self.locality)
        }
    }

    #[test]
    fn tier_clamps_out_of_range() {
        assert_eq!(Tier::new(0).get(), 1);
        assert_eq!(Tier::new(-4).get(), 1);
        assert_eq!(Tier::new(2).get(), 2);
        assert_eq!(Tier::new(9).get(), 3);
    }

    #[test]
    fn tier_deserializes_clamped() {
        let tier: Tier = ron::from_str("7").unwrap();
        assert_eq!(tier, Tier::MAX);
        let tier: Tier = ron::from_str("0").unwrap();
        assert_eq!(tier, Tier::MIN);
    }

    #[test]
    fn request_is_minimum_tier() {
        let req = ToneRequest::new(2, 1);
        assert!(req.admits(&Tagged { family: "f", spice: 2, locality: 1 }));
        assert!(req.admits(&Tagged { family: "f", spice: 3, locality: 3 }));
        assert!(!req.admits(&Tagged { family: "f", spice: 1, locality: 3 }));
    }

    #[test]
    fn out_of_range_request_never_narrower() {
        let low = ToneRequest::new(-1, 0);
        assert!(low.admits(&Tagged { family: "f", spice: 1, locality: 1 }));

        let high = ToneRequest::new(10, 10);
        assert!(high.admits(&Tagged { family: "f", spice: 3, locality: 3 }));
    }

    #[test]
    fn family_include_and_exclude() {
        let req = ToneRequest::new(1, 1)
            .include_family("roast")
            .exclude_family("dark");
        assert!(req.admits(&Tagged { family: "roast", spice: 1, locality: 1 }));
        assert!(!req.admits(&Tagged { family: "other", spice: 1, locality: 1 }));

        let exclude_only = ToneRequest::new(1, 1).exclude_family("dark");
        assert!(!exclude_only.admits(&Tagged { family: "dark", spice: 1, locality: 1 }));
        assert!(exclude_only.admits(&Tagged { family: "light", spice: 1, locality: 1 }));
    }

    #[test]
    fn min_players_needs_enough_names() {
        let card = PartyCard { min_players: 3 };
        assert!(!ToneRequest::new(1, 1).admits(&card));
        assert!(!ToneRequest::new(1, 1).with_players(&["Sam", "Jo"]).admits(&card));
        assert!(ToneRequest::new(1, 1).with_players(&["Sam", "Jo", "Alex"]).admits(&card));
        // no requirement means any party size
        assert!(ToneRequest::new(1, 1).admits(&Tagged { family: "f", spice: 1, locality: 1 }));
    }

    #[test]
    fn players_are_trimmed_and_deduplicated() {
        let req = ToneRequest::new(1, 1).with_players(&[" Sam ", "", "sam", "Jo", "  "]);
        assert_eq!(req.players, vec!["Sam".to_string(), "Jo".to_string()]);
    }

    #[test]
    fn recent_family_does_not_filter() {
        let req = ToneRequest::new(1, 1).avoid_recent_family("roast");
        let roast = Tagged { family: "roast", spice: 1, locality: 1 };
        assert!(req.admits(&roast));
        assert!(req.is_recent_family(&roast));
        assert!(!req.is_recent_family(&Tagged { family: "other", spice: 1, locality: 1 }));
    }
}
