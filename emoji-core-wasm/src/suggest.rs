use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::read_config_file;
use crate::error::{Error, Result};

/// Scores above this (or below its negation) leave the neutral bucket.
pub const COARSE_THRESHOLD: f64 = 0.3;
/// Short/long-term gap beyond which the mixed pool replaces the tertiary slot.
pub const DIVERGENCE_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmojiCategory {
    Positive,
    Neutral,
    Negative,
    Mixed,
}

impl EmojiCategory {
    pub const ALL: [EmojiCategory; 4] = [
        EmojiCategory::Positive,
        EmojiCategory::Neutral,
        EmojiCategory::Negative,
        EmojiCategory::Mixed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EmojiCategory::Positive => "positive",
            EmojiCategory::Neutral => "neutral",
            EmojiCategory::Negative => "negative",
            EmojiCategory::Mixed => "mixed",
        }
    }

    pub fn index(self) -> usize {
        match self {
            EmojiCategory::Positive => 0,
            EmojiCategory::Neutral => 1,
            EmojiCategory::Negative => 2,
            EmojiCategory::Mixed => 3,
        }
    }

    /// Three-way bucket used to pick the primary and secondary pools.
    pub fn coarse(score: f64) -> EmojiCategory {
        if score > COARSE_THRESHOLD {
            EmojiCategory::Positive
        } else if score < -COARSE_THRESHOLD {
            EmojiCategory::Negative
        } else {
            EmojiCategory::Neutral
        }
    }
}

impl std::fmt::Display for EmojiCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPools")]
pub struct EmojiPools {
    pub positive: Vec<String>,
    pub neutral: Vec<String>,
    pub negative: Vec<String>,
    pub mixed: Vec<String>,
}

// Category files may group glyphs into named subcategories.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawPool {
    Flat(Vec<String>),
    Nested(BTreeMap<String, Vec<String>>),
}

impl RawPool {
    fn flatten(self) -> Vec<String> {
        match self {
            RawPool::Flat(glyphs) => glyphs,
            RawPool::Nested(groups) => groups.into_values().flatten().collect(),
        }
    }
}

#[derive(Deserialize)]
struct RawPools {
    positive: RawPool,
    neutral: RawPool,
    negative: RawPool,
    mixed: RawPool,
}

impl TryFrom<RawPools> for EmojiPools {
    type Error = String;

    fn try_from(raw: RawPools) -> std::result::Result<Self, Self::Error> {
        let pools = EmojiPools {
            positive: raw.positive.flatten(),
            neutral: raw.neutral.flatten(),
            negative: raw.negative.flatten(),
            mixed: raw.mixed.flatten(),
        };
        for category in EmojiCategory::ALL {
            if pools.pool(category).is_empty() {
                return Err(format!("emoji category `{category}` has no glyphs"));
            }
        }
        Ok(pools)
    }
}

fn owned(glyphs: &[&str]) -> Vec<String> {
    glyphs.iter().map(|g| g.to_string()).collect()
}

impl Default for EmojiPools {
    fn default() -> Self {
        Self {
            positive: owned(&POSITIVE_EMOJIS),
            neutral: owned(&NEUTRAL_EMOJIS),
            negative: owned(&NEGATIVE_EMOJIS),
            mixed: owned(&MIXED_EMOJIS),
        }
    }
}

impl EmojiPools {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        serde_json::from_str(raw)
            .map_err(|e| Error::Config(format!("invalid emoji categories: {e}")))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json_str(&read_config_file(path.as_ref())?)
    }

    pub fn pool(&self, category: EmojiCategory) -> &[String] {
        match category {
            EmojiCategory::Positive => &self.positive,
            EmojiCategory::Neutral => &self.neutral,
            EmojiCategory::Negative => &self.negative,
            EmojiCategory::Mixed => &self.mixed,
        }
    }

    /// First pool containing the glyph, checked positive, neutral, negative, mixed.
    pub fn category_of(&self, glyph: &str) -> Option<EmojiCategory> {
        EmojiCategory::ALL
            .into_iter()
            .find(|c| self.pool(*c).iter().any(|g| g == glyph))
    }
}

/// Probability of each Bernoulli slot, reused as the weights of the fill loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlotWeights {
    pub primary: f64,
    pub secondary: f64,
    pub tertiary: f64,
}

impl Default for SlotWeights {
    fn default() -> Self {
        Self {
            primary: 0.6,
            secondary: 0.3,
            tertiary: 0.1,
        }
    }
}

impl SlotWeights {
    fn as_array(&self) -> [f64; 3] {
        [self.primary, self.secondary, self.tertiary]
    }

    /// Each weight is a Bernoulli probability, so it must lie in [0, 1].
    pub fn validate(&self) -> Result<()> {
        for (name, weight) in [
            ("primary", self.primary),
            ("secondary", self.secondary),
            ("tertiary", self.tertiary),
        ] {
            if !(0.0..=1.0).contains(&weight) {
                return Err(Error::Config(format!(
                    "slot weight `{name}` must be between 0 and 1, got {weight}"
                )));
            }
        }
        Ok(())
    }
}

/// Unpicked glyphs of each pool that still has some, paired with the pool's
/// chance of yielding one of them: its weight times the unpicked fraction.
/// Drawing by these shares gives the same distribution as drawing from whole
/// pools and discarding repeats.
pub(crate) fn remaining_draws<'a>(
    pools: &[&'a [String]; 3],
    weights: [f64; 3],
    picked: &[String],
) -> Vec<(Vec<&'a String>, f64)> {
    pools
        .iter()
        .copied()
        .zip(weights)
        .filter_map(|(pool, weight)| {
            let remaining: Vec<&String> = pool.iter().filter(|g| !picked.contains(g)).collect();
            if remaining.is_empty() {
                return None;
            }
            let share = weight * remaining.len() as f64 / pool.len() as f64;
            Some((remaining, share))
        })
        .collect()
}

/// The primary, secondary and tertiary categories for a sentiment pair.
pub fn select_categories(short_term: f64, long_term: f64) -> [EmojiCategory; 3] {
    let primary = EmojiCategory::coarse(short_term);
    let secondary = EmojiCategory::coarse(long_term);
    let tertiary = if (short_term - long_term).abs() > DIVERGENCE_THRESHOLD {
        EmojiCategory::Mixed
    } else {
        primary
    };
    [primary, secondary, tertiary]
}

#[derive(Debug, Clone)]
pub struct EmojiSuggester {
    pools: EmojiPools,
    weights: SlotWeights,
    rng: StdRng,
}

impl Default for EmojiSuggester {
    fn default() -> Self {
        Self::new()
    }
}

impl EmojiSuggester {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            pools: EmojiPools::default(),
            weights: SlotWeights::default(),
            rng,
        }
    }

    pub fn with_pools(mut self, pools: EmojiPools) -> Self {
        self.pools = pools;
        self
    }

    pub fn with_weights(mut self, weights: SlotWeights) -> Result<Self> {
        weights.validate()?;
        self.weights = weights;
        Ok(self)
    }

    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub fn pools(&self) -> &EmojiPools {
        &self.pools
    }

    /// Up to `count` distinct glyphs in draw order. Returns fewer only when
    /// the three selected pools hold fewer distinct glyphs than requested.
    pub fn suggest(
        &mut self,
        short_term: f64,
        long_term: f64,
        count: usize,
    ) -> Result<Vec<String>> {
        let categories = select_categories(short_term, long_term);
        let pools: [&[String]; 3] = categories.map(|c| self.pools.pool(c));
        let weights = self.weights.as_array();

        let union: HashSet<&str> = pools
            .iter()
            .flat_map(|p| p.iter().map(String::as_str))
            .collect();
        if union.is_empty() {
            return Err(Error::EmptyPools);
        }
        let target = count.min(union.len());
        if target < count {
            warn!(
                requested = count,
                available = union.len(),
                "not enough distinct emojis, capping suggestion count"
            );
        }

        let mut picked: Vec<String> = Vec::with_capacity(target);

        for (pool, p) in pools.iter().zip(weights) {
            if picked.len() >= target {
                break;
            }
            if self.rng.gen_bool(p) {
                if let Some(glyph) = pool.choose(&mut self.rng) {
                    if !picked.contains(glyph) {
                        picked.push(glyph.clone());
                    }
                }
            }
        }

        // Each round draws from glyphs not yet picked, so it always makes progress.
        while picked.len() < target {
            let draws = remaining_draws(&pools, weights, &picked);
            let slot = match WeightedIndex::<f64>::new(draws.iter().map(|(_, share)| *share)) {
                Ok(dist) => dist.sample(&mut self.rng),
                // Only zero weights are left on the pools that still have glyphs.
                Err(_) if !draws.is_empty() => self.rng.gen_range(0..draws.len()),
                Err(_) => break,
            };

            if let Some(glyph) = draws[slot].0.choose(&mut self.rng) {
                picked.push((*glyph).clone());
            }
        }

        debug!(
            short_term,
            long_term,
            primary = %categories[0],
            secondary = %categories[1],
            tertiary = %categories[2],
            suggestions = ?picked,
            "emoji suggestion"
        );
        Ok(picked)
    }
}

const POSITIVE_EMOJIS: [&str; 20] = [
    "😊", "😄", "😁", "😃", "😀", "🙂", "😍", "🥰", "😘", "👍", "🎉", "✨", "🌟", "💯", "🔥", "👏",
    "🤩", "😎", "🌈", "💪",
];

const NEUTRAL_EMOJIS: [&str; 20] = [
    "😐", "🤔", "🙄", "😶", "😑", "🤷", "👀", "💭", "🧐", "🤨", "📝", "🗒️", "📊", "🔍", "⏱️", "📌",
    "🔄", "🔔", "📱", "💻",
];

const NEGATIVE_EMOJIS: [&str; 20] = [
    "😕", "😟", "😔", "😞", "😢", "😭", "😠", "😡", "😤", "👎", "💔", "😓", "😥", "😰", "😨", "😱",
    "😖", "😣", "😩", "😫",
];

const MIXED_EMOJIS: [&str; 20] = [
    "😅", "😬", "😏", "🙃", "😌", "🤐", "😒", "🤥", "😪", "😴", "🤞", "🤝", "🙏", "💆", "🧘", "💅",
    "🤦", "🤷", "🙇", "🤯",
];
