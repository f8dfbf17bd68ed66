use once_cell::sync::OnceCell;
use std::collections::HashMap;

use crate::text::{extract_emojis, is_shouted, word_tokens};

/// Anything that can turn a message into a compound polarity in [-1, 1].
pub trait PolarityScorer {
    fn polarity(&self, text: &str) -> f64;
}

impl<F> PolarityScorer for F
where
    F: Fn(&str) -> f64,
{
    fn polarity(&self, text: &str) -> f64 {
        self(text)
    }
}

// Normalization constant of the compound score: sum / sqrt(sum^2 + ALPHA).
const ALPHA: f64 = 15.0;
const NEGATION_SCALAR: f64 = -0.74;
const BOOSTER_INCREMENT: f64 = 0.293;
const CAPS_INCREMENT: f64 = 0.733;
const EXCLAMATION_INCREMENT: f64 = 0.292;
const MAX_EXCLAMATIONS: usize = 4;
const LOOKBACK: usize = 3;

/// Lexicon-driven scorer in the VADER style: token valences, negation and
/// booster lookback, caps emphasis, "but" contrast and emoji glyphs.
#[derive(Debug, Default, Clone, Copy)]
pub struct LexiconScorer;

impl LexiconScorer {
    pub fn new() -> Self {
        Self
    }
}

impl PolarityScorer for LexiconScorer {
    fn polarity(&self, text: &str) -> f64 {
        compound_score(text)
    }
}

fn lexicon() -> &'static HashMap<&'static str, f64> {
    static LEXICON: OnceCell<HashMap<&'static str, f64>> = OnceCell::new();
    LEXICON.get_or_init(|| WORD_VALENCES.iter().copied().collect())
}

fn boosters() -> &'static HashMap<&'static str, f64> {
    static BOOSTERS: OnceCell<HashMap<&'static str, f64>> = OnceCell::new();
    BOOSTERS.get_or_init(|| {
        let mut map: HashMap<&'static str, f64> = HashMap::new();
        for word in BOOSTER_WORDS {
            map.insert(word, BOOSTER_INCREMENT);
        }
        for word in DAMPENER_WORDS {
            map.insert(word, -BOOSTER_INCREMENT);
        }
        map
    })
}

fn emoji_valence(glyph: &str) -> Option<f64> {
    let bare = glyph.trim_end_matches('\u{FE0F}');
    EMOJI_VALENCES
        .iter()
        .find(|(g, _)| g.trim_end_matches('\u{FE0F}') == bare)
        .map(|(_, v)| *v)
}

fn is_negation(word: &str) -> bool {
    NEGATIONS.contains(&word) || word.ends_with("n't")
}

pub(crate) fn compound_score(text: &str) -> f64 {
    let tokens = word_tokens(text);
    let lowered: Vec<String> = tokens.iter().map(|t| t.to_lowercase()).collect();
    let lex = lexicon();
    let boost = boosters();

    // Caps emphasis only counts when the message is not shouted throughout.
    let mixed_case = tokens.iter().any(|t| is_shouted(t)) && !tokens.iter().all(|t| is_shouted(t));

    let mut valences: Vec<f64> = Vec::with_capacity(tokens.len());
    for (i, word) in lowered.iter().enumerate() {
        let Some(&base) = lex.get(word.as_str()) else {
            valences.push(0.0);
            continue;
        };
        let sign = base.signum();
        let mut valence = base;

        if mixed_case && is_shouted(&tokens[i]) {
            valence += sign * CAPS_INCREMENT;
        }

        let start = i.saturating_sub(LOOKBACK);
        for (distance, prev) in lowered[start..i].iter().rev().enumerate() {
            if let Some(&inc) = boost.get(prev.as_str()) {
                let scale = 1.0 - 0.05 * distance as f64;
                valence += sign * inc * scale;
            }
        }

        if lowered[start..i].iter().any(|prev| is_negation(prev)) {
            valence *= NEGATION_SCALAR;
        }

        valences.push(valence);
    }

    if let Some(but_idx) = lowered.iter().position(|w| w == "but") {
        for (i, v) in valences.iter_mut().enumerate() {
            if i < but_idx {
                *v *= 0.5;
            } else if i > but_idx {
                *v *= 1.5;
            }
        }
    }

    let mut sum: f64 = valences.iter().sum();
    let mut hits = valences.iter().filter(|v| **v != 0.0).count();

    for glyph in extract_emojis(text) {
        if let Some(v) = emoji_valence(&glyph) {
            sum += v;
            hits += 1;
        }
    }

    if hits == 0 || sum == 0.0 {
        return 0.0;
    }

    let exclamations = text.matches('!').count().min(MAX_EXCLAMATIONS) as f64;
    sum += sum.signum() * exclamations * EXCLAMATION_INCREMENT;

    (sum / (sum * sum + ALPHA).sqrt()).clamp(-1.0, 1.0)
}

/// Short- and long-term sentiment over message histories.
#[derive(Debug, Clone)]
pub struct SentimentEngine<S> {
    scorer: S,
}

impl<S: PolarityScorer> SentimentEngine<S> {
    pub fn new(scorer: S) -> Self {
        Self { scorer }
    }

    pub fn short_term(&self, text: &str) -> f64 {
        self.scorer.polarity(text)
    }

    /// Linear recency weighting over the trailing `window` messages: the
    /// oldest retained message weighs 1, the newest weighs `window`.
    pub fn long_term<T: AsRef<str>>(&self, messages: &[T], window: usize) -> f64 {
        let recent = &messages[messages.len().saturating_sub(window)..];
        if recent.is_empty() {
            return 0.0;
        }

        let mut weighted_sum = 0.0;
        let mut total_weight = 0.0;
        for (i, message) in recent.iter().enumerate() {
            let weight = (i + 1) as f64;
            weighted_sum += weight * self.short_term(message.as_ref());
            total_weight += weight;
        }
        weighted_sum / total_weight
    }
}

// Valences on the -4..4 scale used by lexicon scorers of the VADER family.
const WORD_VALENCES: [(&str, f64); 96] = [
    ("love", 3.2),
    ("loved", 2.9),
    ("loving", 2.9),
    ("like", 1.5),
    ("great", 3.1),
    ("good", 1.9),
    ("amazing", 2.8),
    ("awesome", 3.1),
    ("fantastic", 2.6),
    ("wonderful", 2.7),
    ("excellent", 2.7),
    ("nice", 1.8),
    ("cool", 1.3),
    ("fun", 2.3),
    ("yay", 2.4),
    ("happy", 2.7),
    ("glad", 2.0),
    ("thanks", 1.9),
    ("thank", 1.5),
    ("congrats", 2.4),
    ("win", 2.8),
    ("excited", 1.4),
    ("exciting", 2.2),
    ("sweet", 2.0),
    ("wow", 2.8),
    ("perfect", 2.7),
    ("best", 3.2),
    ("brilliant", 2.8),
    ("enjoy", 2.2),
    ("haha", 2.0),
    ("lol", 1.8),
    ("proud", 2.1),
    ("impressed", 2.1),
    ("invaluable", 2.2),
    ("help", 1.7),
    ("helpful", 1.8),
    ("interesting", 1.7),
    ("well", 1.1),
    ("hope", 1.9),
    ("beautiful", 2.9),
    ("celebrate", 2.7),
    ("success", 2.7),
    ("agree", 1.5),
    ("care", 2.2),
    ("fine", 0.8),
    ("okay", 0.9),
    ("ok", 1.2),
    ("pleased", 1.9),
    ("grateful", 2.0),
    ("kind", 2.4),
    ("hate", -2.7),
    ("hated", -3.2),
    ("bad", -2.5),
    ("terrible", -2.1),
    ("awful", -2.0),
    ("horrible", -2.5),
    ("worst", -3.1),
    ("sad", -2.1),
    ("angry", -2.3),
    ("mad", -2.2),
    ("upset", -1.6),
    ("tired", -1.9),
    ("annoyed", -1.6),
    ("annoying", -1.7),
    ("pain", -2.3),
    ("hurt", -2.4),
    ("broken", -2.1),
    ("cry", -2.1),
    ("crying", -2.1),
    ("sucks", -1.5),
    ("lame", -1.8),
    ("lost", -1.3),
    ("problem", -1.7),
    ("problems", -1.7),
    ("issue", -0.6),
    ("issues", -0.6),
    ("sorry", -0.3),
    ("ugh", -1.8),
    ("disappointed", -1.9),
    ("concerned", -1.2),
    ("disagree", -1.6),
    ("frustrated", -2.4),
    ("challenges", -0.6),
    ("worried", -1.2),
    ("fail", -2.5),
    ("failed", -2.3),
    ("stupid", -2.4),
    ("boring", -1.3),
    ("afraid", -1.9),
    ("lonely", -1.5),
    ("miss", -0.6),
    ("wrong", -2.1),
    ("serious", -0.3),
    ("lack", -1.3),
    ("below", -0.6),
    ("fix", -0.2),
];

const BOOSTER_WORDS: [&str; 10] = [
    "very",
    "really",
    "so",
    "extremely",
    "absolutely",
    "totally",
    "incredibly",
    "super",
    "completely",
    "most",
];

const DAMPENER_WORDS: [&str; 6] = ["slightly", "somewhat", "kinda", "barely", "hardly", "little"];

const NEGATIONS: [&str; 11] = [
    "not", "no", "never", "none", "nobody", "nothing", "neither", "nor", "cannot", "without",
    "isnt",
];

const EMOJI_VALENCES: [(&str, f64); 22] = [
    ("😀", 2.0),
    ("😃", 2.0),
    ("😄", 2.2),
    ("😁", 2.0),
    ("😆", 1.8),
    ("😍", 2.8),
    ("😊", 2.2),
    ("😂", 1.6),
    ("🤣", 1.6),
    ("👍", 1.8),
    ("🎉", 2.4),
    ("❤️", 2.8),
    ("😢", -2.1),
    ("😭", -2.3),
    ("😡", -2.6),
    ("😠", -2.4),
    ("👎", -1.8),
    ("💔", -2.6),
    ("😞", -2.0),
    ("😔", -1.8),
    ("🙁", -1.5),
    ("☹️", -1.7),
];
