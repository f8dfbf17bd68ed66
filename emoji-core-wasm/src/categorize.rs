use serde::{Deserialize, Serialize};

use crate::suggest::EmojiCategory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentCategory {
    VeryPositive,
    Positive,
    SlightlyPositive,
    Neutral,
    SlightlyNegative,
    Negative,
    VeryNegative,
}

impl SentimentCategory {
    pub const ALL: [SentimentCategory; 7] = [
        SentimentCategory::VeryPositive,
        SentimentCategory::Positive,
        SentimentCategory::SlightlyPositive,
        SentimentCategory::Neutral,
        SentimentCategory::SlightlyNegative,
        SentimentCategory::Negative,
        SentimentCategory::VeryNegative,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SentimentCategory::VeryPositive => "very_positive",
            SentimentCategory::Positive => "positive",
            SentimentCategory::SlightlyPositive => "slightly_positive",
            SentimentCategory::Neutral => "neutral",
            SentimentCategory::SlightlyNegative => "slightly_negative",
            SentimentCategory::Negative => "negative",
            SentimentCategory::VeryNegative => "very_negative",
        }
    }

    /// The emoji category a suggestion for this band is expected to come from.
    pub fn expected_emoji_category(self) -> EmojiCategory {
        match self {
            SentimentCategory::VeryPositive
            | SentimentCategory::Positive
            | SentimentCategory::SlightlyPositive => EmojiCategory::Positive,
            SentimentCategory::Neutral => EmojiCategory::Neutral,
            SentimentCategory::SlightlyNegative
            | SentimentCategory::Negative
            | SentimentCategory::VeryNegative => EmojiCategory::Negative,
        }
    }
}

impl std::fmt::Display for SentimentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Band boundaries, checked top-down. The three positive bounds are
/// inclusive, the lower three are strict.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub very_positive: f64,
    pub positive: f64,
    pub slightly_positive: f64,
    pub neutral_lower: f64,
    pub negative: f64,
    pub very_negative: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            very_positive: 0.6,
            positive: 0.3,
            slightly_positive: 0.1,
            neutral_lower: -0.1,
            negative: -0.3,
            very_negative: -0.6,
        }
    }
}

impl Thresholds {
    pub(crate) fn ordered(&self) -> [(&'static str, f64); 6] {
        [
            ("very_positive", self.very_positive),
            ("positive", self.positive),
            ("slightly_positive", self.slightly_positive),
            ("neutral_lower", self.neutral_lower),
            ("negative", self.negative),
            ("very_negative", self.very_negative),
        ]
    }

    pub fn categorize(&self, score: f64) -> SentimentCategory {
        if score >= self.very_positive {
            SentimentCategory::VeryPositive
        } else if score >= self.positive {
            SentimentCategory::Positive
        } else if score >= self.slightly_positive {
            SentimentCategory::SlightlyPositive
        } else if score > self.neutral_lower {
            SentimentCategory::Neutral
        } else if score > self.negative {
            SentimentCategory::SlightlyNegative
        } else if score > self.very_negative {
            SentimentCategory::Negative
        } else {
            SentimentCategory::VeryNegative
        }
    }
}
