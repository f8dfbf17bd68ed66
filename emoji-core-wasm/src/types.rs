use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::categorize::SentimentCategory;
use crate::suggest::EmojiCategory;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Count {
    pub label: String,
    pub value: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub speaker: String,
    pub message: String,
}

pub type Conversation = Vec<Turn>;

/// One analysed message as persisted by a replay run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionRecord {
    pub conversation_id: u32,
    pub message_id: u32,
    pub message: String,
    pub short_term_sentiment: f64,
    pub long_term_sentiment: f64,
    /// Glyphs joined with single spaces.
    pub suggested_emojis: String,
    pub sentiment_category: SentimentCategory,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub short_term: f64,
    pub long_term: f64,
    pub category: SentimentCategory,
    pub emojis: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub overall_accuracy: f64,
    pub accuracy_by_sentiment: BTreeMap<String, f64>,
    pub confusion_matrix: [[u32; 4]; 4],
    pub confusion_matrix_labels: [String; 4],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordEvaluation {
    pub conversation_id: u32,
    pub message_id: u32,
    pub sentiment_category: SentimentCategory,
    pub expected_category: EmojiCategory,
    pub emojis: Vec<String>,
    /// `None` marks a glyph outside every pool.
    pub emoji_categories: Vec<Option<EmojiCategory>>,
    pub match_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCrosstab {
    pub sentiment: SentimentCategory,
    pub positive: u32,
    pub neutral: u32,
    pub negative: u32,
    pub mixed: u32,
    pub unknown: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub summary: EvaluationSummary,
    pub records: Vec<RecordEvaluation>,
    pub sentiment_distribution: Vec<Count>,
    pub category_by_sentiment: Vec<CategoryCrosstab>,
}
