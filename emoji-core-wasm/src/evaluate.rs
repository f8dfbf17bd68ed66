use std::collections::BTreeMap;

use tracing::{info, warn};

use crate::categorize::SentimentCategory;
use crate::suggest::{EmojiCategory, EmojiPools};
use crate::text::split_glyphs;
use crate::types::{
    CategoryCrosstab, Count, Evaluation, EvaluationSummary, RecordEvaluation, SuggestionRecord,
};

/// Share of glyphs whose category equals `expected`; 0 for an empty set.
pub fn match_percentage(categories: &[Option<EmojiCategory>], expected: EmojiCategory) -> f64 {
    if categories.is_empty() {
        return 0.0;
    }
    let matches = categories.iter().filter(|c| **c == Some(expected)).count();
    matches as f64 / categories.len() as f64
}

fn evaluate_record(record: &SuggestionRecord, pools: &EmojiPools) -> RecordEvaluation {
    let emojis = split_glyphs(&record.suggested_emojis);
    let emoji_categories: Vec<Option<EmojiCategory>> =
        emojis.iter().map(|g| pools.category_of(g)).collect();
    let expected = record.sentiment_category.expected_emoji_category();

    for (glyph, category) in emojis.iter().zip(&emoji_categories) {
        if category.is_none() {
            warn!(
                conversation_id = record.conversation_id,
                message_id = record.message_id,
                glyph = %glyph,
                "suggested emoji is not in any category pool"
            );
        }
    }

    RecordEvaluation {
        conversation_id: record.conversation_id,
        message_id: record.message_id,
        sentiment_category: record.sentiment_category,
        expected_category: expected,
        match_percentage: match_percentage(&emoji_categories, expected),
        emojis,
        emoji_categories,
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

pub fn evaluate(records: &[SuggestionRecord], pools: &EmojiPools) -> Evaluation {
    let evaluated: Vec<RecordEvaluation> =
        records.iter().map(|r| evaluate_record(r, pools)).collect();

    let ratios: Vec<f64> = evaluated.iter().map(|r| r.match_percentage).collect();
    let overall_accuracy = mean(&ratios);

    let mut by_sentiment: BTreeMap<SentimentCategory, Vec<f64>> = BTreeMap::new();
    for r in &evaluated {
        by_sentiment
            .entry(r.sentiment_category)
            .or_default()
            .push(r.match_percentage);
    }
    let accuracy_by_sentiment: BTreeMap<String, f64> = by_sentiment
        .iter()
        .map(|(category, values)| (category.as_str().to_string(), mean(values)))
        .collect();

    // Rows are the expected category, columns the observed one. Unknown glyphs
    // have no column and are left out.
    let mut confusion_matrix = [[0u32; 4]; 4];
    for r in &evaluated {
        for observed in r.emoji_categories.iter().flatten() {
            confusion_matrix[r.expected_category.index()][observed.index()] += 1;
        }
    }

    let sentiment_distribution: Vec<Count> = SentimentCategory::ALL
        .iter()
        .map(|category| Count {
            label: category.as_str().to_string(),
            value: by_sentiment.get(category).map_or(0, |v| v.len() as u32),
        })
        .collect();

    let category_by_sentiment = crosstab(&evaluated);

    info!(
        records = evaluated.len(),
        overall_accuracy, "evaluated emoji suggestions"
    );

    Evaluation {
        summary: EvaluationSummary {
            overall_accuracy,
            accuracy_by_sentiment,
            confusion_matrix,
            confusion_matrix_labels: EmojiCategory::ALL.map(|c| c.as_str().to_string()),
        },
        records: evaluated,
        sentiment_distribution,
        category_by_sentiment,
    }
}

fn crosstab(evaluated: &[RecordEvaluation]) -> Vec<CategoryCrosstab> {
    let mut rows: BTreeMap<SentimentCategory, CategoryCrosstab> = BTreeMap::new();
    for r in evaluated {
        let row = rows
            .entry(r.sentiment_category)
            .or_insert_with(|| CategoryCrosstab {
                sentiment: r.sentiment_category,
                positive: 0,
                neutral: 0,
                negative: 0,
                mixed: 0,
                unknown: 0,
            });
        for category in &r.emoji_categories {
            match category {
                Some(EmojiCategory::Positive) => row.positive += 1,
                Some(EmojiCategory::Neutral) => row.neutral += 1,
                Some(EmojiCategory::Negative) => row.negative += 1,
                Some(EmojiCategory::Mixed) => row.mixed += 1,
                None => row.unknown += 1,
            }
        }
    }
    rows.into_values().collect()
}

pub fn parse_records(raw: &str) -> crate::Result<Vec<SuggestionRecord>> {
    Ok(serde_json::from_str(raw)?)
}
