use serde::Serialize;
use wasm_bindgen::prelude::*;

mod categorize;
mod config;
mod error;
mod evaluate;
mod pipeline;
mod replay;
mod sentiment;
mod store;
mod suggest;
mod text;
mod types;

pub use categorize::{SentimentCategory, Thresholds};
pub use config::{AnalysisWindows, SentimentConfig, Weights, DEFAULT_SUGGESTION_COUNT};
pub use error::{Error, Result};
pub use evaluate::{evaluate, match_percentage, parse_records};
pub use pipeline::{EmojiPipeline, GREETING_EMOJIS};
pub use replay::{synthesize_conversations, Replay, DEFAULT_ANALYZED_SPEAKER};
pub use sentiment::{LexiconScorer, PolarityScorer, SentimentEngine};
pub use store::{DefaultSeed, MessageStore, SeedProvider, SeedUser, StaticSeed, StoredMessage};
pub use suggest::{
    select_categories, EmojiCategory, EmojiPools, EmojiSuggester, SlotWeights, COARSE_THRESHOLD,
    DIVERGENCE_THRESHOLD,
};
pub use types::{
    CategoryCrosstab, Conversation, Count, Evaluation, EvaluationSummary, RecordEvaluation,
    Suggestion, SuggestionRecord, Turn,
};

// Performance timing helpers, enabled via `--features timing` for debugging.
#[cfg(all(target_arch = "wasm32", feature = "timing"))]
fn perf_now() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

#[cfg(all(target_arch = "wasm32", feature = "timing"))]
macro_rules! log_step {
    ($label:expr, $start:expr) => {
        web_sys::console::log_1(
            &format!("[wasm] {} took {:.1}ms", $label, perf_now() - $start).into(),
        );
    };
}

/// A pipeline scored by the built-in lexicon, seeded when `seed` is given.
pub fn lexicon_pipeline(config: SentimentConfig, seed: Option<u64>) -> EmojiPipeline<LexiconScorer> {
    let suggester = match seed {
        Some(seed) => EmojiSuggester::with_seed(seed),
        None => EmojiSuggester::new(),
    };
    EmojiPipeline::new(LexiconScorer::new(), config, suggester)
}

fn to_js<T: Serialize>(value: &T) -> std::result::Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn js_err(e: Error) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[wasm_bindgen]
pub fn init_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Browser-facing chat session: one store per session, nothing shared.
#[wasm_bindgen]
pub struct ChatSession {
    pipeline: EmojiPipeline<LexiconScorer>,
}

#[wasm_bindgen]
impl ChatSession {
    #[wasm_bindgen(constructor)]
    pub fn new(
        config_json: Option<String>,
        seed: Option<u32>,
    ) -> std::result::Result<ChatSession, JsValue> {
        let config = match config_json {
            Some(raw) => SentimentConfig::from_json_str(&raw).map_err(js_err)?,
            None => SentimentConfig::default(),
        };
        Ok(ChatSession {
            pipeline: lexicon_pipeline(config, seed.map(u64::from)),
        })
    }

    pub fn add_message(&mut self, user: &str, text: &str) {
        self.pipeline.add_message(user, text);
    }

    pub fn reset(&mut self) {
        self.pipeline.reset();
    }

    pub fn reload_config(&mut self, config_json: &str) -> std::result::Result<(), JsValue> {
        let config = SentimentConfig::from_json_str(config_json).map_err(js_err)?;
        self.pipeline.reload_config(config).map_err(js_err)
    }

    pub fn short_term(&self, text: &str) -> f64 {
        self.pipeline.short_term(text)
    }

    pub fn suggest_for(&mut self, user: &str) -> std::result::Result<JsValue, JsValue> {
        #[cfg(all(target_arch = "wasm32", feature = "timing"))]
        let t0 = perf_now();

        let suggestion = self.pipeline.suggest_for(user).map_err(js_err)?;

        #[cfg(all(target_arch = "wasm32", feature = "timing"))]
        log_step!("suggest_for", t0);

        to_js(&suggestion)
    }

    /// Just the glyphs, for callers that only render buttons.
    pub fn suggestion_glyphs(&mut self, user: &str) -> std::result::Result<js_sys::Array, JsValue> {
        let suggestion = self.pipeline.suggest_for(user).map_err(js_err)?;
        Ok(suggestion
            .emojis
            .iter()
            .map(|g| JsValue::from_str(g))
            .collect())
    }

    pub fn conversation(&self) -> std::result::Result<JsValue, JsValue> {
        to_js(&self.pipeline.conversation())
    }
}

#[wasm_bindgen]
pub fn evaluate_results(records_json: &str) -> std::result::Result<JsValue, JsValue> {
    #[cfg(all(target_arch = "wasm32", feature = "timing"))]
    let t0 = perf_now();

    let records = parse_records(records_json).map_err(js_err)?;
    let evaluation = evaluate(&records, &EmojiPools::default());

    #[cfg(all(target_arch = "wasm32", feature = "timing"))]
    log_step!("evaluate_results", t0);

    to_js(&evaluation.summary)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn evaluate_results_native(
    records_json: &str,
    pools_json: Option<&str>,
) -> std::result::Result<String, String> {
    let records = parse_records(records_json).map_err(|e| e.to_string())?;
    let pools = match pools_json {
        Some(raw) => EmojiPools::from_json_str(raw).map_err(|e| e.to_string())?,
        None => EmojiPools::default(),
    };
    let evaluation = evaluate(&records, &pools);
    serde_json::to_string(&evaluation.summary).map_err(|e| e.to_string())
}

#[cfg(not(target_arch = "wasm32"))]
pub fn replay_native(
    conversations_json: &str,
    config: SentimentConfig,
    seed: Option<u64>,
) -> std::result::Result<String, String> {
    let conversations: Vec<Conversation> =
        serde_json::from_str(conversations_json).map_err(|e| e.to_string())?;
    let mut pipeline = lexicon_pipeline(config, seed);
    let records = pipeline.replay(&conversations).map_err(|e| e.to_string())?;
    serde_json::to_string(&records).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};

    fn fixed(scores: &[(&str, f64)]) -> impl Fn(&str) -> f64 {
        let map: HashMap<String, f64> = scores
            .iter()
            .map(|(text, score)| (text.to_string(), *score))
            .collect();
        move |text: &str| map.get(text).copied().unwrap_or(0.0)
    }

    fn tiny_pools() -> EmojiPools {
        EmojiPools {
            positive: vec!["P".into()],
            neutral: vec!["N".into()],
            negative: vec!["X".into()],
            mixed: vec!["M".into()],
        }
    }

    fn record(category: SentimentCategory, emojis: &str) -> SuggestionRecord {
        SuggestionRecord {
            conversation_id: 0,
            message_id: 1,
            message: "msg".into(),
            short_term_sentiment: 0.0,
            long_term_sentiment: 0.0,
            suggested_emojis: emojis.into(),
            sentiment_category: category,
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn long_term_of_nothing_is_neutral() {
        let engine = SentimentEngine::new(LexiconScorer::new());
        let empty: [&str; 0] = [];
        assert_eq!(engine.long_term(&empty, 10), 0.0);
    }

    #[test]
    fn single_message_long_term_matches_short_term() {
        let engine = SentimentEngine::new(LexiconScorer::new());
        for text in ["I love this!", "I hate this", "What do you think?"] {
            assert_eq!(engine.long_term(&[text], 10), engine.short_term(text));
        }
    }

    #[test]
    fn long_term_weights_recent_messages_more() {
        let engine = SentimentEngine::new(fixed(&[("a", 1.0), ("b", 0.0), ("c", -1.0)]));
        // (1*1 + 2*0 + 3*-1) / 6
        assert!(approx(engine.long_term(&["a", "b", "c"], 10), -2.0 / 6.0));
        assert!(approx(engine.long_term(&["c", "b", "a"], 10), 2.0 / 6.0));
    }

    #[test]
    fn long_term_only_reads_trailing_window() {
        let engine = SentimentEngine::new(fixed(&[("bad", -1.0), ("good", 1.0)]));
        let mut messages = vec!["bad", "bad"];
        messages.extend(std::iter::repeat("good").take(10));
        assert_eq!(engine.long_term(&messages, 10), 1.0);
        assert!(engine.long_term(&messages, 12) < 1.0);
    }

    #[test]
    fn long_term_stays_in_range() {
        let engine = SentimentEngine::new(LexiconScorer::new());
        let messages = [
            "I LOVE this so much!!!",
            "worst day ever, I hate everything",
            "ok",
            "not bad at all",
            "😭😭😭",
            "amazing wonderful fantastic great best",
        ];
        for window in 1..=messages.len() {
            let score = engine.long_term(&messages, window);
            assert!((-1.0..=1.0).contains(&score), "window {window}: {score}");
        }
    }

    #[test]
    fn lexicon_scores_polarity() {
        let scorer = LexiconScorer::new();
        let hate = scorer.polarity("I hate this");
        assert!(hate < -0.3, "got {hate}");
        assert!(scorer.polarity("I love this!") > 0.3);
        assert_eq!(scorer.polarity("The meeting is at noon"), 0.0);
        assert_eq!(scorer.polarity(""), 0.0);
    }

    #[test]
    fn lexicon_handles_negation_boosters_and_emphasis() {
        let scorer = LexiconScorer::new();
        let good = scorer.polarity("this is good");
        assert!(scorer.polarity("this is not good") < 0.0);
        assert!(scorer.polarity("this isn't good") < 0.0);
        assert!(scorer.polarity("this is very good") > good);
        assert!(scorer.polarity("this is slightly good") < good);
        assert!(scorer.polarity("this is GOOD") > good);
        assert!(scorer.polarity("this is good!!") > good);
        assert!(scorer.polarity("it was bad but the ending was great") > 0.0);
    }

    #[test]
    fn lexicon_reads_emojis_and_skips_urls() {
        let scorer = LexiconScorer::new();
        assert!(scorer.polarity("😭") < 0.0);
        assert!(scorer.polarity("ok ❤️") > scorer.polarity("ok"));
        assert_eq!(scorer.polarity("see https://great.example.com/love"), 0.0);
    }

    #[test]
    fn categorizer_boundaries_are_inclusive_on_the_upper_side() {
        let t = Thresholds::default();
        assert_eq!(t.categorize(1.0), SentimentCategory::VeryPositive);
        assert_eq!(t.categorize(0.6), SentimentCategory::VeryPositive);
        assert_eq!(t.categorize(0.6 - 1e-9), SentimentCategory::Positive);
        assert_eq!(t.categorize(0.3), SentimentCategory::Positive);
        assert_eq!(t.categorize(0.1), SentimentCategory::SlightlyPositive);
        assert_eq!(t.categorize(0.0), SentimentCategory::Neutral);
        assert_eq!(t.categorize(-0.1), SentimentCategory::SlightlyNegative);
        assert_eq!(t.categorize(-0.3), SentimentCategory::Negative);
        assert_eq!(t.categorize(-0.6), SentimentCategory::VeryNegative);
        assert_eq!(t.categorize(-1.0), SentimentCategory::VeryNegative);
    }

    #[test]
    fn categorizer_is_total_over_range() {
        let t = Thresholds::default();
        let mut seen = HashSet::new();
        for step in 0..=2000 {
            let score = -1.0 + step as f64 * 0.001;
            seen.insert(t.categorize(score));
        }
        assert_eq!(seen.len(), SentimentCategory::ALL.len());
    }

    #[test]
    fn sentiment_bands_map_to_expected_emoji_categories() {
        use SentimentCategory::*;
        for c in [VeryPositive, Positive, SlightlyPositive] {
            assert_eq!(c.expected_emoji_category(), EmojiCategory::Positive);
        }
        assert_eq!(Neutral.expected_emoji_category(), EmojiCategory::Neutral);
        for c in [SlightlyNegative, Negative, VeryNegative] {
            assert_eq!(c.expected_emoji_category(), EmojiCategory::Negative);
        }
    }

    #[test]
    fn config_accepts_legacy_threshold_keys() {
        let raw = r#"{
            "thresholds": {
                "very_positive": 0.6, "positive": 0.3, "slightly_positive": 0.1,
                "neutral_upper": 0.1, "neutral_lower": -0.1, "slightly_negative": -0.1,
                "negative": -0.3, "very_negative": -0.6
            },
            "weights": {"short_term": 0.6, "long_term": 0.3, "context": 0.1},
            "analysis": {"short_term_window": 1, "long_term_window": 10, "context_window": 20}
        }"#;
        let config = SentimentConfig::from_json_str(raw).unwrap();
        assert_eq!(config, SentimentConfig::default());
    }

    #[test]
    fn config_thresholds_override_categorizer() {
        let mut config = SentimentConfig::default();
        config.thresholds.very_positive = 0.9;
        let raw = config.to_json_pretty().unwrap();
        let loaded = SentimentConfig::from_json_str(&raw).unwrap();
        assert_eq!(loaded.thresholds.categorize(0.7), SentimentCategory::Positive);
    }

    #[test]
    fn config_errors_are_reported() {
        let err = SentimentConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, Error::Config(_)), "got {err}");

        let err = SentimentConfig::from_json_str(r#"{"thresholds": {}}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)), "got {err}");

        let mut config = SentimentConfig::default();
        config.thresholds.negative = 0.5;
        let raw = serde_json::to_string(&config).unwrap();
        let err = SentimentConfig::from_json_str(&raw).unwrap_err();
        assert!(matches!(err, Error::Config(_)), "got {err}");

        let mut config = SentimentConfig::default();
        config.analysis.long_term_window = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let err = SentimentConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, Error::Config(_)), "got {err}");
        assert!(err.to_string().contains("/definitely/not/here.json"));

        let err = EmojiPools::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, Error::Config(_)), "got {err}");
        let err = EmojiPools::from_json_str("[1, 2").unwrap_err();
        assert!(matches!(err, Error::Config(_)), "got {err}");
    }

    #[test]
    fn store_starts_from_seed_and_appends() {
        let mut store = MessageStore::default();
        assert_eq!(store.users(), vec!["User 1", "User 2"]);
        assert_eq!(store.recent_messages("User 2", 10), vec!["Hi there", "I'm doing well"]);

        store.add_message("User 2", "I hate this");
        store.add_message("User 3", "");
        assert_eq!(store.recent_messages("User 2", 2), vec!["I'm doing well", "I hate this"]);
        assert!(store.has_messages("User 3"));
        assert_eq!(store.recent_messages("User 3", 10), vec![""]);
        assert!(store.recent_messages("nobody", 10).is_empty());
        assert!(!store.has_messages("nobody"));
    }

    #[test]
    fn conversation_merges_by_arrival() {
        let mut store = MessageStore::default();
        store.add_message("User 2", "first");
        store.add_message("User 1", "second");

        assert_eq!(
            store.conversation(2),
            vec![("User 2", "first"), ("User 1", "second")]
        );
        assert_eq!(
            store.conversation_by_user(2),
            vec![("User 2", "I'm doing well"), ("User 2", "first")]
        );
        assert_eq!(store.conversation(100).len(), 6);
        assert_eq!(store.conversation(100)[0], ("User 1", "Hello"));
    }

    #[test]
    fn reset_restores_seeded_histories() {
        let mut store = MessageStore::default();
        store.add_message("User 1", "extra");
        store.add_message("Someone", "hi");
        store.add_message("User 2", "bye");
        store.reset();
        assert_eq!(store.recent_messages("User 1", 10), vec!["Hello", "How are you?"]);
        assert_eq!(store.recent_messages("User 2", 10), vec!["Hi there", "I'm doing well"]);
        assert_eq!(store.users(), vec!["User 1", "User 2", "Someone"]);
        assert_eq!(store.recent_messages("Someone", 10), vec!["hi"]);

        // Kept messages follow the restored defaults and new ones follow them.
        assert_eq!(store.messages("Someone")[0].seq, 4);
        store.add_message("User 1", "again");
        assert_eq!(store.messages("User 1")[2].seq, 5);
        assert_eq!(
            store.conversation(3),
            vec![("User 2", "I'm doing well"), ("Someone", "hi"), ("User 1", "again")]
        );
    }

    #[test]
    fn custom_seed_provider_parameterizes_store() {
        let seed: StaticSeed = serde_json::from_str(
            r#"{"users": [{"user": "Ana", "messages": ["hey"]}, {"user": "Ben"}]}"#,
        )
        .unwrap();
        let store = MessageStore::new(&seed);
        assert_eq!(store.users(), vec!["Ana", "Ben"]);
        assert!(store.has_messages("Ana"));
        assert!(!store.has_messages("Ben"));
        assert_eq!(store.messages("Ana")[0].seq, 0);
    }

    #[test]
    fn coarse_categories_follow_scores() {
        assert_eq!(
            select_categories(0.8, 0.7),
            [EmojiCategory::Positive; 3]
        );
        assert_eq!(
            select_categories(0.9, -0.9),
            [EmojiCategory::Positive, EmojiCategory::Negative, EmojiCategory::Mixed]
        );
        assert_eq!(
            select_categories(0.3, -0.3),
            [EmojiCategory::Neutral, EmojiCategory::Neutral, EmojiCategory::Mixed]
        );
        assert_eq!(
            select_categories(-0.5, -0.1),
            [EmojiCategory::Negative, EmojiCategory::Neutral, EmojiCategory::Negative]
        );
    }

    #[test]
    fn aligned_positive_sentiment_draws_only_positive() {
        let pools = EmojiPools::default();
        for seed in 0..50 {
            let mut suggester = EmojiSuggester::with_seed(seed);
            let picks = suggester.suggest(0.8, 0.7, 3).unwrap();
            assert_eq!(picks.len(), 3);
            let distinct: HashSet<&String> = picks.iter().collect();
            assert_eq!(distinct.len(), 3);
            assert!(picks.iter().all(|g| pools.positive.contains(g)), "{picks:?}");
        }
    }

    #[test]
    fn divergent_sentiment_can_reach_mixed_pool() {
        let pools = EmojiPools::default();
        let mut saw_mixed = false;
        for seed in 0..200 {
            let mut suggester = EmojiSuggester::with_seed(seed);
            let picks = suggester.suggest(0.9, -0.9, 3).unwrap();
            assert_eq!(picks.len(), 3);
            for g in &picks {
                assert!(
                    pools.positive.contains(g) || pools.negative.contains(g) || pools.mixed.contains(g)
                );
            }
            saw_mixed |= picks
                .iter()
                .any(|g| pools.category_of(g) == Some(EmojiCategory::Mixed));
        }
        assert!(saw_mixed);
    }

    #[test]
    fn suggestions_are_reproducible_with_a_seed() {
        let mut a = EmojiSuggester::with_seed(42);
        let mut b = EmojiSuggester::with_seed(42);
        for (short, long) in [(0.8, 0.7), (0.0, 0.0), (-0.9, 0.9), (0.1, -0.6)] {
            assert_eq!(
                a.suggest(short, long, 3).unwrap(),
                b.suggest(short, long, 3).unwrap()
            );
        }
        a.reseed(7);
        b.reseed(7);
        assert_eq!(a.suggest(0.5, 0.5, 5).unwrap(), b.suggest(0.5, 0.5, 5).unwrap());
    }

    #[test]
    fn suggestion_count_is_capped_by_available_glyphs() {
        let mut suggester = EmojiSuggester::with_seed(1).with_pools(tiny_pools());
        assert_eq!(suggester.suggest(0.8, 0.7, 3).unwrap(), vec!["P".to_string()]);

        let picks = suggester.suggest(0.9, -0.9, 5).unwrap();
        let distinct: HashSet<&str> = picks.iter().map(String::as_str).collect();
        assert_eq!(picks.len(), 3);
        assert_eq!(distinct, HashSet::from(["P", "X", "M"]));

        let mut suggester = EmojiSuggester::with_seed(1);
        let picks = suggester.suggest(0.0, 0.0, 25).unwrap();
        assert_eq!(picks.len(), 20);
    }

    #[test]
    fn empty_pools_are_a_configuration_error() {
        let empty = EmojiPools {
            positive: vec![],
            neutral: vec![],
            negative: vec![],
            mixed: vec![],
        };
        let mut suggester = EmojiSuggester::with_seed(3).with_pools(empty);
        assert!(matches!(
            suggester.suggest(0.0, 0.0, 3),
            Err(Error::EmptyPools)
        ));
    }

    #[test]
    fn slot_weights_must_be_probabilities() {
        for bad in [f64::NAN, -0.1, 1.5, f64::INFINITY] {
            let weights = SlotWeights {
                primary: bad,
                ..SlotWeights::default()
            };
            let err = EmojiSuggester::with_seed(1).with_weights(weights).unwrap_err();
            assert!(matches!(err, Error::Config(_)), "{bad}: {err}");
        }

        let only_secondary = SlotWeights {
            primary: 0.0,
            secondary: 1.0,
            tertiary: 0.0,
        };
        let mut suggester = EmojiSuggester::with_seed(5)
            .with_pools(tiny_pools())
            .with_weights(only_secondary)
            .unwrap();
        // Positive short-term, negative long-term: only the secondary pool can win.
        assert_eq!(suggester.suggest(0.9, -0.9, 1).unwrap(), vec!["X".to_string()]);
    }

    #[test]
    fn fill_shares_shrink_with_picked_glyphs() {
        let positive: Vec<String> = ["A", "B"].map(String::from).to_vec();
        let negative = vec!["C".to_string()];
        let mixed: Vec<String> = ["D", "E", "F", "G"].map(String::from).to_vec();
        let pools: [&[String]; 3] = [&positive, &negative, &mixed];
        let picked = vec!["A".to_string(), "C".to_string(), "D".to_string()];

        let draws = crate::suggest::remaining_draws(&pools, [0.6, 0.3, 0.1], &picked);
        assert_eq!(draws.len(), 2);
        assert_eq!(draws[0].0, vec![&positive[1]]);
        assert!(approx(draws[0].1, 0.3));
        assert_eq!(draws[1].0.len(), 3);
        assert!(approx(draws[1].1, 0.075));

        let fresh = crate::suggest::remaining_draws(&pools, [0.6, 0.3, 0.1], &[]);
        let shares: Vec<f64> = fresh.iter().map(|(_, share)| *share).collect();
        assert_eq!(shares, vec![0.6, 0.3, 0.1]);
    }

    #[test]
    fn zero_slot_weights_still_fill_the_request() {
        let silent = SlotWeights {
            primary: 0.0,
            secondary: 0.0,
            tertiary: 0.0,
        };
        let mut suggester = EmojiSuggester::with_seed(8).with_weights(silent).unwrap();
        let picks = suggester.suggest(0.9, -0.9, 5).unwrap();
        assert_eq!(picks.len(), 5);
        let distinct: HashSet<&String> = picks.iter().collect();
        assert_eq!(distinct.len(), 5);
    }

    #[test]
    fn pools_load_flat_and_nested_categories() {
        let raw = r#"{
            "positive": {"faces": ["😊"], "gestures": ["👍"]},
            "neutral": ["😐"],
            "negative": ["😢"],
            "mixed": ["😅"]
        }"#;
        let pools = EmojiPools::from_json_str(raw).unwrap();
        assert_eq!(pools.positive, vec!["😊".to_string(), "👍".to_string()]);
        assert_eq!(pools.category_of("👍"), Some(EmojiCategory::Positive));

        let err = EmojiPools::from_json_str(
            r#"{"positive": [], "neutral": ["a"], "negative": ["b"], "mixed": ["c"]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn pipeline_flags_hateful_message() {
        let mut pipeline = lexicon_pipeline(SentimentConfig::default(), Some(9));
        pipeline.add_message("User 2", "I hate this");
        let last = pipeline.store().recent_messages("User 2", 1)[0].to_string();
        let score = pipeline.short_term(&last);
        assert!(score < -0.3);
        assert!(matches!(
            pipeline.categorize(score),
            SentimentCategory::Negative | SentimentCategory::VeryNegative
        ));

        let suggestion = pipeline.suggest_for("User 2").unwrap();
        assert_eq!(suggestion.short_term, score);
        assert_eq!(suggestion.emojis.len(), 3);
        assert!(suggestion.long_term > score);
    }

    #[test]
    fn pipeline_suggests_for_explicit_scores() {
        let mut config = SentimentConfig::default();
        config.suggestion_count = 4;
        let mut pipeline = EmojiPipeline::new(
            LexiconScorer::new(),
            config,
            EmojiSuggester::with_seed(12),
        );
        let before = pipeline.conversation().len();
        let picks = pipeline.suggest_scores(0.8, 0.7).unwrap();
        assert_eq!(picks.len(), 4);
        let pools = EmojiPools::default();
        assert!(picks.iter().all(|g| pools.positive.contains(g)), "{picks:?}");
        assert_eq!(pipeline.conversation().len(), before);
    }

    #[test]
    fn pipeline_greets_unknown_users() {
        let mut pipeline = lexicon_pipeline(SentimentConfig::default(), Some(9));
        let suggestion = pipeline.suggest_for("Stranger").unwrap();
        assert_eq!(suggestion.emojis, GREETING_EMOJIS.map(String::from).to_vec());
        assert_eq!(suggestion.category, SentimentCategory::Neutral);
    }

    #[test]
    fn pipeline_reload_keeps_history() {
        let mut pipeline = lexicon_pipeline(SentimentConfig::default(), Some(2));
        pipeline.add_message("User 1", "great");
        let mut config = SentimentConfig::default();
        config.suggestion_count = 5;
        config.analysis.context_window = 3;
        pipeline.reload_config(config).unwrap();

        assert_eq!(pipeline.conversation().len(), 3);
        assert_eq!(pipeline.conversation()[2], ("User 1", "great"));
        assert_eq!(pipeline.suggest_for("User 1").unwrap().emojis.len(), 5);

        let mut bad = SentimentConfig::default();
        bad.suggestion_count = 0;
        assert!(pipeline.reload_config(bad).is_err());
        assert_eq!(pipeline.config().suggestion_count, 5);
    }

    #[test]
    fn evaluation_scores_records_against_expected_category() {
        let records = vec![
            record(SentimentCategory::VeryPositive, "😊 😄 🤔"),
            record(SentimentCategory::Neutral, "🤷 📝"),
            record(SentimentCategory::Negative, "😢 ❓"),
        ];
        let evaluation = evaluate(&records, &EmojiPools::default());

        let ratios: Vec<f64> = evaluation.records.iter().map(|r| r.match_percentage).collect();
        assert!(approx(ratios[0], 2.0 / 3.0));
        assert!(approx(ratios[1], 1.0));
        assert!(approx(ratios[2], 0.5));
        assert_eq!(evaluation.records[2].emoji_categories[1], None);

        let summary = &evaluation.summary;
        assert!(approx(summary.overall_accuracy, (2.0 / 3.0 + 1.0 + 0.5) / 3.0));
        assert!(approx(summary.accuracy_by_sentiment["neutral"], 1.0));
        assert!(approx(summary.accuracy_by_sentiment["negative"], 0.5));
        assert!(!summary.accuracy_by_sentiment.contains_key("positive"));
        assert_eq!(
            summary.confusion_matrix,
            [[2, 1, 0, 0], [0, 2, 0, 0], [0, 0, 1, 0], [0, 0, 0, 0]]
        );
        assert_eq!(
            summary.confusion_matrix_labels,
            ["positive", "neutral", "negative", "mixed"].map(String::from)
        );

        let neutral = evaluation
            .sentiment_distribution
            .iter()
            .find(|c| c.label == "neutral")
            .unwrap();
        assert_eq!(neutral.value, 1);
        let negative_row = evaluation
            .category_by_sentiment
            .iter()
            .find(|row| row.sentiment == SentimentCategory::Negative)
            .unwrap();
        assert_eq!((negative_row.negative, negative_row.unknown), (1, 1));
    }

    #[test]
    fn evaluation_of_nothing_is_zero() {
        let evaluation = evaluate(&[], &EmojiPools::default());
        assert_eq!(evaluation.summary.overall_accuracy, 0.0);
        assert_eq!(evaluation.summary.confusion_matrix, [[0; 4]; 4]);

        let blank = evaluate(&[record(SentimentCategory::Neutral, "")], &EmojiPools::default());
        assert_eq!(blank.records[0].match_percentage, 0.0);
    }

    #[test]
    fn records_parse_from_persisted_json() {
        let raw = r#"[{
            "conversation_id": 3,
            "message_id": 1,
            "message": "I love this idea!",
            "short_term_sentiment": 0.6696,
            "long_term_sentiment": 0.41,
            "suggested_emojis": "😊 🎉 😅",
            "sentiment_category": "very_positive"
        }]"#;
        let records = parse_records(raw).unwrap();
        assert_eq!(records[0].conversation_id, 3);
        assert_eq!(records[0].sentiment_category, SentimentCategory::VeryPositive);

        let json = evaluate_results_native(raw, None).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!((value["overall_accuracy"].as_f64().unwrap() - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(value["confusion_matrix"][0], serde_json::json!([2, 0, 0, 1]));
    }

    #[test]
    fn synthetic_conversations_alternate_speakers() {
        let a = synthesize_conversations(12, Some(5));
        let b = synthesize_conversations(12, Some(5));
        assert_eq!(a, b);
        assert_eq!(a.len(), 12);
        for conversation in &a {
            assert!((4..=8).contains(&conversation.len()));
            for (i, turn) in conversation.iter().enumerate() {
                let expected = if i % 2 == 0 { "User 1" } else { "User 2" };
                assert_eq!(turn.speaker, expected);
                assert!(!turn.message.is_empty());
            }
        }
    }

    #[test]
    fn replay_records_analysed_speaker_turns() {
        let conversations = synthesize_conversations(6, Some(11));
        let expected_records: usize = conversations
            .iter()
            .map(|c| c.iter().filter(|t| t.speaker == "User 2").count())
            .sum();

        let config = SentimentConfig::default();
        let mut pipeline = lexicon_pipeline(config.clone(), Some(4));
        let records = pipeline.replay(&conversations).unwrap();
        assert_eq!(records.len(), expected_records);

        for r in &records {
            let turn = &conversations[r.conversation_id as usize][r.message_id as usize];
            assert_eq!(turn.speaker, "User 2");
            assert_eq!(r.message, turn.message);
            assert_eq!(r.sentiment_category, config.thresholds.categorize(r.short_term_sentiment));
            assert_eq!(r.suggested_emojis.split(' ').count(), 3);
            assert!((-1.0..=1.0).contains(&r.long_term_sentiment));
        }

        let again = lexicon_pipeline(config.clone(), Some(4))
            .replay(&conversations)
            .unwrap();
        assert_eq!(records, again);

        let json = serde_json::to_string(&conversations).unwrap();
        let native = replay_native(&json, config, Some(4)).unwrap();
        let parsed = parse_records(&native).unwrap();
        assert_eq!(parsed.len(), records.len());
        for (p, r) in parsed.iter().zip(&records) {
            assert_eq!(p.suggested_emojis, r.suggested_emojis);
            assert_eq!(p.sentiment_category, r.sentiment_category);
            assert!((p.long_term_sentiment - r.long_term_sentiment).abs() < 1e-12);
        }

        let evaluation = evaluate(&records, &EmojiPools::default());
        assert!(evaluation
            .records
            .iter()
            .all(|r| (0.0..=1.0).contains(&r.match_percentage)));
    }
}
