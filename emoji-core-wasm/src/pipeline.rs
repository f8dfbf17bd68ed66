use tracing::info;

use crate::categorize::SentimentCategory;
use crate::config::SentimentConfig;
use crate::error::Result;
use crate::replay::{Replay, DEFAULT_ANALYZED_SPEAKER};
use crate::sentiment::{PolarityScorer, SentimentEngine};
use crate::store::{DefaultSeed, MessageStore, SeedProvider};
use crate::suggest::EmojiSuggester;
use crate::types::{Conversation, Suggestion, SuggestionRecord};

/// Shown before the other party has said anything.
pub const GREETING_EMOJIS: [&str; 3] = ["🙂", "👋", "👀"];

pub struct EmojiPipeline<S> {
    store: MessageStore,
    engine: SentimentEngine<S>,
    suggester: EmojiSuggester,
    config: SentimentConfig,
    seed: Box<dyn SeedProvider>,
}

impl<S: PolarityScorer> EmojiPipeline<S> {
    pub fn new(scorer: S, config: SentimentConfig, suggester: EmojiSuggester) -> Self {
        Self::with_seed_provider(scorer, config, suggester, Box::new(DefaultSeed))
    }

    pub fn with_seed_provider(
        scorer: S,
        config: SentimentConfig,
        suggester: EmojiSuggester,
        seed: Box<dyn SeedProvider>,
    ) -> Self {
        Self {
            store: MessageStore::new(seed.as_ref()),
            engine: SentimentEngine::new(scorer),
            suggester,
            config,
            seed,
        }
    }

    pub fn store(&self) -> &MessageStore {
        &self.store
    }

    pub fn config(&self) -> &SentimentConfig {
        &self.config
    }

    /// Swaps thresholds, windows and counts in place; histories are kept.
    pub fn reload_config(&mut self, config: SentimentConfig) -> Result<()> {
        config.validate()?;
        info!(
            long_term_window = config.analysis.long_term_window,
            suggestion_count = config.suggestion_count,
            "sentiment config reloaded"
        );
        self.config = config;
        Ok(())
    }

    pub fn add_message(&mut self, user: &str, text: &str) {
        self.store.add_message(user, text);
    }

    pub fn reset(&mut self) {
        self.store.reset();
    }

    pub fn conversation(&self) -> Vec<(&str, &str)> {
        self.store.conversation(self.config.analysis.context_window)
    }

    pub fn short_term(&self, text: &str) -> f64 {
        self.engine.short_term(text)
    }

    pub fn categorize(&self, score: f64) -> SentimentCategory {
        self.config.thresholds.categorize(score)
    }

    /// Suggestions for replying to `user`, driven by their latest message
    /// and their recent history.
    pub fn suggest_for(&mut self, user: &str) -> Result<Suggestion> {
        let window = self.config.analysis.long_term_window;
        let recent = self.store.recent_messages(user, window);

        let Some(last) = recent.last() else {
            return Ok(Suggestion {
                short_term: 0.0,
                long_term: 0.0,
                category: SentimentCategory::Neutral,
                emojis: GREETING_EMOJIS.iter().map(|g| g.to_string()).collect(),
            });
        };

        let short_term = self.engine.short_term(last);
        let long_term = self.engine.long_term(&recent, window);
        let emojis = self
            .suggester
            .suggest(short_term, long_term, self.config.suggestion_count)?;

        Ok(Suggestion {
            short_term,
            long_term,
            category: self.config.thresholds.categorize(short_term),
            emojis,
        })
    }

    /// Suggestions for an explicit score pair, bypassing the store.
    pub fn suggest_scores(&mut self, short_term: f64, long_term: f64) -> Result<Vec<String>> {
        self.suggester
            .suggest(short_term, long_term, self.config.suggestion_count)
    }

    pub fn replay(&mut self, conversations: &[Conversation]) -> Result<Vec<SuggestionRecord>> {
        Replay {
            engine: &self.engine,
            suggester: &mut self.suggester,
            config: &self.config,
            seed: self.seed.as_ref(),
            analyzed_speaker: DEFAULT_ANALYZED_SPEAKER,
        }
        .run(conversations)
    }
}
