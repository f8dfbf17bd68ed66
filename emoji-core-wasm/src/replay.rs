use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::config::SentimentConfig;
use crate::error::Result;
use crate::sentiment::{PolarityScorer, SentimentEngine};
use crate::store::{MessageStore, SeedProvider};
use crate::suggest::EmojiSuggester;
use crate::text::join_glyphs;
use crate::types::{Conversation, SuggestionRecord, Turn};

pub const DEFAULT_ANALYZED_SPEAKER: &str = "User 2";

pub struct Replay<'a, S> {
    pub engine: &'a SentimentEngine<S>,
    pub suggester: &'a mut EmojiSuggester,
    pub config: &'a SentimentConfig,
    pub seed: &'a dyn SeedProvider,
    pub analyzed_speaker: &'a str,
}

impl<S: PolarityScorer> Replay<'_, S> {
    /// Feeds every conversation through a fresh store and records a
    /// suggestion for each turn by the analysed speaker.
    pub fn run(&mut self, conversations: &[Conversation]) -> Result<Vec<SuggestionRecord>> {
        let mut records = Vec::new();
        let window = self.config.analysis.long_term_window;

        for (conversation_id, conversation) in conversations.iter().enumerate() {
            let mut store = MessageStore::new(self.seed);

            for (message_id, turn) in conversation.iter().enumerate() {
                store.add_message(&turn.speaker, &turn.message);
                if turn.speaker != self.analyzed_speaker {
                    continue;
                }

                let history = store.recent_messages(&turn.speaker, window);
                let short_term = self.engine.short_term(&turn.message);
                let long_term = self.engine.long_term(&history, window);
                let emojis =
                    self.suggester
                        .suggest(short_term, long_term, self.config.suggestion_count)?;

                debug!(
                    conversation_id,
                    message_id, short_term, long_term, "replayed turn"
                );

                records.push(SuggestionRecord {
                    conversation_id: conversation_id as u32,
                    message_id: message_id as u32,
                    message: turn.message.clone(),
                    short_term_sentiment: short_term,
                    long_term_sentiment: long_term,
                    suggested_emojis: join_glyphs(&emojis),
                    sentiment_category: self.config.thresholds.categorize(short_term),
                });
            }
        }
        Ok(records)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mood {
    Positive,
    Neutral,
    Negative,
    Mixed,
}

const MOODS: [Mood; 4] = [Mood::Positive, Mood::Neutral, Mood::Negative, Mood::Mixed];

/// Builds `count` two-party conversations of 4 to 8 alternating turns. In a
/// mixed conversation "User 1" stays upbeat while "User 2" complains.
pub fn synthesize_conversations(count: usize, seed: Option<u64>) -> Vec<Conversation> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    (0..count)
        .map(|_| {
            let mood = *MOODS.choose(&mut rng).unwrap_or(&Mood::Neutral);
            let turns = rng.gen_range(4..=8);
            (0..turns)
                .map(|i| {
                    let speaker = if i % 2 == 0 { "User 1" } else { "User 2" };
                    let bank: &[&str] = match (mood, speaker) {
                        (Mood::Positive, _) | (Mood::Mixed, "User 1") => &POSITIVE_MESSAGES,
                        (Mood::Negative, _) | (Mood::Mixed, _) => &NEGATIVE_MESSAGES,
                        (Mood::Neutral, _) => &NEUTRAL_MESSAGES,
                    };
                    Turn {
                        speaker: speaker.to_string(),
                        message: bank.choose(&mut rng).copied().unwrap_or_default().to_string(),
                    }
                })
                .collect()
        })
        .collect()
}

const POSITIVE_MESSAGES: [&str; 10] = [
    "That's wonderful news!",
    "I'm so happy for you!",
    "Great job on the project!",
    "I love this idea!",
    "This makes me so excited!",
    "You're doing amazing work!",
    "I'm really impressed with your progress!",
    "This is exactly what we needed!",
    "I'm looking forward to our next meeting!",
    "Your help has been invaluable!",
];

const NEUTRAL_MESSAGES: [&str; 10] = [
    "I see what you mean.",
    "Let me think about that.",
    "That's interesting.",
    "I'm not sure yet.",
    "We should consider all options.",
    "What do you think?",
    "Let's discuss this further.",
    "I need more information.",
    "That's a possibility.",
    "I'll get back to you on that.",
];

const NEGATIVE_MESSAGES: [&str; 10] = [
    "I'm disappointed with the results.",
    "This isn't what I expected.",
    "We need to fix these issues.",
    "I'm concerned about the timeline.",
    "This approach has serious problems.",
    "I disagree with your assessment.",
    "The quality is below our standards.",
    "I'm frustrated with the lack of progress.",
    "This creates more problems than it solves.",
    "We're facing significant challenges.",
];
