use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Supplies the histories a store starts from and returns to on reset.
pub trait SeedProvider {
    fn seed_histories(&self) -> Vec<(String, Vec<String>)>;
}

/// The two-party greeting exchange every session starts with.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultSeed;

impl SeedProvider for DefaultSeed {
    fn seed_histories(&self) -> Vec<(String, Vec<String>)> {
        vec![
            (
                "User 1".to_string(),
                vec!["Hello".to_string(), "How are you?".to_string()],
            ),
            (
                "User 2".to_string(),
                vec!["Hi there".to_string(), "I'm doing well".to_string()],
            ),
        ]
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedUser {
    pub user: String,
    #[serde(default)]
    pub messages: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticSeed {
    pub users: Vec<SeedUser>,
}

impl SeedProvider for StaticSeed {
    fn seed_histories(&self) -> Vec<(String, Vec<String>)> {
        self.users
            .iter()
            .map(|u| (u.user.clone(), u.messages.clone()))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StoredMessage {
    pub seq: u64,
    pub received_at: DateTime<Utc>,
    pub text: String,
}

#[derive(Debug, Clone)]
struct History {
    user: String,
    messages: Vec<StoredMessage>,
}

#[derive(Debug, Clone)]
pub struct MessageStore {
    histories: Vec<History>,
    index: HashMap<String, usize>,
    defaults: Vec<(String, Vec<String>)>,
    next_seq: u64,
}

impl Default for MessageStore {
    fn default() -> Self {
        Self::new(&DefaultSeed)
    }
}

impl MessageStore {
    pub fn new(seed: &dyn SeedProvider) -> Self {
        let mut store = Self {
            histories: Vec::new(),
            index: HashMap::new(),
            defaults: seed.seed_histories(),
            next_seq: 0,
        };
        store.populate_defaults();
        store
    }

    fn populate_defaults(&mut self) {
        let defaults = std::mem::take(&mut self.defaults);
        for (user, messages) in &defaults {
            self.ensure_user(user);
            for text in messages {
                self.add_message(user, text);
            }
        }
        self.defaults = defaults;
    }

    fn ensure_user(&mut self, user: &str) -> usize {
        if let Some(&idx) = self.index.get(user) {
            return idx;
        }
        let idx = self.histories.len();
        self.histories.push(History {
            user: user.to_string(),
            messages: Vec::new(),
        });
        self.index.insert(user.to_string(), idx);
        idx
    }

    fn history(&self, user: &str) -> Option<&History> {
        self.index.get(user).map(|&idx| &self.histories[idx])
    }

    pub fn add_message(&mut self, user: &str, text: &str) {
        let idx = self.ensure_user(user);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.histories[idx].messages.push(StoredMessage {
            seq,
            received_at: Utc::now(),
            text: text.to_string(),
        });
    }

    /// Last `count` messages of `user` in arrival order; empty for unknown users.
    pub fn recent_messages(&self, user: &str, count: usize) -> Vec<&str> {
        self.history(user)
            .map(|h| {
                let start = h.messages.len().saturating_sub(count);
                h.messages[start..].iter().map(|m| m.text.as_str()).collect()
            })
            .unwrap_or_default()
    }

    /// Last `count` messages across all users, merged by arrival sequence.
    pub fn conversation(&self, count: usize) -> Vec<(&str, &str)> {
        let mut merged: Vec<(u64, &str, &str)> = self
            .histories
            .iter()
            .flat_map(|h| {
                h.messages
                    .iter()
                    .map(move |m| (m.seq, h.user.as_str(), m.text.as_str()))
            })
            .collect();
        merged.sort_by_key(|(seq, _, _)| *seq);
        let start = merged.len().saturating_sub(count);
        merged[start..]
            .iter()
            .map(|(_, user, text)| (*user, *text))
            .collect()
    }

    /// Last `count` entries of the per-user histories concatenated in user
    /// order. Only locally ordered within each user.
    pub fn conversation_by_user(&self, count: usize) -> Vec<(&str, &str)> {
        let all: Vec<(&str, &str)> = self
            .histories
            .iter()
            .flat_map(|h| {
                h.messages
                    .iter()
                    .map(move |m| (h.user.as_str(), m.text.as_str()))
            })
            .collect();
        let start = all.len().saturating_sub(count);
        all[start..].to_vec()
    }

    pub fn messages(&self, user: &str) -> &[StoredMessage] {
        self.history(user)
            .map(|h| h.messages.as_slice())
            .unwrap_or(&[])
    }

    pub fn users(&self) -> Vec<&str> {
        self.histories.iter().map(|h| h.user.as_str()).collect()
    }

    pub fn has_messages(&self, user: &str) -> bool {
        self.history(user).is_some_and(|h| !h.messages.is_empty())
    }

    /// Puts every seeded user back to their defaults. Other users keep their
    /// histories, renumbered to follow the restored defaults.
    pub fn reset(&mut self) {
        let seeded: HashSet<String> = self.defaults.iter().map(|(u, _)| u.clone()).collect();
        let restored: usize = self.defaults.iter().map(|(_, m)| m.len()).sum();

        let mut survivors: Vec<(u64, usize, usize)> = Vec::new();
        for (hi, history) in self.histories.iter_mut().enumerate() {
            if seeded.contains(&history.user) {
                history.messages.clear();
            } else {
                survivors.extend(
                    history
                        .messages
                        .iter()
                        .enumerate()
                        .map(|(mi, m)| (m.seq, hi, mi)),
                );
            }
        }
        survivors.sort_unstable();
        for (rank, &(_, hi, mi)) in survivors.iter().enumerate() {
            self.histories[hi].messages[mi].seq = (restored + rank) as u64;
        }

        self.next_seq = 0;
        self.populate_defaults();
        self.next_seq = (restored + survivors.len()) as u64;
    }
}
