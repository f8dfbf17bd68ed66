use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::categorize::Thresholds;
use crate::error::{Error, Result};

pub const DEFAULT_SUGGESTION_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    pub short_term: f64,
    pub long_term: f64,
    /// Reserved; the suggestion path does not read it yet.
    pub context: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            short_term: 0.6,
            long_term: 0.3,
            context: 0.1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisWindows {
    pub short_term_window: usize,
    pub long_term_window: usize,
    pub context_window: usize,
}

impl Default for AnalysisWindows {
    fn default() -> Self {
        Self {
            short_term_window: 1,
            long_term_window: 10,
            context_window: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentConfig {
    pub thresholds: Thresholds,
    pub weights: Weights,
    pub analysis: AnalysisWindows,
    #[serde(default = "default_suggestion_count")]
    pub suggestion_count: usize,
}

fn default_suggestion_count() -> usize {
    DEFAULT_SUGGESTION_COUNT
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            weights: Weights::default(),
            analysis: AnalysisWindows::default(),
            suggestion_count: DEFAULT_SUGGESTION_COUNT,
        }
    }
}

impl SentimentConfig {
    /// Parses and validates a config document. Unknown keys such as the legacy
    /// `neutral_upper` / `slightly_negative` thresholds are ignored.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: SentimentConfig = serde_json::from_str(raw)
            .map_err(|e| Error::Config(format!("invalid sentiment config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json_str(&read_config_file(path.as_ref())?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        let ordered = self.thresholds.ordered();
        for (name, value) in ordered {
            if !value.is_finite() {
                return Err(Error::Config(format!("threshold `{name}` is not finite")));
            }
        }
        for pair in ordered.windows(2) {
            let ((upper_name, upper), (lower_name, lower)) = (pair[0], pair[1]);
            if lower > upper {
                return Err(Error::Config(format!(
                    "threshold `{lower_name}` ({lower}) is above `{upper_name}` ({upper})"
                )));
            }
        }

        for (name, weight) in [
            ("short_term", self.weights.short_term),
            ("long_term", self.weights.long_term),
            ("context", self.weights.context),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(Error::Config(format!(
                    "weight `{name}` must be a non-negative number, got {weight}"
                )));
            }
        }

        let windows = &self.analysis;
        if windows.short_term_window == 0
            || windows.long_term_window == 0
            || windows.context_window == 0
        {
            return Err(Error::Config("analysis windows must be at least 1".into()));
        }
        if self.suggestion_count == 0 {
            return Err(Error::Config("suggestion_count must be at least 1".into()));
        }
        Ok(())
    }
}

/// Reads a config document; a missing or unreadable file is a config error.
pub(crate) fn read_config_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))
}
