//! Configuration types and defaults for the highlight pipeline

use serde::{Deserialize, Serialize};

/// Token slots searched for each later part of a discontinuous pattern (≈15 words)
pub const DEFAULT_LOOKAHEAD_WINDOW: usize = 30;

/// Separator between the parts of a discontinuous pattern ("explain...in")
pub const DEFAULT_DISCONTINUITY_MARKER: &str = "...";

/// Single-character marks split out of words by the tokenizer
pub const DEFAULT_PUNCTUATION: &str = ".,!?;:()";

// =============================================================================
// HighlightConfig
// =============================================================================

/// Configuration for the highlight pipeline
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct HighlightConfig {
    /// Maximum distance, in token slots, between the end of one pattern part
    /// and the first word of the next. Default: 30
    #[serde(default = "default_lookahead_window")]
    pub lookahead_window: usize,
    /// Marker splitting a variant into ordered parts. Default: "..."
    #[serde(default = "default_discontinuity_marker")]
    pub discontinuity_marker: String,
    /// Characters treated as standalone punctuation. Default: ".,!?;:()"
    #[serde(default = "default_punctuation")]
    pub punctuation: String,
}

fn default_lookahead_window() -> usize { DEFAULT_LOOKAHEAD_WINDOW }
fn default_discontinuity_marker() -> String { DEFAULT_DISCONTINUITY_MARKER.to_string() }
fn default_punctuation() -> String { DEFAULT_PUNCTUATION.to_string() }

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            lookahead_window: DEFAULT_LOOKAHEAD_WINDOW,
            discontinuity_marker: DEFAULT_DISCONTINUITY_MARKER.to_string(),
            punctuation: DEFAULT_PUNCTUATION.to_string(),
        }
    }
}

impl HighlightConfig {
    /// Builder-style override of the lookahead window
    pub fn with_lookahead_window(mut self, window: usize) -> Self {
        self.lookahead_window = window;
        self
    }

    /// Check values that would make the pipeline meaningless
    pub fn validate(&self) -> Result<(), String> {
        if self.lookahead_window == 0 {
            return Err("lookahead_window must be at least 1".to_string());
        }
        if self.discontinuity_marker.trim().is_empty() {
            return Err("discontinuity_marker must not be empty".to_string());
        }
        if self.punctuation.chars().any(char::is_whitespace) {
            return Err("punctuation must not contain whitespace".to_string());
        }
        Ok(())
    }
}
