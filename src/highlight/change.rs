//! ChangeDetector: Input Fingerprinting for Highlight Memoization
//!
//! The pipeline is deterministic, so `(content, vocabulary, config)` fully
//! determines its output. The detector hashes exactly the fields that
//! influence matching (entry id, term, variants) and reports whether the
//! latest input differs from the previous one.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use super::config::HighlightConfig;
use super::types::VocabularyEntry;

// =============================================================================
// Types
// =============================================================================

/// Result of change detection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeResult {
    /// True if input differs from the last check
    pub has_changed: bool,
    pub fingerprint: u64,
    pub previous_fingerprint: Option<u64>,
}

// =============================================================================
// ChangeDetector
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct ChangeDetector {
    last_fingerprint: Option<u64>,
    check_count: u64,
    skip_count: u64,
}

impl ChangeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hash of everything that can change the highlight output
    pub fn fingerprint(content: &str, vocabulary: &[VocabularyEntry], config: &HighlightConfig) -> u64 {
        let mut hasher = DefaultHasher::new();
        content.hash(&mut hasher);
        config.hash(&mut hasher);
        vocabulary.len().hash(&mut hasher);
        for entry in vocabulary {
            entry.id.hash(&mut hasher);
            entry.term.hash(&mut hasher);
            entry.variants.hash(&mut hasher);
        }
        hasher.finish()
    }

    /// Record a check and return the detailed result
    pub fn check(&mut self, content: &str, vocabulary: &[VocabularyEntry], config: &HighlightConfig) -> ChangeResult {
        let fingerprint = Self::fingerprint(content, vocabulary, config);
        self.check_fingerprint(fingerprint)
    }

    pub fn check_fingerprint(&mut self, fingerprint: u64) -> ChangeResult {
        self.check_count += 1;

        let previous_fingerprint = self.last_fingerprint;
        let has_changed = previous_fingerprint != Some(fingerprint);
        if !has_changed {
            self.skip_count += 1;
        }

        self.last_fingerprint = Some(fingerprint);

        ChangeResult {
            has_changed,
            fingerprint,
            previous_fingerprint,
        }
    }

    /// Percentage of checks that found unchanged input
    pub fn skip_rate(&self) -> f64 {
        if self.check_count == 0 {
            return 0.0;
        }
        (self.skip_count as f64 / self.check_count as f64) * 100.0
    }

    pub fn check_count(&self) -> u64 {
        self.check_count
    }

    pub fn skip_count(&self) -> u64 {
        self.skip_count
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab() -> Vec<VocabularyEntry> {
        vec![VocabularyEntry::new(1, 1, "light")]
    }

    #[test]
    fn test_first_check_changed() {
        let mut detector = ChangeDetector::new();
        let result = detector.check("text", &vocab(), &HighlightConfig::default());
        assert!(result.has_changed);
        assert!(result.previous_fingerprint.is_none());
    }

    #[test]
    fn test_same_input_unchanged() {
        let mut detector = ChangeDetector::new();
        let config = HighlightConfig::default();
        detector.check("text", &vocab(), &config);
        assert!(!detector.check("text", &vocab(), &config).has_changed);
        assert_eq!(detector.skip_count(), 1);
        assert!((detector.skip_rate() - 50.0).abs() < 0.01);
    }

    #[test]
    fn test_variant_edit_is_a_change() {
        let mut detector = ChangeDetector::new();
        let config = HighlightConfig::default();
        detector.check("text", &vocab(), &config);

        let edited = vec![VocabularyEntry::new(1, 1, "light").with_variants(["lights"])];
        assert!(detector.check("text", &edited, &config).has_changed);
    }

    #[test]
    fn test_payload_edit_is_not_a_change() {
        let config = HighlightConfig::default();
        let mut recolored = vocab();
        recolored[0]
            .payload
            .insert("color".to_string(), serde_json::Value::from("#000000"));

        assert_eq!(
            ChangeDetector::fingerprint("text", &vocab(), &config),
            ChangeDetector::fingerprint("text", &recolored, &config)
        );
    }

    #[test]
    fn test_config_is_part_of_fingerprint() {
        let a = ChangeDetector::fingerprint("text", &vocab(), &HighlightConfig::default());
        let b = ChangeDetector::fingerprint(
            "text",
            &vocab(),
            &HighlightConfig::default().with_lookahead_window(5),
        );
        assert_ne!(a, b);
    }

    #[test]
    fn test_reset() {
        let mut detector = ChangeDetector::new();
        let config = HighlightConfig::default();
        detector.check("text", &vocab(), &config);
        detector.reset();
        assert_eq!(detector.check_count(), 0);
        assert!(detector.check("text", &vocab(), &config).has_changed);
    }
}
