//! Highlight Engine: the shared entry point for every UI surface
//!
//! `compute_highlights` runs tokenizer → pattern compiler → span matcher →
//! phrase grouper over immutable inputs. `HighlightCortex` wraps the same
//! pipeline for the JS host and skips recomputation when the fingerprint of
//! `(content, vocabulary, config)` is unchanged.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use super::change::ChangeDetector;
use super::config::HighlightConfig;
use super::grouper::group_spans;
use super::matcher::SpanMatcher;
use super::pattern::{compile_entry, parse_match_pattern, CompiledEntry};
use super::tokenizer::Tokenizer;
use super::types::{Highlights, VocabularyEntry};

// =============================================================================
// Types
// =============================================================================

/// Timing statistics for each pipeline phase
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighlightTimings {
    pub total_us: u64,
    pub tokenize_us: u64,
    pub compile_us: u64,
    pub match_us: u64,
    pub group_us: u64,
}

/// Aggregate statistics
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighlightStats {
    pub timings: HighlightTimings,
    /// Input fingerprint as hex string (u64 would overflow JS Number.MAX_SAFE_INTEGER)
    pub content_hash: String,
    pub was_skipped: bool,
    pub token_count: usize,
    pub pattern_count: usize,
    pub span_count: usize,
    pub matched_entry_count: usize,
}

/// Highlights plus statistics, as returned by `HighlightCortex`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighlightReport {
    pub highlights: Highlights,
    pub stats: HighlightStats,
}

// =============================================================================
// HighlightPipeline
// =============================================================================

/// Validated config with its tokenizer and matcher built once
#[derive(Debug, Clone)]
pub struct HighlightPipeline {
    config: HighlightConfig,
    tokenizer: Tokenizer,
    matcher: SpanMatcher,
}

impl Default for HighlightPipeline {
    fn default() -> Self {
        let config = HighlightConfig::default();
        Self {
            matcher: SpanMatcher::new(config.lookahead_window),
            tokenizer: Tokenizer::default(),
            config,
        }
    }
}

impl HighlightPipeline {
    pub fn new(config: HighlightConfig) -> Result<Self, String> {
        config.validate()?;
        let tokenizer = Tokenizer::new(&config.punctuation)?;
        Ok(Self {
            matcher: SpanMatcher::new(config.lookahead_window),
            tokenizer,
            config,
        })
    }

    pub fn config(&self) -> &HighlightConfig {
        &self.config
    }

    pub fn compile(&self, vocabulary: &[VocabularyEntry]) -> Vec<CompiledEntry> {
        vocabulary
            .iter()
            .map(|entry| compile_entry(entry, &self.config.discontinuity_marker))
            .filter(|compiled| !compiled.patterns.is_empty())
            .collect()
    }

    /// Compute highlights for `content`
    pub fn run(&self, content: &str, vocabulary: &[VocabularyEntry]) -> Highlights {
        self.run_timed(content, vocabulary).highlights
    }

    /// Compute highlights and per-phase statistics
    pub fn run_timed(&self, content: &str, vocabulary: &[VocabularyEntry]) -> HighlightReport {
        let overall_start = instant::Instant::now();
        let mut stats = HighlightStats::default();

        let phase = instant::Instant::now();
        let tokens = self.tokenizer.tokenize(content);
        stats.timings.tokenize_us = phase.elapsed().as_micros() as u64;

        let phase = instant::Instant::now();
        let compiled = self.compile(vocabulary);
        stats.timings.compile_us = phase.elapsed().as_micros() as u64;

        let phase = instant::Instant::now();
        let outcome = self.matcher.run(&tokens, &compiled);
        stats.timings.match_us = phase.elapsed().as_micros() as u64;

        let phase = instant::Instant::now();
        let spans = group_spans(&tokens, &outcome.ownership);
        stats.timings.group_us = phase.elapsed().as_micros() as u64;

        let highlights = Highlights {
            matched_entry_ids: outcome.matched_entry_ids(),
            tokens,
            spans,
        };

        stats.token_count = highlights.tokens.len();
        stats.pattern_count = compiled.iter().map(|c| c.patterns.len()).sum();
        stats.span_count = highlights.spans.len();
        stats.matched_entry_count = highlights.matched_entry_ids.len();
        stats.timings.total_us = overall_start.elapsed().as_micros() as u64;

        HighlightReport { highlights, stats }
    }
}

/// Default pipeline, built on first use so the splitter regex compiles once
static DEFAULT_PIPELINE: OnceLock<HighlightPipeline> = OnceLock::new();

pub fn default_pipeline() -> &'static HighlightPipeline {
    DEFAULT_PIPELINE.get_or_init(HighlightPipeline::default)
}

/// Compute highlights with the default configuration
pub fn compute_highlights(content: &str, vocabulary: &[VocabularyEntry]) -> Highlights {
    default_pipeline().run(content, vocabulary)
}

/// Compute highlights with a caller-supplied configuration
pub fn compute_highlights_with(
    content: &str,
    vocabulary: &[VocabularyEntry],
    config: &HighlightConfig,
) -> Result<Highlights, String> {
    Ok(HighlightPipeline::new(config.clone())?.run(content, vocabulary))
}

// =============================================================================
// HighlightCortex
// =============================================================================

/// Memoizing highlight engine for the JS host
#[wasm_bindgen]
pub struct HighlightCortex {
    pipeline: HighlightPipeline,
    change_detector: ChangeDetector,
    last_report: Option<HighlightReport>,
}

impl Default for HighlightCortex {
    fn default() -> Self {
        Self {
            pipeline: HighlightPipeline::default(),
            change_detector: ChangeDetector::new(),
            last_report: None,
        }
    }
}

#[wasm_bindgen]
impl HighlightCortex {
    /// Create a cortex with an optional JSON config (`null`/`undefined` → defaults)
    #[wasm_bindgen(constructor)]
    pub fn js_new(config: JsValue) -> Result<HighlightCortex, JsValue> {
        let config = parse_config(config)?;
        let cortex = Self::with_config(config)
            .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?;

        #[cfg(target_arch = "wasm32")]
        web_sys::console::log_1(&JsValue::from_str(&format!(
            "[HighlightCortex] ready (lookahead window {})",
            cortex.pipeline.config().lookahead_window
        )));

        Ok(cortex)
    }

    /// Highlight `content` against an array of vocabulary entries
    #[wasm_bindgen(js_name = highlight)]
    pub fn js_highlight(&mut self, content: &str, vocabulary: JsValue) -> Result<JsValue, JsValue> {
        let vocabulary: Vec<VocabularyEntry> = serde_wasm_bindgen::from_value(vocabulary)
            .map_err(|e| JsValue::from_str(&format!("Invalid vocabulary: {}", e)))?;

        let report = self.highlight(content, &vocabulary);
        to_js_value(&report).map_err(|e| {
            #[cfg(target_arch = "wasm32")]
            web_sys::console::error_1(&format!("[HighlightCortex] Serialization failed: {:?}", e).into());
            e
        })
    }

    /// Percentage of calls served from cache
    #[wasm_bindgen(js_name = skipRate)]
    pub fn skip_rate(&self) -> f64 {
        self.change_detector.skip_rate()
    }

    #[wasm_bindgen(js_name = lookaheadWindow)]
    pub fn lookahead_window(&self) -> usize {
        self.pipeline.config().lookahead_window
    }

    /// Drop the cached result and change history
    #[wasm_bindgen(js_name = reset)]
    pub fn js_reset(&mut self) {
        self.reset();
    }
}

impl HighlightCortex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: HighlightConfig) -> Result<Self, String> {
        Ok(Self {
            pipeline: HighlightPipeline::new(config)?,
            change_detector: ChangeDetector::new(),
            last_report: None,
        })
    }

    /// Highlight, reusing the previous result when nothing relevant changed
    pub fn highlight(&mut self, content: &str, vocabulary: &[VocabularyEntry]) -> HighlightReport {
        let overall_start = instant::Instant::now();
        let change = self
            .change_detector
            .check(content, vocabulary, self.pipeline.config());
        let content_hash = format!("{:x}", change.fingerprint);

        if !change.has_changed {
            if let Some(ref cached) = self.last_report {
                let mut report = cached.clone();
                report.stats.was_skipped = true;
                report.stats.content_hash = content_hash;
                report.stats.timings = HighlightTimings {
                    total_us: overall_start.elapsed().as_micros() as u64,
                    ..HighlightTimings::default()
                };
                return report;
            }
        }

        let mut report = self.pipeline.run_timed(content, vocabulary);
        report.stats.content_hash = content_hash;
        self.last_report = Some(report.clone());
        report
    }

    pub fn reset(&mut self) {
        self.change_detector.reset();
        self.last_report = None;
    }
}

// =============================================================================
// Free JS bindings
// =============================================================================

/// One-shot highlight without caching (JS binding)
#[wasm_bindgen(js_name = computeHighlights)]
pub fn js_compute_highlights(content: &str, vocabulary: JsValue, config: JsValue) -> Result<JsValue, JsValue> {
    let vocabulary: Vec<VocabularyEntry> = serde_wasm_bindgen::from_value(vocabulary)
        .map_err(|e| JsValue::from_str(&format!("Invalid vocabulary: {}", e)))?;
    let config = parse_config(config)?;

    let highlights = compute_highlights_with(content, &vocabulary, &config)
        .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?;
    to_js_value(&highlights)
}

/// Split a comma-separated variant field (JS binding)
#[wasm_bindgen(js_name = parseMatchPattern)]
pub fn js_parse_match_pattern(text: &str) -> Vec<String> {
    parse_match_pattern(text)
}

pub(crate) fn parse_config(config: JsValue) -> Result<HighlightConfig, JsValue> {
    if config.is_null() || config.is_undefined() {
        return Ok(HighlightConfig::default());
    }
    serde_wasm_bindgen::from_value(config)
        .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))
}

/// Serialize with plain JS objects for maps (the entry payload is a flattened map)
pub(crate) fn to_js_value<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

// =============================================================================
// Tests
// =============================================================================
