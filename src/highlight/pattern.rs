//! Pattern Compiler
//!
//! Turns an entry's term and variants into word-sequence patterns. A variant
//! such as `"explain...in"` becomes two parts, `[["explain"], ["in"]]`, that
//! must appear in order but not necessarily side by side.

use serde::{Deserialize, Serialize};

use super::types::{EntryId, VocabularyEntry};

/// Separators accepted in the free-text variant field (ASCII and full-width comma)
const MATCH_PATTERN_SEPARATORS: [char; 2] = [',', '，'];

/// One compiled surface form: ordered parts, each a list of lowercase words
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledPattern {
    pub parts: Vec<Vec<String>>,
}

impl CompiledPattern {
    pub fn is_discontinuous(&self) -> bool {
        self.parts.len() > 1
    }

    pub fn word_count(&self) -> usize {
        self.parts.iter().map(Vec::len).sum()
    }
}

/// All patterns of one entry, in matching priority order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledEntry {
    pub entry_id: EntryId,
    /// Lowercased canonical term, used for ordering
    pub term_key: String,
    pub patterns: Vec<CompiledPattern>,
}

impl CompiledEntry {
    /// Character length of the canonical term
    pub fn term_len(&self) -> usize {
        self.term_key.chars().count()
    }
}

/// Compile a single surface form. Returns `None` when nothing matchable is left.
pub fn compile_pattern(source: &str, marker: &str) -> Option<CompiledPattern> {
    let lowered = source.trim().to_lowercase();
    if lowered.is_empty() {
        return None;
    }

    let parts: Vec<Vec<String>> = lowered
        .split(marker)
        .map(|part| part.split_whitespace().map(str::to_string).collect::<Vec<_>>())
        .filter(|words| !words.is_empty())
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(CompiledPattern { parts })
    }
}

/// Compile an entry's term followed by its variants. Malformed forms are dropped.
pub fn compile_entry(entry: &VocabularyEntry, marker: &str) -> CompiledEntry {
    let mut patterns: Vec<CompiledPattern> = Vec::new();

    for source in std::iter::once(&entry.term).chain(entry.variants.iter()) {
        if let Some(pattern) = compile_pattern(source, marker) {
            if !patterns.contains(&pattern) {
                patterns.push(pattern);
            }
        }
    }

    CompiledEntry {
        entry_id: entry.id,
        term_key: entry.term_key(),
        patterns,
    }
}

/// Split the editor's comma-separated variant field into individual variants
pub fn parse_match_pattern(text: &str) -> Vec<String> {
    text.split(&MATCH_PATTERN_SEPARATORS[..])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// =============================================================================
// Tests
// =============================================================================
