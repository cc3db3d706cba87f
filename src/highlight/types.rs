//! Core data structures shared by the highlight and scope components.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Stable vocabulary entry identifier (larger ids are newer)
pub type EntryId = u32;

/// Identifier of the document (paragraph) that owns an entry
pub type DocumentId = u32;

// =============================================================================
// Vocabulary
// =============================================================================

/// A vocabulary entry as authored in the editor.
///
/// Only `id`, `term` and `variants` influence matching. Everything else the
/// host stores (phonetic, definition, color, ...) rides along in `payload`
/// and is handed back untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyEntry {
    pub id: EntryId,
    pub owner_document_id: DocumentId,
    /// Canonical surface form
    pub term: String,
    /// Alternate surface forms, may contain the discontinuity marker
    #[serde(default)]
    pub variants: Vec<String>,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl VocabularyEntry {
    pub fn new(id: EntryId, owner_document_id: DocumentId, term: &str) -> Self {
        Self {
            id,
            owner_document_id,
            term: term.to_string(),
            variants: Vec::new(),
            payload: Map::new(),
        }
    }

    /// Builder-style helper for attaching variants
    pub fn with_variants<I, S>(mut self, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.variants = variants.into_iter().map(Into::into).collect();
        self
    }

    /// Lowercased canonical term, the key used for uniqueness rules
    pub fn term_key(&self) -> String {
        self.term.trim().to_lowercase()
    }
}

// =============================================================================
// Tokens
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Word,
    Punctuation,
    Whitespace,
}

/// One segment of the tokenized text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Ordinal in the raw split; merged punctuation consumes the next ordinal
    pub index: usize,
    pub kind: TokenKind,
    /// Surface text (the word part for a merged token)
    pub text: String,
    /// Trailing punctuation mark merged into a word token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub punct: Option<String>,
}

impl Token {
    pub fn is_word(&self) -> bool {
        self.kind == TokenKind::Word
    }

    pub fn is_whitespace(&self) -> bool {
        self.kind == TokenKind::Whitespace
    }

    /// Text as it should be laid out, including any attached mark
    pub fn display_text(&self) -> String {
        match &self.punct {
            Some(p) => format!("{}{}", self.text, p),
            None => self.text.clone(),
        }
    }
}

// =============================================================================
// Spans
// =============================================================================

/// A maximal run of tokens owned by one vocabulary entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSpan {
    pub entry_id: EntryId,
    /// Raw split index of the first token (inclusive)
    pub start: usize,
    /// Raw split index of the last token (inclusive)
    pub end: usize,
    /// Position of the first token in `Highlights::tokens`
    pub first_token: usize,
    /// Position of the last token in `Highlights::tokens`
    pub last_token: usize,
}

impl MatchSpan {
    pub fn token_count(&self) -> usize {
        self.last_token - self.first_token + 1
    }

    pub fn contains_position(&self, position: usize) -> bool {
        position >= self.first_token && position <= self.last_token
    }
}

/// Output of the highlight pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Highlights {
    pub tokens: Vec<Token>,
    pub spans: Vec<MatchSpan>,
    /// Entries with at least one complete match, in order of first match
    pub matched_entry_ids: Vec<EntryId>,
}

impl Highlights {
    /// Owning entry of the token at `position`, if any
    pub fn owner_at(&self, position: usize) -> Option<EntryId> {
        self.spans
            .iter()
            .find(|s| s.contains_position(position))
            .map(|s| s.entry_id)
    }

    /// Display text covered by a span, as the renderer would draw it
    pub fn span_text(&self, span: &MatchSpan) -> String {
        self.tokens[span.first_token..=span.last_token]
            .iter()
            .map(Token::display_text)
            .collect()
    }
}
