//! Scope Resolver: Local + Shared Vocabulary
//!
//! A document sees its own entries plus the newest definition of every term
//! defined elsewhere, unless it defines that term itself or has excluded it.
//!
//! Rules:
//! - Duplicate shared terms (case-insensitive): highest id wins
//! - Local terms shadow shared ones (case-insensitive)
//! - Exclusions are literal, case-sensitive terms

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::highlight::engine::to_js_value;
use crate::highlight::types::{DocumentId, EntryId, VocabularyEntry};

// =============================================================================
// Types
// =============================================================================

/// Key `ScopedEntry` adds next to the flattened entry fields
pub const SCOPE_FLAG_KEY: &str = "is_global";

/// An entry as seen from a particular document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopedEntry {
    #[serde(flatten)]
    pub entry: VocabularyEntry,
    /// True when the entry is borrowed from another document
    #[serde(default)]
    pub is_global: bool,
}

impl ScopedEntry {
    fn new(entry: &VocabularyEntry, is_global: bool) -> Self {
        let mut entry = entry.clone();
        strip_scope_flag(&mut entry);
        Self { entry, is_global }
    }
}

/// Drop a stale `is_global` picked up when a serialized view entry is read
/// back as a plain entry
pub fn strip_scope_flag(entry: &mut VocabularyEntry) {
    entry.payload.remove(SCOPE_FLAG_KEY);
}

/// Derived vocabulary of one document. Recomputed, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentVocabularyView {
    pub document_id: DocumentId,
    pub local_entries: Vec<VocabularyEntry>,
    pub effective_entries: Vec<ScopedEntry>,
    pub exclusions: BTreeSet<String>,
}

impl DocumentVocabularyView {
    /// Plain entries to feed the highlight pipeline
    pub fn effective_vocabulary(&self) -> Vec<VocabularyEntry> {
        self.effective_entries.iter().map(|s| s.entry.clone()).collect()
    }

    pub fn global_entries(&self) -> impl Iterator<Item = &ScopedEntry> {
        self.effective_entries.iter().filter(|s| s.is_global)
    }

    /// Effective entry for a term, compared case-insensitively
    pub fn find_term(&self, term: &str) -> Option<&ScopedEntry> {
        let key = term.trim().to_lowercase();
        self.effective_entries.iter().find(|s| s.entry.term_key() == key)
    }

    pub fn is_excluded(&self, term: &str) -> bool {
        self.exclusions.contains(term)
    }
}

// =============================================================================
// Resolution
// =============================================================================

/// Merge a document's vocabulary with the shared pool
pub fn resolve_scope(
    document_id: DocumentId,
    corpus: &[VocabularyEntry],
    exclusions: &[String],
) -> DocumentVocabularyView {
    let exclusions: BTreeSet<String> = exclusions.iter().cloned().collect();

    let local_entries: Vec<VocabularyEntry> = corpus
        .iter()
        .filter(|e| e.owner_document_id == document_id)
        .cloned()
        .collect();
    let local_terms: HashSet<String> = local_entries.iter().map(VocabularyEntry::term_key).collect();

    // A document with two entries for one term still shows only the newest
    let newest_local = newest_by_term(local_entries.iter());
    let mut effective_entries: Vec<ScopedEntry> = local_entries
        .iter()
        .filter(|e| newest_local.get(&e.term_key()) == Some(&e.id))
        .map(|e| ScopedEntry::new(e, false))
        .collect();

    let others: Vec<&VocabularyEntry> = corpus
        .iter()
        .filter(|e| e.owner_document_id != document_id)
        .collect();
    let newest_global = newest_by_term(others.iter().copied());

    let mut globals: Vec<&VocabularyEntry> = others
        .into_iter()
        .filter(|e| newest_global.get(&e.term_key()) == Some(&e.id))
        .filter(|e| !local_terms.contains(&e.term_key()))
        .filter(|e| !exclusions.contains(&e.term))
        .collect();
    globals.sort_by_key(|e| e.id);
    globals.dedup_by_key(|e| e.id);

    effective_entries.extend(globals.into_iter().map(|e| ScopedEntry::new(e, true)));

    DocumentVocabularyView {
        document_id,
        local_entries,
        effective_entries,
        exclusions,
    }
}

/// Highest id per lowercase term
fn newest_by_term<'a, I>(entries: I) -> HashMap<String, EntryId>
where
    I: Iterator<Item = &'a VocabularyEntry>,
{
    let mut newest: HashMap<String, EntryId> = HashMap::new();
    for entry in entries {
        newest
            .entry(entry.term_key())
            .and_modify(|id| *id = (*id).max(entry.id))
            .or_insert(entry.id);
    }
    newest
}

/// Resolve a document's effective vocabulary from a flat corpus (JS binding)
#[wasm_bindgen(js_name = resolveScope)]
pub fn js_resolve_scope(
    document_id: DocumentId,
    corpus: JsValue,
    exclusions: Vec<String>,
) -> Result<JsValue, JsValue> {
    let corpus: Vec<VocabularyEntry> = serde_wasm_bindgen::from_value(corpus)
        .map_err(|e| JsValue::from_str(&format!("Invalid corpus: {}", e)))?;
    to_js_value(&resolve_scope(document_id, &corpus, &exclusions))
}

// =============================================================================
// Tests
// =============================================================================
