//! VocabularyLibrary: In-Memory Vocabulary Store
//!
//! Holds documents, their exclusion lists and every vocabulary entry, the way
//! the host's persistence layer hands them over. Implements `VocabularySource`
//! so scope resolution and highlighting can run against it directly.
//!
//! # Usage (JavaScript)
//! ```javascript,ignore
//! const library = new VocabularyLibrary();
//! library.hydrate(paragraphs, vocabulary);
//! library.excludeWord(3, 'light');
//! const result = library.highlightDocument(3, null);
//! ```

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::highlight::engine::{parse_config, to_js_value, HighlightPipeline};
use crate::highlight::types::{DocumentId, EntryId, Highlights, VocabularyEntry};
use crate::scope::resolver::{resolve_scope, strip_scope_flag, DocumentVocabularyView};

/// Payload key holding the host's translation, searched alongside terms
pub const TRANSLATION_KEY: &str = "translation";

// =============================================================================
// Collaborator Interface
// =============================================================================

/// What the engine consumes from persistence
pub trait VocabularySource {
    fn local_vocabulary(&self, document_id: DocumentId) -> Vec<VocabularyEntry>;
    fn all_vocabulary(&self) -> Vec<VocabularyEntry>;
    /// Unknown documents have no exclusions
    fn exclusions(&self, document_id: DocumentId) -> Vec<String>;
    fn content(&self, document_id: DocumentId) -> Option<String>;

    /// Resolve the effective vocabulary of a document
    fn view(&self, document_id: DocumentId) -> DocumentVocabularyView {
        resolve_scope(
            document_id,
            &self.all_vocabulary(),
            &self.exclusions(document_id),
        )
    }
}

// =============================================================================
// Types
// =============================================================================

/// A document (paragraph) as stored by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: DocumentId,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub excluded_words: Vec<String>,
}

/// Library-wide counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryStats {
    pub total_entries: usize,
    /// Distinct terms, compared case-insensitively
    pub unique_terms: usize,
    pub document_count: usize,
}

// =============================================================================
// VocabularyLibrary
// =============================================================================

#[wasm_bindgen]
#[derive(Debug, Clone, Default)]
pub struct VocabularyLibrary {
    documents: BTreeMap<DocumentId, DocumentRecord>,
    entries: BTreeMap<EntryId, VocabularyEntry>,
}

impl VocabularySource for VocabularyLibrary {
    fn local_vocabulary(&self, document_id: DocumentId) -> Vec<VocabularyEntry> {
        self.entries
            .values()
            .filter(|e| e.owner_document_id == document_id)
            .cloned()
            .collect()
    }

    fn all_vocabulary(&self) -> Vec<VocabularyEntry> {
        self.entries.values().cloned().collect()
    }

    fn exclusions(&self, document_id: DocumentId) -> Vec<String> {
        self.documents
            .get(&document_id)
            .map(|d| d.excluded_words.clone())
            .unwrap_or_default()
    }

    fn content(&self, document_id: DocumentId) -> Option<String> {
        self.documents.get(&document_id).map(|d| d.content.clone())
    }
}

impl VocabularyLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all contents
    pub fn hydrate(&mut self, documents: Vec<DocumentRecord>, entries: Vec<VocabularyEntry>) {
        self.documents = documents.into_iter().map(|d| (d.id, d)).collect();
        self.entries = entries
            .into_iter()
            .map(|mut e| {
                strip_scope_flag(&mut e);
                (e.id, e)
            })
            .collect();
    }

    pub fn document(&self, document_id: DocumentId) -> Option<&DocumentRecord> {
        self.documents.get(&document_id)
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Create or update a document's content; exclusions are kept
    pub fn upsert_document(&mut self, document_id: DocumentId, content: &str) {
        self.documents
            .entry(document_id)
            .and_modify(|d| d.content = content.to_string())
            .or_insert_with(|| DocumentRecord {
                id: document_id,
                content: content.to_string(),
                excluded_words: Vec::new(),
            });
    }

    /// Remove a document and every entry it owns
    pub fn remove_document(&mut self, document_id: DocumentId) -> bool {
        let removed = self.documents.remove(&document_id).is_some();
        self.entries.retain(|_, e| e.owner_document_id != document_id);
        removed
    }

    pub fn entry(&self, entry_id: EntryId) -> Option<&VocabularyEntry> {
        self.entries.get(&entry_id)
    }

    /// Store a new entry under the next free id
    pub fn add_entry(&mut self, mut entry: VocabularyEntry) -> Result<EntryId, String> {
        let id = match self.entries.keys().next_back() {
            Some(last) => last
                .checked_add(1)
                .ok_or_else(|| format!("Entry id space exhausted after {}", last))?,
            None => 1,
        };
        entry.id = id;
        strip_scope_flag(&mut entry);
        self.entries.insert(id, entry);
        Ok(id)
    }

    /// Insert or replace an entry under its own id
    pub fn put_entry(&mut self, mut entry: VocabularyEntry) {
        strip_scope_flag(&mut entry);
        self.entries.insert(entry.id, entry);
    }

    pub fn delete_entry(&mut self, entry_id: EntryId) -> Option<VocabularyEntry> {
        self.entries.remove(&entry_id)
    }

    /// Hide a shared term from a document. Unknown documents are left alone.
    pub fn exclude_word(&mut self, document_id: DocumentId, word: &str) -> bool {
        match self.documents.get_mut(&document_id) {
            Some(doc) if !doc.excluded_words.iter().any(|w| w == word) => {
                doc.excluded_words.push(word.to_string());
                true
            }
            _ => false,
        }
    }

    /// Undo `exclude_word`
    pub fn include_word(&mut self, document_id: DocumentId, word: &str) -> bool {
        match self.documents.get_mut(&document_id) {
            Some(doc) => {
                let before = doc.excluded_words.len();
                doc.excluded_words.retain(|w| w != word);
                doc.excluded_words.len() != before
            }
            None => false,
        }
    }

    /// Highlight a document against its effective vocabulary
    pub fn highlight_document(
        &self,
        document_id: DocumentId,
        pipeline: &HighlightPipeline,
    ) -> Option<Highlights> {
        let content = self.content(document_id)?;
        let vocabulary = self.view(document_id).effective_vocabulary();
        Some(pipeline.run(&content, &vocabulary))
    }

    /// Case-insensitive substring search over terms, variants and translation, by id
    pub fn search(&self, query: &str) -> Vec<VocabularyEntry> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        self.entries
            .values()
            .filter(|e| {
                e.term.to_lowercase().contains(&needle)
                    || e.variants.iter().any(|v| v.to_lowercase().contains(&needle))
                    || e.payload
                        .get(TRANSLATION_KEY)
                        .and_then(|t| t.as_str())
                        .is_some_and(|t| t.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect()
    }

    pub fn stats(&self) -> LibraryStats {
        let unique: HashSet<String> = self.entries.values().map(VocabularyEntry::term_key).collect();
        LibraryStats {
            total_entries: self.entries.len(),
            unique_terms: unique.len(),
            document_count: self.documents.len(),
        }
    }

    /// Other documents whose text matches the entry, for the cross-reference view
    pub fn documents_mentioning(&self, entry_id: EntryId, pipeline: &HighlightPipeline) -> Vec<DocumentId> {
        let entry = match self.entries.get(&entry_id) {
            Some(e) => e,
            None => return Vec::new(),
        };
        let vocabulary = std::slice::from_ref(entry);

        self.documents
            .values()
            .filter(|d| d.id != entry.owner_document_id)
            .filter(|d| {
                pipeline
                    .run(&d.content, vocabulary)
                    .matched_entry_ids
                    .contains(&entry_id)
            })
            .map(|d| d.id)
            .collect()
    }
}

// =============================================================================
// JS Bindings
// =============================================================================

#[wasm_bindgen]
impl VocabularyLibrary {
    #[wasm_bindgen(constructor)]
    pub fn js_new() -> Self {
        Self::new()
    }

    /// Replace contents with `{ id, content, excluded_words }[]` and entry arrays
    #[wasm_bindgen(js_name = hydrate)]
    pub fn js_hydrate(&mut self, documents: JsValue, entries: JsValue) -> Result<(), JsValue> {
        let documents: Vec<DocumentRecord> = serde_wasm_bindgen::from_value(documents)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse documents: {}", e)))?;
        let entries: Vec<VocabularyEntry> = serde_wasm_bindgen::from_value(entries)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse entries: {}", e)))?;

        self.hydrate(documents, entries);

        #[cfg(target_arch = "wasm32")]
        web_sys::console::log_1(&JsValue::from_str(&format!(
            "[VocabularyLibrary] hydrated {} documents, {} entries",
            self.documents.len(),
            self.entries.len()
        )));

        Ok(())
    }

    #[wasm_bindgen(js_name = setDocument)]
    pub fn js_set_document(&mut self, document_id: DocumentId, content: &str) {
        self.upsert_document(document_id, content);
    }

    #[wasm_bindgen(js_name = removeDocument)]
    pub fn js_remove_document(&mut self, document_id: DocumentId) -> bool {
        self.remove_document(document_id)
    }

    #[wasm_bindgen(js_name = putEntry)]
    pub fn js_put_entry(&mut self, entry: JsValue) -> Result<(), JsValue> {
        let entry: VocabularyEntry = serde_wasm_bindgen::from_value(entry)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse entry: {}", e)))?;
        self.put_entry(entry);
        Ok(())
    }

    #[wasm_bindgen(js_name = deleteEntry)]
    pub fn js_delete_entry(&mut self, entry_id: EntryId) -> bool {
        self.delete_entry(entry_id).is_some()
    }

    #[wasm_bindgen(js_name = excludeWord)]
    pub fn js_exclude_word(&mut self, document_id: DocumentId, word: &str) -> bool {
        let changed = self.exclude_word(document_id, word);
        #[cfg(target_arch = "wasm32")]
        {
            if !changed && self.document(document_id).is_none() {
                web_sys::console::warn_1(&JsValue::from_str(&format!(
                    "[VocabularyLibrary] excludeWord on unknown document {}",
                    document_id
                )));
            }
        }
        changed
    }

    #[wasm_bindgen(js_name = includeWord)]
    pub fn js_include_word(&mut self, document_id: DocumentId, word: &str) -> bool {
        self.include_word(document_id, word)
    }

    /// Effective vocabulary of a document
    #[wasm_bindgen(js_name = view)]
    pub fn js_view(&self, document_id: DocumentId) -> Result<JsValue, JsValue> {
        to_js_value(&self.view(document_id))
    }

    /// Highlights for a stored document, `null` when the document is unknown
    #[wasm_bindgen(js_name = highlightDocument)]
    pub fn js_highlight_document(&self, document_id: DocumentId, config: JsValue) -> Result<JsValue, JsValue> {
        let pipeline = HighlightPipeline::new(parse_config(config)?)
            .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?;
        match self.highlight_document(document_id, &pipeline) {
            Some(highlights) => to_js_value(&highlights),
            None => Ok(JsValue::NULL),
        }
    }

    #[wasm_bindgen(js_name = search)]
    pub fn js_search(&self, query: &str) -> Result<JsValue, JsValue> {
        to_js_value(&self.search(query))
    }

    #[wasm_bindgen(js_name = stats)]
    pub fn js_stats(&self) -> Result<JsValue, JsValue> {
        to_js_value(&self.stats())
    }

    #[wasm_bindgen(js_name = documentsMentioning)]
    pub fn js_documents_mentioning(&self, entry_id: EntryId, config: JsValue) -> Result<Vec<DocumentId>, JsValue> {
        let pipeline = HighlightPipeline::new(parse_config(config)?)
            .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?;
        Ok(self.documents_mentioning(entry_id, &pipeline))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn library() -> VocabularyLibrary {
        let mut library = VocabularyLibrary::new();
        library.hydrate(
            vec![
                DocumentRecord { id: 1, content: "The bank by the river.".into(), excluded_words: vec![] },
                DocumentRecord { id: 2, content: "A light in the dark bank.".into(), excluded_words: vec![] },
            ],
            vec![
                VocabularyEntry::new(10, 1, "bank"),
                VocabularyEntry::new(11, 2, "light").with_variants(["lights"]),
                VocabularyEntry::new(12, 2, "dark"),
            ],
        );
        library
    }

    #[test]
    fn test_source_trait_reads() {
        let library = library();
        assert_eq!(library.local_vocabulary(2).len(), 2);
        assert_eq!(library.all_vocabulary().len(), 3);
        assert!(library.exclusions(99).is_empty());
        assert_eq!(library.content(1).as_deref(), Some("The bank by the river."));
        assert!(library.content(99).is_none());
    }

    #[test]
    fn test_exclude_is_idempotent() {
        let mut library = library();
        assert!(library.exclude_word(1, "light"));
        assert!(!library.exclude_word(1, "light"));
        assert_eq!(library.exclusions(1), vec!["light"]);
    }

    #[test]
    fn test_include_removes_literal_word_only() {
        let mut library = library();
        library.exclude_word(1, "light");
        library.exclude_word(1, "Light");

        assert!(library.include_word(1, "light"));
        assert_eq!(library.exclusions(1), vec!["Light"]);
        assert!(!library.include_word(1, "light"));
    }

    #[test]
    fn test_unknown_document_mutations_are_noops() {
        let mut library = library();
        assert!(!library.exclude_word(42, "light"));
        assert!(!library.include_word(42, "light"));
        assert!(library.exclusions(42).is_empty());
        assert_eq!(library.document_count(), 2);
    }

    #[test]
    fn test_upsert_keeps_exclusions() {
        let mut library = library();
        library.exclude_word(1, "dark");
        library.upsert_document(1, "New text");
        assert_eq!(library.content(1).as_deref(), Some("New text"));
        assert_eq!(library.exclusions(1), vec!["dark"]);

        library.upsert_document(3, "Fresh");
        assert_eq!(library.document_count(), 3);
    }

    #[test]
    fn test_remove_document_cascades_entries() {
        let mut library = library();
        assert!(library.remove_document(2));
        assert_eq!(library.all_vocabulary().len(), 1);
        assert!(!library.remove_document(2));
    }

    #[test]
    fn test_add_entry_assigns_next_id() {
        let mut library = library();
        let id = library.add_entry(VocabularyEntry::new(0, 1, "river")).unwrap();
        assert_eq!(id, 13);
        assert_eq!(library.entry(13).unwrap().term, "river");

        let mut empty = VocabularyLibrary::new();
        assert_eq!(empty.add_entry(VocabularyEntry::new(0, 1, "first")), Ok(1));
    }

    #[test]
    fn test_add_entry_refuses_when_ids_exhausted() {
        let mut library = library();
        library.put_entry(VocabularyEntry::new(u32::MAX, 1, "last"));

        assert!(library.add_entry(VocabularyEntry::new(0, 1, "overflow")).is_err());
        assert_eq!(library.all_vocabulary().len(), 4);
        assert!(library.entry(0).is_none());
    }

    #[test]
    fn test_ingested_entries_drop_stale_scope_flag() {
        let mut library = library();
        let mut echoed = VocabularyEntry::new(30, 2, "shore");
        echoed.payload.insert("is_global".into(), true.into());
        echoed.payload.insert("color".into(), "#E2B933".into());
        library.put_entry(echoed.clone());

        let stored = library.entry(30).unwrap();
        assert!(!stored.payload.contains_key("is_global"));
        assert!(stored.payload.contains_key("color"));

        library.hydrate(vec![], vec![echoed]);
        assert!(!library.entry(30).unwrap().payload.contains_key("is_global"));
    }

    #[test]
    fn test_highlight_document_uses_shared_vocabulary() {
        let library = library();
        let pipeline = HighlightPipeline::default();
        let highlights = library.highlight_document(1, &pipeline).unwrap();
        assert_eq!(highlights.matched_entry_ids, vec![10]);

        // Document 2 borrows "bank" from document 1
        let highlights = library.highlight_document(2, &pipeline).unwrap();
        assert_eq!(highlights.matched_entry_ids, vec![11, 12, 10]);

        assert!(library.highlight_document(99, &pipeline).is_none());
    }

    #[test]
    fn test_search_terms_and_variants() {
        let library = library();
        let ids: Vec<EntryId> = library.search("LIGHTS").iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![11]);

        let ids: Vec<EntryId> = library.search("a").iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![10, 12]);

        assert!(library.search("   ").is_empty());

        let mut library = library;
        let mut entry = VocabularyEntry::new(13, 1, "bank");
        entry.payload.insert(TRANSLATION_KEY.into(), "银行".into());
        library.put_entry(entry);
        let ids: Vec<EntryId> = library.search("银行").iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![13]);

        // Other payload fields are not searched
        let mut entry = VocabularyEntry::new(14, 1, "shore");
        entry.payload.insert("definition".into(), "银行".into());
        library.put_entry(entry);
        assert_eq!(library.search("银行").len(), 1);
    }

    #[test]
    fn test_stats_count_unique_terms() {
        let mut library = library();
        library.put_entry(VocabularyEntry::new(20, 2, "Bank"));
        assert_eq!(
            library.stats(),
            LibraryStats { total_entries: 4, unique_terms: 3, document_count: 2 }
        );
    }

    #[test]
    fn test_documents_mentioning() {
        let library = library();
        let pipeline = HighlightPipeline::default();
        assert_eq!(library.documents_mentioning(10, &pipeline), vec![2]);
        assert!(library.documents_mentioning(11, &pipeline).is_empty());
        assert!(library.documents_mentioning(404, &pipeline).is_empty());
    }
}
