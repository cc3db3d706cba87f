//! SpanMatcher: Vocabulary Ownership over a Token Stream
//!
//! Walks token positions left to right. At each word, entries are tried in
//! priority order (longest canonical term first) so a short common word
//! cannot pre-empt the phrase that contains it. Every pattern that matches
//! claims its matched sub-ranges; a position already owned keeps its owner.
//!
//! # Discontinuous patterns
//! Part 0 must start exactly at the scan position. Each later part must begin
//! within `lookahead_window` token slots after the previous part's last word.
//! The first position that satisfies the part is taken, with no backtracking.
//! Only the matched words (and whitespace inside a part) are claimed, never
//! the gap between parts.

use serde::{Deserialize, Serialize};

use super::pattern::{CompiledEntry, CompiledPattern};
use super::types::{EntryId, Token, TokenKind};

// =============================================================================
// Types
// =============================================================================

/// A complete match of one pattern
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    pub entry_id: EntryId,
    /// Index of the pattern inside its `CompiledEntry`
    pub pattern_index: usize,
    /// Inclusive token-position ranges, one per pattern part
    pub ranges: Vec<(usize, usize)>,
    /// Number of positions this occurrence actually won
    pub claimed: usize,
}

/// Owner of each token position
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OwnershipMap {
    owners: Vec<Option<EntryId>>,
}

impl OwnershipMap {
    pub fn new(len: usize) -> Self {
        Self { owners: vec![None; len] }
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    pub fn owner(&self, position: usize) -> Option<EntryId> {
        self.owners.get(position).copied().flatten()
    }

    pub fn owned_count(&self) -> usize {
        self.owners.iter().filter(|o| o.is_some()).count()
    }

    pub fn as_slice(&self) -> &[Option<EntryId>] {
        &self.owners
    }

    /// First write wins: returns how many positions were newly claimed
    pub fn claim(&mut self, (start, end): (usize, usize), entry_id: EntryId) -> usize {
        let mut claimed = 0;
        for slot in &mut self.owners[start..=end] {
            if slot.is_none() {
                *slot = Some(entry_id);
                claimed += 1;
            }
        }
        claimed
    }
}

/// Matcher output
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MatchOutcome {
    pub ownership: OwnershipMap,
    pub occurrences: Vec<Occurrence>,
}

impl MatchOutcome {
    /// Entries with at least one occurrence, in order of first occurrence
    pub fn matched_entry_ids(&self) -> Vec<EntryId> {
        let mut ids: Vec<EntryId> = Vec::new();
        for occ in &self.occurrences {
            if !ids.contains(&occ.entry_id) {
                ids.push(occ.entry_id);
            }
        }
        ids
    }
}

/// What the matcher sees at a token position
#[derive(Debug, Clone, PartialEq, Eq)]
enum Slot {
    /// Lowercased word part
    Word(String),
    /// Skipped between words of one part
    Space,
    /// Breaks a word sequence
    Mark,
}

impl Slot {
    fn from_token(token: &Token) -> Self {
        match token.kind {
            TokenKind::Word => Slot::Word(token.text.to_lowercase()),
            TokenKind::Whitespace => Slot::Space,
            TokenKind::Punctuation => Slot::Mark,
        }
    }

    fn is_word(&self) -> bool {
        matches!(self, Slot::Word(_))
    }
}

// =============================================================================
// SpanMatcher
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpanMatcher {
    lookahead_window: usize,
}

impl SpanMatcher {
    pub fn new(lookahead_window: usize) -> Self {
        Self { lookahead_window }
    }

    pub fn lookahead_window(&self) -> usize {
        self.lookahead_window
    }

    /// Compute token ownership for the given compiled vocabulary
    pub fn run(&self, tokens: &[Token], entries: &[CompiledEntry]) -> MatchOutcome {
        let slots: Vec<Slot> = tokens.iter().map(Slot::from_token).collect();
        let ordered = priority_order(entries);

        let mut outcome = MatchOutcome {
            ownership: OwnershipMap::new(slots.len()),
            occurrences: Vec::new(),
        };

        for i in 0..slots.len() {
            if !slots[i].is_word() {
                continue;
            }

            for entry in &ordered {
                for (pattern_index, pattern) in entry.patterns.iter().enumerate() {
                    let ranges = match self.match_at(&slots, i, pattern) {
                        Some(r) => r,
                        None => continue,
                    };

                    let claimed = ranges
                        .iter()
                        .map(|&range| outcome.ownership.claim(range, entry.entry_id))
                        .sum();

                    outcome.occurrences.push(Occurrence {
                        entry_id: entry.entry_id,
                        pattern_index,
                        ranges,
                        claimed,
                    });
                }
            }
        }

        outcome
    }

    /// Try every part of `pattern` with part 0 anchored at `start`
    fn match_at(
        &self,
        slots: &[Slot],
        start: usize,
        pattern: &CompiledPattern,
    ) -> Option<Vec<(usize, usize)>> {
        let (first, rest) = pattern.parts.split_first()?;

        let mut ranges = Vec::with_capacity(pattern.parts.len());
        let mut prev_end = match_sequence(slots, start, first)?;
        ranges.push((start, prev_end));

        for part in rest {
            let from = prev_end + 1;
            let until = from.saturating_add(self.lookahead_window).min(slots.len());

            let (part_start, part_end) = (from..until)
                .filter(|&p| slots[p].is_word())
                .find_map(|p| match_sequence(slots, p, part).map(|end| (p, end)))?;

            ranges.push((part_start, part_end));
            prev_end = part_end;
        }

        Some(ranges)
    }
}

impl Default for SpanMatcher {
    fn default() -> Self {
        Self::new(super::config::DEFAULT_LOOKAHEAD_WINDOW)
    }
}

/// Match `words` starting at the word slot `start`, skipping whitespace between
/// words. Returns the position of the last matched word.
fn match_sequence(slots: &[Slot], start: usize, words: &[String]) -> Option<usize> {
    let mut pos = start;
    let mut last = None;

    for word in words {
        // Whitespace is only skipped between words, never before the first
        if last.is_some() {
            while matches!(slots.get(pos), Some(Slot::Space)) {
                pos += 1;
            }
        }
        match slots.get(pos) {
            Some(Slot::Word(w)) if w == word => {
                last = Some(pos);
                pos += 1;
            }
            _ => return None,
        }
    }

    last
}

/// Longest canonical term first; ties by term, then id, so input order never matters
fn priority_order(entries: &[CompiledEntry]) -> Vec<&CompiledEntry> {
    let mut ordered: Vec<&CompiledEntry> = entries.iter().collect();
    ordered.sort_by(|a, b| {
        b.term_len()
            .cmp(&a.term_len())
            .then_with(|| a.term_key.cmp(&b.term_key))
            .then_with(|| a.entry_id.cmp(&b.entry_id))
    });
    ordered
}

// =============================================================================
// Tests
// =============================================================================
