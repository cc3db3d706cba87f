//! Phrase Grouper
//!
//! Coalesces consecutive same-owner tokens into one `MatchSpan` so a phrase
//! gets a single color, tooltip and click target.

use super::matcher::OwnershipMap;
use super::types::{MatchSpan, Token};

/// Build maximal same-owner spans in token order
pub fn group_spans(tokens: &[Token], ownership: &OwnershipMap) -> Vec<MatchSpan> {
    let mut spans: Vec<MatchSpan> = Vec::new();
    let mut current: Option<MatchSpan> = None;

    for (position, token) in tokens.iter().enumerate() {
        let owner = ownership.owner(position);

        if let (Some(span), Some(id)) = (current.as_mut(), owner) {
            if span.entry_id == id {
                span.end = token.index;
                span.last_token = position;
                continue;
            }
        }

        if let Some(done) = current.take() {
            spans.push(done);
        }
        current = owner.map(|entry_id| MatchSpan {
            entry_id,
            start: token.index,
            end: token.index,
            first_token: position,
            last_token: position,
        });
    }

    if let Some(done) = current {
        spans.push(done);
    }

    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::tokenizer::tokenize;
    use crate::highlight::types::EntryId;

    fn ownership(owners: &[Option<EntryId>]) -> OwnershipMap {
        let mut map = OwnershipMap::new(owners.len());
        for (pos, owner) in owners.iter().enumerate() {
            if let Some(id) = owner {
                map.claim((pos, pos), *id);
            }
        }
        map
    }

    #[test]
    fn test_phrase_becomes_one_span() {
        let tokens = tokenize("articulate yourself now");
        let map = ownership(&[Some(2), Some(2), Some(2), None, None]);
        let spans = group_spans(&tokens, &map);

        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].entry_id, 2);
        assert_eq!((spans[0].first_token, spans[0].last_token), (0, 2));
        assert_eq!(spans[0].token_count(), 3);
    }

    #[test]
    fn test_gap_splits_same_owner() {
        let tokens = tokenize("bank bank");
        let map = ownership(&[Some(1), None, Some(1)]);
        let spans = group_spans(&tokens, &map);
        assert_eq!(spans.len(), 2);
    }

    #[test]
    fn test_adjacent_different_owners_split() {
        let tokens = tokenize("a b");
        let map = ownership(&[Some(1), Some(1), Some(2)]);
        let spans = group_spans(&tokens, &map);

        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].entry_id, 1);
        assert_eq!(spans[1].entry_id, 2);
        assert_eq!(spans[1].first_token, 2);
    }

    #[test]
    fn test_span_uses_raw_indices() {
        // "well, said": "well," merged (raw 0 and 1), space raw 2, "said" raw 3
        let tokens = tokenize("well, said");
        let map = ownership(&[Some(5), Some(5), Some(5)]);
        let spans = group_spans(&tokens, &map);

        assert_eq!(spans.len(), 1);
        assert_eq!((spans[0].start, spans[0].end), (0, 3));
        assert_eq!((spans[0].first_token, spans[0].last_token), (0, 2));
    }

    #[test]
    fn test_no_owners_no_spans() {
        let tokens = tokenize("plain text");
        let map = OwnershipMap::new(tokens.len());
        assert!(group_spans(&tokens, &map).is_empty());
    }
}
