//! Tokenizer: Layout-Stable Text Segmentation
//!
//! Splits text into word, punctuation and whitespace segments. A word followed
//! directly by one punctuation mark absorbs that mark so the renderer never
//! wraps a lone "." onto the next line. The composite keeps the word's raw
//! split ordinal; the mark's ordinal is consumed.
//!
//! Line breaks are always their own whitespace token, one per break.

use regex::Regex;

use super::config::DEFAULT_PUNCTUATION;
use super::types::{Token, TokenKind};

/// Line breaks first, then horizontal whitespace runs
const WHITESPACE_ALTERNATIVES: &str = r"\r\n|\n|\r|[^\S\r\n]+";

// =============================================================================
// Tokenizer
// =============================================================================

#[derive(Clone, Debug)]
pub struct Tokenizer {
    splitter: Regex,
}

impl Default for Tokenizer {
    fn default() -> Self {
        let pattern = splitter_pattern(DEFAULT_PUNCTUATION);
        Self {
            splitter: Regex::new(&pattern).expect("default splitter pattern is valid"),
        }
    }
}

impl Tokenizer {
    /// Build a tokenizer splitting on the given punctuation characters
    pub fn new(punctuation: &str) -> Result<Self, String> {
        let pattern = splitter_pattern(punctuation);
        let splitter = Regex::new(&pattern)
            .map_err(|e| format!("Invalid punctuation set {:?}: {}", punctuation, e))?;
        Ok(Self { splitter })
    }

    /// Split text into tokens
    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        merge_trailing_punctuation(self.split_raw(text))
    }

    /// Raw split: every delimiter and every gap between delimiters
    fn split_raw<'t>(&self, text: &'t str) -> Vec<(TokenKind, &'t str)> {
        let mut raw = Vec::new();
        let mut last = 0;

        for m in self.splitter.find_iter(text) {
            if m.start() > last {
                raw.push((TokenKind::Word, &text[last..m.start()]));
            }
            let kind = if m.as_str().chars().all(char::is_whitespace) {
                TokenKind::Whitespace
            } else {
                TokenKind::Punctuation
            };
            raw.push((kind, m.as_str()));
            last = m.end();
        }

        if last < text.len() {
            raw.push((TokenKind::Word, &text[last..]));
        }

        raw
    }
}

fn splitter_pattern(punctuation: &str) -> String {
    let class: String = punctuation
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| regex::escape(&c.to_string()))
        .collect();

    if class.is_empty() {
        WHITESPACE_ALTERNATIVES.to_string()
    } else {
        format!("{}|[{}]", WHITESPACE_ALTERNATIVES, class)
    }
}

/// Attach a single following mark to each word; further marks stay standalone
fn merge_trailing_punctuation(raw: Vec<(TokenKind, &str)>) -> Vec<Token> {
    let mut tokens = Vec::with_capacity(raw.len());
    let mut i = 0;

    while i < raw.len() {
        let (kind, text) = raw[i];

        if kind == TokenKind::Word {
            if let Some(&(TokenKind::Punctuation, mark)) = raw.get(i + 1) {
                tokens.push(Token {
                    index: i,
                    kind,
                    text: text.to_string(),
                    punct: Some(mark.to_string()),
                });
                i += 2;
                continue;
            }
        }

        tokens.push(Token {
            index: i,
            kind,
            text: text.to_string(),
            punct: None,
        });
        i += 1;
    }

    tokens
}

/// Tokenize with the default punctuation set
pub fn tokenize(text: &str) -> Vec<Token> {
    Tokenizer::default().tokenize(text)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
        tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_empty_text() {
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_words_and_spaces() {
        let tokens = tokenize("She will  explain");
        assert_eq!(tokens.len(), 5);
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Word,
                TokenKind::Whitespace,
                TokenKind::Word,
                TokenKind::Whitespace,
                TokenKind::Word,
            ]
        );
        // Whitespace runs stay one token
        assert_eq!(tokens[3].text, "  ");
    }

    #[test]
    fn test_single_mark_merges_into_word() {
        let tokens = tokenize("in detail. Next");
        let detail = &tokens[2];
        assert_eq!(detail.text, "detail");
        assert_eq!(detail.punct.as_deref(), Some("."));
        assert_eq!(detail.index, 2);
        // The mark consumed ordinal 3; the following space is ordinal 4
        assert_eq!(tokens[3].index, 4);
        assert_eq!(tokens[3].kind, TokenKind::Whitespace);
    }

    #[test]
    fn test_consecutive_marks_not_merged_together() {
        let tokens = tokenize("wait?!");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].text, "wait");
        assert_eq!(tokens[0].punct.as_deref(), Some("?"));
        assert_eq!(tokens[1].kind, TokenKind::Punctuation);
        assert_eq!(tokens[1].text, "!");
        assert_eq!(tokens[1].index, 2);
    }

    #[test]
    fn test_leading_mark_stays_standalone() {
        let tokens = tokenize("(aside)");
        assert_eq!(tokens[0].kind, TokenKind::Punctuation);
        assert_eq!(tokens[0].text, "(");
        assert_eq!(tokens[1].text, "aside");
        assert_eq!(tokens[1].punct.as_deref(), Some(")"));
    }

    #[test]
    fn test_newlines_are_distinct_tokens() {
        let tokens = tokenize("one\n\ntwo");
        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[1].text, "\n");
        assert_eq!(tokens[2].text, "\n");
        assert!(tokens[1].is_whitespace() && tokens[2].is_whitespace());
    }

    #[test]
    fn test_crlf_is_one_break() {
        let tokens = tokenize("one \r\ntwo");
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["one", " ", "\r\n", "two"]);
    }

    #[test]
    fn test_indices_are_raw_ordinals() {
        let tokens = tokenize("a, b, c");
        let indices: Vec<usize> = tokens.iter().map(|t| t.index).collect();
        // raw: a , ␠ b , ␠ c  →  merged a, / ␠ / b, / ␠ / c
        assert_eq!(indices, vec![0, 2, 3, 5, 6]);
    }

    #[test]
    fn test_custom_punctuation_set() {
        let tokenizer = Tokenizer::new("-").unwrap();
        let tokens = tokenizer.tokenize("well-known.");
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["well", "known."]);
        assert_eq!(tokens[0].punct.as_deref(), Some("-"));
    }

    #[test]
    fn test_display_text_reconstructs_input() {
        let text = "He said: \"no\" (twice)...\nThen left.";
        let rebuilt: String = tokenize(text).iter().map(Token::display_text).collect();
        assert_eq!(rebuilt, text);
    }
}
