//! Tokenizers used by the chunker.

use regex::Regex;
use std::sync::OnceLock;

/// Splits text into tokens.
///
/// Tokens are slices of the input. A token includes the separator that
/// follows it, so concatenating every token reproduces the text from its
/// first non-separator character.
pub trait Tokenizer: Send + Sync {
    fn tokenize<'a>(&self, text: &'a str) -> Vec<&'a str>;
}

/// Whitespace-approximated tokenizer: one token per word.
#[derive(Debug, Default, Clone, Copy)]
pub struct WhitespaceTokenizer;

fn word_with_separator() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\S+\s*").expect("static regex"))
}

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize<'a>(&self, text: &'a str) -> Vec<&'a str> {
        word_with_separator()
            .find_iter(text)
            .map(|m| m.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_keep_trailing_separator() {
        let tokens = WhitespaceTokenizer.tokenize("Great, smooth\n\nThe  flight");
        assert_eq!(tokens, vec!["Great, ", "smooth\n\n", "The  ", "flight"]);
        assert_eq!(tokens.concat(), "Great, smooth\n\nThe  flight");
    }

    #[test]
    fn test_empty_and_blank_input() {
        assert!(WhitespaceTokenizer.tokenize("").is_empty());
        assert!(WhitespaceTokenizer.tokenize(" \n\t ").is_empty());
    }

    #[test]
    fn test_leading_whitespace_is_dropped() {
        let tokens = WhitespaceTokenizer.tokenize("  hello world ");
        assert_eq!(tokens, vec!["hello ", "world "]);
    }
}
