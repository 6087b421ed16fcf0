//! Lightweight tokenizer for query and document text

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{BTreeSet, HashSet};

lazy_static! {
    static ref TOKEN_PATTERN: Regex = Regex::new(r"[\p{L}\p{N}_$]+").unwrap();
    static ref STOPWORDS: HashSet<&'static str> = [
        "a", "an", "and", "are", "as", "at", "be", "by", "do", "does", "for", "from", "has",
        "have", "how", "i", "in", "is", "it", "its", "me", "of", "on", "or", "show", "that",
        "the", "this", "to", "was", "were", "what", "which", "who", "with",
    ]
    .into_iter()
    .collect();
}

/// Split text into lowercase tokens, dropping stopwords and single characters.
///
/// Order and duplicates are preserved.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    TOKEN_PATTERN
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|token| token.chars().count() > 1 && !STOPWORDS.contains(token))
        .map(str::to_string)
        .collect()
}

/// Distinct tokens of a text
pub fn token_set(text: &str) -> BTreeSet<String> {
    tokenize(text).into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_lowercases_and_drops_stopwords() {
        let tokens = tokenize("What is the fire rating of Wall W-01?");
        assert_eq!(tokens, vec!["fire", "rating", "wall", "01"]);
    }

    #[test]
    fn test_tokenize_keeps_ifc_guid_characters() {
        let tokens = tokenize("GUID 2O2Fr$t4X7Zf8NOew3FLOH");
        assert_eq!(tokens, vec!["guid", "2o2fr$t4x7zf8noew3floh"]);
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("? ! a").is_empty());
    }

    #[test]
    fn test_token_set_deduplicates() {
        let set = token_set("duct duct beam");
        assert_eq!(set.len(), 2);
    }
}
