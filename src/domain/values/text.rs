//! Tokenisation and lexical similarity shared by clustering, scoring and
//! deduplication.

use std::collections::HashSet;
use std::hash::Hash;

fn trim_token(token: &str) -> &str {
    token.trim_matches(|c: char| !c.is_alphanumeric())
}

/// Lowercased whitespace tokens with surrounding punctuation trimmed.
pub fn content_words(text: &str) -> HashSet<String> {
    text.split_whitespace()
        .map(|t| trim_token(t).to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Ordered tokens in their original casing, punctuation trimmed.
pub fn words(text: &str) -> Vec<&str> {
    text.split_whitespace()
        .map(trim_token)
        .filter(|t| !t.is_empty())
        .collect()
}

/// Jaccard overlap `|a ∩ b| / |a ∪ b|`. Two empty sets score 0.
pub fn jaccard<T: Eq + Hash>(a: &HashSet<T>, b: &HashSet<T>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    intersection as f64 / union as f64
}

/// Lowercase, drop punctuation, collapse whitespace.
pub fn normalize_text(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_punctuation() { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Count occurrences of `keyword` in `haystack` that sit on word boundaries.
///
/// Both arguments are expected lowercase. Multi-word keywords are matched
/// as literal phrases.
pub fn count_keyword(haystack: &str, keyword: &str) -> usize {
    if keyword.is_empty() {
        return 0;
    }
    let bytes = haystack.as_bytes();
    let mut count = 0;
    let mut start = 0;
    while let Some(pos) = haystack[start..].find(keyword) {
        let begin = start + pos;
        let end = begin + keyword.len();
        let before_ok = begin == 0 || !is_word_byte(bytes[begin - 1]);
        let after_ok = end >= bytes.len() || !is_word_byte(bytes[end]);
        if before_ok && after_ok {
            count += 1;
        }
        start = begin + keyword.len().max(1);
        while start < haystack.len() && !haystack.is_char_boundary(start) {
            start += 1;
        }
        if start >= haystack.len() {
            break;
        }
    }
    count
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Total hits of every keyword in `keywords`.
pub fn count_keywords<S: AsRef<str>>(haystack: &str, keywords: &[S]) -> usize {
    keywords
        .iter()
        .map(|k| count_keyword(haystack, k.as_ref()))
        .sum()
}

/// Whether any keyword occurs at least once.
pub fn contains_any<S: AsRef<str>>(haystack: &str, keywords: &[S]) -> bool {
    keywords.iter().any(|k| count_keyword(haystack, k.as_ref()) > 0)
}

/// Split text into trimmed, non-empty sentences.
pub fn sentences(text: &str) -> Vec<&str> {
    text.split(['.', '!', '?', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_words_lowercases_and_trims() {
        let words = content_words("Slow, SLOW exports!");
        assert_eq!(words.len(), 2);
        assert!(words.contains("slow"));
        assert!(words.contains("exports"));
    }

    #[test]
    fn test_jaccard_identical_and_disjoint() {
        let a = content_words("alpha beta gamma");
        let b = content_words("gamma beta alpha");
        let c = content_words("delta epsilon");
        assert!((jaccard(&a, &b) - 1.0).abs() < 1e-9);
        assert_eq!(jaccard(&a, &c), 0.0);
    }

    #[test]
    fn test_jaccard_empty_is_zero() {
        let empty = content_words("  ... ");
        let other = content_words("something");
        assert_eq!(jaccard(&empty, &other), 0.0);
        assert_eq!(jaccard(&empty, &empty), 0.0);
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(
            normalize_text("  AI  Data-Processing   Solution!! "),
            "ai data processing solution"
        );
    }

    #[test]
    fn test_count_keyword_respects_word_boundaries() {
        assert_eq!(count_keyword("rapid capital api", "api"), 1);
        assert_eq!(count_keyword("critical, critical and critically", "critical"), 2);
        assert_eq!(count_keyword("no solution exists", "no solution"), 1);
        assert_eq!(count_keyword("ai-powered tool", "ai-powered"), 1);
    }

    #[test]
    fn test_count_keyword_non_ascii_haystack() {
        assert_eq!(count_keyword("café need naïve need", "need"), 2);
    }

    #[test]
    fn test_sentences() {
        let s = sentences("First one. Second one!  Third?\nFourth");
        assert_eq!(s, vec!["First one", "Second one", "Third", "Fourth"]);
    }
}
