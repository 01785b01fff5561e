//! Diacritic-insensitive text matching
//!
//! Canonical decomposition (NFD) followed by dropping combining marks, so
//! "José" and "jose" compare equal. Locale-specific folding (Turkish dotless
//! i and friends) is not attempted.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Strip diacritics without changing case
pub fn strip_diacritics(text: &str) -> String {
    text.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Lowercased, diacritic-free form used for all comparisons
pub fn fold(text: &str) -> String {
    strip_diacritics(text).to_lowercase()
}

/// True if `needle` occurs in `haystack` ignoring case and diacritics.
/// An empty needle matches everything.
pub fn contains_folded(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    fold(haystack).contains(&fold(needle))
}

/// Query text as sent to remote sources: diacritics and punctuation removed,
/// surrounding whitespace trimmed.
pub fn sanitize_query(query: &str) -> String {
    strip_diacritics(query)
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_strips_accents_and_case() {
        assert_eq!(fold("José Ñandú"), "jose nandu");
        assert_eq!(fold("ÇÃO"), "cao");
    }

    #[test]
    fn test_contains_folded() {
        assert!(contains_folded("Relatório", "relato"));
        assert!(contains_folded("Green", "EE"));
        assert!(contains_folded("anything", ""));
        assert!(!contains_folded("Red", "green"));
    }

    #[test]
    fn test_sanitize_query() {
        assert_eq!(sanitize_query("  café, crème!  "), "cafe creme");
        assert_eq!(sanitize_query("a.b-c"), "abc");
        assert_eq!(sanitize_query("?!"), "");
    }
}
