//! String cleanup primitives applied to scraped table cells.

use once_cell::sync::Lazy;
use regex::Regex;

/// Footnote markers such as `[12]` plus any whitespace that trails them
static CITATION_BRACKETS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[.+?\]\s*").expect("citation pattern is valid"));

/// Annotations such as ` (including perpetrator)` on casualty counts
static PERPETRATOR_PARENTHETICAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r" \(.+?perpetrator\)\s*").expect("perpetrator pattern is valid"));

/// Result of pulling the perpetrator annotation out of a casualty cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerpetratorExtraction {
    /// The cell text with every annotation removed
    pub cleaned: String,
    /// Whether the original text carried at least one annotation
    pub found_perpetrator: bool,
}

/// Remove every citation bracket from the text.
pub fn strip_citations(text: &str) -> String {
    CITATION_BRACKETS.replace_all(text, "").into_owned()
}

/// Remove perpetrator annotations and report whether any were present.
pub fn extract_perpetrator_parenthetical(text: &str) -> PerpetratorExtraction {
    PerpetratorExtraction {
        cleaned: PERPETRATOR_PARENTHETICAL.replace_all(text, "").into_owned(),
        found_perpetrator: PERPETRATOR_PARENTHETICAL.is_match(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_citations_removes_every_marker() {
        assert_eq!(
            strip_citations("Shooter killed 3 people [12][13]."),
            "Shooter killed 3 people ."
        );
    }

    #[test]
    fn test_strip_citations_eats_trailing_whitespace() {
        assert_eq!(strip_citations("2[a] 3"), "23");
        assert_eq!(strip_citations("Text [note 1]   and more"), "Text and more");
    }

    #[test]
    fn test_strip_citations_without_brackets_is_unchanged() {
        let text = "A gunman opened fire at a high school.";
        assert_eq!(strip_citations(text), text);
        assert_eq!(strip_citations(""), "");
    }

    #[test]
    fn test_strip_citations_ignores_empty_brackets() {
        // `.+?` needs at least one character between the brackets
        assert_eq!(strip_citations("odd [] text"), "odd [] text");
    }

    #[test]
    fn test_extract_perpetrator_found() {
        let result = extract_perpetrator_parenthetical("4 (including perpetrator)");
        assert_eq!(result.cleaned, "4");
        assert!(result.found_perpetrator);
    }

    #[test]
    fn test_extract_perpetrator_not_found() {
        let result = extract_perpetrator_parenthetical("4");
        assert_eq!(result.cleaned, "4");
        assert!(!result.found_perpetrator);
    }

    #[test]
    fn test_extract_perpetrator_keeps_other_parentheticals() {
        let result = extract_perpetrator_parenthetical("2 (both students)");
        assert_eq!(result.cleaned, "2 (both students)");
        assert!(!result.found_perpetrator);
    }

    #[test]
    fn test_extract_perpetrator_strips_trailing_citation_space() {
        let result = extract_perpetrator_parenthetical("3 (excluding the perpetrator) [4]");
        assert_eq!(result.cleaned, "3[4]");
        assert!(result.found_perpetrator);
    }

    #[test]
    fn test_extract_perpetrator_requires_leading_space() {
        let result = extract_perpetrator_parenthetical("1(perpetrator)");
        assert_eq!(result.cleaned, "1(perpetrator)");
        assert!(!result.found_perpetrator);
    }
}
