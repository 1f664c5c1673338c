//! Search normalization
//!
//! PDF text comes back with line wraps, tabs and ragged spacing that a
//! highlighted excerpt never has. Both the excerpt and the page text go
//! through [`normalize_for_search`] before any containment check.

/// Canonicalize whitespace for substring matching.
///
/// Tabs, line feeds and carriage returns become spaces, every run of spaces
/// collapses to one, and the result is trimmed.
pub fn normalize_for_search(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;

    for c in text.chars() {
        match c {
            ' ' | '\t' | '\n' | '\r' => pending_space = true,
            _ => {
                if pending_space && !out.is_empty() {
                    out.push(' ');
                }
                pending_space = false;
                out.push(c);
            }
        }
    }

    // Other unicode whitespace (NBSP, form feed) is kept inside the text but
    // must not survive at the edges.
    let trimmed = out.trim();
    if trimmed.len() == out.len() {
        out
    } else {
        trimmed.to_string()
    }
}

/// Replace tabs with spaces, leaving line structure intact.
///
/// This is the only cleanup applied to raw page text on the read path,
/// since the segmenter relies on line breaks.
pub fn normalize_tabs(text: &str) -> String {
    text.replace('\t', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_breaks_become_spaces() {
        assert_eq!(normalize_for_search("brown\nfox"), "brown fox");
        assert_eq!(normalize_for_search("brown\r\nfox"), "brown fox");
        assert_eq!(normalize_for_search("brown\tfox"), "brown fox");
    }

    #[test]
    fn test_space_runs_collapse_fully() {
        assert_eq!(normalize_for_search("a  b"), "a b");
        assert_eq!(normalize_for_search("a   b"), "a b");
        assert_eq!(normalize_for_search("a \n \t b"), "a b");
    }

    #[test]
    fn test_trims_edges() {
        assert_eq!(normalize_for_search("\n\t  quoted text \r\n"), "quoted text");
        assert_eq!(normalize_for_search("\u{a0}text\u{a0}"), "text");
    }

    #[test]
    fn test_empty_and_blank() {
        assert_eq!(normalize_for_search(""), "");
        assert_eq!(normalize_for_search(" \n\t\r "), "");
    }

    #[test]
    fn test_no_control_whitespace_survives() {
        let samples = [
            "The quick\tbrown\n\nfox\r\njumps   over",
            "  leading",
            "trailing\n",
            "\r\r\r",
            "mixed \t\n\r  all",
        ];

        for sample in samples {
            let normalized = normalize_for_search(sample);
            assert!(!normalized.contains('\t'), "{:?}", normalized);
            assert!(!normalized.contains('\n'), "{:?}", normalized);
            assert!(!normalized.contains('\r'), "{:?}", normalized);
            assert_eq!(normalized, normalized.trim());
        }
    }

    #[test]
    fn test_idempotent() {
        let once = normalize_for_search("a\n\nb   c\td");
        assert_eq!(normalize_for_search(&once), once);
    }

    #[test]
    fn test_normalize_tabs_keeps_newlines() {
        assert_eq!(normalize_tabs("a\tb\n\nc"), "a b\n\nc");
    }
}
