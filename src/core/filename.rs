use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Normalizes scraped text into a single path component.
pub fn sanitize_path_component(name: &str) -> String {
    let name: String = name.nfc().collect();
    let name = WS_RE.replace_all(name.trim(), " ");

    let forbidden: &[(char, char)] = &[('/', '⧸'), ('\\', '＼'), ('\0', ' ')];

    let mut result = name.to_string();
    for (from, to) in forbidden {
        result = result.replace(*from, &to.to_string());
    }

    result.trim().to_string()
}

/// `"{ordinal}. {text}"` with apostrophes rendered as backticks.
pub fn ordinal_name(ordinal: usize, text: &str) -> String {
    format!("{}. {}", ordinal, sanitize_path_component(text)).replace('\'', "`")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinal_name_prefixes_ordinal() {
        assert_eq!(ordinal_name(1, "Introduction"), "1. Introduction");
        assert_eq!(ordinal_name(12, "  Wrap up \n"), "12. Wrap up");
    }

    #[test]
    fn ordinal_name_replaces_apostrophes() {
        assert_eq!(ordinal_name(3, "What's new"), "3. What`s new");
        assert!(!ordinal_name(4, "'quoted' 'text'").contains('\''));
    }

    #[test]
    fn sanitize_collapses_whitespace() {
        assert_eq!(sanitize_path_component("hello \t\n  world"), "hello world");
    }

    #[test]
    fn sanitize_replaces_path_separators() {
        let result = sanitize_path_component("Input/Output \\ Streams");
        assert!(!result.contains('/'));
        assert!(!result.contains('\\'));
        assert_eq!(result, "Input⧸Output ＼ Streams");
    }

    #[test]
    fn sanitize_unicode_nfc_normalization() {
        let decomposed = "e\u{0301}";
        assert_eq!(sanitize_path_component(decomposed), "\u{00e9}");
    }

    #[test]
    fn sanitize_keeps_slug_titles_unchanged() {
        let slug = "library_view_some-course_9780000000000";
        assert_eq!(sanitize_path_component(slug), slug);
    }
}
