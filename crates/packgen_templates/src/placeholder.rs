//! Placeholder syntax.
//!
//! A placeholder is an identifier wrapped in percent signs: `%NAME%`.
//! Identifiers match `[A-Za-z_][A-Za-z0-9_]*` and are case-sensitive.

use std::sync::OnceLock;

use regex::Regex;

/// Delimiter on both sides of a placeholder identifier.
pub const DELIMITER: char = '%';

/// The compiled placeholder pattern; capture group 1 is the identifier.
pub(crate) fn pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"%([A-Za-z_][A-Za-z0-9_]*)%").expect("placeholder pattern is valid")
    })
}

/// A placeholder occurrence inside a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder<'t> {
    /// Identifier between the delimiters.
    pub name: &'t str,
    /// Byte offset of the opening delimiter.
    pub start: usize,
    /// Byte offset just past the closing delimiter.
    pub end: usize,
}

/// Check whether `name` is a valid placeholder identifier.
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Format `name` as a placeholder token.
pub fn token(name: &str) -> String {
    format!("{DELIMITER}{name}{DELIMITER}")
}

/// Iterate over every placeholder in `text`, left to right.
pub fn scan(text: &str) -> impl Iterator<Item = Placeholder<'_>> {
    pattern().captures_iter(text).filter_map(|caps| {
        let whole = caps.get(0)?;
        let name = caps.get(1)?;
        Some(Placeholder {
            name: name.as_str(),
            start: whole.start(),
            end: whole.end(),
        })
    })
}

/// Distinct placeholder names in `text`, in order of first appearance.
pub fn names(text: &str) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for p in scan(text) {
        if !seen.iter().any(|s| s == p.name) {
            seen.push(p.name.to_string());
        }
    }
    seen
}

/// Whether any placeholder token occurs in `text`.
pub fn contains_placeholder(text: &str) -> bool {
    pattern().is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        assert!(is_valid_name("NAME"));
        assert!(is_valid_name("_private"));
        assert!(is_valid_name("AUTHOR_EMAIL2"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("2FAST"));
        assert!(!is_valid_name("WITH-DASH"));
        assert!(!is_valid_name("has space"));
    }

    #[test]
    fn test_scan_positions() {
        let text = "name='%NAME%', version='%VERSION%'";
        let found: Vec<_> = scan(text).collect();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].name, "NAME");
        assert_eq!(&text[found[0].start..found[0].end], "%NAME%");
        assert_eq!(found[1].name, "VERSION");
    }

    #[test]
    fn test_names_are_distinct_and_ordered() {
        let text = "%B% %A% %B% %A%";
        assert_eq!(names(text), vec!["B", "A"]);
    }

    #[test]
    fn test_lone_percent_is_not_a_placeholder() {
        assert!(!contains_placeholder("progress: 100% done"));
        assert!(!contains_placeholder("'%s' % value"));
        assert!(!contains_placeholder("%1ABC%"));
        assert!(contains_placeholder("x%Y%z"));
    }

    #[test]
    fn test_token() {
        assert_eq!(token("NAME"), "%NAME%");
    }
}
