//! Checks shared by several dialects.

use crate::finding::{FindingRule, ValidationFinding};

/// How one kind of string literal is delimited.
#[derive(Debug, Clone, Copy)]
pub struct StringStyle {
    pub quote: char,
    /// Backslash escapes the next character.
    pub escapes: bool,
    /// Tripled quotes open a multi-line literal.
    pub triple: bool,
}

/// Lexical rules the bracket balance check needs to skip strings and comments.
#[derive(Debug, Clone, Copy)]
pub struct BalanceSyntax {
    pub strings: &'static [StringStyle],
    pub line_comment: Option<char>,
}

pub const PYTHON_SYNTAX: BalanceSyntax = BalanceSyntax {
    strings: &[
        StringStyle {
            quote: '\'',
            escapes: true,
            triple: true,
        },
        StringStyle {
            quote: '"',
            escapes: true,
            triple: true,
        },
    ],
    line_comment: Some('#'),
};

pub const JSON_SYNTAX: BalanceSyntax = BalanceSyntax {
    strings: &[StringStyle {
        quote: '"',
        escapes: true,
        triple: false,
    }],
    line_comment: None,
};

pub const TOML_SYNTAX: BalanceSyntax = BalanceSyntax {
    strings: &[
        StringStyle {
            quote: '"',
            escapes: true,
            triple: true,
        },
        StringStyle {
            quote: '\'',
            escapes: false,
            triple: true,
        },
    ],
    line_comment: Some('#'),
};

fn closer_for(open: char) -> char {
    match open {
        '(' => ')',
        '[' => ']',
        _ => '}',
    }
}

/// Check that brackets nest properly and every string literal is closed.
///
/// Stops at the first mismatch: anything after it would only be noise.
pub fn check_balance(text: &str, syntax: &BalanceSyntax) -> Vec<ValidationFinding> {
    let chars: Vec<char> = text.chars().collect();
    let mut findings = Vec::new();
    let mut stack: Vec<(char, usize)> = Vec::new();
    let mut line = 1;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '\n' => line += 1,
            c if syntax.line_comment == Some(c) => {
                while i + 1 < chars.len() && chars[i + 1] != '\n' {
                    i += 1;
                }
            }
            '(' | '[' | '{' => stack.push((c, line)),
            ')' | ']' | '}' => match stack.pop() {
                Some((open, _)) if closer_for(open) == c => {}
                Some((open, open_line)) => {
                    findings.push(
                        ValidationFinding::new(
                            FindingRule::Balance,
                            format!("'{}' does not close '{}' opened on line {}", c, open, open_line),
                        )
                        .expected(format!("'{}'", closer_for(open)))
                        .actual(c.to_string())
                        .line(line),
                    );
                    return findings;
                }
                None => {
                    findings.push(
                        ValidationFinding::new(
                            FindingRule::Balance,
                            format!("'{}' has no matching opening bracket", c),
                        )
                        .line(line),
                    );
                    return findings;
                }
            },
            c => {
                if let Some(style) = syntax.strings.iter().find(|s| s.quote == c) {
                    let start_line = line;
                    match skip_string(&chars, i, style, &mut line) {
                        Some(next) => {
                            i = next;
                            continue;
                        }
                        None => {
                            findings.push(
                                ValidationFinding::new(
                                    FindingRule::Balance,
                                    "string literal is never closed",
                                )
                                .line(start_line),
                            );
                            return findings;
                        }
                    }
                }
            }
        }
        i += 1;
    }

    for (open, open_line) in stack.into_iter().rev() {
        findings.push(
            ValidationFinding::new(
                FindingRule::Balance,
                format!("'{}' is never closed", open),
            )
            .expected(format!("'{}'", closer_for(open)))
            .line(open_line),
        );
    }
    findings
}

/// Skip the literal starting at `start`; returns the index after it.
fn skip_string(chars: &[char], start: usize, style: &StringStyle, line: &mut usize) -> Option<usize> {
    let q = style.quote;
    let triple = style.triple
        && chars.get(start + 1) == Some(&q)
        && chars.get(start + 2) == Some(&q);

    let mut i = if triple { start + 3 } else { start + 1 };

    while i < chars.len() {
        let c = chars[i];
        if style.escapes && c == '\\' {
            if chars.get(i + 1) == Some(&'\n') {
                *line += 1;
            }
            i += 2;
            continue;
        }
        if c == '\n' {
            if !triple {
                return None;
            }
            *line += 1;
        }
        if c == q {
            if !triple {
                return Some(i + 1);
            }
            if chars.get(i + 1) == Some(&q) && chars.get(i + 2) == Some(&q) {
                return Some(i + 3);
            }
        }
        i += 1;
    }
    None
}

/// 1-based line number of a byte offset.
pub fn line_of(text: &str, offset: usize) -> usize {
    let end = offset.min(text.len());
    text.as_bytes()[..end].iter().filter(|b| **b == b'\n').count() + 1
}

/// Check one file pattern from an include list.
pub fn check_glob(field: &str, pattern: &str) -> Option<ValidationFinding> {
    if pattern.trim().is_empty() {
        return Some(
            ValidationFinding::new(FindingRule::Glob, "file pattern is empty")
                .field(field)
                .actual(pattern),
        );
    }
    if pattern.split(['/', '\\']).any(|segment| segment == "..") {
        return Some(
            ValidationFinding::new(FindingRule::Glob, "file pattern leaves the package root")
                .field(field)
                .actual(pattern),
        );
    }
    glob::Pattern::new(pattern).err().map(|e| {
        ValidationFinding::new(FindingRule::Glob, format!("invalid glob: {}", e))
            .field(field)
            .actual(pattern)
    })
}

/// Check a SemVer 2.0 version string.
pub fn check_semver(field: &str, version: &str) -> Option<ValidationFinding> {
    semver::Version::parse(version).err().map(|e| {
        ValidationFinding::new(FindingRule::Version, format!("not a semantic version: {}", e))
            .field(field)
            .expected("MAJOR.MINOR.PATCH[-PRERELEASE][+BUILD]")
            .actual(version)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balanced_text() {
        let text = "setup(name='a(b', data={'x': ['[', \"]\"]})  # trailing ) comment\n";
        assert!(check_balance(text, &PYTHON_SYNTAX).is_empty());
    }

    #[test]
    fn test_unclosed_bracket() {
        let text = "setup(name='a',\n      packages=['a'\n)\n";
        let findings = check_balance(text, &PYTHON_SYNTAX);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule, FindingRule::Balance);
        assert_eq!(findings[0].line, Some(3));
    }

    #[test]
    fn test_never_closed() {
        let findings = check_balance("{\"files\": [\"a\"", &JSON_SYNTAX);
        assert_eq!(findings.len(), 2);
        assert!(findings[0].message.contains("'['"));
        assert!(findings[1].message.contains("'{'"));
    }

    #[test]
    fn test_unterminated_string() {
        let findings = check_balance("name = 'abc\n", &PYTHON_SYNTAX);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("never closed"));
    }

    #[test]
    fn test_escaped_quote_stays_inside_string() {
        assert!(check_balance(r"x = ('it\'s')", &PYTHON_SYNTAX).is_empty());
        assert!(check_balance(r#"{"a": "q\"]"}"#, &JSON_SYNTAX).is_empty());
    }

    #[test]
    fn test_triple_quoted_and_empty_strings() {
        assert!(check_balance("x = '''multi\n(line'''\ny = ''\n", &PYTHON_SYNTAX).is_empty());
        assert!(check_balance("a = ''\nb = \"\"\n", &TOML_SYNTAX).is_empty());
    }

    #[test]
    fn test_toml_literal_strings_have_no_escapes() {
        assert!(check_balance(r"path = 'C:\dir\' # x", &TOML_SYNTAX).is_empty());
    }

    #[test]
    fn test_line_of() {
        let text = "a\nb\nc";
        assert_eq!(line_of(text, 0), 1);
        assert_eq!(line_of(text, 2), 2);
        assert_eq!(line_of(text, 4), 3);
    }

    #[test]
    fn test_check_glob() {
        assert!(check_glob("files", "*.pyi").is_none());
        assert!(check_glob("files", "src/**/*.rs").is_none());
        assert!(check_glob("files", "").is_some());
        assert!(check_glob("files", "../secrets/*").is_some());
        assert!(check_glob("files", "a/***").is_some());
    }

    #[test]
    fn test_check_semver() {
        assert!(check_semver("version", "1.2.3").is_none());
        assert!(check_semver("version", "1.2.3-rc.1+build.5").is_none());
        assert!(check_semver("version", "1.2").is_some());
        assert!(check_semver("version", "v1.2.3").is_some());
    }
}
