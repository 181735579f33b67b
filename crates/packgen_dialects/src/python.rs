//! `setup.py` validation.
//!
//! The manifest is parsed with tree-sitter (through ast-grep). After the
//! parse is clean, the keyword arguments of the `setup(...)` call are checked:
//! `name` and `version` are required, `packages` entries and `package_data`
//! keys must be importable module paths, `package_data` values must be globs.

use std::collections::HashSet;
use std::sync::OnceLock;

use ast_grep_core::source::StrDoc;
use ast_grep_core::{AstGrep, Node};
use ast_grep_language::Python;
use regex::Regex;
use tracing::debug;

use crate::dialect::Dialect;
use crate::finding::{FindingRule, ValidationFinding, ValidationReport};
use crate::rules::{check_balance, check_glob, line_of, PYTHON_SYNTAX};
use crate::validator::ManifestValidator;

type PyNode<'r> = Node<'r, StrDoc<Python>>;

/// Reserved words that cannot name a module.
pub const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

fn pep440() -> &'static Regex {
    static PEP440: OnceLock<Regex> = OnceLock::new();
    PEP440.get_or_init(|| {
        Regex::new(
            r"^([1-9][0-9]*!)?(0|[1-9][0-9]*)(\.(0|[1-9][0-9]*))*((a|b|rc)(0|[1-9][0-9]*))?(\.post(0|[1-9][0-9]*))?(\.dev(0|[1-9][0-9]*))?(\+[a-z0-9]+(\.[a-z0-9]+)*)?$",
        )
        .expect("PEP 440 pattern is valid")
    })
}

/// Whether `name` is a single Python identifier that is not a keyword.
pub fn is_module_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let first_ok = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_');
    first_ok
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !PYTHON_KEYWORDS.contains(&name)
}

/// Whether `path` is a dotted module path such as `client.v1`.
pub fn is_module_path(path: &str) -> bool {
    path.split('.').all(is_module_identifier)
}

/// Whether `version` is a canonical PEP 440 public (or local) version.
pub fn is_pep440_version(version: &str) -> bool {
    pep440().is_match(version)
}

/// Validator for `setup.py` manifests.
#[derive(Debug, Clone, Copy, Default)]
pub struct PythonValidator;

impl ManifestValidator for PythonValidator {
    fn dialect(&self) -> Dialect {
        Dialect::Python
    }

    fn validate(&self, text: &str) -> ValidationReport {
        let mut report = ValidationReport::new(Dialect::Python);

        let balance = check_balance(text, &PYTHON_SYNTAX);
        if !balance.is_empty() {
            report.findings.extend(balance);
            return report;
        }

        let grep = AstGrep::new(text, Python);
        let root = grep.root();

        if root.get_ts_node().has_error() {
            for node in root.dfs() {
                let message = if node.is_error() {
                    "invalid Python syntax".to_string()
                } else if node.get_ts_node().is_missing() {
                    format!("invalid Python syntax: missing {}", node.kind())
                } else {
                    continue;
                };
                let mut finding = ValidationFinding::new(FindingRule::Syntax, message)
                    .line(line_of(text, node.range().start));
                let snippet = first_line(&node.text());
                if !snippet.is_empty() {
                    finding = finding.actual(snippet);
                }
                report.add(finding);
            }
            if report.is_valid() {
                report.add(ValidationFinding::new(FindingRule::Syntax, "invalid Python syntax"));
            }
            return report;
        }

        let calls: Vec<PyNode<'_>> = root.dfs().filter(is_setup_call).collect();
        match calls.as_slice() {
            [] => report.add(
                ValidationFinding::new(FindingRule::RequiredField, "no setup(...) call found")
                    .field("setup"),
            ),
            [call] => check_setup_call(text, call, &mut report),
            [_, second, ..] => report.add(
                ValidationFinding::new(FindingRule::Syntax, "more than one setup(...) call")
                    .field("setup")
                    .line(line_of(text, second.range().start)),
            ),
        }

        debug!("setup.py validation found {} issue(s)", report.findings.len());
        report
    }
}

fn is_setup_call(node: &PyNode<'_>) -> bool {
    node.kind() == "call"
        && node.field("function").is_some_and(|f| {
            let callee = f.text();
            callee == "setup" || callee.ends_with(".setup")
        })
}

fn check_setup_call(text: &str, call: &PyNode<'_>, report: &mut ValidationReport) {
    let Some(arguments) = call.field("arguments") else {
        report.add(ValidationFinding::new(
            FindingRule::Syntax,
            "setup call has no argument list",
        ));
        return;
    };

    let mut seen = HashSet::new();
    let mut name = None;
    let mut version = None;

    for kwarg in arguments
        .children()
        .filter(|c| c.kind() == "keyword_argument")
    {
        let (Some(key), Some(value)) = (kwarg.field("name"), kwarg.field("value")) else {
            continue;
        };
        let key = key.text().to_string();
        let line = line_of(text, kwarg.range().start);

        if !seen.insert(key.clone()) {
            report.add(
                ValidationFinding::new(FindingRule::Syntax, "keyword argument repeated")
                    .field(key.as_str())
                    .line(line),
            );
            continue;
        }

        match key.as_str() {
            "name" => name = Some(expect_string(&key, &value, line, report)),
            "version" => version = Some(expect_string(&key, &value, line, report)),
            "packages" => check_packages(&value, line, report),
            "package_data" => check_package_data(text, &value, line, report),
            "description" | "author" | "author_email" | "url" | "license" => {
                expect_string(&key, &value, line, report);
            }
            _ => {}
        }
    }

    match name {
        None => report.add(
            ValidationFinding::new(FindingRule::RequiredField, "setup() has no name")
                .field("name"),
        ),
        Some(Some((value, line))) if !is_module_identifier(&value) => report.add(
            ValidationFinding::new(
                FindingRule::Identifier,
                "distribution name is not a valid Python module name",
            )
            .field("name")
            .expected("letters, digits and underscores, not starting with a digit or a keyword")
            .actual(value)
            .line(line),
        ),
        Some(_) => {}
    }

    match version {
        None => report.add(
            ValidationFinding::new(FindingRule::RequiredField, "setup() has no version")
                .field("version"),
        ),
        Some(Some((value, line))) if !is_pep440_version(&value) => report.add(
            ValidationFinding::new(FindingRule::Version, "not a PEP 440 version")
                .field("version")
                .expected("N(.N)*[{a|b|rc}N][.postN][.devN]")
                .actual(value)
                .line(line),
        ),
        Some(_) => {}
    }
}

/// Read a plain string literal, reporting a finding if it is anything else.
fn expect_string(
    field: &str,
    value: &PyNode<'_>,
    line: usize,
    report: &mut ValidationReport,
) -> Option<(String, usize)> {
    match string_value(value) {
        Some(s) => Some((s, line)),
        None => {
            report.add(
                ValidationFinding::new(FindingRule::FieldType, "expected a plain string literal")
                    .field(field)
                    .actual(value.text().to_string())
                    .line(line),
            );
            None
        }
    }
}

fn check_packages(value: &PyNode<'_>, line: usize, report: &mut ValidationReport) {
    let Some(items) = list_elements(value) else {
        report.add(
            ValidationFinding::new(FindingRule::FieldType, "expected a list of package names")
                .field("packages")
                .actual(value.text().to_string())
                .line(line),
        );
        return;
    };

    for item in items {
        match string_value(&item) {
            Some(pkg) if is_module_path(&pkg) => {}
            Some(pkg) => report.add(
                ValidationFinding::new(FindingRule::Identifier, "not a valid Python package path")
                    .field("packages")
                    .expected("dotted module path")
                    .actual(pkg)
                    .line(line),
            ),
            None => report.add(
                ValidationFinding::new(FindingRule::FieldType, "expected a string literal")
                    .field("packages")
                    .actual(item.text().to_string())
                    .line(line),
            ),
        }
    }
}

fn check_package_data(
    text: &str,
    value: &PyNode<'_>,
    line: usize,
    report: &mut ValidationReport,
) {
    if value.kind() != "dictionary" {
        report.add(
            ValidationFinding::new(FindingRule::FieldType, "expected a dict of file patterns")
                .field("package_data")
                .actual(value.text().to_string())
                .line(line),
        );
        return;
    }

    for pair in value.children().filter(|c| c.kind() == "pair") {
        let (Some(key), Some(patterns)) = (pair.field("key"), pair.field("value")) else {
            continue;
        };
        let pair_line = line_of(text, pair.range().start);

        match string_value(&key) {
            // An empty key applies the patterns to every package.
            Some(pkg) if pkg.is_empty() || is_module_path(&pkg) => {}
            Some(pkg) => report.add(
                ValidationFinding::new(FindingRule::Identifier, "not a valid Python package path")
                    .field("package_data")
                    .expected("dotted module path")
                    .actual(pkg)
                    .line(pair_line),
            ),
            None => report.add(
                ValidationFinding::new(FindingRule::FieldType, "expected a string key")
                    .field("package_data")
                    .actual(key.text().to_string())
                    .line(pair_line),
            ),
        }

        let Some(items) = list_elements(&patterns) else {
            report.add(
                ValidationFinding::new(FindingRule::FieldType, "expected a list of file patterns")
                    .field("package_data")
                    .actual(patterns.text().to_string())
                    .line(pair_line),
            );
            continue;
        };
        for item in items {
            match string_value(&item) {
                Some(pattern) => {
                    if let Some(finding) = check_glob("package_data", &pattern) {
                        report.add(finding.line(pair_line));
                    }
                }
                None => report.add(
                    ValidationFinding::new(FindingRule::FieldType, "expected a string pattern")
                        .field("package_data")
                        .actual(item.text().to_string())
                        .line(pair_line),
                ),
            }
        }
    }
}

/// Elements of a list or tuple literal, without punctuation.
fn list_elements<'r>(node: &PyNode<'r>) -> Option<Vec<PyNode<'r>>> {
    if node.kind() != "list" && node.kind() != "tuple" {
        return None;
    }
    Some(
        node.children()
            .filter(|c| !matches!(&*c.kind(), "[" | "]" | "(" | ")" | "," | "comment"))
            .collect(),
    )
}

fn first_line(text: &str) -> String {
    text.lines().next().unwrap_or_default().to_string()
}

/// Value of a plain (non-f, non-bytes) string literal node.
fn string_value(node: &PyNode<'_>) -> Option<String> {
    if node.kind() != "string" {
        return None;
    }
    parse_string_literal(&node.text())
}

/// Decode a Python string literal, including prefix and quotes.
///
/// Returns `None` for f-strings and bytes literals.
pub fn parse_string_literal(literal: &str) -> Option<String> {
    let quote_at = literal.find(['\'', '"'])?;
    let prefix = literal[..quote_at].to_ascii_lowercase();
    if !prefix.chars().all(|c| matches!(c, 'r' | 'u' | 'b' | 'f')) {
        return None;
    }
    if prefix.contains('f') || prefix.contains('b') {
        return None;
    }
    let raw = prefix.contains('r');

    let body = &literal[quote_at..];
    let quote = &body[..1];
    let triple = quote.repeat(3);
    let inner = if body.len() >= 6 && body.starts_with(&triple) && body.ends_with(&triple) {
        &body[3..body.len() - 3]
    } else if body.len() >= 2 && body.ends_with(quote) {
        &body[1..body.len() - 1]
    } else {
        return None;
    };

    Some(if raw {
        inner.to_string()
    } else {
        unescape(inner)
    })
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\n') => {}
            Some('\\') => out.push('\\'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('a') => out.push('\u{7}'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('v') => out.push('\u{b}'),
            Some(first @ '0'..='7') => {
                let mut code = first.to_digit(8).unwrap_or_default();
                for _ in 0..2 {
                    match chars.peek().and_then(|d| d.to_digit(8)) {
                        Some(digit) => {
                            code = code * 8 + digit;
                            chars.next();
                        }
                        None => break,
                    }
                }
                if let Some(decoded) = char::from_u32(code) {
                    out.push(decoded);
                }
            }
            Some(kind @ ('x' | 'u' | 'U')) => {
                let width = match kind {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let hex: String = (0..width).filter_map(|_| chars.next()).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) if hex.len() == width => out.push(decoded),
                    _ => {
                        out.push('\\');
                        out.push(kind);
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"from distutils.core import setup

setup(name='billing',
      version='1.2.3',
      description='GRPC client for billing',
      author='ci',
      author_email='ci@test.com',
      packages=['billing'],
      package_data={
          'billing': ['*.pyi', 'py.typed'],
      },
      include_package_data=True,
      )
"#;

    fn validate(text: &str) -> ValidationReport {
        PythonValidator.validate(text)
    }

    #[test]
    fn test_valid_setup_py() {
        let report = validate(VALID);
        assert!(report.is_valid(), "{}", report);
    }

    #[test]
    fn test_invalid_name_and_version_reported_together() {
        let text = VALID
            .replace("name='billing'", "name='2fast'")
            .replace("'1.2.3'", "'one.two'");
        let report = validate(&text);
        assert!(report.has_rule(FindingRule::Identifier));
        assert!(report.has_rule(FindingRule::Version));
        assert_eq!(report.by_rule(FindingRule::Version)[0].line, Some(4));
    }

    #[test]
    fn test_keyword_name_rejected() {
        let text = VALID.replace("name='billing'", "name='class'");
        let report = validate(&text);
        assert_eq!(report.by_rule(FindingRule::Identifier).len(), 1);
    }

    #[test]
    fn test_unbalanced_manifest() {
        let text = VALID.replace("'py.typed'],", "'py.typed',");
        let report = validate(&text);
        assert!(report.has_rule(FindingRule::Balance));
    }

    #[test]
    fn test_syntax_error_detected() {
        let report = validate("setup(name='a', version='1.0')\nclass :\n    pass\n");
        assert!(report.has_rule(FindingRule::Syntax));
    }

    #[test]
    fn test_trailing_statement_without_newline_rejected() {
        let report = validate("setup(name='a', version='1.0') setup\n");
        assert!(!report.is_valid());
        assert!(report.has_rule(FindingRule::Syntax));
    }

    #[test]
    fn test_unescape_octal() {
        assert_eq!(unescape(r"a\012b"), "a\nb");
        assert_eq!(unescape(r"\0"), "\0");
        assert_eq!(unescape(r"\01"), "\u{1}");
        assert_eq!(unescape(r"\1019"), "A9");
        assert_eq!(unescape(r"\x41"), "A");
    }

    #[test]
    fn test_missing_setup_call() {
        let report = validate("import os\n");
        assert!(report.has_rule(FindingRule::RequiredField));
    }

    #[test]
    fn test_missing_version() {
        let report = validate("setup(name='a')\n");
        let findings = report.by_rule(FindingRule::RequiredField);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].field.as_deref(), Some("version"));
    }

    #[test]
    fn test_bad_glob_in_package_data() {
        let text = VALID.replace("'*.pyi'", "'../*.pyi'");
        let report = validate(&text);
        assert_eq!(report.by_rule(FindingRule::Glob).len(), 1);
    }

    #[test]
    fn test_non_literal_name() {
        let report = validate("NAME = 'a'\nsetup(name=NAME, version='1.0')\n");
        assert!(report.has_rule(FindingRule::FieldType));
    }

    #[test]
    fn test_repeated_keyword() {
        let report = validate("setup(name='a', version='1.0', name='b')\n");
        assert!(report.has_rule(FindingRule::Syntax));
    }

    #[test]
    fn test_escaped_quote_in_name_is_rejected_not_broken() {
        let text = VALID.replace("name='billing'", r"name='bill\'ing'");
        let report = validate(&text);
        assert!(!report.has_rule(FindingRule::Balance));
        assert!(!report.has_rule(FindingRule::Syntax));
        let identifier = report.by_rule(FindingRule::Identifier);
        assert_eq!(identifier[0].actual.as_deref(), Some("bill'ing"));
    }

    #[test]
    fn test_pep440() {
        for v in ["1", "1.2.3", "2!1.0", "1.0a1", "1.0rc2.post1.dev3", "1.0+local.7"] {
            assert!(is_pep440_version(v), "{}", v);
        }
        for v in ["", "v1.0", "1.0-beta", "01.0", "1..0", "1.0 "] {
            assert!(!is_pep440_version(v), "{:?}", v);
        }
    }

    #[test]
    fn test_module_identifiers() {
        assert!(is_module_identifier("billing_client"));
        assert!(is_module_identifier("_private"));
        assert!(!is_module_identifier("billing-client"));
        assert!(!is_module_identifier("1st"));
        assert!(!is_module_identifier("None"));
        assert!(is_module_path("billing.v1"));
        assert!(!is_module_path("billing..v1"));
    }

    #[test]
    fn test_parse_string_literal() {
        assert_eq!(parse_string_literal("'abc'").as_deref(), Some("abc"));
        assert_eq!(parse_string_literal(r#""a\"b""#).as_deref(), Some("a\"b"));
        assert_eq!(parse_string_literal(r"'it\'s'").as_deref(), Some("it's"));
        assert_eq!(parse_string_literal(r"r'a\n'").as_deref(), Some(r"a\n"));
        assert_eq!(parse_string_literal(r"'\x41\n'").as_deref(), Some("A\n"));
        assert_eq!(parse_string_literal("'''multi'''").as_deref(), Some("multi"));
        assert_eq!(parse_string_literal("''").as_deref(), Some(""));
        assert_eq!(parse_string_literal("f'{x}'"), None);
        assert_eq!(parse_string_literal("b'x'"), None);
    }
}
