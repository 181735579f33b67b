//! `Cargo.toml` validation.

use toml::{Table, Value};

use crate::dialect::Dialect;
use crate::finding::{FindingRule, ValidationFinding, ValidationReport};
use crate::rules::{check_balance, check_glob, check_semver, line_of, TOML_SYNTAX};
use crate::validator::ManifestValidator;

/// Longest crate name crates.io accepts.
pub const MAX_NAME_LENGTH: usize = 64;

const RUST_KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "crate",
    "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "if", "impl", "in",
    "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "self", "Self", "static", "struct", "super", "trait", "true", "try", "type",
    "typeof", "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

/// Names cargo reserves for the toolchain's own crates.
const RESERVED_NAMES: &[&str] = &["std", "core", "alloc", "test", "proc_macro", "proc-macro"];

const WINDOWS_RESERVED: &[&str] = &[
    "con", "prn", "aux", "nul", "com1", "com2", "com3", "com4", "com5", "com6", "com7", "com8",
    "com9", "lpt1", "lpt2", "lpt3", "lpt4", "lpt5", "lpt6", "lpt7", "lpt8", "lpt9",
];

/// Problems with a crate name; empty when the name is valid.
pub fn name_problems(name: &str) -> Vec<String> {
    let mut problems = Vec::new();

    let Some(first) = name.chars().next() else {
        problems.push("name cannot be empty".to_string());
        return problems;
    };
    if !first.is_ascii_alphabetic() {
        problems.push("name must start with an ASCII letter".to_string());
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        problems.push("name may only contain letters, digits, '-' and '_'".to_string());
    }
    if name.len() > MAX_NAME_LENGTH {
        problems.push(format!("name is longer than {} characters", MAX_NAME_LENGTH));
    }
    if RUST_KEYWORDS.contains(&name) {
        problems.push(format!("{} is a Rust keyword", name));
    }
    if RESERVED_NAMES.contains(&name) {
        problems.push(format!("{} is reserved for a toolchain crate", name));
    }
    if WINDOWS_RESERVED.contains(&name.to_ascii_lowercase().as_str()) {
        problems.push(format!("{} is a reserved Windows file name", name));
    }

    problems
}

/// Validator for `Cargo.toml` manifests.
#[derive(Debug, Clone, Copy, Default)]
pub struct CargoValidator;

impl ManifestValidator for CargoValidator {
    fn dialect(&self) -> Dialect {
        Dialect::Cargo
    }

    fn validate(&self, text: &str) -> ValidationReport {
        let mut report = ValidationReport::new(Dialect::Cargo);

        let balance = check_balance(text, &TOML_SYNTAX);
        if !balance.is_empty() {
            report.findings.extend(balance);
            return report;
        }

        let manifest: Table = match toml::from_str(text) {
            Ok(table) => table,
            Err(e) => {
                let mut finding = ValidationFinding::new(
                    FindingRule::Syntax,
                    format!("invalid TOML: {}", e.message()),
                );
                if let Some(span) = e.span() {
                    finding = finding.line(line_of(text, span.start));
                }
                report.add(finding);
                return report;
            }
        };

        let package = match manifest.get("package") {
            Some(Value::Table(package)) => package,
            Some(other) => {
                report.add(type_finding("package", "table", other));
                return report;
            }
            None => {
                report.add(
                    ValidationFinding::new(FindingRule::RequiredField, "[package] table is missing")
                        .field("package"),
                );
                return report;
            }
        };

        match package.get("name") {
            None => report.add(
                ValidationFinding::new(FindingRule::RequiredField, "package.name is missing")
                    .field("package.name"),
            ),
            Some(Value::String(name)) => {
                for problem in name_problems(name) {
                    report.add(
                        ValidationFinding::new(FindingRule::Identifier, problem)
                            .field("package.name")
                            .actual(name.as_str()),
                    );
                }
            }
            Some(other) => report.add(type_finding("package.name", "string", other)),
        }

        match package.get("version") {
            None => report.add(
                ValidationFinding::new(FindingRule::RequiredField, "package.version is missing")
                    .field("package.version"),
            ),
            Some(Value::String(version)) => {
                if let Some(finding) = check_semver("package.version", version) {
                    report.add(finding);
                }
            }
            Some(other) => report.add(type_finding("package.version", "string", other)),
        }

        for field in ["include", "exclude"] {
            let key = format!("package.{}", field);
            match package.get(field) {
                None => {}
                Some(Value::Array(patterns)) => {
                    for pattern in patterns {
                        match pattern {
                            Value::String(glob) => {
                                if let Some(finding) = check_glob(&key, glob) {
                                    report.add(finding);
                                }
                            }
                            other => report.add(type_finding(&key, "string", other)),
                        }
                    }
                }
                Some(other) => report.add(type_finding(&key, "array of strings", other)),
            }
        }

        match package.get("authors") {
            None => {}
            Some(Value::Array(authors)) => {
                for author in authors.iter().filter(|a| !a.is_str()) {
                    report.add(type_finding("package.authors", "string", author));
                }
            }
            Some(other) => report.add(type_finding("package.authors", "array of strings", other)),
        }

        for field in ["description", "license", "edition"] {
            match package.get(field) {
                None | Some(Value::String(_)) => {}
                Some(other) => {
                    report.add(type_finding(&format!("package.{}", field), "string", other))
                }
            }
        }

        report
    }
}

fn type_finding(field: &str, expected: &str, actual: &Value) -> ValidationFinding {
    ValidationFinding::new(FindingRule::FieldType, format!("{} has the wrong type", field))
        .field(field)
        .expected(expected)
        .actual(format!("{} {}", actual.type_str(), actual))
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"[package]
name = "billing-client"
version = "0.3.0"
edition = "2021"
description = "gRPC client for billing-client"
authors = ["ci <ci@test.com>"]
license = "MIT"
include = ["src/**/*.rs", "Cargo.toml"]

[lib]
path = "src/lib.rs"
"#;

    #[test]
    fn test_valid_cargo_toml() {
        let report = CargoValidator.validate(VALID);
        assert!(report.is_valid(), "{}", report);
    }

    #[test]
    fn test_name_rules() {
        assert!(name_problems("billing_client").is_empty());
        assert!(name_problems("billing-client2").is_empty());
        assert!(!name_problems("2fast").is_empty());
        assert!(!name_problems("has.dot").is_empty());
        assert!(!name_problems("fn").is_empty());
        assert!(!name_problems("std").is_empty());
        assert!(!name_problems("CON").is_empty());
        assert!(!name_problems(&"a".repeat(65)).is_empty());
        assert!(!name_problems("").is_empty());
    }

    #[test]
    fn test_invalid_fields_all_reported() {
        let text = VALID
            .replace("name = \"billing-client\"", "name = \"9lives\"")
            .replace("0.3.0", "0.3")
            .replace("\"Cargo.toml\"", "\"../outside\"");
        let report = CargoValidator.validate(&text);
        assert!(report.has_rule(FindingRule::Identifier));
        assert!(report.has_rule(FindingRule::Version));
        assert!(report.has_rule(FindingRule::Glob));
    }

    #[test]
    fn test_missing_package_table() {
        let report = CargoValidator.validate("[lib]\npath = \"src/lib.rs\"\n");
        assert!(report.has_rule(FindingRule::RequiredField));
    }

    #[test]
    fn test_missing_name_and_version() {
        let report = CargoValidator.validate("[package]\nedition = \"2021\"\n");
        assert_eq!(report.by_rule(FindingRule::RequiredField).len(), 2);
    }

    #[test]
    fn test_syntax_error_has_line() {
        let report = CargoValidator.validate("[package]\nname = \"a\"\nversion = = \"1.0.0\"\n");
        let syntax = report.by_rule(FindingRule::Syntax);
        assert_eq!(syntax.len(), 1);
        assert_eq!(syntax[0].line, Some(3));
    }

    #[test]
    fn test_unbalanced() {
        let report = CargoValidator.validate("[package\nname = \"a\"\n");
        assert!(report.has_rule(FindingRule::Balance));
    }

    #[test]
    fn test_authors_must_be_strings() {
        let text = VALID.replace("authors = [\"ci <ci@test.com>\"]", "authors = [1]");
        let report = CargoValidator.validate(&text);
        assert_eq!(report.by_rule(FindingRule::FieldType).len(), 1);
    }
}
