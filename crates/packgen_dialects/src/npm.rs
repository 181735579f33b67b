//! `package.json` validation.

use serde_json::Value;

use crate::dialect::Dialect;
use crate::finding::{FindingRule, ValidationFinding, ValidationReport};
use crate::rules::{check_balance, check_glob, check_semver, JSON_SYNTAX};
use crate::validator::ManifestValidator;

/// Longest package name the registry accepts.
pub const MAX_NAME_LENGTH: usize = 214;

/// Names the registry refuses outright.
const BLACKLISTED_NAMES: &[&str] = &["node_modules", "favicon.ico"];

/// Node core modules; a package cannot shadow them.
const CORE_MODULES: &[&str] = &[
    "assert", "buffer", "child_process", "cluster", "console", "constants", "crypto", "dgram",
    "dns", "domain", "events", "fs", "http", "http2", "https", "module", "net", "os", "path",
    "process", "punycode", "querystring", "readline", "repl", "stream", "string_decoder",
    "sys", "timers", "tls", "tty", "url", "util", "v8", "vm", "worker_threads", "zlib",
];

/// Problems with an npm package name; empty when the name is valid.
pub fn name_problems(name: &str) -> Vec<String> {
    let mut problems = Vec::new();

    if name.is_empty() {
        problems.push("name cannot be empty".to_string());
        return problems;
    }
    if name.len() > MAX_NAME_LENGTH {
        problems.push(format!("name is longer than {} characters", MAX_NAME_LENGTH));
    }
    if name.trim() != name {
        problems.push("name cannot have leading or trailing spaces".to_string());
    }
    if name.starts_with('.') || name.starts_with('_') {
        problems.push("name cannot start with a period or underscore".to_string());
    }
    if name.chars().any(|c| c.is_ascii_uppercase()) {
        problems.push("name cannot contain capital letters".to_string());
    }
    if BLACKLISTED_NAMES.contains(&name.to_ascii_lowercase().as_str()) {
        problems.push(format!("{} is not a valid package name", name));
    }
    if CORE_MODULES.contains(&name) {
        problems.push(format!("{} is a core module name", name));
    }

    let segments: Vec<&str> = match name.strip_prefix('@') {
        Some(scoped) => match scoped.split_once('/') {
            Some((scope, pkg)) if !scope.is_empty() && !pkg.is_empty() => vec![scope, pkg],
            _ => {
                problems.push("scoped name must look like @scope/name".to_string());
                return problems;
            }
        },
        None => vec![name],
    };
    if segments
        .iter()
        .any(|s| !s.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_')))
    {
        problems.push("name can only contain URL-friendly characters".to_string());
    }

    problems
}

/// Validator for `package.json` manifests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NpmValidator;

impl ManifestValidator for NpmValidator {
    fn dialect(&self) -> Dialect {
        Dialect::Npm
    }

    fn validate(&self, text: &str) -> ValidationReport {
        let mut report = ValidationReport::new(Dialect::Npm);

        let balance = check_balance(text, &JSON_SYNTAX);
        if !balance.is_empty() {
            report.findings.extend(balance);
            return report;
        }

        let manifest: Value = match serde_json::from_str(text) {
            Ok(value) => value,
            Err(e) => {
                report.add(
                    ValidationFinding::new(FindingRule::Syntax, format!("invalid JSON: {}", e))
                        .line(e.line()),
                );
                return report;
            }
        };

        let Some(object) = manifest.as_object() else {
            report.add(
                ValidationFinding::new(FindingRule::FieldType, "package.json must be an object")
                    .expected("object"),
            );
            return report;
        };

        match object.get("name") {
            None => report.add(
                ValidationFinding::new(FindingRule::RequiredField, "name is missing")
                    .field("name"),
            ),
            Some(Value::String(name)) => {
                for problem in name_problems(name) {
                    report.add(
                        ValidationFinding::new(FindingRule::Identifier, problem)
                            .field("name")
                            .actual(name.as_str()),
                    );
                }
            }
            Some(other) => report.add(type_finding("name", "string", other)),
        }

        match object.get("version") {
            None => report.add(
                ValidationFinding::new(FindingRule::RequiredField, "version is missing")
                    .field("version"),
            ),
            Some(Value::String(version)) => {
                if let Some(finding) = check_semver("version", version) {
                    report.add(finding);
                }
            }
            Some(other) => report.add(type_finding("version", "string", other)),
        }

        match object.get("files") {
            None => {}
            Some(Value::Array(entries)) => {
                for entry in entries {
                    match entry {
                        Value::String(pattern) => {
                            // Leading `!` excludes; the rest must still be a glob.
                            let glob = pattern.strip_prefix('!').unwrap_or(pattern);
                            if let Some(finding) = check_glob("files", glob) {
                                report.add(finding);
                            }
                        }
                        other => report.add(type_finding("files", "string", other)),
                    }
                }
            }
            Some(other) => report.add(type_finding("files", "array of strings", other)),
        }

        for field in ["description", "license", "main", "types"] {
            match object.get(field) {
                None | Some(Value::String(_)) => {}
                Some(other) => report.add(type_finding(field, "string", other)),
            }
        }

        match object.get("author") {
            None | Some(Value::String(_)) | Some(Value::Object(_)) => {}
            Some(other) => report.add(type_finding("author", "string or object", other)),
        }

        report
    }
}

fn type_finding(field: &str, expected: &str, actual: &Value) -> ValidationFinding {
    ValidationFinding::new(FindingRule::FieldType, format!("{} has the wrong type", field))
        .field(field)
        .expected(expected)
        .actual(actual.to_string())
}
