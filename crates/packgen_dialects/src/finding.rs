//! Validation findings.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dialect::Dialect;

/// Which rule a finding violates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum FindingRule {
    /// The text does not parse in the dialect's host notation.
    Syntax,
    /// Brackets or string literals are not balanced.
    Balance,
    /// A package/module name does not match the identifier grammar.
    Identifier,
    /// The version does not match the version grammar.
    Version,
    /// A file pattern is not a legal glob.
    Glob,
    /// A mandatory field is absent.
    RequiredField,
    /// A field has the wrong type (e.g. a number where a string is expected).
    FieldType,
}

impl FindingRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingRule::Syntax => "syntax",
            FindingRule::Balance => "balance",
            FindingRule::Identifier => "identifier",
            FindingRule::Version => "version",
            FindingRule::Glob => "glob",
            FindingRule::RequiredField => "required-field",
            FindingRule::FieldType => "field-type",
        }
    }
}

impl fmt::Display for FindingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single structural defect in a rendered manifest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationFinding {
    pub rule: FindingRule,
    /// Manifest field the finding is about, if any.
    pub field: Option<String>,
    pub message: String,
    pub expected: Option<String>,
    pub actual: Option<String>,
    /// 1-based line number, when known.
    pub line: Option<usize>,
}

impl ValidationFinding {
    pub fn new(rule: FindingRule, message: impl Into<String>) -> Self {
        Self {
            rule,
            field: None,
            message: message.into(),
            expected: None,
            actual: None,
            line: None,
        }
    }

    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    pub fn actual(mut self, actual: impl Into<String>) -> Self {
        self.actual = Some(actual.into());
        self
    }

    pub fn line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }
}

impl fmt::Display for ValidationFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.rule)?;
        if let Some(line) = self.line {
            write!(f, " line {}:", line)?;
        }
        if let Some(field) = &self.field {
            write!(f, " {}:", field)?;
        }
        write!(f, " {}", self.message)?;
        match (&self.expected, &self.actual) {
            (Some(expected), Some(actual)) => {
                write!(f, " (expected {}, got {:?})", expected, actual)
            }
            (Some(expected), None) => write!(f, " (expected {})", expected),
            (None, Some(actual)) => write!(f, " (got {:?})", actual),
            (None, None) => Ok(()),
        }
    }
}

/// Outcome of validating one manifest: every finding, never just the first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationReport {
    pub dialect: Dialect,
    pub findings: Vec<ValidationFinding>,
}

impl ValidationReport {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            findings: Vec::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn add(&mut self, finding: ValidationFinding) {
        self.findings.push(finding);
    }

    /// Findings for one rule.
    pub fn by_rule(&self, rule: FindingRule) -> Vec<&ValidationFinding> {
        self.findings.iter().filter(|f| f.rule == rule).collect()
    }

    pub fn has_rule(&self, rule: FindingRule) -> bool {
        self.findings.iter().any(|f| f.rule == rule)
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.findings.is_empty() {
            return write!(f, "{} manifest is valid", self.dialect);
        }
        for (i, finding) in self.findings.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  - {}", finding)?;
        }
        Ok(())
    }
}
