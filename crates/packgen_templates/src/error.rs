//! Error types for templates.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for template operations.
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Errors that can occur while loading or registering templates.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("Invalid template {template}: {message}")]
    InvalidTemplate { template: String, message: String },

    #[error("Template {template} uses undeclared placeholders: {}", .names.join(", "))]
    UndeclaredPlaceholder { template: String, names: Vec<String> },

    #[error("Template directory does not exist: {0}")]
    MissingDirectory(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// A single problem found while resolving variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionIssue {
    /// A required variable was not supplied and has no default.
    MissingVariable(String),
    /// A variable marked non-empty was supplied with an empty value.
    EmptyValue(String),
    /// A supplied variable is not declared and the policy rejects extras.
    UnexpectedVariable(String),
    /// The schema declares no variables at all.
    NoDeclaredVariables,
}

impl ResolutionIssue {
    /// Name of the variable this issue is about, if any.
    pub fn variable(&self) -> Option<&str> {
        match self {
            ResolutionIssue::MissingVariable(name)
            | ResolutionIssue::EmptyValue(name)
            | ResolutionIssue::UnexpectedVariable(name) => Some(name),
            ResolutionIssue::NoDeclaredVariables => None,
        }
    }
}

impl fmt::Display for ResolutionIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionIssue::MissingVariable(name) => write!(f, "missing variable: {}", name),
            ResolutionIssue::EmptyValue(name) => write!(f, "empty value for variable: {}", name),
            ResolutionIssue::UnexpectedVariable(name) => {
                write!(f, "unexpected variable: {}", name)
            }
            ResolutionIssue::NoDeclaredVariables => write!(f, "no variables declared"),
        }
    }
}

/// Every issue found while resolving a binding set, reported together.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", join_issues(.issues))]
pub struct ResolutionError {
    pub issues: Vec<ResolutionIssue>,
}

impl ResolutionError {
    pub fn new(issues: Vec<ResolutionIssue>) -> Self {
        Self { issues }
    }

    /// Names of required variables that were not supplied.
    pub fn missing(&self) -> Vec<&str> {
        self.issues
            .iter()
            .filter_map(|i| match i {
                ResolutionIssue::MissingVariable(name) => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Names of non-empty variables that were supplied empty.
    pub fn empty(&self) -> Vec<&str> {
        self.issues
            .iter()
            .filter_map(|i| match i {
                ResolutionIssue::EmptyValue(name) => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Names of supplied variables rejected as unexpected.
    pub fn unexpected(&self) -> Vec<&str> {
        self.issues
            .iter()
            .filter_map(|i| match i {
                ResolutionIssue::UnexpectedVariable(name) => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }
}

fn join_issues(issues: &[ResolutionIssue]) -> String {
    issues
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors that can occur during rendering.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// Placeholders in the template with no binding, in order of first use.
    #[error("Unresolved placeholders: {}", .0.join(", "))]
    UnresolvedPlaceholder(Vec<String>),
}

/// Result type alias for rendering.
pub type RenderResult<T> = Result<T, RenderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_error_lists_every_issue() {
        let err = ResolutionError::new(vec![
            ResolutionIssue::MissingVariable("NAME".into()),
            ResolutionIssue::EmptyValue("VERSION".into()),
        ]);
        assert_eq!(
            err.to_string(),
            "missing variable: NAME; empty value for variable: VERSION"
        );
        assert_eq!(err.missing(), vec!["NAME"]);
        assert_eq!(err.empty(), vec!["VERSION"]);
        assert!(err.unexpected().is_empty());
    }

    #[test]
    fn test_unresolved_display() {
        let err = RenderError::UnresolvedPlaceholder(vec!["A".into(), "B".into()]);
        assert_eq!(err.to_string(), "Unresolved placeholders: A, B");
    }
}
