//! Error types for the generation pipeline.

use std::path::PathBuf;

use packgen_dialects::{Dialect, DialectError, ValidationReport};
use packgen_templates::{RenderError, ResolutionError, TemplateError, TemplateId};
use thiserror::Error;

use crate::generator::GenerationState;

/// Result type alias for generation operations.
pub type GenerationResult<T> = Result<T, GenerationError>;

/// Errors that can occur while generating or validating a manifest.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error(transparent)]
    UnknownDialect(#[from] DialectError),

    #[error("Unknown template kind for {dialect}: {kind} (available: {})", .available.join(", "))]
    UnknownTemplateKind {
        dialect: Dialect,
        kind: String,
        available: Vec<String>,
    },

    #[error("Variable resolution failed for {dialect}: {source}")]
    Resolution {
        dialect: Dialect,
        source: ResolutionError,
    },

    #[error("Rendering {template} failed: {source}")]
    Render {
        template: TemplateId,
        source: RenderError,
    },

    #[error("{dialect} manifest failed validation ({} finding(s)):\n{report}", .report.len())]
    Validation {
        dialect: Dialect,
        report: ValidationReport,
    },

    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    #[error("Invalid configuration {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GenerationError {
    /// Pipeline stage the failure happened in.
    pub fn stage(&self) -> GenerationState {
        match self {
            GenerationError::Resolution { .. } => GenerationState::Resolving,
            GenerationError::Render { .. } => GenerationState::Rendering,
            GenerationError::Validation { .. } => GenerationState::Validating,
            _ => GenerationState::Start,
        }
    }

    /// Every variable name or rule the failure is about.
    pub fn offending_names(&self) -> Vec<String> {
        match self {
            GenerationError::Resolution { source, .. } => source
                .issues
                .iter()
                .filter_map(|i| i.variable().map(str::to_string))
                .collect(),
            GenerationError::Render {
                source: RenderError::UnresolvedPlaceholder(names),
                ..
            } => names.clone(),
            GenerationError::Validation { report, .. } => {
                let mut rules: Vec<String> = Vec::new();
                for finding in &report.findings {
                    let rule = finding.rule.as_str().to_string();
                    if !rules.contains(&rule) {
                        rules.push(rule);
                    }
                }
                rules
            }
            GenerationError::UnknownTemplateKind { kind, .. } => vec![kind.clone()],
            GenerationError::UnknownDialect(DialectError::UnknownDialect { name, .. }) => {
                vec![name.clone()]
            }
            _ => Vec::new(),
        }
    }
}
