//! Generated manifests.

use packgen_dialects::{Dialect, ValidationReport};
use serde::Serialize;

/// A manifest produced by the generator.
///
/// Only ever returned after validation, so `report` is clean.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RenderedManifest {
    pub dialect: Dialect,
    pub kind: String,
    pub text: String,
    pub report: ValidationReport,
}

impl RenderedManifest {
    pub fn is_valid(&self) -> bool {
        self.report.is_valid()
    }

    /// File name the manifest is conventionally written to.
    pub fn file_name(&self) -> &str {
        &self.kind
    }
}
