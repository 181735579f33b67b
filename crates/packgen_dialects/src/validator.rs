//! Manifest validation entry points.

use tracing::{debug, info};

use crate::dialect::Dialect;
use crate::finding::ValidationReport;

/// Structural validator for one dialect's manifests.
///
/// Implementations never stop at the first problem: every finding is
/// collected into the returned report.
pub trait ManifestValidator: Send + Sync {
    fn dialect(&self) -> Dialect;

    fn validate(&self, text: &str) -> ValidationReport;
}

/// Validate `text` as a manifest of the given dialect.
pub fn validate(dialect: Dialect, text: &str) -> ValidationReport {
    debug!("Validating {} manifest ({} bytes)", dialect, text.len());
    let report = dialect.spec().validate(text);
    if report.is_valid() {
        debug!("{} manifest is valid", dialect);
    } else {
        info!(
            "{} manifest has {} finding(s)",
            dialect,
            report.findings.len()
        );
    }
    report
}
