//! Manifest generation pipeline.
//!
//! Every call walks the same states:
//!
//! ```text
//! Start -> Resolving -> Rendering -> Validating -> Done
//! ```
//!
//! Any failure ends the call in `Failed`; nothing is retried.

use std::fmt;

use packgen_dialects::{Dialect, ValidationReport};
use packgen_templates::{BindingSet, TemplateRenderer, VariableResolver};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{GenerationError, GenerationResult};
use crate::manifest::RenderedManifest;
use crate::registry::TemplateRegistry;

/// State of a single generation call.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GenerationState {
    Start,
    Resolving,
    Rendering,
    Validating,
    Done,
    Failed,
}

impl GenerationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationState::Start => "start",
            GenerationState::Resolving => "resolving",
            GenerationState::Rendering => "rendering",
            GenerationState::Validating => "validating",
            GenerationState::Done => "done",
            GenerationState::Failed => "failed",
        }
    }
}

impl fmt::Display for GenerationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Turns binding sets into validated manifests.
///
/// Holds only a shared reference to the registry, so one generator (or many)
/// can serve concurrent callers.
#[derive(Debug, Clone, Copy)]
pub struct ManifestGenerator<'r> {
    registry: &'r TemplateRegistry,
}

impl<'r> ManifestGenerator<'r> {
    pub fn new(registry: &'r TemplateRegistry) -> Self {
        Self { registry }
    }

    /// Resolve, render and validate one manifest.
    pub fn generate(
        &self,
        dialect: Dialect,
        kind: &str,
        supplied: &BindingSet,
    ) -> GenerationResult<RenderedManifest> {
        let mut state = GenerationState::Start;
        let result = self.run(dialect, kind, supplied, &mut state);
        if let Err(e) = &result {
            debug!(
                "{}/{}: {} -> {} ({})",
                dialect,
                kind,
                state,
                GenerationState::Failed,
                e
            );
        }
        result
    }

    /// Like [`generate`](Self::generate), with the dialect given by name and
    /// the kind defaulting to the dialect's default kind.
    pub fn generate_named(
        &self,
        dialect: &str,
        kind: Option<&str>,
        supplied: &BindingSet,
    ) -> GenerationResult<RenderedManifest> {
        let dialect: Dialect = dialect.parse()?;
        let kind = match kind {
            Some(kind) => kind,
            None => self.registry.spec(dialect)?.default_kind,
        };
        self.generate(dialect, kind, supplied)
    }

    /// Run only the validation stage over externally produced text.
    pub fn validate_manifest(&self, dialect: Dialect, text: &str) -> GenerationResult<ValidationReport> {
        let report = self.registry.spec(dialect)?.validate(text);
        if report.is_valid() {
            debug!("{} manifest is valid", dialect);
            Ok(report)
        } else {
            info!("{} manifest has {} finding(s)", dialect, report.len());
            Err(GenerationError::Validation { dialect, report })
        }
    }

    fn run(
        &self,
        dialect: Dialect,
        kind: &str,
        supplied: &BindingSet,
        state: &mut GenerationState,
    ) -> GenerationResult<RenderedManifest> {
        let spec = self.registry.spec(dialect)?;
        let template = self.registry.template(dialect, kind)?;
        let id = template.id();

        advance(state, GenerationState::Resolving, id);
        for name in supplied.names() {
            if spec.schema.declares(name) && !template.placeholders().iter().any(|p| p == name) {
                warn!("{} does not use supplied variable {}", id, name);
            }
        }
        let bindings = VariableResolver::new(&spec.schema)
            .resolve(supplied)
            .map_err(|source| GenerationError::Resolution { dialect, source })?;

        advance(state, GenerationState::Rendering, id);
        let text = TemplateRenderer::new(spec.escaper())
            .with_schema(&spec.schema)
            .render(template, &bindings)
            .map_err(|source| GenerationError::Render {
                template: id.clone(),
                source,
            })?;

        advance(state, GenerationState::Validating, id);
        let report = spec.validate(&text);
        if !report.is_valid() {
            return Err(GenerationError::Validation { dialect, report });
        }

        advance(state, GenerationState::Done, id);
        info!("Generated {} ({} bytes)", id, text.len());

        Ok(RenderedManifest {
            dialect,
            kind: template.kind().to_string(),
            text,
            report,
        })
    }
}

fn advance(state: &mut GenerationState, next: GenerationState, id: impl fmt::Display) {
    debug!("{}: {} -> {}", id, state, next);
    *state = next;
}

#[cfg(test)]
mod tests {
    use super::*;
    use packgen_templates::Template;

    fn registry() -> TemplateRegistry {
        let mut registry = TemplateRegistry::builtin().unwrap();
        registry
            .register_template(Template::new(
                "python",
                "minimal",
                "setup(name='%NAME%', version='%VERSION%')",
            ))
            .unwrap();
        registry
    }

    fn bindings() -> BindingSet {
        BindingSet::new().with("NAME", "foo").with("VERSION", "1.2.3")
    }

    #[test]
    fn test_generate_minimal() {
        let registry = registry();
        let manifest = ManifestGenerator::new(&registry)
            .generate(Dialect::Python, "minimal", &bindings())
            .unwrap();
        assert_eq!(manifest.text, "setup(name='foo', version='1.2.3')");
        assert_eq!(manifest.kind, "minimal");
        assert!(manifest.is_valid());
    }

    #[test]
    fn test_generate_named_uses_default_kind() {
        let registry = registry();
        let manifest = ManifestGenerator::new(&registry)
            .generate_named("npm", None, &bindings())
            .unwrap();
        assert_eq!(manifest.kind, "package.json");
        assert_eq!(manifest.dialect, Dialect::Npm);
    }

    #[test]
    fn test_unknown_dialect_and_kind() {
        let registry = registry();
        let generator = ManifestGenerator::new(&registry);

        let err = generator.generate_named("maven", None, &bindings()).unwrap_err();
        assert!(matches!(err, GenerationError::UnknownDialect(_)));
        assert_eq!(err.stage(), GenerationState::Start);
        assert_eq!(err.offending_names(), vec!["maven"]);

        let err = generator
            .generate(Dialect::Cargo, "workspace.toml", &bindings())
            .unwrap_err();
        assert!(matches!(err, GenerationError::UnknownTemplateKind { .. }));
        assert_eq!(err.stage(), GenerationState::Start);
    }

    #[test]
    fn test_resolution_failure_stage() {
        let registry = registry();
        let supplied = BindingSet::new().with("NAME", "");
        let err = ManifestGenerator::new(&registry)
            .generate(Dialect::Python, "minimal", &supplied)
            .unwrap_err();
        assert_eq!(err.stage(), GenerationState::Resolving);
        assert_eq!(err.offending_names(), vec!["NAME", "VERSION"]);
    }

    #[test]
    fn test_validation_failure_stage() {
        let registry = registry();
        let supplied = bindings().with("VERSION", "not-a-version");
        let err = ManifestGenerator::new(&registry)
            .generate(Dialect::Python, "minimal", &supplied)
            .unwrap_err();
        assert_eq!(err.stage(), GenerationState::Validating);
        assert_eq!(err.offending_names(), vec!["version"]);
    }

    #[test]
    fn test_validate_manifest() {
        let registry = registry();
        let generator = ManifestGenerator::new(&registry);
        assert!(generator
            .validate_manifest(Dialect::Python, "setup(name='foo', version='1.0')")
            .is_ok());
        let err = generator
            .validate_manifest(Dialect::Python, "setup(name='foo'")
            .unwrap_err();
        assert_eq!(err.stage(), GenerationState::Validating);
    }
}
