//! Template registry.
//!
//! The registry owns every dialect descriptor and every template. It is
//! built once per process, then shared read-only by reference.

use std::collections::BTreeMap;
use std::path::Path;

use packgen_dialects::{Dialect, DialectError, DialectSpec};
use packgen_templates::{
    ExtraVariablePolicy, Template, TemplateError, TemplateId, TemplateLoader, TemplateResult,
    VariableSpec,
};
use tracing::{debug, info, warn};

use crate::error::{GenerationError, GenerationResult};

/// Consistency problems of one registered template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateCheck {
    pub template: TemplateId,
    /// Placeholders the dialect does not declare.
    pub undeclared: Vec<String>,
    /// Required variables the template never references.
    pub unreferenced: Vec<String>,
    /// Optional variables the template never references; values supplied
    /// for them are accepted and then have no effect.
    pub unused: Vec<String>,
}

impl TemplateCheck {
    /// Undeclared placeholders are defects; unreferenced and unused variables are warnings.
    pub fn has_errors(&self) -> bool {
        !self.undeclared.is_empty()
    }
}

/// Registry of dialects and their templates.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    dialects: BTreeMap<Dialect, DialectSpec>,
    templates: BTreeMap<(Dialect, String), Template>,
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRegistry {
    /// Registry with every dialect and no templates.
    pub fn new() -> Self {
        Self {
            dialects: Dialect::all().into_iter().map(|d| (d, d.spec())).collect(),
            templates: BTreeMap::new(),
        }
    }

    /// Registry with every dialect and its built-in templates.
    pub fn builtin() -> TemplateResult<Self> {
        let mut registry = Self::new();
        let templates: Vec<Template> = registry
            .dialects
            .values()
            .flat_map(DialectSpec::templates)
            .collect();
        for template in templates {
            registry.register_template(template)?;
        }
        info!("Loaded {} built-in templates", registry.len());
        Ok(registry)
    }

    /// Register a template, replacing any with the same dialect and kind.
    /// Dialect aliases (`py`, `node`, `rust`) are stored under the canonical
    /// dialect name.
    ///
    /// Fails if the template names an unknown dialect, has an empty kind, or
    /// uses placeholders its dialect does not declare.
    pub fn register_template(&mut self, template: Template) -> TemplateResult<()> {
        let dialect: Dialect =
            template
                .dialect()
                .parse()
                .map_err(|e: DialectError| TemplateError::InvalidTemplate {
                    template: template.id().to_string(),
                    message: e.to_string(),
                })?;

        let template = canonical(template, dialect);

        if template.kind().trim().is_empty() {
            return Err(TemplateError::InvalidTemplate {
                template: template.id().to_string(),
                message: "template kind cannot be empty".to_string(),
            });
        }

        let schema = &self.dialects[&dialect].schema;
        let undeclared = template.undeclared_placeholders(|name| schema.declares(name));
        if !undeclared.is_empty() {
            return Err(TemplateError::UndeclaredPlaceholder {
                template: template.id().to_string(),
                names: undeclared,
            });
        }

        let key = (dialect, template.kind().to_string());
        if self.templates.contains_key(&key) {
            debug!("Replacing template: {}", template.id());
        } else {
            debug!("Registering template: {}", template.id());
        }
        self.templates.insert(key, template);
        Ok(())
    }

    /// Register every template found under `path`.
    pub fn load_overrides(&mut self, path: &Path) -> TemplateResult<usize> {
        let templates = TemplateLoader::new(path).load_all()?;
        let count = templates.len();
        for template in templates {
            self.register_template(template)?;
        }
        info!("Loaded {} template override(s) from {:?}", count, path);
        Ok(count)
    }

    /// Descriptor of a dialect.
    pub fn spec(&self, dialect: Dialect) -> GenerationResult<&DialectSpec> {
        self.dialects
            .get(&dialect)
            .ok_or_else(|| DialectError::unknown(dialect.as_str()).into())
    }

    /// Template for a dialect and kind.
    pub fn template(&self, dialect: Dialect, kind: &str) -> GenerationResult<&Template> {
        self.templates
            .get(&(dialect, kind.to_string()))
            .ok_or_else(|| GenerationError::UnknownTemplateKind {
                dialect,
                kind: kind.to_string(),
                available: self.kinds(dialect).into_iter().map(str::to_string).collect(),
            })
    }

    /// Registered kinds of a dialect, sorted.
    pub fn kinds(&self, dialect: Dialect) -> Vec<&str> {
        self.templates
            .keys()
            .filter(|(d, _)| *d == dialect)
            .map(|(_, kind)| kind.as_str())
            .collect()
    }

    pub fn templates(&self) -> impl Iterator<Item = &Template> {
        self.templates.values()
    }

    pub fn dialects(&self) -> impl Iterator<Item = &DialectSpec> {
        self.dialects.values()
    }

    /// Change how a dialect treats supplied variables it does not declare.
    pub fn set_extra_policy(&mut self, dialect: Dialect, policy: ExtraVariablePolicy) {
        if let Some(spec) = self.dialects.get_mut(&dialect) {
            debug!("Extra variables for {}: {:?}", dialect, policy);
            spec.schema.extra_variables = policy;
        }
    }

    /// Declare an additional variable for a dialect, replacing any existing
    /// declaration with the same name.
    pub fn declare_variable(&mut self, dialect: Dialect, variable: VariableSpec) {
        let Some(spec) = self.dialects.get_mut(&dialect) else {
            return;
        };
        debug!("Declaring variable {} for {}", variable.name, dialect);
        match spec
            .schema
            .variables
            .iter_mut()
            .find(|v| v.name == variable.name)
        {
            Some(existing) => *existing = variable,
            None => spec.schema.variables.push(variable),
        }
    }

    /// Check every template against its dialect's current schema.
    ///
    /// Returns only templates with at least one problem.
    pub fn check(&self) -> Vec<TemplateCheck> {
        let mut checks = Vec::new();
        for ((dialect, _), template) in &self.templates {
            let schema = &self.dialects[dialect].schema;
            let undeclared = template.undeclared_placeholders(|name| schema.declares(name));
            let (unreferenced, unused): (Vec<&VariableSpec>, Vec<&VariableSpec>) = schema
                .variables
                .iter()
                .filter(|v| !template.placeholders().contains(&v.name))
                .partition(|v| v.required);
            let unreferenced: Vec<String> = unreferenced.iter().map(|v| v.name.clone()).collect();
            let unused: Vec<String> = unused.iter().map(|v| v.name.clone()).collect();

            if !unreferenced.is_empty() {
                warn!(
                    "Template {} never references required variable(s): {}",
                    template.id(),
                    unreferenced.join(", ")
                );
            }
            if !unused.is_empty() {
                warn!(
                    "Template {} ignores declared variable(s): {}",
                    template.id(),
                    unused.join(", ")
                );
            }
            if !undeclared.is_empty() || !unreferenced.is_empty() || !unused.is_empty() {
                checks.push(TemplateCheck {
                    template: template.id().clone(),
                    undeclared,
                    unreferenced,
                    unused,
                });
            }
        }
        checks
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

/// `template` keyed under the canonical name of `dialect`.
fn canonical(template: Template, dialect: Dialect) -> Template {
    if template.dialect() == dialect.as_str() {
        return template;
    }
    let renamed = Template::new(dialect.as_str(), template.kind(), template.body());
    match template.description() {
        Some(description) => renamed.with_description(description),
        None => renamed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry() {
        let registry = TemplateRegistry::builtin().unwrap();
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.kinds(Dialect::Python), vec!["setup.py"]);
        assert_eq!(registry.kinds(Dialect::Npm), vec!["package.json"]);
        assert_eq!(registry.kinds(Dialect::Cargo), vec!["Cargo.toml"]);
        assert!(registry.check().is_empty());
    }

    #[test]
    fn test_register_rejects_undeclared_placeholder() {
        let mut registry = TemplateRegistry::new();
        let err = registry
            .register_template(Template::new("python", "bad", "setup(url='%HOMEPAGE%')"))
            .unwrap_err();
        match err {
            TemplateError::UndeclaredPlaceholder { template, names } => {
                assert_eq!(template, "python/bad");
                assert_eq!(names, vec!["HOMEPAGE"]);
            }
            other => panic!("unexpected error: {}", other),
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_rejects_unknown_dialect_and_empty_kind() {
        let mut registry = TemplateRegistry::new();
        assert!(matches!(
            registry.register_template(Template::new("maven", "pom.xml", "")),
            Err(TemplateError::InvalidTemplate { .. })
        ));
        assert!(matches!(
            registry.register_template(Template::new("npm", " ", "")),
            Err(TemplateError::InvalidTemplate { .. })
        ));
    }

    #[test]
    fn test_declared_variable_can_be_used() {
        let mut registry = TemplateRegistry::new();
        registry.declare_variable(Dialect::Python, VariableSpec::new("HOMEPAGE"));
        registry
            .register_template(Template::new(
                "python",
                "web",
                "setup(name='%NAME%', version='%VERSION%', url='%HOMEPAGE%')",
            ))
            .unwrap();
        assert_eq!(registry.kinds(Dialect::Python), vec!["web"]);
    }

    #[test]
    fn test_unknown_kind_lists_available() {
        let registry = TemplateRegistry::builtin().unwrap();
        let err = registry.template(Dialect::Npm, "bower.json").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unknown template kind for npm: bower.json (available: package.json)"
        );
    }

    #[test]
    fn test_check_warns_about_unreferenced_required_variables() {
        let mut registry = TemplateRegistry::new();
        registry
            .register_template(Template::new("cargo", "name-only", "[package]\nname = \"%NAME%\"\n"))
            .unwrap();
        let checks = registry.check();
        assert_eq!(checks.len(), 1);
        assert!(!checks[0].has_errors());
        assert_eq!(checks[0].unreferenced, vec!["VERSION"]);
        assert_eq!(
            checks[0].unused,
            vec!["AUTHOR", "AUTHOR_EMAIL", "DESCRIPTION", "LICENSE", "INCLUDE"]
        );
    }

    #[test]
    fn test_check_reports_declared_variable_a_template_ignores() {
        let mut registry = TemplateRegistry::builtin().unwrap();
        registry.declare_variable(Dialect::Python, VariableSpec::new("HOMEPAGE"));
        let checks = registry.check();
        assert_eq!(checks.len(), 1);
        assert_eq!(checks[0].template.to_string(), "python/setup.py");
        assert!(checks[0].unreferenced.is_empty());
        assert_eq!(checks[0].unused, vec!["HOMEPAGE"]);
    }

    #[test]
    fn test_register_alias_stored_under_canonical_dialect() {
        let mut registry = TemplateRegistry::new();
        registry
            .register_template(
                Template::new("Py", "mini", "setup(name='%NAME%', version='%VERSION%')")
                    .with_description("Minimal"),
            )
            .unwrap();

        let template = registry.template(Dialect::Python, "mini").unwrap();
        assert_eq!(template.dialect(), "python");
        assert_eq!(template.id().to_string(), "python/mini");
        assert_eq!(template.description(), Some("Minimal"));
        assert!(registry.templates().all(|t| t.dialect() == "python"));
    }

    #[test]
    fn test_set_extra_policy() {
        let mut registry = TemplateRegistry::new();
        registry.set_extra_policy(Dialect::Npm, ExtraVariablePolicy::Reject);
        assert_eq!(
            registry.spec(Dialect::Npm).unwrap().schema.extra_variables,
            ExtraVariablePolicy::Reject
        );
        assert_eq!(
            registry.spec(Dialect::Cargo).unwrap().schema.extra_variables,
            ExtraVariablePolicy::Drop
        );
    }
}
