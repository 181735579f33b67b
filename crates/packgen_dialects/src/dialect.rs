//! Dialect identifiers and descriptors.
//!
//! A dialect is one target packaging format. Everything the generic engine
//! needs to know about it lives in a [`DialectSpec`]: the variables its
//! templates may use, how values are escaped, how output is validated, and
//! the templates that ship built in.

use std::fmt;
use std::str::FromStr;

use packgen_templates::{Escaper, ExtraVariablePolicy, Template, VariableSchema, VariableSpec};
use serde::{Deserialize, Serialize};

use crate::cargo::CargoValidator;
use crate::error::DialectError;
use crate::escape::{JsonEscaper, PythonEscaper, TomlEscaper};
use crate::finding::ValidationReport;
use crate::npm::NpmValidator;
use crate::python::PythonValidator;
use crate::validator::ManifestValidator;

/// Supported packaging formats.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Python distribution described by `setup.py`.
    Python,
    /// Node package described by `package.json`.
    Npm,
    /// Rust crate described by `Cargo.toml`.
    Cargo,
}

impl Dialect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Python => "python",
            Dialect::Npm => "npm",
            Dialect::Cargo => "cargo",
        }
    }

    pub fn all() -> Vec<Self> {
        vec![Dialect::Python, Dialect::Npm, Dialect::Cargo]
    }

    /// Build this dialect's descriptor.
    pub fn spec(self) -> DialectSpec {
        match self {
            Dialect::Python => DialectSpec {
                dialect: self,
                default_kind: "setup.py",
                schema: common_schema("GRPC client for %NAME%")
                    .variable(
                        VariableSpec::new("INCLUDE")
                            .list()
                            .with_default("*.pyi, py.typed")
                            .with_description("Package data file patterns"),
                    ),
                builtin_templates: vec![(
                    "setup.py",
                    include_str!("../templates/python/setup.py.tmpl"),
                )],
                escaper: &PythonEscaper,
                validator: &PythonValidator,
            },
            Dialect::Npm => DialectSpec {
                dialect: self,
                default_kind: "package.json",
                schema: common_schema("gRPC client for %NAME%")
                    .variable(license_variable())
                    .variable(
                        VariableSpec::new("INCLUDE")
                            .list()
                            .with_default("*.js, *.d.ts")
                            .with_description("Entries of the files array"),
                    ),
                builtin_templates: vec![(
                    "package.json",
                    include_str!("../templates/npm/package.json.tmpl"),
                )],
                escaper: &JsonEscaper,
                validator: &NpmValidator,
            },
            Dialect::Cargo => DialectSpec {
                dialect: self,
                default_kind: "Cargo.toml",
                schema: common_schema("gRPC client for %NAME%")
                    .variable(license_variable())
                    .variable(
                        VariableSpec::new("INCLUDE")
                            .list()
                            .with_default("src/**/*.rs, Cargo.toml")
                            .with_description("Entries of package.include"),
                    ),
                builtin_templates: vec![(
                    "Cargo.toml",
                    include_str!("../templates/cargo/Cargo.toml.tmpl"),
                )],
                escaper: &TomlEscaper,
                validator: &CargoValidator,
            },
        }
    }
}

/// Variables every dialect declares. `description` is the summary default
/// and may reference `%NAME%`.
fn common_schema(description: &str) -> VariableSchema {
    VariableSchema::new()
        .variable(VariableSpec::required("NAME").with_description("Distribution/package name"))
        .variable(VariableSpec::required("VERSION").with_description("Release version"))
        .variable(
            VariableSpec::new("AUTHOR")
                .with_default("ci")
                .with_description("Author name"),
        )
        .variable(
            VariableSpec::new("AUTHOR_EMAIL")
                .with_default("ci@test.com")
                .with_description("Author contact address"),
        )
        .variable(
            VariableSpec::new("DESCRIPTION")
                .with_default(description)
                .with_description("One-line summary"),
        )
        .extra_variables(ExtraVariablePolicy::Drop)
}

fn license_variable() -> VariableSpec {
    VariableSpec::new("LICENSE")
        .with_default("MIT")
        .mark_non_empty()
        .with_description("SPDX license expression")
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = DialectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "python" | "py" => Ok(Dialect::Python),
            "npm" | "node" => Ok(Dialect::Npm),
            "cargo" | "rust" => Ok(Dialect::Cargo),
            _ => Err(DialectError::unknown(s)),
        }
    }
}

/// Everything the engine needs to know about one dialect.
#[derive(Clone)]
pub struct DialectSpec {
    pub dialect: Dialect,
    /// Template kind used when the caller does not name one.
    pub default_kind: &'static str,
    pub schema: VariableSchema,
    /// `(kind, body)` pairs compiled into the binary.
    pub builtin_templates: Vec<(&'static str, &'static str)>,
    escaper: &'static dyn Escaper,
    validator: &'static dyn ManifestValidator,
}

impl DialectSpec {
    pub fn escaper(&self) -> &'static dyn Escaper {
        self.escaper
    }

    pub fn validator(&self) -> &'static dyn ManifestValidator {
        self.validator
    }

    /// Validate rendered text against this dialect's rules.
    pub fn validate(&self, text: &str) -> ValidationReport {
        self.validator.validate(text)
    }

    /// Built-in templates as [`Template`] values.
    pub fn templates(&self) -> Vec<Template> {
        self.builtin_templates
            .iter()
            .map(|(kind, body)| {
                Template::new(self.dialect.as_str(), *kind, *body)
                    .with_description(format!("Built-in {} {}", self.dialect, kind))
            })
            .collect()
    }
}

impl fmt::Debug for DialectSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialectSpec")
            .field("dialect", &self.dialect)
            .field("default_kind", &self.default_kind)
            .field("schema", &self.schema)
            .field(
                "builtin_templates",
                &self
                    .builtin_templates
                    .iter()
                    .map(|(kind, _)| *kind)
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
