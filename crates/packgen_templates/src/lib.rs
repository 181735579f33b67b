//! # packgen_templates
//!
//! Placeholder templates for packgen.
//!
//! This crate knows nothing about any particular manifest format. It provides
//! the pieces every dialect shares:
//!
//! - the `%NAME%` placeholder syntax
//! - binding sets and variable schemas
//! - variable resolution (missing, empty and unexpected variables)
//! - single-pass rendering with pluggable value escaping
//! - loading template overrides from disk
//!
//! ## Example
//!
//! ```rust
//! use packgen_templates::{
//!     BindingSet, Template, TemplateRenderer, VariableResolver, VariableSchema, VariableSpec,
//!     Verbatim,
//! };
//!
//! let schema = VariableSchema::new()
//!     .variable(VariableSpec::required("NAME"))
//!     .variable(VariableSpec::required("VERSION"));
//! let template = Template::new("python", "inline", "name='%NAME%', version='%VERSION%'");
//!
//! let supplied = BindingSet::new().with("NAME", "foo").with("VERSION", "1.2.3");
//! let bindings = VariableResolver::new(&schema).resolve(&supplied).unwrap();
//! let text = TemplateRenderer::new(&Verbatim).render(&template, &bindings).unwrap();
//!
//! assert_eq!(text, "name='foo', version='1.2.3'");
//! ```

pub mod bindings;
pub mod error;
pub mod loader;
pub mod placeholder;
pub mod renderer;
pub mod resolver;
pub mod template;
pub mod variables;

pub use bindings::BindingSet;
pub use error::{
    RenderError, RenderResult, ResolutionError, ResolutionIssue, TemplateError, TemplateResult,
};
pub use loader::{TemplateDescriptor, TemplateEntry, TemplateLoader};
pub use renderer::{Escaper, TemplateRenderer, Verbatim};
pub use resolver::VariableResolver;
pub use template::{Template, TemplateId};
pub use variables::{list_items, ExtraVariablePolicy, VariableKind, VariableSchema, VariableSpec};
