//! # packgen_core
//!
//! Manifest generation pipeline for packgen.
//!
//! A [`TemplateRegistry`] is built once (built-in templates, then any
//! overrides from `packgen.yaml`) and shared by reference. A
//! [`ManifestGenerator`] resolves a caller's bindings, renders the template
//! and validates the result before handing it back.
//!
//! ## Example
//!
//! ```rust
//! use packgen_core::{ManifestGenerator, TemplateRegistry};
//! use packgen_dialects::Dialect;
//! use packgen_templates::{BindingSet, Template};
//!
//! let mut registry = TemplateRegistry::builtin().unwrap();
//! registry
//!     .register_template(Template::new(
//!         "python",
//!         "minimal",
//!         "setup(name='%NAME%', version='%VERSION%')",
//!     ))
//!     .unwrap();
//!
//! let generator = ManifestGenerator::new(&registry);
//! let bindings = BindingSet::new().with("NAME", "foo").with("VERSION", "1.2.3");
//! let manifest = generator.generate(Dialect::Python, "minimal", &bindings).unwrap();
//!
//! assert_eq!(manifest.text, "setup(name='foo', version='1.2.3')");
//! ```

pub mod config;
pub mod error;
pub mod generator;
pub mod manifest;
pub mod registry;

pub use config::{DialectOverrides, PackgenConfig, CONFIG_FILE};
pub use error::{GenerationError, GenerationResult};
pub use generator::{GenerationState, ManifestGenerator};
pub use manifest::RenderedManifest;
pub use registry::{TemplateCheck, TemplateRegistry};
