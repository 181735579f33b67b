//! # packgen_dialects
//!
//! Manifest dialects for packgen.
//!
//! Each dialect bundles what the generic template engine cannot know on its
//! own:
//!
//! - **python**: `setup.py`, PEP 440 versions, importable module names
//! - **npm**: `package.json`, SemVer versions, npm package-name rules
//! - **cargo**: `Cargo.toml`, SemVer versions, crate-name rules
//!
//! Validators never stop at the first defect; a [`ValidationReport`] lists
//! every finding with its rule, field and line.
//!
//! ## Example
//!
//! ```rust
//! use packgen_dialects::{validate, Dialect, FindingRule};
//!
//! let report = validate(Dialect::Python, "setup(name='foo', version='1.2.3')\n");
//! assert!(report.is_valid());
//!
//! let report = validate(Dialect::Python, "setup(name='foo', version='one')\n");
//! assert!(report.has_rule(FindingRule::Version));
//! ```

pub mod cargo;
pub mod dialect;
pub mod error;
pub mod escape;
pub mod finding;
pub mod npm;
pub mod python;
pub mod rules;
pub mod validator;

pub use cargo::CargoValidator;
pub use dialect::{Dialect, DialectSpec};
pub use error::{DialectError, DialectResult};
pub use escape::{JsonEscaper, PythonEscaper, TomlEscaper};
pub use finding::{FindingRule, ValidationFinding, ValidationReport};
pub use npm::NpmValidator;
pub use python::PythonValidator;
pub use validator::{validate, ManifestValidator};
