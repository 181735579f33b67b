//! `packgen.yaml` configuration.
//!
//! ```yaml
//! templates_dir: templates
//! variables:
//!   AUTHOR: Platform Team
//!   AUTHOR_EMAIL: platform@example.com
//! dialects:
//!   npm:
//!     extra_variables: reject
//!   python:
//!     variables:
//!       - name: HOMEPAGE
//!         default: https://example.com
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use packgen_dialects::Dialect;
use packgen_templates::{BindingSet, ExtraVariablePolicy, VariableSpec};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{GenerationError, GenerationResult};
use crate::registry::TemplateRegistry;

/// Default configuration file name.
pub const CONFIG_FILE: &str = "packgen.yaml";

/// Per-dialect adjustments.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DialectOverrides {
    #[serde(default)]
    pub extra_variables: Option<ExtraVariablePolicy>,
    /// Variables declared in addition to the dialect's own.
    #[serde(default)]
    pub variables: Vec<VariableSpec>,
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PackgenConfig {
    /// Directory of template overrides, relative to the config file.
    #[serde(default)]
    pub templates_dir: Option<PathBuf>,
    /// Bindings applied beneath values given on the command line.
    #[serde(default)]
    pub variables: BindingSet,
    #[serde(default)]
    pub dialects: BTreeMap<Dialect, DialectOverrides>,
}

impl PackgenConfig {
    /// Load a configuration file. A relative `templates_dir` is resolved
    /// against the file's directory.
    pub fn from_file(path: &Path) -> GenerationResult<Self> {
        debug!("Loading config from {:?}", path);
        let content = fs::read_to_string(path).map_err(|e| GenerationError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let mut config = Self::from_yaml(&content).map_err(|e| GenerationError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        if let (Some(dir), Some(base)) = (&config.templates_dir, path.parent()) {
            if dir.is_relative() {
                config.templates_dir = Some(base.join(dir));
            }
        }
        Ok(config)
    }

    pub fn from_yaml(yaml: &str) -> GenerationResult<Self> {
        serde_yaml::from_str(yaml).map_err(GenerationError::from)
    }

    /// `packgen.yaml` in `dir`, if present.
    pub fn discover(dir: &Path) -> Option<PathBuf> {
        let candidate = dir.join(CONFIG_FILE);
        candidate.is_file().then_some(candidate)
    }

    /// Apply dialect overrides, then register template overrides.
    pub fn apply(&self, registry: &mut TemplateRegistry) -> GenerationResult<()> {
        for (dialect, overrides) in &self.dialects {
            if let Some(policy) = overrides.extra_variables {
                registry.set_extra_policy(*dialect, policy);
            }
            for variable in &overrides.variables {
                registry.declare_variable(*dialect, variable.clone());
            }
        }

        if let Some(dir) = &self.templates_dir {
            let count = registry.load_overrides(dir)?;
            info!("Applied {} template override(s)", count);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const CONFIG: &str = r#"
templates_dir: templates
variables:
  AUTHOR: Platform Team
dialects:
  npm:
    extra_variables: reject
  python:
    variables:
      - name: HOMEPAGE
        default: https://example.com
"#;

    #[test]
    fn test_parse_config() {
        let config = PackgenConfig::from_yaml(CONFIG).unwrap();
        assert_eq!(config.templates_dir, Some(PathBuf::from("templates")));
        assert_eq!(config.variables.get("AUTHOR"), Some("Platform Team"));
        assert_eq!(
            config.dialects[&Dialect::Npm].extra_variables,
            Some(ExtraVariablePolicy::Reject)
        );
        assert_eq!(config.dialects[&Dialect::Python].variables[0].name, "HOMEPAGE");
    }

    #[test]
    fn test_empty_config() {
        let config = PackgenConfig::from_yaml("{}").unwrap();
        assert_eq!(config, PackgenConfig::default());
    }

    #[test]
    fn test_from_file_resolves_templates_dir() {
        let temp = tempdir().unwrap();
        let path = temp.path().join(CONFIG_FILE);
        fs::write(&path, CONFIG).unwrap();

        assert_eq!(PackgenConfig::discover(temp.path()), Some(path.clone()));
        let config = PackgenConfig::from_file(&path).unwrap();
        assert_eq!(config.templates_dir, Some(temp.path().join("templates")));
    }

    #[test]
    fn test_invalid_file_names_path() {
        let temp = tempdir().unwrap();
        let path = temp.path().join(CONFIG_FILE);
        fs::write(&path, "variables: [1, 2").unwrap();

        let err = PackgenConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, GenerationError::Config { .. }));
        assert!(err.to_string().contains(CONFIG_FILE));
    }

    #[test]
    fn test_apply_overrides() {
        let temp = tempdir().unwrap();
        let python = temp.path().join("templates").join("python");
        fs::create_dir_all(&python).unwrap();
        fs::write(
            python.join("web.tmpl"),
            "setup(name='%NAME%', version='%VERSION%', url='%HOMEPAGE%')\n",
        )
        .unwrap();
        let path = temp.path().join(CONFIG_FILE);
        fs::write(&path, CONFIG).unwrap();

        let config = PackgenConfig::from_file(&path).unwrap();
        let mut registry = TemplateRegistry::builtin().unwrap();
        config.apply(&mut registry).unwrap();

        assert_eq!(registry.kinds(Dialect::Python), vec!["setup.py", "web"]);
        assert_eq!(
            registry.spec(Dialect::Npm).unwrap().schema.extra_variables,
            ExtraVariablePolicy::Reject
        );
    }
}
