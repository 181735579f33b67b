//! Template loading from disk.
//!
//! Layout of a templates directory:
//!
//! ```text
//! templates/
//!   python/
//!     setup.py.tmpl
//!   npm/
//!     template.yaml        # optional descriptor
//!     package.json.tmpl
//! ```
//!
//! Without a descriptor every `*.tmpl` file in a dialect directory is a
//! template whose kind is the file name minus the `.tmpl` suffix.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{TemplateError, TemplateResult};
use crate::template::Template;

/// File extension of template bodies.
pub const TEMPLATE_EXTENSION: &str = "tmpl";

/// Name of the optional per-dialect descriptor.
pub const DESCRIPTOR_FILE: &str = "template.yaml";

/// Per-dialect descriptor listing templates explicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateDescriptor {
    pub templates: Vec<TemplateEntry>,
}

/// A single template in a descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateEntry {
    pub kind: String,
    pub file: PathBuf,
    #[serde(default)]
    pub description: Option<String>,
}

/// Template loader.
pub struct TemplateLoader {
    templates_path: PathBuf,
}

impl TemplateLoader {
    /// Create a new template loader.
    pub fn new(templates_path: impl Into<PathBuf>) -> Self {
        Self {
            templates_path: templates_path.into(),
        }
    }

    pub fn templates_path(&self) -> &Path {
        &self.templates_path
    }

    /// Load every template under the templates directory.
    pub fn load_all(&self) -> TemplateResult<Vec<Template>> {
        if !self.templates_path.is_dir() {
            return Err(TemplateError::MissingDirectory(self.templates_path.clone()));
        }

        let mut templates = Vec::new();

        for entry in WalkDir::new(&self.templates_path)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let Some(dialect) = path.file_name().and_then(|n| n.to_str()) else {
                warn!("Skipping non UTF-8 directory {:?}", path);
                continue;
            };

            let loaded = self.load_dialect(dialect, path)?;
            info!("Loaded {} template(s) for {}", loaded.len(), dialect);
            templates.extend(loaded);
        }

        Ok(templates)
    }

    /// Load the templates in one dialect directory.
    pub fn load_dialect(&self, dialect: &str, path: &Path) -> TemplateResult<Vec<Template>> {
        let descriptor_path = path.join(DESCRIPTOR_FILE);
        if descriptor_path.exists() {
            return self.load_from_descriptor(dialect, path, &descriptor_path);
        }

        let mut templates = Vec::new();
        for entry in WalkDir::new(path)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let file = entry.path();
            if !file.is_file() {
                continue;
            }
            if let Some(kind) = kind_from_file_name(file) {
                templates.push(self.load_template(dialect, &kind, file, None)?);
            }
        }
        Ok(templates)
    }

    fn load_from_descriptor(
        &self,
        dialect: &str,
        dir: &Path,
        descriptor_path: &Path,
    ) -> TemplateResult<Vec<Template>> {
        debug!("Loading descriptor {:?}", descriptor_path);
        let content = fs::read_to_string(descriptor_path)?;
        let descriptor: TemplateDescriptor = serde_yaml::from_str(&content)?;

        descriptor
            .templates
            .into_iter()
            .map(|entry| {
                self.load_template(
                    dialect,
                    &entry.kind,
                    &dir.join(&entry.file),
                    entry.description,
                )
            })
            .collect()
    }

    /// Load a single template body.
    fn load_template(
        &self,
        dialect: &str,
        kind: &str,
        file: &Path,
        description: Option<String>,
    ) -> TemplateResult<Template> {
        if kind.trim().is_empty() {
            return Err(TemplateError::InvalidTemplate {
                template: format!("{}/{}", dialect, kind),
                message: "template kind cannot be empty".to_string(),
            });
        }
        if !file.exists() {
            return Err(TemplateError::NotFound(file.display().to_string()));
        }

        debug!("Loading template {}/{} from {:?}", dialect, kind, file);
        let body = fs::read_to_string(file)?;
        let template = Template::new(dialect, kind, body);
        Ok(match description {
            Some(desc) => template.with_description(desc),
            None => template,
        })
    }
}

/// `setup.py.tmpl` → `setup.py`; `None` for files without the extension.
fn kind_from_file_name(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    let kind = name.strip_suffix(&format!(".{}", TEMPLATE_EXTENSION))?;
    (!kind.is_empty()).then(|| kind.to_string())
}
