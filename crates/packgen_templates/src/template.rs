//! Template definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::placeholder;

/// Identifies a template: the dialect it targets and its kind within it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TemplateId {
    pub dialect: String,
    pub kind: String,
}

impl TemplateId {
    pub fn new(dialect: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            dialect: dialect.into(),
            kind: kind.into(),
        }
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.dialect, self.kind)
    }
}

/// An immutable piece of manifest text containing placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    id: TemplateId,
    body: String,
    description: Option<String>,
    placeholders: Vec<String>,
}

impl Template {
    pub fn new(dialect: impl Into<String>, kind: impl Into<String>, body: impl Into<String>) -> Self {
        let body = body.into();
        let placeholders = placeholder::names(&body);
        Self {
            id: TemplateId::new(dialect, kind),
            body,
            description: None,
            placeholders,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn id(&self) -> &TemplateId {
        &self.id
    }

    pub fn dialect(&self) -> &str {
        &self.id.dialect
    }

    pub fn kind(&self) -> &str {
        &self.id.kind
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Distinct placeholder names used by the template, in order of first use.
    pub fn placeholders(&self) -> &[String] {
        &self.placeholders
    }

    /// Placeholders for which `is_declared` returns false.
    pub fn undeclared_placeholders(&self, is_declared: impl Fn(&str) -> bool) -> Vec<String> {
        self.placeholders
            .iter()
            .filter(|name| !is_declared(name))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_placeholders() {
        let template = Template::new(
            "python",
            "setup.py",
            "setup(name='%NAME%', packages=['%NAME%'], version='%VERSION%')",
        );
        assert_eq!(template.id().to_string(), "python/setup.py");
        assert_eq!(template.placeholders(), &["NAME", "VERSION"]);
    }

    #[test]
    fn test_undeclared_placeholders() {
        let template = Template::new("npm", "package.json", "%NAME% %HOMEPAGE%");
        let undeclared = template.undeclared_placeholders(|n| n == "NAME");
        assert_eq!(undeclared, vec!["HOMEPAGE"]);
    }
}
