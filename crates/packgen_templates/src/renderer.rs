//! Template rendering.

use regex::Captures;
use tracing::debug;

use crate::bindings::BindingSet;
use crate::error::{RenderError, RenderResult};
use crate::placeholder;
use crate::template::Template;
use crate::variables::{list_items, VariableSchema};

/// Escaping rules for values inserted into a manifest dialect.
///
/// Scalar values are escaped in place, so the template itself supplies the
/// surrounding quotes. List items are escaped and quoted individually.
pub trait Escaper: Send + Sync {
    /// Escape `value` for use inside a string literal.
    fn escape(&self, value: &str) -> String;

    /// Render `value` as a complete string literal.
    fn quote(&self, value: &str) -> String;

    /// Separator placed between quoted list items.
    fn list_separator(&self) -> &str {
        ", "
    }
}

/// Escaper that inserts values unchanged. Lists render as double-quoted items.
#[derive(Debug, Clone, Copy, Default)]
pub struct Verbatim;

impl Escaper for Verbatim {
    fn escape(&self, value: &str) -> String {
        value.to_string()
    }

    fn quote(&self, value: &str) -> String {
        format!("\"{}\"", value)
    }
}

/// Template renderer.
///
/// Substitution is a single left-to-right pass: inserted values are never
/// scanned for placeholders again.
pub struct TemplateRenderer<'a> {
    escaper: &'a dyn Escaper,
    schema: Option<&'a VariableSchema>,
}

impl<'a> TemplateRenderer<'a> {
    /// Create a renderer that escapes values with `escaper`.
    pub fn new(escaper: &'a dyn Escaper) -> Self {
        Self {
            escaper,
            schema: None,
        }
    }

    /// Use `schema` to decide which variables render as lists.
    pub fn with_schema(mut self, schema: &'a VariableSchema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Render a template with the given bindings.
    pub fn render(&self, template: &Template, bindings: &BindingSet) -> RenderResult<String> {
        debug!("Rendering template {}", template.id());
        self.render_content(template.body(), bindings)
    }

    /// Render raw template text with the given bindings.
    pub fn render_content(&self, content: &str, bindings: &BindingSet) -> RenderResult<String> {
        let unresolved: Vec<String> = placeholder::names(content)
            .into_iter()
            .filter(|name| !bindings.contains(name))
            .collect();
        if !unresolved.is_empty() {
            return Err(RenderError::UnresolvedPlaceholder(unresolved));
        }

        let rendered = placeholder::pattern().replace_all(content, |caps: &Captures| {
            let name = &caps[1];
            let value = bindings.get(name).unwrap_or_default();
            self.render_value(name, value)
        });

        Ok(rendered.into_owned())
    }

    fn render_value(&self, name: &str, value: &str) -> String {
        if self.schema.is_some_and(|s| s.is_list(name)) {
            list_items(value)
                .map(|item| self.escaper.quote(item))
                .collect::<Vec<_>>()
                .join(self.escaper.list_separator())
        } else {
            self.escaper.escape(value)
        }
    }
}
