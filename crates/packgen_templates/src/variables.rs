//! Variable declarations.
//!
//! Each dialect declares the variables its templates may reference through a
//! [`VariableSchema`]. The schema drives both resolution and rendering.

use serde::{Deserialize, Serialize};

/// Separator between items of a list variable.
pub const LIST_SEPARATOR: char = ',';

/// How a variable's value is rendered.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum VariableKind {
    /// Rendered as a single escaped string.
    #[default]
    Scalar,
    /// Comma-separated items, rendered as quoted list elements.
    List,
}

/// What to do with supplied variables the schema does not declare.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExtraVariablePolicy {
    /// Silently drop them from the resolved set.
    #[default]
    Drop,
    /// Keep them in the resolved set.
    Retain,
    /// Report each one as an error.
    Reject,
}

/// Declaration of a single template variable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VariableSpec {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub non_empty: bool,
    #[serde(default)]
    pub kind: VariableKind,
    #[serde(default)]
    pub default: Option<String>,
}

impl VariableSpec {
    /// An optional scalar variable.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            required: false,
            non_empty: false,
            kind: VariableKind::Scalar,
            default: None,
        }
    }

    /// A required, non-empty scalar variable.
    pub fn required(name: impl Into<String>) -> Self {
        Self::new(name).mark_required().mark_non_empty()
    }

    pub fn mark_required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn mark_non_empty(mut self) -> Self {
        self.non_empty = true;
        self
    }

    pub fn list(mut self) -> Self {
        self.kind = VariableKind::List;
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    pub fn is_list(&self) -> bool {
        self.kind == VariableKind::List
    }

    /// Whether `value` counts as empty for this variable.
    pub fn is_empty_value(&self, value: &str) -> bool {
        match self.kind {
            VariableKind::Scalar => value.trim().is_empty(),
            VariableKind::List => list_items(value).next().is_none(),
        }
    }
}

/// Split a list variable's value into trimmed, non-empty items.
pub fn list_items(value: &str) -> impl Iterator<Item = &str> {
    value
        .split(LIST_SEPARATOR)
        .map(str::trim)
        .filter(|item| !item.is_empty())
}

/// The full set of variables a dialect declares.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VariableSchema {
    pub variables: Vec<VariableSpec>,
    #[serde(default)]
    pub extra_variables: ExtraVariablePolicy,
}

impl VariableSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn variable(mut self, spec: VariableSpec) -> Self {
        self.variables.push(spec);
        self
    }

    pub fn extra_variables(mut self, policy: ExtraVariablePolicy) -> Self {
        self.extra_variables = policy;
        self
    }

    pub fn get(&self, name: &str) -> Option<&VariableSpec> {
        self.variables.iter().find(|v| v.name == name)
    }

    pub fn declares(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Names of all declared variables, in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(|v| v.name.as_str())
    }

    /// Declared variables that must be supplied by the caller.
    pub fn required_variables(&self) -> Vec<&VariableSpec> {
        self.variables.iter().filter(|v| v.required).collect()
    }

    /// Whether `name` is declared as a list variable.
    pub fn is_list(&self, name: &str) -> bool {
        self.get(name).is_some_and(VariableSpec::is_list)
    }
}
