//! Variable resolution.
//!
//! The resolver checks a caller-supplied [`BindingSet`] against a
//! [`VariableSchema`] and produces the binding set the renderer works from:
//! - required variables must be present (or have a default)
//! - variables marked non-empty must not be blank
//! - undeclared variables are dropped, kept or rejected per the schema policy
//!
//! A default may reference variables declared before it, e.g.
//! `Client for %NAME%`.
//!
//! Every problem is collected before returning so that a caller can fix
//! them all in one pass.

use regex::Captures;
use tracing::debug;

use crate::bindings::BindingSet;
use crate::error::{ResolutionError, ResolutionIssue};
use crate::placeholder;
use crate::variables::{ExtraVariablePolicy, VariableSchema};

/// Resolves supplied bindings against a variable schema.
pub struct VariableResolver<'a> {
    schema: &'a VariableSchema,
}

impl<'a> VariableResolver<'a> {
    pub fn new(schema: &'a VariableSchema) -> Self {
        Self { schema }
    }

    /// Resolve `supplied` into a complete binding set.
    ///
    /// On success the result holds every declared variable. Optional
    /// variables with neither a value nor a default resolve to the empty
    /// string so rendering stays total.
    pub fn resolve(&self, supplied: &BindingSet) -> Result<BindingSet, ResolutionError> {
        if self.schema.variables.is_empty() {
            return Err(ResolutionError::new(vec![
                ResolutionIssue::NoDeclaredVariables,
            ]));
        }

        let mut issues = Vec::new();
        let mut resolved = BindingSet::new();

        for var in &self.schema.variables {
            let value = match (supplied.get(&var.name), &var.default) {
                (Some(value), _) => value.to_string(),
                (None, Some(default)) => expand_default(default, &resolved),
                (None, None) if var.required => {
                    issues.push(ResolutionIssue::MissingVariable(var.name.clone()));
                    continue;
                }
                (None, None) => String::new(),
            };

            if var.non_empty && var.is_empty_value(&value) {
                issues.push(ResolutionIssue::EmptyValue(var.name.clone()));
                continue;
            }

            resolved.insert(var.name.clone(), value);
        }

        for (name, value) in supplied.iter() {
            if self.schema.declares(name) {
                continue;
            }
            match self.schema.extra_variables {
                ExtraVariablePolicy::Drop => {
                    debug!("Dropping undeclared variable: {}", name);
                }
                ExtraVariablePolicy::Retain => {
                    resolved.insert(name, value);
                }
                ExtraVariablePolicy::Reject => {
                    issues.push(ResolutionIssue::UnexpectedVariable(name.to_string()));
                }
            }
        }

        if issues.is_empty() {
            Ok(resolved)
        } else {
            Err(ResolutionError::new(issues))
        }
    }
}

/// Fill `%NAME%` references in a default from variables resolved so far.
/// References to anything not yet resolved become empty; the result is not
/// rescanned.
fn expand_default(default: &str, resolved: &BindingSet) -> String {
    placeholder::pattern()
        .replace_all(default, |caps: &Captures| {
            resolved.get(&caps[1]).unwrap_or_default().to_string()
        })
        .into_owned()
}
