//! Templates command - List registered templates.

use anyhow::Result;
use clap::Args;
use packgen_core::TemplateRegistry;
use packgen_dialects::Dialect;
use packgen_templates::{VariableKind, VariableSpec};
use serde::Serialize;

use super::{load_config, load_registry, Cli};

#[derive(Args)]
pub struct TemplatesArgs {
    /// Only list templates of this dialect
    #[arg(short, long)]
    dialect: Option<Dialect>,

    /// Print the listing as JSON
    #[arg(long)]
    json: bool,
}

/// One dialect's templates and variables.
#[derive(Debug, Serialize)]
struct DialectListing<'a> {
    dialect: Dialect,
    default_kind: &'a str,
    variables: &'a [VariableSpec],
    templates: Vec<TemplateListing<'a>>,
}

#[derive(Debug, Serialize)]
struct TemplateListing<'a> {
    kind: &'a str,
    description: Option<&'a str>,
    placeholders: &'a [String],
}

pub fn execute(cli: &Cli, args: &TemplatesArgs) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let registry = load_registry(&config)?;
    let listings = listings(&registry, args.dialect);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&listings)?);
        return Ok(());
    }

    for listing in &listings {
        println!("📦 {} (default: {})", listing.dialect, listing.default_kind);
        println!("   Variables:");
        for var in listing.variables {
            println!("      - {}", describe_variable(var));
        }
        println!("   Templates:");
        for template in &listing.templates {
            match template.description {
                Some(description) => println!("      - {}: {}", template.kind, description),
                None => println!("      - {}", template.kind),
            }
            println!("        uses: {}", template.placeholders.join(", "));
        }
        println!();
    }
    Ok(())
}

fn listings(registry: &TemplateRegistry, only: Option<Dialect>) -> Vec<DialectListing<'_>> {
    registry
        .dialects()
        .filter(|spec| only.map_or(true, |d| d == spec.dialect))
        .map(|spec| DialectListing {
            dialect: spec.dialect,
            default_kind: spec.default_kind,
            variables: &spec.schema.variables,
            templates: registry
                .templates()
                .filter(|t| t.dialect() == spec.dialect.as_str())
                .map(|t| TemplateListing {
                    kind: t.kind(),
                    description: t.description(),
                    placeholders: t.placeholders(),
                })
                .collect(),
        })
        .collect()
}

fn describe_variable(var: &VariableSpec) -> String {
    let mut flags = Vec::new();
    if var.required {
        flags.push("required".to_string());
    }
    if var.kind == VariableKind::List {
        flags.push("list".to_string());
    }
    if let Some(default) = &var.default {
        flags.push(format!("default: {:?}", default));
    }

    let mut line = var.name.clone();
    if !flags.is_empty() {
        line.push_str(&format!(" ({})", flags.join(", ")));
    }
    if !var.description.is_empty() {
        line.push_str(&format!(" - {}", var.description));
    }
    line
}
