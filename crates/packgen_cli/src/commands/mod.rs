//! CLI command definitions.
//!
//! This module defines the command structure for the packgen CLI and the
//! registry setup every subcommand shares.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use packgen_core::{PackgenConfig, TemplateRegistry};
use tracing::debug;

pub mod check;
pub mod generate;
pub mod templates;
pub mod validate;

/// packgen - package manifest generator
#[derive(Parser)]
#[command(name = "packgen")]
#[command(version, about = "packgen - generate and validate package manifests from templates")]
#[command(long_about = r#"
packgen fills placeholder templates (%NAME%, %VERSION%, ...) with
caller-supplied variables and validates the result before writing it.

DIALECTS:
  python  → setup.py
  npm     → package.json
  cargo   → Cargo.toml

COMMANDS:
  generate   → Render and validate a manifest
  validate   → Validate an existing manifest
  templates  → List registered templates and their variables
  check      → Check templates against their dialect's variables

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments, unknown dialect or template kind
  3 - Variable resolution failure
  4 - Render failure
  5 - Validation failure
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Configuration file (defaults to ./packgen.yaml when present)
    #[arg(short, long, global = true, env = "PACKGEN_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render a manifest from a template and validate it
    Generate(generate::GenerateArgs),

    /// Validate an existing manifest file
    Validate(validate::ValidateArgs),

    /// List registered templates
    Templates(templates::TemplatesArgs),

    /// Run registry consistency checks
    Check(check::CheckArgs),
}

/// Load the configuration named on the command line, or discover one in the
/// current directory.
pub fn load_config(explicit: Option<&Path>) -> Result<PackgenConfig> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => PackgenConfig::discover(&std::env::current_dir()?),
    };
    match path {
        Some(path) => {
            debug!("Using config {:?}", path);
            PackgenConfig::from_file(&path)
                .with_context(|| format!("Failed to load config {}", path.display()))
        }
        None => Ok(PackgenConfig::default()),
    }
}

/// Built-in registry with the configuration applied.
pub fn load_registry(config: &PackgenConfig) -> Result<TemplateRegistry> {
    let mut registry = TemplateRegistry::builtin().context("Failed to load built-in templates")?;
    config
        .apply(&mut registry)
        .context("Failed to apply configuration")?;
    Ok(registry)
}
