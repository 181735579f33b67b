//! Validate command - Validate an existing manifest.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use packgen_core::{GenerationError, ManifestGenerator, TemplateRegistry};
use packgen_dialects::Dialect;
use tracing::info;

use super::{load_config, load_registry, Cli};

#[derive(Args)]
pub struct ValidateArgs {
    /// Manifest dialect; inferred from the file name when omitted
    #[arg(short, long)]
    dialect: Option<Dialect>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Manifest file to validate
    file: PathBuf,
}

pub fn execute(cli: &Cli, args: &ValidateArgs) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let registry = load_registry(&config)?;

    let dialect = match args.dialect {
        Some(dialect) => dialect,
        None => infer_dialect(&registry, &args.file).with_context(|| {
            format!(
                "Cannot infer the dialect of {}; pass --dialect",
                args.file.display()
            )
        })?,
    };
    info!("Validating {} as {}", args.file.display(), dialect);

    let text = fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    let report = match ManifestGenerator::new(&registry).validate_manifest(dialect, &text) {
        Ok(report) => report,
        Err(GenerationError::Validation { report, .. }) => report,
        Err(e) => return Err(e.into()),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if report.is_valid() && !cli.quiet {
        println!("✅ {} is a valid {} manifest", args.file.display(), dialect);
    }

    if report.is_valid() {
        Ok(())
    } else {
        Err(GenerationError::Validation { dialect, report }.into())
    }
}

/// Dialect whose standard manifest has this file's name.
fn infer_dialect(registry: &TemplateRegistry, file: &Path) -> Option<Dialect> {
    let name = file.file_name()?.to_str()?;
    registry
        .dialects()
        .find(|spec| spec.default_kind == name)
        .map(|spec| spec.dialect)
}
