//! Check command - Run registry consistency checks.

use anyhow::Result;
use clap::Args;
use tracing::info;

use super::{load_config, load_registry, Cli};

#[derive(Args)]
pub struct CheckArgs {
    /// Treat warnings as errors
    #[arg(long)]
    strict: bool,
}

pub fn execute(cli: &Cli, args: &CheckArgs) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let registry = load_registry(&config)?;

    info!("Checking {} template(s)", registry.len());
    let checks = registry.check();

    let mut errors = 0;
    let mut warnings = 0;
    for check in &checks {
        if !check.undeclared.is_empty() {
            errors += 1;
            println!(
                "❌ {}: undeclared placeholders: {}",
                check.template,
                check.undeclared.join(", ")
            );
        }
        if !check.unreferenced.is_empty() {
            warnings += 1;
            println!(
                "⚠️  {}: never uses required variables: {}",
                check.template,
                check.unreferenced.join(", ")
            );
        }
        if !check.unused.is_empty() {
            warnings += 1;
            println!(
                "⚠️  {}: ignores declared variables: {}",
                check.template,
                check.unused.join(", ")
            );
        }
    }

    if errors > 0 || (args.strict && warnings > 0) {
        anyhow::bail!(
            "Registry check failed: {} error(s), {} warning(s)",
            errors,
            warnings
        );
    }

    if !cli.quiet {
        println!(
            "✅ {} template(s) checked, {} warning(s)",
            registry.len(),
            warnings
        );
    }
    Ok(())
}
