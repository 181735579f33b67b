//! packgen CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments, unknown dialect or template kind
//! - 3: Variable resolution failure
//! - 4: Render failure
//! - 5: Validation failure

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use packgen_core::GenerationError;
use packgen_dialects::DialectError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

use commands::{Cli, Commands};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const RESOLUTION_FAILURE: u8 = 3;
    pub const RENDER_FAILURE: u8 = 4;
    pub const VALIDATION_FAILURE: u8 = 5;
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if init_logging(&cli).is_err() {
        // Logging already initialized, continue
    }

    let result = match &cli.command {
        Commands::Generate(args) => commands::generate::execute(&cli, args),
        Commands::Validate(args) => commands::validate::execute(&cli, args),
        Commands::Templates(args) => commands::templates::execute(&cli, args),
        Commands::Check(args) => commands::check::execute(&cli, args),
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("❌ Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

/// Logs go to stderr so stdout can carry a generated manifest.
fn init_logging(cli: &Cli) -> Result<()> {
    let level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };
    let fallback = if cli.quiet { "error" } else { "warn" };
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("packgen={}", level).parse()?)
        .add_directive(fallback.parse()?);

    let registry = tracing_subscriber::registry().with(filter);
    if cli.log_json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()?;
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()?;
    }
    Ok(())
}

/// Map an error to its exit code by looking for a typed cause.
fn categorize_error(e: &anyhow::Error) -> u8 {
    for cause in e.chain() {
        if let Some(err) = cause.downcast_ref::<GenerationError>() {
            return exit_code_for(err);
        }
        if cause.downcast_ref::<DialectError>().is_some() {
            return ExitCodes::INVALID_ARGS;
        }
    }
    ExitCodes::GENERAL_ERROR
}

fn exit_code_for(err: &GenerationError) -> u8 {
    match err {
        GenerationError::UnknownDialect(_) | GenerationError::UnknownTemplateKind { .. } => {
            ExitCodes::INVALID_ARGS
        }
        GenerationError::Resolution { .. } => ExitCodes::RESOLUTION_FAILURE,
        GenerationError::Render { .. } => ExitCodes::RENDER_FAILURE,
        GenerationError::Validation { .. } => ExitCodes::VALIDATION_FAILURE,
        _ => ExitCodes::GENERAL_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use packgen_dialects::{Dialect, ValidationReport};
    use packgen_templates::{RenderError, ResolutionError, ResolutionIssue, TemplateId};

    #[test]
    fn test_exit_codes_by_stage() {
        let resolution = GenerationError::Resolution {
            dialect: Dialect::Python,
            source: ResolutionError::new(vec![ResolutionIssue::MissingVariable("NAME".into())]),
        };
        assert_eq!(exit_code_for(&resolution), ExitCodes::RESOLUTION_FAILURE);

        let render = GenerationError::Render {
            template: TemplateId::new("python", "setup.py"),
            source: RenderError::UnresolvedPlaceholder(vec!["X".into()]),
        };
        assert_eq!(exit_code_for(&render), ExitCodes::RENDER_FAILURE);

        let validation = GenerationError::Validation {
            dialect: Dialect::Npm,
            report: ValidationReport::new(Dialect::Npm),
        };
        assert_eq!(exit_code_for(&validation), ExitCodes::VALIDATION_FAILURE);
    }

    #[test]
    fn test_categorize_sees_through_context() {
        let err = anyhow::Error::from(GenerationError::UnknownTemplateKind {
            dialect: Dialect::Cargo,
            kind: "x".into(),
            available: vec![],
        })
        .context("Failed to generate manifest");
        assert_eq!(categorize_error(&err), ExitCodes::INVALID_ARGS);

        let err: anyhow::Error = Err::<(), _>(std::io::Error::other("disk"))
            .context("write")
            .unwrap_err();
        assert_eq!(categorize_error(&err), ExitCodes::GENERAL_ERROR);
    }
}
