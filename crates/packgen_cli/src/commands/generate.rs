//! Generate command - Render and validate a manifest.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use packgen_core::{ManifestGenerator, RenderedManifest};
use packgen_dialects::Dialect;
use packgen_templates::{placeholder, BindingSet};
use tracing::{debug, info, warn};

use super::{load_config, load_registry, Cli};

/// Prefix of environment variables picked up as bindings.
pub const ENV_PREFIX: &str = "PACKGEN_VAR_";

#[derive(Args)]
pub struct GenerateArgs {
    /// Target dialect (python, npm, cargo)
    #[arg(short, long)]
    dialect: Dialect,

    /// Template kind (defaults to the dialect's standard manifest)
    #[arg(short, long)]
    kind: Option<String>,

    /// Variable binding, repeatable
    #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_binding)]
    vars: Vec<(String, String)>,

    /// YAML file mapping variable names to values
    #[arg(long)]
    vars_file: Option<PathBuf>,

    /// Write the manifest here instead of stdout; a directory gets the
    /// manifest's standard file name
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub fn execute(cli: &Cli, args: &GenerateArgs) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let registry = load_registry(&config)?;

    let mut bindings = config.variables.clone();
    if let Some(path) = &args.vars_file {
        bindings.extend(read_vars_file(path)?);
    }
    bindings.extend(env_bindings(std::env::vars_os()));
    bindings.extend(args.vars.iter().cloned().collect());
    debug!("Supplied variables: {:?}", bindings.names().collect::<Vec<_>>());

    let kind = match &args.kind {
        Some(kind) => kind.as_str(),
        None => registry.spec(args.dialect)?.default_kind,
    };
    info!("Generating {}/{}", args.dialect, kind);

    let manifest = ManifestGenerator::new(&registry).generate(args.dialect, kind, &bindings)?;

    match &args.output {
        Some(path) => {
            let path = write_manifest(&manifest, path)?;
            if !cli.quiet {
                eprintln!("✅ Wrote {} manifest to {}", manifest.dialect, path.display());
            }
        }
        None => print!("{}", manifest.text),
    }
    Ok(())
}

/// Parse a `KEY=VALUE` argument.
pub fn parse_binding(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))?;
    if !placeholder::is_valid_name(key) {
        return Err(format!("invalid variable name '{}'", key));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Bindings from `PACKGEN_VAR_<NAME>` environment variables. Entries that
/// are not valid Unicode are skipped.
pub fn env_bindings(vars: impl IntoIterator<Item = (OsString, OsString)>) -> BindingSet {
    vars.into_iter()
        .filter_map(|(key, value)| {
            let key = key.into_string().ok()?;
            let name = key.strip_prefix(ENV_PREFIX)?;
            if !placeholder::is_valid_name(name) {
                return None;
            }
            match value.into_string() {
                Ok(value) => Some((name.to_string(), value)),
                Err(_) => {
                    warn!("Ignoring {}: value is not valid UTF-8", key);
                    None
                }
            }
        })
        .collect()
}

fn read_vars_file(path: &Path) -> Result<BindingSet> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read vars file {}", path.display()))?;
    serde_yaml::from_str(&content)
        .with_context(|| format!("Invalid vars file {}: expected a map of strings", path.display()))
}

fn write_manifest(manifest: &RenderedManifest, path: &Path) -> Result<PathBuf> {
    let target = if path.is_dir() {
        path.join(manifest.file_name())
    } else {
        path.to_path_buf()
    };
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(&target, &manifest.text)
        .with_context(|| format!("Failed to write {}", target.display()))?;
    Ok(target)
}
