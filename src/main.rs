//! configtpl command-line tool
//!
//! Renders layered configuration templates and prints the resolved mapping.

use anyhow::{Context, Result};
use clap::Parser;
use configtpl::cli::assign::parse_assignments;
use configtpl::cli::{Cli, Command};
use configtpl::format::format_config;
use configtpl::logging::{self, LogTarget};
use configtpl::render::parse_rendered;
use configtpl::{ConfigBuilder, ConfigMap, EngineOptions};
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Load the `--defaults` file as a plain YAML mapping.
fn load_defaults(path: &Path) -> Result<ConfigMap> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read defaults file {}", path.display()))?;
    Ok(parse_rendered(&path.display().to_string(), &content)?)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(&LogTarget::parse(&cli.log), cli.verbose)?;

    let mut builder = ConfigBuilder::new()
        .with_engine_options(EngineOptions::default().with_undefined(cli.undefined_policy()));
    if let Some(path) = &cli.defaults {
        builder = builder.with_defaults(load_defaults(path)?);
    }
    if let Some(prefix) = &cli.env_prefix {
        builder = builder.with_env_prefix(prefix);
    }

    let overrides = parse_assignments(&cli.overrides).context("invalid --set value")?;
    let ctx = parse_assignments(&cli.ctx).context("invalid --ctx value")?;
    debug!(
        overrides = overrides.len(),
        ctx = ctx.len(),
        "Parsed command-line assignments"
    );

    let cfg = match &cli.command {
        Command::Files(args) => builder.build_from_files(&args.paths, Some(overrides), Some(ctx))?,
        Command::String(args) => {
            let text = args.read_template().context("failed to read template from stdin")?;
            builder.build_from_str(&text, args.work_dir.as_deref(), Some(overrides), Some(ctx))?
        }
    };

    let out = format_config(&cfg, cli.format.into())?;
    std::io::stdout().write_all(out.as_bytes())?;
    Ok(())
}
