//! CLI command definitions for configtpl
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

pub mod assign;
pub mod files;
pub mod string;

use crate::format::OutputFormat;
use crate::render::engine::UndefinedPolicy;
use clap::{Parser, Subcommand, ValueEnum};
use files::FilesArgs;
use std::path::PathBuf;
use string::StringArgs;

/// Output format selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum FormatArg {
    /// Pretty-printed JSON (default)
    #[default]
    Json,
    /// YAML
    Yaml,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Yaml => OutputFormat::Yaml,
        }
    }
}

/// Render layered configuration templates into a single mapping
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// YAML file with default values (not templated)
    #[arg(long, global = true, value_name = "FILE")]
    pub defaults: Option<PathBuf>,

    /// Inject environment variables named PREFIX__KEY__SUBKEY
    #[arg(short, long, global = true, value_name = "PREFIX")]
    pub env_prefix: Option<String>,

    /// Override a value after everything else (repeatable), e.g. server.port=8080
    #[arg(long = "set", global = true, value_name = "KEY=VALUE")]
    pub overrides: Vec<String>,

    /// Add a rendering-context value (repeatable); not part of the output
    #[arg(long = "ctx", global = true, value_name = "KEY=VALUE")]
    pub ctx: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = FormatArg::Json, global = true)]
    pub format: FormatArg,

    /// Fail on any use of an undefined template variable, including `if` tests
    #[arg(long, global = true, conflicts_with = "lenient")]
    pub strict: bool,

    /// Render undefined template variables as empty strings
    #[arg(long, global = true)]
    pub lenient: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Undefined-variable policy selected by `--strict` / `--lenient`.
    pub fn undefined_policy(&self) -> UndefinedPolicy {
        if self.strict {
            UndefinedPolicy::Strict
        } else if self.lenient {
            UndefinedPolicy::Lenient
        } else {
            UndefinedPolicy::default()
        }
    }
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render template files in order; later files override earlier ones
    Files(FilesArgs),

    /// Render a single template string
    String(StringArgs),
}
