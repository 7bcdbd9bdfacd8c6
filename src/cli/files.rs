//! Files subcommand for configtpl CLI
//!
//! Renders one or more template files into a single configuration. Each file
//! sees the values resolved by the files before it.

use clap::Args;
use std::path::PathBuf;

/// Arguments for the files subcommand
#[derive(Args, Debug)]
pub struct FilesArgs {
    /// Template files, lowest priority first
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<PathBuf>,
}
