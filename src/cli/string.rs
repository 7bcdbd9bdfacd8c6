//! String subcommand for configtpl CLI
//!
//! Renders a single template given inline or on stdin.

use clap::Args;
use std::io::Read;
use std::path::PathBuf;

/// Arguments for the string subcommand
#[derive(Args, Debug)]
pub struct StringArgs {
    /// Template text (read from stdin when omitted)
    #[arg(short, long, value_name = "TEXT")]
    pub text: Option<String>,

    /// Directory used to resolve includes and file() calls (default: current directory)
    #[arg(short, long, value_name = "DIR")]
    pub work_dir: Option<PathBuf>,
}

impl StringArgs {
    /// Get the template text, reading stdin if no `--text` was given.
    pub fn read_template(&self) -> std::io::Result<String> {
        match &self.text {
            Some(text) => Ok(text.clone()),
            None => {
                let mut text = String::new();
                std::io::stdin().read_to_string(&mut text)?;
                Ok(text)
            }
        }
    }
}
