//! Output formatting for resolved configurations.

use crate::types::ConfigMap;
use anyhow::Result;

/// Output format for a resolved configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
}

/// Serialize a configuration in the given format, ending with a newline.
pub fn format_config(cfg: &ConfigMap, format: OutputFormat) -> Result<String> {
    let mut out = match format {
        OutputFormat::Json => serde_json::to_string_pretty(cfg)?,
        OutputFormat::Yaml => serde_yaml::to_string(cfg)?,
    };
    if !out.ends_with('\n') {
        out.push('\n');
    }
    Ok(out)
}
