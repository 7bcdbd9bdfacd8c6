//! `KEY=VALUE` assignments from the command line.
//!
//! Dotted keys build nested mappings (`server.port=8080` →
//! `{"server": {"port": 8080}}`) and values are coerced like environment
//! variables (`true`, `42`, `'42'` for a literal string, ...).

use crate::env::parse_env_value;
use crate::merge::merge_maps;
use crate::types::ConfigMap;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssignError {
    #[error("expected KEY=VALUE, got '{0}'")]
    MissingEquals(String),
    #[error("empty key segment in '{0}'")]
    EmptyKey(String),
}

/// Parse one assignment into a single-path mapping.
pub fn parse_assignment(raw: &str) -> Result<ConfigMap, AssignError> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| AssignError::MissingEquals(raw.to_string()))?;
    let segments: Vec<&str> = key.trim().split('.').collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(AssignError::EmptyKey(raw.to_string()));
    }

    let mut value = parse_env_value(value);
    for segment in segments.iter().rev() {
        let mut map = ConfigMap::new();
        map.insert(segment.to_string(), value);
        value = Value::Object(map);
    }
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(AssignError::EmptyKey(raw.to_string())),
    }
}

/// Parse assignments in order and deep-merge them; later ones win.
pub fn parse_assignments<S: AsRef<str>>(raw: &[S]) -> Result<ConfigMap, AssignError> {
    raw.iter().try_fold(ConfigMap::new(), |acc, item| {
        Ok(merge_maps(acc, parse_assignment(item.as_ref())?))
    })
}
