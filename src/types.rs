//! Core data types shared by every resolution stage.

use crate::render::STRING_TEMPLATE_NAME;
use serde_json::Value;
use std::path::PathBuf;

/// A configuration mapping: string keys to scalars, sequences or nested mappings.
///
/// Values are `serde_json::Value`, which is the tagged variant
/// (Object | Array | String | Number | Bool | Null) every stage works on.
pub type ConfigMap = serde_json::Map<String, Value>;

/// A template source to render into a configuration fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// A template file. Relative includes resolve against its parent directory.
    File(PathBuf),
    /// A template string with the directory used to resolve its includes.
    Text { text: String, work_dir: PathBuf },
}

impl Source {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Source::File(path.into())
    }

    pub fn text(text: impl Into<String>, work_dir: impl Into<PathBuf>) -> Self {
        Source::Text {
            text: text.into(),
            work_dir: work_dir.into(),
        }
    }

    /// Name used for the source in logs and error messages.
    pub fn name(&self) -> String {
        match self {
            Source::File(path) => path.display().to_string(),
            Source::Text { .. } => STRING_TEMPLATE_NAME.to_string(),
        }
    }
}

/// Human-readable name of a value's variant, for diagnostics.
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}
