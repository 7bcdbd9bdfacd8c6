//! Error types for configuration builds.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// A file source or a file read by a template does not exist or is unreadable.
    SourceNotFound,
    /// The templating engine failed to render.
    TemplateError,
    /// Rendered text is not a valid YAML mapping.
    ParseError,
    /// A resolved mapping did not fit the requested type.
    DeserializeError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::SourceNotFound => write!(f, "source not found"),
            ErrorKind::TemplateError => write!(f, "template error"),
            ErrorKind::ParseError => write!(f, "parse error"),
            ErrorKind::DeserializeError => write!(f, "deserialize error"),
        }
    }
}

/// Failure of a build. Every variant aborts the build it came from.
#[derive(Debug, Error)]
pub enum Error {
    #[error("config source not found: {}", path.display())]
    SourceNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to render template '{name}': {source}")]
    Template {
        name: String,
        #[source]
        source: minijinja::Error,
    },

    #[error("template '{name}' did not render to valid YAML: {source}")]
    Parse {
        name: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("template '{name}' rendered a {kind}, expected a mapping")]
    NotAMapping { name: String, kind: &'static str },

    #[error("resolved configuration does not match the requested type: {0}")]
    Deserialize(#[from] serde_json::Error),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::SourceNotFound { .. } => ErrorKind::SourceNotFound,
            Error::Template { .. } => ErrorKind::TemplateError,
            Error::Parse { .. } | Error::NotAMapping { .. } => ErrorKind::ParseError,
            Error::Deserialize(_) => ErrorKind::DeserializeError,
        }
    }

    pub(crate) fn source_not_found(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::SourceNotFound {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn template(name: impl Into<String>, source: minijinja::Error) -> Self {
        Error::Template {
            name: name.into(),
            source,
        }
    }
}

/// Result type for configuration builds.
pub type Result<T> = std::result::Result<T, Error>;
