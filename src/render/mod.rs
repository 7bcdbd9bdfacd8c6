//! Template rendering into configuration fragments.
//!
//! A source is rendered in two steps:
//! 1. The template is executed by a minijinja engine rooted at the source's
//!    base directory (which governs `include` and `file()` resolution)
//! 2. The output is parsed as YAML into a mapping
//!
//! Blank output renders to an empty mapping, never to null.

pub mod engine;
pub mod helpers;

use crate::env::EnvSource;
use crate::error::{Error, Result};
use crate::types::{ConfigMap, Source, value_kind};
use engine::{EngineOptions, Registry};
use minijinja::Environment;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// Name given to templates rendered from a string.
pub const STRING_TEMPLATE_NAME: &str = "<string>";

/// Renders template sources, caching one engine per base directory.
#[derive(Debug, Default)]
pub struct Renderer {
    options: EngineOptions,
    registry: Registry,
    env_source: EnvSource,
    engines: Mutex<HashMap<PathBuf, Arc<Environment<'static>>>>,
}

impl Clone for Renderer {
    fn clone(&self) -> Self {
        Self::new(
            self.options.clone(),
            self.registry.clone(),
            self.env_source.clone(),
        )
    }
}

impl Renderer {
    pub fn new(options: EngineOptions, registry: Registry, env_source: EnvSource) -> Self {
        Self {
            options,
            registry,
            env_source,
            engines: Mutex::new(HashMap::new()),
        }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Mutable access to the registrations. Cached engines are dropped, so the
    /// change applies to every render from now on.
    pub fn registry_mut(&mut self) -> &mut Registry {
        self.clear_cache();
        &mut self.registry
    }

    pub fn set_options(&mut self, options: EngineOptions) {
        self.options = options;
        self.clear_cache();
    }

    pub fn set_env_source(&mut self, env_source: EnvSource) {
        self.env_source = env_source;
        self.clear_cache();
    }

    /// Drop every cached engine.
    pub fn clear_cache(&self) {
        self.engines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Get the engine for `base_dir`, creating it on first use.
    pub fn engine(&self, base_dir: &Path) -> Arc<Environment<'static>> {
        let mut engines = self.engines.lock().unwrap_or_else(PoisonError::into_inner);
        engines
            .entry(base_dir.to_path_buf())
            .or_insert_with(|| {
                debug!(base_dir = %base_dir.display(), "Creating template engine");
                let mut env = self.options.create_engine(base_dir);
                helpers::install(&mut env, base_dir, &self.env_source);
                self.registry.install(&mut env);
                Arc::new(env)
            })
            .clone()
    }

    /// Render any source descriptor.
    pub fn render(&self, source: &Source, ctx: &ConfigMap) -> Result<ConfigMap> {
        match source {
            Source::File(path) => self.render_file(path, ctx),
            Source::Text { text, work_dir } => self.render_str(text, work_dir, ctx),
        }
    }

    /// Render the template file at `path`. Includes resolve against its parent.
    pub fn render_file(&self, path: &Path, ctx: &ConfigMap) -> Result<ConfigMap> {
        let text =
            std::fs::read_to_string(path).map_err(|err| Error::source_not_found(path, err))?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let template_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        debug!(path = %path.display(), "Rendering config file");
        let rendered = self
            .engine(base_dir)
            .render_named_str(&template_name, &text, ctx)
            .map_err(|err| Error::template(path.display().to_string(), err))?;
        parse_rendered(&path.display().to_string(), &rendered)
    }

    /// Render a template string. Includes resolve against `work_dir`.
    pub fn render_str(&self, text: &str, work_dir: &Path, ctx: &ConfigMap) -> Result<ConfigMap> {
        debug!(work_dir = %work_dir.display(), "Rendering config string");
        let rendered = self
            .engine(work_dir)
            .render_named_str(STRING_TEMPLATE_NAME, text, ctx)
            .map_err(|err| Error::template(STRING_TEMPLATE_NAME, err))?;
        parse_rendered(STRING_TEMPLATE_NAME, &rendered)
    }
}

/// Parse rendered template output into a mapping.
///
/// Merge keys (`<<: *anchor`) are applied. A null document (blank, or only
/// comments) yields an empty mapping.
pub fn parse_rendered(name: &str, text: &str) -> Result<ConfigMap> {
    let parse_error = |source| Error::Parse {
        name: name.to_string(),
        source,
    };
    let mut document: serde_yaml::Value = serde_yaml::from_str(text).map_err(parse_error)?;
    document.apply_merge().map_err(parse_error)?;
    let value = yaml_to_json(document, "")
        .map_err(|msg| parse_error(<serde_yaml::Error as serde::de::Error>::custom(msg)))?;

    match value {
        Value::Null => Ok(ConfigMap::new()),
        Value::Object(map) => Ok(map),
        other => Err(Error::NotAMapping {
            name: name.to_string(),
            kind: value_kind(&other),
        }),
    }
}

/// Convert a YAML value, rejecting what JSON values cannot represent.
///
/// `path` is the dotted location of `value`, used in error messages.
fn yaml_to_json(value: serde_yaml::Value, path: &str) -> std::result::Result<Value, String> {
    use serde_yaml::Value as Yaml;

    let at = |path: &str| if path.is_empty() { "<root>".to_string() } else { path.to_string() };
    Ok(match value {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => {
            if let Some(int) = n.as_i64() {
                Value::from(int)
            } else if let Some(uint) = n.as_u64() {
                Value::from(uint)
            } else {
                match n.as_f64().and_then(serde_json::Number::from_f64) {
                    Some(float) => Value::Number(float),
                    None => return Err(format!("non-finite number {n} at '{}'", at(path))),
                }
            }
        }
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(items) => Value::Array(
            items
                .into_iter()
                .enumerate()
                .map(|(i, item)| yaml_to_json(item, &format!("{path}[{i}]")))
                .collect::<std::result::Result<_, _>>()?,
        ),
        Yaml::Mapping(entries) => {
            let mut map = ConfigMap::new();
            for (key, item) in entries {
                let key = match key {
                    Yaml::String(s) => s,
                    Yaml::Bool(b) => b.to_string(),
                    Yaml::Number(n) => n.to_string(),
                    other => {
                        return Err(format!(
                            "unsupported mapping key {other:?} at '{}'",
                            at(path)
                        ));
                    }
                };
                let child = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                map.insert(key, yaml_to_json(item, &child)?);
            }
            Value::Object(map)
        }
        Yaml::Tagged(tagged) => {
            return Err(format!("unsupported tag {} at '{}'", tagged.tag, at(path)));
        }
    })
}
