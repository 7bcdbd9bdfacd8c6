//! Configuration builder with layered precedence.
//!
//! Resolves a final mapping from four layers (lowest to highest priority):
//! 1. **Defaults** - Supplied when the builder is constructed (for a template
//!    string they only seed the rendering context)
//! 2. **Templates** - Rendered files in the given order, or a single string
//! 3. **Environment** - Variables named `{PREFIX}__{PATH}`
//! 4. **Overrides** - Supplied per build call
//!
//! ## Context chaining
//! Each file is rendered with the configuration resolved so far merged with the
//! caller's rendering context, so later files can reference values computed by
//! earlier ones. The rendering context itself never reaches the output.

use crate::env::EnvSource;
use crate::error::{Error, Result};
use crate::merge::merge_maps;
use crate::render::Renderer;
use crate::render::engine::{EngineOptions, Registry};
use crate::types::{ConfigMap, Source};
use minijinja::functions::Function;
use minijinja::value::{FunctionArgs, FunctionResult};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Resolution layer priority (lowest to highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Layer {
    /// Builder defaults (lowest priority)
    Defaults = 0,
    /// Rendered templates
    Templates = 1,
    /// Environment variables
    Environment = 2,
    /// Per-call overrides (highest priority)
    Overrides = 3,
}

impl std::fmt::Display for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Layer::Defaults => write!(f, "defaults"),
            Layer::Templates => write!(f, "templates"),
            Layer::Environment => write!(f, "environment"),
            Layer::Overrides => write!(f, "overrides"),
        }
    }
}

/// Builds configuration mappings from templates, environment and overrides.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    defaults: ConfigMap,
    env_prefix: Option<String>,
    env_source: EnvSource,
    renderer: Renderer,
}

impl ConfigBuilder {
    /// Create a builder with no defaults, no environment prefix and the
    /// default engine options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default values that every build starts from.
    pub fn with_defaults(mut self, defaults: ConfigMap) -> Self {
        self.defaults = defaults;
        self
    }

    /// Inject variables named `{prefix}__…` into every build.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Read environment variables from a fixed set instead of the process.
    ///
    /// Applies to environment decoding and to the `env()` template function.
    pub fn with_env_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env_source = EnvSource::fixed(vars);
        self.renderer.set_env_source(self.env_source.clone());
        self
    }

    pub fn with_engine_options(mut self, options: EngineOptions) -> Self {
        self.renderer.set_options(options);
        self
    }

    pub fn with_function<F, Rv, Args>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Function<Rv, Args> + Clone,
        Rv: FunctionResult + 'static,
        Args: for<'a> FunctionArgs<'a> + 'static,
    {
        self.set_function(name, f);
        self
    }

    pub fn with_filter<F, Rv, Args>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Function<Rv, Args> + Clone,
        Rv: FunctionResult + 'static,
        Args: for<'a> FunctionArgs<'a> + 'static,
    {
        self.set_filter(name, f);
        self
    }

    /// Register a global function for future renders. The last registration
    /// for a name wins.
    pub fn set_function<F, Rv, Args>(&mut self, name: impl Into<String>, f: F)
    where
        F: Function<Rv, Args> + Clone,
        Rv: FunctionResult + 'static,
        Args: for<'a> FunctionArgs<'a> + 'static,
    {
        self.renderer.registry_mut().add_function(name, f);
    }

    /// Register a filter for future renders. The last registration for a name
    /// wins.
    pub fn set_filter<F, Rv, Args>(&mut self, name: impl Into<String>, f: F)
    where
        F: Function<Rv, Args> + Clone,
        Rv: FunctionResult + 'static,
        Args: for<'a> FunctionArgs<'a> + 'static,
    {
        self.renderer.registry_mut().add_filter(name, f);
    }

    pub fn defaults(&self) -> &ConfigMap {
        &self.defaults
    }

    pub fn env_prefix(&self) -> Option<&str> {
        self.env_prefix.as_deref()
    }

    pub fn registry(&self) -> &Registry {
        self.renderer.registry()
    }

    /// Drop cached template engines, forcing included templates to be reloaded.
    pub fn clear_cache(&self) {
        self.renderer.clear_cache();
    }

    /// Render template files in order and resolve the final configuration.
    ///
    /// `overrides` are applied last. `ctx` is visible to every template but is
    /// not part of the result.
    pub fn build_from_files<P: AsRef<Path>>(
        &self,
        paths: &[P],
        overrides: Option<ConfigMap>,
        ctx: Option<ConfigMap>,
    ) -> Result<ConfigMap> {
        let ctx = ctx.unwrap_or_default();
        let mut cfg = self.defaults.clone();

        for raw_path in paths {
            let raw_path = raw_path.as_ref();
            let path = std::fs::canonicalize(raw_path)
                .map_err(|err| Error::source_not_found(raw_path, err))?;
            let source = Source::file(path);
            let render_ctx = merge_maps(cfg.clone(), ctx.clone());
            let piece = self.renderer.render(&source, &render_ctx)?;
            debug!(
                source = %source.name(),
                keys = piece.len(),
                layer = %Layer::Templates,
                "Merging rendered file"
            );
            cfg = merge_maps(cfg, piece);
        }

        Ok(self.finalize(cfg, overrides.unwrap_or_default()))
    }

    /// Render a single template string and resolve the final configuration.
    ///
    /// Includes and `file()` calls resolve against `work_dir`, or the current
    /// directory when it is `None`. Defaults are visible to the template but
    /// are not merged into the result.
    pub fn build_from_str(
        &self,
        text: &str,
        work_dir: Option<&Path>,
        overrides: Option<ConfigMap>,
        ctx: Option<ConfigMap>,
    ) -> Result<ConfigMap> {
        let work_dir: PathBuf = match work_dir {
            Some(dir) => dir.to_path_buf(),
            None => std::env::current_dir().map_err(|err| Error::source_not_found(".", err))?,
        };
        let render_ctx = merge_maps(self.defaults.clone(), ctx.unwrap_or_default());
        let source = Source::text(text, work_dir);
        let cfg = self.renderer.render(&source, &render_ctx)?;
        debug!(
            source = %source.name(),
            keys = cfg.len(),
            layer = %Layer::Templates,
            "Rendered template string"
        );
        Ok(self.finalize(cfg, overrides.unwrap_or_default()))
    }

    /// Apply environment variables, then overrides.
    fn finalize(&self, cfg: ConfigMap, overrides: ConfigMap) -> ConfigMap {
        let from_env = self.env_source.decode(self.env_prefix.as_deref());
        debug!(
            keys = from_env.len(),
            layer = %Layer::Environment,
            "Merging environment variables"
        );
        let cfg = merge_maps(cfg, from_env);
        debug!(keys = overrides.len(), layer = %Layer::Overrides, "Merging overrides");
        merge_maps(cfg, overrides)
    }
}

/// Deserialize a resolved mapping into a typed configuration.
pub fn from_config<T: DeserializeOwned>(cfg: ConfigMap) -> Result<T> {
    Ok(serde_json::from_value(serde_json::Value::Object(cfg))?)
}
