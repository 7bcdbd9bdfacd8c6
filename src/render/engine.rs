//! Templating engine construction: options and caller-registered helpers.

use minijinja::functions::Function;
use minijinja::value::{FunctionArgs, FunctionResult};
use minijinja::{AutoEscape, Environment, UndefinedBehavior, path_loader};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// How templates treat references to undefined variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UndefinedPolicy {
    /// Undefined values render as empty strings.
    Lenient,
    /// Undefined values fail when printed or used, but may be tested in `if`.
    #[default]
    SemiStrict,
    /// Any use of an undefined value fails, including truthiness checks.
    Strict,
}

impl UndefinedPolicy {
    pub(crate) fn behavior(self) -> UndefinedBehavior {
        match self {
            UndefinedPolicy::Lenient => UndefinedBehavior::Lenient,
            UndefinedPolicy::SemiStrict => UndefinedBehavior::SemiStrict,
            UndefinedPolicy::Strict => UndefinedBehavior::Strict,
        }
    }
}

/// Engine constructor arguments.
#[derive(Debug, Clone, Default)]
pub struct EngineOptions {
    pub undefined: UndefinedPolicy,
    /// Remove the first newline after a block tag.
    pub trim_blocks: bool,
    /// Strip leading whitespace from the start of a line to a block tag.
    pub lstrip_blocks: bool,
    /// Keep the trailing newline of a template in its output.
    pub keep_trailing_newline: bool,
}

impl EngineOptions {
    pub fn with_undefined(mut self, undefined: UndefinedPolicy) -> Self {
        self.undefined = undefined;
        self
    }

    pub fn with_trim_blocks(mut self, yes: bool) -> Self {
        self.trim_blocks = yes;
        self
    }

    pub fn with_lstrip_blocks(mut self, yes: bool) -> Self {
        self.lstrip_blocks = yes;
        self
    }

    pub fn with_keep_trailing_newline(mut self, yes: bool) -> Self {
        self.keep_trailing_newline = yes;
        self
    }

    /// Create an engine that loads includes from `base_dir`.
    pub(crate) fn create_engine(&self, base_dir: &Path) -> Environment<'static> {
        let mut env = Environment::new();
        env.set_loader(path_loader(base_dir));
        env.set_undefined_behavior(self.undefined.behavior());
        env.set_trim_blocks(self.trim_blocks);
        env.set_lstrip_blocks(self.lstrip_blocks);
        env.set_keep_trailing_newline(self.keep_trailing_newline);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env
    }
}

type Installer = Arc<dyn Fn(&mut Environment<'static>) + Send + Sync>;

/// Named global functions and filters added by the caller.
///
/// Registering a name that already exists replaces it.
#[derive(Clone, Default)]
pub struct Registry {
    functions: BTreeMap<String, Installer>,
    filters: BTreeMap<String, Installer>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_function<F, Rv, Args>(&mut self, name: impl Into<String>, f: F)
    where
        F: Function<Rv, Args> + Clone,
        Rv: FunctionResult + 'static,
        Args: for<'a> FunctionArgs<'a> + 'static,
    {
        let name = name.into();
        let key = name.clone();
        let installer: Installer = Arc::new(move |env: &mut Environment<'static>| {
            env.add_function(name.clone(), f.clone())
        });
        self.functions.insert(key, installer);
    }

    pub fn add_filter<F, Rv, Args>(&mut self, name: impl Into<String>, f: F)
    where
        F: Function<Rv, Args> + Clone,
        Rv: FunctionResult + 'static,
        Args: for<'a> FunctionArgs<'a> + 'static,
    {
        let name = name.into();
        let key = name.clone();
        let installer: Installer = Arc::new(move |env: &mut Environment<'static>| {
            env.add_filter(name.clone(), f.clone())
        });
        self.filters.insert(key, installer);
    }

    pub fn function_names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    pub fn filter_names(&self) -> impl Iterator<Item = &str> {
        self.filters.keys().map(String::as_str)
    }

    pub(crate) fn install(&self, env: &mut Environment<'static>) {
        for installer in self.functions.values().chain(self.filters.values()) {
            installer(env);
        }
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("functions", &self.functions.keys().collect::<Vec<_>>())
            .field("filters", &self.filters.keys().collect::<Vec<_>>())
            .finish()
    }
}
