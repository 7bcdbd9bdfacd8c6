//! configtpl: layered configuration from templated YAML.
//!
//! A configuration is resolved from defaults, template files (or a single
//! template string), environment variables, and overrides, each deep-merged
//! over the previous one.
//!
//! ```no_run
//! use configtpl::ConfigBuilder;
//!
//! let builder = ConfigBuilder::new()
//!     .with_env_prefix("MY_APP")
//!     .with_filter("str_rev", |s: String| s.chars().rev().collect::<String>());
//! let cfg = builder
//!     .build_from_files(&["base.cfg", "local.cfg"], None, None)
//!     .unwrap();
//! println!("{}", serde_json::Value::Object(cfg));
//! ```

pub mod builder;
pub mod cli;
pub mod env;
pub mod error;
pub mod format;
pub mod logging;
pub mod merge;
pub mod render;
pub mod types;

pub use builder::{ConfigBuilder, Layer, from_config};
pub use env::EnvSource;
pub use error::{Error, ErrorKind, Result};
pub use render::engine::{EngineOptions, UndefinedPolicy};
pub use types::{ConfigMap, Source};
