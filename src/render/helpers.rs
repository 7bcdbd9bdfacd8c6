//! Built-in functions and filters available to every template.
//!
//! - `env(name)` returns an environment variable, or `""` when unset
//! - `file(path)` returns a file's contents, relative to the template directory
//! - `md5` and `sha256` filters return lower-case hex digests of a string

use crate::env::EnvSource;
use md5::Md5;
use minijinja::{Environment, Error, ErrorKind};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Names reserved by the built-in helpers.
pub const ENV_FUNCTION: &str = "env";
pub const FILE_FUNCTION: &str = "file";
pub const MD5_FILTER: &str = "md5";
pub const SHA256_FILTER: &str = "sha256";

/// Install the built-in helpers on an engine rooted at `base_dir`.
pub fn install(env: &mut Environment<'static>, base_dir: &Path, env_source: &EnvSource) {
    let env_source = env_source.clone();
    env.add_function(ENV_FUNCTION, move |name: String| {
        env_source.get(&name).unwrap_or_default()
    });

    let base_dir = base_dir.to_path_buf();
    env.add_function(FILE_FUNCTION, move |path: String| read_file(&base_dir, &path));

    env.add_filter(MD5_FILTER, |value: String| md5_hex(&value));
    env.add_filter(SHA256_FILTER, |value: String| sha256_hex(&value));
}

/// Read `path` relative to `base_dir` (absolute paths are used as given).
pub fn read_file(base_dir: &Path, path: &str) -> Result<String, Error> {
    let full_path: PathBuf = base_dir.join(path);
    std::fs::read_to_string(&full_path).map_err(|err| {
        Error::new(
            ErrorKind::InvalidOperation,
            format!("could not read file '{}'", full_path.display()),
        )
        .with_source(err)
    })
}

pub fn md5_hex(value: &str) -> String {
    format!("{:x}", Md5::digest(value.as_bytes()))
}

pub fn sha256_hex(value: &str) -> String {
    format!("{:x}", Sha256::digest(value.as_bytes()))
}
