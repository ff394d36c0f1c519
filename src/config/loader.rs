// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{BakerError, Result};

/// Load a configuration file from a given path and return the raw
/// `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and run validation.
///
/// The returned config is anchored at the directory containing the file, so
/// every relative directory in it resolves against that project root.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();
    let raw_config = load_from_path(path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config.with_root(config_root_dir(path)))
}

/// Resolve the configuration for this run.
///
/// - An explicit path that does not exist is a configuration error.
/// - Without an explicit path, `Baker.toml` is used when present; otherwise
///   the project runs on defaults (zero-config) rooted at the current
///   directory.
pub fn resolve_config(explicit: Option<&str>) -> Result<ConfigFile> {
    match explicit {
        Some(path) => {
            let path = PathBuf::from(path);
            if !path.exists() {
                return Err(BakerError::ConfigError(format!(
                    "config file {:?} wasn't found; drop --config to run zero-config",
                    path
                )));
            }
            load_and_validate(&path)
        }
        None => {
            let path = default_config_path();
            if path.exists() {
                load_and_validate(&path)
            } else {
                debug!("no {:?} found; using default configuration", path);
                let config = ConfigFile::try_from(RawConfigFile::default())?;
                Ok(config.with_root(current_dir()))
            }
        }
    }
}

/// Default config file name, looked up in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Baker.toml")
}

/// Figure out the project root from the config path.
///
/// - If the config path has a non-empty parent (e.g. "app/Baker.toml"), we
///   use that directory.
/// - If it's just a bare filename like "Baker.toml" (parent = ""), we fall
///   back to the current working directory.
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => current_dir(),
    }
}

fn current_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|err| {
        warn!(error = %err, "cannot read current directory; using '.'");
        PathBuf::from(".")
    })
}
