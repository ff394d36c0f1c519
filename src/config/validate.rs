// src/config/validate.rs

use std::collections::HashSet;
use std::path::{Component, Path};

use globset::{Glob, GlobMatcher};

use crate::config::model::{extension_of, ConfigFile, RawConfigFile};
use crate::errors::{BakerError, Result};

/// Characters that would turn an entry name into a pattern instead of a
/// literal file name.
const GLOB_META: &[char] = &['*', '?', '[', ']', '{', '}', '!'];

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::BakerError;

    fn try_from(mut raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        raw.engine.process_glob = normalize_process_glob(&raw.engine.process_glob);
        let process_matcher = compile_process_glob(&raw.engine.process_glob)?;
        Ok(ConfigFile::new_unchecked(raw, process_matcher))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_directories(cfg)?;
    validate_entry_points(cfg)?;
    validate_server(cfg)?;
    Ok(())
}

fn validate_directories(cfg: &RawConfigFile) -> Result<()> {
    ensure_single_segment("src_dir", &cfg.src_dir)?;
    ensure_single_segment("forms_folder", &cfg.forms_folder)?;
    ensure_relative("out_dir", &cfg.out_dir)?;
    ensure_relative("public_dir", &cfg.public_dir)?;

    if normalized(&cfg.out_dir) == normalized(&cfg.public_dir) {
        return Err(BakerError::ConfigError(format!(
            "out_dir and public_dir must differ (both are '{}')",
            cfg.out_dir
        )));
    }

    for (key, dir) in [("out_dir", &cfg.out_dir), ("public_dir", &cfg.public_dir)] {
        if normalized(dir) == normalized(&cfg.src_dir) {
            return Err(BakerError::ConfigError(format!(
                "{key} must not be the source directory '{}'",
                cfg.src_dir
            )));
        }
    }

    Ok(())
}

fn ensure_single_segment(key: &str, value: &str) -> Result<()> {
    let mut components = Path::new(value)
        .components()
        .filter(|c| !matches!(c, Component::CurDir));

    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !value.contains(GLOB_META) => Ok(()),
        _ => Err(BakerError::ConfigError(format!(
            "{key} must be a single literal folder name (got '{value}')"
        ))),
    }
}

fn ensure_relative(key: &str, value: &str) -> Result<()> {
    let path = Path::new(value);
    let has_normal = path
        .components()
        .any(|c| matches!(c, Component::Normal(_)));

    if value.trim().is_empty() || path.is_absolute() || !has_normal {
        return Err(BakerError::ConfigError(format!(
            "{key} must be a non-empty path relative to the project root (got '{value}')"
        )));
    }
    Ok(())
}

fn normalized(value: &str) -> Vec<String> {
    Path::new(value)
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect()
}

fn validate_entry_points(cfg: &RawConfigFile) -> Result<()> {
    let mut names = HashSet::new();
    let mut extensions = HashSet::new();

    for (kind, name) in cfg.entry_points.iter() {
        let key = kind.config_key();

        if name.trim().is_empty() {
            return Err(BakerError::ConfigError(format!(
                "[entry_points].{key} must not be empty"
            )));
        }
        if name.contains('/') || name.contains('\\') {
            return Err(BakerError::ConfigError(format!(
                "[entry_points].{key} must be a file name, not a path (got '{name}')"
            )));
        }
        if name.contains(GLOB_META) {
            return Err(BakerError::ConfigError(format!(
                "[entry_points].{key} must be a literal file name (got '{name}')"
            )));
        }
        if !names.insert(name) {
            return Err(BakerError::ConfigError(format!(
                "[entry_points].{key} reuses the file name '{name}' of another entry kind"
            )));
        }

        // The extension is how a shared/partial file is mapped back to the
        // entry kind it belongs to.
        let Some(ext) = extension_of(name) else {
            return Err(BakerError::ConfigError(format!(
                "[entry_points].{key} must have a file extension (got '{name}')"
            )));
        };
        if !extensions.insert(ext) {
            return Err(BakerError::ConfigError(format!(
                "[entry_points].{key} shares the extension '.{ext}' with another entry kind"
            )));
        }
    }

    Ok(())
}

fn validate_server(cfg: &RawConfigFile) -> Result<()> {
    if cfg.server.port == 0 {
        return Err(BakerError::ConfigError(
            "[server].port must be >= 1 (got 0)".to_string(),
        ));
    }

    let server = cfg.engine.server.trim();
    if !(server.starts_with("http://") || server.starts_with("https://")) {
        return Err(BakerError::ConfigError(format!(
            "[engine].server must be an http(s) URL (got '{server}')"
        )));
    }

    Ok(())
}

/// Matching runs against project-relative paths without a `./` prefix, so a
/// pattern written as `./src/**/*.bpmn` must lose it as well.
fn normalize_process_glob(pattern: &str) -> String {
    let mut trimmed = pattern;
    while let Some(rest) = trimmed.strip_prefix("./") {
        trimmed = rest.trim_start_matches('/');
    }
    trimmed.to_string()
}

fn compile_process_glob(pattern: &str) -> Result<GlobMatcher> {
    let glob = Glob::new(pattern).map_err(|e| {
        BakerError::ConfigError(format!("[engine].process_glob is invalid: {e}"))
    })?;
    Ok(glob.compile_matcher())
}
