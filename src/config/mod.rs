// src/config/mod.rs

//! Configuration loading and validation for cam-baker.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate entry-point names, directories and the engine section
//!   (`validate.rs`) before any resolution runs.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, resolve_config};
pub use model::{
    ConfigFile, EngineSection, EntryPointNames, EnvSection, RawConfigFile, ServerSection,
    ToolsSection, WatchSection,
};
