// src/resolve/mod.rs

//! Path-convention driven resolution.
//!
//! - `path`: classify a single path (`classify`).
//! - `bundle`: targets invalidated by one change (`resolve_incremental`).
//! - `plan`: grouped clean-build plan (`resolve_full`).
//! - `deploy`: process definitions to deploy (`resolve_deploy_targets`).
//! - `scan`: the directory walks the resolvers share.

pub mod bundle;
pub mod deploy;
pub mod path;
pub mod plan;
pub mod scan;

pub use bundle::{
    BuildTarget, CoarseInvalidation, InvalidationPolicy, resolve_incremental,
    resolve_incremental_with,
};
pub use deploy::{DeployPlan, DeployTarget, resolve_deploy_targets};
pub use path::{FileContext, MAX_PATH_DEPTH, PathTokens, classify};
pub use plan::{BuildPlanEntry, resolve_all_targets, resolve_full};
