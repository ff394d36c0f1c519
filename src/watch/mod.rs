// src/watch/mod.rs

//! File watching for dev sessions.
//!
//! - `patterns`: which project-relative paths are of interest.
//! - `watcher`: the `notify` watcher feeding debounced
//!   `RuntimeEvent::FileChanged` events into the runtime.
//! - `path_utils`: path relativization shared with the directory scans.

pub mod path_utils;
pub mod patterns;
pub mod watcher;

pub use patterns::WatchProfile;
pub use watcher::{WatcherHandle, spawn_watcher};
