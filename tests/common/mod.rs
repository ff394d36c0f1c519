#![allow(dead_code)]

pub use cam_baker_test_utils::builders;
pub use cam_baker_test_utils::fake_backend::FakeBackend;
pub use cam_baker_test_utils::recording_compiler::RecordingCompiler;
pub use cam_baker_test_utils::{init_tracing, with_timeout};

use cam_baker::config::ConfigFile;

use self::builders::ConfigFileBuilder;

/// Zero-config defaults rooted at `.`.
pub fn default_config() -> ConfigFile {
    ConfigFileBuilder::new().build()
}
