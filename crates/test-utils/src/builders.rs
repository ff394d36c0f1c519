#![allow(dead_code)]

use cam_baker::config::{ConfigFile, RawConfigFile};
use cam_baker::errors::Result;
use cam_baker::fs::mock::MockFileSystem;

/// Builder for `ConfigFile` to simplify test setup. Starts from the
/// zero-config defaults.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn entry_points(mut self, js: &str, jsx: &str, scss: &str, html: &str) -> Self {
        self.config.entry_points.js = js.to_string();
        self.config.entry_points.jsx = jsx.to_string();
        self.config.entry_points.scss = scss.to_string();
        self.config.entry_points.html = html.to_string();
        self
    }

    pub fn src_dir(mut self, dir: &str) -> Self {
        self.config.src_dir = dir.to_string();
        self
    }

    pub fn out_dir(mut self, dir: &str) -> Self {
        self.config.out_dir = dir.to_string();
        self
    }

    pub fn public_dir(mut self, dir: &str) -> Self {
        self.config.public_dir = dir.to_string();
        self
    }

    pub fn build_on_watch(mut self, val: bool) -> Self {
        self.config.watch.build_on_watch = val;
        self
    }

    pub fn auto_deploy(mut self, val: bool) -> Self {
        self.config.engine.auto_deploy = val;
        self
    }

    pub fn server(mut self, address: &str) -> Self {
        self.config.engine.server = address.to_string();
        self
    }

    pub fn process_glob(mut self, pattern: &str) -> Self {
        self.config.engine.process_glob = pattern.to_string();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    pub fn livereload(mut self, val: bool) -> Self {
        self.config.server.livereload = val;
        self
    }

    pub fn raw(&self) -> &RawConfigFile {
        &self.config
    }

    pub fn try_build(self) -> Result<ConfigFile> {
        ConfigFile::try_from(self.config)
    }

    pub fn build(self) -> ConfigFile {
        self.try_build()
            .expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Populates a `MockFileSystem` with a project layout, paths relative to
/// the project root.
pub struct ProjectTree {
    fs: MockFileSystem,
}

impl ProjectTree {
    pub fn new() -> Self {
        Self {
            fs: MockFileSystem::new(),
        }
    }

    pub fn file(self, path: &str, content: &str) -> Self {
        self.fs.add_file(path, content);
        self
    }

    /// `src/forms/<task>/<name>` with placeholder content.
    pub fn form(self, task: &str, name: &str) -> Self {
        let path = format!("src/forms/{task}/{name}");
        let content = format!("<!-- {task}/{name} -->");
        self.file(&path, &content)
    }

    pub fn build(self) -> MockFileSystem {
        self.fs
    }
}

impl Default for ProjectTree {
    fn default() -> Self {
        Self::new()
    }
}
