// src/config/model.rs

use std::path::{Path, PathBuf};

use globset::GlobMatcher;
use serde::Deserialize;

use crate::types::EntryKind;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// src_dir = "src"
/// forms_folder = "forms"
/// out_dir = "dist"
/// public_dir = "public"
///
/// [entry_points]
/// js = "main.js"
/// jsx = "main.jsx"
/// scss = "style.scss"
/// html = "index.html"
///
/// [watch]
/// build_on_watch = false
///
/// [engine]
/// server = "http://127.0.0.1:8080"
/// auto_deploy = true
/// ```
///
/// All sections are optional and have reasonable defaults; an empty file is
/// a valid zero-config project.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    /// Source root, relative to the project root.
    #[serde(default = "default_src_dir")]
    pub src_dir: String,

    /// Folder directly below `src_dir` that holds the task folders.
    #[serde(default = "default_forms_folder")]
    pub forms_folder: String,

    /// Output directory of clean builds.
    #[serde(default = "default_out_dir")]
    pub out_dir: String,

    /// Live-served directory written by watch rebuilds.
    #[serde(default = "default_public_dir")]
    pub public_dir: String,

    #[serde(default)]
    pub entry_points: EntryPointNames,

    #[serde(default)]
    pub watch: WatchSection,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub env: EnvSection,

    #[serde(default)]
    pub tools: ToolsSection,

    #[serde(default)]
    pub engine: EngineSection,
}

impl Default for RawConfigFile {
    fn default() -> Self {
        Self {
            src_dir: default_src_dir(),
            forms_folder: default_forms_folder(),
            out_dir: default_out_dir(),
            public_dir: default_public_dir(),
            entry_points: EntryPointNames::default(),
            watch: WatchSection::default(),
            server: ServerSection::default(),
            env: EnvSection::default(),
            tools: ToolsSection::default(),
            engine: EngineSection::default(),
        }
    }
}

fn default_src_dir() -> String {
    "src".to_string()
}

fn default_forms_folder() -> String {
    "forms".to_string()
}

fn default_out_dir() -> String {
    "dist".to_string()
}

fn default_public_dir() -> String {
    "public".to_string()
}

/// `[entry_points]` section: the literal file names that mark a file as the
/// entry of its kind inside a task folder.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct EntryPointNames {
    #[serde(default = "default_js")]
    pub js: String,
    #[serde(default = "default_jsx")]
    pub jsx: String,
    #[serde(default = "default_scss")]
    pub scss: String,
    #[serde(default = "default_html")]
    pub html: String,
}

fn default_js() -> String {
    "main.js".to_string()
}

fn default_jsx() -> String {
    "main.jsx".to_string()
}

fn default_scss() -> String {
    "style.scss".to_string()
}

fn default_html() -> String {
    "index.html".to_string()
}

impl Default for EntryPointNames {
    fn default() -> Self {
        Self {
            js: default_js(),
            jsx: default_jsx(),
            scss: default_scss(),
            html: default_html(),
        }
    }
}

impl EntryPointNames {
    /// Configured file name for `kind`.
    pub fn name_of(&self, kind: EntryKind) -> &str {
        match kind {
            EntryKind::Script => &self.js,
            EntryKind::AlternateScript => &self.jsx,
            EntryKind::Style => &self.scss,
            EntryKind::Markup => &self.html,
        }
    }

    /// Entry kind whose configured name equals `file_name` exactly.
    pub fn kind_of(&self, file_name: &str) -> Option<EntryKind> {
        EntryKind::ALL
            .into_iter()
            .find(|kind| self.name_of(*kind) == file_name)
    }

    /// Entry kind whose configured name carries the extension `ext`
    /// (without the leading dot).
    pub fn kind_for_extension(&self, ext: &str) -> Option<EntryKind> {
        EntryKind::ALL
            .into_iter()
            .find(|kind| extension_of(self.name_of(*kind)) == Some(ext))
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntryKind, &str)> + '_ {
        EntryKind::ALL
            .into_iter()
            .map(move |kind| (kind, self.name_of(kind)))
    }
}

pub(crate) fn extension_of(file_name: &str) -> Option<&str> {
    Path::new(file_name).extension().and_then(|e| e.to_str())
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchSection {
    /// Also run a folder-scoped clean build into `out_dir` on every change.
    #[serde(default)]
    pub build_on_watch: bool,

    /// Quiet period before a burst of events on one path is acted upon.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_debounce_ms() -> u64 {
    150
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            build_on_watch: false,
            debounce_ms: default_debounce_ms(),
        }
    }
}

/// `[server]` section: where the live server serves `public_dir` from.
///
/// Serving itself is done by an external tool; the port is needed to point
/// watch-mode markup at the served script/style files.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_true")]
    pub livereload: bool,
}

fn default_port() -> u16 {
    8181
}

fn default_true() -> bool {
    true
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            port: default_port(),
            livereload: true,
        }
    }
}

/// `[env]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct EnvSection {
    /// Environment variables starting with this prefix are exposed to script
    /// bundles as `process.env.<NAME>`.
    #[serde(default = "default_env_prefix")]
    pub prefix: String,
}

fn default_env_prefix() -> String {
    "PUBLIC_".to_string()
}

impl Default for EnvSection {
    fn default() -> Self {
        Self {
            prefix: default_env_prefix(),
        }
    }
}

/// `[tools]` section: executables used for script and style compilation.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolsSection {
    #[serde(default = "default_esbuild")]
    pub esbuild: String,

    #[serde(default = "default_sass")]
    pub sass: String,
}

fn default_esbuild() -> String {
    "esbuild".to_string()
}

fn default_sass() -> String {
    "sass".to_string()
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            esbuild: default_esbuild(),
            sass: default_sass(),
        }
    }
}

/// `[engine]` section: the locally running process engine.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineSection {
    /// Base address of the engine (without `/engine-rest`).
    #[serde(default = "default_server")]
    pub server: String,

    /// Deploy process definitions on startup and whenever they (or forms they
    /// reference) change while watching.
    #[serde(default)]
    pub auto_deploy: bool,

    /// Glob selecting process-definition files, relative to the project root.
    #[serde(default = "default_process_glob")]
    pub process_glob: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_server() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_process_glob() -> String {
    "src/**/*.bpmn".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            server: default_server(),
            auto_deploy: false,
            process_glob: default_process_glob(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Validated configuration plus the project root it applies to.
///
/// Only obtainable through `ConfigFile::try_from(RawConfigFile)` (see
/// `validate.rs`), so every resolver can rely on the invariants checked there.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    root: PathBuf,
    raw: RawConfigFile,
    process_matcher: GlobMatcher,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile, process_matcher: GlobMatcher) -> Self {
        Self {
            root: PathBuf::from("."),
            raw,
            process_matcher,
        }
    }

    /// Re-anchor the configuration at `root` (the directory holding the
    /// config file). Defaults to `.`.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn src_dir(&self) -> &str {
        &self.raw.src_dir
    }

    pub fn forms_folder(&self) -> &str {
        &self.raw.forms_folder
    }

    pub fn entry_points(&self) -> &EntryPointNames {
        &self.raw.entry_points
    }

    pub fn watch(&self) -> &WatchSection {
        &self.raw.watch
    }

    pub fn server(&self) -> &ServerSection {
        &self.raw.server
    }

    pub fn env(&self) -> &EnvSection {
        &self.raw.env
    }

    pub fn tools(&self) -> &ToolsSection {
        &self.raw.tools
    }

    pub fn engine(&self) -> &EngineSection {
        &self.raw.engine
    }

    pub fn build_on_watch(&self) -> bool {
        self.raw.watch.build_on_watch
    }

    /// `<root>/<src_dir>`.
    pub fn src_root(&self) -> PathBuf {
        self.root.join(&self.raw.src_dir)
    }

    /// `<root>/<src_dir>/<forms_folder>`.
    pub fn forms_root(&self) -> PathBuf {
        self.src_root().join(&self.raw.forms_folder)
    }

    /// `<root>/<out_dir>`.
    pub fn out_dir(&self) -> PathBuf {
        self.root.join(&self.raw.out_dir)
    }

    /// `<root>/<public_dir>`.
    pub fn public_dir(&self) -> PathBuf {
        self.root.join(&self.raw.public_dir)
    }

    /// Relative (project-root based) output directory names; the watcher
    /// ignores everything below them.
    pub fn output_dir_names(&self) -> [&str; 2] {
        [&self.raw.out_dir, &self.raw.public_dir]
    }

    /// Whether a project-relative path selects a process-definition file.
    pub fn is_process_definition(&self, rel_path: &str) -> bool {
        self.process_matcher.is_match(rel_path)
    }
}
