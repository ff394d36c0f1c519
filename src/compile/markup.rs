// src/compile/markup.rs

//! Form markup assembly.
//!
//! The markup entry is expanded (`<include src="...">`), minified, and
//! wrapped in the `<form role="form">` element the engine's task list
//! renders. Compiled script/style content (clean builds) or links to the live
//! server (watch mode) are injected inside the form.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, anyhow};
use regex::{Captures, Regex};

use crate::errors::{BakerError, Result};
use crate::fs::FileSystem;

/// Port of the live-reload client script.
pub const LIVERELOAD_PORT: u16 = 35729;

/// Nesting limit for includes; deeper chains are treated as a cycle.
const MAX_INCLUDE_DEPTH: usize = 16;

/// What gets injected into the assembled form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Injection<'a> {
    /// Clean build: inline the compiled artifacts. Empty or missing content
    /// injects nothing.
    Inline {
        script: Option<&'a str>,
        style: Option<&'a str>,
    },
    /// Watch mode: reference `<base>.js` / `<base>.css` on the live server.
    Live {
        port: u16,
        base_name: &'a str,
        livereload: bool,
    },
}

impl Injection<'_> {
    fn prepend(&self) -> String {
        match self {
            Injection::Inline { style, .. } => match style {
                Some(css) if !css.is_empty() => format!("<style>{css}</style>"),
                _ => String::new(),
            },
            Injection::Live {
                port, base_name, ..
            } => format!(r#"<link rel="stylesheet" href="http://127.0.0.1:{port}/{base_name}.css">"#),
        }
    }

    fn append(&self) -> String {
        match self {
            Injection::Inline { script, .. } => match script {
                Some(js) if !js.is_empty() => {
                    format!(r#"<script cam-script type="text/form-script">{js}</script>"#)
                }
                _ => String::new(),
            },
            Injection::Live {
                port,
                base_name,
                livereload,
            } => {
                let reload = if *livereload {
                    format!(r#"<script src="http://127.0.0.1:{LIVERELOAD_PORT}/livereload.js"></script>"#)
                } else {
                    String::new()
                };
                format!(
                    "{reload}<script cam-script type=\"text/form-script\">\
                     (async () => {{ try {{ \
                     const main = await import('http://127.0.0.1:{port}/{base_name}.js'); \
                     main.default({{ camForm, $scope, inject }}) \
                     }} catch (error) {{ console.error(error) }} }})()\
                     </script>"
                )
            }
        }
    }
}

/// Assembles form markup; includes resolve against `include_root`.
#[derive(Debug, Clone)]
pub struct MarkupAssembler {
    fs: Arc<dyn FileSystem>,
    include_root: PathBuf,
    include_tag: Regex,
    comment: Regex,
    raw_block: Regex,
    whitespace: Regex,
}

impl MarkupAssembler {
    pub fn new(fs: Arc<dyn FileSystem>, include_root: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            fs,
            include_root: include_root.into(),
            include_tag: compile(
                r#"(?is)<include\s+src\s*=\s*["']([^"']+)["']\s*(?:/>|>\s*</include\s*>)"#,
            )?,
            comment: compile(r"(?s)<!--.*?-->")?,
            raw_block: compile(
                r"(?is)<script\b.*?</script\s*>|<style\b.*?</style\s*>|<pre\b.*?</pre\s*>|<textarea\b.*?</textarea\s*>",
            )?,
            whitespace: compile(r"\s+")?,
        })
    }

    /// Read `entry` and return the finished form markup.
    pub fn assemble(&self, entry: &Path, injection: &Injection<'_>) -> Result<String> {
        let source = self.fs.read_to_string(entry)?;
        self.assemble_source(&source, &entry.display().to_string(), injection)
    }

    /// Assemble already loaded markup; `label` names it in errors.
    pub fn assemble_source(
        &self,
        source: &str,
        label: &str,
        injection: &Injection<'_>,
    ) -> Result<String> {
        let mut stack = Vec::new();
        let expanded = self.expand_includes(source, label, &mut stack)?;
        let body = self.minify(&expanded);

        Ok(format!(
            r#"<form role="form">{}{}{}</form>"#,
            injection.prepend(),
            body,
            injection.append()
        ))
    }

    fn expand_includes(
        &self,
        source: &str,
        label: &str,
        stack: &mut Vec<PathBuf>,
    ) -> Result<String> {
        if stack.len() > MAX_INCLUDE_DEPTH {
            return Err(BakerError::compile(label, "includes nested too deeply"));
        }

        let mut out = String::with_capacity(source.len());
        let mut last = 0;

        for caps in self.include_tag.captures_iter(source) {
            let (Some(whole), Some(src)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            out.push_str(&source[last..whole.start()]);
            last = whole.end();

            let path = self.include_root.join(src.as_str());
            if stack.contains(&path) {
                return Err(BakerError::compile(
                    label,
                    format!("include cycle through {}", src.as_str()),
                ));
            }

            let fragment = self
                .fs
                .read_to_string(&path)
                .with_context(|| format!("resolving include {:?}", src.as_str()))
                .map_err(|e| BakerError::compile(label, format!("{e:#}")))?;

            stack.push(path);
            let expanded = self.expand_includes(&fragment, label, stack)?;
            stack.pop();
            out.push_str(&expanded);
        }

        out.push_str(&source[last..]);
        Ok(out)
    }

    /// Drop comments and collapse whitespace outside raw blocks (script,
    /// style, pre, textarea).
    pub fn minify(&self, html: &str) -> String {
        let stripped = self.comment.replace_all(html, "");

        // Raw blocks are masked while whitespace is collapsed.
        let mut blocks: Vec<String> = Vec::new();
        let masked = self.raw_block.replace_all(&stripped, |caps: &Captures<'_>| {
            blocks.push(caps[0].to_string());
            raw_marker(blocks.len() - 1)
        });

        let mut out = self.collapse(&masked).trim().to_string();
        for (index, block) in blocks.iter().enumerate() {
            out = out.replacen(&raw_marker(index), block, 1);
        }
        out
    }

    /// Runs of whitespace become one space, also between tags, so inline
    /// siblings keep their separation.
    fn collapse(&self, text: &str) -> String {
        self.whitespace.replace_all(text, " ").into_owned()
    }
}

fn raw_marker(index: usize) -> String {
    format!("<\u{1}{index}>")
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| BakerError::Other(anyhow!("invalid markup pattern: {e}")))
}
