// tests/watch_and_toolchain.rs

mod common;
use crate::common::builders::ConfigFileBuilder;
use crate::common::{default_config, init_tracing};

use std::collections::BTreeMap;
use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tempfile::TempDir;
use tokio::sync::mpsc;
use tokio::time::timeout;

use cam_baker::cli::{CliArgs, Command};
use cam_baker::compile::tools::SCRIPT_GLOBAL_NAME;
use cam_baker::compile::{CompileRequest, ToolchainCompiler, env_defines};
use cam_baker::engine::RuntimeEvent;
use cam_baker::logging::parse_level_str;
use cam_baker::types::BuildMode;
use cam_baker::watch::{WatchProfile, spawn_watcher};

type TestResult = Result<(), Box<dyn Error>>;

fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn watch_profile_covers_sources_and_process_definitions() -> TestResult {
    let profile = WatchProfile::from_config(&default_config())?;

    assert!(profile.matches("src/forms/taskA/index.html"));
    assert!(profile.matches("src/forms/taskA/_vars.scss"));
    assert!(profile.matches("src/lib/helpers.jsx"));
    assert!(profile.matches("src/processes/order.bpmn"));
    assert!(!profile.matches("src/forms/taskA/notes.md"));
    assert!(!profile.matches("README.md"));
    Ok(())
}

#[test]
fn watch_profile_ignores_output_directories() -> TestResult {
    let config = ConfigFileBuilder::new()
        .src_dir("app")
        .out_dir("app/build")
        .process_glob("**/*.bpmn")
        .build();
    let profile = WatchProfile::from_config(&config)?;

    assert!(profile.matches("app/forms/taskA/main.js"));
    assert!(!profile.matches("app/build/taskA.js"));
    assert!(!profile.matches("public/order.bpmn"));
    assert!(profile.matches("bpmn/order.bpmn"));
    Ok(())
}

#[test]
fn env_defines_expose_prefixed_variables_as_json_strings() {
    let defines = env_defines(
        "PUBLIC_",
        vars(&[
            ("PUBLIC_API", "http://localhost:3000"),
            ("PUBLIC_QUOTE", "say \"hi\""),
            ("SECRET_TOKEN", "nope"),
        ]),
    );

    let expected: BTreeMap<String, String> = [
        ("process.env.PUBLIC_API", "\"http://localhost:3000\""),
        ("process.env.PUBLIC_QUOTE", "\"say \\\"hi\\\"\""),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    assert_eq!(defines, expected);

    assert!(env_defines("", vars(&[("PUBLIC_API", "x")])).is_empty());
}

#[test]
fn script_arguments_depend_on_build_mode() {
    let defines = env_defines("PUBLIC_", vars(&[("PUBLIC_STAGE", "dev")]));
    let compiler = ToolchainCompiler::new("esbuild", "sass", defines);

    let watch = compiler.script_args(&CompileRequest {
        entry: PathBuf::from("src/forms/taskA/main.js"),
        output: PathBuf::from("public/taskA.js"),
        mode: BuildMode::Watch,
    });
    assert_eq!(
        watch,
        vec![
            "src/forms/taskA/main.js",
            "--bundle",
            "--outfile=public/taskA.js",
            "--format=esm",
            "--sourcemap",
            "--define:process.env.PUBLIC_STAGE=\"dev\"",
        ]
    );

    let build = compiler.script_args(&CompileRequest {
        entry: PathBuf::from("src/forms/taskA/main.js"),
        output: PathBuf::from("dist/taskA.js"),
        mode: BuildMode::Build,
    });
    assert!(build.contains(&"--format=iife".to_string()));
    assert!(build.contains(&format!("--global-name={SCRIPT_GLOBAL_NAME}")));
    assert!(build.contains(&"--minify".to_string()));
    assert!(!build.contains(&"--sourcemap".to_string()));
}

#[test]
fn style_arguments_compress_output() {
    let compiler = ToolchainCompiler::new("esbuild", "sass", BTreeMap::new());
    let args = compiler.style_args(&CompileRequest {
        entry: PathBuf::from("src/forms/taskA/style.scss"),
        output: PathBuf::from("dist/taskA.css"),
        mode: BuildMode::Build,
    });
    assert_eq!(
        args,
        vec!["src/forms/taskA/style.scss", "dist/taskA.css", "--style=compressed"]
    );
}

#[test]
fn cli_defaults_to_dev_and_parses_subcommands() -> TestResult {
    let bare = CliArgs::try_parse_from(["cam-baker"])?;
    assert!(matches!(bare.command(), Command::Dev));

    let build = CliArgs::try_parse_from(["cam-baker", "build", "--task", "taskA", "--dry-run"])?;
    match build.command() {
        Command::Build { task, dry_run } => {
            assert_eq!(task.as_deref(), Some("taskA"));
            assert!(dry_run);
        }
        other => panic!("Expected Build, got: {:?}", other),
    }

    let deploy = CliArgs::try_parse_from([
        "cam-baker",
        "--config",
        "app/Baker.toml",
        "deploy",
        "src/order.bpmn",
    ])?;
    assert_eq!(deploy.config.as_deref(), Some("app/Baker.toml"));
    assert!(matches!(
        deploy.command(),
        Command::Deploy { file: Some(ref f) } if f == "src/order.bpmn"
    ));
    Ok(())
}

#[test]
fn log_levels_parse_case_insensitively() {
    assert_eq!(parse_level_str("DEBUG"), Some(tracing::Level::DEBUG));
    assert_eq!(parse_level_str(" warning "), Some(tracing::Level::WARN));
    assert_eq!(parse_level_str("loud"), None);
}

#[tokio::test]
async fn watcher_reports_changed_sources_relative_to_root() -> TestResult {
    init_tracing();
    let dir = TempDir::new()?;
    let task_dir = dir.path().join("src/forms/taskA");
    std::fs::create_dir_all(&task_dir)?;
    std::fs::create_dir_all(dir.path().join("public"))?;

    let (tx, mut rx) = mpsc::channel(16);
    let profile = WatchProfile::from_config(&default_config())?;
    let _handle = spawn_watcher(dir.path(), profile, tx, Duration::from_millis(50))?;

    tokio::time::sleep(Duration::from_millis(100)).await;
    std::fs::write(dir.path().join("public/taskA.js"), "ignored")?;
    std::fs::write(task_dir.join("main.js"), "export default () => {}")?;

    let event = timeout(Duration::from_secs(5), rx.recv())
        .await?
        .ok_or("watcher channel closed")?;
    assert_eq!(
        event,
        RuntimeEvent::FileChanged {
            path: "src/forms/taskA/main.js".to_string()
        }
    );
    Ok(())
}
