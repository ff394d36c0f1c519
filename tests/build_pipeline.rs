// tests/build_pipeline.rs

mod common;
use crate::common::builders::{ConfigFileBuilder, ProjectTree};
use crate::common::{RecordingCompiler, init_tracing, with_timeout};

use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cam_baker::compile::pipeline::write_if_changed;
use cam_baker::compile::{ArtifactCache, BuildPipeline};
use cam_baker::config::ConfigFile;
use cam_baker::engine::{BuildScope, CoreCommand};
use cam_baker::exec::StepExecutor;
use cam_baker::fs::FileSystem;
use cam_baker::fs::mock::MockFileSystem;
use cam_baker::resolve::{BuildTarget, resolve_full};
use cam_baker::types::{ArtifactKind, BuildMode, EntryKind};

type TestResult = Result<(), Box<dyn Error>>;

struct Harness {
    fs: MockFileSystem,
    config: Arc<ConfigFile>,
    compiler: RecordingCompiler,
    pipeline: BuildPipeline,
}

fn harness(fs: MockFileSystem, config: ConfigFile) -> Result<Harness, Box<dyn Error>> {
    init_tracing();
    let shared: Arc<dyn FileSystem> = Arc::new(fs.clone());
    let config = Arc::new(config);
    let compiler = RecordingCompiler::new(Arc::clone(&shared));
    let pipeline = BuildPipeline::new(
        shared,
        Arc::clone(&config),
        Arc::new(compiler.clone()),
        ArtifactCache::new(),
    )?;
    Ok(Harness {
        fs,
        config,
        compiler,
        pipeline,
    })
}

fn project() -> MockFileSystem {
    ProjectTree::new()
        .file("src/forms/taskA/index.html", "<p>A</p>")
        .form("taskA", "main.js")
        .form("taskA", "style.scss")
        .file("src/forms/taskB/index.html", "<p>B</p>")
        .form("taskB", "main.jsx")
        .build()
}

fn read(fs: &MockFileSystem, path: &str) -> Result<String, Box<dyn Error>> {
    Ok(fs.read_to_string(Path::new(path))?)
}

#[tokio::test]
async fn watch_markup_links_live_artifacts_and_skips_identical_writes() -> TestResult {
    let h = harness(project(), ConfigFileBuilder::new().build())?;
    let target = BuildTarget::new("src/forms/taskA/index.html", "taskA", EntryKind::Markup);

    let first = h.pipeline.compile_target(&target).await?;
    assert!(first.written);
    assert_eq!(first.output, h.config.public_dir().join("taskA.html"));

    let html = read(&h.fs, "public/taskA.html")?;
    assert!(html.contains(r#"href="http://127.0.0.1:8181/taskA.css""#));
    assert!(html.contains("<p>A</p>"));

    let second = h.pipeline.compile_target(&target).await?;
    assert!(!second.written);
    assert_eq!(h.compiler.call_count(), 0);
    Ok(())
}

#[tokio::test]
async fn watch_script_goes_through_the_compiler() -> TestResult {
    let h = harness(project(), ConfigFileBuilder::new().build())?;
    let target = BuildTarget::new("src/forms/taskA/main.js", "taskA", EntryKind::Script);

    h.pipeline.compile_target(&target).await?;

    let calls = h.compiler.calls();
    assert_eq!(calls.len(), 1);
    let (artifact, request) = &calls[0];
    assert_eq!(*artifact, ArtifactKind::Script);
    assert_eq!(request.mode, BuildMode::Watch);
    assert_eq!(request.entry, PathBuf::from("./src/forms/taskA/main.js"));
    assert_eq!(request.output, PathBuf::from("./public/taskA.js"));
    assert_eq!(
        read(&h.fs, "public/taskA.js")?,
        RecordingCompiler::output_for(ArtifactKind::Script, "main.js")
    );
    Ok(())
}

#[tokio::test]
async fn clean_build_inlines_script_and_style() -> TestResult {
    let h = harness(project(), ConfigFileBuilder::new().build())?;
    let plan = resolve_full(&h.fs, &h.config, Some("taskA"))?;

    let built = with_timeout(h.pipeline.build_folder(&plan[0], false)).await?;
    assert_eq!(built.output, h.config.out_dir().join("taskA.html"));

    let expected = format!(
        r#"<form role="form"><style>{}</style><p>A</p><script cam-script type="text/form-script">{}</script></form>"#,
        RecordingCompiler::output_for(ArtifactKind::Style, "style.scss"),
        RecordingCompiler::output_for(ArtifactKind::Script, "main.js"),
    );
    assert_eq!(read(&h.fs, "dist/taskA.html")?, expected);

    let modes: Vec<BuildMode> = h.compiler.calls().iter().map(|(_, r)| r.mode).collect();
    assert_eq!(modes, vec![BuildMode::Build, BuildMode::Build]);

    let cached = h.pipeline.cache().get("taskA");
    assert_eq!(
        cached.script.as_deref(),
        Some(RecordingCompiler::output_for(ArtifactKind::Script, "main.js").as_str())
    );
    Ok(())
}

#[tokio::test]
async fn markup_only_rebuild_reuses_cached_artifacts() -> TestResult {
    let h = harness(project(), ConfigFileBuilder::new().build())?;
    let plan = resolve_full(&h.fs, &h.config, Some("taskA"))?;

    h.pipeline.build_folder(&plan[0], false).await?;
    assert_eq!(h.compiler.call_count(), 2);

    h.fs.add_file("src/forms/taskA/index.html", "<p>A2</p>");
    let rebuilt = h.pipeline.build_folder(&plan[0], true).await?;

    assert_eq!(h.compiler.call_count(), 2);
    assert!(rebuilt.written);
    assert!(read(&h.fs, "dist/taskA.html")?.contains("<p>A2</p>"));
    Ok(())
}

#[tokio::test]
async fn reuse_without_cache_compiles() -> TestResult {
    let h = harness(project(), ConfigFileBuilder::new().build())?;
    let outcome = h.pipeline.build_scoped("taskB", true).await?;

    assert!(outcome.is_some());
    assert_eq!(h.compiler.call_count(), 1);
    assert!(h.pipeline.build_scoped("missing", false).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn full_build_cleans_output_and_isolates_failures() -> TestResult {
    let fs = project();
    fs.add_file("dist/stale.html", "old");
    fs.add_file("src/forms/broken/index.html", "<p>X</p>");
    fs.add_file("src/forms/broken/main.js", "syntax error(");
    let h = harness(fs, ConfigFileBuilder::new().build())?;

    let plan = resolve_full(&h.fs, &h.config, None)?;
    assert_eq!(plan.len(), 3);

    let summary = with_timeout(h.pipeline.build_plan(plan, true)).await;
    assert_eq!(summary.failed, vec!["broken".to_string()]);
    assert!(!summary.is_success());

    let built: Vec<String> = summary
        .built
        .iter()
        .map(|c| c.target.output_name.clone())
        .collect();
    assert_eq!(built, vec!["taskA.html", "taskB.html"]);

    assert!(!h.fs.exists(Path::new("dist/stale.html")));
    assert!(!h.fs.exists(Path::new("dist/broken.html")));
    assert!(h.fs.is_file(Path::new("dist/taskB.js")));

    let dist: Vec<PathBuf> = h
        .fs
        .files()
        .into_iter()
        .filter(|p| p.starts_with("dist"))
        .collect();
    assert_eq!(
        dist,
        vec![
            PathBuf::from("dist/taskA.css"),
            PathBuf::from("dist/taskA.html"),
            PathBuf::from("dist/taskA.js"),
            PathBuf::from("dist/taskB.html"),
            PathBuf::from("dist/taskB.js"),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn watch_compile_reports_only_successful_targets() -> TestResult {
    let fs = project();
    fs.add_file("src/forms/broken/main.js", "syntax error(");
    let h = harness(fs, ConfigFileBuilder::new().build())?;

    let outputs = h
        .pipeline
        .compile_targets(vec![
            BuildTarget::new("src/forms/taskA/main.js", "taskA", EntryKind::Script),
            BuildTarget::new("src/forms/broken/main.js", "broken", EntryKind::Script),
            BuildTarget::new("src/forms/taskA/style.scss", "taskA", EntryKind::Style),
        ])
        .await;

    let names: Vec<&str> = outputs
        .iter()
        .map(|c| c.target.output_name.as_str())
        .collect();
    assert_eq!(names, vec!["taskA.css", "taskA.js"]);
    assert_eq!(h.compiler.call_count(), 3);
    Ok(())
}

#[tokio::test]
async fn step_executor_runs_compile_and_scoped_build() -> TestResult {
    let h = harness(project(), ConfigFileBuilder::new().build_on_watch(true).build())?;
    let executor = StepExecutor::new(h.pipeline.clone());

    executor
        .execute(vec![
            CoreCommand::Compile(vec![BuildTarget::new(
                "src/forms/taskB/index.html",
                "taskB",
                EntryKind::Markup,
            )]),
            CoreCommand::Build {
                scope: BuildScope::TaskFolder("taskB".to_string()),
                reuse_cached: false,
            },
            CoreCommand::RequestExit,
        ])
        .await;

    assert!(h.fs.is_file(Path::new("public/taskB.html")));
    assert!(h.fs.is_file(Path::new("dist/taskB.html")));
    assert!(read(&h.fs, "dist/taskB.html")?.contains("text/form-script"));
    Ok(())
}

#[test]
fn write_if_changed_compares_content() -> TestResult {
    let fs = MockFileSystem::new();
    let path = Path::new("public/taskA.html");

    assert!(write_if_changed(&fs, path, b"<form></form>")?);
    assert!(!write_if_changed(&fs, path, b"<form></form>")?);
    assert!(write_if_changed(&fs, path, b"<form>changed</form>")?);
    assert_eq!(fs.read(path)?, b"<form>changed</form>".to_vec());
    Ok(())
}
