// tests/markup_assembly.rs

mod common;

use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use cam_baker::compile::{Injection, MarkupAssembler};
use cam_baker::compile::markup::LIVERELOAD_PORT;
use cam_baker::errors::BakerError;
use cam_baker::fs::mock::MockFileSystem;

type TestResult = Result<(), Box<dyn Error>>;

const NO_INJECTION: Injection<'static> = Injection::Inline {
    script: None,
    style: None,
};

fn assembler(fs: &MockFileSystem) -> Result<MarkupAssembler, BakerError> {
    MarkupAssembler::new(Arc::new(fs.clone()), "src")
}

#[test]
fn wraps_minified_markup_in_a_form() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file(
        "src/forms/taskA/index.html",
        "<div class=\"row\">\n  <!-- customer -->\n  <input   name=\"x\">\n</div>\n",
    );

    let html = assembler(&fs)?.assemble(Path::new("src/forms/taskA/index.html"), &NO_INJECTION)?;
    assert_eq!(
        html,
        r#"<form role="form"><div class="row"> <input name="x"> </div></form>"#
    );
    Ok(())
}

#[test]
fn inline_injection_places_style_first_and_script_last() -> TestResult {
    let fs = MockFileSystem::new();
    let injection = Injection::Inline {
        script: Some("var a=1;"),
        style: Some(".a{color:red}"),
    };

    let html = assembler(&fs)?.assemble_source("<p>hi</p>", "inline", &injection)?;
    assert_eq!(
        html,
        concat!(
            r#"<form role="form"><style>.a{color:red}</style><p>hi</p>"#,
            r#"<script cam-script type="text/form-script">var a=1;</script></form>"#
        )
    );
    Ok(())
}

#[test]
fn empty_inline_content_injects_nothing() -> TestResult {
    let fs = MockFileSystem::new();
    let injection = Injection::Inline {
        script: Some(""),
        style: None,
    };

    let html = assembler(&fs)?.assemble_source("<p>hi</p>", "inline", &injection)?;
    assert_eq!(html, r#"<form role="form"><p>hi</p></form>"#);
    Ok(())
}

#[test]
fn live_injection_links_to_the_served_artifacts() -> TestResult {
    let fs = MockFileSystem::new();
    let injection = Injection::Live {
        port: 8181,
        base_name: "taskA",
        livereload: true,
    };

    let html = assembler(&fs)?.assemble_source("<p>hi</p>", "live", &injection)?;
    assert!(html.starts_with(
        r#"<form role="form"><link rel="stylesheet" href="http://127.0.0.1:8181/taskA.css"><p>hi</p>"#
    ));
    assert!(html.contains(&format!("http://127.0.0.1:{LIVERELOAD_PORT}/livereload.js")));
    assert!(html.contains("import('http://127.0.0.1:8181/taskA.js')"));
    assert!(html.ends_with("</script></form>"));

    let quiet = Injection::Live {
        port: 8181,
        base_name: "taskA",
        livereload: false,
    };
    let html = assembler(&fs)?.assemble_source("<p>hi</p>", "live", &quiet)?;
    assert!(!html.contains("livereload.js"));
    Ok(())
}

#[test]
fn includes_expand_recursively_from_the_source_root() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file("src/shared/header.html", "<h1>Title</h1><include src=\"shared/logo.html\"/>");
    fs.add_file("src/shared/logo.html", "<img src=\"logo.png\">");
    fs.add_file(
        "src/forms/taskA/index.html",
        "<include src=\"shared/header.html\"></include>\n<p>body</p>",
    );

    let html = assembler(&fs)?.assemble(Path::new("src/forms/taskA/index.html"), &NO_INJECTION)?;
    assert_eq!(
        html,
        r#"<form role="form"><h1>Title</h1><img src="logo.png"> <p>body</p></form>"#
    );
    Ok(())
}

#[test]
fn missing_include_is_a_compile_error() -> TestResult {
    let fs = MockFileSystem::new();
    let result = assembler(&fs)?.assemble_source(
        r#"<include src="shared/nope.html"/>"#,
        "src/forms/taskA/index.html",
        &NO_INJECTION,
    );

    match result {
        Err(BakerError::Compile { entry, message }) => {
            assert_eq!(entry, "src/forms/taskA/index.html");
            assert!(message.contains("shared/nope.html"));
        }
        other => panic!("Expected Compile error, got: {:?}", other),
    }
    Ok(())
}

#[test]
fn include_cycle_is_a_compile_error() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file("src/shared/a.html", r#"<include src="shared/b.html"/>"#);
    fs.add_file("src/shared/b.html", r#"<include src="shared/a.html"/>"#);

    let result =
        assembler(&fs)?.assemble_source(r#"<include src="shared/a.html"/>"#, "root", &NO_INJECTION);

    match result {
        Err(BakerError::Compile { message, .. }) => assert!(message.contains("cycle")),
        other => panic!("Expected Compile error, got: {:?}", other),
    }
    Ok(())
}

#[test]
fn minify_keeps_raw_blocks_intact() -> TestResult {
    let fs = MockFileSystem::new();
    let minified = assembler(&fs)?.minify(
        "<div>\n  <pre>  keep\n  this </pre>\n  <script>\n  let  a = 1;\n</script>\n</div>",
    );

    assert_eq!(
        minified,
        "<div> <pre>  keep\n  this </pre> <script>\n  let  a = 1;\n</script> </div>"
    );
    Ok(())
}

#[test]
fn minify_keeps_the_space_between_inline_siblings() -> TestResult {
    let fs = MockFileSystem::new();
    let source = "<p>Name: <b>John</b> <i>Smith</i></p>";

    let minified = assembler(&fs)?.minify(source);
    assert_eq!(minified, source);
    assert!(minified.contains("</b> <i>"));

    let spread = assembler(&fs)?.minify("<p>\n  <b>John</b>\n  <i>Smith</i>\n</p>");
    assert_eq!(spread, "<p> <b>John</b> <i>Smith</i> </p>");
    Ok(())
}
