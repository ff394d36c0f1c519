// tests/path_classifier.rs

mod common;
use crate::common::builders::ConfigFileBuilder;
use crate::common::default_config;

use std::error::Error;

use cam_baker::resolve::{FileContext, MAX_PATH_DEPTH, PathTokens, classify};
use cam_baker::types::EntryKind;

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn entry_in_task_folder_is_not_partial() -> TestResult {
    let config = default_config();
    let ctx = classify("src/forms/taskA/index.html", &config);

    assert_eq!(ctx.extension.as_deref(), Some("html"));
    assert!(ctx.inside_forms_tree);
    assert_eq!(ctx.depth, 4);
    assert_eq!(ctx.entry_kind, Some(EntryKind::Markup));
    assert_eq!(ctx.task_folder.as_deref(), Some("taskA"));
    assert!(!ctx.partial);
    Ok(())
}

#[test]
fn grouping_folder_at_max_depth_uses_inner_folder() -> TestResult {
    let config = default_config();
    let ctx = classify("src/forms/onboarding/taskB/main.js", &config);

    assert_eq!(ctx.depth, MAX_PATH_DEPTH);
    assert_eq!(ctx.entry_kind, Some(EntryKind::Script));
    assert_eq!(ctx.task_folder.as_deref(), Some("taskB"));
    assert!(!ctx.partial);
    Ok(())
}

#[test]
fn entry_nested_below_max_depth_is_partial() -> TestResult {
    let config = default_config();
    let ctx = classify("src/forms/onboarding/taskB/widgets/main.js", &config);

    assert_eq!(ctx.depth, MAX_PATH_DEPTH + 1);
    assert_eq!(ctx.entry_kind, Some(EntryKind::Script));
    assert_eq!(ctx.task_folder.as_deref(), Some("taskB"));
    assert!(ctx.partial);
    Ok(())
}

#[test]
fn backslash_separators_classify_like_slashes() -> TestResult {
    let config = default_config();
    let slashes = classify("src/forms/taskA/style.scss", &config);
    let backslashes = classify(r"src\forms\taskA\style.scss", &config);

    assert_eq!(slashes, backslashes);
    assert_eq!(backslashes.entry_kind, Some(EntryKind::Style));
    assert!(!backslashes.partial);
    Ok(())
}

#[test]
fn leading_dot_segment_is_ignored() -> TestResult {
    let config = default_config();
    let ctx = classify("./src/forms/taskA/main.jsx", &config);

    assert_eq!(ctx.depth, 4);
    assert_eq!(ctx.entry_kind, Some(EntryKind::AlternateScript));
    assert!(!ctx.partial);
    Ok(())
}

#[test]
fn shared_fragment_is_partial_but_keeps_its_family() -> TestResult {
    let config = default_config();
    let ctx = classify("src/forms/taskA/_shared-partial.scss", &config);

    assert!(ctx.partial);
    assert_eq!(ctx.entry_kind, None);
    assert_eq!(ctx.task_folder.as_deref(), Some("taskA"));
    assert_eq!(ctx.extension_kind(&config), Some(EntryKind::Style));
    Ok(())
}

#[test]
fn entry_directly_in_forms_folder_has_no_task_folder() -> TestResult {
    let config = default_config();
    let ctx = classify("src/forms/index.html", &config);

    assert!(ctx.inside_forms_tree);
    assert_eq!(ctx.entry_kind, Some(EntryKind::Markup));
    assert_eq!(ctx.task_folder, None);
    assert!(ctx.partial);
    Ok(())
}

#[test]
fn files_outside_the_forms_tree_are_partial() -> TestResult {
    let config = default_config();

    let shared = classify("src/shared/index.html", &config);
    assert!(!shared.inside_forms_tree);
    assert_eq!(shared.task_folder, None);
    assert!(shared.partial);

    let foreign_root = classify("lib/forms/taskA/index.html", &config);
    assert!(!foreign_root.inside_forms_tree);
    assert!(foreign_root.partial);
    Ok(())
}

#[test]
fn empty_path_yields_neutral_context() -> TestResult {
    let config = default_config();
    assert_eq!(classify("", &config), FileContext::default());
    assert_eq!(classify("./", &config), FileContext::default());
    Ok(())
}

#[test]
fn configured_entry_names_drive_entry_detection() -> TestResult {
    let config = ConfigFileBuilder::new()
        .entry_points("app.js", "app.tsx", "theme.scss", "form.html")
        .build();

    let default_name = classify("src/forms/taskA/index.html", &config);
    assert_eq!(default_name.entry_kind, None);
    assert!(default_name.partial);

    let configured = classify("src/forms/taskA/form.html", &config);
    assert_eq!(configured.entry_kind, Some(EntryKind::Markup));
    assert!(!configured.partial);

    let alternate = classify("src/forms/taskA/app.tsx", &config);
    assert_eq!(alternate.entry_kind, Some(EntryKind::AlternateScript));
    Ok(())
}

#[test]
fn tokens_expose_source_relative_segments() -> TestResult {
    let tokens = PathTokens::new("src/forms/taskA/index.html", "src");
    assert_eq!(tokens.depth(), 4);
    assert_eq!(tokens.file_name(), Some("index.html"));
    assert_eq!(
        tokens.source_relative(),
        Some(&["forms", "taskA", "index.html"][..])
    );

    let bare_root = PathTokens::new("src", "src");
    assert_eq!(bare_root.source_relative(), None);
    assert!(PathTokens::new("", "src").is_empty());
    Ok(())
}
