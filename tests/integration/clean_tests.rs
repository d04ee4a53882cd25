//! Integration tests for cleaning generated output

use std::fs;

use pretty_assertions::assert_eq;

use crate::common::TestContext;

#[test]
fn test_clean_removes_generated_files() {
    let ctx = TestContext::with_fixture("blog");
    let summary = ctx.generate_successfully();

    let removed = schemagen::clean(&ctx.output_dir).unwrap();
    assert_eq!(removed.len(), summary.files.len());
    assert!(ctx.output_files().is_empty());
}

#[test]
fn test_clean_keeps_hand_written_files() {
    let ctx = TestContext::with_fixture("no_relations");
    ctx.generate_successfully();
    fs::write(ctx.output_dir.join("extensions.rs"), "pub fn helper() {}\n").unwrap();
    fs::write(ctx.output_dir.join("README.md"), "notes\n").unwrap();

    schemagen::clean(&ctx.output_dir).unwrap();

    assert_eq!(ctx.output_files(), vec!["README.md", "extensions.rs"]);
}

#[test]
fn test_regenerate_after_clean_matches() {
    let ctx = TestContext::with_fixture("no_relations");
    ctx.generate_successfully();
    let before = ctx.read_output("columns.rs");

    schemagen::clean(&ctx.output_dir).unwrap();
    ctx.generate_successfully();

    assert_eq!(ctx.read_output("columns.rs"), before);
}

#[test]
fn test_clean_without_output_dir() {
    let ctx = TestContext::with_fixture("no_relations");
    let removed = schemagen::clean(&ctx.output_dir).unwrap();
    assert!(removed.is_empty());
}
