//! Project-set file loading, error-message, and filter integration tests.

use assert_fs::prelude::*;
use crosstest_core::{ConfigError, ProjectName, ProjectSet};
use predicates::prelude::predicate;
use rstest::rstest;
use std::path::PathBuf;

const SET: &str = "\
projects:
  ruby:
    language: ruby
  java:
    language: java
  python:
    language: python
  python3:
    language: python
workflows:
  ci: [bootstrap, lint, test]
";

fn names(set: &ProjectSet, pattern: Option<&str>) -> Vec<String> {
    set.registry
        .filter(pattern)
        .expect("filter")
        .iter()
        .map(|p| p.name().to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// 1. Load errors
// ---------------------------------------------------------------------------

#[test]
fn load_missing_file_returns_io_error_with_path() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let path = dir.path().join("crosstest.yaml");
    let err = ProjectSet::load_file(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }), "got: {err}");
    assert!(err.to_string().contains("crosstest.yaml"));
}

#[test]
fn load_corrupt_yaml_returns_parse_error_with_path() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("crosstest.yaml");
    file.write_str(": : corrupt : yaml : !!!\n  - broken: [unclosed")
        .expect("write");

    let err = ProjectSet::load_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
    assert!(err.to_string().contains("crosstest.yaml"), "must contain file path, got: {err}");
}

#[test]
fn load_list_document_is_rejected() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("crosstest.yaml");
    file.write_str("- this is a list, not a mapping\n").expect("write");

    let err = ProjectSet::load_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
}

// ---------------------------------------------------------------------------
// 2. Successful load
// ---------------------------------------------------------------------------

#[test]
fn root_is_the_directory_of_the_file() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("crosstest.yaml");
    file.write_str(SET).expect("write");
    file.assert(predicate::path::exists());

    let set = ProjectSet::load_file(file.path()).expect("load");
    assert_eq!(set.root, dir.path().to_path_buf());
    assert_eq!(set.registry.len(), 4);
    assert_eq!(
        set.workflows.resolve("ci").expect("ci"),
        ["bootstrap", "lint", "test"]
    );

    let java = set.registry.get(&ProjectName::from("java")).expect("java");
    assert_eq!(java.dir_in(&set.root), dir.path().join("projects").join("java"));
}

#[test]
fn bare_file_name_resolves_to_current_dir() {
    let set = ProjectSet::from_yaml_str(".", SET).expect("load");
    assert_eq!(set.root, PathBuf::from("."));
}

// ---------------------------------------------------------------------------
// 3. Filtering
// ---------------------------------------------------------------------------

#[rstest]
#[case::none(None, &["ruby", "java", "python", "python3"])]
#[case::empty(Some(""), &["ruby", "java", "python", "python3"])]
#[case::exact(Some("python"), &["python"])]
#[case::prefix(Some("python.*"), &["python", "python3"])]
#[case::alternation(Some("python|ruby"), &["ruby", "python"])]
#[case::class(Some("[jr].*"), &["ruby", "java"])]
#[case::no_match(Some("go"), &[])]
fn filter_preserves_registration_order(#[case] pattern: Option<&str>, #[case] expected: &[&str]) {
    let set = ProjectSet::from_yaml_str(".", SET).expect("load");
    assert_eq!(names(&set, pattern), expected);
}
