use chrono::{Duration, Utc};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

use workdex_core::corpus::CorpusLoader;

fn categories() -> Vec<String> { vec!["features".to_string(), "bugs".to_string()] }

fn write(root: &Path, rel: &str, body: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, body).unwrap();
}

#[test]
fn parse_all_reads_category_work_item_markdown() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write(root, "features/auth-refactor/plan.md", "# Auth Refactor\nRefactor the login module");
    write(root, "features/auth-refactor/notes.txt", "ignored");
    write(root, "bugs/crash-on-start/db-timeout_notes.md", "Database connection times out");
    write(root, "tasks/unlisted/todo.md", "# Not a configured category");
    write(root, "features/stray.md", "# Directly under category");

    let loader = CorpusLoader::new(root, categories());
    assert!(loader.corpus_exists());
    let docs = loader.parse_all();
    assert_eq!(docs.len(), 2, "{docs:#?}");

    let plan = docs.iter().find(|d| d.file_name == "plan.md").expect("plan.md");
    assert_eq!(plan.title, "Auth Refactor");
    assert_eq!(plan.category, "features");
    assert_eq!(plan.work_item, "auth-refactor");
    assert!(plan.keywords.contains("login"));
    assert!(plan.file_path.ends_with("features/auth-refactor/plan.md"));

    let bug = docs.iter().find(|d| d.category == "bugs").expect("bug doc");
    assert_eq!(bug.title, "db timeout notes");
    assert_eq!(bug.key().work_item, "crash-on-start");
}

#[test]
fn missing_root_and_categories_are_empty_not_errors() {
    let tmp = TempDir::new().unwrap();
    let loader = CorpusLoader::new(tmp.path().join("nope"), categories());
    assert!(!loader.corpus_exists());
    assert!(loader.parse_all().is_empty());

    write(tmp.path(), "bugs/one/a.md", "# A");
    let loader = CorpusLoader::new(tmp.path(), categories());
    let docs = loader.parse_all();
    assert_eq!(docs.len(), 1, "features/ is missing but bugs/ still loads");
}

#[test]
fn unreadable_file_is_skipped() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "features/item/good.md", "# Good");
    let bad = tmp.path().join("features/item/bad.md");
    fs::write(&bad, [0xffu8, 0xfe, 0x00, 0x9f]).unwrap();

    let docs = CorpusLoader::new(tmp.path(), categories()).parse_all();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].title, "Good");
}

#[test]
fn modified_since_filters_by_mtime() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "features/item/a.md", "# A");
    let loader = CorpusLoader::new(tmp.path(), categories());

    let past = Utc::now() - Duration::hours(1);
    assert_eq!(loader.get_modified_since(past).len(), 1);
    let future = Utc::now() + Duration::hours(1);
    assert!(loader.get_modified_since(future).is_empty());
}
