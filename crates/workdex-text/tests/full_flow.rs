use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use workdex_core::text::extract_keywords;
use workdex_core::traits::DocumentIndex;
use workdex_core::types::Document;
use workdex_text::KeywordIndex;

fn doc(category: &str, work_item: &str, file_name: &str, title: &str, content: &str) -> Arc<Document> {
    Arc::new(Document {
        title: title.to_string(),
        content: content.to_string(),
        category: category.to_string(),
        work_item: work_item.to_string(),
        file_name: file_name.to_string(),
        file_path: PathBuf::from(format!("/corpus/{category}/{work_item}/{file_name}")),
        keywords: extract_keywords(title, content),
        last_modified: Utc::now(),
    })
}

fn corpus() -> Vec<Arc<Document>> {
    vec![
        doc("features", "auth-refactor", "plan.md", "Auth Refactor", "Refactor the login module"),
        doc("docs", "guides", "authentication.md", "Authentication Guide", "How tokens are issued and refreshed"),
        doc("bugs", "db-timeout", "db-timeout.md", "Database timeout", "The database pool times out under load"),
        doc("tasks", "cleanup", "notes.md", "Cleanup", "Remove dead code from the login page"),
    ]
}

#[test]
fn keyword_full_flow() {
    let index = KeywordIndex::build(&corpus()).expect("build");
    assert_eq!(index.len(), 4);

    let hits = index.search("login", 10).expect("search");
    let items: Vec<&str> = hits.iter().map(|h| h.document_id.work_item.as_str()).collect();
    assert_eq!(hits.len(), 2, "{items:?}");
    assert!(items.contains(&"auth-refactor") && items.contains(&"cleanup"));
    for w in hits.windows(2) { assert!(w[0].score >= w[1].score); }

    assert!(index.search("zebra", 10).expect("search").is_empty());
}

#[test]
fn substring_matches_are_recalled() {
    let index = KeywordIndex::build(&corpus()).expect("build");
    let hits = index.search("auth", 10).expect("search");
    let items: Vec<&str> = hits.iter().map(|h| h.document_id.work_item.as_str()).collect();
    assert!(items.contains(&"auth-refactor"));
    assert!(items.contains(&"guides"), "'auth' is a substring of 'Authentication': {items:?}");
    let guide = hits.iter().find(|h| h.document_id.work_item == "guides").expect("guide");
    assert!(guide.provenance.contains(&"title:auth".to_string()));
    assert!(guide.provenance.contains(&"fileName:auth".to_string()));
}

#[test]
fn exact_title_query_scores_highest() {
    let index = KeywordIndex::build(&corpus()).expect("build");
    let hits = index.search("Database timeout", 10).expect("search");
    assert_eq!(hits[0].document_id.work_item, "db-timeout");
    assert!(hits.iter().skip(1).all(|h| h.score <= hits[0].score));
    // title 3+3, fileName 2, keywords 2+2, content 0.5 already exceed the cap
    assert!((hits[0].score - 1.0).abs() < 1e-6, "got {}", hits[0].score);
}

#[test]
fn short_query_words_fall_back_to_full_scan() {
    let index = KeywordIndex::build(&corpus()).expect("build");
    let hits = index.search("db", 10).expect("search");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].document_id.work_item, "db-timeout");
    assert_eq!(hits[0].provenance, vec!["fileName:db".to_string()]);
}

#[test]
fn limit_truncates_and_empty_corpus_is_fine() {
    let index = KeywordIndex::build(&corpus()).expect("build");
    assert_eq!(index.search("the", 1).expect("search").len(), 1);
    let empty = KeywordIndex::build(&[]).expect("build");
    assert!(empty.is_empty());
    assert!(empty.search("anything", 5).expect("search").is_empty());
}
