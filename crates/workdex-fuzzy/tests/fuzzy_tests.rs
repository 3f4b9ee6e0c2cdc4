use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use workdex_core::text::extract_keywords;
use workdex_core::types::Document;
use workdex_fuzzy::FuzzyIndex;

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

fn index() -> FuzzyIndex {
    FuzzyIndex::new(&[
        doc("features", "auth-refactor", "plan.md", "Auth Refactor", "Refactor the login module"),
        doc("docs", "guides", "authentication.md", "Authentication Guide", "How tokens are issued and refreshed"),
        doc("bugs", "db-timeout", "db-timeout.md", "Database timeout", "The database pool times out under load"),
    ])
}

#[test]
fn ranks_closest_document_first() {
    let hits = index().search("Auth Refactor", 10);
    assert_eq!(hits[0].document_id.work_item, "auth-refactor");
    assert!((hits[0].score - 0.75).abs() < 1e-6, "got {}", hits[0].score);
    assert!(hits.iter().all(|h| h.document_id.work_item != "db-timeout"));
    assert!(hits[0].provenance.contains(&"title:auth".to_string()));
}

#[test]
fn tolerates_typos() {
    let hits = index().search("databse", 10);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].document_id.work_item, "db-timeout");
    assert!(hits[0].score >= 0.2 && hits[0].score < 1.0);
}

#[test]
fn weak_matches_are_rejected() {
    let idx = index();
    assert!(idx.search("zebra crossing", 10).is_empty());
    // a file-name-only match carries at most 0.1 and falls under the cut-off
    assert!(idx.search("plan", 10).is_empty());
    assert!(idx.search("   ", 10).is_empty());
}

#[test]
fn suggestions_prefer_short_words_then_titles() {
    let s = index().suggestions("aut", 10);
    assert_eq!(s, vec!["Auth", "Authentication", "Auth Refactor", "Authentication Guide"]);
    assert_eq!(index().suggestions("aut", 1), vec!["Auth"]);
    assert!(index().suggestions("", 5).is_empty());
}

#[test]
fn related_terms_come_from_matching_documents() {
    let terms = index().related_terms("auth", 10);
    assert!(terms.contains(&"refactor".to_string()));
    assert!(terms.contains(&"authentication".to_string()));
    assert!(!terms.contains(&"auth".to_string()));
    assert!(!terms.contains(&"database".to_string()));
    assert_eq!(index().related_terms("auth", 2).len(), 2);
}
