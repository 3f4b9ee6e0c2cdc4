use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::config::CorpusSettings;
use crate::text::{extract_h1, extract_keywords, title_from_file_name};
use crate::types::Document;

/// Scans `root/<category>/<work-item>/*.md` into [`Document`]s.
///
/// A missing root or category directory yields no documents for it, and a
/// file that can't be read is skipped; neither stops the scan.
#[derive(Debug, Clone)]
pub struct CorpusLoader {
    root: PathBuf,
    categories: Vec<String>,
}

impl CorpusLoader {
    pub fn new(root: impl Into<PathBuf>, categories: Vec<String>) -> Self { Self { root: root.into(), categories } }

    pub fn from_settings(settings: &CorpusSettings) -> Self { Self::new(settings.root_path(), settings.categories.clone()) }

    pub fn root(&self) -> &Path { &self.root }

    pub fn categories(&self) -> &[String] { &self.categories }

    pub fn corpus_exists(&self) -> bool { self.root.is_dir() }

    pub fn parse_all(&self) -> Vec<Document> {
        if !self.corpus_exists() {
            debug!(root = %self.root.display(), "corpus root missing; treating as empty");
            return Vec::new();
        }
        let mut documents = Vec::new();
        for category in &self.categories {
            documents.extend(self.parse_category(category));
        }
        debug!(count = documents.len(), root = %self.root.display(), "corpus scanned");
        documents
    }

    /// Documents whose modification time is strictly after `since`.
    pub fn get_modified_since(&self, since: DateTime<Utc>) -> Vec<Document> {
        self.parse_all().into_iter().filter(|d| d.last_modified > since).collect()
    }

    fn parse_category(&self, category: &str) -> Vec<Document> {
        let category_dir = self.root.join(category);
        if !category_dir.is_dir() {
            debug!(category, "category directory missing; skipping");
            return Vec::new();
        }
        let files = walkdir::WalkDir::new(&category_dir)
            .min_depth(2)
            .max_depth(2)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("md"));
        files.filter_map(|entry| self.parse_file(category, entry.path())).collect()
    }

    fn parse_file(&self, category: &str, path: &Path) -> Option<Document> {
        let work_item = path.parent()?.file_name()?.to_string_lossy().to_string();
        let file_name = path.file_name()?.to_string_lossy().to_string();
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => { warn!(path = %path.display(), error = %e, "skipping unreadable document"); return None; }
        };
        let last_modified = match fs::metadata(path).and_then(|m| m.modified()) {
            Ok(t) => DateTime::<Utc>::from(t),
            Err(e) => { warn!(path = %path.display(), error = %e, "skipping document without mtime"); return None; }
        };
        let title = extract_h1(&content).unwrap_or_else(|| title_from_file_name(&file_name));
        let keywords = extract_keywords(&title, &content);
        Some(Document {
            title,
            content,
            category: category.to_string(),
            work_item,
            file_name,
            file_path: path.to_path_buf(),
            keywords,
            last_modified,
        })
    }
}
