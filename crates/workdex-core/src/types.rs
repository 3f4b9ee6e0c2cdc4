//! Domain types shared by the corpus loader, the three engines and the
//! hybrid orchestrator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Composite identity of a document: `(category, work_item, file_name)`.
///
/// Used as the grouping key when merging hits from different engines, so
/// names containing separator characters can never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentKey {
    pub category: String,
    pub work_item: String,
    pub file_name: String,
}

impl DocumentKey {
    pub fn new(category: impl Into<String>, work_item: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self { category: category.into(), work_item: work_item.into(), file_name: file_name.into() }
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.category, self.work_item, self.file_name)
    }
}

/// A parsed markdown file belonging to a work item.
///
/// - `title`: first H1 heading, or the file stem with separators spaced out
/// - `content`: raw file text
/// - `keywords`: deduplicated lowercase tokens (see [`crate::text::extract_keywords`])
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub title: String,
    pub content: String,
    pub category: String,
    pub work_item: String,
    pub file_name: String,
    pub file_path: PathBuf,
    pub keywords: BTreeSet<String>,
    pub last_modified: DateTime<Utc>,
}

impl Document {
    pub fn key(&self) -> DocumentKey {
        DocumentKey::new(self.category.clone(), self.work_item.clone(), self.file_name.clone())
    }
}

/// Indicates which engine produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    Vector,
    Keyword,
    Fuzzy,
}

impl Engine {
    pub const ALL: [Engine; 3] = [Engine::Vector, Engine::Keyword, Engine::Fuzzy];

    pub fn as_str(self) -> &'static str {
        match self {
            Engine::Vector => "vector",
            Engine::Keyword => "keyword",
            Engine::Fuzzy => "fuzzy",
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Raw result from a single engine. `score` is in `0..=1` but only
/// comparable within the same engine.
#[derive(Debug, Clone)]
pub struct EngineHit {
    pub document_id: DocumentKey,
    pub score: f32,
    pub document: Arc<Document>,
    pub provenance: Vec<String>,
}

/// Availability of one engine for one query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStatus {
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EngineStatus {
    pub fn available() -> Self { Self { available: true, error: None } }

    pub fn unavailable(error: Option<String>) -> Self { Self { available: false, error } }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStatusSet {
    pub vector: EngineStatus,
    pub keyword: EngineStatus,
    pub fuzzy: EngineStatus,
}

impl EngineStatusSet {
    pub fn get(&self, engine: Engine) -> &EngineStatus {
        match engine {
            Engine::Vector => &self.vector,
            Engine::Keyword => &self.keyword,
            Engine::Fuzzy => &self.fuzzy,
        }
    }

    pub fn set(&mut self, engine: Engine, status: EngineStatus) {
        match engine {
            Engine::Vector => self.vector = status,
            Engine::Keyword => self.keyword = status,
            Engine::Fuzzy => self.fuzzy = status,
        }
    }
}

/// A fused, ranked result returned to callers of the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HybridResult {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: String,
    pub work_item: String,
    pub file_name: String,
    pub file_path: PathBuf,
    pub score: f32,
    pub engines: Vec<Engine>,
    pub snippet: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matches: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub results: Vec<HybridResult>,
    pub status: EngineStatusSet,
}

/// Caller-supplied knobs for a hybrid search. Unset fields fall back to the
/// configured defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchOptions {
    pub category: Option<String>,
    pub limit: Option<usize>,
    pub threshold: Option<f32>,
}

impl SearchOptions {
    pub fn with_category(mut self, category: impl Into<String>) -> Self { self.category = Some(category.into()); self }

    pub fn with_limit(mut self, limit: usize) -> Self { self.limit = Some(limit); self }

    pub fn with_threshold(mut self, threshold: f32) -> Self { self.threshold = Some(threshold); self }
}

/// Query parameters handed to a [`crate::traits::VectorSearchClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct VectorQuery {
    pub category: Option<String>,
    pub limit: usize,
    pub threshold: f32,
}

/// One semantic match as reported by the vector service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorMatch {
    pub id: String,
    pub similarity: f32,
    pub document: String,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl VectorMatch {
    /// Read a string metadata field, accepting both `snake_case` and
    /// `camelCase` spellings.
    pub fn meta_str(&self, snake: &str, camel: &str) -> Option<&str> {
        self.metadata.get(snake).or_else(|| self.metadata.get(camel)).and_then(serde_json::Value::as_str)
    }
}

/// Summary of one index build.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IndexStats {
    pub documents: usize,
    pub per_category: Vec<(String, usize)>,
    pub build_millis: u128,
}
