use async_trait::async_trait;
use std::sync::Arc;

use crate::types::{Document, EngineHit, VectorMatch, VectorQuery};

/// An in-memory index built wholesale from a document set.
///
/// Implementations are immutable once built; a rebuild produces a new value
/// that callers swap in.
pub trait DocumentIndex: Send + Sync + 'static {
    fn build(documents: &[Arc<Document>]) -> anyhow::Result<Self>
    where
        Self: Sized;
    fn search(&self, query: &str, limit: usize) -> anyhow::Result<Vec<EngineHit>>;
}

/// Semantic search backed by an external service.
///
/// Any failure, including connectivity loss, is reported through the
/// returned `Result`; `health_check` never fails and answers `false` instead.
#[async_trait]
pub trait VectorSearchClient: Send + Sync {
    async fn search(&self, query: &str, opts: &VectorQuery) -> anyhow::Result<Vec<VectorMatch>>;
    async fn health_check(&self) -> bool;
}
