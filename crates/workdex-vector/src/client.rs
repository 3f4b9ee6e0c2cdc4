use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use workdex_core::config::{EmbeddingProvider, VectorSettings};
use workdex_core::traits::VectorSearchClient;
use workdex_core::types::{VectorMatch, VectorQuery};

use crate::embed_provider::{self, EmbedProvider};

const API_PREFIX: &str = "/api/v1";

#[derive(Deserialize)]
struct CollectionInfo {
    id: String,
}

/// Column-major query response; the outer vectors have one entry per query
/// embedding and we always send exactly one.
#[derive(Deserialize)]
struct QueryResponse {
    ids: Vec<Vec<String>>,
    #[serde(default)]
    documents: Option<Vec<Vec<Option<String>>>>,
    #[serde(default)]
    metadatas: Option<Vec<Vec<Option<Map<String, Value>>>>>,
    #[serde(default)]
    distances: Option<Vec<Vec<f32>>>,
}

impl QueryResponse {
    fn into_matches(self, threshold: f32) -> Vec<VectorMatch> {
        let ids = self.ids.into_iter().next().unwrap_or_default();
        let mut documents = self.documents.and_then(|d| d.into_iter().next()).unwrap_or_default().into_iter();
        let mut metadatas = self.metadatas.and_then(|m| m.into_iter().next()).unwrap_or_default().into_iter();
        let mut distances = self.distances.and_then(|d| d.into_iter().next()).unwrap_or_default().into_iter();

        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            let document = documents.next().flatten().unwrap_or_default();
            let metadata = metadatas.next().flatten().unwrap_or_default();
            let similarity = match distances.next() {
                Some(d) => (1.0 - d).clamp(0.0, 1.0),
                None => 0.0,
            };
            if similarity < threshold { continue; }
            out.push(VectorMatch { id, similarity, document, metadata });
        }
        out
    }
}

/// `VectorSearchClient` over the REST API of a Chroma-compatible service.
pub struct HttpVectorClient {
    client: Client,
    base_url: String,
    collection: String,
    collection_id: OnceCell<String>,
    embedder: Option<Box<dyn EmbedProvider>>,
}

impl HttpVectorClient {
    pub fn new(base_url: &str, collection: &str, timeout: Duration, embedding: &EmbeddingProvider) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build().context("building http client")?;
        let embedder = embed_provider::from_settings(client.clone(), embedding);
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            collection: collection.to_string(),
            collection_id: OnceCell::new(),
            embedder,
        })
    }

    pub fn from_settings(settings: &VectorSettings) -> Result<Self> {
        Self::new(&settings.base_url, &settings.collection, settings.timeout(), &settings.embedding)
    }

    fn url(&self, path: &str) -> String { format!("{}{}{}", self.base_url, API_PREFIX, path) }

    /// The collection id is looked up once and reused; failed lookups are
    /// retried on the next call.
    async fn collection_id(&self) -> Result<&str> {
        let id = self
            .collection_id
            .get_or_try_init(|| async {
                let url = self.url(&format!("/collections/{}", self.collection));
                let info: CollectionInfo = self
                    .client
                    .get(&url)
                    .send()
                    .await
                    .with_context(|| format!("GET {url}"))?
                    .error_for_status()
                    .with_context(|| format!("collection '{}' not available", self.collection))?
                    .json()
                    .await
                    .context("decoding collection info")?;
                debug!(collection = %self.collection, id = %info.id, "resolved vector collection");
                Ok::<_, anyhow::Error>(info.id)
            })
            .await?;
        Ok(id.as_str())
    }

    async fn query_body(&self, query: &str, opts: &VectorQuery) -> Result<Value> {
        let mut body = json!({
            "n_results": opts.limit,
            "include": ["documents", "metadatas", "distances"],
        });
        match &self.embedder {
            Some(embedder) => {
                let embedding = embedder
                    .embed_query(query)
                    .await
                    .with_context(|| format!("embedding query with {}", embedder.embedder_id()))?;
                body["query_embeddings"] = json!([embedding]);
            }
            None => body["query_texts"] = json!([query]),
        }
        if let Some(category) = &opts.category {
            body["where"] = json!({ "category": category });
        }
        Ok(body)
    }
}

#[async_trait]
impl VectorSearchClient for HttpVectorClient {
    async fn search(&self, query: &str, opts: &VectorQuery) -> Result<Vec<VectorMatch>> {
        if opts.limit == 0 { return Ok(Vec::new()); }
        let id = self.collection_id().await?;
        let body = self.query_body(query, opts).await?;
        let url = self.url(&format!("/collections/{id}/query"));
        let resp = self.client.post(&url).json(&body).send().await.with_context(|| format!("POST {url}"))?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(anyhow!("vector query failed with {status}: {text}"));
        }
        let parsed: QueryResponse = resp.json().await.context("decoding vector query response")?;
        let matches = parsed.into_matches(opts.threshold);
        debug!(query, matches = matches.len(), "vector search");
        Ok(matches)
    }

    async fn health_check(&self) -> bool {
        let url = self.url("/heartbeat");
        match self.client.get(&url).send().await {
            Ok(resp) if resp.status().is_success() => true,
            Ok(resp) => {
                warn!(status = %resp.status(), "vector heartbeat failed");
                false
            }
            Err(e) => {
                warn!(error = %e, "vector service unreachable");
                false
            }
        }
    }
}
