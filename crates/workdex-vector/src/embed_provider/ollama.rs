//! Ollama embeddings: `POST {base}/api/embeddings {model, prompt}`.
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::EmbedProvider;

#[derive(Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

pub struct OllamaProvider {
    client: Client,
    url: String,
    model: String,
    id: String,
}

impl OllamaProvider {
    pub fn new(client: Client, base_url: &str, model: &str) -> Self {
        let url = format!("{}/api/embeddings", base_url.trim_end_matches('/'));
        Self { client, url, model: model.to_string(), id: format!("ollama:{model}") }
    }
}

#[async_trait]
impl EmbedProvider for OllamaProvider {
    fn embedder_id(&self) -> &str { &self.id }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let resp: EmbeddingResponse = self
            .client
            .post(&self.url)
            .json(&json!({ "model": self.model, "prompt": text }))
            .send()
            .await
            .with_context(|| format!("embedding request to {}", self.url))?
            .error_for_status()?
            .json()
            .await
            .context("decoding ollama embedding")?;
        Ok(resp.embedding)
    }
}
