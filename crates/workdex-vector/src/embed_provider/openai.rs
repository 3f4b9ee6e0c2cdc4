//! OpenAI-compatible embeddings: `POST {base}/embeddings {model, input}`.
//!
//! The bearer key comes from config, falling back to `OPENAI_API_KEY` at
//! request time.
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::EmbedProvider;

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

pub struct OpenAiProvider {
    client: Client,
    url: String,
    model: String,
    api_key: Option<String>,
    id: String,
}

impl OpenAiProvider {
    pub fn new(client: Client, base_url: &str, model: &str, api_key: Option<String>) -> Self {
        let url = format!("{}/embeddings", base_url.trim_end_matches('/'));
        Self { client, url, model: model.to_string(), api_key, id: format!("openai:{model}") }
    }

    fn key(&self) -> Result<String> {
        match &self.api_key {
            Some(k) => Ok(k.clone()),
            None => std::env::var("OPENAI_API_KEY")
                .map_err(|_| anyhow!("no OpenAI API key (set vector.embedding.api_key or OPENAI_API_KEY)")),
        }
    }
}

#[async_trait]
impl EmbedProvider for OpenAiProvider {
    fn embedder_id(&self) -> &str { &self.id }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let resp: EmbeddingsResponse = self
            .client
            .post(&self.url)
            .bearer_auth(self.key()?)
            .json(&json!({ "model": self.model, "input": text }))
            .send()
            .await
            .with_context(|| format!("embedding request to {}", self.url))?
            .error_for_status()?
            .json()
            .await
            .context("decoding openai embedding")?;
        let first = resp.data.into_iter().next().ok_or_else(|| anyhow!("embedding response contained no data"))?;
        Ok(first.embedding)
    }
}
