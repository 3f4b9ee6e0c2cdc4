use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;

use workdex_core::config::EmbeddingProvider;

/// Turns query text into an embedding before it is sent to the vector
/// service. When no provider is configured the service receives the raw text
/// and embeds it with its own model.
#[async_trait]
pub trait EmbedProvider: Send + Sync {
    /// Stable identifier for the provider/model (e.g., `ollama:nomic-embed-text`).
    fn embedder_id(&self) -> &str;
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>>;
}

pub mod ollama;
pub mod openai;

/// Build the provider selected in config; `None` for `provider = "default"`.
pub fn from_settings(client: Client, settings: &EmbeddingProvider) -> Option<Box<dyn EmbedProvider>> {
    match settings {
        EmbeddingProvider::Ollama { base_url, model } => {
            Some(Box::new(ollama::OllamaProvider::new(client, base_url, model)))
        }
        EmbeddingProvider::OpenAi { base_url, model, api_key } => {
            Some(Box::new(openai::OpenAiProvider::new(client, base_url, model, api_key.clone())))
        }
        EmbeddingProvider::Default => None,
    }
}
