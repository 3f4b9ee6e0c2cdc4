//! Configuration loader, typed settings and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env vars
//! (nested keys separated by `__`, e.g. `APP_SEARCH__DEFAULT_LIMIT=20`).
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::new().merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.settings()?;
        Ok(config)
    }

    pub fn from_figment(figment: Figment) -> Self { Self { figment } }

    /// Extract and validate the typed settings tree.
    pub fn settings(&self) -> Result<Settings> {
        let settings: Settings = self.figment.extract().map_err(|e| Error::InvalidConfig(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub corpus: CorpusSettings,
    pub search: SearchSettings,
    pub vector: VectorSettings,
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        if self.corpus.categories.is_empty() {
            return Err(Error::InvalidConfig("corpus.categories must not be empty".into()));
        }
        if self.corpus.categories.iter().any(|c| c.trim().is_empty() || c.contains(['/', '\\'])) {
            return Err(Error::InvalidConfig("corpus.categories must be plain directory names".into()));
        }
        let s = &self.search;
        if s.default_limit == 0 || s.default_limit > s.max_limit {
            return Err(Error::InvalidConfig(format!(
                "search.default_limit must be in 1..={} (got {})", s.max_limit, s.default_limit
            )));
        }
        if !(0.0..=1.0).contains(&s.default_threshold) {
            return Err(Error::InvalidConfig(format!("search.default_threshold must be in [0, 1] (got {})", s.default_threshold)));
        }
        if s.snippet_length == 0 { return Err(Error::InvalidConfig("search.snippet_length must be positive".into())); }
        if s.fetch_multiplier == 0 { return Err(Error::InvalidConfig("search.fetch_multiplier must be positive".into())); }
        if self.vector.enabled && self.vector.base_url.trim().is_empty() {
            return Err(Error::InvalidConfig("vector.base_url is required when vector search is enabled".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusSettings {
    pub root: String,
    pub categories: Vec<String>,
}

impl CorpusSettings {
    /// Corpus root with `~` and environment variables expanded.
    pub fn root_path(&self) -> PathBuf { expand_path(&self.root) }
}

impl Default for CorpusSettings {
    fn default() -> Self {
        Self {
            root: "./work-items".to_string(),
            categories: ["features", "bugs", "tasks", "docs"].iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub default_limit: usize,
    pub max_limit: usize,
    pub default_threshold: f32,
    pub snippet_length: usize,
    /// Each engine is asked for `limit * fetch_multiplier` hits before fusion.
    pub fetch_multiplier: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self { default_limit: 10, max_limit: 100, default_threshold: 0.0, snippet_length: 200, fetch_multiplier: 2 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorSettings {
    pub enabled: bool,
    pub base_url: String,
    pub collection: String,
    pub timeout_ms: u64,
    pub embedding: EmbeddingProvider,
}

impl VectorSettings {
    pub fn timeout(&self) -> Duration { Duration::from_millis(self.timeout_ms) }
}

impl Default for VectorSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "http://localhost:8000".to_string(),
            collection: "work_items".to_string(),
            timeout_ms: 5_000,
            embedding: EmbeddingProvider::Default,
        }
    }
}

/// How query text is turned into an embedding before hitting the vector
/// service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum EmbeddingProvider {
    Ollama {
        #[serde(default = "default_ollama_url")]
        base_url: String,
        #[serde(default = "default_ollama_model")]
        model: String,
    },
    #[serde(rename = "openai")]
    OpenAi {
        #[serde(default = "default_openai_url")]
        base_url: String,
        #[serde(default = "default_openai_model")]
        model: String,
        /// Falls back to `OPENAI_API_KEY` when unset.
        #[serde(default)]
        api_key: Option<String>,
    },
    /// The vector service embeds `query_texts` itself.
    Default,
}

fn default_ollama_url() -> String { "http://localhost:11434".to_string() }
fn default_ollama_model() -> String { "nomic-embed-text".to_string() }
fn default_openai_url() -> String { "https://api.openai.com/v1".to_string() }
fn default_openai_model() -> String { "text-embedding-3-small".to_string() }

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_toml(src: &str) -> Config { Config::from_figment(Figment::new().merge(Toml::string(src))) }

    #[test]
    fn empty_config_yields_defaults() {
        let settings = from_toml("").settings().expect("settings");
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.search.default_limit, 10);
        assert_eq!(settings.vector.embedding, EmbeddingProvider::Default);
    }

    #[test]
    fn provider_is_a_tagged_enum() {
        let cfg = from_toml(
            r#"
            [vector.embedding]
            provider = "ollama"
            model = "mxbai-embed-large"
            "#,
        );
        let settings = cfg.settings().expect("settings");
        assert_eq!(
            settings.vector.embedding,
            EmbeddingProvider::Ollama { base_url: "http://localhost:11434".into(), model: "mxbai-embed-large".into() }
        );

        let cfg = from_toml("[vector.embedding]\nprovider = \"openai\"\n");
        match cfg.settings().expect("settings").vector.embedding {
            EmbeddingProvider::OpenAi { model, api_key, .. } => {
                assert_eq!(model, "text-embedding-3-small");
                assert!(api_key.is_none());
            }
            other => panic!("unexpected provider {other:?}"),
        }
    }

    #[test]
    fn rejects_inconsistent_limits() {
        let err = from_toml("[search]\ndefault_limit = 500\nmax_limit = 100\n").settings().unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
        let err = from_toml("[corpus]\ncategories = []\n").settings().unwrap_err();
        assert!(err.to_string().contains("categories"));
    }

    #[test]
    fn corpus_root_expands_env_vars() {
        std::env::set_var("WORKDEX_TEST_CORPUS_ROOT", "/srv/items");
        let settings = from_toml("[corpus]\nroot = \"${WORKDEX_TEST_CORPUS_ROOT}/work\"\n").settings().expect("settings");
        assert_eq!(settings.corpus.root_path(), PathBuf::from("/srv/items/work"));

        let plain = from_toml("[corpus]\nroot = \"/abs/items\"\n").settings().expect("settings");
        assert_eq!(plain.corpus.root_path(), PathBuf::from("/abs/items"));
    }
}
