use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use workdex_core::config::{SearchSettings, Settings};
use workdex_core::corpus::CorpusLoader;
use workdex_core::error::{Error, Result};
use workdex_core::text::extract_keywords;
use workdex_core::traits::{DocumentIndex, VectorSearchClient};
use workdex_core::types::{
    Document, DocumentKey, Engine, EngineHit, EngineStatus, EngineStatusSet, IndexStats, SearchOptions, SearchResponse,
    VectorMatch, VectorQuery,
};
use workdex_fuzzy::FuzzyIndex;
use workdex_text::KeywordIndex;
use workdex_vector::HttpVectorClient;

use crate::fusion::fuse;
use crate::outcome::EngineOutcome;
use crate::weights::EngineWeights;

/// One complete build of the local indexes. Replaced wholesale, never
/// mutated.
struct Snapshot<K, F> {
    documents: Vec<Arc<Document>>,
    by_key: HashMap<DocumentKey, Arc<Document>>,
    keyword: std::result::Result<K, String>,
    fuzzy: std::result::Result<F, String>,
    built_at: DateTime<Utc>,
    stats: IndexStats,
}

impl<K: DocumentIndex, F: DocumentIndex> Snapshot<K, F> {
    fn build(documents: Vec<Document>, built_at: DateTime<Utc>) -> Self {
        let started = Instant::now();
        let documents: Vec<Arc<Document>> = documents.into_iter().map(Arc::new).collect();
        let by_key = documents.iter().map(|d| (d.key(), Arc::clone(d))).collect();
        let keyword = K::build(&documents).map_err(|e| format!("keyword index build failed: {e:#}"));
        let fuzzy = F::build(&documents).map_err(|e| format!("fuzzy index build failed: {e:#}"));

        let mut per_category: BTreeMap<String, usize> = BTreeMap::new();
        for d in &documents { *per_category.entry(d.category.clone()).or_default() += 1; }
        let stats = IndexStats { documents: documents.len(), per_category: per_category.into_iter().collect(), build_millis: started.elapsed().as_millis() };
        Self { documents, by_key, keyword, fuzzy, built_at, stats }
    }

    fn keys(&self) -> BTreeSet<&DocumentKey> { self.by_key.keys().collect() }

    fn local_status(&self, engine: Engine) -> EngineStatus {
        let built = match engine {
            Engine::Keyword => self.keyword.as_ref().map(|_| ()),
            Engine::Fuzzy => self.fuzzy.as_ref().map(|_| ()),
            Engine::Vector => return EngineStatus::unavailable(None),
        };
        match built {
            Err(e) => EngineStatus::unavailable(Some(e.clone())),
            Ok(()) if self.documents.is_empty() => EngineStatus::unavailable(Some("index is empty".into())),
            Ok(()) => EngineStatus::available(),
        }
    }
}

/// Validated form of [`SearchOptions`].
struct Request {
    category: Option<String>,
    limit: usize,
    threshold: f32,
}

/// Owns the corpus loader, the local indexes and the optional vector client,
/// and answers hybrid queries over them.
///
/// The keyword and fuzzy engines are type parameters so alternative
/// [`DocumentIndex`] implementations can be plugged in.
pub struct HybridOrchestrator<K = KeywordIndex, F = FuzzyIndex> {
    loader: Arc<CorpusLoader>,
    search: SearchSettings,
    vector: Option<Arc<dyn VectorSearchClient>>,
    vector_timeout: Duration,
    snapshot: RwLock<Option<Arc<Snapshot<K, F>>>>,
    build_lock: Mutex<()>,
}

impl HybridOrchestrator {
    pub fn new(loader: CorpusLoader, search: SearchSettings) -> Self { Self::with_engines(loader, search) }

    /// Wire everything from config. The HTTP vector client is created only
    /// when `vector.enabled` is set.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        settings.validate()?;
        let mut orchestrator = Self::new(CorpusLoader::from_settings(&settings.corpus), settings.search.clone());
        if settings.vector.enabled {
            let client = HttpVectorClient::from_settings(&settings.vector).map_err(|e| Error::InvalidConfig(format!("{e:#}")))?;
            orchestrator = orchestrator.with_vector_client(Arc::new(client), settings.vector.timeout());
        }
        Ok(orchestrator)
    }
}

impl<K: DocumentIndex, F: DocumentIndex> HybridOrchestrator<K, F> {
    pub fn with_engines(loader: CorpusLoader, search: SearchSettings) -> Self {
        Self {
            loader: Arc::new(loader),
            search,
            vector: None,
            vector_timeout: Duration::from_secs(5),
            snapshot: RwLock::new(None),
            build_lock: Mutex::new(()),
        }
    }

    pub fn with_vector_client(mut self, client: Arc<dyn VectorSearchClient>, timeout: Duration) -> Self {
        self.vector = Some(client);
        self.vector_timeout = timeout;
        self
    }

    fn current(&self) -> Option<Arc<Snapshot<K, F>>> {
        self.snapshot.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn install(&self, snapshot: Arc<Snapshot<K, F>>) {
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = Some(snapshot);
    }

    /// Read the whole corpus off the async runtime. The scan start time comes
    /// back with the documents and becomes the snapshot's `built_at`.
    async fn scan(&self) -> Result<(DateTime<Utc>, Vec<Document>)> {
        let loader = Arc::clone(&self.loader);
        tokio::task::spawn_blocking(move || (Utc::now(), loader.parse_all()))
            .await
            .map_err(|e| Error::IndexBuild(format!("corpus scan task failed: {e}")))
    }

    async fn build_snapshot(&self) -> Result<Arc<Snapshot<K, F>>> {
        if !self.loader.corpus_exists() {
            warn!(root = %self.loader.root().display(), "corpus root missing; indexing nothing");
        }
        let (scanned_at, documents) = self.scan().await?;
        self.build_snapshot_from(documents, scanned_at).await
    }

    async fn build_snapshot_from(&self, documents: Vec<Document>, built_at: DateTime<Utc>) -> Result<Arc<Snapshot<K, F>>> {
        let snapshot = tokio::task::spawn_blocking(move || Snapshot::<K, F>::build(documents, built_at))
            .await
            .map_err(|e| Error::IndexBuild(format!("index build task failed: {e}")))?;
        let snapshot = Arc::new(snapshot);
        info!(
            documents = snapshot.stats.documents,
            millis = snapshot.stats.build_millis as u64,
            categories = ?snapshot.stats.per_category,
            "local indexes built"
        );
        self.install(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    /// Build (or rebuild) the keyword and fuzzy indexes from the corpus and
    /// swap them in. Readers in flight keep the previous snapshot.
    ///
    /// The new snapshot is installed even when one engine fails to build; the
    /// failure is returned so callers can report it, and that engine shows up
    /// as unavailable in search status.
    pub async fn initialize(&self) -> Result<IndexStats> {
        let _guard = self.build_lock.lock().await;
        let snapshot = self.build_snapshot().await?;
        let errors: Vec<&str> = [snapshot.keyword.as_ref().err(), snapshot.fuzzy.as_ref().err()]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect();
        if !errors.is_empty() { return Err(Error::IndexBuild(errors.join("; "))); }
        Ok(snapshot.stats.clone())
    }

    /// Current snapshot, building one on first use.
    async fn ensure_snapshot(&self) -> Result<Arc<Snapshot<K, F>>> {
        if let Some(s) = self.current() { return Ok(s); }
        let _guard = self.build_lock.lock().await;
        if let Some(s) = self.current() { return Ok(s); }
        self.build_snapshot().await
    }

    /// Rebuild when files changed since the last build or documents were
    /// added, removed or renamed. Returns whether a rebuild happened.
    pub async fn update_index(&self) -> Result<bool> {
        let _guard = self.build_lock.lock().await;
        let Some(current) = self.current() else {
            self.build_snapshot().await?;
            return Ok(true);
        };
        let (scanned_at, documents) = self.scan().await?;
        let modified = documents.iter().filter(|d| d.last_modified > current.built_at).count();
        let fresh_keys: BTreeSet<DocumentKey> = documents.iter().map(Document::key).collect();
        let known_keys = current.keys();
        let layout_changed = fresh_keys.len() != known_keys.len() || fresh_keys.iter().any(|k| !known_keys.contains(k));
        if modified == 0 && !layout_changed {
            debug!("corpus unchanged; keeping current indexes");
            return Ok(false);
        }
        debug!(modified, layout_changed, "corpus changed; rebuilding");
        self.build_snapshot_from(documents, scanned_at).await?;
        Ok(true)
    }

    fn validate(&self, query: &str, opts: &SearchOptions) -> Result<Request> {
        if query.trim().is_empty() { return Err(Error::InvalidQuery("query must not be empty".into())); }
        let limit = opts.limit.unwrap_or(self.search.default_limit);
        if limit == 0 || limit > self.search.max_limit {
            return Err(Error::InvalidQuery(format!("limit must be in 1..={} (got {limit})", self.search.max_limit)));
        }
        let threshold = opts.threshold.unwrap_or(self.search.default_threshold);
        if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
            return Err(Error::InvalidQuery(format!("threshold must be within [0, 1] (got {threshold})")));
        }
        if let Some(category) = &opts.category {
            if !self.loader.categories().iter().any(|c| c == category) {
                return Err(Error::InvalidQuery(format!("unknown category '{category}'")));
            }
        }
        Ok(Request { category: opts.category.clone(), limit, threshold })
    }

    /// Run `query` against all three engines and fuse the results.
    ///
    /// Engine failures never fail the call; they show up in the returned
    /// status. Only invalid options are reported as errors.
    pub async fn search(&self, query: &str, opts: &SearchOptions) -> Result<SearchResponse> {
        let request = self.validate(query, opts)?;
        let snapshot = match self.ensure_snapshot().await {
            Ok(s) => Some(s),
            Err(e) => {
                warn!(error = %e, "local indexes unavailable");
                None
            }
        };

        let fetch = request.limit.saturating_mul(self.search.fetch_multiplier);
        // Local engines cannot filter by category themselves, so they scan the
        // whole corpus when a filter is present.
        let local_fetch = match (&request.category, &snapshot) {
            (Some(_), Some(s)) => s.documents.len().max(fetch),
            _ => fetch,
        };

        let (vector, keyword, fuzzy) = tokio::join!(
            self.run_vector(query, &request, fetch, snapshot.as_ref()),
            self.run_local(Engine::Keyword, query, local_fetch, snapshot.as_ref()),
            self.run_local(Engine::Fuzzy, query, local_fetch, snapshot.as_ref()),
        );
        let mut outcomes = [vector, keyword, fuzzy];
        if let Some(category) = &request.category {
            for outcome in &mut outcomes { outcome.retain_category(category); }
        }

        let mut status = EngineStatusSet::default();
        for outcome in &outcomes {
            if let Some(err) = &outcome.error { warn!(engine = %outcome.engine, error = %err, "engine failed"); }
            debug!(engine = %outcome.engine, hits = outcome.hits.len(), ms = outcome.elapsed_ms, "engine finished");
            status.set(outcome.engine, outcome.status());
        }
        let weights = EngineWeights::for_availability(status.vector.available, status.keyword.available, status.fuzzy.available);
        let results = fuse(&outcomes, &weights, query, self.search.snippet_length, request.limit);
        debug!(query, results = results.len(), ?weights, "hybrid search");
        Ok(SearchResponse { results, status })
    }

    async fn run_local(&self, engine: Engine, query: &str, limit: usize, snapshot: Option<&Arc<Snapshot<K, F>>>) -> EngineOutcome {
        let started = Instant::now();
        let Some(snapshot) = snapshot.cloned() else {
            return EngineOutcome::failure(engine, "index not initialized", 0);
        };
        let query = query.to_string();
        let task = tokio::task::spawn_blocking(move || -> std::result::Result<Vec<EngineHit>, String> {
            let hits = match engine {
                Engine::Keyword => snapshot.keyword.as_ref().map_err(Clone::clone)?.search(&query, limit),
                Engine::Fuzzy => snapshot.fuzzy.as_ref().map_err(Clone::clone)?.search(&query, limit),
                Engine::Vector => return Err("vector is not a local engine".into()),
            };
            hits.map_err(|e| format!("{e:#}"))
        });
        let elapsed = || started.elapsed().as_millis() as u64;
        match task.await {
            Ok(Ok(hits)) => EngineOutcome::success(engine, hits, elapsed()),
            Ok(Err(e)) => EngineOutcome::failure(engine, e, elapsed()),
            Err(e) => EngineOutcome::failure(engine, format!("{engine} search task failed: {e}"), elapsed()),
        }
    }

    async fn run_vector(&self, query: &str, request: &Request, limit: usize, snapshot: Option<&Arc<Snapshot<K, F>>>) -> EngineOutcome {
        let started = Instant::now();
        let Some(client) = &self.vector else {
            return EngineOutcome::failure(Engine::Vector, "vector search not configured", 0);
        };
        let opts = VectorQuery { category: request.category.clone(), limit, threshold: request.threshold };
        let elapsed = || started.elapsed().as_millis() as u64;
        match tokio::time::timeout(self.vector_timeout, client.search(query, &opts)).await {
            Ok(Ok(matches)) => {
                let hits = matches
                    .into_iter()
                    .filter(|m| m.similarity >= request.threshold)
                    .map(|m| vector_hit(m, snapshot.map(|s| &s.by_key)))
                    .collect();
                EngineOutcome::success(Engine::Vector, hits, elapsed())
            }
            Ok(Err(e)) => EngineOutcome::failure(Engine::Vector, format!("{e:#}"), elapsed()),
            Err(_) => EngineOutcome::failure(Engine::Vector, format!("vector search timed out after {}ms", self.vector_timeout.as_millis()), elapsed()),
        }
    }

    /// Per-engine availability without running a query. Does not build the
    /// local indexes.
    pub async fn get_engine_status(&self) -> EngineStatusSet {
        let mut status = EngineStatusSet::default();
        status.vector = match &self.vector {
            Some(client) => match tokio::time::timeout(self.vector_timeout, client.health_check()).await {
                Ok(true) => EngineStatus::available(),
                Ok(false) => EngineStatus::unavailable(Some("health check failed".into())),
                Err(_) => EngineStatus::unavailable(Some("health check timed out".into())),
            },
            None => EngineStatus::unavailable(Some("vector search not configured".into())),
        };
        match self.current() {
            Some(s) => {
                status.keyword = s.local_status(Engine::Keyword);
                status.fuzzy = s.local_status(Engine::Fuzzy);
            }
            None => {
                status.keyword = EngineStatus::unavailable(Some("index not initialized".into()));
                status.fuzzy = EngineStatus::unavailable(Some("index not initialized".into()));
            }
        }
        status
    }
}

impl<K: DocumentIndex> HybridOrchestrator<K, FuzzyIndex> {
    /// Completions for a partial query from the fuzzy index.
    pub async fn suggestions(&self, partial: &str, limit: usize) -> Vec<String> {
        match self.ensure_snapshot().await {
            Ok(s) => s.fuzzy.as_ref().map(|f| f.suggestions(partial, limit)).unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "suggestions unavailable");
                Vec::new()
            }
        }
    }

    /// Keywords that co-occur with `query` in the best fuzzy matches.
    pub async fn related_terms(&self, query: &str, limit: usize) -> Vec<String> {
        match self.ensure_snapshot().await {
            Ok(s) => s.fuzzy.as_ref().map(|f| f.related_terms(query, limit)).unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "related terms unavailable");
                Vec::new()
            }
        }
    }
}

/// Map a vector match onto a corpus document via its metadata, or synthesize
/// one from the match payload when the corpus does not know it.
fn vector_hit(m: VectorMatch, known: Option<&HashMap<DocumentKey, Arc<Document>>>) -> EngineHit {
    let key = DocumentKey::new(
        m.meta_str("category", "category").unwrap_or_default(),
        m.meta_str("work_item", "workItem").unwrap_or_default(),
        m.meta_str("file_name", "fileName").unwrap_or(&m.id),
    );
    let document = match known.and_then(|k| k.get(&key)) {
        Some(doc) => Arc::clone(doc),
        None => {
            let title = m.meta_str("title", "title").map(str::to_string).unwrap_or_else(|| m.id.clone());
            let file_path = m.meta_str("file_path", "filePath").map(PathBuf::from).unwrap_or_default();
            Arc::new(Document {
                keywords: extract_keywords(&title, &m.document),
                title,
                content: m.document.clone(),
                category: key.category.clone(),
                work_item: key.work_item.clone(),
                file_name: key.file_name.clone(),
                file_path,
                last_modified: DateTime::<Utc>::default(),
            })
        }
    };
    EngineHit { document_id: key, score: m.similarity, document, provenance: Vec::new() }
}
