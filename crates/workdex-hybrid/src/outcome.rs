use workdex_core::types::{Engine, EngineHit, EngineStatus};

/// What one engine produced for one query. Failures are values here; the
/// orchestrator never unwinds on an engine error.
#[derive(Debug, Clone)]
pub struct EngineOutcome {
    pub engine: Engine,
    pub hits: Vec<EngineHit>,
    pub error: Option<String>,
    pub elapsed_ms: u64,
}

impl EngineOutcome {
    pub fn success(engine: Engine, hits: Vec<EngineHit>, elapsed_ms: u64) -> Self {
        Self { engine, hits, error: None, elapsed_ms }
    }

    pub fn failure(engine: Engine, error: impl Into<String>, elapsed_ms: u64) -> Self {
        Self { engine, hits: Vec::new(), error: Some(error.into()), elapsed_ms }
    }

    /// An engine counts as available only when it answered without error and
    /// with at least one hit.
    pub fn is_available(&self) -> bool { self.error.is_none() && !self.hits.is_empty() }

    pub fn status(&self) -> EngineStatus {
        if self.is_available() { EngineStatus::available() } else { EngineStatus::unavailable(self.error.clone()) }
    }

    /// Drop hits outside `category`.
    pub fn retain_category(&mut self, category: &str) {
        self.hits.retain(|h| h.document_id.category == category);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_success_is_unavailable_without_error() {
        let outcome = EngineOutcome::success(Engine::Keyword, Vec::new(), 3);
        assert!(!outcome.is_available());
        assert_eq!(outcome.status(), EngineStatus::unavailable(None));
    }

    #[test]
    fn failure_carries_error() {
        let outcome = EngineOutcome::failure(Engine::Vector, "timed out", 5000);
        assert_eq!(outcome.status(), EngineStatus::unavailable(Some("timed out".into())));
    }
}
