use workdex_core::types::Engine;

/// Per-engine fusion weights, chosen from which engines are available for the
/// current query. Weights are not renormalized per document: an engine that
/// did not hit a document simply contributes nothing to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineWeights {
    pub vector: f32,
    pub keyword: f32,
    pub fuzzy: f32,
}

impl EngineWeights {
    pub const NONE: Self = Self { vector: 0.0, keyword: 0.0, fuzzy: 0.0 };

    pub fn for_availability(vector: bool, keyword: bool, fuzzy: bool) -> Self {
        let (v, k, f) = match (vector, keyword, fuzzy) {
            (true, true, true) => (0.5, 0.3, 0.2),
            (false, true, true) => (0.0, 0.6, 0.4),
            (true, false, true) => (0.7, 0.0, 0.3),
            (true, true, false) => (0.7, 0.3, 0.0),
            (true, false, false) => (1.0, 0.0, 0.0),
            (false, true, false) => (0.0, 1.0, 0.0),
            (false, false, true) => (0.0, 0.0, 1.0),
            (false, false, false) => return Self::NONE,
        };
        Self { vector: v, keyword: k, fuzzy: f }
    }

    pub fn get(&self, engine: Engine) -> f32 {
        match engine {
            Engine::Vector => self.vector,
            Engine::Keyword => self.keyword,
            Engine::Fuzzy => self.fuzzy,
        }
    }
}
