use std::cmp::Ordering;
use std::collections::BTreeMap;

use workdex_core::text::snippet;
use workdex_core::types::{DocumentKey, Engine, EngineHit, HybridResult};

use crate::outcome::EngineOutcome;
use crate::weights::EngineWeights;

struct Group<'a> {
    /// Best score per engine, indexed by [`slot`].
    per_engine: [Option<f32>; 3],
    engines: Vec<Engine>,
    best: &'a EngineHit,
    matches: Vec<String>,
}

impl Group<'_> {
    fn score(&self, weights: &EngineWeights) -> f32 {
        Engine::ALL.into_iter().filter_map(|e| self.per_engine[slot(e)].map(|s| s * weights.get(e))).sum()
    }
}

fn slot(engine: Engine) -> usize {
    match engine {
        Engine::Vector => 0,
        Engine::Keyword => 1,
        Engine::Fuzzy => 2,
    }
}

/// Merge per-engine hits into ranked hybrid results.
///
/// Hits are grouped by document key; each group scores
/// `sum(engine score * engine weight)`. An engine reporting the same document
/// more than once (e.g. several chunks of one file) counts only its best hit.
/// Display fields come from the hit with the highest pre-fusion score (earlier
/// engines win ties). Results are ordered by score, then key, and cut to
/// `limit`.
pub fn fuse(outcomes: &[EngineOutcome], weights: &EngineWeights, query: &str, snippet_length: usize, limit: usize) -> Vec<HybridResult> {
    let mut groups: BTreeMap<&DocumentKey, Group<'_>> = BTreeMap::new();
    for outcome in outcomes {
        let idx = slot(outcome.engine);
        for hit in &outcome.hits {
            let group = groups
                .entry(&hit.document_id)
                .or_insert_with(|| Group { per_engine: [None; 3], engines: Vec::new(), best: hit, matches: Vec::new() });
            let engine_best = &mut group.per_engine[idx];
            *engine_best = Some(engine_best.map_or(hit.score, |s| s.max(hit.score)));
            if !group.engines.contains(&outcome.engine) { group.engines.push(outcome.engine); }
            if hit.score > group.best.score { group.best = hit; }
            for tag in &hit.provenance {
                if !group.matches.contains(tag) { group.matches.push(tag.clone()); }
            }
        }
    }

    let mut ranked: Vec<(&DocumentKey, f32, Group<'_>)> = groups.into_iter().map(|(k, g)| (k, g.score(weights), g)).collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal).then_with(|| a.0.cmp(b.0)));
    ranked.truncate(limit);

    ranked
        .into_iter()
        .map(|(key, score, group)| {
            let doc = &group.best.document;
            HybridResult {
                id: key.to_string(),
                title: doc.title.clone(),
                content: doc.content.clone(),
                category: doc.category.clone(),
                work_item: doc.work_item.clone(),
                file_name: doc.file_name.clone(),
                file_path: doc.file_path.clone(),
                score,
                engines: group.engines,
                snippet: snippet(&doc.content, query, snippet_length),
                matches: if group.matches.is_empty() { None } else { Some(group.matches) },
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Arc;
    use workdex_core::types::Document;

    fn hit(work_item: &str, title: &str, score: f32, provenance: &[&str]) -> EngineHit {
        let doc = Document {
            title: title.to_string(),
            content: format!("{title} body text"),
            category: "features".into(),
            work_item: work_item.into(),
            file_name: "plan.md".into(),
            file_path: PathBuf::from(format!("features/{work_item}/plan.md")),
            keywords: Default::default(),
            last_modified: Default::default(),
        };
        EngineHit { document_id: doc.key(), score, document: Arc::new(doc), provenance: provenance.iter().map(|s| s.to_string()).collect() }
    }

    #[test]
    fn corroborated_document_outranks_single_engine() {
        let outcomes = vec![
            EngineOutcome::success(Engine::Keyword, vec![hit("a", "Alpha", 0.8, &["title:alpha"]), hit("b", "Beta", 0.9, &[])], 1),
            EngineOutcome::success(Engine::Fuzzy, vec![hit("a", "Alpha", 0.7, &["title:alpha"])], 1),
        ];
        let weights = EngineWeights::for_availability(false, true, true);
        let results = fuse(&outcomes, &weights, "alpha", 200, 10);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "features/a/plan.md");
        assert_eq!(results[0].engines, vec![Engine::Keyword, Engine::Fuzzy]);
        assert!((results[0].score - (0.8 * 0.6 + 0.7 * 0.4)).abs() < 1e-6);
        assert_eq!(results[0].matches.as_deref(), Some(&["title:alpha".to_string()][..]));
        assert!((results[1].score - 0.9 * 0.6).abs() < 1e-6);
        assert_eq!(results[1].matches, None);
    }

    #[test]
    fn representative_is_highest_pre_fusion_hit() {
        let outcomes = vec![
            EngineOutcome::success(Engine::Vector, vec![hit("a", "From vector", 0.4, &[])], 1),
            EngineOutcome::success(Engine::Keyword, vec![hit("a", "From keyword", 0.9, &[])], 1),
        ];
        let results = fuse(&outcomes, &EngineWeights::for_availability(true, true, false), "x", 200, 10);
        assert_eq!(results[0].title, "From keyword");
    }

    #[test]
    fn ties_break_by_id_and_limit_truncates() {
        let outcomes = vec![EngineOutcome::success(
            Engine::Fuzzy,
            vec![hit("c", "C", 0.5, &[]), hit("a", "A", 0.5, &[]), hit("b", "B", 0.5, &[])],
            1,
        )];
        let results = fuse(&outcomes, &EngineWeights::for_availability(false, false, true), "x", 200, 2);
        let ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["features/a/plan.md", "features/b/plan.md"]);
    }

    #[test]
    fn repeated_hits_from_one_engine_count_once() {
        let outcomes = vec![
            EngineOutcome::success(Engine::Vector, vec![hit("a", "Chunk zero", 0.9, &[]), hit("a", "Chunk one", 0.8, &[])], 1),
            EngineOutcome::success(Engine::Keyword, vec![hit("a", "Alpha", 0.5, &["title:alpha"])], 1),
        ];
        let weights = EngineWeights::for_availability(true, true, false);
        let results = fuse(&outcomes, &weights, "alpha", 200, 10);
        assert_eq!(results.len(), 1);
        assert!((results[0].score - (0.9 * 0.7 + 0.5 * 0.3)).abs() < 1e-6, "got {}", results[0].score);
        assert_eq!(results[0].engines, vec![Engine::Vector, Engine::Keyword]);
        assert_eq!(results[0].title, "Chunk zero");

        let vector_only = [EngineOutcome::success(Engine::Vector, vec![hit("a", "A", 0.9, &[]), hit("a", "A", 0.8, &[])], 1)];
        let results = fuse(&vector_only, &EngineWeights::for_availability(true, false, false), "x", 200, 10);
        assert!((results[0].score - 0.9).abs() < 1e-6);
        assert!(results[0].score <= 1.0);
    }

    #[test]
    fn no_outcomes_no_results() {
        assert!(fuse(&[], &EngineWeights::NONE, "x", 200, 10).is_empty());
    }
}
