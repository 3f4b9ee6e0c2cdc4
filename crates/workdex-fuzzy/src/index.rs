use anyhow::Result;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

use workdex_core::text::{title_from_file_name, word_tokens};
use workdex_core::traits::DocumentIndex;
use workdex_core::types::{Document, EngineHit};

use crate::similarity::best_match;

pub const TITLE_WEIGHT: f64 = 0.4;
pub const CONTENT_WEIGHT: f64 = 0.3;
pub const KEYWORDS_WEIGHT: f64 = 0.2;
pub const FILE_NAME_WEIGHT: f64 = 0.1;
/// Documents further than this from the query are dropped.
pub const MAX_DISTANCE: f64 = 0.8;

/// Pre-tokenized view of one document.
pub(crate) struct Entry {
	pub doc: Arc<Document>,
	pub title: Vec<String>,
	pub content: Vec<String>,
	pub keywords: Vec<String>,
	pub file_name: Vec<String>,
}

impl Entry {
	fn new(doc: &Arc<Document>) -> Self {
		let content: BTreeSet<String> = word_tokens(&doc.content).into_iter().collect();
		Self {
			doc: Arc::clone(doc),
			title: word_tokens(&doc.title),
			content: content.into_iter().collect(),
			keywords: doc.keywords.iter().cloned().collect(),
			file_name: word_tokens(&title_from_file_name(&doc.file_name)),
		}
	}

	fn fields(&self) -> [(&'static str, f64, &[String]); 4] {
		[
			("title", TITLE_WEIGHT, self.title.as_slice()),
			("content", CONTENT_WEIGHT, self.content.as_slice()),
			("keywords", KEYWORDS_WEIGHT, self.keywords.as_slice()),
			("fileName", FILE_NAME_WEIGHT, self.file_name.as_slice()),
		]
	}

	/// Weighted similarity in `0..=1` plus `field:token` provenance tags.
	fn score(&self, query_tokens: &[String]) -> (f64, Vec<String>) {
		let mut total = 0.0;
		let mut provenance = Vec::new();
		for (name, weight, tokens) in self.fields() {
			let mut field_total = 0.0;
			for q in query_tokens {
				if let Some((sim, token)) = best_match(q, tokens) {
					field_total += sim;
					provenance.push(format!("{name}:{token}"));
				}
			}
			total += weight * field_total / query_tokens.len() as f64;
		}
		(total, provenance)
	}
}

pub struct FuzzyIndex {
	pub(crate) entries: Vec<Entry>,
}

impl FuzzyIndex {
	pub fn new(documents: &[Arc<Document>]) -> Self {
		let entries = documents.iter().map(Entry::new).collect();
		debug!(documents = documents.len(), "fuzzy index built");
		Self { entries }
	}

	pub fn len(&self) -> usize { self.entries.len() }

	pub fn is_empty(&self) -> bool { self.entries.is_empty() }

	pub fn search(&self, query: &str, limit: usize) -> Vec<EngineHit> {
		let query_tokens = word_tokens(query);
		if query_tokens.is_empty() || limit == 0 { return Vec::new(); }
		let mut hits: Vec<EngineHit> = self
			.entries
			.iter()
			.filter_map(|e| {
				let (similarity, provenance) = e.score(&query_tokens);
				let distance = 1.0 - similarity;
				if distance > MAX_DISTANCE { return None; }
				Some(EngineHit { document_id: e.doc.key(), score: (1.0 - distance) as f32, document: Arc::clone(&e.doc), provenance })
			})
			.collect();
		hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal).then_with(|| a.document_id.cmp(&b.document_id)));
		hits.truncate(limit);
		debug!(query, hits = hits.len(), "fuzzy search");
		hits
	}
}

impl DocumentIndex for FuzzyIndex {
	fn build(documents: &[Arc<Document>]) -> Result<Self> { Ok(Self::new(documents)) }
	fn search(&self, query: &str, limit: usize) -> Result<Vec<EngineHit>> { Ok(Self::search(self, query, limit)) }
}
