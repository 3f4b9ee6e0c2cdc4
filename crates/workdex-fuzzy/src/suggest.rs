use std::collections::{BTreeMap, HashSet};

use workdex_core::text::query_terms;

use crate::index::FuzzyIndex;

/// How many top fuzzy hits feed [`FuzzyIndex::related_terms`].
const RELATED_SAMPLE: usize = 10;

impl FuzzyIndex {
	/// Completions for a partially typed query.
	///
	/// Title words and keywords starting with `partial` come first, shortest
	/// first; whole titles containing `partial` follow.
	pub fn suggestions(&self, partial: &str, limit: usize) -> Vec<String> {
		let needle = partial.trim().to_lowercase();
		if needle.is_empty() || limit == 0 { return Vec::new(); }

		let mut seen = HashSet::new();
		let mut words: Vec<String> = Vec::new();
		let title_words = self.entries.iter().flat_map(|e| e.doc.title.split(|c: char| !(c.is_alphanumeric() || c == '-')));
		let keyword_words = self.entries.iter().flat_map(|e| e.doc.keywords.iter().map(String::as_str));
		for word in title_words.chain(keyword_words) {
			let lower = word.to_lowercase();
			if word.is_empty() || !lower.starts_with(&needle) { continue; }
			if seen.insert(lower) { words.push(word.to_string()); }
		}
		words.sort_by(|a, b| a.chars().count().cmp(&b.chars().count()).then_with(|| a.to_lowercase().cmp(&b.to_lowercase())));

		let mut titles: Vec<String> = self
			.entries
			.iter()
			.map(|e| e.doc.title.clone())
			.filter(|t| t.to_lowercase().contains(&needle))
			.filter(|t| seen.insert(t.to_lowercase()))
			.collect();
		titles.sort_by(|a, b| a.chars().count().cmp(&b.chars().count()).then_with(|| a.cmp(b)));

		words.into_iter().chain(titles).take(limit).collect()
	}

	/// Keywords that co-occur with `query` in the best fuzzy matches, most
	/// frequent first. Query words themselves are excluded.
	pub fn related_terms(&self, query: &str, limit: usize) -> Vec<String> {
		let query_words: HashSet<String> = query_terms(query).into_iter().collect();
		let hits = self.search(query, RELATED_SAMPLE);
		let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
		for hit in &hits {
			for kw in &hit.document.keywords {
				if !query_words.contains(kw) { *counts.entry(kw.as_str()).or_default() += 1; }
			}
		}
		let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
		ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
		ranked.into_iter().take(limit).map(|(k, _)| k.to_string()).collect()
	}
}
