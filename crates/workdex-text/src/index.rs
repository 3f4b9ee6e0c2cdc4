use anyhow::Result;
use std::collections::BTreeSet;
use std::sync::Arc;
use tantivy::collector::DocSetCollector;
use tantivy::query::{BooleanQuery, Occur, Query, TermQuery};
use tantivy::schema::{Field, IndexRecordOption, Value};
use tantivy::{doc, Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term};
use tracing::debug;

use workdex_core::traits::DocumentIndex;
use workdex_core::types::{Document, EngineHit};

use crate::search::score_document;
use crate::tantivy_utils::{build_schema, register_tokenizer, trigrams, TEXT_FIELDS};

/// Lowercased copies of the searchable fields, computed once per build.
pub(crate) struct PreparedFields {
	pub title: String,
	pub file_name: String,
	pub content: String,
}

pub struct KeywordIndex {
	documents: Vec<Arc<Document>>,
	prepared: Vec<PreparedFields>,
	reader: IndexReader,
	doc_idx_field: Field,
	text_fields: Vec<Field>,
}

impl KeywordIndex {
	pub fn new(documents: &[Arc<Document>]) -> Result<Self> {
		let schema = build_schema();
		let index = Index::create_in_ram(schema.clone());
		register_tokenizer(&index)?;
		let doc_idx_field = schema.get_field("doc_idx")?;
		let text_fields = TEXT_FIELDS.iter().map(|name| schema.get_field(name)).collect::<tantivy::Result<Vec<_>>>()?;

		let mut index_writer: IndexWriter = index.writer_with_num_threads(1, 50_000_000)?;
		for (i, d) in documents.iter().enumerate() {
			let keywords = d.keywords.iter().cloned().collect::<Vec<_>>().join(" ");
			index_writer.add_document(doc!(
				doc_idx_field => i as u64,
				text_fields[0] => d.title.clone(),
				text_fields[1] => d.content.clone(),
				text_fields[2] => keywords,
				text_fields[3] => d.file_name.clone(),
			))?;
		}
		index_writer.commit()?;
		let reader = index.reader_builder().reload_policy(ReloadPolicy::Manual).try_into()?;

		let prepared = documents
			.iter()
			.map(|d| PreparedFields { title: d.title.to_lowercase(), file_name: d.file_name.to_lowercase(), content: d.content.to_lowercase() })
			.collect();
		debug!(documents = documents.len(), "keyword index built");
		Ok(Self { documents: documents.to_vec(), prepared, reader, doc_idx_field, text_fields })
	}

	pub fn len(&self) -> usize { self.documents.len() }

	pub fn is_empty(&self) -> bool { self.documents.is_empty() }

	/// Indices of documents that may contain at least one of `words` as a
	/// substring of a searchable field. Words shorter than a trigram can't be
	/// narrowed by the index, so their presence makes every document a candidate.
	fn candidates(&self, words: &[String]) -> Result<BTreeSet<usize>> {
		if words.iter().any(|w| trigrams(w).is_empty()) { return Ok((0..self.documents.len()).collect()); }
		let mut out = BTreeSet::new();
		let searcher = self.reader.searcher();
		for word in words {
			// A substring match needs every trigram of the word in the same field.
			let per_field: Vec<(Occur, Box<dyn Query>)> = self
				.text_fields
				.iter()
				.map(|&field| {
					let all_grams: Vec<(Occur, Box<dyn Query>)> = trigrams(word)
						.into_iter()
						.map(|g| (Occur::Must, Box::new(TermQuery::new(Term::from_field_text(field, &g), IndexRecordOption::Basic)) as Box<dyn Query>))
						.collect();
					(Occur::Should, Box::new(BooleanQuery::new(all_grams)) as Box<dyn Query>)
				})
				.collect();
			let query = BooleanQuery::new(per_field);
			for addr in searcher.search(&query, &DocSetCollector)? {
				let doc: TantivyDocument = searcher.doc(addr)?;
				if let Some(idx) = doc.get_first(self.doc_idx_field).and_then(|v| v.as_u64()) { out.insert(idx as usize); }
			}
		}
		Ok(out)
	}

	pub fn search(&self, query: &str, limit: usize) -> Result<Vec<EngineHit>> {
		let words = workdex_core::text::query_terms(query);
		if words.is_empty() || limit == 0 { return Ok(Vec::new()); }
		let candidates = self.candidates(&words)?;
		let mut hits: Vec<EngineHit> = candidates
			.into_iter()
			.filter_map(|i| {
				let doc = &self.documents[i];
				let scored = score_document(&words, &self.prepared[i], &doc.keywords)?;
				Some(EngineHit { document_id: doc.key(), score: scored.score, document: Arc::clone(doc), provenance: scored.provenance })
			})
			.collect();
		hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal).then_with(|| a.document_id.cmp(&b.document_id)));
		hits.truncate(limit);
		debug!(query, hits = hits.len(), "keyword search");
		Ok(hits)
	}
}

impl DocumentIndex for KeywordIndex {
	fn build(documents: &[Arc<Document>]) -> anyhow::Result<Self> { Self::new(documents) }
	fn search(&self, query: &str, limit: usize) -> anyhow::Result<Vec<EngineHit>> { Self::search(self, query, limit) }
}
