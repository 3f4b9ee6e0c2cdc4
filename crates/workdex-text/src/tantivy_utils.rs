use tantivy::schema::{IndexRecordOption, Schema, TextFieldIndexing, TextOptions, STORED};
use tantivy::tokenizer::{LowerCaser, NgramTokenizer, TextAnalyzer};
use tantivy::Index;

pub const TRIGRAM_TOKENIZER: &str = "trigram";
pub const GRAM: usize = 3;

/// Fields searched for candidate recall. Every one is trigram-tokenized so a
/// query word can be found as a substring, not only as a whole token.
pub const TEXT_FIELDS: [&str; 4] = ["title", "content", "keywords", "file_name"];

pub fn build_schema() -> Schema {
	let mut schema_builder = Schema::builder();
	let _doc_idx_field = schema_builder.add_u64_field("doc_idx", STORED);
	let indexing = TextFieldIndexing::default().set_tokenizer(TRIGRAM_TOKENIZER).set_index_option(IndexRecordOption::Basic);
	let text_options = TextOptions::default().set_indexing_options(indexing);
	for name in TEXT_FIELDS { let _ = schema_builder.add_text_field(name, text_options.clone()); }
	schema_builder.build()
}

pub fn register_tokenizer(index: &Index) -> tantivy::Result<()> {
	let tokenizer = TextAnalyzer::builder(NgramTokenizer::new(GRAM, GRAM, false)?)
		.filter(LowerCaser)
		.build();
	index.tokenizers().register(TRIGRAM_TOKENIZER, tokenizer);
	Ok(())
}

/// Distinct trigrams of `word`, lowercased to match the index analyzer.
pub fn trigrams(word: &str) -> Vec<String> {
	let chars: Vec<char> = word.to_lowercase().chars().collect();
	if chars.len() < GRAM { return Vec::new(); }
	let mut grams: Vec<String> = chars.windows(GRAM).map(|w| w.iter().collect()).collect();
	grams.sort();
	grams.dedup();
	grams
}
