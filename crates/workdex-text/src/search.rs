use std::collections::BTreeSet;

use crate::index::PreparedFields;

pub const TITLE_POINTS: f32 = 3.0;
pub const FILE_NAME_POINTS: f32 = 2.0;
pub const KEYWORD_POINTS: f32 = 2.0;
pub const CONTENT_POINTS_PER_OCCURRENCE: f32 = 0.5;
/// Caps the content contribution per word so long documents don't dominate.
pub const CONTENT_POINTS_CAP: f32 = 2.0;
/// Points that map to a normalized score of 1.0.
pub const MAX_POINTS: f32 = 10.0;

pub(crate) struct Scored {
	pub score: f32,
	pub provenance: Vec<String>,
}

/// Field-weighted relevance of one document for the given (lowercased)
/// query words. `None` when no word matched anywhere.
pub(crate) fn score_document(words: &[String], fields: &PreparedFields, keywords: &BTreeSet<String>) -> Option<Scored> {
	let mut points = 0.0f32;
	let mut provenance = Vec::new();
	for word in words {
		if fields.title.contains(word.as_str()) { points += TITLE_POINTS; provenance.push(format!("title:{word}")); }
		if fields.file_name.contains(word.as_str()) { points += FILE_NAME_POINTS; provenance.push(format!("fileName:{word}")); }
		if keywords.contains(word) { points += KEYWORD_POINTS; provenance.push(format!("keywords:{word}")); }
		let occurrences = fields.content.matches(word.as_str()).count();
		if occurrences > 0 {
			points += (occurrences as f32 * CONTENT_POINTS_PER_OCCURRENCE).min(CONTENT_POINTS_CAP);
			provenance.push(format!("content:{word}"));
		}
	}
	if provenance.is_empty() { return None; }
	Some(Scored { score: (points / MAX_POINTS).min(1.0), provenance })
}
