//! Token-level similarity used by the fuzzy index.

/// Below this a token pair counts as no match at all, so unrelated words
/// don't accumulate small similarities across a long field.
pub const TOKEN_MATCH_FLOOR: f64 = 0.6;
pub const PREFIX_SIMILARITY: f64 = 0.9;
pub const INFIX_SIMILARITY: f64 = 0.8;
/// Shortest query token allowed to match as a prefix/infix of a longer token.
const MIN_PARTIAL_LEN: usize = 3;

/// Similarity of a query token to a field token in `0..=1`.
pub fn token_similarity(query: &str, token: &str) -> f64 {
	if query == token { return 1.0; }
	let partial = query.chars().count() >= MIN_PARTIAL_LEN;
	if partial && token.starts_with(query) { return PREFIX_SIMILARITY; }
	if partial && token.contains(query) { return INFIX_SIMILARITY; }
	let lev = strsim::normalized_levenshtein(query, token);
	if lev >= TOKEN_MATCH_FLOOR { lev } else { 0.0 }
}

/// Best-matching field token for `query`, if any clears the floor.
pub fn best_match<'a>(query: &str, field_tokens: &'a [String]) -> Option<(f64, &'a str)> {
	let mut best: Option<(f64, &'a str)> = None;
	for token in field_tokens {
		let sim = token_similarity(query, token);
		if sim > 0.0 && best.map_or(true, |(b, _)| sim > b) { best = Some((sim, token.as_str())); }
	}
	best
}

/// Mean over query tokens of their best similarity against `field_tokens`.
pub fn field_similarity(query_tokens: &[String], field_tokens: &[String]) -> f64 {
	if query_tokens.is_empty() { return 0.0; }
	let total: f64 = query_tokens.iter().filter_map(|q| best_match(q, field_tokens)).map(|(s, _)| s).sum();
	total / query_tokens.len() as f64
}

#[cfg(test)]
mod tests {
	use super::*;

	fn toks(s: &str) -> Vec<String> { workdex_core::text::word_tokens(s) }

	#[test]
	fn exact_prefix_and_typo() {
		assert_eq!(token_similarity("auth", "auth"), 1.0);
		assert_eq!(token_similarity("auth", "authentication"), PREFIX_SIMILARITY);
		assert_eq!(token_similarity("factor", "refactor"), INFIX_SIMILARITY);
		let typo = token_similarity("databse", "database");
		assert!(typo > 0.8 && typo < 1.0, "{typo}");
		assert_eq!(token_similarity("zebra", "login"), 0.0);
		assert_eq!(token_similarity("db", "database"), 0.0);
	}

	#[test]
	fn field_similarity_averages_query_tokens() {
		let s = field_similarity(&toks("auth refactor"), &toks("Auth Refactor"));
		assert_eq!(s, 1.0);
		let half = field_similarity(&toks("auth zebra"), &toks("Auth Refactor"));
		assert!((half - 0.5).abs() < 1e-9);
		assert_eq!(field_similarity(&toks("auth"), &[]), 0.0);
	}

	#[test]
	fn best_match_keeps_first_of_equal_scores() {
		let field = toks("authentication authorization login");
		assert_eq!(best_match("auth", &field), Some((PREFIX_SIMILARITY, "authentication")));
		assert_eq!(best_match("logn", &field).map(|(_, t)| t), Some("login"));
		assert_eq!(best_match("zebra", &field), None);
	}
}
