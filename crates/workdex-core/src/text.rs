//! Text helpers shared by the loader and the engines: keyword extraction,
//! title derivation, query tokenization and snippet windows.
use regex::Regex;
use std::collections::{BTreeSet, HashSet};
use std::sync::OnceLock;

/// Characters considered on either side of a candidate offset when scoring
/// snippet windows.
const SNIPPET_RADIUS: usize = 50;

pub const STOP_WORDS: &[&str] = &[
    "a","an","and","are","as","at","be","by","for","from","has","he","in","is","it","its","of","on","that","the","to","was","will","with","or","but","not","this","these","they","them","their","there","then","than","so","if","when","where","why","how","what","which","who","whom","whose","can","could","should","would","may","might","must","shall","do","does","did","have","had","having",
    "all","any","been","also","into","our","out","over","some","such","only","own","same","too","very","just","more","most","other","each","few","both","about","above","after","again","before","below","between","during","under","until","while","you","your","we","she","her","his","him","i","me","my",
];

fn code_block_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)```.*?```").expect("valid fenced code regex"))
}

fn inline_code_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"`[^`\n]*`").expect("valid inline code regex"))
}

fn is_stop_word(token: &str) -> bool { STOP_WORDS.contains(&token) }

/// Deduplicated lowercase keywords of `title` + `content`.
///
/// Code is stripped first, then punctuation (hyphens survive). Tokens of two
/// characters or fewer, purely numeric tokens and stop words are dropped.
pub fn extract_keywords(title: &str, content: &str) -> BTreeSet<String> {
    let text = format!("{title} {content}");
    let text = code_block_re().replace_all(&text, " ");
    let text = inline_code_re().replace_all(&text, " ");
    let cleaned: String = text
        .chars()
        .map(|c| if c.is_alphanumeric() || c.is_whitespace() || c == '-' { c } else { ' ' })
        .collect::<String>()
        .to_lowercase();
    cleaned
        .split_whitespace()
        .filter(|t| t.chars().count() > 2)
        .filter(|t| !t.chars().all(|c| c.is_ascii_digit()))
        .filter(|t| t.chars().any(char::is_alphanumeric))
        .filter(|t| !is_stop_word(t))
        .map(str::to_string)
        .collect()
}

/// First markdown H1 (`# Title`) in `content`, if any.
pub fn extract_h1(content: &str) -> Option<String> {
    content
        .lines()
        .map(str::trim_start)
        .find_map(|l| l.strip_prefix("# "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Title derived from a file name: extension stripped, `-`/`_` turned into spaces.
pub fn title_from_file_name(file_name: &str) -> String {
    let stem = file_name.rsplit_once('.').map_or(file_name, |(stem, _)| stem);
    stem.split(['-', '_']).filter(|p| !p.is_empty()).collect::<Vec<_>>().join(" ")
}

/// Lowercased whitespace-separated query words, duplicates removed while
/// keeping first-seen order.
pub fn query_terms(query: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    query
        .to_lowercase()
        .split_whitespace()
        .filter(|w| seen.insert(w.to_string()))
        .map(str::to_string)
        .collect()
}

/// Lowercase word tokens split on anything that isn't alphanumeric or a hyphen.
pub fn word_tokens(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '-'))
        .map(|t| t.trim_matches('-'))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Excerpt of `content` around the densest cluster of query words.
///
/// Every occurrence of a query word is a candidate centre; the winner is the
/// one with the most distinct query words within ±50 characters (earliest
/// wins ties). A window of `max_length` characters is cut around it and
/// marked with `...` on each truncated side. Offsets are in characters.
pub fn snippet(content: &str, query: &str, max_length: usize) -> String {
    let chars: Vec<char> = content.chars().collect();
    if chars.len() <= max_length {
        return flatten(&chars);
    }
    // Content and query fold one char to one char so offsets line up.
    let lower: Vec<char> = chars.iter().map(|&c| fold_char(c)).collect();
    let folded: String = query.chars().map(fold_char).collect();
    let words: Vec<Vec<char>> = query_terms(&folded).iter().map(|w| w.chars().collect()).collect();
    let occurrences: Vec<Vec<usize>> = words.iter().map(|w| find_all(&lower, w)).collect();

    let mut best: Option<(usize, usize)> = None;
    for &pos in occurrences.iter().flatten() {
        let lo = pos.saturating_sub(SNIPPET_RADIUS);
        let hi = pos + SNIPPET_RADIUS;
        let distinct = occurrences.iter().filter(|occ| occ.iter().any(|&p| p >= lo && p <= hi)).count();
        let better = match best {
            None => true,
            Some((count, at)) => distinct > count || (distinct == count && pos < at),
        };
        if better { best = Some((distinct, pos)); }
    }

    let center = best.map_or(0, |(_, pos)| pos);
    let end = (center.saturating_sub(max_length / 2) + max_length).min(chars.len());
    let start = end.saturating_sub(max_length);
    let mut out = String::new();
    if start > 0 { out.push_str("..."); }
    out.push_str(&flatten(&chars[start..end]));
    if end < chars.len() { out.push_str("..."); }
    out
}

fn fold_char(c: char) -> char { c.to_lowercase().next().unwrap_or(c) }

fn find_all(haystack: &[char], needle: &[char]) -> Vec<usize> {
    if needle.is_empty() || needle.len() > haystack.len() { return Vec::new(); }
    haystack.windows(needle.len()).enumerate().filter(|(_, w)| *w == needle).map(|(i, _)| i).collect()
}

fn flatten(chars: &[char]) -> String {
    chars.iter().map(|&c| if c == '\n' || c == '\r' || c == '\t' { ' ' } else { c }).collect()
}
