//! workdex-text
//!
//! Keyword engine: a tantivy trigram index narrows candidates, then each
//! candidate is scored by where the query words occur (title, file name,
//! keyword set, content).
pub mod tantivy_utils;
pub mod index;
pub mod search;

pub use index::KeywordIndex;
