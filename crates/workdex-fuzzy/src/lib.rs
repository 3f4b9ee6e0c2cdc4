//! workdex-fuzzy
//!
//! Typo-tolerant search over title, content, keywords and file name, plus
//! the suggestion and related-term helpers built on the same index.
pub mod index;
pub mod similarity;
pub mod suggest;

pub use index::FuzzyIndex;

/// Query-centred snippet extraction, exposed alongside the other fuzzy helpers.
pub use workdex_core::text::snippet;
