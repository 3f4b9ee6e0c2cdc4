//! workdex-vector
//!
//! HTTP client for a Chroma-compatible vector service. The service owns
//! storage and (optionally) embedding; this crate only speaks its query and
//! heartbeat endpoints and implements [`VectorSearchClient`].
pub mod client;
pub mod embed_provider;

pub use client::HttpVectorClient;
pub use workdex_core::traits::VectorSearchClient;
