//! Hybrid search over the keyword, fuzzy and vector engines.
//!
//! [`HybridOrchestrator`] owns the local indexes, fans each query out to all
//! three engines concurrently and fuses the hits with availability-based
//! weights (see [`weights::EngineWeights`]).
pub mod fusion;
pub mod orchestrator;
pub mod outcome;
pub mod weights;

pub use orchestrator::HybridOrchestrator;
pub use outcome::EngineOutcome;
pub use weights::EngineWeights;
