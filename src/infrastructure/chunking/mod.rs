//! Chunking pipeline infrastructure
//!
//! This module provides the concrete strategies, the LLM-artifact path and
//! the coordinator that runs an item through the pipeline and persists the
//! outcome.

pub mod coordinator;
pub mod factory;
pub mod llm_artifacts;
pub mod persistence;
pub mod strategies;

// Re-export strategies
pub use strategies::{FallbackSentenceStrategy, ListToDataPointsStrategy, ShortPostClaimStrategy};

// Re-export factory
pub use factory::StrategyFactory;

pub use coordinator::ChunkingCoordinator;
pub use llm_artifacts::LlmClaimExtractor;
pub use persistence::{materialize_chunks, source_ref};
