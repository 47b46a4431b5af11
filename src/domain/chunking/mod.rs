//! Chunking domain types and pure pipeline stages
//!
//! This module provides:
//! - The preflight gate, format detector and strategy router
//! - `ChunkingStrategy` trait implemented by the concrete strategies
//! - Diagnostics and result types returned by the coordinator

pub mod config;
pub mod diagnostics;
pub mod format;
pub mod preflight;
pub mod result;
pub mod router;
pub mod strategy;
pub mod taxonomy;
pub mod text;

// Re-export main types
pub use config::ChunkingConfig;
pub use diagnostics::{
    ChunkingDiagnostics, ChunkingErrorCode, ChunkingMetrics, ChunkingStatus, LlmPathOutcome,
};
pub use format::{detect_format, ContentFormat, FormatDetector};
pub use preflight::{run_preflight, PreflightMetrics, PreflightVerdict, SkipReason};
pub use result::{BatchItemOutcome, BatchItemResult, BatchProcessingResult, ProcessingResult};
pub use router::StrategyRouter;
pub use strategy::{ChunkingStrategy, StrategyKind, LLM_CLAIM_EXTRACTOR};
pub use taxonomy::canonicalize_domain;
pub use text::estimate_tokens;

// Re-export mocks for testing
#[cfg(test)]
pub use strategy::mock::MockChunkingStrategy;
