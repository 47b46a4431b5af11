//! Knowledge Chunker
//!
//! Turns free-form knowledge items into small, typed chunks for retrieval:
//! - Preflight gate that skips empty, bare-URL and undersized items
//! - Format detection and routing to deterministic strategies
//! - Fast path over normalized LLM claim artifacts
//! - Atomic chunk replacement with per-run diagnostics

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
pub use domain::DomainError;
pub use infrastructure::chunking::ChunkingCoordinator;
