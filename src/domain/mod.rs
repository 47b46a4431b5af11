//! Domain layer - Core chunking logic and entities

pub mod chunking;
pub mod error;
pub mod knowledge;

pub use chunking::{
    ChunkingConfig, ChunkingDiagnostics, ChunkingErrorCode, ChunkingMetrics, ChunkingStatus,
    ChunkingStrategy, ContentFormat, LlmPathOutcome, ProcessingResult, SkipReason, StrategyKind,
};
pub use error::DomainError;
pub use knowledge::{
    Authority, ChunkDraft, ChunkRole, KnowledgeChunk, KnowledgeItem, KnowledgeItemId,
    KnowledgeRepository, TimeHorizon, TransformationType,
};
