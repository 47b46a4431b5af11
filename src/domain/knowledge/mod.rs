//! Knowledge items, chunks and their storage contract

mod chunk;
mod claims;
mod item;
mod repository;

pub use chunk::{
    clamp_confidence, Authority, ChunkDraft, ChunkRole, KnowledgeChunk, SourceSpan, TimeHorizon,
    TransformationType, NORMALIZED_KNOWLEDGE_CHUNK_TYPE,
};
pub use claims::{ClaimArtifact, ClaimContext, NormalizedClaims, SUPPORTED_SCHEMA_VERSIONS};
pub use item::{KnowledgeItem, KnowledgeItemId, GENERIC_SOURCE_TYPE};
pub use repository::KnowledgeRepository;

#[cfg(test)]
pub use repository::MockKnowledgeRepository;
