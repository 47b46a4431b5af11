//! Claim extraction from normalized LLM artifacts

use tracing::debug;

use crate::domain::chunking::{canonicalize_domain, ChunkingConfig};
use crate::domain::knowledge::{
    Authority, ChunkDraft, ChunkRole, ClaimArtifact, KnowledgeItem, NormalizedClaims,
    TransformationType,
};

const DEFAULT_CONFIDENCE: f64 = 0.6;
const DEFAULT_TIMEFRAME: &str = "unknown";

/// Turns the claim artifacts stored on an item into chunk drafts
#[derive(Debug, Clone)]
pub struct LlmClaimExtractor {
    max_artifacts: usize,
}

impl Default for LlmClaimExtractor {
    fn default() -> Self {
        Self::from_config(&ChunkingConfig::default())
    }
}

impl LlmClaimExtractor {
    pub fn new(max_artifacts: usize) -> Self {
        Self { max_artifacts }
    }

    pub fn from_config(config: &ChunkingConfig) -> Self {
        Self::new(config.llm_max_artifacts)
    }

    /// Extract drafts from the item's claim bag.
    ///
    /// Returns an empty list when the bag is absent, has an unknown schema
    /// version or holds no usable claims.
    pub fn extract(&self, item: &KnowledgeItem) -> Vec<ChunkDraft> {
        let Some(claims) = item.normalized_claims().and_then(NormalizedClaims::from_value) else {
            debug!(item_id = %item.id(), "No recognized claim artifacts on item");
            return vec![];
        };

        claims
            .artifacts
            .iter()
            .take(self.max_artifacts)
            .filter_map(artifact_to_draft)
            .collect()
    }
}

fn artifact_to_draft(artifact: &ClaimArtifact) -> Option<ChunkDraft> {
    let claim = artifact.claim.as_deref().map(str::trim).filter(|c| !c.is_empty())?;

    let role = artifact
        .role
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(ChunkRole::from)
        .unwrap_or(ChunkRole::StrategicClaim);

    let authority = artifact
        .authority
        .as_deref()
        .and_then(Authority::from_label)
        .unwrap_or_default();

    let context = artifact.context.clone().unwrap_or_default();
    let timeframe = context
        .timeframe
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_TIMEFRAME.to_string());

    Some(
        ChunkDraft::new(
            claim,
            role,
            authority,
            artifact.confidence.unwrap_or(DEFAULT_CONFIDENCE),
            TransformationType::Normalized,
        )
        .with_domain(context.domain.as_deref().and_then(canonicalize_domain))
        .with_actor(context.actor)
        .with_timeframe(timeframe),
    )
}
