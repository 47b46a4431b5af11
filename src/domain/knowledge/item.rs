//! Knowledge item entity

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::DomainError;
use crate::domain::chunking::ChunkingDiagnostics;

/// Source value that is reported as the generic `text` source type
const MANUAL_SOURCE: &str = "manual";

/// Generic source type for manually entered or unlabelled items
pub const GENERIC_SOURCE_TYPE: &str = "text";

/// Knowledge item identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KnowledgeItemId(Uuid);

impl KnowledgeItemId {
    /// Generate a fresh identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an identifier from its string form
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        Uuid::parse_str(value.trim())
            .map(Self)
            .map_err(|e| DomainError::validation(format!("Invalid knowledge item id '{}': {}", value, e)))
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for KnowledgeItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for KnowledgeItemId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for KnowledgeItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored document submitted for ingestion.
///
/// The chunking pipeline only reads the content fields; it owns the
/// diagnostics, which are replaced as a whole after every run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeItem {
    id: KnowledgeItemId,
    raw_text: String,
    source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    organization_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ingestion_source_id: Option<String>,
    /// Claims written by the external normalization step, kept untyped
    /// because the producer may emit shapes this crate does not recognize
    #[serde(default, skip_serializing_if = "Option::is_none")]
    normalized_claims: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    diagnostics: Option<ChunkingDiagnostics>,
}

impl KnowledgeItem {
    /// Create a new knowledge item with a fresh identifier
    pub fn new(raw_text: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: KnowledgeItemId::new(),
            raw_text: raw_text.into(),
            source: source.into(),
            organization_id: None,
            user_id: None,
            ingestion_source_id: None,
            normalized_claims: None,
            diagnostics: None,
        }
    }

    pub fn with_id(mut self, id: KnowledgeItemId) -> Self {
        self.id = id;
        self
    }

    pub fn with_organization_id(mut self, organization_id: impl Into<String>) -> Self {
        self.organization_id = Some(organization_id.into());
        self
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_ingestion_source_id(mut self, ingestion_source_id: impl Into<String>) -> Self {
        self.ingestion_source_id = Some(ingestion_source_id.into());
        self
    }

    pub fn with_normalized_claims(mut self, claims: serde_json::Value) -> Self {
        self.normalized_claims = Some(claims);
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: ChunkingDiagnostics) -> Self {
        self.diagnostics = Some(diagnostics);
        self
    }

    // Getters

    pub fn id(&self) -> &KnowledgeItemId {
        &self.id
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn organization_id(&self) -> Option<&str> {
        self.organization_id.as_deref()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn ingestion_source_id(&self) -> Option<&str> {
        self.ingestion_source_id.as_deref()
    }

    pub fn normalized_claims(&self) -> Option<&serde_json::Value> {
        self.normalized_claims.as_ref()
    }

    pub fn diagnostics(&self) -> Option<&ChunkingDiagnostics> {
        self.diagnostics.as_ref()
    }

    /// Source type used for chunk provenance
    pub fn source_type(&self) -> String {
        let source = self.source.trim().to_lowercase();

        if source.is_empty() || source == MANUAL_SOURCE {
            GENERIC_SOURCE_TYPE.to_string()
        } else {
            source
        }
    }

    // Mutators

    /// Replace the diagnostics of the previous run
    pub fn set_diagnostics(&mut self, diagnostics: ChunkingDiagnostics) {
        self.diagnostics = Some(diagnostics);
    }
}
