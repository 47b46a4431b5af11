//! PostgreSQL knowledge repository implementation

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::domain::chunking::{ChunkingDiagnostics, ChunkingMetrics};
use crate::domain::knowledge::{
    KnowledgeChunk, KnowledgeItem, KnowledgeItemId, KnowledgeRepository,
};
use crate::domain::DomainError;

/// PostgreSQL implementation of KnowledgeRepository.
///
/// Items live in `knowledge_items`, which this crate only extends with the
/// `chunking_*` diagnostic columns. Chunks live in `knowledge_chunks`.
#[derive(Debug, Clone)]
pub struct PostgresKnowledgeRepository {
    pool: PgPool,
}

impl PostgresKnowledgeRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new repository with connection pooling
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DomainError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .connect(&config.url)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to connect to PostgreSQL: {}", e)))?;

        Ok(Self::new(pool))
    }

    /// Returns a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Ensure the chunk table and the diagnostic columns exist
    pub async fn ensure_schema(&self) -> Result<(), DomainError> {
        let statements = [
            r#"
            CREATE TABLE IF NOT EXISTS knowledge_items (
                id UUID PRIMARY KEY,
                raw_text TEXT NOT NULL,
                source VARCHAR(255) NOT NULL DEFAULT 'manual',
                organization_id VARCHAR(255),
                user_id VARCHAR(255),
                ingestion_source_id VARCHAR(255),
                normalized_claims JSONB,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
            "ALTER TABLE knowledge_items ADD COLUMN IF NOT EXISTS chunking_status VARCHAR(32)",
            "ALTER TABLE knowledge_items ADD COLUMN IF NOT EXISTS chunking_skip_reason VARCHAR(64)",
            "ALTER TABLE knowledge_items ADD COLUMN IF NOT EXISTS chunking_error_code VARCHAR(64)",
            "ALTER TABLE knowledge_items ADD COLUMN IF NOT EXISTS chunking_error_message TEXT",
            "ALTER TABLE knowledge_items ADD COLUMN IF NOT EXISTS chunking_metrics JSONB",
            "ALTER TABLE knowledge_items ADD COLUMN IF NOT EXISTS chunking_updated_at TIMESTAMPTZ",
            r#"
            CREATE TABLE IF NOT EXISTS knowledge_chunks (
                id UUID PRIMARY KEY,
                knowledge_item_id UUID NOT NULL REFERENCES knowledge_items(id) ON DELETE CASCADE,
                organization_id VARCHAR(255),
                user_id VARCHAR(255),
                ingestion_source_id VARCHAR(255),
                chunk_type VARCHAR(64) NOT NULL,
                chunk_text TEXT NOT NULL,
                chunk_role VARCHAR(64) NOT NULL,
                authority VARCHAR(16) NOT NULL,
                confidence DOUBLE PRECISION NOT NULL,
                time_horizon VARCHAR(16) NOT NULL,
                domain VARCHAR(255),
                actor VARCHAR(255),
                source_type VARCHAR(64) NOT NULL,
                source_variant VARCHAR(16) NOT NULL,
                source_ref JSONB NOT NULL,
                token_count INTEGER NOT NULL,
                source_text TEXT,
                source_spans JSONB NOT NULL DEFAULT '[]',
                transformation_type VARCHAR(16) NOT NULL,
                metadata JSONB NOT NULL DEFAULT '{}',
                ordinal INTEGER NOT NULL,
                created_at TIMESTAMPTZ NOT NULL
            )
            "#,
            "CREATE INDEX IF NOT EXISTS idx_knowledge_chunks_item ON knowledge_chunks (knowledge_item_id)",
        ];

        for statement in statements {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| DomainError::storage(format!("Failed to ensure schema: {}", e)))?;
        }

        info!("Knowledge chunk schema ready");
        Ok(())
    }
}

const UPDATE_DIAGNOSTICS: &str = r#"
    UPDATE knowledge_items
    SET chunking_status = $2,
        chunking_skip_reason = $3,
        chunking_error_code = $4,
        chunking_error_message = $5,
        chunking_metrics = $6,
        chunking_updated_at = $7
    WHERE id = $1
"#;

#[async_trait]
impl KnowledgeRepository for PostgresKnowledgeRepository {
    async fn get_item(&self, id: &KnowledgeItemId) -> Result<Option<KnowledgeItem>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, raw_text, source, organization_id, user_id, ingestion_source_id,
                   normalized_claims, chunking_status, chunking_skip_reason,
                   chunking_error_code, chunking_error_message, chunking_metrics,
                   chunking_updated_at
            FROM knowledge_items
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get knowledge item: {}", e)))?;

        match row {
            Some(row) => Ok(Some(row_to_item(&row)?)),
            None => Ok(None),
        }
    }

    async fn list_chunks(&self, id: &KnowledgeItemId) -> Result<Vec<KnowledgeChunk>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, knowledge_item_id, organization_id, user_id, ingestion_source_id,
                   chunk_type, chunk_text, chunk_role, authority, confidence, time_horizon,
                   domain, actor, source_type, source_variant, source_ref, token_count,
                   source_text, source_spans, transformation_type, metadata, created_at
            FROM knowledge_chunks
            WHERE knowledge_item_id = $1
            ORDER BY created_at, ordinal
            "#,
        )
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list chunks: {}", e)))?;

        rows.iter().map(row_to_chunk).collect()
    }

    async fn replace_chunks(
        &self,
        id: &KnowledgeItemId,
        chunks: Vec<KnowledgeChunk>,
        diagnostics: ChunkingDiagnostics,
    ) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to begin transaction: {}", e)))?;

        let deleted = sqlx::query("DELETE FROM knowledge_chunks WHERE knowledge_item_id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete chunks: {}", e)))?
            .rows_affected();

        for (ordinal, chunk) in chunks.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO knowledge_chunks (
                    id, knowledge_item_id, organization_id, user_id, ingestion_source_id,
                    chunk_type, chunk_text, chunk_role, authority, confidence, time_horizon,
                    domain, actor, source_type, source_variant, source_ref, token_count,
                    source_text, source_spans, transformation_type, metadata, ordinal,
                    created_at
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                          $16, $17, $18, $19, $20, $21, $22, $23)
                "#,
            )
            .bind(chunk.id)
            .bind(chunk.knowledge_item_id.as_uuid())
            .bind(&chunk.organization_id)
            .bind(&chunk.user_id)
            .bind(&chunk.ingestion_source_id)
            .bind(&chunk.chunk_type)
            .bind(&chunk.chunk_text)
            .bind(chunk.chunk_role.as_str())
            .bind(chunk.authority.as_str())
            .bind(chunk.confidence)
            .bind(chunk.time_horizon.as_str())
            .bind(&chunk.domain)
            .bind(&chunk.actor)
            .bind(&chunk.source_type)
            .bind(chunk.source_variant.as_str())
            .bind(&chunk.source_ref)
            .bind(chunk.token_count as i32)
            .bind(&chunk.source_text)
            .bind(to_json(&chunk.source_spans)?)
            .bind(chunk.transformation_type.as_str())
            .bind(to_json(&chunk.metadata)?)
            .bind(ordinal as i32)
            .bind(chunk.created_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to insert chunk: {}", e)))?;
        }

        let updated = bind_diagnostics(sqlx::query(UPDATE_DIAGNOSTICS), id, &diagnostics)?
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to update diagnostics: {}", e)))?;

        if updated.rows_affected() == 0 {
            return Err(DomainError::not_found(format!("Knowledge item '{}'", id)));
        }

        tx.commit()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to commit transaction: {}", e)))?;

        debug!(
            item_id = %id,
            deleted = deleted,
            inserted = chunks.len(),
            "Replaced knowledge chunks"
        );
        Ok(())
    }

    async fn record_diagnostics(
        &self,
        id: &KnowledgeItemId,
        diagnostics: ChunkingDiagnostics,
    ) -> Result<(), DomainError> {
        let result = bind_diagnostics(sqlx::query(UPDATE_DIAGNOSTICS), id, &diagnostics)?
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to update diagnostics: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!("Knowledge item '{}'", id)));
        }

        Ok(())
    }
}

type PgQuery<'q> = sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>;

fn bind_diagnostics<'q>(
    query: PgQuery<'q>,
    id: &KnowledgeItemId,
    diagnostics: &ChunkingDiagnostics,
) -> Result<PgQuery<'q>, DomainError> {
    Ok(query
        .bind(*id.as_uuid())
        .bind(diagnostics.status.as_str())
        .bind(diagnostics.skip_reason.map(|r| r.as_str()))
        .bind(diagnostics.error_code.map(|c| c.as_str()))
        .bind(diagnostics.error_message.clone())
        .bind(to_json(&diagnostics.metrics)?)
        .bind(diagnostics.recorded_at))
}

fn to_json<T: Serialize>(value: &T) -> Result<serde_json::Value, DomainError> {
    serde_json::to_value(value)
        .map_err(|e| DomainError::internal(format!("Failed to serialize value: {}", e)))
}

/// Parse a snake_case label column through the type's serde representation
fn from_label<T: DeserializeOwned>(label: &str, column: &str) -> Result<T, DomainError> {
    serde_json::from_value(serde_json::Value::String(label.to_string()))
        .map_err(|e| DomainError::storage(format!("Invalid {} '{}' in database: {}", column, label, e)))
}

fn from_json<T: DeserializeOwned>(value: serde_json::Value, column: &str) -> Result<T, DomainError> {
    serde_json::from_value(value)
        .map_err(|e| DomainError::storage(format!("Invalid {} in database: {}", column, e)))
}

fn row_to_item(row: &PgRow) -> Result<KnowledgeItem, DomainError> {
    let id: Uuid = row.get("id");
    let raw_text: String = row.get("raw_text");
    let source: String = row.get("source");
    let organization_id: Option<String> = row.get("organization_id");
    let user_id: Option<String> = row.get("user_id");
    let ingestion_source_id: Option<String> = row.get("ingestion_source_id");
    let normalized_claims: Option<serde_json::Value> = row.get("normalized_claims");

    let mut item = KnowledgeItem::new(raw_text, source).with_id(KnowledgeItemId::from(id));

    if let Some(organization_id) = organization_id {
        item = item.with_organization_id(organization_id);
    }
    if let Some(user_id) = user_id {
        item = item.with_user_id(user_id);
    }
    if let Some(ingestion_source_id) = ingestion_source_id {
        item = item.with_ingestion_source_id(ingestion_source_id);
    }
    if let Some(claims) = normalized_claims {
        item = item.with_normalized_claims(claims);
    }

    let status: Option<String> = row.get("chunking_status");
    let Some(status) = status else {
        return Ok(item);
    };

    let skip_reason: Option<String> = row.get("chunking_skip_reason");
    let error_code: Option<String> = row.get("chunking_error_code");
    let metrics: Option<serde_json::Value> = row.get("chunking_metrics");
    let recorded_at: Option<chrono::DateTime<chrono::Utc>> = row.get("chunking_updated_at");

    let diagnostics = ChunkingDiagnostics {
        status: from_label(&status, "chunking_status")?,
        skip_reason: skip_reason
            .map(|r| from_label(&r, "chunking_skip_reason"))
            .transpose()?,
        error_code: error_code
            .map(|c| from_label(&c, "chunking_error_code"))
            .transpose()?,
        error_message: row.get("chunking_error_message"),
        metrics: metrics
            .map(|m| from_json::<ChunkingMetrics>(m, "chunking_metrics"))
            .transpose()?
            .unwrap_or_default(),
        recorded_at: recorded_at.unwrap_or_else(chrono::Utc::now),
    };

    Ok(item.with_diagnostics(diagnostics))
}

fn row_to_chunk(row: &PgRow) -> Result<KnowledgeChunk, DomainError> {
    let item_id: Uuid = row.get("knowledge_item_id");
    let chunk_role: String = row.get("chunk_role");
    let authority: String = row.get("authority");
    let time_horizon: String = row.get("time_horizon");
    let source_variant: String = row.get("source_variant");
    let transformation_type: String = row.get("transformation_type");
    let token_count: i32 = row.get("token_count");

    Ok(KnowledgeChunk {
        id: row.get("id"),
        knowledge_item_id: KnowledgeItemId::from(item_id),
        organization_id: row.get("organization_id"),
        user_id: row.get("user_id"),
        ingestion_source_id: row.get("ingestion_source_id"),
        chunk_type: row.get("chunk_type"),
        chunk_text: row.get("chunk_text"),
        chunk_role: chunk_role.into(),
        authority: from_label(&authority, "authority")?,
        confidence: row.get("confidence"),
        time_horizon: from_label(&time_horizon, "time_horizon")?,
        domain: row.get("domain"),
        actor: row.get("actor"),
        source_type: row.get("source_type"),
        source_variant: from_label(&source_variant, "source_variant")?,
        source_ref: row.get("source_ref"),
        token_count: token_count.max(0) as usize,
        source_text: row.get("source_text"),
        source_spans: from_json(row.get("source_spans"), "source_spans")?,
        transformation_type: from_label(&transformation_type, "transformation_type")?,
        metadata: from_json(row.get("metadata"), "metadata")?,
        created_at: row.get("created_at"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chunking::{ChunkingErrorCode, ChunkingStatus, SkipReason};
    use crate::domain::knowledge::{Authority, SourceSpan, TimeHorizon, TransformationType};

    #[test]
    fn test_labels_round_trip_through_serde() {
        let status: ChunkingStatus = from_label("failed", "chunking_status").unwrap();
        assert_eq!(status, ChunkingStatus::Failed);

        let reason: SkipReason = from_label("below_min_chars", "chunking_skip_reason").unwrap();
        assert_eq!(reason, SkipReason::BelowMinChars);

        let code: ChunkingErrorCode =
            from_label(ChunkingErrorCode::ParserError.as_str(), "chunking_error_code").unwrap();
        assert_eq!(code, ChunkingErrorCode::ParserError);

        let authority: Authority = from_label(Authority::High.as_str(), "authority").unwrap();
        assert_eq!(authority, Authority::High);

        let horizon: TimeHorizon = from_label(TimeHorizon::NearTerm.as_str(), "time_horizon").unwrap();
        assert_eq!(horizon, TimeHorizon::NearTerm);

        let variant: TransformationType =
            from_label(TransformationType::Normalized.as_str(), "source_variant").unwrap();
        assert_eq!(variant, TransformationType::Normalized);
    }

    #[test]
    fn test_invalid_label_is_storage_error() {
        let result: Result<Authority, _> = from_label("certain", "authority");
        let error = result.unwrap_err();
        assert!(error.is_storage());
        assert!(error.to_string().contains("authority"));
    }

    #[test]
    fn test_spans_json() {
        let spans = vec![SourceSpan::new(0, 12)];
        let value = to_json(&spans).unwrap();
        let parsed: Vec<SourceSpan> = from_json(value, "source_spans").unwrap();
        assert_eq!(parsed, spans);
    }
}
