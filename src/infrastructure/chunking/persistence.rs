//! Materialize strategy drafts into chunk rows

use chrono::{DateTime, Datelike, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::domain::chunking::estimate_tokens;
use crate::domain::knowledge::{
    ChunkDraft, KnowledgeChunk, KnowledgeItem, TimeHorizon, NORMALIZED_KNOWLEDGE_CHUNK_TYPE,
};

/// Provenance reference stored on every chunk of an item
pub fn source_ref(item: &KnowledgeItem) -> serde_json::Value {
    json!({
        "knowledge_item_id": item.id(),
        "ingestion_source_id": item.ingestion_source_id(),
        "source": item.source(),
    })
}

/// Build chunk rows for one run.
///
/// Every row gets a fresh id and the same `created_at`.
pub fn materialize_chunks(
    item: &KnowledgeItem,
    drafts: Vec<ChunkDraft>,
    created_at: DateTime<Utc>,
) -> Vec<KnowledgeChunk> {
    let source_type = item.source_type();
    let source_ref = source_ref(item);
    let current_year = created_at.year();

    drafts
        .into_iter()
        .map(|draft| KnowledgeChunk {
            id: Uuid::new_v4(),
            knowledge_item_id: *item.id(),
            organization_id: item.organization_id().map(String::from),
            user_id: item.user_id().map(String::from),
            ingestion_source_id: item.ingestion_source_id().map(String::from),
            chunk_type: NORMALIZED_KNOWLEDGE_CHUNK_TYPE.to_string(),
            token_count: estimate_tokens(&draft.chunk_text),
            time_horizon: TimeHorizon::from_timeframe(draft.timeframe.as_deref(), current_year),
            chunk_text: draft.chunk_text,
            chunk_role: draft.chunk_role,
            authority: draft.authority,
            confidence: draft.confidence,
            domain: draft.domain,
            actor: draft.actor,
            source_type: source_type.clone(),
            source_variant: draft.transformation_type,
            source_ref: source_ref.clone(),
            source_text: draft.source_text,
            source_spans: draft.source_spans,
            transformation_type: draft.transformation_type,
            metadata: draft.metadata,
            created_at,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::knowledge::{Authority, ChunkRole, TransformationType};
    use chrono::TimeZone;
    use std::collections::HashSet;

    fn draft(text: &str) -> ChunkDraft {
        ChunkDraft::new(
            text,
            ChunkRole::Heuristic,
            Authority::Low,
            0.5,
            TransformationType::Extractive,
        )
    }

    #[test]
    fn test_rows_share_timestamp_and_linkage() {
        let item = KnowledgeItem::new("body", "manual")
            .with_organization_id("org-1")
            .with_user_id("user-1")
            .with_ingestion_source_id("src-9");
        let now = Utc::now();

        let rows = materialize_chunks(&item, vec![draft("one two three"), draft("four")], now);

        assert_eq!(rows.len(), 2);
        let ids: HashSet<_> = rows.iter().map(|r| r.id).collect();
        assert_eq!(ids.len(), 2);

        for row in &rows {
            assert_eq!(row.created_at, now);
            assert_eq!(row.knowledge_item_id, *item.id());
            assert_eq!(row.organization_id.as_deref(), Some("org-1"));
            assert_eq!(row.user_id.as_deref(), Some("user-1"));
            assert_eq!(row.chunk_type, "normalized_knowledge");
            assert_eq!(row.source_type, "text");
            assert_eq!(row.source_ref["ingestion_source_id"], "src-9");
            assert_eq!(row.source_ref["source"], "manual");
        }

        assert_eq!(rows[0].token_count, 3);
        assert_eq!(rows[1].token_count, 1);
    }

    #[test]
    fn test_time_horizon_uses_run_year() {
        let item = KnowledgeItem::new("body", "blog");
        let created_at = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();

        let drafts = vec![
            draft("a").with_timeframe("2027"),
            draft("b").with_timeframe("unknown"),
            draft("c"),
        ];
        let rows = materialize_chunks(&item, drafts, created_at);

        assert_eq!(rows[0].time_horizon, TimeHorizon::NearTerm);
        assert_eq!(rows[1].time_horizon, TimeHorizon::Unknown);
        assert_eq!(rows[2].time_horizon, TimeHorizon::Unknown);
        assert_eq!(rows[0].source_type, "blog");
    }
}
