//! Chunking coordinator
//!
//! Runs one knowledge item through preflight, format detection, the LLM
//! artifact path and the routed strategy, then persists the outcome.

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use tracing::{debug, info, instrument, warn};

use crate::domain::chunking::text::truncate_chars;
use crate::domain::chunking::{
    run_preflight, BatchProcessingResult, ChunkingConfig, ChunkingDiagnostics, ChunkingErrorCode,
    ChunkingMetrics, ChunkingStrategy, FormatDetector, LlmPathOutcome, PreflightVerdict,
    ProcessingResult, StrategyKind, StrategyRouter, LLM_CLAIM_EXTRACTOR,
};
use crate::domain::knowledge::{ChunkDraft, KnowledgeItem, KnowledgeItemId, KnowledgeRepository};
use crate::domain::DomainError;
use crate::infrastructure::observability::record_chunking_run;

use super::factory::StrategyFactory;
use super::llm_artifacts::LlmClaimExtractor;
use super::persistence::materialize_chunks;

/// Coordinates chunking runs and their persistence
pub struct ChunkingCoordinator<R>
where
    R: KnowledgeRepository,
{
    repository: Arc<R>,
    config: ChunkingConfig,
    detector: FormatDetector,
    router: StrategyRouter,
    llm_extractor: LlmClaimExtractor,
    strategies: HashMap<StrategyKind, Arc<dyn ChunkingStrategy>>,
}

impl<R: KnowledgeRepository> Debug for ChunkingCoordinator<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkingCoordinator")
            .field("config", &self.config)
            .field("router", &self.router)
            .field("strategies", &self.strategies)
            .finish()
    }
}

impl<R: KnowledgeRepository> ChunkingCoordinator<R> {
    /// Create a coordinator with the default strategy set
    pub fn new(repository: Arc<R>, config: ChunkingConfig) -> Result<Self, DomainError> {
        config.validate()?;

        let strategies = StrategyFactory::available_kinds()
            .into_iter()
            .map(|kind| (kind, StrategyFactory::create(kind)))
            .collect();

        Ok(Self {
            repository,
            detector: FormatDetector::new(config.short_text_max_tokens),
            router: StrategyRouter::from_config(&config),
            llm_extractor: LlmClaimExtractor::from_config(&config),
            strategies,
            config,
        })
    }

    /// Replace the strategy registered for its kind
    pub fn with_strategy(mut self, strategy: Arc<dyn ChunkingStrategy>) -> Self {
        self.strategies.insert(strategy.kind(), strategy);
        self
    }

    pub fn config(&self) -> &ChunkingConfig {
        &self.config
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    /// Process a single knowledge item.
    ///
    /// Content problems come back as `Skipped` or `Failed` results; only
    /// persistence errors are returned as `Err`.
    #[instrument(skip(self, item), fields(item_id = %item.id()))]
    pub async fn process_item(&self, item: &KnowledgeItem) -> Result<ProcessingResult, DomainError> {
        let started = Instant::now();
        let text = item.raw_text().trim();

        let PreflightVerdict {
            skip_reason,
            metrics: preflight,
        } = run_preflight(item.raw_text(), &self.config);
        let token_count = preflight.clean_tokens_est;
        let mut metrics = ChunkingMetrics::from_preflight(preflight);

        if let Some(reason) = skip_reason {
            metrics.duration_ms = Some(started.elapsed().as_millis() as u64);

            self.repository
                .record_diagnostics(item.id(), ChunkingDiagnostics::skipped(reason, metrics.clone()))
                .await?;

            info!(reason = %reason, "Skipped knowledge item");
            return Ok(self.finish(ProcessingResult::Skipped { reason, metrics }, started));
        }

        let format = self.detector.detect(text);
        metrics.detected_format = Some(format);
        debug!(format = %format, tokens = token_count, "Detected content format");

        let llm_drafts = if self.router.should_use_llm_extraction(format, token_count) {
            let drafts = self.llm_extractor.extract(item);
            metrics.llm_path = Some(if drafts.is_empty() {
                LlmPathOutcome::AttemptedEmpty
            } else {
                LlmPathOutcome::Used
            });
            drafts
        } else {
            metrics.llm_path = Some(LlmPathOutcome::NotEligible);
            Vec::new()
        };

        let (strategy_name, outcome) = if llm_drafts.is_empty() {
            let kind = self.router.select_strategy(format, token_count);
            let strategy = self.strategy_for(kind)?;
            (strategy.name(), strategy.generate_chunks(item, text))
        } else {
            (LLM_CLAIM_EXTRACTOR, Ok(llm_drafts))
        };
        metrics.strategy_used = Some(strategy_name.to_string());

        match outcome {
            Ok(drafts) if drafts.is_empty() => {
                self.fail(item, ChunkingErrorCode::ExtractorReturnedEmpty, None, metrics, started)
                    .await
            }
            Ok(drafts) => self.persist(item, drafts, strategy_name, metrics, started).await,
            Err(e) => {
                let message = truncate_chars(&e.to_string(), self.config.error_message_max_chars);
                self.fail(item, ChunkingErrorCode::ParserError, Some(message), metrics, started)
                    .await
            }
        }
    }

    /// Load an item from the repository and process it
    #[instrument(skip(self))]
    pub async fn process_item_by_id(
        &self,
        id: &KnowledgeItemId,
    ) -> Result<ProcessingResult, DomainError> {
        let item = self
            .repository
            .get_item(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Knowledge item '{}'", id)))?;

        self.process_item(&item).await
    }

    /// Process independent items concurrently.
    ///
    /// Each item must appear once; callers serialize reprocessing of the
    /// same item. Persistence errors are reported per item.
    #[instrument(skip(self, items), fields(count = items.len()))]
    pub async fn process_batch(
        &self,
        items: &[KnowledgeItem],
    ) -> Result<BatchProcessingResult, DomainError> {
        ensure_distinct(items.iter().map(|item| item.id()))?;

        let outcomes: Vec<_> = stream::iter(items.iter().enumerate())
            .map(|(position, item)| async move {
                (position, *item.id(), self.process_item(item).await)
            })
            .buffer_unordered(self.config.max_concurrency)
            .collect()
            .await;

        Ok(collect_batch(outcomes))
    }

    /// Load and process stored items concurrently
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn process_batch_by_id(
        &self,
        ids: &[KnowledgeItemId],
    ) -> Result<BatchProcessingResult, DomainError> {
        ensure_distinct(ids.iter())?;

        let outcomes: Vec<_> = stream::iter(ids.iter().enumerate())
            .map(|(position, id)| async move {
                (position, *id, self.process_item_by_id(id).await)
            })
            .buffer_unordered(self.config.max_concurrency)
            .collect()
            .await;

        Ok(collect_batch(outcomes))
    }

    fn strategy_for(&self, kind: StrategyKind) -> Result<&Arc<dyn ChunkingStrategy>, DomainError> {
        self.strategies
            .get(&kind)
            .ok_or_else(|| DomainError::internal(format!("No strategy registered for '{}'", kind)))
    }

    async fn fail(
        &self,
        item: &KnowledgeItem,
        error_code: ChunkingErrorCode,
        error_message: Option<String>,
        mut metrics: ChunkingMetrics,
        started: Instant,
    ) -> Result<ProcessingResult, DomainError> {
        metrics.duration_ms = Some(started.elapsed().as_millis() as u64);

        self.repository
            .record_diagnostics(
                item.id(),
                ChunkingDiagnostics::failed(error_code, error_message.clone(), metrics.clone()),
            )
            .await?;

        warn!(
            error_code = %error_code,
            strategy = metrics.strategy_used.as_deref().unwrap_or_default(),
            "Chunking failed"
        );

        Ok(self.finish(
            ProcessingResult::Failed {
                error_code,
                error_message,
                metrics,
            },
            started,
        ))
    }

    async fn persist(
        &self,
        item: &KnowledgeItem,
        drafts: Vec<ChunkDraft>,
        strategy: &str,
        mut metrics: ChunkingMetrics,
        started: Instant,
    ) -> Result<ProcessingResult, DomainError> {
        let chunks = materialize_chunks(item, drafts, Utc::now());
        let chunks_created = chunks.len();

        metrics.chunk_count = Some(chunks_created);
        metrics.duration_ms = Some(started.elapsed().as_millis() as u64);

        self.repository
            .replace_chunks(item.id(), chunks, ChunkingDiagnostics::created(metrics.clone()))
            .await?;

        info!(strategy = strategy, chunks = chunks_created, "Created knowledge chunks");

        Ok(self.finish(
            ProcessingResult::Created {
                chunks_created,
                metrics,
                strategy: strategy.to_string(),
            },
            started,
        ))
    }

    fn finish(&self, result: ProcessingResult, started: Instant) -> ProcessingResult {
        record_chunking_run(&result, started.elapsed());
        result
    }
}

fn ensure_distinct<'a>(
    ids: impl IntoIterator<Item = &'a KnowledgeItemId>,
) -> Result<(), DomainError> {
    let mut seen = HashSet::new();

    for id in ids {
        if !seen.insert(*id) {
            return Err(DomainError::validation(format!(
                "Knowledge item '{}' appears more than once in the batch",
                id
            )));
        }
    }

    Ok(())
}

fn collect_batch(
    mut outcomes: Vec<(usize, KnowledgeItemId, Result<ProcessingResult, DomainError>)>,
) -> BatchProcessingResult {
    outcomes.sort_by_key(|(position, _, _)| *position);

    let mut batch = BatchProcessingResult::new();
    for (_, id, outcome) in outcomes {
        match outcome {
            Ok(result) => batch.add(id, result),
            Err(e) => {
                warn!(item_id = %id, error = %e, "Batch item aborted");
                batch.add_error(id, e.to_string());
            }
        }
    }

    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chunking::{
        BatchItemOutcome, ChunkingStatus, ContentFormat, MockChunkingStrategy, SkipReason,
    };
    use crate::domain::knowledge::{
        Authority, ChunkRole, MockKnowledgeRepository, TransformationType,
    };
    use crate::infrastructure::knowledge::InMemoryKnowledgeRepository;
    use serde_json::json;

    const REVENUE_SERIES: &str = "2014 = $450/mo\n2015 = $1500/mo\n2016 = $3000/mo\n\
                                  2017 = $4200/mo\n2018 = $6100/mo\n2019 = $8800/mo\n\
                                  2020 = $12500/mo";

    const SHORT_POST: &str = "Retention beats acquisition for most early stage SaaS teams right now. \
                              Ask every churned user for a fifteen minute call this month and listen closely.";

    const CHURN_LINE: &str = "Churn hurts recurring revenue because it compounds over twelve months. \
                              We reduced churn from 8% to 3% in Q1 2024 by seeding onboarding emails.";

    const CHURN_ESSAY: &str = "Churn hurts recurring revenue because it compounds over twelve months. \
                               We reduced churn from 8% to 3% in Q1 2024 by seeding onboarding emails. \
                               Most teams wait too long before they talk to customers who are about to leave. \
                               A short call in the first week tells you more than any dashboard ever will. \
                               Keep the questions simple and write down the exact words people use.";

    async fn setup(
        items: Vec<KnowledgeItem>,
    ) -> (
        Arc<InMemoryKnowledgeRepository>,
        ChunkingCoordinator<InMemoryKnowledgeRepository>,
    ) {
        let repo = Arc::new(InMemoryKnowledgeRepository::with_items(items));
        let coordinator = ChunkingCoordinator::new(repo.clone(), ChunkingConfig::default()).unwrap();
        (repo, coordinator)
    }

    async fn stored(repo: &InMemoryKnowledgeRepository, id: &KnowledgeItemId) -> KnowledgeItem {
        repo.get_item(id).await.unwrap().unwrap()
    }

    fn claims() -> serde_json::Value {
        json!({
            "schema_version": "v1",
            "artifacts": [
                {
                    "claim": "Onboarding emails reduce early churn.",
                    "role": "heuristic",
                    "authority": "high",
                    "confidence": 0.9,
                    "context": {"domain": "email", "timeframe": "next quarter"}
                },
                {"claim": "Talk to churned users within a week."}
            ]
        })
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let repo = Arc::new(InMemoryKnowledgeRepository::new());
        let config = ChunkingConfig::default().with_max_concurrency(0);
        assert!(ChunkingCoordinator::new(repo, config).is_err());
    }

    #[tokio::test]
    async fn test_short_text_is_skipped() {
        let item = KnowledgeItem::new("Too short to matter.", "manual");
        let id = *item.id();
        let (repo, coordinator) = setup(vec![item.clone()]).await;

        let result = coordinator.process_item(&item).await.unwrap();

        match &result {
            ProcessingResult::Skipped { reason, metrics } => {
                assert_eq!(*reason, SkipReason::BelowMinChars);
                assert_eq!(metrics.preflight.clean_chars, 20);
                assert!(metrics.detected_format.is_none());
            }
            other => panic!("expected skipped, got {:?}", other),
        }

        let diagnostics = stored(&repo, &id).await.diagnostics().cloned().unwrap();
        assert_eq!(diagnostics.status, ChunkingStatus::Skipped);
        assert_eq!(diagnostics.skip_reason, Some(SkipReason::BelowMinChars));
        assert!(repo.list_chunks(&id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_url_only_is_skipped() {
        let item = KnowledgeItem::new(
            "  https://example.com/a/very/long/path/that/keeps/going/for/quite/a/while/and/more  ",
            "manual",
        );
        let (_repo, coordinator) = setup(vec![item.clone()]).await;

        let result = coordinator.process_item(&item).await.unwrap();
        assert!(matches!(
            result,
            ProcessingResult::Skipped {
                reason: SkipReason::UrlOnly,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_numeric_list_creates_data_points() {
        let item = KnowledgeItem::new(REVENUE_SERIES, "manual").with_organization_id("org-1");
        let id = *item.id();
        let (repo, coordinator) = setup(vec![item.clone()]).await;

        let result = coordinator.process_item(&item).await.unwrap();

        match &result {
            ProcessingResult::Created {
                chunks_created,
                metrics,
                strategy,
            } => {
                assert_eq!(*chunks_created, 8);
                assert_eq!(strategy, "list_to_data_points");
                assert_eq!(metrics.detected_format, Some(ContentFormat::NumericList));
                assert_eq!(metrics.llm_path, Some(LlmPathOutcome::NotEligible));
                assert_eq!(metrics.chunk_count, Some(8));
                assert!(metrics.duration_ms.is_some());
            }
            other => panic!("expected created, got {:?}", other),
        }

        let chunks = repo.list_chunks(&id).await.unwrap();
        assert_eq!(chunks.len(), 8);
        assert!(chunks[0].chunk_text.contains("2014 to 2020"));
        assert!(chunks.iter().all(|c| c.chunk_role == ChunkRole::Metric));
        assert!(chunks.iter().all(|c| c.organization_id.as_deref() == Some("org-1")));
        assert!(chunks.iter().all(|c| c.created_at == chunks[0].created_at));

        let diagnostics = stored(&repo, &id).await.diagnostics().cloned().unwrap();
        assert_eq!(diagnostics.status, ChunkingStatus::Created);
        assert_eq!(
            diagnostics.metrics.strategy_used.as_deref(),
            Some("list_to_data_points")
        );
    }

    #[tokio::test]
    async fn test_short_post_creates_claim_and_instruction() {
        let item = KnowledgeItem::new(SHORT_POST, "linkedin");
        let id = *item.id();
        let (repo, coordinator) = setup(vec![item.clone()]).await;

        let result = coordinator.process_item(&item).await.unwrap();
        assert_eq!(result.chunks_created(), 2);
        assert_eq!(result.metrics().detected_format, Some(ContentFormat::ShortPost));

        let chunks = repo.list_chunks(&id).await.unwrap();
        assert_eq!(chunks[0].chunk_role, ChunkRole::StrategicClaim);
        assert_eq!(chunks[1].chunk_role, ChunkRole::Instruction);
        assert_eq!(chunks[0].source_type, "linkedin");
        assert_eq!(chunks[0].source_spans.len(), 1);
    }

    #[tokio::test]
    async fn test_single_line_churn_example_is_short_post() {
        let item = KnowledgeItem::new(CHURN_LINE, "manual");
        let (_repo, coordinator) = setup(vec![item.clone()]).await;

        let result = coordinator.process_item(&item).await.unwrap();

        assert_eq!(result.metrics().detected_format, Some(ContentFormat::ShortPost));
        match result {
            ProcessingResult::Created {
                chunks_created,
                strategy,
                ..
            } => {
                assert_eq!(chunks_created, 2);
                assert_eq!(strategy, "short_post_claim");
            }
            other => panic!("expected created, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_plain_text_without_claims_falls_back_to_sentences() {
        let item = KnowledgeItem::new(CHURN_ESSAY, "manual");
        let id = *item.id();
        let (repo, coordinator) = setup(vec![item.clone()]).await;

        let result = coordinator.process_item(&item).await.unwrap();

        let metrics = result.metrics();
        assert_eq!(metrics.detected_format, Some(ContentFormat::PlainText));
        assert_eq!(metrics.llm_path, Some(LlmPathOutcome::AttemptedEmpty));
        assert_eq!(metrics.strategy_used.as_deref(), Some("fallback_sentence"));

        let chunks = repo.list_chunks(&id).await.unwrap();
        assert_eq!(chunks.len(), 3);
        assert!(chunks[0].chunk_text.starts_with("We reduced churn"));
        assert!(chunks[1].chunk_text.starts_with("Churn hurts"));
        for chunk in &chunks {
            assert_eq!(chunk.chunk_role, ChunkRole::Heuristic);
            assert_eq!(chunk.authority, Authority::Low);
            assert_eq!(chunk.transformation_type, TransformationType::Extractive);
        }
    }

    #[tokio::test]
    async fn test_plain_text_with_claims_uses_llm_artifacts() {
        let item = KnowledgeItem::new(CHURN_ESSAY, "manual").with_normalized_claims(claims());
        let id = *item.id();
        let (repo, coordinator) = setup(vec![item.clone()]).await;

        let result = coordinator.process_item(&item).await.unwrap();

        match &result {
            ProcessingResult::Created {
                chunks_created,
                metrics,
                strategy,
            } => {
                assert_eq!(*chunks_created, 2);
                assert_eq!(strategy, LLM_CLAIM_EXTRACTOR);
                assert_eq!(metrics.llm_path, Some(LlmPathOutcome::Used));
            }
            other => panic!("expected created, got {:?}", other),
        }

        let chunks = repo.list_chunks(&id).await.unwrap();
        assert_eq!(chunks[0].domain.as_deref(), Some("email marketing"));
        assert_eq!(chunks[0].authority, Authority::High);
        assert_eq!(chunks[0].transformation_type, TransformationType::Normalized);
        assert!(chunks[0].source_spans.is_empty());
        assert_eq!(chunks[1].chunk_role, ChunkRole::StrategicClaim);
    }

    #[tokio::test]
    async fn test_claims_ignored_outside_llm_band() {
        let item = KnowledgeItem::new(SHORT_POST, "manual").with_normalized_claims(claims());
        let (_repo, coordinator) = setup(vec![item.clone()]).await;

        let result = coordinator.process_item(&item).await.unwrap();
        assert_eq!(result.metrics().llm_path, Some(LlmPathOutcome::NotEligible));
        assert_eq!(
            result.metrics().strategy_used.as_deref(),
            Some("short_post_claim")
        );
    }

    #[tokio::test]
    async fn test_empty_strategy_output_fails_and_keeps_prior_chunks() {
        let item = KnowledgeItem::new(SHORT_POST, "manual");
        let id = *item.id();
        let (repo, coordinator) = setup(vec![item.clone()]).await;

        coordinator.process_item(&item).await.unwrap();
        assert_eq!(repo.list_chunks(&id).await.unwrap().len(), 2);

        let coordinator = coordinator.with_strategy(Arc::new(MockChunkingStrategy::returning(
            StrategyKind::ShortPostClaim,
            vec![],
        )));
        let result = coordinator.process_item(&item).await.unwrap();

        match &result {
            ProcessingResult::Failed {
                error_code,
                error_message,
                ..
            } => {
                assert_eq!(*error_code, ChunkingErrorCode::ExtractorReturnedEmpty);
                assert!(error_message.is_none());
            }
            other => panic!("expected failed, got {:?}", other),
        }

        let diagnostics = stored(&repo, &id).await.diagnostics().cloned().unwrap();
        assert_eq!(diagnostics.status, ChunkingStatus::Failed);
        assert_eq!(repo.list_chunks(&id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_strategy_error_is_truncated_parser_error() {
        let item = KnowledgeItem::new(CHURN_ESSAY, "manual");
        let id = *item.id();
        let (repo, coordinator) = setup(vec![item.clone()]).await;
        let coordinator = coordinator.with_strategy(Arc::new(MockChunkingStrategy::failing(
            StrategyKind::FallbackSentence,
            "x".repeat(5000),
        )));

        let result = coordinator.process_item(&item).await.unwrap();

        match &result {
            ProcessingResult::Failed {
                error_code,
                error_message,
                metrics,
            } => {
                assert_eq!(*error_code, ChunkingErrorCode::ParserError);
                let message = error_message.as_ref().unwrap();
                assert_eq!(message.chars().count(), 1000);
                assert!(message.starts_with("Parse error"));
                assert_eq!(metrics.strategy_used.as_deref(), Some("fallback_sentence"));
            }
            other => panic!("expected failed, got {:?}", other),
        }

        let diagnostics = stored(&repo, &id).await.diagnostics().cloned().unwrap();
        assert_eq!(diagnostics.error_code, Some(ChunkingErrorCode::ParserError));
        assert!(repo.list_chunks(&id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reprocessing_is_idempotent() {
        let item = KnowledgeItem::new(REVENUE_SERIES, "manual");
        let id = *item.id();
        let (repo, coordinator) = setup(vec![item.clone()]).await;

        let first = coordinator.process_item(&item).await.unwrap();
        let first_chunks = repo.list_chunks(&id).await.unwrap();

        let second = coordinator.process_item(&item).await.unwrap();
        let second_chunks = repo.list_chunks(&id).await.unwrap();

        assert_eq!(first.status(), second.status());
        assert_eq!(first.metrics().strategy_used, second.metrics().strategy_used);
        assert_eq!(first_chunks.len(), second_chunks.len());

        for (a, b) in first_chunks.iter().zip(&second_chunks) {
            assert_ne!(a.id, b.id);
            assert_eq!(a.chunk_text, b.chunk_text);
            assert_eq!(a.chunk_role, b.chunk_role);
            assert_eq!(a.confidence, b.confidence);
            assert_eq!(a.metadata, b.metadata);
        }
    }

    #[tokio::test]
    async fn test_failed_write_keeps_previous_chunk_set() {
        let original = KnowledgeItem::new(REVENUE_SERIES, "manual");
        let id = *original.id();
        let (repo, coordinator) = setup(vec![original.clone()]).await;

        coordinator.process_item(&original).await.unwrap();
        let before = repo.list_chunks(&id).await.unwrap();

        let edited = KnowledgeItem::new(SHORT_POST, "manual").with_id(id);
        repo.fail_next_write();
        let result = coordinator.process_item(&edited).await;

        assert!(result.unwrap_err().is_storage());
        let after = repo.list_chunks(&id).await.unwrap();
        assert_eq!(before, after);
        assert_eq!(
            stored(&repo, &id).await.diagnostics().unwrap().metrics.strategy_used.as_deref(),
            Some("list_to_data_points")
        );
    }

    #[tokio::test]
    async fn test_storage_error_propagates() {
        let mut mock = MockKnowledgeRepository::new();
        mock.expect_replace_chunks()
            .times(1)
            .returning(|_, _, _| Err(DomainError::storage("connection reset")));
        mock.expect_record_diagnostics().never();

        let coordinator = ChunkingCoordinator::new(Arc::new(mock), ChunkingConfig::default()).unwrap();
        let item = KnowledgeItem::new(SHORT_POST, "manual");

        let error = coordinator.process_item(&item).await.unwrap_err();
        assert!(error.to_string().contains("connection reset"));
    }

    #[tokio::test]
    async fn test_skip_writes_only_diagnostics() {
        let mut mock = MockKnowledgeRepository::new();
        mock.expect_record_diagnostics()
            .times(1)
            .withf(|_, diagnostics| diagnostics.skip_reason == Some(SkipReason::EmptyAfterClean))
            .returning(|_, _| Ok(()));
        mock.expect_replace_chunks().never();

        let coordinator = ChunkingCoordinator::new(Arc::new(mock), ChunkingConfig::default()).unwrap();
        let item = KnowledgeItem::new("   \n\t  ", "manual");

        let result = coordinator.process_item(&item).await.unwrap();
        assert_eq!(result.status(), ChunkingStatus::Skipped);
    }

    #[tokio::test]
    async fn test_process_item_by_id() {
        let item = KnowledgeItem::new(SHORT_POST, "manual");
        let id = *item.id();
        let (_repo, coordinator) = setup(vec![item]).await;

        let result = coordinator.process_item_by_id(&id).await.unwrap();
        assert!(result.is_created());

        let missing = coordinator
            .process_item_by_id(&KnowledgeItemId::new())
            .await
            .unwrap_err();
        assert!(missing.to_string().contains("Not found"));
    }

    #[tokio::test]
    async fn test_process_batch_keeps_input_order() {
        let items = vec![
            KnowledgeItem::new(REVENUE_SERIES, "manual"),
            KnowledgeItem::new("tiny", "manual"),
            KnowledgeItem::new(SHORT_POST, "manual"),
            KnowledgeItem::new(CHURN_ESSAY, "manual"),
        ];
        let ids: Vec<_> = items.iter().map(|i| *i.id()).collect();
        let (_repo, coordinator) = setup(items.clone()).await;

        let batch = coordinator.process_batch(&items).await.unwrap();

        assert_eq!(batch.total_items, 4);
        assert_eq!(batch.created, 3);
        assert_eq!(batch.skipped, 1);
        assert_eq!(batch.total_chunks_created(), 8 + 2 + 3);

        let result_ids: Vec<_> = batch.results.iter().map(|r| r.item_id).collect();
        assert_eq!(result_ids, ids);
    }

    #[tokio::test]
    async fn test_process_batch_rejects_duplicates() {
        let item = KnowledgeItem::new(SHORT_POST, "manual");
        let (_repo, coordinator) = setup(vec![item.clone()]).await;

        let error = coordinator
            .process_batch(&[item.clone(), item])
            .await
            .unwrap_err();
        assert!(error.to_string().contains("more than once"));
    }

    #[tokio::test]
    async fn test_process_batch_by_id_reports_missing_items() {
        let item = KnowledgeItem::new(SHORT_POST, "manual");
        let known = *item.id();
        let unknown = KnowledgeItemId::new();
        let (_repo, coordinator) = setup(vec![item]).await;

        let batch = coordinator
            .process_batch_by_id(&[known, unknown])
            .await
            .unwrap();

        assert_eq!(batch.created, 1);
        assert_eq!(batch.errored, 1);
        assert!(matches!(
            &batch.results[1].outcome,
            BatchItemOutcome::Error { error } if error.contains("Not found")
        ));
    }
}
