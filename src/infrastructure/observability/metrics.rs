//! Chunking run metrics
//!
//! Recorded through the `metrics` facade. Installing a recorder is left to
//! the embedding application; without one these calls are no-ops.

use std::time::Duration;

use metrics::{counter, histogram};

use crate::domain::chunking::ProcessingResult;

const UNKNOWN_STRATEGY: &str = "none";

/// Record the outcome of one chunking run
pub fn record_chunking_run(result: &ProcessingResult, duration: Duration) {
    let status = [("status", result.status().to_string())];
    counter!("chunking_runs_total", &status).increment(1);

    match result {
        ProcessingResult::Skipped { reason, .. } => {
            let labels = [("reason", reason.to_string())];
            counter!("chunking_skips_total", &labels).increment(1);
        }
        ProcessingResult::Failed {
            error_code,
            metrics,
            ..
        } => {
            let labels = [("error_code", error_code.to_string())];
            counter!("chunking_failures_total", &labels).increment(1);

            let strategy = [("strategy", strategy_label(metrics.strategy_used.as_deref()))];
            histogram!("chunking_duration_seconds", &strategy).record(duration.as_secs_f64());
        }
        ProcessingResult::Created {
            chunks_created,
            strategy,
            ..
        } => {
            let labels = [("strategy", strategy_label(Some(strategy)))];
            counter!("chunking_chunks_created_total", &labels).increment(*chunks_created as u64);
            histogram!("chunking_duration_seconds", &labels).record(duration.as_secs_f64());
        }
    }
}

fn strategy_label(strategy: Option<&str>) -> String {
    strategy
        .filter(|s| !s.is_empty())
        .unwrap_or(UNKNOWN_STRATEGY)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chunking::{ChunkingErrorCode, ChunkingMetrics, SkipReason};

    #[test]
    fn test_strategy_label() {
        assert_eq!(strategy_label(Some("fallback_sentence")), "fallback_sentence");
        assert_eq!(strategy_label(Some("")), "none");
        assert_eq!(strategy_label(None), "none");
    }

    #[test]
    fn test_record_without_recorder_is_noop() {
        let results = [
            ProcessingResult::Skipped {
                reason: SkipReason::UrlOnly,
                metrics: ChunkingMetrics::default(),
            },
            ProcessingResult::Failed {
                error_code: ChunkingErrorCode::ParserError,
                error_message: Some("bad input".to_string()),
                metrics: ChunkingMetrics::default(),
            },
            ProcessingResult::Created {
                chunks_created: 3,
                metrics: ChunkingMetrics::default(),
                strategy: "list_to_data_points".to_string(),
            },
        ];

        for result in &results {
            record_chunking_run(result, Duration::from_millis(12));
        }
    }
}
