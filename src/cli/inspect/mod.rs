//! Inspect command - reports gating, detection and routing without chunking

use clap::Args;
use serde::Serialize;

use crate::domain::chunking::{
    run_preflight, ChunkingConfig, ContentFormat, FormatDetector, PreflightMetrics, SkipReason,
    StrategyKind, StrategyRouter,
};

/// Arguments for the inspect command
#[derive(Args, Clone)]
pub struct InspectArgs {
    /// Text file to inspect, or `-` for stdin
    pub input: String,
}

/// What the pipeline would do with a text
#[derive(Debug, Serialize)]
pub struct InspectReport {
    pub eligible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<SkipReason>,
    pub metrics: PreflightMetrics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detected_format: Option<ContentFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<StrategyKind>,
    pub llm_eligible: bool,
}

/// Build the report for a text
pub fn inspect(text: &str, config: &ChunkingConfig) -> InspectReport {
    let verdict = run_preflight(text, config);

    if let Some(reason) = verdict.skip_reason {
        return InspectReport {
            eligible: false,
            skip_reason: Some(reason),
            metrics: verdict.metrics,
            detected_format: None,
            strategy: None,
            llm_eligible: false,
        };
    }

    let tokens = verdict.metrics.clean_tokens_est;
    let format = FormatDetector::new(config.short_text_max_tokens).detect(text.trim());
    let router = StrategyRouter::from_config(config);

    InspectReport {
        eligible: true,
        skip_reason: None,
        metrics: verdict.metrics,
        detected_format: Some(format),
        strategy: Some(router.select_strategy(format, tokens)),
        llm_eligible: router.should_use_llm_extraction(format, tokens),
    }
}

/// Run the inspect command
pub async fn run(args: InspectArgs) -> anyhow::Result<()> {
    let config = super::bootstrap();

    let text = super::read_input(&args.input).await?;
    let report = inspect(&text, &config.chunking);

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
