//! Observability infrastructure - Metrics

mod metrics;

pub use metrics::record_chunking_run;
