//! Deterministic chunking strategy implementations

mod fallback_sentence;
mod list_data_points;
mod short_post;

pub use fallback_sentence::FallbackSentenceStrategy;
pub use list_data_points::{DataPoint, ListToDataPointsStrategy};
pub use short_post::ShortPostClaimStrategy;
