//! Infrastructure layer - Strategy, storage and observability implementations

pub mod chunking;
pub mod knowledge;
pub mod logging;
pub mod observability;
