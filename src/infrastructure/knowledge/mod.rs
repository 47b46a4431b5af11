//! Knowledge repository implementations

mod in_memory;
mod postgres_repository;

pub use in_memory::InMemoryKnowledgeRepository;
pub use postgres_repository::PostgresKnowledgeRepository;
