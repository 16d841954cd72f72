//! Durable lifecycle records and the repositories that store them.

mod memory;
mod record;
mod repository;

#[cfg(feature = "sqlite")]
mod sqlite;

pub use memory::InMemoryRepository;
pub use record::PersonRecord;
pub use repository::{PersonRepository, RepositoryError};

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteRepository;
