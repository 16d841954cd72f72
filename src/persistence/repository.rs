//! Trait for the durable record store.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::persistence::PersonRecord;
use crate::tracker::TrackId;

/// Error type for repository failures.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// A record for this track id already exists.
    #[error("record for track {0} already exists")]
    Duplicate(TrackId),
    /// Update of a record that was never created.
    #[error("no record for track {0}")]
    NotFound(TrackId),
    #[cfg(feature = "sqlite")]
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Any other storage failure.
    #[error("storage backend: {0}")]
    Backend(String),
}

/// Keyed store of [`PersonRecord`]s.
///
/// Writes become durable only after [`commit`](PersonRepository::commit).
/// Every call is synchronous; implementations are free to batch internally
/// as long as `commit` flushes.
///
/// # Example
///
/// ```ignore
/// use queue_dwell::{PersonRecord, PersonRepository, RepositoryError};
///
/// struct PostgresRepository { /* ... */ }
///
/// impl PersonRepository for PostgresRepository {
///     fn create(&mut self, track_id: u64, enter_time: DateTime<Utc>) -> Result<PersonRecord, RepositoryError> {
///         // INSERT INTO queue_people ...
///     }
///     // ...
/// }
/// ```
pub trait PersonRepository {
    /// Insert a new record with `enter_time` and every other field at its default.
    fn create(
        &mut self,
        track_id: TrackId,
        enter_time: DateTime<Utc>,
    ) -> Result<PersonRecord, RepositoryError>;

    /// Look up the record of a track id.
    fn find_by_track_id(&self, track_id: TrackId) -> Result<Option<PersonRecord>, RepositoryError>;

    /// Overwrite the stored record with the same track id.
    fn update(&mut self, record: &PersonRecord) -> Result<(), RepositoryError>;

    /// Make all previous writes durable.
    fn commit(&mut self) -> Result<(), RepositoryError>;
}
