use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::persistence::{PersonRecord, PersonRepository, RepositoryError};
use crate::tracker::TrackId;

/// In-memory [`PersonRepository`] with session-like staging.
///
/// Writes are staged until [`commit`](PersonRepository::commit); lookups see
/// staged writes first, so the tracker reads its own uncommitted changes.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    committed: BTreeMap<TrackId, PersonRecord>,
    staged: BTreeMap<TrackId, PersonRecord>,
    commits: usize,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed record of a track id.
    pub fn get(&self, track_id: TrackId) -> Option<&PersonRecord> {
        self.committed.get(&track_id)
    }

    /// All committed records, ordered by track id.
    pub fn records(&self) -> impl Iterator<Item = &PersonRecord> {
        self.committed.values()
    }

    pub fn len(&self) -> usize {
        self.committed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.committed.is_empty()
    }

    /// Whether writes are waiting for a commit.
    pub fn has_pending(&self) -> bool {
        !self.staged.is_empty()
    }

    /// Number of commits issued so far.
    pub fn commit_count(&self) -> usize {
        self.commits
    }

    fn exists(&self, track_id: TrackId) -> bool {
        self.staged.contains_key(&track_id) || self.committed.contains_key(&track_id)
    }
}

impl PersonRepository for InMemoryRepository {
    fn create(
        &mut self,
        track_id: TrackId,
        enter_time: DateTime<Utc>,
    ) -> Result<PersonRecord, RepositoryError> {
        if self.exists(track_id) {
            return Err(RepositoryError::Duplicate(track_id));
        }
        let record = PersonRecord::new(track_id, enter_time);
        self.staged.insert(track_id, record.clone());
        Ok(record)
    }

    fn find_by_track_id(&self, track_id: TrackId) -> Result<Option<PersonRecord>, RepositoryError> {
        Ok(self
            .staged
            .get(&track_id)
            .or_else(|| self.committed.get(&track_id))
            .cloned())
    }

    fn update(&mut self, record: &PersonRecord) -> Result<(), RepositoryError> {
        if !self.exists(record.track_id) {
            return Err(RepositoryError::NotFound(record.track_id));
        }
        self.staged.insert(record.track_id, record.clone());
        Ok(())
    }

    fn commit(&mut self) -> Result<(), RepositoryError> {
        self.committed.append(&mut self.staged);
        self.commits += 1;
        Ok(())
    }
}
