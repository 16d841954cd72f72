//! SQLite backend for person records.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::debug;

use crate::persistence::{PersonRecord, PersonRepository, RepositoryError};
use crate::tracker::TrackId;

/// [`PersonRepository`] backed by a `queue_people` table.
///
/// Writes open a transaction on demand; [`commit`](PersonRepository::commit)
/// closes it.
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Open (or create) the database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// Create an in-memory database.
    pub fn in_memory() -> Result<Self, RepositoryError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, RepositoryError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS queue_people (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                track_id INTEGER NOT NULL UNIQUE,
                enter_time TEXT,
                wait_time REAL NOT NULL DEFAULT 0,
                service_start TEXT,
                service_time REAL NOT NULL DEFAULT 0,
                exit_time TEXT
            )",
            [],
        )?;
        Ok(Self { conn })
    }

    fn begin(&self) -> Result<(), RepositoryError> {
        if self.conn.is_autocommit() {
            self.conn.execute_batch("BEGIN")?;
        }
        Ok(())
    }

    fn key(track_id: TrackId) -> Result<i64, RepositoryError> {
        i64::try_from(track_id)
            .map_err(|_| RepositoryError::Backend(format!("track id {track_id} out of range")))
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<PersonRecord> {
        let track_id: i64 = row.get(0)?;
        Ok(PersonRecord {
            track_id: track_id as TrackId,
            enter_time: row.get(1)?,
            wait_time: row.get(2)?,
            service_start: row.get(3)?,
            service_time: row.get(4)?,
            exit_time: row.get(5)?,
        })
    }
}

impl PersonRepository for SqliteRepository {
    fn create(
        &mut self,
        track_id: TrackId,
        enter_time: DateTime<Utc>,
    ) -> Result<PersonRecord, RepositoryError> {
        if self.find_by_track_id(track_id)?.is_some() {
            return Err(RepositoryError::Duplicate(track_id));
        }
        self.begin()?;
        let record = PersonRecord::new(track_id, enter_time);
        self.conn.execute(
            "INSERT INTO queue_people (track_id, enter_time, wait_time, service_start, service_time, exit_time)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                Self::key(track_id)?,
                record.enter_time,
                record.wait_time,
                record.service_start,
                record.service_time,
                record.exit_time,
            ],
        )?;
        Ok(record)
    }

    fn find_by_track_id(&self, track_id: TrackId) -> Result<Option<PersonRecord>, RepositoryError> {
        let record = self
            .conn
            .query_row(
                "SELECT track_id, enter_time, wait_time, service_start, service_time, exit_time
                 FROM queue_people WHERE track_id = ?1",
                params![Self::key(track_id)?],
                Self::from_row,
            )
            .optional()?;
        Ok(record)
    }

    fn update(&mut self, record: &PersonRecord) -> Result<(), RepositoryError> {
        self.begin()?;
        let changed = self.conn.execute(
            "UPDATE queue_people
             SET wait_time = ?2, service_start = ?3, service_time = ?4, exit_time = ?5
             WHERE track_id = ?1",
            params![
                Self::key(record.track_id)?,
                record.wait_time,
                record.service_start,
                record.service_time,
                record.exit_time,
            ],
        )?;
        if changed == 0 {
            return Err(RepositoryError::NotFound(record.track_id));
        }
        Ok(())
    }

    fn commit(&mut self) -> Result<(), RepositoryError> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("COMMIT")?;
            debug!("committed queue_people transaction");
        }
        Ok(())
    }
}
