//! Local journal of clock events.
//!
//! Every accepted transition is appended here so that a later process can
//! rebuild the day's session through [`AttendanceSource`]. The journal is
//! append-only; nothing is updated or deleted.
//!
//! # Schema
//!
//! `clock_events` stores one row per event. `timestamp_millis` is the Unix
//! time in milliseconds, `utc_offset_secs` the local offset when the event was
//! recorded, and `local_date` the local calendar day (`YYYY-MM-DD`) used to
//! select a single working day. Rows are read back in insertion order, which
//! is the order the engine accepted them.
//!
//! # Thread Safety
//!
//! [`Database`] wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.

use std::path::Path;

use chrono::NaiveDate;
use rusqlite::{Connection, params};
use thiserror::Error;

use pc_core::{AttendanceSource, ClockAction, ClockEvent, UnknownClockAction};

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// A stored action string is not a known clock action.
    #[error("invalid action for event {id}")]
    InvalidAction {
        id: i64,
        #[source]
        source: UnknownClockAction,
    },
    /// The event's timestamp or offset cannot be turned into a local date.
    #[error("event has an out-of-range timestamp: {0} ms")]
    InvalidTimestamp(i64),
}

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

/// Columns selected for every event query, in `row_to_event` order.
const EVENT_COLUMNS: &str = "id, action, wall_clock_label, timestamp_millis, utc_offset_secs";

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS clock_events (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                action TEXT NOT NULL,
                wall_clock_label TEXT NOT NULL,
                timestamp_millis INTEGER NOT NULL,
                utc_offset_secs INTEGER NOT NULL,
                local_date TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_clock_events_date ON clock_events(local_date);
            ",
        )?;
        Ok(())
    }

    /// Appends an event and returns its row ID.
    pub fn insert_event(&mut self, event: &ClockEvent) -> Result<i64, DbError> {
        let local_date = event
            .occurred_at()
            .ok_or(DbError::InvalidTimestamp(event.timestamp_millis))?
            .date_naive();

        self.conn.execute(
            "
            INSERT INTO clock_events
            (action, wall_clock_label, timestamp_millis, utc_offset_secs, local_date)
            VALUES (?, ?, ?, ?, ?)
            ",
            params![
                event.action.as_str(),
                event.wall_clock_label,
                event.timestamp_millis,
                event.utc_offset_secs,
                local_date.to_string(),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::debug!(id, action = %event.action, "clock event journaled");
        Ok(id)
    }

    /// Events recorded on the given local day, in the order they were journaled.
    pub fn list_events_for_day(&self, day: NaiveDate) -> Result<Vec<ClockEvent>, DbError> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM clock_events
             WHERE local_date = ?
             ORDER BY id ASC"
        );
        self.query_events(&sql, params![day.to_string()])
    }

    /// Total number of journaled events.
    pub fn count_events(&self) -> Result<i64, DbError> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM clock_events", [], |row| row.get(0))?;
        Ok(count)
    }

    fn query_events(
        &self,
        sql: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<ClockEvent>, DbError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, i32>(4)?,
            ))
        })?;

        let mut events = Vec::new();
        for row in rows {
            let (id, action, wall_clock_label, timestamp_millis, utc_offset_secs) = row?;
            let action: ClockAction = action
                .parse()
                .map_err(|source| DbError::InvalidAction { id, source })?;
            events.push(ClockEvent {
                action,
                wall_clock_label,
                timestamp_millis,
                utc_offset_secs,
            });
        }
        Ok(events)
    }
}

impl AttendanceSource for Database {
    type Error = DbError;

    fn events_for_day(&self, day: NaiveDate) -> Result<Vec<ClockEvent>, Self::Error> {
        self.list_events_for_day(day)
    }
}
