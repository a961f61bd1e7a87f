//! SQLite-based work log.
//!
//! One row per completed focus session:
//! - date (`YYYY-MM-DD`, local time)
//! - nominal duration in minutes
//! - task name
//! - local time range (`HH:MM - HH:MM`)

use std::path::Path;

use chrono::{DateTime, Duration, Local};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::{DatabaseError, Result};
use crate::events::FinishEvent;

/// Stored when a session finishes without a task name.
pub const DEFAULT_TASK_NAME: &str = "Untitled task";
/// Default number of rows returned by [`WorkLog::recent`].
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Receives completed focus sessions.
pub trait LogWriter {
    fn write(&mut self, entry: &LogEntry) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub date: String,
    pub duration_minutes: u32,
    pub task_name: String,
    pub time_range: String,
}

impl LogEntry {
    /// Build the row for a session that ended at `end`.
    ///
    /// The start of the range is `end - elapsed_minutes`.
    pub fn from_finish(finish: &FinishEvent, task_name: &str, end: DateTime<Local>) -> Self {
        let minutes = finish.elapsed_minutes;
        let start = end - Duration::minutes(i64::from(minutes));
        let task_name = match task_name.trim() {
            "" => DEFAULT_TASK_NAME.to_string(),
            name => name.to_string(),
        };
        Self {
            date: end.format("%Y-%m-%d").to_string(),
            duration_minutes: minutes,
            task_name,
            time_range: format!("{} - {}", start.format("%H:%M"), end.format("%H:%M")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub id: i64,
    #[serde(flatten)]
    pub entry: LogEntry,
}

/// SQLite database for the work log.
pub struct WorkLog {
    conn: Connection,
}

impl WorkLog {
    /// Open the log at `~/.config/pomonoise/work_log.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("work_log.db");
        Self::open_at(&path)
    }

    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let log = Self { conn };
        log.migrate()?;
        Ok(log)
    }

    /// Open an in-memory log (for tests and dry runs).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let log = Self { conn };
        log.migrate()?;
        Ok(log)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS logs (
                id               INTEGER PRIMARY KEY AUTOINCREMENT,
                date             TEXT NOT NULL,
                duration_minutes INTEGER NOT NULL,
                task_name        TEXT NOT NULL DEFAULT '',
                time_range       TEXT NOT NULL DEFAULT ''
            );

            CREATE INDEX IF NOT EXISTS idx_logs_date ON logs(date);",
        )?;
        Ok(())
    }

    /// Insert one entry, returning its row id.
    pub fn record(&self, entry: &LogEntry) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO logs (date, duration_minutes, task_name, time_range)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                entry.date,
                entry.duration_minutes,
                entry.task_name,
                entry.time_range,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Most recent entries first.
    pub fn recent(&self, limit: usize) -> Result<Vec<LogRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, date, duration_minutes, task_name, time_range
             FROM logs
             ORDER BY id DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(LogRecord {
                id: row.get(0)?,
                entry: LogEntry {
                    date: row.get(1)?,
                    duration_minutes: row.get(2)?,
                    task_name: row.get(3)?,
                    time_range: row.get(4)?,
                },
            })
        })?;
        let records = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Total focus minutes logged on `date` (`YYYY-MM-DD`).
    pub fn minutes_on(&self, date: &str) -> Result<u64> {
        let minutes = self.conn.query_row(
            "SELECT COALESCE(SUM(duration_minutes), 0) FROM logs WHERE date = ?1",
            params![date],
            |row| row.get::<_, u64>(0),
        )?;
        Ok(minutes)
    }
}

impl LogWriter for WorkLog {
    fn write(&mut self, entry: &LogEntry) -> Result<()> {
        let id = self.record(entry)?;
        tracing::debug!(id, task = %entry.task_name, "work log entry saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::SessionMode;
    use chrono::{TimeZone, Utc};

    fn finish(mode: SessionMode) -> FinishEvent {
        FinishEvent {
            mode,
            elapsed_minutes: mode.minutes(),
            at: Utc::now(),
        }
    }

    #[test]
    fn entry_time_range_spans_nominal_minutes() {
        let end = Local.with_ymd_and_hms(2024, 3, 9, 14, 10, 0).unwrap();
        let entry = LogEntry::from_finish(&finish(SessionMode::Focus25), "Write report", end);
        assert_eq!(entry.date, "2024-03-09");
        assert_eq!(entry.duration_minutes, 25);
        assert_eq!(entry.task_name, "Write report");
        assert_eq!(entry.time_range, "13:45 - 14:10");
    }

    #[test]
    fn entry_crossing_midnight_keeps_end_date() {
        let end = Local.with_ymd_and_hms(2024, 3, 10, 0, 20, 0).unwrap();
        let entry = LogEntry::from_finish(&finish(SessionMode::Focus50), "", end);
        assert_eq!(entry.date, "2024-03-10");
        assert_eq!(entry.time_range, "23:30 - 00:20");
        assert_eq!(entry.task_name, DEFAULT_TASK_NAME);
    }

    #[test]
    fn record_and_query() {
        let log = WorkLog::open_memory().unwrap();
        let end = Local.with_ymd_and_hms(2024, 3, 9, 9, 25, 0).unwrap();
        log.record(&LogEntry::from_finish(&finish(SessionMode::Focus25), "a", end))
            .unwrap();
        log.record(&LogEntry::from_finish(&finish(SessionMode::Focus50), "b", end))
            .unwrap();

        let rows = log.recent(DEFAULT_HISTORY_LIMIT).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].entry.task_name, "b");
        assert_eq!(rows[1].entry.task_name, "a");
        assert_eq!(log.minutes_on("2024-03-09").unwrap(), 75);
        assert_eq!(log.minutes_on("2024-03-08").unwrap(), 0);
    }

    #[test]
    fn recent_honors_limit() {
        let log = WorkLog::open_memory().unwrap();
        let end = Local.with_ymd_and_hms(2024, 3, 9, 9, 25, 0).unwrap();
        for i in 0..5 {
            log.record(&LogEntry::from_finish(&finish(SessionMode::Focus25), &i.to_string(), end))
                .unwrap();
        }
        let rows = log.recent(3).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].entry.task_name, "4");
    }

    #[test]
    fn open_at_persists_between_connections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("work_log.db");
        let end = Local.with_ymd_and_hms(2024, 3, 9, 9, 25, 0).unwrap();
        {
            let mut log = WorkLog::open_at(&path).unwrap();
            log.write(&LogEntry::from_finish(&finish(SessionMode::Focus25), "x", end))
                .unwrap();
        }
        let log = WorkLog::open_at(&path).unwrap();
        assert_eq!(log.recent(10).unwrap().len(), 1);
    }
}
