use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::storage::{KeyValueStore, StorageError, SESSIONS_KEY};

/// One continuous reading interval, from opening a book to leaving the
/// reader view. Immutable once appended to the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingSession {
    pub id: String,
    /// Weak reference; removing the book does not cascade into the log.
    pub book_id: String,
    pub date: NaiveDate,
    pub start_time: DateTime<Local>,
    pub end_time: Option<DateTime<Local>>,
    /// Accrued reading time in seconds.
    pub duration: u64,
    /// May be negative when the reader paged backward during the session.
    pub pages_read: i64,
    pub words_read: u64,
    /// Derived at finalization: `words_read / (duration / 60)`, 0 when the
    /// session had no measurable duration.
    pub wpm: u64,
}

impl ReadingSession {
    pub fn begin(book_id: &str, now: DateTime<Local>) -> Self {
        Self {
            id: format!("session-{}", now.timestamp_millis()),
            book_id: book_id.to_string(),
            date: now.date_naive(),
            start_time: now,
            end_time: None,
            duration: 0,
            pages_read: 0,
            words_read: 0,
            wpm: 0,
        }
    }

    /// Words per minute for the given accruals; 0 when duration is 0.
    pub fn derive_wpm(words_read: u64, duration_secs: u64) -> u64 {
        if duration_secs == 0 {
            return 0;
        }
        (words_read as f64 / (duration_secs as f64 / 60.0)).round() as u64
    }

    pub fn minutes(&self) -> f64 {
        self.duration as f64 / 60.0
    }
}

/// Append-only session log persisted under the `"readingSessions"` key.
/// No deduplication by id is enforced at the storage layer.
#[derive(Debug)]
pub struct SessionLog<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> SessionLog<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn sessions(&self) -> Vec<ReadingSession> {
        self.store.load(SESSIONS_KEY).unwrap_or_default()
    }

    pub fn append(&self, session: &ReadingSession) -> Result<(), StorageError> {
        let mut sessions = self.sessions();
        sessions.push(session.clone());
        self.store.save(SESSIONS_KEY, &sessions)
    }
}
