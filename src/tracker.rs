use chrono::{DateTime, Local};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::preferences::{PreferencesPatch, ReadingPreferences};
use crate::session::{ReadingSession, SessionLog};
use crate::storage::{KeyValueStore, StorageError};

/// Fixed word-rate used to estimate words read from elapsed time. The
/// placeholder reader never counts real words.
pub const AVERAGE_READING_WPM: u64 = 200;

/// An annotation anchored to a page of the open book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Highlight {
    pub id: String,
    pub book_id: String,
    pub page: u32,
    pub text: String,
    pub color: String,
    pub created_at: DateTime<Local>,
    pub note: Option<String>,
}

#[derive(Debug)]
struct ActiveSession {
    record: ReadingSession,
    start_page: u32,
}

/// Tracks the transient reading state for whichever book is open: the
/// in-progress session, per-session bookmarks and highlights, and the
/// global typographic preferences.
///
/// Session lifecycle is Idle -> Active -> Idle. Exactly one session can be
/// Active; starting another while Active abandons the previous one without
/// finalizing it (long-standing behavior, kept until product says otherwise).
#[derive(Debug)]
pub struct Tracker<S: KeyValueStore> {
    current_page: u32,
    total_pages: u32,
    bookmarks: BTreeSet<u32>,
    highlights: Vec<Highlight>,
    preferences: ReadingPreferences,
    active: Option<ActiveSession>,
    log: SessionLog<S>,
}

impl<S: KeyValueStore> Tracker<S> {
    pub fn new(store: S, preferences: ReadingPreferences) -> Self {
        Self {
            current_page: 1,
            total_pages: 0,
            bookmarks: BTreeSet::new(),
            highlights: Vec::new(),
            preferences,
            active: None,
            log: SessionLog::new(store),
        }
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn set_current_page(&mut self, page: u32) {
        self.current_page = page;
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn set_total_pages(&mut self, pages: u32) {
        self.total_pages = pages;
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn current_session(&self) -> Option<&ReadingSession> {
        self.active.as_ref().map(|a| &a.record)
    }

    /// Begin a session for `book_id` at the tracker's current page. An
    /// already-Active session is dropped on the floor, unlogged.
    pub fn start_session(&mut self, book_id: &str) {
        if let Some(abandoned) = self.active.take() {
            debug!(
                "abandoning unfinished session {} for book {}",
                abandoned.record.id, abandoned.record.book_id
            );
        }
        self.bookmarks.clear();
        self.highlights.clear();
        self.active = Some(ActiveSession {
            record: ReadingSession::begin(book_id, Local::now()),
            start_page: self.current_page,
        });
    }

    /// Accrue elapsed reading time into the Active session. Words read are
    /// estimated at a fixed 200 wpm. No-op while Idle, which also guards
    /// timer ticks that fire after the reader view was torn down.
    pub fn tick(&mut self, elapsed_secs: u64) {
        if let Some(active) = self.active.as_mut() {
            active.record.duration += elapsed_secs;
            active.record.words_read +=
                (elapsed_secs as f64 / 60.0 * AVERAGE_READING_WPM as f64).round() as u64;
        }
    }

    /// Finalize the Active session exactly once: stamp the end time, derive
    /// pages read (unclamped; negative means the reader paged backward) and
    /// wpm, append the record to the log, and return to Idle. While Idle
    /// this is a no-op returning `Ok(None)`.
    pub fn end_session(&mut self) -> Result<Option<ReadingSession>, StorageError> {
        let Some(active) = self.active.take() else {
            return Ok(None);
        };
        let mut record = active.record;
        record.end_time = Some(Local::now());
        record.pages_read = self.current_page as i64 - active.start_page as i64;
        record.wpm = ReadingSession::derive_wpm(record.words_read, record.duration);
        self.log.append(&record)?;
        Ok(Some(record))
    }

    pub fn sessions(&self) -> Vec<ReadingSession> {
        self.log.sessions()
    }

    /// Add the page to the bookmark set if absent, remove it if present.
    pub fn toggle_bookmark(&mut self, page: u32) {
        if !self.bookmarks.insert(page) {
            self.bookmarks.remove(&page);
        }
    }

    pub fn is_bookmarked(&self, page: u32) -> bool {
        self.bookmarks.contains(&page)
    }

    pub fn bookmarks(&self) -> impl Iterator<Item = u32> + '_ {
        self.bookmarks.iter().copied()
    }

    pub fn add_highlight(&mut self, highlight: Highlight) {
        self.highlights.push(highlight);
    }

    pub fn remove_highlight(&mut self, id: &str) {
        self.highlights.retain(|h| h.id != id);
    }

    pub fn highlights(&self) -> &[Highlight] {
        &self.highlights
    }

    pub fn preferences(&self) -> &ReadingPreferences {
        &self.preferences
    }

    /// Shallow-merge a preferences patch. Always succeeds.
    pub fn update_preferences(&mut self, patch: PreferencesPatch) {
        patch.apply(&mut self.preferences);
    }
}
