use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Format tag derived from the uploaded file's extension. File contents are
/// never inspected; unknown extensions default to epub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BookFormat {
    Epub,
    Pdf,
    Mobi,
}

impl BookFormat {
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => BookFormat::Pdf,
            "mobi" => BookFormat::Mobi,
            _ => BookFormat::Epub,
        }
    }
}

/// A book record in the personal library.
///
/// Pagination is 1-indexed with `current_page` in `[0, total_pages]`
/// (0 means not started). `reading_progress` is kept equal to
/// `current_page / total_pages` whenever `total_pages > 0`; `Library::update`
/// maintains that invariant on every page change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: String,
    pub cover_url: String,
    pub format: BookFormat,
    pub total_pages: u32,
    pub current_page: u32,
    pub added_date: NaiveDate,
    /// None when the book has never been opened.
    pub last_opened_date: Option<NaiveDate>,
    pub description: String,
    /// Display string, e.g. "2.4 MB". The upload flow only ever sees the
    /// byte size, not the contents.
    pub file_size: String,
    pub reading_progress: f64,
    /// Accumulated reading time in seconds. Monotonically non-decreasing.
    pub total_reading_time: u64,
    pub categories: Vec<String>,
}

impl Book {
    /// Re-derive `reading_progress` from the pagination fields. No-op when
    /// `total_pages` is 0.
    pub fn recompute_progress(&mut self) {
        if self.total_pages > 0 {
            self.reading_progress = self.current_page as f64 / self.total_pages as f64;
        }
    }

    pub fn is_finished(&self) -> bool {
        self.total_pages > 0 && self.current_page >= self.total_pages
    }
}

/// Shallow-merge patch for `Library::update`. Only `Some` fields are applied.
#[derive(Debug, Clone, Default)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub cover_url: Option<String>,
    pub description: Option<String>,
    pub categories: Option<Vec<String>>,
    pub format: Option<BookFormat>,
    pub current_page: Option<u32>,
    pub total_pages: Option<u32>,
    pub last_opened_date: Option<NaiveDate>,
    pub total_reading_time: Option<u64>,
}

impl BookPatch {
    pub fn current_page(page: u32) -> Self {
        Self {
            current_page: Some(page),
            ..Self::default()
        }
    }

    pub fn touches_pagination(&self) -> bool {
        self.current_page.is_some() || self.total_pages.is_some()
    }

    /// Apply the patch to a book, clamping `current_page` into
    /// `[0, total_pages]` and never letting `total_reading_time` decrease.
    pub fn apply(&self, book: &mut Book) {
        if let Some(ref title) = self.title {
            book.title = title.clone();
        }
        if let Some(ref author) = self.author {
            book.author = author.clone();
        }
        if let Some(ref cover_url) = self.cover_url {
            book.cover_url = cover_url.clone();
        }
        if let Some(ref description) = self.description {
            book.description = description.clone();
        }
        if let Some(ref categories) = self.categories {
            book.categories = categories.clone();
        }
        if let Some(format) = self.format {
            book.format = format;
        }
        if let Some(total_pages) = self.total_pages {
            book.total_pages = total_pages;
        }
        if let Some(current_page) = self.current_page {
            book.current_page = current_page;
        }
        if book.total_pages > 0 && book.current_page > book.total_pages {
            book.current_page = book.total_pages;
        }
        if let Some(date) = self.last_opened_date {
            book.last_opened_date = Some(date);
        }
        if let Some(secs) = self.total_reading_time {
            book.total_reading_time = book.total_reading_time.max(secs);
        }
        if self.touches_pagination() {
            book.recompute_progress();
        }
    }
}
