use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::book::Book;
use crate::session::ReadingSession;

/// Dump the session log as CSV, one row per finalized session.
pub fn write_sessions_csv<W: Write>(sessions: &[ReadingSession], out: W) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record([
        "id",
        "bookId",
        "date",
        "startTime",
        "endTime",
        "durationSecs",
        "pagesRead",
        "wordsRead",
        "wpm",
    ])?;
    for s in sessions {
        writer.write_record([
            s.id.clone(),
            s.book_id.clone(),
            s.date.to_string(),
            s.start_time.to_rfc3339(),
            s.end_time.map(|t| t.to_rfc3339()).unwrap_or_default(),
            s.duration.to_string(),
            s.pages_read.to_string(),
            s.words_read.to_string(),
            s.wpm.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Dump the book collection as CSV.
pub fn write_library_csv<W: Write>(books: &[Book], out: W) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record([
        "id",
        "title",
        "author",
        "format",
        "currentPage",
        "totalPages",
        "readingProgress",
        "totalReadingTimeSecs",
        "addedDate",
        "lastOpenedDate",
        "categories",
    ])?;
    for b in books {
        writer.write_record([
            b.id.clone(),
            b.title.clone(),
            b.author.clone(),
            b.format.to_string(),
            b.current_page.to_string(),
            b.total_pages.to_string(),
            format!("{:.4}", b.reading_progress),
            b.total_reading_time.to_string(),
            b.added_date.to_string(),
            b.last_opened_date.map(|d| d.to_string()).unwrap_or_default(),
            b.categories.join(";"),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn export_sessions<P: AsRef<Path>>(sessions: &[ReadingSession], path: P) -> csv::Result<()> {
    write_sessions_csv(sessions, File::create(path)?)
}

pub fn export_library<P: AsRef<Path>>(books: &[Book], path: P) -> csv::Result<()> {
    write_library_csv(books, File::create(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use chrono::Local;

    #[test]
    fn sessions_csv_has_header_and_rows() {
        let mut session = ReadingSession::begin("b1", Local::now());
        session.id = "s1".to_string();
        session.duration = 300;
        session.pages_read = -2;
        session.words_read = 1000;
        session.wpm = 200;

        let mut buf = Vec::new();
        write_sessions_csv(&[session], &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "id,bookId,date,startTime,endTime,durationSecs,pagesRead,wordsRead,wpm"
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with("s1,b1,"));
        assert!(row.contains(",-2,1000,200"));
        assert!(lines.next().is_none());
    }

    #[test]
    fn library_csv_round_trips_demo_catalog() {
        let books = catalog::demo_books();
        let mut buf = Vec::new();
        write_library_csv(&books, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        // Header plus one row per book
        assert_eq!(text.lines().count(), books.len() + 1);
        assert!(text.contains("Pride and Prejudice"));
        assert!(text.contains("Classic;Romance"));
    }

    #[test]
    fn export_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sessions.csv");
        export_sessions(&[], &path).unwrap();
        assert!(path.exists());
    }
}
