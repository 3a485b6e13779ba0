use quire::book::{Book, BookFormat, BookPatch};
use quire::library::{Library, LibraryError};
use quire::preferences::ReadingPreferences;
use quire::session::SessionLog;
use quire::storage::{JsonFileStore, KeyValueStore, BOOKS_KEY, SESSIONS_KEY};
use quire::tracker::Tracker;

use assert_matches::assert_matches;
use chrono::NaiveDate;
use tempfile::tempdir;

/// Integration tests for the library/tracker workflow: seeding, CRUD with
/// write-through persistence, and folding finished sessions back into the
/// book records.

fn book(id: &str, total_pages: u32) -> Book {
    Book {
        id: id.to_string(),
        title: format!("Book {id}"),
        author: "Author".to_string(),
        cover_url: String::new(),
        format: BookFormat::Epub,
        total_pages,
        current_page: 0,
        added_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        last_opened_date: None,
        description: String::new(),
        file_size: "1.0 MB".to_string(),
        reading_progress: 0.0,
        total_reading_time: 0,
        categories: vec![],
    }
}

#[test]
fn empty_state_dir_seeds_demo_catalog_and_persists_on_first_mutation() {
    let dir = tempdir().unwrap();
    let mut library = Library::new(JsonFileStore::with_dir(dir.path()));
    let seeded = library.books().len();
    assert!(seeded > 0);

    // Seeding alone does not write; the first mutation does.
    assert!(!dir.path().join("books.json").exists());
    library.add(book("fresh", 100)).unwrap();
    assert!(dir.path().join("books.json").exists());

    let reloaded = Library::new(JsonFileStore::with_dir(dir.path()));
    assert_eq!(reloaded.books().len(), seeded + 1);
}

#[test]
fn full_crud_cycle_survives_reload() {
    let dir = tempdir().unwrap();
    let store = JsonFileStore::with_dir(dir.path());
    store.save(BOOKS_KEY, &Vec::<Book>::new()).unwrap();

    let mut library = Library::new(store);
    library.add(book("b1", 200)).unwrap();
    library.add(book("b2", 300)).unwrap();
    library.update("b1", BookPatch::current_page(50)).unwrap();
    library.remove("b2").unwrap();

    let reloaded = Library::new(JsonFileStore::with_dir(dir.path()));
    assert_eq!(reloaded.books().len(), 1);
    let b1 = reloaded.get("b1").unwrap();
    assert_eq!(b1.current_page, 50);
    assert_eq!(b1.reading_progress, 0.25);
    assert!(reloaded.get("b2").is_none());
}

#[test]
fn persisted_books_round_trip_exactly() {
    let dir = tempdir().unwrap();
    let store = JsonFileStore::with_dir(dir.path());
    let books = vec![book("x", 123), book("y", 456)];
    store.save(BOOKS_KEY, &books).unwrap();
    let loaded: Vec<Book> = store.load(BOOKS_KEY).unwrap();
    assert_eq!(loaded, books);
}

#[test]
fn corrupt_books_payload_falls_back_to_demo_catalog() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("books.json"), b"]]] nonsense").unwrap();
    let library = Library::new(JsonFileStore::with_dir(dir.path()));
    // Corrupt is treated as absent, so the demo catalog appears.
    assert!(library.get("1").is_some());
}

#[test]
fn duplicate_add_is_rejected_without_clobbering() {
    let dir = tempdir().unwrap();
    let store = JsonFileStore::with_dir(dir.path());
    store.save(BOOKS_KEY, &Vec::<Book>::new()).unwrap();
    let mut library = Library::new(store);

    library.add(book("dup", 100)).unwrap();
    library.update("dup", BookPatch::current_page(42)).unwrap();
    let err = library.add(book("dup", 999)).unwrap_err();
    assert_matches!(err, LibraryError::DuplicateId(_));
    assert_eq!(library.get("dup").unwrap().current_page, 42);
}

#[test]
fn reader_teardown_folds_progress_and_time_into_the_book() {
    let dir = tempdir().unwrap();
    let store = JsonFileStore::with_dir(dir.path());
    store.save(BOOKS_KEY, &vec![book("b1", 200)]).unwrap();

    let mut library = Library::new(JsonFileStore::with_dir(dir.path()));
    let mut tracker = Tracker::new(
        JsonFileStore::with_dir(dir.path()),
        ReadingPreferences::default(),
    );

    // Page-view flow: open, read for two minutes, page forward, leave.
    let opened = library.get("b1").unwrap();
    tracker.set_total_pages(opened.total_pages);
    tracker.set_current_page(opened.current_page.max(1));
    tracker.start_session("b1");
    tracker.tick(60);
    tracker.tick(60);
    tracker.set_current_page(21);

    let finished = tracker.end_session().unwrap().unwrap();
    assert_eq!(finished.duration, 120);
    assert_eq!(finished.pages_read, 20);
    assert_eq!(finished.words_read, 400);
    assert_eq!(finished.wpm, 200);

    let already = library.get("b1").unwrap().total_reading_time;
    library
        .update(
            "b1",
            BookPatch {
                current_page: Some(tracker.current_page()),
                total_reading_time: Some(already + finished.duration),
                ..BookPatch::default()
            },
        )
        .unwrap();

    let b1 = library.get("b1").unwrap();
    assert_eq!(b1.current_page, 21);
    assert_eq!(b1.reading_progress, 21.0 / 200.0);
    assert_eq!(b1.total_reading_time, 120);

    // The finalized session is durable in the log file.
    let log = SessionLog::new(JsonFileStore::with_dir(dir.path()));
    let sessions = log.sessions();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0], finished);
}

#[test]
fn session_log_appends_across_tracker_instances() {
    let dir = tempdir().unwrap();

    for n in 0..3u64 {
        let mut tracker = Tracker::new(
            JsonFileStore::with_dir(dir.path()),
            ReadingPreferences::default(),
        );
        tracker.start_session("b1");
        tracker.tick(60 * (n + 1));
        tracker.end_session().unwrap();
    }

    let log = SessionLog::new(JsonFileStore::with_dir(dir.path()));
    let sessions = log.sessions();
    assert_eq!(sessions.len(), 3);
    assert_eq!(sessions[0].duration, 60);
    assert_eq!(sessions[2].duration, 180);
}

#[test]
fn removing_a_book_leaves_its_sessions_in_the_log() {
    let dir = tempdir().unwrap();
    let store = JsonFileStore::with_dir(dir.path());
    store.save(BOOKS_KEY, &vec![book("doomed", 100)]).unwrap();

    let mut tracker = Tracker::new(
        JsonFileStore::with_dir(dir.path()),
        ReadingPreferences::default(),
    );
    tracker.start_session("doomed");
    tracker.tick(60);
    tracker.end_session().unwrap();

    let mut library = Library::new(JsonFileStore::with_dir(dir.path()));
    library.remove("doomed").unwrap();

    // book_id is a weak reference; no cascading delete.
    let log = SessionLog::new(JsonFileStore::with_dir(dir.path()));
    assert_eq!(log.sessions().len(), 1);
    assert_eq!(log.sessions()[0].book_id, "doomed");
}

#[test]
fn sessions_file_layout_is_a_plain_json_array() {
    let dir = tempdir().unwrap();
    let mut tracker = Tracker::new(
        JsonFileStore::with_dir(dir.path()),
        ReadingPreferences::default(),
    );
    tracker.start_session("b1");
    tracker.end_session().unwrap();

    let raw = std::fs::read_to_string(dir.path().join(format!("{SESSIONS_KEY}.json"))).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let array = parsed.as_array().unwrap();
    assert_eq!(array.len(), 1);
    assert_eq!(array[0]["bookId"], "b1");
    assert!(array[0].get("pagesRead").is_some());
}
