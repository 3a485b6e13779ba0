mod ui;

use clap::Parser;
use crossterm::{
    event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use log::warn;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};

use chrono::Local;
use quire::analytics::{self, ReadingGoal};
use quire::book::BookPatch;
use quire::library::{Library, LibraryError};
use quire::preferences::{FilePrefsStore, FontSize, PreferencesPatch, PrefsStore};
use quire::runtime::{AppEvent, CrosstermEventSource, Runner};
use quire::session::SessionLog;
use quire::storage::JsonFileStore;
use quire::tracker::Tracker;
use quire::{export, import};

const TICK_RATE_MS: u64 = 1000;

/// cozy reading-tracker tui with a personal library and reading analytics
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A cozy reading TUI: browse your personal library, read in a paginated view with typographic preferences, and track sessions, streaks, and goals."
)]
struct Cli {
    /// open this book id directly in the reader
    #[clap(short = 'b', long)]
    book: Option<String>,

    /// print the library to stdout and exit
    #[clap(long)]
    list: bool,

    /// register a (simulated) upload by file name and exit
    #[clap(long, value_name = "FILE")]
    import: Option<String>,

    /// write the session log as CSV to the given path and exit
    #[clap(long, value_name = "PATH")]
    export_sessions: Option<PathBuf>,

    /// write the book collection as CSV to the given path and exit
    #[clap(long, value_name = "PATH")]
    export_library: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Library,
    Reader,
    Analytics,
}

pub struct App {
    pub library: Library<JsonFileStore>,
    pub tracker: Tracker<JsonFileStore>,
    pub goals: Vec<ReadingGoal>,
    pub screen: Screen,
    pub selected: usize,
    pub open_book: Option<String>,
    prefs_store: FilePrefsStore,
    should_quit: bool,
}

impl App {
    fn new() -> Self {
        let prefs_store = FilePrefsStore::new();
        let preferences = prefs_store.load();
        Self {
            library: Library::new(JsonFileStore::new()),
            tracker: Tracker::new(JsonFileStore::new(), preferences),
            goals: analytics::default_goals(),
            screen: Screen::Library,
            selected: 0,
            open_book: None,
            prefs_store,
            should_quit: false,
        }
    }

    fn open_reader(&mut self, id: &str) {
        let Some(book) = self.library.get(id) else {
            return;
        };
        let (book_id, current_page, total_pages) =
            (book.id.clone(), book.current_page.max(1), book.total_pages);

        self.tracker.set_total_pages(total_pages);
        self.tracker.set_current_page(current_page);
        self.tracker.start_session(&book_id);

        let patch = BookPatch {
            last_opened_date: Some(Local::now().date_naive()),
            ..BookPatch::default()
        };
        if let Err(err) = self.library.update(&book_id, patch) {
            surface(&err);
        }

        self.open_book = Some(book_id);
        self.screen = Screen::Reader;
    }

    /// Tear down the reader view: finalize the session and fold the final
    /// page position and accrued time back into the library record.
    fn close_reader(&mut self) {
        let finished = match self.tracker.end_session() {
            Ok(finished) => finished,
            Err(err) => {
                warn!("session not logged: {err}");
                None
            }
        };
        if let Some(id) = self.open_book.take() {
            let accrued = finished.as_ref().map_or(0, |s| s.duration);
            let already = self.library.get(&id).map_or(0, |b| b.total_reading_time);
            let patch = BookPatch {
                current_page: Some(self.tracker.current_page()),
                total_reading_time: Some(already + accrued),
                ..BookPatch::default()
            };
            if let Err(err) = self.library.update(&id, patch) {
                surface(&err);
            }
        }
        self.screen = Screen::Library;
    }

    fn turn_page(&mut self, forward: bool) {
        let page = self.tracker.current_page();
        let next = if forward {
            page.saturating_add(1).min(self.tracker.total_pages().max(1))
        } else {
            page.saturating_sub(1).max(1)
        };
        if next == page {
            return;
        }
        self.tracker.set_current_page(next);
        if let Some(id) = self.open_book.clone() {
            if let Err(err) = self.library.update(&id, BookPatch::current_page(next)) {
                surface(&err);
            }
        }
    }

    fn persist_preferences(&self) {
        if let Err(err) = self.prefs_store.save(self.tracker.preferences()) {
            warn!("preferences not saved: {err}");
        }
    }

    fn on_tick(&mut self) {
        // Ticks arriving on any other screen are no-ops by construction:
        // the tracker is only Active while the reader is open.
        if self.screen == Screen::Reader {
            self.tracker.tick(TICK_RATE_MS / 1000);
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.quit();
            return;
        }
        match self.screen {
            Screen::Library => self.handle_library_key(key.code),
            Screen::Reader => self.handle_reader_key(key.code),
            Screen::Analytics => match key.code {
                KeyCode::Esc | KeyCode::Char('a') => self.screen = Screen::Library,
                KeyCode::Char('q') => self.quit(),
                _ => {}
            },
        }
    }

    fn handle_library_key(&mut self, code: KeyCode) {
        let count = self.library.books().len();
        match code {
            KeyCode::Char('j') | KeyCode::Down => {
                if count > 0 {
                    self.selected = (self.selected + 1) % count;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if count > 0 {
                    self.selected = (self.selected + count - 1) % count;
                }
            }
            KeyCode::Enter => {
                if let Some(book) = self.library.books().get(self.selected) {
                    let id = book.id.clone();
                    self.open_reader(&id);
                }
            }
            KeyCode::Char('x') => {
                if let Some(book) = self.library.books().get(self.selected) {
                    let id = book.id.clone();
                    if let Err(err) = self.library.remove(&id) {
                        surface(&err);
                    }
                    if self.selected >= self.library.books().len() {
                        self.selected = self.library.books().len().saturating_sub(1);
                    }
                }
            }
            KeyCode::Char('a') => self.screen = Screen::Analytics,
            KeyCode::Char('q') | KeyCode::Esc => self.quit(),
            _ => {}
        }
    }

    fn handle_reader_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Left | KeyCode::Char('h') => self.turn_page(false),
            KeyCode::Right | KeyCode::Char('l') => self.turn_page(true),
            KeyCode::Char('b') => {
                let page = self.tracker.current_page();
                self.tracker.toggle_bookmark(page);
            }
            KeyCode::Char('t') => {
                let theme = self.tracker.preferences().theme.next();
                self.tracker.update_preferences(PreferencesPatch {
                    theme: Some(theme),
                    ..PreferencesPatch::default()
                });
                self.persist_preferences();
            }
            KeyCode::Char('+') | KeyCode::Char('=') => self.step_font(FontSize::larger),
            KeyCode::Char('-') => self.step_font(FontSize::smaller),
            KeyCode::Esc => self.close_reader(),
            KeyCode::Char('q') => {
                self.close_reader();
                self.quit();
            }
            _ => {}
        }
    }

    fn step_font(&mut self, step: fn(FontSize) -> FontSize) {
        let size = step(self.tracker.preferences().font_size);
        self.tracker.update_preferences(PreferencesPatch {
            font_size: Some(size),
            ..PreferencesPatch::default()
        });
        self.persist_preferences();
    }

    fn quit(&mut self) {
        if self.screen == Screen::Reader {
            self.close_reader();
        }
        self.should_quit = true;
    }
}

fn surface(err: &LibraryError) {
    // Persistence failures degrade to in-memory only; the mutation stands.
    warn!("library: {err}");
}

fn run_headless(cli: &Cli) -> Result<bool, Box<dyn Error>> {
    let mut handled = false;

    if let Some(file_name) = &cli.import {
        let mut library = Library::new(JsonFileStore::new());
        // Only the name and byte size are used; contents are never read.
        let byte_size = std::fs::metadata(file_name).map(|m| m.len()).unwrap_or(0);
        let book = import::book_from_upload(file_name, byte_size);
        let title = book.title.clone();
        library.add(book)?;
        println!("imported {title:?}");
        handled = true;
    }

    if cli.list {
        let library = Library::new(JsonFileStore::new());
        for book in library.books() {
            println!(
                "{}  {} — {} [{}] {}/{} pages",
                book.id, book.title, book.author, book.format, book.current_page, book.total_pages
            );
        }
        handled = true;
    }

    if let Some(path) = &cli.export_sessions {
        let log = SessionLog::new(JsonFileStore::new());
        export::export_sessions(&log.sessions(), path)?;
        println!("wrote {}", path.display());
        handled = true;
    }

    if let Some(path) = &cli.export_library {
        let library = Library::new(JsonFileStore::new());
        export::export_library(library.books(), path)?;
        println!("wrote {}", path.display());
        handled = true;
    }

    Ok(handled)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();

    if run_headless(&cli)? {
        return Ok(());
    }

    if !stdin().is_tty() {
        eprintln!("quire needs a terminal; use --list or --export-* for headless runs");
        std::process::exit(2);
    }

    let mut app = App::new();
    if let Some(id) = &cli.book {
        if app.library.get(id).is_none() {
            eprintln!("no book with id {id:?}");
            std::process::exit(1);
        }
        app.open_reader(&id.clone());
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let runner = Runner::new(
        CrosstermEventSource::new(),
        Duration::from_millis(TICK_RATE_MS),
    );

    let result = (|| -> Result<(), Box<dyn Error>> {
        loop {
            terminal.draw(|frame| ui::draw(&app, frame))?;
            match runner.step() {
                AppEvent::Key(key) => app.handle_key(key),
                AppEvent::Tick => app.on_tick(),
                AppEvent::Resize => {}
            }
            if app.should_quit {
                return Ok(());
            }
        }
    })();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}
