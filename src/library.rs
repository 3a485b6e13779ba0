use log::{debug, warn};
use thiserror::Error;

use crate::book::{Book, BookPatch};
use crate::catalog;
use crate::storage::{KeyValueStore, StorageError, BOOKS_KEY};

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("book id {0:?} already in library")]
    DuplicateId(String),
    #[error("no book with id {0:?}")]
    NotFound(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Owns the book collection. Every mutating call serializes and persists the
/// whole collection (write-through, no batching, no diffing); when the
/// persist fails the in-memory mutation stands and the error is returned for
/// the caller to surface.
#[derive(Debug)]
pub struct Library<S: KeyValueStore> {
    books: Vec<Book>,
    store: S,
}

impl<S: KeyValueStore> Library<S> {
    /// Load the persisted collection, seeding from the embedded demo catalog
    /// when nothing has been persisted yet.
    pub fn new(store: S) -> Self {
        let books = match store.load::<Vec<Book>>(BOOKS_KEY) {
            Some(books) => books,
            None => {
                debug!("no persisted library, seeding demo catalog");
                catalog::demo_books()
            }
        };
        Self { books, store }
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn get(&self, id: &str) -> Option<&Book> {
        self.books.iter().find(|b| b.id == id)
    }

    pub fn add(&mut self, book: Book) -> Result<(), LibraryError> {
        if self.get(&book.id).is_some() {
            return Err(LibraryError::DuplicateId(book.id));
        }
        self.books.push(book);
        self.persist()
    }

    /// No-op (not an error) when the id is absent.
    pub fn remove(&mut self, id: &str) -> Result<(), LibraryError> {
        let before = self.books.len();
        self.books.retain(|b| b.id != id);
        if self.books.len() == before {
            return Ok(());
        }
        self.persist()
    }

    pub fn update(&mut self, id: &str, patch: BookPatch) -> Result<(), LibraryError> {
        let book = self
            .books
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| LibraryError::NotFound(id.to_string()))?;
        patch.apply(book);
        self.persist()
    }

    fn persist(&self) -> Result<(), LibraryError> {
        self.store.save(BOOKS_KEY, &self.books).map_err(|err| {
            // The in-memory collection stays authoritative for the rest of
            // the process; the next mutation will retry the full save.
            warn!("library persist failed, continuing in-memory: {err}");
            LibraryError::Storage(err)
        })
    }
}
