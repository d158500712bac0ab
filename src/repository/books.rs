//! Book collection

use std::ops::Deref;

use super::Collection;
use crate::models::{Book, BookFilters};

#[derive(Debug, Clone, Default)]
pub struct BooksRepository {
    books: Collection<Book>,
}

impl BooksRepository {
    pub fn new(books: Collection<Book>) -> Self {
        Self { books }
    }

    pub(crate) fn collection_mut(&mut self) -> &mut Collection<Book> {
        &mut self.books
    }

    /// Text and filter search, in catalog order
    pub fn search(&self, query: &str, filters: &BookFilters) -> Vec<Book> {
        let raw = query.trim();
        if raw.is_empty() && filters.is_empty() {
            return self.books.iter().cloned().collect();
        }
        let needle = raw.to_lowercase();
        self.books
            .iter()
            .filter(|b| raw.is_empty() || b.matches_text(&needle, raw))
            .filter(|b| filters.matches(b))
            .cloned()
            .collect()
    }

    /// Take one copy off the shelf; false when none is left
    pub(crate) fn check_out_copy(&mut self, book_id: &str) -> bool {
        match self.books.get(book_id) {
            Some(book) if book.available_copies > 0 => {}
            _ => return false,
        }
        self.books
            .update(book_id, |b| {
                b.available_copies -= 1;
                b.sync_availability();
            })
            .is_some()
    }

    /// Put one copy back, never above the total; false when the shelf was already full
    pub(crate) fn check_in_copy(&mut self, book_id: &str) -> bool {
        match self.books.get(book_id) {
            Some(book) if book.available_copies < book.total_copies => {}
            _ => return false,
        }
        self.books
            .update(book_id, |b| {
                b.available_copies += 1;
                b.sync_availability();
            })
            .is_some()
    }
}

impl Deref for BooksRepository {
    type Target = Collection<Book>;

    fn deref(&self) -> &Self::Target {
        &self.books
    }
}
