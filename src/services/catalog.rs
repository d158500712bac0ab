//! Catalog queries and administration

use validator::Validate;

use super::{new_id, LibraryStore};
use crate::{
    error::{AppError, AppResult},
    models::{
        authorize, Book, BookFilters, BookUpdate, Loan, NewBook, NotificationKind, Operation,
        User, BROADCAST_RECIPIENT,
    },
};

impl LibraryStore {
    /// Search books with filters
    pub fn search_books(&self, query: &str, filters: &BookFilters) -> Vec<Book> {
        let results = self.repository.books.search(query, filters);
        tracing::debug!(
            "Catalog search {:?} {:?}: {} result(s)",
            query,
            filters,
            results.len()
        );
        results
    }

    pub fn get_book_by_id(&self, id: &str) -> Option<&Book> {
        self.repository.books.get(id)
    }

    /// Every loan of a book, returned ones included
    pub fn book_loans(&self, actor: Option<&User>, book_id: &str) -> AppResult<Vec<Loan>> {
        authorize(actor, Operation::ManageCatalog)?;
        Ok(self.repository.loans.for_book(book_id))
    }

    /// Add a book to the catalog and announce it to everyone
    pub fn add_book(&mut self, actor: Option<&User>, data: NewBook) -> AppResult<Book> {
        authorize(actor, Operation::ManageCatalog)?;
        data.validate()?;

        let book = data.into_book(new_id("book"));
        book.check_copies()?;

        self.repository.books.collection_mut().upsert(book.clone());
        self.notify(
            BROADCAST_RECIPIENT,
            NotificationKind::NewArrival,
            format!("New book added: \"{}\" by {}.", book.title, book.author),
        );
        tracing::info!("Catalog add: book {} \"{}\"", book.id, book.title);
        Ok(book)
    }

    /// Merge `updates` into an existing book
    pub fn edit_book(
        &mut self,
        actor: Option<&User>,
        id: &str,
        updates: BookUpdate,
    ) -> AppResult<Book> {
        authorize(actor, Operation::ManageCatalog)?;
        updates.validate()?;

        let current = self
            .repository
            .books
            .get(id)
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;
        let merged = updates.apply(current);
        merged.check_copies()?;

        self.repository
            .books
            .collection_mut()
            .upsert(merged.clone());
        tracing::info!("Catalog edit: book {}", id);
        Ok(merged)
    }

    /// Remove a book together with every loan that references it
    pub fn delete_book(&mut self, actor: Option<&User>, id: &str) -> AppResult<Book> {
        authorize(actor, Operation::ManageCatalog)?;

        let book = self
            .repository
            .books
            .collection_mut()
            .remove(id)
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        let dropped = self
            .repository
            .loans
            .collection_mut()
            .retain(|l| l.book_id != id);
        if dropped > 0 {
            tracing::warn!(
                "Catalog delete: book {} removed with {} loan record(s)",
                id,
                dropped
            );
        } else {
            tracing::info!("Catalog delete: book {}", id);
        }
        Ok(book)
    }
}
