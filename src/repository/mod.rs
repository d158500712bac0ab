//! In-memory collections owned by the library store.
//!
//! Each collection is an insertion-ordered map behind an `Arc`. Readers get a
//! [`Snapshot`] that never changes; writers go through `Arc::make_mut`, which
//! clones the map first whenever a snapshot is still held elsewhere. Write
//! methods are crate-private so only the store can mutate state.

pub mod books;
pub mod loans;
pub mod notifications;
pub mod requests;

use indexmap::IndexMap;
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{Book, BookRequest, Loan, Notification},
};

/// Immutable, shareable view of one collection
pub type Snapshot<T> = Arc<IndexMap<String, T>>;

/// Records stored in a [`Collection`] are keyed by their id
pub trait Keyed {
    fn key(&self) -> &str;
}

impl Keyed for Book {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for Loan {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for Notification {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for BookRequest {
    fn key(&self) -> &str {
        &self.id
    }
}

/// Copy-on-write keyed collection
#[derive(Debug, Clone)]
pub struct Collection<T> {
    items: Snapshot<T>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            items: Arc::new(IndexMap::new()),
        }
    }
}

impl<T: Clone + Keyed> Collection<T> {
    pub fn from_records(records: impl IntoIterator<Item = T>) -> Self {
        let items = records
            .into_iter()
            .map(|r| (r.key().to_string(), r))
            .collect();
        Self {
            items: Arc::new(items),
        }
    }

    pub fn snapshot(&self) -> Snapshot<T> {
        Arc::clone(&self.items)
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.values()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append, or replace in place when the id already exists
    pub(crate) fn upsert(&mut self, record: T) {
        Arc::make_mut(&mut self.items).insert(record.key().to_string(), record);
    }

    /// Apply `f` to the record with `id`; returns the updated record
    pub(crate) fn update(&mut self, id: &str, f: impl FnOnce(&mut T)) -> Option<&T> {
        if !self.items.contains_key(id) {
            return None;
        }
        let items = Arc::make_mut(&mut self.items);
        let record = items.get_mut(id)?;
        f(record);
        Some(&*record)
    }

    /// Apply `f` to every record matching `pred`; returns how many matched
    pub(crate) fn update_where(
        &mut self,
        pred: impl Fn(&T) -> bool,
        mut f: impl FnMut(&mut T),
    ) -> usize {
        if !self.items.values().any(&pred) {
            return 0;
        }
        let mut count = 0;
        for record in Arc::make_mut(&mut self.items).values_mut() {
            if pred(record) {
                f(record);
                count += 1;
            }
        }
        count
    }

    /// Remove keeping the order of the remaining records
    pub(crate) fn remove(&mut self, id: &str) -> Option<T> {
        if !self.items.contains_key(id) {
            return None;
        }
        Arc::make_mut(&mut self.items).shift_remove(id)
    }

    /// Keep only records matching `keep`; returns how many were dropped
    pub(crate) fn retain(&mut self, keep: impl Fn(&T) -> bool) -> usize {
        let dropped = self.items.values().filter(|r| !keep(r)).count();
        if dropped > 0 {
            Arc::make_mut(&mut self.items).retain(|_, r| keep(r));
        }
        dropped
    }
}

/// Startup data for all four collections
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Fixtures {
    #[serde(default)]
    pub books: Vec<Book>,
    #[serde(default)]
    pub loans: Vec<Loan>,
    #[serde(default)]
    pub notifications: Vec<Notification>,
    #[serde(default)]
    pub requests: Vec<BookRequest>,
}

impl Fixtures {
    /// Demo catalog bundled with the crate
    pub fn bundled() -> AppResult<Self> {
        Ok(serde_json::from_str(include_str!("../../data/fixtures.json"))?)
    }
}

/// All collections held by the store
#[derive(Debug, Clone, Default)]
pub struct Repository {
    pub books: books::BooksRepository,
    pub loans: loans::LoansRepository,
    pub notifications: notifications::NotificationsRepository,
    pub requests: requests::RequestsRepository,
}

impl Repository {
    /// Build from fixtures, recomputing each book's availability
    pub fn from_fixtures(fixtures: Fixtures) -> Self {
        let books = fixtures.books.into_iter().map(|mut book| {
            book.sync_availability();
            book
        });
        Self {
            books: books::BooksRepository::new(Collection::from_records(books)),
            loans: loans::LoansRepository::new(Collection::from_records(fixtures.loans)),
            notifications: notifications::NotificationsRepository::new(Collection::from_records(
                fixtures.notifications,
            )),
            requests: requests::RequestsRepository::new(Collection::from_records(
                fixtures.requests,
            )),
        }
    }

    /// Repository seeded with the bundled demo data
    pub fn seeded() -> AppResult<Self> {
        let repository = Self::from_fixtures(Fixtures::bundled()?);
        tracing::debug!(
            "Seeded repository: {} books, {} loans, {} notifications, {} requests",
            repository.books.len(),
            repository.loans.len(),
            repository.notifications.len(),
            repository.requests.len()
        );
        Ok(repository)
    }
}
