//! Book (catalog entry) model and related types

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::enums::Category;
use crate::error::{AppError, AppResult};

/// Catalog entry with copy counts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub category: Category,
    pub description: String,
    pub cover_image: String,
    /// Always `available_copies > 0`
    pub available: bool,
    #[serde(default)]
    pub is_ebook: bool,
    pub total_copies: u32,
    pub available_copies: u32,
    pub publication_year: i32,
    pub publisher: String,
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl Book {
    /// Recompute the derived `available` flag
    pub fn sync_availability(&mut self) {
        self.available = self.available_copies > 0;
    }

    pub fn check_copies(&self) -> AppResult<()> {
        if self.available_copies > self.total_copies {
            return Err(AppError::Validation(format!(
                "Available copies ({}) exceed total copies ({})",
                self.available_copies, self.total_copies
            )));
        }
        Ok(())
    }

    /// `needle` must already be lowercased; the ISBN is compared verbatim.
    pub(crate) fn matches_text(&self, needle: &str, raw: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.author.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
            || self.isbn.contains(raw)
    }
}

/// Data for a new catalog entry (id and availability are assigned by the store)
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewBook {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Author is required"))]
    pub author: String,
    #[serde(default)]
    pub isbn: String,
    pub category: Category,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cover_image: String,
    #[serde(default)]
    pub is_ebook: bool,
    pub total_copies: u32,
    pub available_copies: u32,
    pub publication_year: i32,
    #[serde(default)]
    pub publisher: String,
    #[serde(default)]
    pub language: String,
    pub page_count: Option<u32>,
    pub location: Option<String>,
}

impl NewBook {
    pub fn into_book(self, id: String) -> Book {
        let mut book = Book {
            id,
            title: self.title,
            author: self.author,
            isbn: self.isbn,
            category: self.category,
            description: self.description,
            cover_image: self.cover_image,
            available: false,
            is_ebook: self.is_ebook,
            total_copies: self.total_copies,
            available_copies: self.available_copies,
            publication_year: self.publication_year,
            publisher: self.publisher,
            language: self.language,
            page_count: self.page_count,
            location: self.location,
        };
        book.sync_availability();
        book
    }
}

/// Partial update of a catalog entry; `None` leaves the field untouched
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BookUpdate {
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Author cannot be empty"))]
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub category: Option<Category>,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    pub is_ebook: Option<bool>,
    pub total_copies: Option<u32>,
    pub available_copies: Option<u32>,
    pub publication_year: Option<i32>,
    pub publisher: Option<String>,
    pub language: Option<String>,
    pub page_count: Option<u32>,
    pub location: Option<String>,
}

impl BookUpdate {
    /// Merge into a copy of `book`
    pub fn apply(self, book: &Book) -> Book {
        let mut merged = book.clone();
        if let Some(v) = self.title {
            merged.title = v;
        }
        if let Some(v) = self.author {
            merged.author = v;
        }
        if let Some(v) = self.isbn {
            merged.isbn = v;
        }
        if let Some(v) = self.category {
            merged.category = v;
        }
        if let Some(v) = self.description {
            merged.description = v;
        }
        if let Some(v) = self.cover_image {
            merged.cover_image = v;
        }
        if let Some(v) = self.is_ebook {
            merged.is_ebook = v;
        }
        if let Some(v) = self.total_copies {
            merged.total_copies = v;
        }
        if let Some(v) = self.available_copies {
            merged.available_copies = v;
        }
        if let Some(v) = self.publication_year {
            merged.publication_year = v;
        }
        if let Some(v) = self.publisher {
            merged.publisher = v;
        }
        if let Some(v) = self.language {
            merged.language = v;
        }
        if self.page_count.is_some() {
            merged.page_count = self.page_count;
        }
        if self.location.is_some() {
            merged.location = self.location;
        }
        merged.sync_availability();
        merged
    }
}

/// Search filters; unset fields match every book
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookFilters {
    pub category: Option<Category>,
    /// Only books with at least one copy on the shelf
    #[serde(default)]
    pub available_only: bool,
    #[serde(default)]
    pub ebooks_only: bool,
}

impl BookFilters {
    pub fn is_empty(&self) -> bool {
        self.category.is_none() && !self.available_only && !self.ebooks_only
    }

    pub fn matches(&self, book: &Book) -> bool {
        self.category.map_or(true, |c| book.category == c)
            && (!self.available_only || book.available)
            && (!self.ebooks_only || book.is_ebook)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Book {
        NewBook {
            title: "Pride and Prejudice".into(),
            author: "Jane Austen".into(),
            isbn: "9780141439518".into(),
            category: Category::Fiction,
            description: "The romantic clash between Elizabeth and Mr. Darcy.".into(),
            cover_image: String::new(),
            is_ebook: true,
            total_copies: 7,
            available_copies: 5,
            publication_year: 1813,
            publisher: "Penguin Classics".into(),
            language: "English".into(),
            page_count: Some(480),
            location: None,
        }
        .into_book("8".into())
    }

    #[test]
    fn test_new_book_derives_availability() {
        let book = sample();
        assert!(book.available);

        let mut empty = sample();
        empty.available_copies = 0;
        empty.sync_availability();
        assert!(!empty.available);
    }

    #[test]
    fn test_update_merges_fields() {
        let book = sample();
        let update = BookUpdate {
            available_copies: Some(0),
            location: Some("Fiction Section - Shelf A".into()),
            ..Default::default()
        };
        let merged = update.apply(&book);
        assert_eq!(merged.title, book.title);
        assert_eq!(merged.available_copies, 0);
        assert!(!merged.available);
        assert_eq!(
            merged.location.as_deref(),
            Some("Fiction Section - Shelf A")
        );
        assert_eq!(merged.page_count, Some(480));
    }

    #[test]
    fn test_check_copies() {
        let mut book = sample();
        assert!(book.check_copies().is_ok());
        book.available_copies = 8;
        assert!(matches!(book.check_copies(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_filters() {
        let book = sample();
        assert!(BookFilters::default().is_empty());
        assert!(BookFilters::default().matches(&book));

        let academic = BookFilters {
            category: Some(Category::Academic),
            ..Default::default()
        };
        assert!(!academic.matches(&book));

        let ebooks = BookFilters {
            ebooks_only: true,
            available_only: true,
            ..Default::default()
        };
        assert!(ebooks.matches(&book));
    }

    #[test]
    fn test_text_match() {
        let book = sample();
        assert!(book.matches_text("austen", "austen"));
        assert!(book.matches_text("darcy", "Darcy"));
        assert!(book.matches_text("97801", "97801"));
        assert!(!book.matches_text("tolkien", "tolkien"));
    }

    #[test]
    fn test_new_book_validation() {
        let mut data: NewBook = serde_json::from_value(serde_json::json!({
            "title": "",
            "author": "Anonymous",
            "category": "Journals",
            "totalCopies": 1,
            "availableCopies": 1,
            "publicationYear": 2024
        }))
        .unwrap();
        assert!(data.validate().is_err());
        data.title = "Annual Report".into();
        assert!(data.validate().is_ok());
    }
}
