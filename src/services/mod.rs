//! Business logic services
//!
//! [`LibraryStore`] owns the four collections; each submodule adds the
//! operations for one area. Mutations take the acting user explicitly and
//! either succeed or fail with no state change.

pub mod auth;
pub mod catalog;
pub mod loans;
pub mod notifications;
pub mod requests;
pub mod stats;

use chrono::{DateTime, Utc};
use std::{fmt, sync::Arc};
use uuid::Uuid;

use crate::{
    clock::{Clock, SystemClock},
    config::{AppConfig, LoanPolicy, NotificationConfig},
    error::{AppError, AppResult},
    models::{authorize, Book, BookRequest, Loan, Notification, NotificationKind, Operation, User},
    repository::{Repository, Snapshot},
};

/// In-memory library state: books, loans, notifications and requests
pub struct LibraryStore {
    repository: Repository,
    policy: LoanPolicy,
    notifications_config: NotificationConfig,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for LibraryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LibraryStore")
            .field("repository", &self.repository)
            .field("policy", &self.policy)
            .field("notifications_config", &self.notifications_config)
            .field("now", &self.clock.now())
            .finish()
    }
}

impl LibraryStore {
    pub fn new(repository: Repository, config: &AppConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            policy: config.loans.clone(),
            notifications_config: config.notifications.clone(),
            clock,
        }
    }

    /// Store seeded with the bundled demo data, on wall-clock time
    pub fn seeded(config: &AppConfig) -> AppResult<Self> {
        Ok(Self::new(Repository::seeded()?, config, Arc::new(SystemClock)))
    }

    pub fn books(&self) -> Snapshot<Book> {
        self.repository.books.snapshot()
    }

    pub fn loans(&self) -> Snapshot<Loan> {
        self.repository.loans.snapshot()
    }

    pub fn notifications(&self) -> Snapshot<Notification> {
        self.repository.notifications.snapshot()
    }

    pub fn requests(&self) -> Snapshot<BookRequest> {
        self.repository.requests.snapshot()
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Append a notification and return its id
    pub(crate) fn notify(
        &mut self,
        recipient: &str,
        kind: NotificationKind,
        message: String,
    ) -> String {
        let notification = Notification {
            id: new_id("notif"),
            user_id: recipient.to_string(),
            message,
            kind,
            read: false,
            read_by: Default::default(),
            created_at: self.now(),
        };
        let id = notification.id.clone();
        tracing::debug!(
            "Notification {} for {}: {}",
            id,
            recipient,
            notification.message
        );
        self.repository
            .notifications
            .collection_mut()
            .upsert(notification);
        id
    }
}

/// Authorize and require a signed-in user
pub(crate) fn acting_user(actor: Option<&User>, operation: Operation) -> AppResult<&User> {
    authorize(actor, operation)?;
    actor.ok_or_else(AppError::unauthenticated)
}

pub(crate) fn new_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4().simple())
}

/// Date as shown in notification messages, e.g. "Jun 15, 2023"
pub(crate) fn display_date(date: DateTime<Utc>) -> String {
    date.format("%b %-d, %Y").to_string()
}


#[cfg(test)]
mod tests {
    use super::*;
    use testing::*;

    #[test]
    fn test_display_date() {
        assert_eq!(display_date(at(2023, 6, 5)), "Jun 5, 2023");
    }

    #[test]
    fn test_new_ids_are_unique() {
        let a = new_id("notif");
        let b = new_id("notif");
        assert!(a.starts_with("notif-"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_notify_appends() {
        let mut store = store_at(at(2024, 1, 1));
        let before = store.notifications();
        let id = store.notify("1", NotificationKind::System, "Hello".into());

        assert_eq!(before.len(), 5);
        let all = store.notifications();
        assert_eq!(all.len(), 6);
        let last = all.last().unwrap().1;
        assert_eq!(last.id, id);
        assert_eq!(last.created_at, at(2024, 1, 1));
        assert!(!last.read);
    }
}
