//! Notification collection

use std::ops::Deref;

use super::Collection;
use crate::models::{Notification, NotificationKind};

#[derive(Debug, Clone, Default)]
pub struct NotificationsRepository {
    notifications: Collection<Notification>,
}

impl NotificationsRepository {
    pub fn new(notifications: Collection<Notification>) -> Self {
        Self { notifications }
    }

    pub(crate) fn collection_mut(&mut self) -> &mut Collection<Notification> {
        &mut self.notifications
    }

    /// Notifications addressed to the user, broadcasts included
    pub fn visible_to(&self, user_id: &str) -> Vec<Notification> {
        self.notifications
            .iter()
            .filter(|n| n.is_visible_to(user_id))
            .cloned()
            .collect()
    }

    pub fn visible_to_of_kind(&self, user_id: &str, kind: NotificationKind) -> Vec<Notification> {
        self.notifications
            .iter()
            .filter(|n| n.kind == kind && n.is_visible_to(user_id))
            .cloned()
            .collect()
    }

    pub fn count_unread(&self, user_id: &str) -> usize {
        self.notifications
            .iter()
            .filter(|n| n.is_visible_to(user_id) && !n.is_read_by(user_id))
            .count()
    }
}

impl Deref for NotificationsRepository {
    type Target = Collection<Notification>;

    fn deref(&self) -> &Self::Target {
        &self.notifications
    }
}
