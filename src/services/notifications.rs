//! Notification views and read state

use super::{acting_user, LibraryStore};
use crate::{
    error::{AppError, AppResult},
    models::{authorize, Notification, NotificationKind, Operation, User},
};

impl LibraryStore {
    /// Notifications for the signed-in user, broadcasts included
    pub fn user_notifications(&self, actor: Option<&User>) -> Vec<Notification> {
        actor
            .map(|u| self.repository.notifications.visible_to(&u.id))
            .unwrap_or_default()
    }

    pub fn user_notifications_of_kind(
        &self,
        actor: Option<&User>,
        kind: NotificationKind,
    ) -> Vec<Notification> {
        actor
            .map(|u| self.repository.notifications.visible_to_of_kind(&u.id, kind))
            .unwrap_or_default()
    }

    pub fn unread_notification_count(&self, actor: Option<&User>) -> usize {
        actor
            .map(|u| self.repository.notifications.count_unread(&u.id))
            .unwrap_or(0)
    }

    /// Mark one notification as read. Marking it twice is not an error.
    ///
    /// A broadcast read by a signed-in user stays unread for everyone else.
    pub fn mark_notification_as_read(&mut self, actor: Option<&User>, id: &str) -> AppResult<()> {
        authorize(actor, Operation::MarkNotificationRead)?;

        let notification = self
            .repository
            .notifications
            .get(id)
            .ok_or_else(|| AppError::NotFound(format!("Notification with id {} not found", id)))?;
        let already_read = match actor {
            Some(user) => notification.is_read_by(&user.id),
            None => notification.read,
        };
        if already_read {
            return Ok(());
        }

        self.repository
            .notifications
            .collection_mut()
            .update(id, |n| match actor {
                Some(user) => n.mark_read_by(&user.id),
                None => n.read = true,
            });
        tracing::debug!("Notification {} marked as read", id);
        Ok(())
    }

    /// Mark everything the user can see as read; returns how many changed
    pub fn mark_all_notifications_as_read(&mut self, actor: Option<&User>) -> AppResult<usize> {
        let user = acting_user(actor, Operation::ViewAccount)?;
        let count = self
            .repository
            .notifications
            .collection_mut()
            .update_where(
                |n| n.is_visible_to(&user.id) && !n.is_read_by(&user.id),
                |n| n.mark_read_by(&user.id),
            );
        tracing::info!(
            "{} notification(s) marked as read for user {}",
            count,
            user.id
        );
        Ok(count)
    }
}
