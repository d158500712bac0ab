//! Notification model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::enums::NotificationKind;

/// Recipient id addressing every user
pub const BROADCAST_RECIPIENT: &str = "all";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    /// A user id, or [`BROADCAST_RECIPIENT`]
    pub user_id: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    /// Read by the recipient; for a broadcast, read by everyone
    #[serde(default)]
    pub read: bool,
    /// Users who have read a broadcast
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub read_by: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn is_broadcast(&self) -> bool {
        self.user_id == BROADCAST_RECIPIENT
    }

    pub fn is_visible_to(&self, user_id: &str) -> bool {
        self.user_id == user_id || self.is_broadcast()
    }

    pub fn is_read_by(&self, user_id: &str) -> bool {
        self.read || (self.is_broadcast() && self.read_by.contains(user_id))
    }

    /// Broadcasts record the reader; direct notifications flip `read`
    pub(crate) fn mark_read_by(&mut self, user_id: &str) {
        if self.is_broadcast() {
            self.read_by.insert(user_id.to_string());
        } else {
            self.read = true;
        }
    }
}
