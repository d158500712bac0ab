//! Acquisition request model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::enums::RequestStatus;

/// A user's request that the library acquire a title
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRequest {
    pub id: String,
    pub user_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub reason: String,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_date: Option<DateTime<Utc>>,
}

/// Submit request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewBookRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    pub author: Option<String>,
    #[validate(length(min = 1, message = "A reason is required"))]
    pub reason: String,
}

impl NewBookRequest {
    pub fn new(title: &str, author: &str, reason: &str) -> Self {
        let author = author.trim();
        Self {
            title: title.trim().to_string(),
            author: (!author.is_empty()).then(|| author.to_string()),
            reason: reason.trim().to_string(),
        }
    }
}
