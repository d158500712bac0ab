//! Loan (borrowed book) model and related types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::enums::LoanStatus;

/// A copy of a book lent to a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    pub id: String,
    pub book_id: String,
    pub user_id: String,
    pub borrow_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_date: Option<DateTime<Utc>>,
    pub renewal_count: u8,
    pub status: LoanStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fine: Option<Decimal>,
}

impl Loan {
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Still out and past its due date, whether or not the overdue sweep has run
    pub fn is_past_due(&self, now: DateTime<Utc>) -> bool {
        self.is_active() && self.due_date < now
    }

    pub fn due_status(&self, now: DateTime<Utc>) -> DueStatus {
        DueStatus::between(now, self.due_date)
    }
}

/// Whole days left before (or since) a due date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DueStatus {
    pub days: i64,
    pub is_overdue: bool,
}

impl DueStatus {
    /// Days are rounded up, so a book due in five hours is due in one day.
    pub fn between(now: DateTime<Utc>, due_date: DateTime<Utc>) -> Self {
        let seconds = (due_date - now).num_seconds();
        let days = seconds.div_euclid(86_400) + i64::from(seconds.rem_euclid(86_400) != 0);
        if days < 0 {
            Self {
                days: -days,
                is_overdue: true,
            }
        } else {
            Self {
                days,
                is_overdue: false,
            }
        }
    }
}
