//! Dashboard statistics

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::{acting_user, LibraryStore};
use crate::{
    error::AppResult,
    models::{authorize, DueStatus, Loan, LoanStatus, Operation, User},
};

/// Figures shown on a user's account page
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub user: User,
    /// Overdue first, then borrowed, then returned; earliest due date first within each
    pub loans: Vec<Loan>,
    pub active_loans: usize,
    pub returned_loans: usize,
    pub total_fines: Decimal,
    pub unread_notifications: usize,
}

/// Library-wide counters for administrators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSummary {
    pub total_books: usize,
    pub active_loans: usize,
    pub pending_requests: usize,
    pub overdue_loans: usize,
}

impl LibraryStore {
    pub fn dashboard_summary(&self, actor: Option<&User>) -> AppResult<DashboardSummary> {
        let user = acting_user(actor, Operation::ViewAccount)?;

        let mut loans = self.repository.loans.for_user(&user.id);
        loans.sort_by(|a, b| {
            a.status
                .display_rank()
                .cmp(&b.status.display_rank())
                .then(a.due_date.cmp(&b.due_date))
        });

        let active_loans = loans.iter().filter(|l| l.is_active()).count();
        let returned_loans = loans
            .iter()
            .filter(|l| l.status == LoanStatus::Returned)
            .count();
        let total_fines: Decimal = loans.iter().filter_map(|l| l.fine).sum();

        Ok(DashboardSummary {
            user: user.clone(),
            loans,
            active_loans,
            returned_loans,
            total_fines,
            unread_notifications: self.repository.notifications.count_unread(&user.id),
        })
    }

    pub fn admin_summary(&self, actor: Option<&User>) -> AppResult<AdminSummary> {
        authorize(actor, Operation::ViewAdminSummary)?;
        Ok(AdminSummary {
            total_books: self.repository.books.len(),
            active_loans: self.repository.loans.count_active(),
            pending_requests: self.repository.requests.count_pending(),
            overdue_loans: self.repository.loans.count_past_due(self.now()),
        })
    }

    /// Days left on a loan, measured from the store's clock
    pub fn days_until_due(&self, loan: &Loan) -> DueStatus {
        days_until_due(loan, self.now())
    }
}

pub fn days_until_due(loan: &Loan, now: DateTime<Utc>) -> DueStatus {
    loan.due_status(now)
}
