//! Loan collection

use chrono::{DateTime, Utc};
use std::ops::Deref;

use super::Collection;
use crate::models::Loan;

#[derive(Debug, Clone, Default)]
pub struct LoansRepository {
    loans: Collection<Loan>,
}

impl LoansRepository {
    pub fn new(loans: Collection<Loan>) -> Self {
        Self { loans }
    }

    pub(crate) fn collection_mut(&mut self) -> &mut Collection<Loan> {
        &mut self.loans
    }

    pub fn for_user(&self, user_id: &str) -> Vec<Loan> {
        self.loans
            .iter()
            .filter(|l| l.user_id == user_id)
            .cloned()
            .collect()
    }

    pub fn for_book(&self, book_id: &str) -> Vec<Loan> {
        self.loans
            .iter()
            .filter(|l| l.book_id == book_id)
            .cloned()
            .collect()
    }

    /// Count active loans
    pub fn count_active(&self) -> usize {
        self.loans.iter().filter(|l| l.is_active()).count()
    }

    /// Count loans still out past their due date
    pub fn count_past_due(&self, now: DateTime<Utc>) -> usize {
        self.loans.iter().filter(|l| l.is_past_due(now)).count()
    }
}

impl Deref for LoansRepository {
    type Target = Collection<Loan>;

    fn deref(&self) -> &Self::Target {
        &self.loans
    }
}
