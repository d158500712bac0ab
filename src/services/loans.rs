//! Loan management service

use chrono::Duration;

use super::{acting_user, display_date, new_id, LibraryStore};
use crate::{
    error::{AppError, AppResult},
    models::{authorize, Loan, LoanStatus, NotificationKind, Operation, User},
};

impl LibraryStore {
    pub fn get_loan_by_id(&self, id: &str) -> Option<&Loan> {
        self.repository.loans.get(id)
    }

    /// Loans of the signed-in user; empty when nobody is signed in
    pub fn user_loans(&self, actor: Option<&User>) -> Vec<Loan> {
        actor
            .map(|u| self.repository.loans.for_user(&u.id))
            .unwrap_or_default()
    }

    /// Borrow one copy of a book
    pub fn borrow_book(&mut self, actor: Option<&User>, book_id: &str) -> AppResult<Loan> {
        let user = acting_user(actor, Operation::BorrowBook)?;

        let book = self
            .repository
            .books
            .get(book_id)
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book_id)))?;
        if book.available_copies == 0 {
            tracing::warn!("Borrow refused: no copies of book {} left", book_id);
            return Err(AppError::BusinessRule(format!(
                "No copies of \"{}\" are available",
                book.title
            )));
        }
        let title = book.title.clone();

        let now = self.now();
        let due_date = now + Duration::days(self.policy.terms_for(user.role).loan_days);
        let loan = Loan {
            id: new_id("borrow"),
            book_id: book_id.to_string(),
            user_id: user.id.clone(),
            borrow_date: now,
            due_date,
            return_date: None,
            renewal_count: 0,
            status: LoanStatus::Borrowed,
            fine: None,
        };

        self.repository.books.check_out_copy(book_id);
        self.repository.loans.collection_mut().upsert(loan.clone());
        self.notify(
            &user.id,
            NotificationKind::System,
            format!(
                "You have borrowed \"{}\". Due date: {}",
                title,
                display_date(due_date)
            ),
        );

        tracing::info!(
            "Loan {} created: book={} user={} due={}",
            loan.id,
            book_id,
            user.id,
            due_date
        );
        Ok(loan)
    }

    /// Return a borrowed or overdue loan, assessing any fine
    pub fn return_book(&mut self, actor: Option<&User>, loan_id: &str) -> AppResult<Loan> {
        authorize(actor, Operation::ReturnBook)?;

        let loan = self
            .repository
            .loans
            .get(loan_id)
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", loan_id)))?;
        if !loan.is_active() {
            return Err(AppError::BusinessRule("Loan already returned".to_string()));
        }

        let now = self.now();
        let fine = self.policy.fine.assess(loan.due_date, now);
        let book_id = loan.book_id.clone();

        let returned = self
            .repository
            .loans
            .collection_mut()
            .update(loan_id, |l| {
                l.return_date = Some(now);
                l.status = LoanStatus::Returned;
                l.fine = Some(fine);
            })
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", loan_id)))?;

        if !self.repository.books.check_in_copy(&book_id) {
            tracing::warn!(
                "Return of loan {}: book {} already has every copy on the shelf",
                loan_id,
                book_id
            );
        }

        if let Some(user) = actor {
            let title = self
                .repository
                .books
                .get(&book_id)
                .map(|b| b.title.clone())
                .unwrap_or(book_id);
            self.notify(
                &user.id,
                NotificationKind::System,
                format!("You have returned \"{}\".", title),
            );
        }

        tracing::info!("Loan {} returned, fine {}", loan_id, fine);
        Ok(returned)
    }

    /// Extend a borrowed loan from its current due date
    pub fn renew_book(&mut self, actor: Option<&User>, loan_id: &str) -> AppResult<Loan> {
        let user = acting_user(actor, Operation::RenewLoan)?;

        let loan = self
            .repository
            .loans
            .get(loan_id)
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", loan_id)))?;
        if loan.status != LoanStatus::Borrowed {
            return Err(AppError::BusinessRule(format!(
                "Cannot renew a loan that is {}",
                loan.status
            )));
        }
        if loan.renewal_count >= self.policy.max_renewals {
            tracing::warn!("Renewal refused: loan {} at its limit", loan_id);
            return Err(AppError::BusinessRule(format!(
                "Maximum renewals reached ({}/{})",
                loan.renewal_count, self.policy.max_renewals
            )));
        }

        let extension = Duration::days(self.policy.terms_for(user.role).renewal_days);
        let renewed = self
            .repository
            .loans
            .collection_mut()
            .update(loan_id, |l| {
                l.due_date += extension;
                l.renewal_count += 1;
            })
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", loan_id)))?;

        let title = self
            .repository
            .books
            .get(&renewed.book_id)
            .map(|b| b.title.clone())
            .unwrap_or_else(|| renewed.book_id.clone());
        self.notify(
            &user.id,
            NotificationKind::System,
            format!(
                "You have renewed \"{}\". New due date: {}",
                title,
                display_date(renewed.due_date)
            ),
        );

        tracing::info!(
            "Loan {} renewed ({}/{}), due {}",
            loan_id,
            renewed.renewal_count,
            self.policy.max_renewals,
            renewed.due_date
        );
        Ok(renewed)
    }

    /// Flag borrowed loans past their due date as overdue; returns how many changed
    pub fn refresh_overdue_loans(&mut self) -> usize {
        let now = self.now();
        let count = self.repository.loans.collection_mut().update_where(
            |l| l.status == LoanStatus::Borrowed && l.due_date < now,
            |l| l.status = LoanStatus::Overdue,
        );
        if count > 0 {
            tracing::info!("{} loan(s) marked overdue", count);
        }
        count
    }

    /// Remind borrowers of loans falling due within `within_days`; returns how many were sent
    pub fn send_due_date_reminders(&mut self, within_days: i64) -> usize {
        let now = self.now();
        let horizon = now + Duration::days(within_days);

        let reminders: Vec<(String, String)> = self
            .repository
            .loans
            .iter()
            .filter(|l| {
                l.status == LoanStatus::Borrowed && l.due_date >= now && l.due_date <= horizon
            })
            .map(|l| {
                let title = self
                    .repository
                    .books
                    .get(&l.book_id)
                    .map(|b| b.title.as_str())
                    .unwrap_or(l.book_id.as_str());
                let days = l.due_status(now).days;
                let message = match days {
                    0 => format!("Your book \"{}\" is due today.", title),
                    1 => format!("Your book \"{}\" is due in 1 day.", title),
                    n => format!("Your book \"{}\" is due in {} days.", title, n),
                };
                (l.user_id.clone(), message)
            })
            .collect();

        let count = reminders.len();
        for (user_id, message) in reminders {
            self.notify(&user_id, NotificationKind::DueDate, message);
        }
        if count > 0 {
            tracing::info!("Sent {} due date reminder(s)", count);
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Duration;
    use rust_decimal::Decimal;

    use super::super::testing::*;
    use super::*;
    use crate::models::Role;

    #[test]
    fn test_student_borrow() {
        let now = at(2024, 2, 1);
        let mut store = store_at(now);
        let student = student();

        let loan = store.borrow_book(Some(&student), "1").unwrap();
        assert_eq!(loan.due_date, now + Duration::days(14));
        assert_eq!(loan.renewal_count, 0);
        assert_eq!(loan.status, LoanStatus::Borrowed);

        let book = store.get_book_by_id("1").unwrap();
        assert_eq!(book.available_copies, 2);
        assert!(book.available);

        let notes = store.notifications();
        let (_, note) = notes.last().unwrap();
        assert_eq!(note.user_id, "1");
        assert_eq!(
            note.message,
            "You have borrowed \"To Kill a Mockingbird\". Due date: Feb 15, 2024"
        );
    }

    #[test]
    fn test_borrow_last_copy() {
        let now = at(2024, 2, 1);
        let mut store = store_at(now);
        let faculty = faculty();

        // book 5 has two copies on the shelf
        store.borrow_book(Some(&faculty), "5").unwrap();
        let loan = store.borrow_book(Some(&faculty), "5").unwrap();
        assert_eq!(loan.due_date, now + Duration::days(30));

        let book = store.get_book_by_id("5").unwrap();
        assert_eq!(book.available_copies, 0);
        assert!(!book.available);

        let loans = store.loans();
        let notes = store.notifications();
        assert!(matches!(
            store.borrow_book(Some(&faculty), "5"),
            Err(AppError::BusinessRule(_))
        ));
        assert!(Arc::ptr_eq(&loans, &store.loans()));
        assert!(Arc::ptr_eq(&notes, &store.notifications()));
    }

    #[test]
    fn test_borrow_requires_user_and_book() {
        let mut store = store_at(at(2024, 2, 1));
        assert!(matches!(
            store.borrow_book(None, "1"),
            Err(AppError::Authentication(_))
        ));
        assert!(matches!(
            store.borrow_book(Some(&student()), "42"),
            Err(AppError::NotFound(_))
        ));
        assert_eq!(store.loans().len(), 4);
    }

    #[test]
    fn test_return_on_time_has_no_fine() {
        let mut store = store_at(at(2023, 6, 10));
        let student = student();

        let returned = store.return_book(Some(&student), "borrow-1").unwrap();
        assert_eq!(returned.status, LoanStatus::Returned);
        assert_eq!(returned.return_date, Some(at(2023, 6, 10)));
        assert_eq!(returned.fine, Some(Decimal::ZERO));
        assert_eq!(store.get_book_by_id("1").unwrap().available_copies, 4);

        let notes = store.notifications();
        assert_eq!(
            notes.last().unwrap().1.message,
            "You have returned \"To Kill a Mockingbird\"."
        );
    }

    #[test]
    fn test_return_late_assesses_fine() {
        // borrow-2 was due 2023-06-03 00:00
        let mut store = store_at(at(2023, 6, 6));
        let returned = store.return_book(None, "borrow-2").unwrap();
        // 3 days 10 hours late: four started days at 0.50
        assert_eq!(returned.fine, Some(Decimal::new(200, 2)));
        // no acting user, so no notification
        assert_eq!(store.notifications().len(), 5);
    }

    #[test]
    fn test_return_twice_is_rejected() {
        let mut store = store_at(at(2023, 6, 10));
        store.return_book(None, "borrow-1").unwrap();
        let copies = store.get_book_by_id("1").unwrap().available_copies;

        assert!(matches!(
            store.return_book(None, "borrow-1"),
            Err(AppError::BusinessRule(_))
        ));
        assert!(matches!(
            store.return_book(None, "borrow-4"),
            Err(AppError::BusinessRule(_))
        ));
        assert_eq!(store.get_book_by_id("1").unwrap().available_copies, copies);
        assert!(matches!(
            store.return_book(None, "nope"),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_renew_extends_from_due_date() {
        let mut store = store_at(at(2023, 6, 10));
        let student = student();
        let due = store.get_loan_by_id("borrow-1").unwrap().due_date;

        let renewed = store.renew_book(Some(&student), "borrow-1").unwrap();
        assert_eq!(renewed.due_date, due + Duration::days(7));
        assert_eq!(renewed.renewal_count, 1);

        let notes = store.notifications();
        assert_eq!(
            notes.last().unwrap().1.message,
            "You have renewed \"To Kill a Mockingbird\". New due date: Jun 22, 2023"
        );
    }

    #[test]
    fn test_renew_limit() {
        let mut store = store_at(at(2023, 6, 1));
        let faculty = user("2", Role::Faculty);
        let due = store.get_loan_by_id("borrow-3").unwrap().due_date;

        store.renew_book(Some(&faculty), "borrow-3").unwrap();
        let second = store.renew_book(Some(&faculty), "borrow-3").unwrap();
        assert_eq!(second.due_date, due + Duration::days(28));
        assert_eq!(second.renewal_count, 2);

        let notes = store.notifications();
        assert!(matches!(
            store.renew_book(Some(&faculty), "borrow-3"),
            Err(AppError::BusinessRule(_))
        ));
        let loan = store.get_loan_by_id("borrow-3").unwrap();
        assert_eq!(loan.due_date, second.due_date);
        assert_eq!(loan.renewal_count, 2);
        assert!(Arc::ptr_eq(&notes, &store.notifications()));
    }

    #[test]
    fn test_renew_rejects_inactive_loans() {
        let mut store = store_at(at(2023, 6, 10));
        let student = student();
        assert!(store.renew_book(Some(&student), "borrow-4").is_err());
        assert!(matches!(
            store.renew_book(None, "borrow-1"),
            Err(AppError::Authentication(_))
        ));
    }

    #[test]
    fn test_overdue_sweep() {
        let mut store = store_at(at(2023, 6, 10));
        // borrow-2 was due on June 3rd
        assert_eq!(store.refresh_overdue_loans(), 1);
        assert_eq!(
            store.get_loan_by_id("borrow-2").unwrap().status,
            LoanStatus::Overdue
        );
        assert_eq!(store.refresh_overdue_loans(), 0);

        // overdue loans cannot be renewed but can be returned
        assert!(store.renew_book(Some(&student()), "borrow-2").is_err());
        let returned = store.return_book(Some(&student()), "borrow-2").unwrap();
        assert_eq!(returned.status, LoanStatus::Returned);
        assert_eq!(returned.fine, Some(Decimal::new(400, 2)));
    }

    #[test]
    fn test_due_date_reminders() {
        let mut store = store_at(at(2023, 6, 12));
        // borrow-1 and borrow-3 are both due June 15th
        assert_eq!(store.send_due_date_reminders(3), 2);

        let notes = store.notifications();
        let reminders: Vec<_> = notes
            .values()
            .filter(|n| n.kind == NotificationKind::DueDate && n.created_at == at(2023, 6, 12))
            .collect();
        assert_eq!(reminders.len(), 2);
        assert_eq!(
            reminders[0].message,
            "Your book \"To Kill a Mockingbird\" is due in 3 days."
        );
        assert_eq!(reminders[1].user_id, "2");

        assert_eq!(store.send_due_date_reminders(1), 0);
    }

    #[test]
    fn test_user_loans_projection() {
        let store = store_at(at(2023, 6, 10));
        assert!(store.user_loans(None).is_empty());
        let mine = store.user_loans(Some(&student()));
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|l| l.user_id == "1"));
    }
}
