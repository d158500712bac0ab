//! End-to-end store scenarios

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use libdesk::{
    clock::ManualClock,
    models::{LoanStatus, NotificationKind, RequestStatus, User},
    repository::Repository,
    AppConfig, AppError, AuthService, LibraryStore,
};

struct Desk {
    clock: Arc<ManualClock>,
    store: LibraryStore,
    student: User,
    faculty: User,
    admin: User,
}

fn desk() -> Desk {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2023, 6, 10, 9, 30, 0).unwrap(),
    ));
    let store = LibraryStore::new(
        Repository::seeded().unwrap(),
        &AppConfig::default(),
        clock.clone(),
    );

    let mut auth = AuthService::new();
    let mut sign_in = |email: &str| auth.login(email, "password").unwrap().clone();
    let student = sign_in("student@example.com");
    let faculty = sign_in("faculty@example.com");
    let admin = sign_in("admin@example.com");

    Desk {
        clock,
        store,
        student,
        faculty,
        admin,
    }
}

fn assert_copies_consistent(store: &LibraryStore) {
    for book in store.books().values() {
        assert!(
            book.available_copies <= book.total_copies,
            "book {}",
            book.id
        );
        assert_eq!(
            book.available,
            book.available_copies > 0,
            "book {}",
            book.id
        );
    }
}

#[test]
fn student_borrows_and_returns() {
    let Desk {
        clock,
        mut store,
        student,
        ..
    } = desk();
    let notes_before = store.notifications().len();

    let loan = store.borrow_book(Some(&student), "1").unwrap();
    let book = store.get_book_by_id("1").unwrap();
    assert_eq!(book.available_copies, 2);
    assert!(book.available);
    assert_eq!(loan.due_date, loan.borrow_date + Duration::days(14));
    assert_eq!(store.notifications().len(), notes_before + 1);
    assert_copies_consistent(&store);

    clock.advance(Duration::days(3));
    let returned = store.return_book(Some(&student), &loan.id).unwrap();
    assert_eq!(returned.status, LoanStatus::Returned);
    assert_eq!(store.get_book_by_id("1").unwrap().available_copies, 3);

    // a second return changes nothing
    let books = store.books();
    assert!(matches!(
        store.return_book(Some(&student), &loan.id),
        Err(AppError::BusinessRule(_))
    ));
    assert!(Arc::ptr_eq(&books, &store.books()));
    assert_copies_consistent(&store);
}

#[test]
fn faculty_takes_the_last_copy() {
    let Desk {
        mut store,
        student,
        faculty,
        ..
    } = desk();

    store.borrow_book(Some(&student), "6").unwrap();
    assert_eq!(store.get_book_by_id("6").unwrap().available_copies, 1);

    let loan = store.borrow_book(Some(&faculty), "6").unwrap();
    let book = store.get_book_by_id("6").unwrap();
    assert_eq!(book.available_copies, 0);
    assert!(!book.available);
    assert_eq!(loan.due_date, loan.borrow_date + Duration::days(30));

    let loans = store.loans();
    let notifications = store.notifications();
    assert!(store.borrow_book(Some(&student), "6").is_err());
    assert!(Arc::ptr_eq(&loans, &store.loans()));
    assert!(Arc::ptr_eq(&notifications, &store.notifications()));
    assert_copies_consistent(&store);
}

#[test]
fn renewals_stop_at_the_limit() {
    let Desk {
        mut store,
        student,
        ..
    } = desk();
    let loan = store.borrow_book(Some(&student), "8").unwrap();

    let first = store.renew_book(Some(&student), &loan.id).unwrap();
    assert_eq!(first.due_date, loan.due_date + Duration::days(7));
    let second = store.renew_book(Some(&student), &loan.id).unwrap();
    assert_eq!(second.due_date, first.due_date + Duration::days(7));
    assert_eq!(second.renewal_count, 2);

    let loans = store.loans();
    let err = store.renew_book(Some(&student), &loan.id).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Business rule violation: Maximum renewals reached (2/2)"
    );
    assert!(Arc::ptr_eq(&loans, &store.loans()));
}

#[test]
fn overdue_loans_are_flagged_and_fined() {
    let Desk {
        clock,
        mut store,
        student,
        ..
    } = desk();
    // one seeded loan is already late
    assert_eq!(store.refresh_overdue_loans(), 1);
    let loan = store.borrow_book(Some(&student), "2").unwrap();

    clock.advance(Duration::days(16));
    // the new loan plus two seeded loans due on June 15th
    assert_eq!(store.refresh_overdue_loans(), 3);
    assert_eq!(
        store.get_loan_by_id(&loan.id).unwrap().status,
        LoanStatus::Overdue
    );
    assert!(store.renew_book(Some(&student), &loan.id).is_err());

    let returned = store.return_book(Some(&student), &loan.id).unwrap();
    assert_eq!(returned.fine, Some("1.00".parse().unwrap()));
}

#[test]
fn non_admin_cannot_decide_requests() {
    let Desk {
        mut store,
        student,
        faculty,
        admin,
        ..
    } = desk();

    let request = store
        .request_book(
            Some(&student),
            "The Pragmatic Programmer",
            "Hunt, Thomas",
            "Course reading.",
        )
        .unwrap();

    for user in [&student, &faculty] {
        assert!(store.approve_book_request(Some(user), &request.id).is_err());
        assert!(store.reject_book_request(Some(user), &request.id).is_err());
    }
    assert!(store.approve_book_request(None, &request.id).is_err());
    assert_eq!(
        store.requests().get(&request.id).unwrap().status,
        RequestStatus::Pending
    );

    store.approve_book_request(Some(&admin), &request.id).unwrap();
    let responses =
        store.user_notifications_of_kind(Some(&student), NotificationKind::RequestResponse);
    assert_eq!(responses.len(), 1);
    assert!(responses[0].message.contains("The Pragmatic Programmer"));
}

#[test]
fn deleting_a_book_removes_its_loans() {
    let Desk {
        mut store,
        student,
        faculty,
        admin,
        ..
    } = desk();

    store.borrow_book(Some(&student), "2").unwrap();
    store.borrow_book(Some(&faculty), "2").unwrap();
    assert_eq!(store.book_loans(Some(&admin), "2").unwrap().len(), 2);

    store.delete_book(Some(&admin), "2").unwrap();
    assert!(store.loans().values().all(|l| l.book_id != "2"));
    assert_eq!(store.loans().len(), 4);
    assert!(store.get_book_by_id("2").is_none());
}

#[test]
fn snapshots_survive_later_mutations() {
    let Desk {
        mut store,
        student,
        ..
    } = desk();
    let before = store.books();

    store.borrow_book(Some(&student), "1").unwrap();

    assert_eq!(before.get("1").unwrap().available_copies, 3);
    assert_eq!(store.books().get("1").unwrap().available_copies, 2);
}
