//! Data models for Libdesk

pub mod book;
pub mod enums;
pub mod loan;
pub mod notification;
pub mod request;
pub mod user;

// Re-export commonly used types
pub use book::{Book, BookFilters, BookUpdate, NewBook};
pub use enums::{Category, LoanStatus, NotificationKind, RequestStatus, Role};
pub use loan::{DueStatus, Loan};
pub use notification::{Notification, BROADCAST_RECIPIENT};
pub use request::{BookRequest, NewBookRequest};
pub use user::{authorize, can_perform, Operation, User};
