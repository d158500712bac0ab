//! User model and role-based authorization

use serde::{Deserialize, Serialize};

use super::enums::Role;
use crate::error::{AppError, AppResult};

/// Library account, owned by the auth service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Store operations subject to authorization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    BorrowBook,
    ReturnBook,
    RenewLoan,
    RequestBook,
    DecideRequest,
    ManageCatalog,
    MarkNotificationRead,
    ViewAccount,
    ViewAdminSummary,
}

/// Who may perform an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Audience {
    Anyone,
    SignedIn,
    Admin,
}

impl Operation {
    fn audience(self) -> Audience {
        match self {
            Operation::ReturnBook | Operation::MarkNotificationRead => Audience::Anyone,
            Operation::BorrowBook
            | Operation::RenewLoan
            | Operation::RequestBook
            | Operation::ViewAccount => Audience::SignedIn,
            Operation::DecideRequest | Operation::ManageCatalog | Operation::ViewAdminSummary => {
                Audience::Admin
            }
        }
    }
}

/// Single authorization predicate consulted by every store operation
pub fn can_perform(user: Option<&User>, operation: Operation) -> bool {
    match operation.audience() {
        Audience::Anyone => true,
        Audience::SignedIn => user.is_some(),
        Audience::Admin => user.is_some_and(User::is_admin),
    }
}

/// [`can_perform`], reported as an error naming the missing capability
pub fn authorize(user: Option<&User>, operation: Operation) -> AppResult<()> {
    if can_perform(user, operation) {
        return Ok(());
    }
    match user {
        None => Err(AppError::unauthenticated()),
        Some(user) => Err(AppError::Authorization(format!(
            "Role {} may not perform {:?}",
            user.role, operation
        ))),
    }
}
