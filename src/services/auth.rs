//! Demo authentication: an in-memory credential table and the signed-in user

use chrono::Utc;
use serde::Deserialize;
use std::collections::HashMap;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{Role, User},
};

const DEMO_PASSWORD: &str = "password";

/// Signup form
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewUser {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Clone)]
pub struct AuthService {
    users: Vec<User>,
    /// Keyed by email
    passwords: HashMap<String, String>,
    current: Option<User>,
}

impl Default for AuthService {
    /// Seeded with one demo account per role, all sharing the demo password
    fn default() -> Self {
        let users: Vec<User> = [
            ("1", "Student User", Role::Student),
            ("2", "Faculty User", Role::Faculty),
            ("3", "Admin User", Role::Admin),
        ]
        .into_iter()
        .map(|(id, name, role)| User {
            id: id.to_string(),
            name: name.to_string(),
            email: format!("{}@example.com", role),
            role,
            profile_picture: Some(format!("https://i.pravatar.cc/150?u={}", role)),
        })
        .collect();
        let passwords = users
            .iter()
            .map(|u| (u.email.clone(), DEMO_PASSWORD.to_string()))
            .collect();

        Self {
            users,
            passwords,
            current: None,
        }
    }
}

impl AuthService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    /// Sign in with email and password
    pub fn login(&mut self, email: &str, password: &str) -> AppResult<&User> {
        let user = self
            .users
            .iter()
            .find(|u| u.email == email)
            .filter(|_| self.passwords.get(email).is_some_and(|p| p == password))
            .cloned()
            .ok_or_else(|| {
                tracing::warn!("Failed login for {}", email);
                AppError::Authentication("Invalid email or password".to_string())
            })?;

        tracing::info!("User {} signed in", user.id);
        Ok(&*self.current.insert(user))
    }

    /// Create an account and sign it in
    pub fn signup(&mut self, data: NewUser) -> AppResult<&User> {
        data.validate()?;
        if self.users.iter().any(|u| u.email == data.email) {
            return Err(AppError::Conflict("Email already exists".to_string()));
        }

        let user = User {
            id: (self.users.len() + 1).to_string(),
            name: data.name,
            email: data.email,
            role: data.role,
            profile_picture: Some(format!(
                "https://i.pravatar.cc/150?u={}",
                Utc::now().timestamp_millis()
            )),
        };
        self.passwords.insert(user.email.clone(), data.password);
        self.users.push(user.clone());

        tracing::info!("Account {} created with role {}", user.id, user.role);
        Ok(&*self.current.insert(user))
    }

    pub fn logout(&mut self) {
        if let Some(user) = self.current.take() {
            tracing::info!("User {} signed out", user.id);
        }
    }

    /// Current user as JSON, for keeping the session across restarts
    pub fn export_session(&self) -> AppResult<Option<String>> {
        self.current
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(AppError::from)
    }

    /// Sign back in from [`export_session`](Self::export_session) output.
    ///
    /// Only the saved email is trusted; id, name and role come from the
    /// account table.
    pub fn restore_session(&mut self, json: &str) -> AppResult<&User> {
        let saved: User = serde_json::from_str(json)?;
        let account = self
            .users
            .iter()
            .find(|u| u.email == saved.email)
            .cloned()
            .ok_or_else(|| {
                AppError::Authentication("Saved session does not match any account".to_string())
            })?;
        if account.id != saved.id || account.role != saved.role {
            tracing::warn!(
                "Saved session for {} disagrees with the account, using the account",
                account.email
            );
        }
        tracing::debug!("Session restored for user {}", account.id);
        Ok(&*self.current.insert(account))
    }
}
