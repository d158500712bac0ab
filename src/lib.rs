//! Libdesk library core
//!
//! In-memory state for a small lending library: the catalog, loans,
//! notifications and acquisition requests, with role-based rules for who
//! may change what. Everything runs synchronously against one
//! [`LibraryStore`]; readers take cheap [`repository::Snapshot`]s.

use std::sync::Arc;

pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use services::{auth::AuthService, LibraryStore};

/// Application state: configuration, the signed-in session and the store
#[derive(Debug)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub auth: AuthService,
    pub store: LibraryStore,
}

impl AppState {
    /// Seeded store on wall-clock time with the demo accounts
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let store = LibraryStore::seeded(&config)?;
        Ok(Self {
            config: Arc::new(config),
            auth: AuthService::new(),
            store,
        })
    }

    /// Who is acting on the store right now
    pub fn current_user(&self) -> Option<&models::User> {
        self.auth.current_user()
    }
}
