//! Configuration management for Libdesk

use chrono::{DateTime, Utc};
use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::env;

use crate::models::Role;

/// Loan period and renewal extension granted to one class of borrower
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct LoanTerms {
    /// Days from borrow date to due date
    pub loan_days: i64,
    /// Days added to the current due date on each renewal
    pub renewal_days: i64,
}

/// How a fine is assessed when an overdue loan is returned
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FinePolicy {
    /// One fixed amount whenever the return happens after the due date
    Flat { amount: Decimal },
    /// A rate per started overdue day, never above `cap`
    PerDay { daily_rate: Decimal, cap: Decimal },
}

impl FinePolicy {
    /// Fine owed for a loan due at `due_date` and returned at `returned_at`
    pub fn assess(&self, due_date: DateTime<Utc>, returned_at: DateTime<Utc>) -> Decimal {
        if returned_at <= due_date {
            return Decimal::ZERO;
        }
        match self {
            FinePolicy::Flat { amount } => *amount,
            FinePolicy::PerDay { daily_rate, cap } => {
                let late = returned_at - due_date;
                let mut days = late.num_days();
                if late > chrono::Duration::days(days) {
                    days += 1;
                }
                (*daily_rate * Decimal::from(days)).min(*cap)
            }
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoanPolicy {
    /// Terms for students, admins and guests
    pub standard: LoanTerms,
    pub faculty: LoanTerms,
    pub max_renewals: u8,
    pub fine: FinePolicy,
}

impl LoanPolicy {
    pub fn terms_for(&self, role: Role) -> &LoanTerms {
        match role {
            Role::Faculty => &self.faculty,
            Role::Student | Role::Admin | Role::Guest => &self.standard,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct NotificationConfig {
    /// User id that receives "new request" notices
    pub admin_recipient: String,
    /// How far ahead due-date reminders look
    pub reminder_window_days: i64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub loans: LoanPolicy,
    #[serde(default)]
    pub notifications: NotificationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on the environment-specific file
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add environment variables (LIBDESK__LOANS__MAX_RENEWALS=3)
            .add_source(
                Environment::with_prefix("LIBDESK")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for LoanTerms {
    fn default() -> Self {
        Self {
            loan_days: 14,
            renewal_days: 7,
        }
    }
}

impl Default for FinePolicy {
    fn default() -> Self {
        FinePolicy::PerDay {
            daily_rate: Decimal::new(50, 2),
            cap: Decimal::new(2000, 2),
        }
    }
}

impl Default for LoanPolicy {
    fn default() -> Self {
        Self {
            standard: LoanTerms::default(),
            faculty: LoanTerms {
                loan_days: 30,
                renewal_days: 14,
            },
            max_renewals: 2,
            fine: FinePolicy::default(),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            admin_recipient: "3".to_string(),
            reminder_window_days: 3,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
