//! Libdesk demo
//!
//! Signs a demo account in and prints its dashboard as JSON:
//!
//! ```text
//! libdesk student@example.com password
//! ```

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use libdesk::{config::AppConfig, error::ErrorResponse, AppResult, AppState};

fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("libdesk={}", config.logging.level).into());
    let json = config.logging.format == "json";

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .init();

    tracing::info!("Starting Libdesk v{}", env!("CARGO_PKG_VERSION"));

    let mut args = std::env::args().skip(1);
    let (Some(email), Some(password)) = (args.next(), args.next()) else {
        anyhow::bail!("usage: libdesk <email> <password>");
    };

    let reminder_window = config.notifications.reminder_window_days;
    let mut state = AppState::new(config).context("Failed to seed the library store")?;

    let overdue = state.store.refresh_overdue_loans();
    let reminders = state.store.send_due_date_reminders(reminder_window);
    tracing::info!(
        "{} loan(s) overdue, {} reminder(s) sent",
        overdue,
        reminders
    );

    if let Err(err) = print_dashboard(&mut state, &email, &password) {
        eprintln!("{}", serde_json::to_string(&ErrorResponse::from(&err))?);
        anyhow::bail!(err);
    }

    Ok(())
}

/// Sign in and print the dashboard, plus library counters for admins
fn print_dashboard(state: &mut AppState, email: &str, password: &str) -> AppResult<()> {
    state.auth.login(email, password)?;
    let user = state.current_user();

    let dashboard = state.store.dashboard_summary(user)?;
    println!("{}", serde_json::to_string_pretty(&dashboard)?);

    if user.is_some_and(|u| u.is_admin()) {
        let summary = state.store.admin_summary(user)?;
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Ok(())
}
