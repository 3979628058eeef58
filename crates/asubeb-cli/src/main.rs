//! ASUBEB dashboard CLI - view school performance data from the terminal.
//!
//! Wraps the dashboard coordinator from `asubeb-core`: the admin dashboard
//! is fetched once, cached for 10 minutes, and the students table is
//! derived from it.

mod args;
mod render;

use std::io;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use asubeb_core::auth::{PinGate, PinSession};
use asubeb_core::dashboard::students_view;
use asubeb_core::utils::format_age;
use asubeb_core::{ApiClient, ApiSettings, Config, DashboardCoordinator, DashboardParams, FetchOutcome};

use args::{Cli, Command};

/// Directory for rolling log files; logs go to stderr when unset
const LOG_DIR_ENV: &str = "ASUBEB_LOG_DIR";

/// Initialize the tracing subscriber for logging.
/// Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug).
fn init_tracing() -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    match std::env::var(LOG_DIR_ENV) {
        Ok(dir) if !dir.trim().is_empty() => {
            let appender = tracing_appender::rolling::daily(dir, "asubeb.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .with(filter)
                .init();
            Some(guard)
        }
        _ => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(io::stderr))
                .with(filter)
                .init();
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();
    let _guard = init_tracing();

    let cli = Cli::parse();

    let config = Config::load()?;
    let settings = ApiSettings::resolve(&config);
    info!(base_url = %settings.base_url(), "ASUBEB CLI starting");

    match cli.command {
        Command::HashPin { pin } => println!("{}", PinGate::hash_pin(&pin)?),
        Command::Login { pin } => login(&config, &pin)?,
        Command::Logout => {
            PinSession::new(config.cache_dir()?).clear()?;
            println!("Logged out.");
        }
        Command::Status => status(&config, &settings)?,
        Command::Dashboard { filters, force } => {
            let params = DashboardParams::from(filters);
            require_session(&config)?;
            let coordinator = coordinator(&settings)?;
            coordinator.fetch(&params, force).await;
            let entry = coordinator.snapshot();
            match entry.data {
                Some(ref payload) if entry.error.is_none() => print!("{}", render::dashboard(payload)),
                _ => bail!(fetch_error(&coordinator)),
            }
        }
        Command::Students { filters, force } => {
            let params = DashboardParams::from(filters);
            require_session(&config)?;
            let coordinator = coordinator(&settings)?;
            match students_view(&coordinator, &params, force).await {
                Some(view) if coordinator.error_message().is_none() => print!("{}", render::students(&view)),
                _ => bail!(fetch_error(&coordinator)),
            }
        }
        Command::Watch { filters, interval } => {
            watch(&config, &settings, &DashboardParams::from(filters), interval).await?;
        }
    }

    Ok(())
}

fn coordinator(settings: &ApiSettings) -> Result<DashboardCoordinator<ApiClient>> {
    let api = ApiClient::new(settings).context("Failed to create API client")?;
    Ok(DashboardCoordinator::new(api))
}

fn fetch_error(coordinator: &DashboardCoordinator<ApiClient>) -> String {
    coordinator
        .error_message()
        .unwrap_or_else(|| "unknown error".to_string())
}

fn login(config: &Config, pin: &str) -> Result<()> {
    let hash = config
        .pin_hash
        .as_deref()
        .ok_or_else(|| anyhow!("No PIN configured; run `asubeb hash-pin <PIN>` and set pin_hash in {}",
            Config::config_path().map(|p| p.display().to_string()).unwrap_or_default()))?;

    let gate = PinGate::new(hash)?;
    let token = gate.unlock(pin)?;

    let mut session = PinSession::new(config.cache_dir()?);
    session.start(token, Utc::now())?;
    println!("Dashboard unlocked.");
    Ok(())
}

/// Load the PIN session and record activity on it.
fn require_session(config: &Config) -> Result<()> {
    let mut session = PinSession::new(config.cache_dir()?);
    if !session.load()? || !session.touch(Utc::now())? {
        bail!("Dashboard is locked; run `asubeb login <PIN>`");
    }
    Ok(())
}

fn status(config: &Config, settings: &ApiSettings) -> Result<()> {
    println!("API: {}", settings.base_url());

    let mut session = PinSession::new(config.cache_dir()?);
    let now = Utc::now();
    match session.load_at(now)? {
        true => {
            let minutes = session
                .data
                .as_ref()
                .map(|d| d.minutes_until_expiry_at(now))
                .unwrap_or(0);
            println!("Session: unlocked ({} min until lock)", minutes);
        }
        false => println!("Session: locked"),
    }
    Ok(())
}

async fn watch(
    config: &Config,
    settings: &ApiSettings,
    params: &DashboardParams,
    interval_secs: u64,
) -> Result<()> {
    let coordinator = coordinator(settings)?;
    let mut session = PinSession::new(config.cache_dir()?);
    if !session.load()? {
        bail!("Dashboard is locked; run `asubeb login <PIN>`");
    }

    loop {
        if !session.touch(Utc::now())? {
            bail!("PIN session expired");
        }

        let outcome = coordinator.fetch(params, false).await;
        match outcome {
            FetchOutcome::Failed(_) | FetchOutcome::Suppressed => {
                bail!("{} (rerun with `asubeb dashboard --force` to retry)", fetch_error(&coordinator));
            }
            _ => {}
        }

        let entry = coordinator.snapshot();
        if let Some(ref payload) = entry.data {
            println!(
                "--- {} ({}, fetched {}) ---",
                Utc::now().format("%H:%M:%S"),
                if outcome == FetchOutcome::Served { "cached" } else { "network" },
                format_age(coordinator.age_minutes())
            );
            print!("{}", render::dashboard(payload));
        }

        tokio::time::sleep(Duration::from_secs(interval_secs)).await;
    }
}
