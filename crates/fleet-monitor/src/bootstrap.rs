use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use fleet_core::settings::Settings;
use fleet_runtime::fetch::SheetSource;

// ── Directory bootstrap ────────────────────────────────────────────────────────

/// Ensure the standard `~/.fleet-monitor/` directory hierarchy exists.
///
/// Creates the following directories if absent (including any missing parents):
/// - `~/.fleet-monitor/`
/// - `~/.fleet-monitor/logs/`
/// - `~/.fleet-monitor/cache/`
pub fn ensure_directories() -> anyhow::Result<()> {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    let monitor_dir = home.join(".fleet-monitor");
    std::fs::create_dir_all(&monitor_dir)?;
    std::fs::create_dir_all(monitor_dir.join("logs"))?;
    std::fs::create_dir_all(monitor_dir.join("cache"))?;
    Ok(())
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Initialise the global `tracing` subscriber.
///
/// `log_level` is mapped to a [`tracing_subscriber::EnvFilter`] directive.
/// Falls back to `"info"` if the level string is not recognised.
///
/// When `log_file` is given, output goes there instead of stderr; log lines
/// must not fight the TUI for the terminal.
pub fn setup_logging(log_level: &str, log_file: Option<&PathBuf>) -> anyhow::Result<()> {
    let upper = log_level.to_uppercase();
    let normalised = match upper.as_str() {
        "DEBUG" | "CRITICAL" => "debug",
        "INFO" => "info",
        "WARNING" => "warn",
        "ERROR" => "error",
        other => other,
    };

    let filter = EnvFilter::try_new(normalised).unwrap_or_else(|_| EnvFilter::new("info"));

    match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            let subscriber = fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_ansi(false)
                .with_writer(file);
            tracing_subscriber::registry()
                .with(filter)
                .with(subscriber)
                .init();
        }
        None => {
            let subscriber = fmt::layer().with_target(false).with_thread_ids(false);
            tracing_subscriber::registry()
                .with(filter)
                .with(subscriber)
                .init();
        }
    }

    Ok(())
}

// ── Source resolution ──────────────────────────────────────────────────────────

/// Resolve the telemetry source from settings.
///
/// Precedence: a local `--csv` file wins over the authenticated `--api-url`,
/// which wins over the public `--sheet-id` export. Errors when nothing is
/// configured or when the API endpoint is given without a token.
pub fn resolve_source(settings: &Settings) -> anyhow::Result<SheetSource> {
    if let Some(path) = &settings.csv {
        return Ok(SheetSource::File(path.clone()));
    }
    if let Some(url) = &settings.api_url {
        let Some(token) = &settings.api_token else {
            anyhow::bail!("--api-url requires a token (--api-token or FLEET_API_TOKEN)");
        };
        return Ok(SheetSource::Api {
            url: url.clone(),
            token: token.clone(),
        });
    }
    if let Some(sheet_id) = &settings.sheet_id {
        return Ok(SheetSource::export_url(sheet_id, settings.gid));
    }
    anyhow::bail!("no telemetry source configured; pass --csv, --api-url, or --sheet-id")
}

// ── Tests ──────────────────────────────────────────────────────────────────────
