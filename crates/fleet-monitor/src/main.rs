mod bootstrap;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use fleet_core::models::{GaugeMode, TelemetryRecord, WindowMode};
use fleet_core::settings::Settings;
use fleet_data::analysis::build_snapshot;
use fleet_data::export;
use fleet_data::window::ReportWindow;
use fleet_runtime::data_manager::DataManager;
use fleet_runtime::fetch::SheetSource;
use fleet_runtime::orchestrator::DashboardOrchestrator;
use fleet_ui::app::{App, ViewMode};

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("Fleet Monitor v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "View: {}, Window: {}, Theme: {}",
        settings.view,
        settings.window,
        settings.theme
    );

    let source = bootstrap::resolve_source(&settings)?;
    tracing::info!("Telemetry source: {}", source.describe());

    let window_mode = WindowMode::from_name(&settings.window);
    let gauge_mode = GaugeMode::from_name(&settings.gauge_mode);

    // Headless export: fetch once, write the artifacts, exit without a TUI.
    if let Some(dir) = &settings.export {
        run_export(source, window_mode, gauge_mode, dir).await?;
        return Ok(());
    }

    match settings.view.as_str() {
        "dashboard" => {
            tracing::info!("Starting live dashboard...");

            let orchestrator = DashboardOrchestrator::new(
                u64::from(settings.refresh_rate),
                source,
                settings.cache_ttl,
            );

            let (rx, handle) = orchestrator.start();

            let app = App::new(
                &settings.theme,
                ViewMode::Dashboard,
                window_mode,
                gauge_mode,
            );

            // Run the TUI event loop. The loop exits on 'q' / Ctrl+C inside the TUI.
            // We also listen for Ctrl+C at the OS level so that signals received
            // while the terminal is in raw mode are handled cleanly.
            tokio::select! {
                result = app.run_dashboard(rx, &handle) => {
                    handle.abort();
                    result?;
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Ctrl+C received; shutting down refresh task");
                    handle.abort();
                }
            }
        }

        "summary" | "daily" => {
            tracing::info!("Running {} view...", settings.view);

            let records = fetch_once(source).await?;
            let snapshot = build_snapshot(&records, window_mode, gauge_mode);

            let view_mode = if settings.view == "daily" {
                ViewMode::Daily
            } else {
                ViewMode::Summary
            };

            let app = App::new(&settings.theme, view_mode, window_mode, gauge_mode);
            app.run_table(snapshot).await?;
        }

        unknown => {
            eprintln!("Unknown view mode: {}", unknown);
        }
    }

    Ok(())
}

/// Fetch and normalize the sheet once, off the async runtime.
///
/// Goes through the data manager (TTL 0, forced) so a one-shot load gets the
/// same retry-once policy as the live dashboard. The blocking HTTP client
/// cannot be driven from an async context, so the whole load runs on the
/// blocking pool.
async fn fetch_once(source: SheetSource) -> Result<Arc<Vec<TelemetryRecord>>> {
    tokio::task::spawn_blocking(move || {
        let mut manager = DataManager::new(source, 0)?;
        manager.get_data(true).ok_or_else(|| {
            anyhow::anyhow!(
                "telemetry fetch failed: {}",
                manager.last_error().unwrap_or("unknown error")
            )
        })
    })
    .await?
}

/// Write the export artifacts into `dir`: window-filtered rows, the summary
/// table, and the text report, all scoped to the same reporting window.
fn write_export_artifacts(
    records: &[TelemetryRecord],
    window_mode: WindowMode,
    gauge_mode: GaugeMode,
    dir: &Path,
) -> Result<()> {
    let snapshot = build_snapshot(records, window_mode, gauge_mode);
    let in_window = match ReportWindow::for_mode(records, window_mode) {
        Some(window) => window.filter(records),
        None => Vec::new(),
    };

    std::fs::create_dir_all(dir)?;
    export::write_rows_csv(&dir.join("telemetry.csv"), &in_window)?;
    export::write_summary_csv(&dir.join("summary.csv"), &snapshot.summary)?;
    export::write_text_report(&dir.join("report.txt"), &snapshot)?;

    tracing::info!(
        rows = in_window.len(),
        summary_rows = snapshot.summary.len(),
        "export complete"
    );
    Ok(())
}

/// Headless `--export` entry point: one fresh fetch, then the artifacts.
async fn run_export(
    source: SheetSource,
    window_mode: WindowMode,
    gauge_mode: GaugeMode,
    dir: &Path,
) -> Result<()> {
    let records = fetch_once(source).await?;
    write_export_artifacts(&records, window_mode, gauge_mode, dir)?;
    println!("Export written to {}", dir.display());
    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
