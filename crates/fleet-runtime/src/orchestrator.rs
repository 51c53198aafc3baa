//! Async dashboard orchestrator.
//!
//! Coordinates the [`DataManager`] in a tokio task, sending periodic
//! [`DashboardTick`]s through an `mpsc` channel so the TUI event loop can
//! consume them without any shared mutable state. The blocking fetch runs on
//! the blocking thread pool; the async side only schedules and forwards.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use fleet_core::models::TelemetryRecord;
use tokio::sync::mpsc;
use tokio::time;

use crate::data_manager::DataManager;
use crate::fetch::SheetSource;

// ── Public types ──────────────────────────────────────────────────────────────

/// A single refresh result forwarded to the TUI layer.
///
/// This is the primary data contract between the background runtime and the
/// presentation layer. The record set is shared, never copied per tick; the
/// UI rebuilds its snapshot from it with whatever modes are active.
#[derive(Debug, Clone)]
pub struct DashboardTick {
    /// Normalized telemetry records (possibly stale on fetch failure).
    pub records: Arc<Vec<TelemetryRecord>>,
    /// Error from the last load cycle, for the banner. `None` on success.
    pub fetch_error: Option<String>,
}

// ── DashboardOrchestrator ─────────────────────────────────────────────────────

/// Background refresh coordinator.
///
/// Call [`DashboardOrchestrator::start`] to spin up the refresh loop in a
/// dedicated tokio task and receive a channel endpoint for
/// [`DashboardTick`] updates.
pub struct DashboardOrchestrator {
    /// How often to refresh the record set.
    refresh_interval: Duration,
    /// Where the sheet comes from.
    source: SheetSource,
    /// TTL forwarded to the data manager.
    cache_ttl_secs: u64,
}

impl DashboardOrchestrator {
    pub fn new(refresh_interval_secs: u64, source: SheetSource, cache_ttl_secs: u64) -> Self {
        Self {
            refresh_interval: Duration::from_secs(refresh_interval_secs),
            source,
            cache_ttl_secs,
        }
    }

    /// Start the refresh loop.
    ///
    /// Spawns a tokio task that runs the loop. Returns:
    /// - An `mpsc::Receiver<DashboardTick>` for the caller to poll.
    /// - An [`OrchestratorHandle`] for force-refresh requests and abort.
    pub fn start(self) -> (mpsc::Receiver<DashboardTick>, OrchestratorHandle) {
        // Buffer a modest number of ticks so a slow consumer doesn't stall
        // the loop.
        let (tx, rx) = mpsc::channel(16);
        let (refresh_tx, refresh_rx) = mpsc::channel(4);

        let handle = tokio::spawn(async move {
            self.refresh_loop(tx, refresh_rx).await;
        });

        (rx, OrchestratorHandle { handle, refresh_tx })
    }

    // ── Private implementation ────────────────────────────────────────────

    /// The main refresh loop.
    ///
    /// Performs an immediate fetch on startup, then repeats on the interval
    /// or whenever a force-refresh request arrives. Exits when either
    /// channel peer goes away.
    async fn refresh_loop(
        self,
        tx: mpsc::Sender<DashboardTick>,
        mut refresh_rx: mpsc::Receiver<()>,
    ) {
        // Built lazily on the blocking pool: the HTTP client must not be
        // constructed inside the async context.
        let manager: Arc<Mutex<Option<DataManager>>> = Arc::new(Mutex::new(None));

        // Initial fetch (forced, to populate immediately).
        self.fetch_and_send(&manager, &tx, true).await;

        let mut interval = time::interval(self.refresh_interval);
        // Consume the first tick which fires immediately; we already fetched.
        interval.tick().await;

        loop {
            let force = tokio::select! {
                _ = interval.tick() => false,
                request = refresh_rx.recv() => match request {
                    Some(()) => true,
                    // All handles dropped: the app is shutting down.
                    None => break,
                },
            };

            if tx.is_closed() {
                tracing::debug!("dashboard channel closed; exiting refresh loop");
                break;
            }

            self.fetch_and_send(&manager, &tx, force).await;
        }
    }

    /// Run one fetch on the blocking pool and forward the tick.
    async fn fetch_and_send(
        &self,
        manager: &Arc<Mutex<Option<DataManager>>>,
        tx: &mpsc::Sender<DashboardTick>,
        force: bool,
    ) {
        let manager = Arc::clone(manager);
        let source = self.source.clone();
        let cache_ttl_secs = self.cache_ttl_secs;

        let outcome = tokio::task::spawn_blocking(move || {
            let mut guard = lock_manager(&manager);

            if guard.is_none() {
                match DataManager::new(source, cache_ttl_secs) {
                    Ok(mgr) => *guard = Some(mgr),
                    Err(e) => return (None, Some(e.to_string())),
                }
            }

            match guard.as_mut() {
                Some(mgr) => {
                    let records = mgr.get_data(force);
                    let error = mgr.last_error().map(str::to_string);
                    (records, error)
                }
                None => (None, Some("data manager unavailable".to_string())),
            }
        })
        .await;

        match outcome {
            Ok((records, fetch_error)) => {
                let tick = DashboardTick {
                    records: records.unwrap_or_else(|| Arc::new(Vec::new())),
                    fetch_error,
                };
                if let Err(e) = tx.send(tick).await {
                    tracing::warn!(error = %e, "failed to send dashboard tick; receiver dropped");
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "refresh task failed");
            }
        }
    }
}

/// Lock the manager slot, recovering from a poisoned mutex.
fn lock_manager(manager: &Mutex<Option<DataManager>>) -> MutexGuard<'_, Option<DataManager>> {
    match manager.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

// ── OrchestratorHandle ────────────────────────────────────────────────────────

/// A handle to the background refresh task.
pub struct OrchestratorHandle {
    handle: tokio::task::JoinHandle<()>,
    refresh_tx: mpsc::Sender<()>,
}

impl OrchestratorHandle {
    /// Ask the loop for an out-of-band forced refresh (dashboard `r` key).
    /// Non-blocking; a full request queue means one is already pending.
    pub fn request_refresh(&self) {
        let _ = self.refresh_tx.try_send(());
    }

    /// Immediately abort the refresh loop.
    pub fn abort(&self) {
        self.handle.abort();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const HEADER: &str = "REGISTRO CORRECTO,POTENCIA ACTIVA (KW),FECHA DEL REGISTRO,LOCACIÓN,GENERADOR,TOTAL GENERADO KW-H,CONSUMO (GLS),COSTOS DE GENERACIÓN USD,VALOR POR KW GENERADO,%CARGA PRIME,HORAS DE OPERACIÓN,VOLTAJE (V)";

    fn write_sheet(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("fleet.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "{HEADER}").unwrap();
        writeln!(
            file,
            "1,480,15/03/2024,ORION-52,G-01,100,10,50,\"0,25\",76,24,482"
        )
        .unwrap();
        path
    }

    #[test]
    fn test_orchestrator_creation() {
        let orch = DashboardOrchestrator::new(
            60,
            SheetSource::File(PathBuf::from("/tmp/fleet.csv")),
            900,
        );
        assert_eq!(orch.refresh_interval, Duration::from_secs(60));
        assert_eq!(orch.cache_ttl_secs, 900);
    }

    #[tokio::test]
    async fn test_orchestrator_sends_initial_tick() {
        let dir = TempDir::new().unwrap();
        let path = write_sheet(&dir);

        let orch = DashboardOrchestrator::new(60, SheetSource::File(path), 900);
        let (mut rx, handle) = orch.start();

        let tick = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for tick")
            .expect("channel closed before first tick");

        assert_eq!(tick.records.len(), 1);
        assert!(tick.fetch_error.is_none());

        handle.abort();
    }

    #[tokio::test]
    async fn test_orchestrator_reports_fetch_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.csv");

        let orch = DashboardOrchestrator::new(60, SheetSource::File(missing), 900);
        let (mut rx, handle) = orch.start();

        let tick = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for tick")
            .expect("channel closed before first tick");

        assert!(tick.records.is_empty());
        assert!(tick.fetch_error.is_some());

        handle.abort();
    }

    #[tokio::test]
    async fn test_request_refresh_produces_tick() {
        let dir = TempDir::new().unwrap();
        let path = write_sheet(&dir);

        // Long interval: the second tick can only come from the request.
        let orch = DashboardOrchestrator::new(3600, SheetSource::File(path), 900);
        let (mut rx, handle) = orch.start();

        // Initial tick.
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out")
            .expect("closed");

        handle.request_refresh();

        let tick = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for forced tick")
            .expect("channel closed");
        assert_eq!(tick.records.len(), 1);

        handle.abort();
    }

    #[tokio::test]
    async fn test_orchestrator_start_and_abort() {
        let dir = TempDir::new().unwrap();
        let path = write_sheet(&dir);

        let orch = DashboardOrchestrator::new(60, SheetSource::File(path), 900);
        let (_rx, handle) = orch.start();

        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.abort();
    }
}
