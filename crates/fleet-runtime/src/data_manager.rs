//! TTL-cached data manager for the fleet runtime.
//!
//! Wraps the fetch-and-load pipeline with a configurable time-to-live cache
//! and a single transparent retry. Callers use [`DataManager::get_data`] to
//! obtain a fresh-or-cached record set; on fetch failure the previous cache
//! is served stale and the error is retained for the UI banner.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use fleet_core::models::TelemetryRecord;
use fleet_data::loader::load_records;

use crate::fetch::{SheetFetcher, SheetSource};

// ── Defaults ──────────────────────────────────────────────────────────────────

/// Default cache TTL in seconds (the sheet itself is republished roughly
/// every 15 minutes, so fetching more often buys nothing).
pub const DEFAULT_CACHE_TTL_SECS: u64 = 900;

/// Total fetch attempts per refresh: the first try plus exactly one retry.
const MAX_FETCH_ATTEMPTS: u32 = 2;

/// Pause before the retry attempt.
const RETRY_BACKOFF_MS: u64 = 200;

// ── DataManager ───────────────────────────────────────────────────────────────

/// TTL-cached wrapper around fetch-and-normalize.
///
/// Only the normalized record set is cached; aggregates are rebuilt per
/// query by the snapshot pipeline.
pub struct DataManager {
    source: SheetSource,
    fetcher: SheetFetcher,
    /// Maximum age of cached records before they are considered stale.
    cache_ttl: Duration,
    /// Most recently loaded record set, shared with consumers.
    cache: Option<Arc<Vec<TelemetryRecord>>>,
    /// When the cache was last populated.
    cache_timestamp: Option<Instant>,
    /// Human-readable description of the last fetch error.
    last_error: Option<String>,
}

impl DataManager {
    pub fn new(source: SheetSource, cache_ttl_secs: u64) -> fleet_core::error::Result<Self> {
        Ok(Self {
            source,
            fetcher: SheetFetcher::new()?,
            cache_ttl: Duration::from_secs(cache_ttl_secs),
            cache: None,
            cache_timestamp: None,
            last_error: None,
        })
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Return the record set, using the cache when it is still valid.
    ///
    /// When `force_refresh` is `true` the cache is bypassed and a fresh
    /// fetch is always attempted. On failure the previous cache (if any) is
    /// returned as a best-effort fallback and [`last_error`] is set.
    ///
    /// [`last_error`]: DataManager::last_error
    pub fn get_data(&mut self, force_refresh: bool) -> Option<Arc<Vec<TelemetryRecord>>> {
        if !force_refresh && self.is_cache_valid() {
            tracing::debug!("returning cached record set");
            return self.cache.clone();
        }

        match self.fetch_with_retry() {
            Ok(records) => {
                tracing::debug!(records = records.len(), "record cache updated");
                let shared = Arc::new(records);
                self.cache = Some(Arc::clone(&shared));
                self.cache_timestamp = Some(Instant::now());
                self.last_error = None;
                Some(shared)
            }
            Err(e) => {
                tracing::warn!(error = %e, "fetch failed; serving cached records");
                self.last_error = Some(e);
                // Whatever we have, even if stale.
                self.cache.clone()
            }
        }
    }

    /// Discard the current cache, forcing the next [`DataManager::get_data`]
    /// call to fetch.
    pub fn invalidate_cache(&mut self) {
        self.cache = None;
        self.cache_timestamp = None;
        tracing::debug!("cache invalidated");
    }

    /// Age of the current cache entry, or `None` before the first fetch.
    pub fn cache_age(&self) -> Option<Duration> {
        self.cache_timestamp.map(|ts| ts.elapsed())
    }

    /// Human-readable description of the last fetch error, or `None`.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    // ── Private helpers ───────────────────────────────────────────────────

    /// `true` when the cache holds records still within their TTL.
    fn is_cache_valid(&self) -> bool {
        match (self.cache.as_ref(), self.cache_timestamp) {
            (Some(_), Some(ts)) => ts.elapsed() < self.cache_ttl,
            _ => false,
        }
    }

    /// Attempt the fetch, retrying once after a short pause.
    fn fetch_with_retry(&mut self) -> Result<Vec<TelemetryRecord>, String> {
        let mut last_err = String::new();

        for attempt in 0..MAX_FETCH_ATTEMPTS {
            if attempt > 0 {
                tracing::debug!(attempt, "retrying fetch after back-off");
                thread::sleep(Duration::from_millis(RETRY_BACKOFF_MS));
            }

            match self.fetch_fresh() {
                Ok(records) => return Ok(records),
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "fetch attempt failed");
                    last_err = e;
                }
            }
        }

        Err(last_err)
    }

    /// One fetch-and-normalize pass against the configured source.
    fn fetch_fresh(&self) -> Result<Vec<TelemetryRecord>, String> {
        let csv_text = self
            .fetcher
            .fetch_csv(&self.source)
            .map_err(|e| e.to_string())?;
        let (records, _report) = load_records(&csv_text).map_err(|e| e.to_string())?;
        Ok(records)
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

    fn write_sheet(dir: &TempDir, rows: &[&str]) -> PathBuf {
        let path = dir.path().join("fleet.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "{HEADER}").unwrap();
        for row in rows {
            writeln!(file, "{row}").unwrap();
        }
        path
    }

    fn make_manager(dir: &TempDir, ttl_secs: u64) -> DataManager {
        let path = write_sheet(
            dir,
            &["1,480,15/03/2024,ORION-52,G-01,100,10,50,\"0,25\",76,24,482"],
        );
        DataManager::new(SheetSource::File(path), ttl_secs).unwrap()
    }

    #[test]
    fn test_cache_miss_on_first_call() {
        let dir = TempDir::new().unwrap();
        let mgr = make_manager(&dir, 900);

        assert!(!mgr.is_cache_valid());
        assert!(mgr.cache_age().is_none());
        assert!(mgr.last_error().is_none());
    }

    #[test]
    fn test_get_data_populates_cache() {
        let dir = TempDir::new().unwrap();
        let mut mgr = make_manager(&dir, 900);

        let records = mgr.get_data(false).expect("records loaded");
        assert_eq!(records.len(), 1);
        assert!(mgr.is_cache_valid());
        assert!(mgr.last_error().is_none());
    }

    #[test]
    fn test_cache_reused_within_ttl() {
        let dir = TempDir::new().unwrap();
        let mut mgr = make_manager(&dir, 900);

        let first = mgr.get_data(false).unwrap();
        let second = mgr.get_data(false).unwrap();
        // Same shared allocation, not a refetch.
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_ttl_zero_always_refetches() {
        let dir = TempDir::new().unwrap();
        let mut mgr = make_manager(&dir, 0);

        let first = mgr.get_data(false).unwrap();
        let second = mgr.get_data(false).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_force_refresh_bypasses_cache() {
        let dir = TempDir::new().unwrap();
        let mut mgr = make_manager(&dir, 900);

        let first = mgr.get_data(false).unwrap();
        let second = mgr.get_data(true).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_invalidate_cache() {
        let dir = TempDir::new().unwrap();
        let mut mgr = make_manager(&dir, 900);

        mgr.get_data(false);
        assert!(mgr.cache_age().is_some());

        mgr.invalidate_cache();
        assert!(mgr.cache_age().is_none());
        assert!(!mgr.is_cache_valid());
    }

    #[test]
    fn test_stale_cache_served_on_fetch_failure() {
        let dir = TempDir::new().unwrap();
        let path = write_sheet(
            &dir,
            &["1,480,15/03/2024,ORION-52,G-01,100,10,50,\"0,25\",76,24,482"],
        );
        let mut mgr = DataManager::new(SheetSource::File(path.clone()), 0).unwrap();

        let first = mgr.get_data(false).expect("initial load");
        assert_eq!(first.len(), 1);

        // Break the source; the stale cache must still be served.
        std::fs::remove_file(&path).unwrap();
        let fallback = mgr.get_data(false).expect("stale fallback");
        assert_eq!(fallback.len(), 1);
        assert!(mgr.last_error().is_some());
    }

    #[test]
    fn test_no_cache_and_failure_returns_none() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.csv");
        let mut mgr = DataManager::new(SheetSource::File(missing), 900).unwrap();

        assert!(mgr.get_data(false).is_none());
        assert!(mgr.last_error().is_some());
    }

    #[test]
    fn test_error_cleared_after_successful_refetch() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("late.csv");
        let mut mgr = DataManager::new(SheetSource::File(missing.clone()), 0).unwrap();

        assert!(mgr.get_data(false).is_none());
        assert!(mgr.last_error().is_some());

        // Source appears; the next refresh succeeds and clears the error.
        let mut file = std::fs::File::create(&missing).unwrap();
        writeln!(file, "{HEADER}").unwrap();
        writeln!(
            file,
            "1,480,15/03/2024,ORION-52,G-01,100,10,50,\"0,25\",76,24,482"
        )
        .unwrap();

        assert!(mgr.get_data(false).is_some());
        assert!(mgr.last_error().is_none());
    }
}
