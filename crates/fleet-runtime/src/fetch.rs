//! Telemetry sheet retrieval.

use std::path::PathBuf;
use std::time::Duration;

use fleet_core::error::{FleetError, Result};
use reqwest::blocking::Client;

/// Network timeout for one fetch attempt. Failures surface as errors,
/// never as a hanging dashboard.
pub const FETCH_TIMEOUT_SECS: u64 = 10;

// ── SheetSource ───────────────────────────────────────────────────────────────

/// Where the telemetry CSV comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetSource {
    /// Public spreadsheet CSV export URL.
    ExportUrl(String),
    /// Authenticated read API returning CSV; the token goes in a bearer
    /// header.
    Api { url: String, token: String },
    /// Local CSV file.
    File(PathBuf),
}

impl SheetSource {
    /// Build the public CSV export URL for a spreadsheet id and worksheet gid.
    pub fn export_url(sheet_id: &str, gid: u64) -> Self {
        SheetSource::ExportUrl(format!(
            "https://docs.google.com/spreadsheets/d/{sheet_id}/export?format=csv&gid={gid}"
        ))
    }

    /// Short description for logs and error banners. Never includes the
    /// token.
    pub fn describe(&self) -> String {
        match self {
            SheetSource::ExportUrl(url) => url.clone(),
            SheetSource::Api { url, .. } => url.clone(),
            SheetSource::File(path) => path.display().to_string(),
        }
    }
}

// ── SheetFetcher ──────────────────────────────────────────────────────────────

/// Blocking HTTP client wrapper with the bounded fetch timeout baked in.
pub struct SheetFetcher {
    client: Client,
}

impl SheetFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .build()
            .map_err(|e| FleetError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Retrieve the raw CSV text from a source. One attempt; the retry
    /// policy lives in the data manager.
    pub fn fetch_csv(&self, source: &SheetSource) -> Result<String> {
        match source {
            SheetSource::File(path) => {
                std::fs::read_to_string(path).map_err(|e| FleetError::FileRead {
                    path: path.clone(),
                    source: e,
                })
            }
            SheetSource::ExportUrl(url) => self.get(url, None),
            SheetSource::Api { url, token } => self.get(url, Some(token)),
        }
    }

    fn get(&self, url: &str, bearer: Option<&str>) -> Result<String> {
        let mut request = self.client.get(url);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let fetch_err = |reason: String| FleetError::Fetch {
            url: url.to_string(),
            reason,
        };

        let response = request.send().map_err(|e| fetch_err(e.to_string()))?;
        let response = response
            .error_for_status()
            .map_err(|e| fetch_err(e.to_string()))?;
        response.text().map_err(|e| fetch_err(e.to_string()))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
