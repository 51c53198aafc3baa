use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by Fleet Monitor.
#[derive(Error, Debug)]
pub enum FleetError {
    /// A required sheet column is absent. Fatal: the dashboard cannot render
    /// without the full column contract.
    #[error("Required column missing from source sheet: {0}")]
    MissingColumn(String),

    /// The telemetry source could not be reached or refused the request.
    /// Fatal for the current load cycle; retried once before surfacing.
    #[error("Failed to fetch telemetry source {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV payload could not be parsed at all (structure, not cells).
    #[error("Failed to parse CSV: {0}")]
    CsvParse(#[from] csv::Error),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An error originating from the terminal / TUI layer.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the fleet crates.
pub type Result<T> = std::result::Result<T, FleetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_missing_column() {
        let err = FleetError::MissingColumn("POTENCIA ACTIVA (KW)".to_string());
        assert_eq!(
            err.to_string(),
            "Required column missing from source sheet: POTENCIA ACTIVA (KW)"
        );
    }

    #[test]
    fn test_error_display_fetch() {
        let err = FleetError::Fetch {
            url: "https://example.com/export".to_string(),
            reason: "connection refused".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("https://example.com/export"));
        assert!(msg.contains("connection refused"));
    }

    #[test]
    fn test_error_display_file_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = FleetError::FileRead {
            path: PathBuf::from("/some/fleet.csv"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read file"));
        assert!(msg.contains("/some/fleet.csv"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_error_display_config() {
        let err = FleetError::Config("no telemetry source configured".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: no telemetry source configured"
        );
    }

    #[test]
    fn test_error_display_terminal() {
        let err = FleetError::Terminal("crossterm failure".to_string());
        assert_eq!(err.to_string(), "Terminal error: crossterm failure");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: FleetError = io_err.into();
        assert!(err.to_string().contains("denied"));
    }
}
