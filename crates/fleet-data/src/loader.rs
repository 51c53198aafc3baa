//! CSV row normalization into typed telemetry records.

use csv::ReaderBuilder;
use fleet_core::error::Result;
use fleet_core::models::TelemetryRecord;
use fleet_core::numeric::{
    normalize_load_percent, parse_locale_number, parse_timestamp_dayfirst, parse_validity_flag,
};
use tracing::{debug, info, warn};

use crate::schema::{validate_headers, RawRow};

// ── LoadReport ────────────────────────────────────────────────────────────────

/// Counters describing one load pass over the sheet.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    /// Data rows seen (excluding the header).
    pub total_rows: usize,
    /// Rows that became [`TelemetryRecord`]s.
    pub kept_rows: usize,
    /// Rows dropped because the validity flag was not truthy or the active
    /// power cell was absent or unparseable.
    pub dropped_invalid: usize,
    /// Rows dropped because the timestamp cell did not parse.
    pub dropped_bad_timestamp: usize,
    /// Non-empty optional cells that failed to parse (carried as missing).
    pub cell_parse_errors: usize,
    /// Load-percent readings rejected as sensor anomalies.
    pub load_anomalies: usize,
}

// ── Public function ───────────────────────────────────────────────────────────

/// Parse a CSV payload into validated telemetry records.
///
/// The header row is checked against the column contract first; a missing
/// column is fatal. Row-level problems never are: rows failing the validity
/// invariants are dropped and counted, unparseable optional cells become
/// `None`, and the [`LoadReport`] carries the tallies.
pub fn load_records(csv_text: &str) -> Result<(Vec<TelemetryRecord>, LoadReport)> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(csv_text.as_bytes());

    validate_headers(rdr.headers()?)?;

    let mut report = LoadReport::default();
    let mut records: Vec<TelemetryRecord> = Vec::new();

    for result in rdr.deserialize::<RawRow>() {
        report.total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                debug!("skipping malformed row {}: {e}", report.total_rows);
                report.dropped_invalid += 1;
                continue;
            }
        };

        // Validity invariants: flag truthy, active power present, timestamp
        // parseable. Anything else is a soft miss.
        let valid = row.valid.as_deref().is_some_and(parse_validity_flag);
        if !valid {
            report.dropped_invalid += 1;
            continue;
        }

        let Some(active_power_kw) = row.active_power_kw.as_deref().and_then(parse_locale_number)
        else {
            report.dropped_invalid += 1;
            continue;
        };

        let Some(timestamp) = row.timestamp.as_deref().and_then(parse_timestamp_dayfirst) else {
            report.dropped_bad_timestamp += 1;
            continue;
        };

        let location = text_cell(row.location, "Unknown");
        let generator_id = text_cell(row.generator, "Unknown");

        let energy_kwh = numeric_cell(row.energy_kwh.as_deref(), &mut report);
        let fuel_gal = numeric_cell(row.fuel_gal.as_deref(), &mut report);
        let cost_usd = numeric_cell(row.cost_usd.as_deref(), &mut report);
        let cost_per_kwh = numeric_cell(row.cost_per_kwh.as_deref(), &mut report);
        let operating_hours = numeric_cell(row.operating_hours.as_deref(), &mut report);
        let voltage = numeric_cell(row.voltage.as_deref(), &mut report);

        let load_percent = match numeric_cell(row.load_percent.as_deref(), &mut report) {
            Some(raw) => {
                let normalized = normalize_load_percent(raw);
                if normalized.is_none() {
                    report.load_anomalies += 1;
                }
                normalized
            }
            None => None,
        };

        records.push(TelemetryRecord {
            timestamp,
            location,
            generator_id,
            active_power_kw,
            energy_kwh,
            fuel_gal,
            cost_usd,
            cost_per_kwh,
            load_percent,
            operating_hours,
            voltage,
        });
        report.kept_rows += 1;
    }

    info!(
        "loaded {} of {} rows ({} invalid, {} bad timestamps, {} cell errors, {} load anomalies)",
        report.kept_rows,
        report.total_rows,
        report.dropped_invalid,
        report.dropped_bad_timestamp,
        report.cell_parse_errors,
        report.load_anomalies,
    );
    if report.load_anomalies > 0 {
        warn!(
            "{} load-percent readings exceeded the anomaly ceiling and were discarded",
            report.load_anomalies
        );
    }

    Ok((records, report))
}

// ── Private helpers ───────────────────────────────────────────────────────────

/// Trimmed text cell with a fallback for blank values.
fn text_cell(cell: Option<String>, fallback: &str) -> String {
    match cell {
        Some(s) if !s.trim().is_empty() => s.trim().to_string(),
        _ => fallback.to_string(),
    }
}

/// Parse an optional numeric cell; a non-empty cell that fails to parse is
/// counted as a cell error and carried as missing.
fn numeric_cell(cell: Option<&str>, report: &mut LoadReport) -> Option<f64> {
    let raw = cell?.trim();
    if raw.is_empty() {
        return None;
    }
    let parsed = parse_locale_number(raw);
    if parsed.is_none() {
        report.cell_parse_errors += 1;
    }
    parsed
}

// ── Tests ─────────────────────────────────────────────────────────────────────
