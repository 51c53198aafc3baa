//! Headless export artifacts: filtered rows as CSV, the summary table as
//! CSV, and a plain-text report with a markdown-style table.
//!
//! Everything here is pure formatting over an already-built snapshot or
//! record set; no new aggregation happens at export time.

use std::path::Path;

use fleet_core::error::Result;
use fleet_core::formatting::{format_delta, format_metric, MISSING};
use fleet_core::models::{Metric, TelemetryRecord, WindowMode};
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};
use tracing::info;

use crate::aggregator::SummaryRow;
use crate::analysis::{DashboardSnapshot, KpiSet};

// ── Row CSV ───────────────────────────────────────────────────────────────────

/// Write the normalized telemetry records as CSV.
pub fn write_rows_csv(path: &Path, records: &[TelemetryRecord]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    info!("wrote {} rows to {}", records.len(), path.display());
    Ok(())
}

// ── Summary CSV / table ───────────────────────────────────────────────────────

/// Display row for the summary table, pre-formatted for humans.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct SummaryExportRow {
    #[tabled(rename = "Location")]
    #[serde(rename = "location")]
    pub location: String,
    #[tabled(rename = "Generator")]
    #[serde(rename = "generator")]
    pub generator: String,
    #[tabled(rename = "Hours")]
    #[serde(rename = "operating_hours")]
    pub operating_hours: String,
    #[tabled(rename = "Energy (kWh)")]
    #[serde(rename = "energy_kwh")]
    pub energy_kwh: String,
    #[tabled(rename = "Fuel (gal)")]
    #[serde(rename = "fuel_gal")]
    pub fuel_gal: String,
    #[tabled(rename = "Load (%)")]
    #[serde(rename = "load_percent")]
    pub load_percent: String,
    #[tabled(rename = "Cost/kWh")]
    #[serde(rename = "cost_per_kwh")]
    pub cost_per_kwh: String,
}

impl From<&SummaryRow> for SummaryExportRow {
    fn from(row: &SummaryRow) -> Self {
        SummaryExportRow {
            location: row.location.clone(),
            generator: row.generator_id.clone(),
            operating_hours: format_metric(Some(row.operating_hours), false, 2),
            energy_kwh: format_metric(Some(row.energy_kwh), false, 0),
            fuel_gal: format_metric(Some(row.fuel_gal), false, 2),
            load_percent: format_metric(row.load_percent, false, 2),
            cost_per_kwh: format_metric(row.cost_per_kwh, true, 3),
        }
    }
}

/// Write the per-generator summary (plus a totals row) as CSV.
pub fn write_summary_csv(path: &Path, rows: &[SummaryRow]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for row in rows {
        wtr.serialize(SummaryExportRow::from(row))?;
    }
    wtr.serialize(totals_row(rows))?;
    wtr.flush()?;
    info!("wrote summary ({} generators) to {}", rows.len(), path.display());
    Ok(())
}

// ── Text report ───────────────────────────────────────────────────────────────

/// Write the full text report: KPI blocks followed by the summary table
/// rendered markdown-style.
pub fn write_text_report(path: &Path, snapshot: &DashboardSnapshot) -> Result<()> {
    let mut out = String::new();

    out.push_str("FLEET GENERATION REPORT\n");
    out.push_str(&format!("Generated: {}\n", snapshot.metadata.generated_at));
    out.push_str(&format!(
        "Window: {} ({} records of {})\n\n",
        window_label(snapshot),
        snapshot.metadata.records_in_window,
        snapshot.metadata.records_total,
    ));

    out.push_str("Historical totals\n");
    push_kpi_block(&mut out, &snapshot.historical, None);

    out.push_str("\nSelected window (vs preceding period)\n");
    push_kpi_block(&mut out, &snapshot.windowed, Some(snapshot));

    out.push_str("\nSummary by generator\n");
    if snapshot.summary.is_empty() {
        out.push_str("(no rows)\n");
    } else {
        let mut rows: Vec<SummaryExportRow> =
            snapshot.summary.iter().map(SummaryExportRow::from).collect();
        rows.push(totals_row(&snapshot.summary));
        let table = Table::new(rows).with(Style::markdown()).to_string();
        out.push_str(&table);
        out.push('\n');
    }

    std::fs::write(path, out)?;
    info!("wrote text report to {}", path.display());
    Ok(())
}

// ── Private helpers ───────────────────────────────────────────────────────────

fn window_label(snapshot: &DashboardSnapshot) -> String {
    let mode = match snapshot.window_mode {
        WindowMode::TrailingWeek => "trailing week",
        WindowMode::LatestOnly => "latest day",
    };
    match (snapshot.metadata.window_start, snapshot.metadata.window_end) {
        (Some(start), Some(end)) => format!("{mode}, {start} to {end}"),
        _ => format!("{mode}, no data"),
    }
}

fn push_kpi_block(out: &mut String, kpis: &KpiSet, deltas_from: Option<&DashboardSnapshot>) {
    let lines = [
        (Metric::EnergyGenerated, kpis.energy_kwh),
        (Metric::FuelConsumed, kpis.fuel_gal),
        (Metric::GenerationCost, kpis.cost_usd),
        (Metric::CostPerKwh, kpis.cost_per_kwh),
    ];
    for (metric, value) in lines {
        let formatted = format_metric(value, metric.is_currency(), metric.decimals());
        match deltas_from {
            Some(snap) => {
                let delta = match metric {
                    Metric::EnergyGenerated => snap.deltas.energy_kwh,
                    Metric::FuelConsumed => snap.deltas.fuel_gal,
                    Metric::GenerationCost => snap.deltas.cost_usd,
                    _ => snap.deltas.cost_per_kwh,
                };
                out.push_str(&format!(
                    "  {}: {}  ({})\n",
                    metric.label(),
                    formatted,
                    format_delta(delta)
                ));
            }
            None => out.push_str(&format!("  {}: {}\n", metric.label(), formatted)),
        }
    }
}

/// Totals row for the summary exports: sums for the summed columns, the
/// averaged columns stay blank.
fn totals_row(rows: &[SummaryRow]) -> SummaryExportRow {
    let hours: f64 = rows.iter().map(|r| r.operating_hours).sum();
    let energy: f64 = rows.iter().map(|r| r.energy_kwh).sum();
    let fuel: f64 = rows.iter().map(|r| r.fuel_gal).sum();
    SummaryExportRow {
        location: "TOTAL".to_string(),
        generator: String::new(),
        operating_hours: format_metric(Some(hours), false, 2),
        energy_kwh: format_metric(Some(energy), false, 0),
        fuel_gal: format_metric(Some(fuel), false, 2),
        load_percent: MISSING.to_string(),
        cost_per_kwh: MISSING.to_string(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::build_snapshot;
    use chrono::NaiveDateTime;
    use fleet_core::models::GaugeMode;
    use tempfile::TempDir;

    fn make_record(ts: &str, location: &str, generator: &str, energy: f64) -> TelemetryRecord {
        TelemetryRecord {
            timestamp: NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S").unwrap(),
            location: location.to_string(),
            generator_id: generator.to_string(),
            active_power_kw: 480.0,
            energy_kwh: Some(energy),
            fuel_gal: Some(10.0),
            cost_usd: Some(50.0),
            cost_per_kwh: Some(0.25),
            load_percent: Some(76.0),
            operating_hours: Some(24.0),
            voltage: Some(482.0),
        }
    }

    fn sample_records() -> Vec<TelemetryRecord> {
        vec![
            make_record("2024-03-14 08:00:00", "ORION-52", "G-01", 100.0),
            make_record("2024-03-15 08:00:00", "ORION-52", "G-02", 200.0),
        ]
    }

    #[test]
    fn test_write_rows_csv() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rows.csv");
        write_rows_csv(&path, &sample_records()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        let header = lines.next().unwrap();
        assert!(header.contains("location"));
        assert!(header.contains("energy_kwh"));
        assert_eq!(lines.count(), 2);
    }

    #[test]
    fn test_write_summary_csv_has_totals_row() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("summary.csv");
        let rows = crate::aggregator::summary_table(&sample_records());
        write_summary_csv(&path, &rows).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        // Header + 2 generators + totals.
        assert_eq!(content.lines().count(), 4);
        assert!(content.lines().last().unwrap().starts_with("TOTAL"));
        assert!(content.contains("ORION-52"));
    }

    #[test]
    fn test_write_text_report_sections() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.txt");
        let snapshot = build_snapshot(
            &sample_records(),
            WindowMode::TrailingWeek,
            GaugeMode::Latest,
        );
        write_text_report(&path, &snapshot).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("FLEET GENERATION REPORT"));
        assert!(content.contains("Historical totals"));
        assert!(content.contains("Energy Generated (kWh): 300"));
        assert!(content.contains("Summary by generator"));
        // Markdown-style table border from tabled.
        assert!(content.contains("| Location"));
        assert!(content.contains("TOTAL"));
    }

    #[test]
    fn test_write_text_report_empty_snapshot() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.txt");
        let snapshot = build_snapshot(&[], WindowMode::TrailingWeek, GaugeMode::Latest);
        write_text_report(&path, &snapshot).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("no data"));
        assert!(content.contains("(no rows)"));
    }
}
