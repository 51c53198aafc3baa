//! Snapshot pipeline: everything the dashboard and exports consume, built
//! from scratch on every query.

use chrono::{NaiveDate, Utc};
use fleet_core::models::{AggOp, GaugeMode, Metric, TelemetryRecord, WindowMode};

use crate::aggregator::{
    aggregate, daily_series, gauge_value, period_delta, summary_table, DailyPoint, SummaryRow,
};
use crate::window::ReportWindow;

// ── Public types ──────────────────────────────────────────────────────────────

/// The four headline KPIs, computed over some record set.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct KpiSet {
    /// Total generated energy (kWh, sum).
    pub energy_kwh: Option<f64>,
    /// Total fuel consumed (gal, sum).
    pub fuel_gal: Option<f64>,
    /// Total generation cost (USD, sum).
    pub cost_usd: Option<f64>,
    /// Mean cost per generated kWh (USD).
    pub cost_per_kwh: Option<f64>,
}

/// Period-over-period deltas for the windowed KPIs, in percent.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct KpiDeltas {
    pub energy_kwh: Option<f64>,
    pub fuel_gal: Option<f64>,
    pub cost_usd: Option<f64>,
    pub cost_per_kwh: Option<f64>,
}

/// One renderable load gauge.
#[derive(Debug, Clone, PartialEq)]
pub struct GaugeReading {
    pub location: String,
    pub generator_id: String,
    /// Always positive; pairs with nothing to show are omitted upstream.
    pub load_percent: f64,
}

/// Metadata produced alongside the snapshot.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SnapshotMetadata {
    /// ISO-8601 timestamp when this snapshot was generated.
    pub generated_at: String,
    /// Records in the full history.
    pub records_total: usize,
    /// Records inside the selected window.
    pub records_in_window: usize,
    /// Inclusive window bounds; `None` when there is no data at all.
    pub window_start: Option<NaiveDate>,
    pub window_end: Option<NaiveDate>,
    /// Wall-clock seconds spent building the snapshot.
    pub build_time_seconds: f64,
}

/// The complete output of [`build_snapshot`].
#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    pub window_mode: WindowMode,
    pub gauge_mode: GaugeMode,
    /// KPIs over the entire history.
    pub historical: KpiSet,
    /// KPIs over the selected window.
    pub windowed: KpiSet,
    /// Windowed KPIs vs the preceding window.
    pub deltas: KpiDeltas,
    /// Daily energy inside the window, per location.
    pub daily_energy_by_location: Vec<DailyPoint>,
    /// Daily energy inside the window, all locations combined.
    pub daily_energy_total: Vec<DailyPoint>,
    /// Daily fuel consumption inside the window, all locations combined.
    pub daily_fuel_total: Vec<DailyPoint>,
    /// Per-(location, generator) summary over the window.
    pub summary: Vec<SummaryRow>,
    /// One gauge per pair that has something to show.
    pub gauges: Vec<GaugeReading>,
    pub metadata: SnapshotMetadata,
}

// ── Public function ───────────────────────────────────────────────────────────

/// Build the full dashboard snapshot for one (window, gauge) mode pair.
///
/// 1. Anchor the reporting window on the latest reading.
/// 2. Compute historical KPIs over all records.
/// 3. Compute windowed KPIs and deltas against the preceding window.
/// 4. Build the daily series, summary table and gauges from the window.
///
/// The modes arrive as explicit parameters; a mode change is just another
/// call with the same record set.
pub fn build_snapshot(
    records: &[TelemetryRecord],
    window_mode: WindowMode,
    gauge_mode: GaugeMode,
) -> DashboardSnapshot {
    let build_start = std::time::Instant::now();

    let window = ReportWindow::for_mode(records, window_mode);
    let in_window: Vec<TelemetryRecord> = match &window {
        Some(w) => w.filter(records),
        None => Vec::new(),
    };
    let in_preceding: Vec<TelemetryRecord> = window
        .as_ref()
        .and_then(|w| w.preceding())
        .map(|p| p.filter(records))
        .unwrap_or_default();

    let historical = kpi_set(records);
    let windowed = kpi_set(&in_window);
    let previous = kpi_set(&in_preceding);

    let deltas = KpiDeltas {
        energy_kwh: period_delta(windowed.energy_kwh, previous.energy_kwh),
        fuel_gal: period_delta(windowed.fuel_gal, previous.fuel_gal),
        cost_usd: period_delta(windowed.cost_usd, previous.cost_usd),
        cost_per_kwh: period_delta(windowed.cost_per_kwh, previous.cost_per_kwh),
    };

    let summary = summary_table(&in_window);
    let gauges = summary
        .iter()
        .filter_map(|row| {
            gauge_value(&in_window, &row.location, &row.generator_id, gauge_mode).map(|v| {
                GaugeReading {
                    location: row.location.clone(),
                    generator_id: row.generator_id.clone(),
                    load_percent: v,
                }
            })
        })
        .collect();

    let metadata = SnapshotMetadata {
        generated_at: Utc::now().to_rfc3339(),
        records_total: records.len(),
        records_in_window: in_window.len(),
        window_start: window.as_ref().map(|w| w.start),
        window_end: window.as_ref().map(|w| w.end),
        build_time_seconds: build_start.elapsed().as_secs_f64(),
    };

    DashboardSnapshot {
        window_mode,
        gauge_mode,
        historical,
        windowed,
        deltas,
        daily_energy_by_location: daily_series(
            &in_window,
            Metric::EnergyGenerated,
            AggOp::Sum,
            true,
        ),
        daily_energy_total: daily_series(&in_window, Metric::EnergyGenerated, AggOp::Sum, false),
        daily_fuel_total: daily_series(&in_window, Metric::FuelConsumed, AggOp::Sum, false),
        summary,
        gauges,
        metadata,
    }
}

// ── Private helpers ───────────────────────────────────────────────────────────

fn kpi_set(records: &[TelemetryRecord]) -> KpiSet {
    KpiSet {
        energy_kwh: aggregate(records, Metric::EnergyGenerated, AggOp::Sum),
        fuel_gal: aggregate(records, Metric::FuelConsumed, AggOp::Sum),
        cost_usd: aggregate(records, Metric::GenerationCost, AggOp::Sum),
        cost_per_kwh: aggregate(records, Metric::CostPerKwh, AggOp::Mean),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
