//! KPI aggregation, period deltas, daily series and the summary table.
//!
//! Every function here is a pure recomputation over a record slice; there is
//! no incremental state to invalidate.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Days, NaiveDate};
use fleet_core::models::{AggOp, Metric, TelemetryRecord};

// ── Scalar aggregation ────────────────────────────────────────────────────────

/// Aggregate one metric over a record set.
///
/// `Mean` over an empty or all-missing set is `None`; `Sum` over the same is
/// `Some(0.0)`. The asymmetry is deliberate: a sum of nothing is a real zero,
/// a mean of nothing is undefined.
pub fn aggregate(records: &[TelemetryRecord], metric: Metric, op: AggOp) -> Option<f64> {
    let values: Vec<f64> = records.iter().filter_map(|r| metric.value(r)).collect();
    match op {
        AggOp::Sum => Some(values.iter().sum()),
        AggOp::Mean => {
            if values.is_empty() {
                None
            } else {
                Some(values.iter().sum::<f64>() / values.len() as f64)
            }
        }
    }
}

/// Period-over-period change in percent: `(current − previous) / previous × 100`.
///
/// `None` when either side is missing or the previous value is exactly zero
/// (division would be meaningless, not infinite growth).
pub fn period_delta(current: Option<f64>, previous: Option<f64>) -> Option<f64> {
    let current = current?;
    let previous = previous?;
    if previous == 0.0 {
        return None;
    }
    Some((current - previous) / previous * 100.0)
}

// ── Daily series ──────────────────────────────────────────────────────────────

/// One point of a daily series.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyPoint {
    pub date: NaiveDate,
    /// `None` when the series is not grouped by location.
    pub location: Option<String>,
    /// `None` marks a padded gap in a mean series.
    pub value: Option<f64>,
}

/// Aggregate one metric per calendar day, optionally per location.
///
/// Points are chronologically ordered (location ascending within a date) and
/// the covered date range is dense: every date between the earliest and
/// latest reading appears for every location present. `Sum` pads absent days
/// with 0, `Mean` pads with missing.
pub fn daily_series(
    records: &[TelemetryRecord],
    metric: Metric,
    op: AggOp,
    group_by_location: bool,
) -> Vec<DailyPoint> {
    let Some(first) = records.iter().map(|r| r.date()).min() else {
        return Vec::new();
    };
    let last = records.iter().map(|r| r.date()).max().unwrap_or(first);

    // Group records by (date, location-key).
    let mut groups: BTreeMap<(NaiveDate, Option<String>), Vec<&TelemetryRecord>> = BTreeMap::new();
    let mut locations: BTreeSet<Option<String>> = BTreeSet::new();
    for record in records {
        let key = group_by_location.then(|| record.location.clone());
        locations.insert(key.clone());
        groups.entry((record.date(), key)).or_default().push(record);
    }

    let pad = match op {
        AggOp::Sum => Some(0.0),
        AggOp::Mean => None,
    };

    let mut points = Vec::new();
    let mut date = first;
    loop {
        for location in &locations {
            let value = match groups.get(&(date, location.clone())) {
                Some(group) => {
                    let owned: Vec<TelemetryRecord> =
                        group.iter().map(|r| (*r).clone()).collect();
                    aggregate(&owned, metric, op)
                }
                None => pad,
            };
            points.push(DailyPoint {
                date,
                location: location.clone(),
                value,
            });
        }
        if date == last {
            break;
        }
        date = match date.checked_add_days(Days::new(1)) {
            Some(next) => next,
            None => break,
        };
    }
    points
}

// ── Summary table ─────────────────────────────────────────────────────────────

/// One row of the per-generator summary table.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub location: String,
    pub generator_id: String,
    /// Summed operating hours.
    pub operating_hours: f64,
    /// Summed generated energy (kWh).
    pub energy_kwh: f64,
    /// Summed fuel consumption (gal).
    pub fuel_gal: f64,
    /// Mean prime load (%), missing when no reading carried one.
    pub load_percent: Option<f64>,
    /// Mean cost per kWh (USD), missing when no reading carried one.
    pub cost_per_kwh: Option<f64>,
}

/// Group records by (location, generator) and aggregate per pair.
///
/// Hours, energy and fuel are summed; load percent and cost-per-kWh are
/// averaged. Rows come out sorted by location then generator, ascending,
/// so repeated calls over the same data are byte-identical.
pub fn summary_table(records: &[TelemetryRecord]) -> Vec<SummaryRow> {
    let mut groups: BTreeMap<(String, String), Vec<TelemetryRecord>> = BTreeMap::new();
    for record in records {
        groups
            .entry((record.location.clone(), record.generator_id.clone()))
            .or_default()
            .push(record.clone());
    }

    groups
        .into_iter()
        .map(|((location, generator_id), group)| SummaryRow {
            location,
            generator_id,
            operating_hours: aggregate(&group, Metric::OperatingHours, AggOp::Sum)
                .unwrap_or_default(),
            energy_kwh: aggregate(&group, Metric::EnergyGenerated, AggOp::Sum).unwrap_or_default(),
            fuel_gal: aggregate(&group, Metric::FuelConsumed, AggOp::Sum).unwrap_or_default(),
            load_percent: aggregate(&group, Metric::LoadPercent, AggOp::Mean),
            cost_per_kwh: aggregate(&group, Metric::CostPerKwh, AggOp::Mean),
        })
        .collect()
}

// ── Gauges ────────────────────────────────────────────────────────────────────

pub use fleet_core::models::GaugeMode;

/// Select the load-gauge value for one (location, generator) pair.
///
/// `Latest` takes the chronologically last reading's load percent;
/// `Average` means over all of the pair's readings. A missing or
/// non-positive result yields `None`: there is nothing to show, and the
/// gauge is omitted rather than drawn at 0 %.
pub fn gauge_value(
    records: &[TelemetryRecord],
    location: &str,
    generator_id: &str,
    mode: GaugeMode,
) -> Option<f64> {
    let pair: Vec<TelemetryRecord> = records
        .iter()
        .filter(|r| r.location == location && r.generator_id == generator_id)
        .cloned()
        .collect();

    let value = match mode {
        GaugeMode::Latest => pair
            .iter()
            .max_by_key(|r| r.timestamp)
            .and_then(|r| r.load_percent),
        GaugeMode::Average => aggregate(&pair, Metric::LoadPercent, AggOp::Mean),
    }?;

    (value > 0.0).then_some(value)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
