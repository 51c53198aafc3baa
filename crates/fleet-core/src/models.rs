use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A single validated telemetry row from the fleet sheet.
///
/// Rows only become `TelemetryRecord`s after normalization: the source
/// validity flag was truthy, the active power cell was present, and the
/// timestamp parsed. Every other numeric field may legitimately be missing
/// and is carried as `None` rather than an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryRecord {
    /// When the reading was registered (day-first source convention).
    pub timestamp: NaiveDateTime,
    /// Site / block the generator belongs to.
    pub location: String,
    /// Generator identifier within the location.
    pub generator_id: String,
    /// Instantaneous active power in kW. Presence is a validity invariant.
    pub active_power_kw: f64,
    /// Energy generated in kWh.
    pub energy_kwh: Option<f64>,
    /// Fuel consumed in gallons.
    pub fuel_gal: Option<f64>,
    /// Generation cost in USD.
    pub cost_usd: Option<f64>,
    /// Cost per generated kWh in USD.
    pub cost_per_kwh: Option<f64>,
    /// Prime load as a percentage (0–100 scale after normalization).
    pub load_percent: Option<f64>,
    /// Accumulated operating hours.
    pub operating_hours: Option<f64>,
    /// Line voltage in volts.
    pub voltage: Option<f64>,
}

impl TelemetryRecord {
    /// Calendar date of the reading, used for windowing and daily grouping.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

// ── Metric ────────────────────────────────────────────────────────────────────

/// A numeric telemetry field that can be aggregated and displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    EnergyGenerated,
    FuelConsumed,
    GenerationCost,
    CostPerKwh,
    LoadPercent,
    OperatingHours,
    ActivePower,
    Voltage,
}

impl Metric {
    /// Extract this metric's value from a record, `None` when the cell was
    /// missing or unparseable in the source.
    pub fn value(&self, record: &TelemetryRecord) -> Option<f64> {
        match self {
            Metric::EnergyGenerated => record.energy_kwh,
            Metric::FuelConsumed => record.fuel_gal,
            Metric::GenerationCost => record.cost_usd,
            Metric::CostPerKwh => record.cost_per_kwh,
            Metric::LoadPercent => record.load_percent,
            Metric::OperatingHours => record.operating_hours,
            Metric::ActivePower => Some(record.active_power_kw),
            Metric::Voltage => record.voltage,
        }
    }

    /// Display label for cards and table headers.
    pub fn label(&self) -> &'static str {
        match self {
            Metric::EnergyGenerated => "Energy Generated (kWh)",
            Metric::FuelConsumed => "Fuel Consumed (gal)",
            Metric::GenerationCost => "Generation Cost",
            Metric::CostPerKwh => "Cost per kWh",
            Metric::LoadPercent => "Prime Load (%)",
            Metric::OperatingHours => "Operating Hours",
            Metric::ActivePower => "Active Power (kW)",
            Metric::Voltage => "Voltage (V)",
        }
    }

    /// Whether values of this metric are rendered with a currency prefix.
    pub fn is_currency(&self) -> bool {
        matches!(self, Metric::GenerationCost | Metric::CostPerKwh)
    }

    /// Decimal places used when formatting this metric.
    pub fn decimals(&self) -> u32 {
        match self {
            Metric::EnergyGenerated => 0,
            Metric::CostPerKwh => 3,
            _ => 2,
        }
    }
}

// ── AggOp ─────────────────────────────────────────────────────────────────────

/// Aggregation operator applied to a metric over a record set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggOp {
    Sum,
    Mean,
}

// ── WindowMode ────────────────────────────────────────────────────────────────

/// Which reporting window the dashboard is focused on.
///
/// Passed explicitly into every query function; there is deliberately no
/// process-wide filter state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowMode {
    /// The most recent 7 calendar days up to the latest reading.
    #[serde(rename = "week")]
    TrailingWeek,
    /// Only the single latest reading date.
    #[serde(rename = "latest")]
    LatestOnly,
}

impl WindowMode {
    /// Parse the CLI spelling. Unknown strings fall back to the default
    /// trailing-week window.
    pub fn from_name(name: &str) -> Self {
        match name {
            "latest" => WindowMode::LatestOnly,
            _ => WindowMode::TrailingWeek,
        }
    }
}

// ── GaugeMode ─────────────────────────────────────────────────────────────────

/// How a per-generator load gauge value is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GaugeMode {
    /// The chronologically last reading within the window.
    Latest,
    /// The mean over the window.
    Average,
}

impl GaugeMode {
    pub fn from_name(name: &str) -> Self {
        match name {
            "average" => GaugeMode::Average,
            _ => GaugeMode::Latest,
        }
    }

    /// Flip between the two modes (dashboard `g` key).
    pub fn toggled(self) -> Self {
        match self {
            GaugeMode::Latest => GaugeMode::Average,
            GaugeMode::Average => GaugeMode::Latest,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
