//! Column contract for the fleet telemetry sheet.
//!
//! The sheet is maintained by the operations team in Spanish; the header
//! spellings below are the contract and are validated before any row work.

use csv::StringRecord;
use fleet_core::error::{FleetError, Result};
use serde::Deserialize;

// ── Header contract ────────────────────────────────────────────────────────────

pub const COL_VALID: &str = "REGISTRO CORRECTO";
pub const COL_ACTIVE_POWER: &str = "POTENCIA ACTIVA (KW)";
pub const COL_TIMESTAMP: &str = "FECHA DEL REGISTRO";
pub const COL_LOCATION: &str = "LOCACIÓN";
pub const COL_GENERATOR: &str = "GENERADOR";
pub const COL_ENERGY: &str = "TOTAL GENERADO KW-H";
pub const COL_FUEL: &str = "CONSUMO (GLS)";
pub const COL_COST: &str = "COSTOS DE GENERACIÓN USD";
pub const COL_COST_PER_KWH: &str = "VALOR POR KW GENERADO";
pub const COL_LOAD: &str = "%CARGA PRIME";
pub const COL_HOURS: &str = "HORAS DE OPERACIÓN";
pub const COL_VOLTAGE: &str = "VOLTAJE (V)";

/// Every column the loader expects to find in the header row.
pub const REQUIRED_COLUMNS: [&str; 12] = [
    COL_VALID,
    COL_ACTIVE_POWER,
    COL_TIMESTAMP,
    COL_LOCATION,
    COL_GENERATOR,
    COL_ENERGY,
    COL_FUEL,
    COL_COST,
    COL_COST_PER_KWH,
    COL_LOAD,
    COL_HOURS,
    COL_VOLTAGE,
];

/// Check the header row against the column contract.
///
/// Headers are matched after trimming; column order does not matter and
/// extra columns are ignored. The first missing column aborts the load with
/// [`FleetError::MissingColumn`].
pub fn validate_headers(headers: &StringRecord) -> Result<()> {
    for required in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h.trim() == required) {
            return Err(FleetError::MissingColumn(required.to_string()));
        }
    }
    Ok(())
}

// ── RawRow ─────────────────────────────────────────────────────────────────────

/// One sheet row exactly as it arrives, every cell optional text.
///
/// Typed deserialization happens here; nothing downstream touches raw
/// strings. Cell-level normalization into numbers and timestamps is the
/// loader's job.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRow {
    #[serde(rename = "REGISTRO CORRECTO")]
    pub valid: Option<String>,
    #[serde(rename = "POTENCIA ACTIVA (KW)")]
    pub active_power_kw: Option<String>,
    #[serde(rename = "FECHA DEL REGISTRO")]
    pub timestamp: Option<String>,
    #[serde(rename = "LOCACIÓN")]
    pub location: Option<String>,
    #[serde(rename = "GENERADOR")]
    pub generator: Option<String>,
    #[serde(rename = "TOTAL GENERADO KW-H")]
    pub energy_kwh: Option<String>,
    #[serde(rename = "CONSUMO (GLS)")]
    pub fuel_gal: Option<String>,
    #[serde(rename = "COSTOS DE GENERACIÓN USD")]
    pub cost_usd: Option<String>,
    #[serde(rename = "VALOR POR KW GENERADO")]
    pub cost_per_kwh: Option<String>,
    #[serde(rename = "%CARGA PRIME")]
    pub load_percent: Option<String>,
    #[serde(rename = "HORAS DE OPERACIÓN")]
    pub operating_hours: Option<String>,
    #[serde(rename = "VOLTAJE (V)")]
    pub voltage: Option<String>,
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn full_header() -> StringRecord {
        StringRecord::from(REQUIRED_COLUMNS.to_vec())
    }

    #[test]
    fn test_validate_headers_complete() {
        assert!(validate_headers(&full_header()).is_ok());
    }

    #[test]
    fn test_validate_headers_missing_column() {
        let headers = StringRecord::from(vec![COL_VALID, COL_TIMESTAMP, COL_LOCATION]);
        let err = validate_headers(&headers).unwrap_err();
        match err {
            FleetError::MissingColumn(name) => assert_eq!(name, COL_ACTIVE_POWER),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_validate_headers_order_independent() {
        let mut cols = REQUIRED_COLUMNS.to_vec();
        cols.reverse();
        assert!(validate_headers(&StringRecord::from(cols)).is_ok());
    }

    #[test]
    fn test_validate_headers_ignores_extra_columns() {
        let mut cols = REQUIRED_COLUMNS.to_vec();
        cols.push("OBSERVACIONES");
        assert!(validate_headers(&StringRecord::from(cols)).is_ok());
    }

    #[test]
    fn test_validate_headers_trims_whitespace() {
        let cols: Vec<String> = REQUIRED_COLUMNS.iter().map(|c| format!(" {c} ")).collect();
        assert!(validate_headers(&StringRecord::from(cols)).is_ok());
    }

    #[test]
    fn test_raw_row_deserializes_from_csv() {
        let csv_text = format!(
            "{}\n1,480,15/03/2024,ORION-52,G-01,\"11.520\",\"790,5\",\"2.850,75\",\"0,247\",\"0,76\",24,482",
            REQUIRED_COLUMNS.join(",")
        );
        let mut rdr = csv::Reader::from_reader(csv_text.as_bytes());
        let row: RawRow = rdr.deserialize().next().unwrap().unwrap();
        assert_eq!(row.valid.as_deref(), Some("1"));
        assert_eq!(row.location.as_deref(), Some("ORION-52"));
        assert_eq!(row.generator.as_deref(), Some("G-01"));
        assert_eq!(row.load_percent.as_deref(), Some("0,76"));
    }
}
