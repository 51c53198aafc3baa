//! Locale-aware cell normalization.
//!
//! The fleet sheet is maintained in a Latin-locale spreadsheet: decimal
//! commas, thousands dots, day-first dates, and a numeric validity flag.
//! This module centralizes all of that "dirty" parsing so the rest of the
//! workspace can assume clean, typed values.

use chrono::{NaiveDate, NaiveDateTime};

/// Values at or below this threshold are treated as load fractions (0–1
/// scale) and multiplied by 100. See [`normalize_load_percent`].
pub const LOAD_FRACTION_THRESHOLD: f64 = 10.0;

/// Scaled load values above this are rejected as sensor anomalies.
pub const LOAD_ANOMALY_CEILING: f64 = 200.0;

/// Parse a possibly locale-formatted numeric cell into `f64`.
///
/// Accepted forms:
/// * plain floats (`"123.45"`) — pass through unchanged, so normalizing an
///   already-normalized value is a no-op;
/// * decimal comma with thousands dots (`"2.913.142,58"` → `2913142.58`);
/// * bare decimal comma (`"1,50"` → `1.5`);
/// * thousands dots without decimals (`"2.913.142"` → `2913142.0`).
///
/// Whitespace and apostrophe group separators are stripped. Anything with
/// alphabetic characters or that still fails to parse yields `None`.
pub fn parse_locale_number(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }

    let s = s.replace([' ', '\''], "");

    let cleaned = if s.contains(',') {
        // Comma is the decimal separator; any dots are thousands groups.
        s.replace('.', "").replace(',', ".")
    } else if s.matches('.').count() > 1 {
        // Multiple dots can only be thousands groups.
        s.replace('.', "")
    } else {
        // Zero or one dot: already a plain float.
        s
    };

    cleaned.parse::<f64>().ok()
}

/// Parse a day-first timestamp cell.
///
/// Tries the sheet's `dd/mm/yyyy` conventions first (with and without a time
/// component, slash or dash separated), then ISO forms so already-normalized
/// data round-trips. Date-only cells resolve to midnight.
pub fn parse_timestamp_dayfirst(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    const DATETIME_FORMATS: [&str; 6] = [
        "%d/%m/%Y %H:%M:%S",
        "%d/%m/%Y %H:%M",
        "%d-%m-%Y %H:%M:%S",
        "%d-%m-%Y %H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
    ];
    for fmt in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ts);
        }
    }

    const DATE_FORMATS: [&str; 3] = ["%d/%m/%Y", "%d-%m-%Y", "%Y-%m-%d"];
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    None
}

/// Normalize a raw prime-load reading onto the 0–100 percentage scale.
///
/// The source is inconsistent about whether the column carries a fraction
/// (`1,50` meaning 150 %) or a whole percentage (`150`). The fixed contract:
/// values at or below [`LOAD_FRACTION_THRESHOLD`] are fractions and are
/// multiplied by 100; larger values are percentages already. The rule is
/// applied exactly once, at load time.
///
/// Scaled values above [`LOAD_ANOMALY_CEILING`] are rejected to `None` and
/// counted by the loader rather than displayed.
pub fn normalize_load_percent(raw: f64) -> Option<f64> {
    let scaled = if raw.abs() <= LOAD_FRACTION_THRESHOLD {
        raw * 100.0
    } else {
        raw
    };
    if scaled > LOAD_ANOMALY_CEILING {
        return None;
    }
    Some(scaled)
}

/// Interpret the sheet's validity flag (`REGISTRO CORRECTO`).
///
/// The canonical value is the numeral `1`; spreadsheet edits occasionally
/// leave boolean spellings behind, so those are accepted too.
pub fn parse_validity_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_lowercase().as_str(),
        "1" | "true" | "verdadero" | "si" | "sí"
    )
}

// ── Tests ─────────────────────────────────────────────────────────────────────
