/// Placeholder rendered wherever a value is missing.
pub const MISSING: &str = "—";

/// Format a floating-point number with thousands separators and a fixed number
/// of decimal places.
///
/// # Examples
///
/// ```
/// use fleet_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5,  1), "1,234.5");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(0.0, 2), "0.00");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    // Handle the sign separately so the thousands grouping works on the
    // absolute value.
    let negative = value < 0.0;
    let abs_value = value.abs();

    // Round to the requested decimal places.
    // Add a tiny epsilon (half ULP at the target precision) before rounding
    // to avoid IEEE 754 binary-representation issues at exact midpoints.
    let factor = 10_f64.powi(decimals as i32);
    let epsilon = f64::EPSILON * abs_value * factor;
    let rounded = ((abs_value * factor) + epsilon).round() / factor;

    let integer_part = rounded.trunc() as u64;
    let frac_part = rounded - rounded.trunc();

    // Build the thousands-separated integer portion.
    let int_str = integer_part.to_string();
    let grouped = group_thousands(&int_str);

    let result = if decimals == 0 {
        grouped
    } else {
        // Format the fractional part to the exact number of decimals.
        let frac_str = format!("{:.prec$}", frac_part, prec = decimals as usize);
        // `frac_str` starts with "0.", e.g. "0.50". Strip the leading "0".
        let decimal_digits = &frac_str[1..]; // ".50"
        format!("{}{}", grouped, decimal_digits)
    };

    if negative {
        format!("-{}", result)
    } else {
        result
    }
}

/// Format a metric value for a card, table cell, or export.
///
/// Missing values render as [`MISSING`]; currency values carry the sheet's
/// `"USD "` prefix.
///
/// # Examples
///
/// ```
/// use fleet_core::formatting::format_metric;
///
/// assert_eq!(format_metric(Some(2913142.58), true, 2), "USD 2,913,142.58");
/// assert_eq!(format_metric(Some(11520.0), false, 0), "11,520");
/// assert_eq!(format_metric(None, false, 2), "—");
/// ```
pub fn format_metric(value: Option<f64>, currency: bool, decimals: u32) -> String {
    let Some(v) = value else {
        return MISSING.to_string();
    };
    let formatted = format_number(v, decimals);
    if currency {
        format!("USD {}", formatted)
    } else {
        formatted
    }
}

/// Format a period-over-period delta percentage with a directional arrow.
///
/// A non-negative delta renders `"↑ 12.3%"`, a negative one `"↓ 4.0%"`
/// (absolute value, one decimal). Missing deltas render [`MISSING`].
///
/// # Examples
///
/// ```
/// use fleet_core::formatting::format_delta;
///
/// assert_eq!(format_delta(Some(12.34)), "↑ 12.3%");
/// assert_eq!(format_delta(Some(-4.0)), "↓ 4.0%");
/// assert_eq!(format_delta(None), "—");
/// ```
pub fn format_delta(delta: Option<f64>) -> String {
    let Some(d) = delta else {
        return MISSING.to_string();
    };
    let arrow = if d >= 0.0 { "↑" } else { "↓" };
    format!("{} {:.1}%", arrow, d.abs())
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    let remainder = chars.len() % 3;
    for (i, &c) in chars.iter().enumerate() {
        if i != 0 && (i % 3 == remainder) {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────
