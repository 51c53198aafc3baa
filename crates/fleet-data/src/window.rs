//! Reporting windows over the telemetry record set.

use chrono::{Days, NaiveDate};
use fleet_core::models::{TelemetryRecord, WindowMode};

/// An inclusive calendar-date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ReportWindow {
    /// Build the window for a mode, anchored on the latest reading date.
    ///
    /// `TrailingWeek` covers the 7 calendar days up to and including the
    /// latest date; `LatestOnly` collapses to that single date. Returns
    /// `None` when there are no records to anchor on.
    pub fn for_mode(records: &[TelemetryRecord], mode: WindowMode) -> Option<Self> {
        let end = records.iter().map(|r| r.date()).max()?;
        let start = match mode {
            WindowMode::TrailingWeek => end.checked_sub_days(Days::new(6))?,
            WindowMode::LatestOnly => end,
        };
        Some(Self { start, end })
    }

    /// The equal-length window immediately before this one, endpoints
    /// adjacent and non-overlapping: the preceding of `[D-6, D]` is
    /// `[D-13, D-7]`.
    pub fn preceding(&self) -> Option<Self> {
        let span = Days::new(self.len_days());
        Some(Self {
            start: self.start.checked_sub_days(span)?,
            end: self.end.checked_sub_days(span)?,
        })
    }

    /// Number of calendar days covered (a single-day window is 1).
    pub fn len_days(&self) -> u64 {
        (self.end - self.start).num_days() as u64 + 1
    }

    /// Records whose reading date falls inside the window, bounds inclusive.
    ///
    /// Returns an owned set to satisfy the aggregator's slice signatures.
    pub fn filter(&self, records: &[TelemetryRecord]) -> Vec<TelemetryRecord> {
        records
            .iter()
            .filter(|r| {
                let d = r.date();
                self.start <= d && d <= self.end
            })
            .cloned()
            .collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn record_on(date: &str) -> TelemetryRecord {
        let ts = format!("{date} 12:00:00");
        TelemetryRecord {
            timestamp: NaiveDateTime::parse_from_str(&ts, "%Y-%m-%d %H:%M:%S").unwrap(),
            location: "ORION-52".to_string(),
            generator_id: "G-01".to_string(),
            active_power_kw: 480.0,
            energy_kwh: Some(100.0),
            fuel_gal: None,
            cost_usd: None,
            cost_per_kwh: None,
            load_percent: None,
            operating_hours: None,
            voltage: None,
        }
    }

    fn ymd(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_trailing_week_window() {
        let records = vec![record_on("2024-03-10"), record_on("2024-03-15")];
        let w = ReportWindow::for_mode(&records, WindowMode::TrailingWeek).unwrap();
        assert_eq!(w.start, ymd("2024-03-09"));
        assert_eq!(w.end, ymd("2024-03-15"));
        assert_eq!(w.len_days(), 7);
    }

    #[test]
    fn test_latest_only_window() {
        let records = vec![record_on("2024-03-10"), record_on("2024-03-15")];
        let w = ReportWindow::for_mode(&records, WindowMode::LatestOnly).unwrap();
        assert_eq!(w.start, ymd("2024-03-15"));
        assert_eq!(w.end, ymd("2024-03-15"));
        assert_eq!(w.len_days(), 1);
    }

    #[test]
    fn test_empty_records_no_window() {
        assert!(ReportWindow::for_mode(&[], WindowMode::TrailingWeek).is_none());
    }

    #[test]
    fn test_preceding_week_is_adjacent_non_overlapping() {
        let w = ReportWindow {
            start: ymd("2024-03-09"),
            end: ymd("2024-03-15"),
        };
        let prev = w.preceding().unwrap();
        assert_eq!(prev.start, ymd("2024-03-02"));
        assert_eq!(prev.end, ymd("2024-03-08"));
        assert_eq!(prev.len_days(), w.len_days());
    }

    #[test]
    fn test_preceding_single_day() {
        let w = ReportWindow {
            start: ymd("2024-03-15"),
            end: ymd("2024-03-15"),
        };
        let prev = w.preceding().unwrap();
        assert_eq!(prev.start, ymd("2024-03-14"));
        assert_eq!(prev.end, ymd("2024-03-14"));
    }

    #[test]
    fn test_filter_bounds_inclusive() {
        let records = vec![
            record_on("2024-03-08"),
            record_on("2024-03-09"),
            record_on("2024-03-15"),
            record_on("2024-03-16"),
        ];
        let w = ReportWindow {
            start: ymd("2024-03-09"),
            end: ymd("2024-03-15"),
        };
        let inside = w.filter(&records);
        let dates: Vec<NaiveDate> = inside.iter().map(|r| r.date()).collect();
        assert_eq!(dates, vec![ymd("2024-03-09"), ymd("2024-03-15")]);
    }
}
