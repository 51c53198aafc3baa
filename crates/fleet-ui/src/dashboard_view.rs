//! Live dashboard view for the Fleet Monitor TUI.
//!
//! Renders one full-screen page from a [`DashboardSnapshot`]: historical and
//! windowed KPI cards, daily energy bars, per-generator load gauges, and a
//! status line with the active modes and key bindings.

use ratatui::{
    layout::Rect,
    text::{Line, Span, Text},
    widgets::Paragraph,
    Frame,
};
use unicode_width::UnicodeWidthStr;

use fleet_core::formatting::format_metric;
use fleet_core::models::{GaugeMode, Metric, WindowMode};
use fleet_data::aggregator::DailyPoint;
use fleet_data::analysis::DashboardSnapshot;

use crate::components::{LoadGauge, MetricCard};
use crate::themes::Theme;

const SEPARATOR_WIDTH: usize = 78;
const DAILY_BAR_WIDTH: usize = 40;

// ── Formatting helpers ────────────────────────────────────────────────────────

/// Pad `text` with trailing spaces to `width` display columns.
///
/// Section labels carry icons that occupy two terminal columns, so plain
/// `format!` padding would misalign the value that follows.
fn pad_columns(text: &str, width: usize) -> String {
    let used = UnicodeWidthStr::width(text);
    let padding = width.saturating_sub(used).max(1);
    format!("{}{}", text, " ".repeat(padding))
}

fn window_label(mode: WindowMode) -> &'static str {
    match mode {
        WindowMode::TrailingWeek => "trailing week",
        WindowMode::LatestOnly => "latest day",
    }
}

fn gauge_mode_label(mode: GaugeMode) -> &'static str {
    match mode {
        GaugeMode::Latest => "latest",
        GaugeMode::Average => "average",
    }
}

/// One bar row of the daily energy chart, scaled against the window maximum.
fn daily_bar_line<'a>(point: &DailyPoint, max_value: f64, theme: &'a Theme) -> Line<'a> {
    let value = point.value.unwrap_or(0.0);
    let filled = if max_value > 0.0 {
        (((value / max_value) * DAILY_BAR_WIDTH as f64).round() as usize).min(DAILY_BAR_WIDTH)
    } else {
        0
    };
    let empty = DAILY_BAR_WIDTH - filled;
    let location = point.location.as_deref().unwrap_or("ALL");

    Line::from(vec![
        Span::styled(
            format!(
                "{}  {}",
                point.date.format("%Y-%m-%d"),
                pad_columns(location, 12),
            ),
            theme.label,
        ),
        Span::styled("█".repeat(filled), theme.info),
        Span::styled("░".repeat(empty), theme.gauge_empty),
        Span::styled(
            format!(" {}", format_metric(point.value, false, 0)),
            theme.value,
        ),
    ])
}

// ── Main render ───────────────────────────────────────────────────────────────

/// Render the dashboard into `area`.
pub fn render_dashboard_view(
    frame: &mut Frame,
    area: Rect,
    snapshot: &DashboardSnapshot,
    fetch_error: Option<&str>,
    theme: &Theme,
) {
    let lines = build_dashboard_lines(snapshot, fetch_error, theme);
    frame.render_widget(Paragraph::new(Text::from(lines)), area);
}

/// Build the full `Vec<Line>` for the dashboard (extracted for testability).
pub fn build_dashboard_lines<'a>(
    snapshot: &'a DashboardSnapshot,
    fetch_error: Option<&str>,
    theme: &'a Theme,
) -> Vec<Line<'a>> {
    let mut lines: Vec<Line<'a>> = Vec::with_capacity(48);

    // ── Header ────────────────────────────────────────────────────────────────
    lines.push(Line::from(Span::styled(
        "⚡ FLEET GENERATION MONITOR",
        theme.header,
    )));
    lines.push(Line::from(Span::styled(
        "=".repeat(SEPARATOR_WIDTH),
        theme.separator,
    )));
    lines.push(Line::from(vec![
        Span::styled("[ window: ", theme.label),
        Span::styled(window_label(snapshot.window_mode), theme.value),
        Span::styled(" | gauges: ", theme.label),
        Span::styled(gauge_mode_label(snapshot.gauge_mode), theme.value),
        Span::styled(" ]", theme.label),
    ]));

    if let Some(err) = fetch_error {
        lines.push(Line::from(Span::styled(
            format!("⚠ refresh failed: {err} (showing cached data)"),
            theme.error,
        )));
    }
    lines.push(Line::from(""));

    // ── Historical KPIs ───────────────────────────────────────────────────────
    lines.push(Line::from(vec![
        Span::styled(pad_columns("📊 Historical Totals", 30), theme.info),
        Span::styled(
            format!("{} records", snapshot.metadata.records_total),
            theme.dim,
        ),
    ]));
    lines.push(MetricCard::new(Metric::EnergyGenerated, snapshot.historical.energy_kwh, theme).to_line());
    lines.push(MetricCard::new(Metric::FuelConsumed, snapshot.historical.fuel_gal, theme).to_line());
    lines.push(MetricCard::new(Metric::GenerationCost, snapshot.historical.cost_usd, theme).to_line());
    lines.push(MetricCard::new(Metric::CostPerKwh, snapshot.historical.cost_per_kwh, theme).to_line());
    lines.push(Line::from(""));

    // ── Windowed KPIs with deltas ─────────────────────────────────────────────
    let bounds = match (snapshot.metadata.window_start, snapshot.metadata.window_end) {
        (Some(start), Some(end)) => format!(
            "{} → {} | {} records",
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d"),
            snapshot.metadata.records_in_window,
        ),
        _ => "no data".to_string(),
    };
    lines.push(Line::from(vec![
        Span::styled(pad_columns("🗓 Selected Window", 30), theme.info),
        Span::styled(bounds, theme.dim),
    ]));
    lines.push(
        MetricCard::new(Metric::EnergyGenerated, snapshot.windowed.energy_kwh, theme)
            .with_delta(snapshot.deltas.energy_kwh)
            .to_line(),
    );
    lines.push(
        MetricCard::new(Metric::FuelConsumed, snapshot.windowed.fuel_gal, theme)
            .with_delta(snapshot.deltas.fuel_gal)
            .to_line(),
    );
    lines.push(
        MetricCard::new(Metric::GenerationCost, snapshot.windowed.cost_usd, theme)
            .with_delta(snapshot.deltas.cost_usd)
            .to_line(),
    );
    lines.push(
        MetricCard::new(Metric::CostPerKwh, snapshot.windowed.cost_per_kwh, theme)
            .with_delta(snapshot.deltas.cost_per_kwh)
            .to_line(),
    );
    lines.push(Line::from(""));

    // ── Daily energy bars ─────────────────────────────────────────────────────
    lines.push(Line::from(Span::styled(
        "─".repeat(SEPARATOR_WIDTH),
        theme.separator,
    )));
    lines.push(Line::from(Span::styled(
        "Daily Energy (kWh)",
        theme.info,
    )));
    if snapshot.daily_energy_by_location.is_empty() {
        lines.push(Line::from(Span::styled("(no readings)", theme.dim)));
    } else {
        // One labeled bar per (date, location), scaled to the window maximum.
        let max_value = snapshot
            .daily_energy_by_location
            .iter()
            .filter_map(|p| p.value)
            .fold(0.0_f64, f64::max);
        for point in &snapshot.daily_energy_by_location {
            lines.push(daily_bar_line(point, max_value, theme));
        }
    }
    lines.push(Line::from(""));

    // ── Load gauges ───────────────────────────────────────────────────────────
    lines.push(Line::from(Span::styled(
        "─".repeat(SEPARATOR_WIDTH),
        theme.separator,
    )));
    lines.push(Line::from(Span::styled("Generator Load", theme.info)));
    if snapshot.gauges.is_empty() {
        lines.push(Line::from(Span::styled("(no load readings)", theme.dim)));
    } else {
        for gauge in &snapshot.gauges {
            lines.push(
                LoadGauge::new(&gauge.location, &gauge.generator_id, gauge.load_percent, theme)
                    .to_line(),
            );
        }
    }
    lines.push(Line::from(""));

    // ── Status bar ────────────────────────────────────────────────────────────
    lines.push(Line::from(vec![
        Span::styled("⏰ ", theme.info),
        Span::styled(
            chrono::Local::now().format("%H:%M:%S").to_string(),
            theme.info,
        ),
        Span::raw("   "),
        Span::styled(
            "w week | l latest | g gauges | r refresh | q quit",
            theme.dim,
        ),
    ]));

    lines
}

/// Render the "waiting for data" screen shown before the first tick arrives.
pub fn render_waiting(frame: &mut Frame, area: Rect, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("Fetching fleet telemetry...", theme.info)),
        Line::from(""),
        Line::from(Span::styled("Press 'q' or Ctrl+C to exit", theme.dim)),
    ];
    frame.render_widget(Paragraph::new(Text::from(text)), area);
}

// ── Tests ──────────────────────────────────────────────────────────────────────
