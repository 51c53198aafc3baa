//! Static table views (summary / daily) for the Fleet Monitor TUI.
//!
//! Renders a bordered [`ratatui::widgets::Table`] with one row per
//! (location, generator) pair or per day, plus a highlighted totals row at
//! the bottom of the summary.

use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use fleet_core::formatting::{format_metric, MISSING};
use fleet_data::aggregator::{DailyPoint, SummaryRow};

use crate::themes::Theme;

/// Render the per-generator summary table into `area`.
///
/// One data row per (location, generator) pair, followed by a highlighted
/// totals row: sums for the summed columns, "—" for the averaged ones.
pub fn render_summary_view(frame: &mut Frame, area: Rect, rows: &[SummaryRow], theme: &Theme) {
    let header_cells = [
        "Location",
        "Generator",
        "Hours",
        "Energy (kWh)",
        "Fuel (gal)",
        "Load (%)",
        "Cost/kWh",
    ]
    .iter()
    .map(|h| Cell::from(*h).style(theme.table_header));
    let header = Row::new(header_cells).height(1);

    let data_rows: Vec<Row> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let style = if i % 2 == 0 {
                theme.table_row
            } else {
                theme.table_row_alt
            };
            Row::new(vec![
                Cell::from(row.location.clone()),
                Cell::from(row.generator_id.clone()),
                Cell::from(format_metric(Some(row.operating_hours), false, 2)),
                Cell::from(format_metric(Some(row.energy_kwh), false, 0)),
                Cell::from(format_metric(Some(row.fuel_gal), false, 2)),
                Cell::from(format_metric(row.load_percent, false, 2)),
                Cell::from(format_metric(row.cost_per_kwh, true, 3)),
            ])
            .style(style)
        })
        .collect();

    // Totals row – styled separately to stand out.
    let hours: f64 = rows.iter().map(|r| r.operating_hours).sum();
    let energy: f64 = rows.iter().map(|r| r.energy_kwh).sum();
    let fuel: f64 = rows.iter().map(|r| r.fuel_gal).sum();
    let total_row = Row::new(vec![
        Cell::from("TOTAL"),
        Cell::from(format!("{} generators", rows.len())),
        Cell::from(format_metric(Some(hours), false, 2)),
        Cell::from(format_metric(Some(energy), false, 0)),
        Cell::from(format_metric(Some(fuel), false, 2)),
        Cell::from(MISSING),
        Cell::from(MISSING),
    ])
    .style(theme.table_total);

    let mut all_rows = data_rows;
    all_rows.push(total_row);

    let widths = [
        Constraint::Length(14),
        Constraint::Length(13),
        Constraint::Length(10),
        Constraint::Length(14),
        Constraint::Length(12),
        Constraint::Length(10),
        Constraint::Length(12),
    ];

    let table = Table::new(all_rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(" Generator Summary "),
        )
        .style(theme.text);

    frame.render_widget(table, area);
}

/// Render the daily series table into `area`.
///
/// One row per (date, location) point; padded gaps show "—" or 0 exactly as
/// the series carries them.
pub fn render_daily_view(frame: &mut Frame, area: Rect, points: &[DailyPoint], theme: &Theme) {
    let header_cells = ["Date", "Location", "Energy (kWh)"]
        .iter()
        .map(|h| Cell::from(*h).style(theme.table_header));
    let header = Row::new(header_cells).height(1);

    let data_rows: Vec<Row> = points
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let style = if i % 2 == 0 {
                theme.table_row
            } else {
                theme.table_row_alt
            };
            Row::new(vec![
                Cell::from(point.date.format("%Y-%m-%d").to_string()),
                Cell::from(point.location.clone().unwrap_or_else(|| "ALL".to_string())),
                Cell::from(format_metric(point.value, false, 0)),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(12),
        Constraint::Length(14),
        Constraint::Length(14),
    ];

    let table = Table::new(data_rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(" Daily Generation "),
        )
        .style(theme.text);

    frame.render_widget(table, area);
}

/// Render a "no data" placeholder when there are no rows to show.
pub fn render_no_data(frame: &mut Frame, area: Rect, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("No telemetry data found", theme.warning)),
        Line::from(""),
        Line::from(Span::styled(
            "Check the sheet source configuration and validity flags.",
            theme.dim,
        )),
        Line::from(Span::styled("Press 'q' or Ctrl+C to exit", theme.dim)),
    ];
    frame.render_widget(
        Paragraph::new(ratatui::text::Text::from(text)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(" Fleet Monitor "),
        ),
        area,
    );
}

// ── Tests ──────────────────────────────────────────────────────────────────────
