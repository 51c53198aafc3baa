use crate::themes::Theme;
use fleet_core::formatting::{format_delta, format_metric};
use fleet_core::models::Metric;
use ratatui::text::{Line, Span};

/// One KPI line: label, formatted value, and optionally a coloured
/// period-over-period delta.
///
/// Missing values render as "—" rather than being hidden, so a card row
/// keeps its shape whatever the data looks like.
pub struct MetricCard<'a> {
    pub metric: Metric,
    pub value: Option<f64>,
    /// Delta vs the preceding period, in percent. `None` hides the suffix
    /// entirely (historical cards have no comparison period).
    pub delta: Option<Option<f64>>,
    pub theme: &'a Theme,
}

impl<'a> MetricCard<'a> {
    pub fn new(metric: Metric, value: Option<f64>, theme: &'a Theme) -> Self {
        Self {
            metric,
            value,
            delta: None,
            theme,
        }
    }

    /// Attach a delta suffix (windowed cards).
    pub fn with_delta(mut self, delta: Option<f64>) -> Self {
        self.delta = Some(delta);
        self
    }

    /// Render the card as a [`Line`].
    pub fn to_line(&self) -> Line<'a> {
        let label = format!("{:<24}", self.metric.label());
        let value = format_metric(self.value, self.metric.is_currency(), self.metric.decimals());

        let mut spans = vec![
            Span::styled(label, self.theme.label),
            Span::styled(format!("{value:>16}"), self.theme.value),
        ];

        if let Some(delta) = self.delta {
            let style = match delta {
                Some(d) => self.theme.delta_style(d),
                None => self.theme.dim,
            };
            spans.push(Span::styled(format!("  {}", format_delta(delta)), style));
        }

        Line::from(spans)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
