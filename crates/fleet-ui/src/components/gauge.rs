use crate::themes::Theme;
use ratatui::text::{Line, Span};

/// Configuration controlling visual appearance of a load gauge.
pub struct GaugeConfig {
    /// Total width in terminal columns of the bar portion (excluding label).
    pub width: u16,
    /// Character used to fill the loaded portion of the bar.
    pub filled_char: char,
    /// Character used to fill the empty portion of the bar.
    pub empty_char: char,
}

impl Default for GaugeConfig {
    fn default() -> Self {
        Self {
            width: 40,
            filled_char: '\u{2588}', // █  FULL BLOCK
            empty_char: '\u{2591}',  // ░  LIGHT SHADE
        }
    }
}

// ── LoadGauge ─────────────────────────────────────────────────────────────────

/// Horizontal gauge showing a generator's prime-load percentage.
///
/// Renders as a coloured fill + empty portion preceded by the generator
/// name and followed by the percentage. Overload readings (above 100 %) keep
/// their true figure in the label while the bar itself stays full.
///
/// Pairs with nothing to show never reach this type: the snapshot pipeline
/// omits them instead of emitting a 0 % gauge.
pub struct LoadGauge<'a> {
    /// Site the generator belongs to.
    pub location: &'a str,
    /// Generator identifier.
    pub generator_id: &'a str,
    /// Prime load percentage, always positive.
    pub percentage: f64,
    /// Theme from which colour styles are taken.
    pub theme: &'a Theme,
    /// Visual configuration.
    pub config: GaugeConfig,
}

impl<'a> LoadGauge<'a> {
    pub fn new(location: &'a str, generator_id: &'a str, percentage: f64, theme: &'a Theme) -> Self {
        Self {
            location,
            generator_id,
            percentage,
            theme,
            config: GaugeConfig::default(),
        }
    }

    /// Render the gauge as a [`Line`] suitable for embedding in any ratatui
    /// widget that accepts `Line` values.
    pub fn to_line(&self) -> Line<'a> {
        let fill_pct = self.percentage.min(100.0);
        let filled = ((fill_pct / 100.0) * self.config.width as f64) as u16;
        let empty = self.config.width.saturating_sub(filled);

        let bar_style = self.theme.gauge_style(self.percentage);

        let filled_str: String =
            std::iter::repeat_n(self.config.filled_char, filled as usize).collect();
        let empty_str: String =
            std::iter::repeat_n(self.config.empty_char, empty as usize).collect();

        let name = format!("{:<10} {:<6} ", self.location, self.generator_id);
        let label = format!(" {:.1}%", self.percentage);

        Line::from(vec![
            Span::styled(name, self.theme.label),
            Span::styled(filled_str, bar_style),
            Span::styled(empty_str, self.theme.gauge_empty),
            Span::styled(label, self.theme.gauge_label),
        ])
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::themes::Theme;

    #[test]
    fn test_load_gauge_to_line() {
        let theme = Theme::dark();
        let gauge = LoadGauge::new("ORION-52", "G-01", 50.0, &theme);
        let line = gauge.to_line();

        assert_eq!(line.spans.len(), 4, "expected name, filled, empty, label");

        // 50 % of 40 columns = 20 chars of '█'.
        let filled = &line.spans[1];
        assert_eq!(filled.content.chars().count(), 20);
        assert!(filled.content.chars().all(|c| c == '█'));

        let empty = &line.spans[2];
        assert_eq!(empty.content.chars().count(), 20);
        assert!(empty.content.chars().all(|c| c == '░'));

        assert!(line.spans[0].content.contains("ORION-52"));
        assert!(line.spans[3].content.contains("50.0%"));
    }

    #[test]
    fn test_load_gauge_overload_keeps_true_label() {
        let theme = Theme::dark();
        let gauge = LoadGauge::new("ORION-52", "G-01", 150.0, &theme);
        let line = gauge.to_line();

        // Bar saturates at full width; the label keeps the real reading.
        assert_eq!(line.spans[1].content.chars().count(), 40);
        assert_eq!(line.spans[2].content.len(), 0);
        assert!(line.spans[3].content.contains("150.0%"));
    }

    #[test]
    fn test_load_gauge_low_load() {
        let theme = Theme::dark();
        let gauge = LoadGauge::new("ORION-52", "G-01", 2.5, &theme);
        let line = gauge.to_line();

        // 2.5 % of 40 columns = 1 char.
        assert_eq!(line.spans[1].content.chars().count(), 1);
        assert!(line.spans[3].content.contains("2.5%"));
    }
}
