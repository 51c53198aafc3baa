//! Main application state and TUI event loop for the Fleet Monitor.
//!
//! [`App`] owns the theme, the active window and gauge modes, and the most
//! recent telemetry snapshot. It drives both the live dashboard and the
//! static table view event loops.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Frame, Terminal};
use tokio::sync::mpsc;

use fleet_core::models::{GaugeMode, TelemetryRecord, WindowMode};
use fleet_data::aggregator::DailyPoint;
use fleet_data::analysis::{build_snapshot, DashboardSnapshot};
use fleet_runtime::orchestrator::{DashboardTick, OrchestratorHandle};

use crate::dashboard_view;
use crate::table_view;
use crate::themes::Theme;

// ── ViewMode ──────────────────────────────────────────────────────────────────

/// Which view the TUI is currently rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewMode {
    /// Live refreshing dashboard.
    Dashboard,
    /// Static per-generator summary table.
    Summary,
    /// Static daily series table.
    Daily,
}

impl ViewMode {
    /// Parse the CLI spelling. Unknown strings fall back to the dashboard.
    pub fn from_name(name: &str) -> Self {
        match name {
            "summary" => ViewMode::Summary,
            "daily" => ViewMode::Daily,
            _ => ViewMode::Dashboard,
        }
    }
}

// ── App ───────────────────────────────────────────────────────────────────────

/// Root application state for the Fleet Monitor TUI.
pub struct App {
    /// Active colour theme.
    pub theme: Theme,
    /// Current view mode.
    pub view_mode: ViewMode,
    /// Reporting window applied to the snapshot.
    pub window_mode: WindowMode,
    /// How gauge values are selected within the window.
    pub gauge_mode: GaugeMode,
    /// Set to `true` to break out of the event loop on the next iteration.
    pub should_quit: bool,
    /// Telemetry from the most recent tick, kept so a mode change can
    /// rebuild the snapshot without refetching.
    records: Option<Arc<Vec<TelemetryRecord>>>,
    /// Snapshot derived from `records` under the current modes.
    pub snapshot: Option<DashboardSnapshot>,
    /// Error from the most recent fetch, shown as a banner while the
    /// dashboard keeps rendering cached data.
    pub fetch_error: Option<String>,
}

impl App {
    /// Construct a new application with the given configuration.
    pub fn new(
        theme_name: &str,
        view_mode: ViewMode,
        window_mode: WindowMode,
        gauge_mode: GaugeMode,
    ) -> Self {
        Self {
            theme: Theme::from_name(theme_name),
            view_mode,
            window_mode,
            gauge_mode,
            should_quit: false,
            records: None,
            snapshot: None,
            fetch_error: None,
        }
    }

    // ── Public event loops ────────────────────────────────────────────────────

    /// Run the live dashboard TUI, receiving data ticks from `rx`.
    ///
    /// Uses `crossterm::event::poll` (synchronous, with a 250 ms timeout) so
    /// that the terminal event loop stays on the current thread while data
    /// updates arrive on the async channel via `try_recv`.
    ///
    /// Keys: `w`/`l` select the window, `g` flips the gauge mode, `r`
    /// requests an immediate refetch. The loop exits on `q`, `Q`, or
    /// `Ctrl+C`.
    pub async fn run_dashboard(
        mut self,
        mut rx: mpsc::Receiver<DashboardTick>,
        handle: &OrchestratorHandle,
    ) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let tick_rate = Duration::from_millis(250);

        let result = loop {
            terminal.draw(|frame| self.render(frame))?;

            // Handle keyboard events with a short timeout so we don't block.
            if event::poll(tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    if self.on_key(key.code, key.modifiers) {
                        handle.request_refresh();
                    }
                }
            }

            // Drain any pending data updates (non-blocking).
            loop {
                match rx.try_recv() {
                    Ok(tick) => self.apply_tick(tick),
                    Err(mpsc::error::TryRecvError::Empty) => break,
                    Err(mpsc::error::TryRecvError::Disconnected) => {
                        self.should_quit = true;
                        break;
                    }
                }
            }

            if self.should_quit {
                break Ok(());
            }
        };

        // Restore terminal state unconditionally.
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    /// Run a static table view (summary or daily), then wait for `q` / `Ctrl+C`.
    pub async fn run_table(self, snapshot: DashboardSnapshot) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let tick_rate = Duration::from_millis(250);

        // Daily table: per-location rows first, then the combined "ALL" rows.
        let daily_points: Vec<DailyPoint> = snapshot
            .daily_energy_by_location
            .iter()
            .chain(snapshot.daily_energy_total.iter())
            .cloned()
            .collect();

        loop {
            terminal.draw(|frame| {
                let area = frame.area();
                match self.view_mode {
                    ViewMode::Summary if !snapshot.summary.is_empty() => {
                        table_view::render_summary_view(frame, area, &snapshot.summary, &self.theme);
                    }
                    ViewMode::Daily if !daily_points.is_empty() => {
                        table_view::render_daily_view(frame, area, &daily_points, &self.theme);
                    }
                    _ => table_view::render_no_data(frame, area, &self.theme),
                }
            })?;

            if event::poll(tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    match key.code {
                        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                            break;
                        }
                        KeyCode::Char('q') | KeyCode::Char('Q') => break,
                        _ => {}
                    }
                }
            }
        }

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;
        Ok(())
    }

    // ── State transitions ─────────────────────────────────────────────────────

    /// Apply one incoming [`DashboardTick`]: store the records, remember any
    /// fetch error, and rebuild the snapshot under the current modes.
    pub fn apply_tick(&mut self, tick: DashboardTick) {
        self.fetch_error = tick.fetch_error;
        self.records = Some(tick.records);
        self.rebuild_snapshot();
    }

    /// Handle one key press. Returns `true` when the caller should request
    /// an immediate refetch from the orchestrator.
    pub fn on_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        match code {
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            KeyCode::Char('w') => {
                self.window_mode = WindowMode::TrailingWeek;
                self.rebuild_snapshot();
            }
            KeyCode::Char('l') => {
                self.window_mode = WindowMode::LatestOnly;
                self.rebuild_snapshot();
            }
            KeyCode::Char('g') => {
                self.gauge_mode = self.gauge_mode.toggled();
                self.rebuild_snapshot();
            }
            KeyCode::Char('r') => return true,
            _ => {}
        }
        false
    }

    // ── Private helpers ───────────────────────────────────────────────────────

    /// Recompute the snapshot from the stored records. A mode change is just
    /// another call with the same record set.
    fn rebuild_snapshot(&mut self) {
        if let Some(records) = &self.records {
            self.snapshot = Some(build_snapshot(records, self.window_mode, self.gauge_mode));
        }
    }

    /// Render the current application state into `frame`.
    fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        match &self.snapshot {
            Some(snapshot) if snapshot.metadata.records_total > 0 => {
                dashboard_view::render_dashboard_view(
                    frame,
                    area,
                    snapshot,
                    self.fetch_error.as_deref(),
                    &self.theme,
                );
            }
            Some(_) => table_view::render_no_data(frame, area, &self.theme),
            None => dashboard_view::render_waiting(frame, area, &self.theme),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
