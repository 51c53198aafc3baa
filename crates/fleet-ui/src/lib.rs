//! Terminal UI layer for the Fleet Monitor.
//!
//! Provides themes, gauge and KPI-card components, the live dashboard and
//! static table views, and the main application event loop built on top of
//! [`ratatui`] for rendering fleet telemetry in the terminal.

pub mod app;
pub mod components;
pub mod dashboard_view;
pub mod table_view;
pub mod themes;

pub use fleet_core as core;
