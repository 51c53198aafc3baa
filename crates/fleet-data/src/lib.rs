//! Data ingestion and aggregation layer for Fleet Monitor.
//!
//! Responsible for validating the sheet's column contract, normalizing raw
//! CSV rows into typed telemetry records, windowing, aggregating KPIs and
//! daily series, building the dashboard snapshot, and writing exports.

pub mod aggregator;
pub mod analysis;
pub mod export;
pub mod loader;
pub mod schema;
pub mod window;

pub use fleet_core as core;
