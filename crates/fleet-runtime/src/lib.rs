//! Background runtime for Fleet Monitor.
//!
//! Fetches the telemetry sheet from its configured source, caches the
//! normalized record set with a TTL, and drives the periodic refresh loop
//! that feeds the TUI.

pub mod data_manager;
pub mod fetch;
pub mod orchestrator;

pub use fleet_core as core;
