//! Core domain layer for Fleet Monitor.
//!
//! Defines the typed telemetry record model, locale-aware numeric and
//! timestamp normalization, display formatting helpers, the error taxonomy,
//! and CLI settings shared by every other crate in the workspace.

pub mod error;
pub mod formatting;
pub mod models;
pub mod numeric;
pub mod settings;
