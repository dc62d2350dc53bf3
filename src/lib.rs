//! Ballwatch
//!
//! Read-only match telemetry for a ball-sport game host. The host pushes one
//! snapshot per tick; the engine tracks possession, goals, ball extrema and
//! match status, and reports aggregates from a background task only when they
//! change.
//!
//! # Modules
//!
//! - `telemetry` - snapshot types and the per-tick analysis pipeline
//! - `engine` - lifecycle, host hooks, the background reporter and log sinks
//! - `control` - controller commands and the smoothing filter
//! - `replay` - scripted and recorded snapshot sources

pub mod config;
pub mod control;
pub mod engine;
pub mod metrics;
pub mod replay;
pub mod telemetry;
pub mod util;
