//! telemetry/mod.rs
//! Per-reader transform counters.

pub mod counters;

pub use counters::*;
