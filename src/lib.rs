//! Scorecard evaluation service: turns calibrated binning tables and a named
//! scenario into a probability of default, with a full per-bin audit trail.

pub mod config;
pub mod error;
pub mod scoring;
pub mod telemetry;
