//! Credit-risk scorecard evaluation: bin matching, per-module accumulation,
//! and scenario-level aggregation into a probability of default.
//!
//! The engine is a single synchronous pass over the configured variables. All
//! configuration is immutable at evaluation time and loaded fresh per call
//! through the [`ScorecardRepository`] seam, so concurrent evaluations never
//! share mutable state.

mod aggregation;
pub mod catalog;
pub mod domain;
pub mod matching;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use catalog::CatalogError;
pub use domain::{
    ApplicationId, Bin, BinKind, DetailRow, EvaluationResult, InputEntry, InputRecord,
    ModuleConfig, RawInputs, Scenario, Variable, VariableKind,
};
pub use matching::{match_variable, BinMatch, ParsedValue};
pub use repository::{MemoryRepository, RepositoryError, ScorecardRepository};
pub use router::scorecard_router;
pub use service::{ScorecardService, ScoringError};
