use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for loan applications whose inputs are staged for scoring.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// Raw caller-supplied values keyed by variable name. Values stay strings at
/// this boundary; numeric parsing happens inside the bin matcher.
pub type RawInputs = BTreeMap<String, String>;

/// Type tag deciding how a variable's raw value is interpreted before lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableKind {
    Numeric,
    Categorical,
}

/// Shape of one lookup-table row: a half-open numeric range `[min, max)`, an
/// exact category label, or the designated missing-value fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinKind {
    Range { min: f64, max: f64 },
    Category { label: String },
    Missing,
}

/// One scorecard bin mapping a value range/category to a weight of evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bin {
    pub id: u32,
    pub kind: BinKind,
    pub woe: f64,
}

/// A calibrated predictor owned by one business module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub id: u32,
    pub module: String,
    /// Unique, case-sensitive join key against caller-supplied raw inputs.
    pub name: String,
    pub coefficient: f64,
    pub kind: VariableKind,
    /// Lookup order is the configured order; the first structural match wins.
    pub bins: Vec<Bin>,
}

impl Variable {
    /// The designated fallback bin consulted when no range/category matches.
    pub fn missing_bin(&self) -> Option<&Bin> {
        self.bins.iter().find(|bin| bin.kind == BinKind::Missing)
    }
}

/// Per-module aggregation parameters declared by a scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleConfig {
    pub module: String,
    pub weight: f64,
    pub intercept: f64,
}

/// A named scoring configuration: per-module weights/intercepts plus a scalar
/// calibration offset applied once to the folded log-odds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: u32,
    pub name: String,
    pub calibration: f64,
    pub modules: Vec<ModuleConfig>,
}

impl Scenario {
    pub fn module_config(&self, module: &str) -> Option<&ModuleConfig> {
        self.modules.iter().find(|config| config.module == module)
    }
}

/// One staged input value in an application's upsert batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputEntry {
    pub var_name: String,
    pub value: String,
}

/// Stored-input row persisted per `(application, variable)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputRecord {
    pub var_name: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

/// Audit row emitted for every bin of every variable, showing that bin's
/// hypothetical contribution alongside whether it was the one actually hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailRow {
    pub variable: String,
    pub module: String,
    pub raw_value: Option<String>,
    pub coefficient: f64,
    pub bin_id: u32,
    pub bin: BinKind,
    pub woe: f64,
    /// True only for the bin actually matched; fallback hits never set it.
    pub active: bool,
    pub contribution: f64,
    /// False when the variable's module is absent from the active scenario.
    pub included_in_total: bool,
}

/// Complete output of one evaluation, owned by the caller after return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub scenario: String,
    pub probability_of_default: f64,
    pub final_log_odds: f64,
    pub module_breakdown: BTreeMap<String, f64>,
    pub details: Vec<DetailRow>,
}

impl EvaluationResult {
    /// Detail rows restricted to one module, for audit-table filtering.
    pub fn details_for_module<'a>(&'a self, module: &'a str) -> impl Iterator<Item = &'a DetailRow> {
        self.details.iter().filter(move |row| row.module == module)
    }
}
