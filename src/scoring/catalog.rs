use std::collections::HashMap;
use std::io::Read;

use serde::{Deserialize, Deserializer};

use super::domain::{Bin, BinKind, ModuleConfig, Scenario, Variable, VariableKind};

/// Structural problems in the shipped scorecard CSVs, raised at load time so
/// evaluation never sees a malformed catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("variable '{variable}' has unknown type tag '{value}'")]
    UnknownKind { variable: String, value: String },
    #[error("variable '{variable}' mixes conflicting type or module declarations")]
    VariableConflict { variable: String },
    #[error("bin {bin_id} of variable '{variable}' must set either numeric bounds or a category label")]
    BinShape { variable: String, bin_id: u32 },
    #[error("scenario '{scenario}' declares conflicting calibration values")]
    CalibrationMismatch { scenario: String },
    #[error("scenario '{scenario}' declares module '{module}' more than once")]
    DuplicateModule { scenario: String, module: String },
}

/// Parse the variable/bin table. One CSV row per bin; consecutive rows for
/// the same variable name merge into that variable's ordered bin list.
pub fn load_variables<R: Read>(reader: R) -> Result<Vec<Variable>, CatalogError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut variables: Vec<Variable> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in csv_reader.deserialize::<VariableRow>() {
        let row = record?;
        let kind = parse_kind(&row.variable, &row.kind)?;
        let bin = row.bin(kind)?;

        match index.get(&row.variable) {
            Some(&slot) => {
                let variable = &mut variables[slot];
                if variable.kind != kind || variable.module != row.module {
                    return Err(CatalogError::VariableConflict {
                        variable: row.variable,
                    });
                }
                variable.bins.push(bin);
            }
            None => {
                let id = variables.len() as u32 + 1;
                index.insert(row.variable.clone(), variables.len());
                variables.push(Variable {
                    id,
                    module: row.module,
                    name: row.variable,
                    coefficient: row.coefficient,
                    kind,
                    bins: vec![bin],
                });
            }
        }
    }

    Ok(variables)
}

/// Parse the scenario table. One CSV row per (scenario, module) pair; the
/// calibration column repeats per row and must agree within a scenario.
pub fn load_scenarios<R: Read>(reader: R) -> Result<Vec<Scenario>, CatalogError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut scenarios: Vec<Scenario> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in csv_reader.deserialize::<ScenarioRow>() {
        let row = record?;
        match index.get(&row.scenario) {
            Some(&slot) => {
                let scenario = &mut scenarios[slot];
                if (scenario.calibration - row.calibration).abs() > f64::EPSILON {
                    return Err(CatalogError::CalibrationMismatch {
                        scenario: row.scenario,
                    });
                }
                if scenario.module_config(&row.module).is_some() {
                    return Err(CatalogError::DuplicateModule {
                        scenario: row.scenario,
                        module: row.module,
                    });
                }
                scenario.modules.push(row.module_config());
            }
            None => {
                let id = scenarios.len() as u32 + 1;
                index.insert(row.scenario.clone(), scenarios.len());
                scenarios.push(Scenario {
                    id,
                    name: row.scenario.clone(),
                    calibration: row.calibration,
                    modules: vec![row.module_config()],
                });
            }
        }
    }

    Ok(scenarios)
}

fn parse_kind(variable: &str, value: &str) -> Result<VariableKind, CatalogError> {
    match value.to_ascii_uppercase().as_str() {
        "NUMERIC" => Ok(VariableKind::Numeric),
        "CATEGORICAL" => Ok(VariableKind::Categorical),
        _ => Err(CatalogError::UnknownKind {
            variable: variable.to_string(),
            value: value.to_string(),
        }),
    }
}

#[derive(Debug, Deserialize)]
struct VariableRow {
    #[serde(rename = "module")]
    module: String,
    #[serde(rename = "variable")]
    variable: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(rename = "coefficient")]
    coefficient: f64,
    #[serde(rename = "bin_id")]
    bin_id: u32,
    #[serde(rename = "min", default)]
    min: Option<f64>,
    #[serde(rename = "max", default)]
    max: Option<f64>,
    #[serde(rename = "category", default, deserialize_with = "empty_string_as_none")]
    category: Option<String>,
    #[serde(rename = "woe")]
    woe: f64,
}

impl VariableRow {
    fn bin(&self, kind: VariableKind) -> Result<Bin, CatalogError> {
        let bin_kind = match (&self.category, self.min, self.max) {
            // The shipped tables mark the fallback row with a literal NA/NULL
            // label; it is the same row for both variable kinds.
            (Some(label), None, None) if label == "NA" || label == "NULL" => BinKind::Missing,
            (Some(label), None, None) if kind == VariableKind::Categorical => BinKind::Category {
                label: label.clone(),
            },
            (None, Some(min), Some(max)) if kind == VariableKind::Numeric => {
                BinKind::Range { min, max }
            }
            _ => {
                return Err(CatalogError::BinShape {
                    variable: self.variable.clone(),
                    bin_id: self.bin_id,
                })
            }
        };

        Ok(Bin {
            id: self.bin_id,
            kind: bin_kind,
            woe: self.woe,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ScenarioRow {
    #[serde(rename = "scenario")]
    scenario: String,
    #[serde(rename = "calibration")]
    calibration: f64,
    #[serde(rename = "module")]
    module: String,
    #[serde(rename = "weight")]
    weight: f64,
    #[serde(rename = "intercept")]
    intercept: f64,
}

impl ScenarioRow {
    fn module_config(&self) -> ModuleConfig {
        ModuleConfig {
            module: self.module.clone(),
            weight: self.weight,
            intercept: self.intercept,
        }
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|text| !text.trim().is_empty()))
}
