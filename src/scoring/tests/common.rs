use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::scoring::domain::{
    ApplicationId, Bin, BinKind, InputEntry, ModuleConfig, RawInputs, Scenario, Variable,
    VariableKind,
};
use crate::scoring::repository::{MemoryRepository, RepositoryError, ScorecardRepository};
use crate::scoring::service::ScorecardService;

/// Shipped numeric predictor from the SME scorecard.
pub(super) fn ratio_variable() -> Variable {
    Variable {
        id: 1,
        module: "Application".to_string(),
        name: "RATIO_EXP_AGE_WOE".to_string(),
        coefficient: -2.0704088,
        kind: VariableKind::Numeric,
        bins: vec![
            range_bin(1, 0.0, 0.02, -0.069),
            range_bin(2, 0.02, 0.09, -0.0429),
            range_bin(3, 0.09, 0.3, -0.0035),
            range_bin(4, 0.3, 1e99, 0.0845),
            missing_bin(5, 0.0),
        ],
    }
}

/// Shipped categorical predictor from the SME scorecard.
pub(super) fn industry_variable() -> Variable {
    Variable {
        id: 2,
        module: "Application".to_string(),
        name: "INDUSTRY_CATG_WOE".to_string(),
        coefficient: -0.8335912,
        kind: VariableKind::Categorical,
        bins: vec![
            category_bin(1, "TRADING", 0.2917),
            category_bin(2, "MANUFACTURING", -0.2048),
            category_bin(3, "SERVICES", 0.1103),
            missing_bin(4, 0.0),
        ],
    }
}

/// Predictor whose module no scenario declares; exercises the exclusion path.
pub(super) fn orphan_variable() -> Variable {
    Variable {
        id: 3,
        module: "Collateral".to_string(),
        name: "COLLATERAL_COVER_WOE".to_string(),
        coefficient: -1.5,
        kind: VariableKind::Numeric,
        bins: vec![range_bin(1, 0.0, 1e99, 0.4), missing_bin(2, 0.0)],
    }
}

pub(super) fn range_bin(id: u32, min: f64, max: f64, woe: f64) -> Bin {
    Bin {
        id,
        kind: BinKind::Range { min, max },
        woe,
    }
}

pub(super) fn category_bin(id: u32, label: &str, woe: f64) -> Bin {
    Bin {
        id,
        kind: BinKind::Category {
            label: label.to_string(),
        },
        woe,
    }
}

pub(super) fn missing_bin(id: u32, woe: f64) -> Bin {
    Bin {
        id,
        kind: BinKind::Missing,
        woe,
    }
}

pub(super) fn sme_scenario() -> Scenario {
    Scenario {
        id: 1,
        name: "SME_DEFAULT".to_string(),
        calibration: 0.1586,
        modules: vec![
            ModuleConfig {
                module: "Application".to_string(),
                weight: 0.10,
                intercept: -2.4053,
            },
            ModuleConfig {
                module: "CashFlow".to_string(),
                weight: 0.25,
                intercept: -1.8,
            },
        ],
    }
}

/// Second scenario over the same catalog for independence checks.
pub(super) fn conservative_scenario() -> Scenario {
    Scenario {
        id: 2,
        name: "SME_CONSERVATIVE".to_string(),
        calibration: 0.4,
        modules: vec![ModuleConfig {
            module: "Application".to_string(),
            weight: 0.15,
            intercept: -2.0,
        }],
    }
}

pub(super) fn catalog_variables() -> Vec<Variable> {
    vec![ratio_variable(), industry_variable(), orphan_variable()]
}

pub(super) fn build_service() -> (ScorecardService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::with_catalog(
        catalog_variables(),
        vec![sme_scenario(), conservative_scenario()],
    ));
    let service = ScorecardService::new(repository.clone());
    (service, repository)
}

pub(super) fn inputs(pairs: &[(&str, &str)]) -> RawInputs {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

pub(super) fn entry(var_name: &str, value: &str) -> InputEntry {
    InputEntry {
        var_name: var_name.to_string(),
        value: value.to_string(),
    }
}

pub(super) fn application(id: &str) -> ApplicationId {
    ApplicationId(id.to_string())
}

pub(super) struct UnavailableRepository;

impl ScorecardRepository for UnavailableRepository {
    fn load_scenario(&self, _name: &str) -> Result<Option<Scenario>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn load_variables(&self) -> Result<Vec<Variable>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn load_inputs(&self, _id: &ApplicationId) -> Result<RawInputs, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn upsert_inputs(
        &self,
        _id: &ApplicationId,
        _entries: Vec<InputEntry>,
    ) -> Result<usize, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn clear_inputs(&self, _id: &ApplicationId) -> Result<usize, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
