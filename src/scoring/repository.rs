use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use chrono::Utc;

use super::domain::{ApplicationId, InputEntry, InputRecord, RawInputs, Scenario, Variable};

/// Storage abstraction satisfied by the excluded persistence layer. The
/// service module only depends on this trait so it can be exercised with the
/// in-memory implementation below.
pub trait ScorecardRepository: Send + Sync {
    fn load_scenario(&self, name: &str) -> Result<Option<Scenario>, RepositoryError>;
    fn load_variables(&self) -> Result<Vec<Variable>, RepositoryError>;
    fn load_inputs(&self, application_id: &ApplicationId) -> Result<RawInputs, RepositoryError>;
    fn upsert_inputs(
        &self,
        application_id: &ApplicationId,
        entries: Vec<InputEntry>,
    ) -> Result<usize, RepositoryError>;
    fn clear_inputs(&self, application_id: &ApplicationId) -> Result<usize, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Mutex-backed store holding the loaded catalog and staged application
/// inputs. Backs both the binary (hydrated from CSV) and the test suites.
#[derive(Default)]
pub struct MemoryRepository {
    scenarios: Mutex<HashMap<String, Scenario>>,
    variables: Mutex<Vec<Variable>>,
    inputs: Mutex<HashMap<ApplicationId, BTreeMap<String, InputRecord>>>,
}

impl MemoryRepository {
    pub fn with_catalog(variables: Vec<Variable>, scenarios: Vec<Scenario>) -> Self {
        let repository = Self::default();
        {
            let mut guard = repository
                .scenarios
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            for scenario in scenarios {
                guard.insert(scenario.name.clone(), scenario);
            }
        }
        *repository
            .variables
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = variables;
        repository
    }
}

fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> Result<std::sync::MutexGuard<'a, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable(format!("{what} lock poisoned")))
}

impl ScorecardRepository for MemoryRepository {
    fn load_scenario(&self, name: &str) -> Result<Option<Scenario>, RepositoryError> {
        let guard = lock(&self.scenarios, "scenario store")?;
        Ok(guard.get(name).cloned())
    }

    fn load_variables(&self) -> Result<Vec<Variable>, RepositoryError> {
        let guard = lock(&self.variables, "variable store")?;
        Ok(guard.clone())
    }

    fn load_inputs(&self, application_id: &ApplicationId) -> Result<RawInputs, RepositoryError> {
        let guard = lock(&self.inputs, "input store")?;
        let inputs = guard
            .get(application_id)
            .map(|records| {
                records
                    .values()
                    .map(|record| (record.var_name.clone(), record.value.clone()))
                    .collect()
            })
            .unwrap_or_default();
        Ok(inputs)
    }

    fn upsert_inputs(
        &self,
        application_id: &ApplicationId,
        entries: Vec<InputEntry>,
    ) -> Result<usize, RepositoryError> {
        let mut guard = lock(&self.inputs, "input store")?;
        let records = guard.entry(application_id.clone()).or_default();
        let now = Utc::now();
        let mut stored = 0;
        for entry in entries {
            records.insert(
                entry.var_name.clone(),
                InputRecord {
                    var_name: entry.var_name,
                    value: entry.value,
                    updated_at: now,
                },
            );
            stored += 1;
        }
        Ok(stored)
    }

    fn clear_inputs(&self, application_id: &ApplicationId) -> Result<usize, RepositoryError> {
        let mut guard = lock(&self.inputs, "input store")?;
        let cleared = guard
            .remove(application_id)
            .map(|records| records.len())
            .unwrap_or(0);
        Ok(cleared)
    }
}
