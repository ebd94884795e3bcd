use std::sync::Arc;

use tracing::debug;

use super::aggregation::{accumulate_variable, fold_scenario, probability_of_default, seed_totals};
use super::domain::{ApplicationId, EvaluationResult, InputEntry, RawInputs};
use super::repository::{RepositoryError, ScorecardRepository};

/// Orchestrator tying the bin matcher and both aggregation passes together.
/// Stateless per call: configuration is loaded fresh from the repository and
/// nothing is retained between evaluations.
pub struct ScorecardService<R> {
    repository: Arc<R>,
}

impl<R> ScorecardService<R>
where
    R: ScorecardRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Evaluate the named scenario against a caller-supplied input snapshot.
    ///
    /// A missing scenario is fatal to the call; every per-variable anomaly
    /// (absent value, unparseable number, unmatched bin, unmapped module) is
    /// absorbed into a zero contribution and reflected in the detail rows.
    pub fn evaluate(
        &self,
        scenario_name: &str,
        inputs: &RawInputs,
    ) -> Result<EvaluationResult, ScoringError> {
        let scenario = self
            .repository
            .load_scenario(scenario_name)?
            .ok_or_else(|| ScoringError::ScenarioNotFound {
                name: scenario_name.to_string(),
            })?;
        let variables = self.repository.load_variables()?;

        let mut totals = seed_totals(&scenario);
        let mut details = Vec::new();
        for variable in &variables {
            let raw = inputs.get(&variable.name).map(String::as_str);
            accumulate_variable(&mut totals, &mut details, variable, raw);
        }

        let final_log_odds = fold_scenario(&totals, &scenario);
        let probability = probability_of_default(final_log_odds);

        debug!(
            scenario = %scenario.name,
            variables = variables.len(),
            log_odds = final_log_odds,
            probability,
            "scorecard evaluated"
        );

        Ok(EvaluationResult {
            scenario: scenario.name,
            probability_of_default: probability,
            final_log_odds,
            module_breakdown: totals,
            details,
        })
    }

    /// Evaluate using the stored input snapshot staged for an application.
    pub fn evaluate_application(
        &self,
        scenario_name: &str,
        application_id: &ApplicationId,
    ) -> Result<EvaluationResult, ScoringError> {
        let inputs = self.repository.load_inputs(application_id)?;
        self.evaluate(scenario_name, &inputs)
    }

    /// Stage a batch of raw inputs for an application ahead of scoring.
    /// Variable names are trimmed; entries with a blank name or value are
    /// skipped rather than stored. Returns the number of values written.
    pub fn record_inputs(
        &self,
        application_id: &ApplicationId,
        entries: Vec<InputEntry>,
    ) -> Result<usize, ScoringError> {
        let sanitized: Vec<InputEntry> = entries
            .into_iter()
            .filter_map(|entry| {
                let name = entry.var_name.trim();
                if name.is_empty() || entry.value.trim().is_empty() {
                    return None;
                }
                Some(InputEntry {
                    var_name: name.to_string(),
                    value: entry.value,
                })
            })
            .collect();

        if sanitized.is_empty() {
            return Ok(0);
        }
        Ok(self.repository.upsert_inputs(application_id, sanitized)?)
    }

    /// Drop every staged input for an application, returning how many existed.
    pub fn clear_inputs(&self, application_id: &ApplicationId) -> Result<usize, ScoringError> {
        Ok(self.repository.clear_inputs(application_id)?)
    }
}

/// Error raised by the scoring service.
#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error("scenario '{name}' not found")]
    ScenarioNotFound { name: String },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
