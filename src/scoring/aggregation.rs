use std::collections::BTreeMap;

use super::domain::{DetailRow, Scenario, Variable};
use super::matching::match_variable;

/// One running-total slot per module the scenario declares, so modules with no
/// matching variables still appear in the breakdown with value 0.
pub(crate) fn seed_totals(scenario: &Scenario) -> BTreeMap<String, f64> {
    scenario
        .modules
        .iter()
        .map(|config| (config.module.clone(), 0.0))
        .collect()
}

/// Fold one variable into its module total and append its audit rows.
///
/// The matched bin contributes `coefficient * woe * active`; a fallback match
/// keeps `active` false, so its configured WOE is evaluated but multiplied by
/// zero. Variables whose module the scenario does not declare are computed for
/// the audit trail but excluded from the running totals.
pub(crate) fn accumulate_variable(
    totals: &mut BTreeMap<String, f64>,
    details: &mut Vec<DetailRow>,
    variable: &Variable,
    raw: Option<&str>,
) {
    let outcome = match_variable(variable, raw);
    let recognized = totals.contains_key(&variable.module);
    let active_bin_id = outcome
        .bin
        .filter(|_| outcome.active)
        .map(|bin| bin.id);

    if let (Some(bin), true) = (outcome.bin, outcome.active) {
        if let Some(total) = totals.get_mut(&variable.module) {
            *total += variable.coefficient * bin.woe;
        }
    }

    for bin in &variable.bins {
        let active = active_bin_id == Some(bin.id);
        let flag = if active { 1.0 } else { 0.0 };
        details.push(DetailRow {
            variable: variable.name.clone(),
            module: variable.module.clone(),
            raw_value: raw.map(str::to_string),
            coefficient: variable.coefficient,
            bin_id: bin.id,
            bin: bin.kind.clone(),
            woe: bin.woe,
            active,
            contribution: variable.coefficient * bin.woe * flag,
            included_in_total: recognized && active,
        });
    }
}

/// Combine the module totals into the final log-odds:
/// `sum((total + intercept) * weight)` over scenario-declared modules, plus
/// the scenario calibration applied once.
pub(crate) fn fold_scenario(totals: &BTreeMap<String, f64>, scenario: &Scenario) -> f64 {
    let mut log_odds = 0.0;
    for (module, total) in totals {
        if let Some(config) = scenario.module_config(module) {
            log_odds += (total + config.intercept) * config.weight;
        }
    }
    log_odds + scenario.calibration
}

/// Standard logistic transform, no clamping.
pub(crate) fn probability_of_default(log_odds: f64) -> f64 {
    1.0 / (1.0 + (-log_odds).exp())
}
