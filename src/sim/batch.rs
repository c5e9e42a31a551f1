//! Parallel execution of many spherical diffusion solves.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::SolverResult;
use crate::sim::spherical::{
    SphericalDiffusionConfig, SphericalDiffusionParams, SphericalDiffusionResult,
    SphericalDiffusionSolver, temperature_influenced,
};

/// One row of a batch: solver inputs plus the temperature switch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatchCase {
    pub d: f64,
    pub r: f64,
    pub ns: usize,
    /// Apply the Arrhenius correction to `d` before solving.
    #[serde(default)]
    pub temp_influenced: bool,
}

impl BatchCase {
    /// Diffusivity actually passed to the solver.
    pub fn effective_d(&self) -> SolverResult<f64> {
        if self.temp_influenced {
            temperature_influenced(self.d)
        } else {
            Ok(self.d)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome {
    pub case: BatchCase,
    pub effective_d: f64,
    pub result: SphericalDiffusionResult,
}

/// Solves all cases in parallel. Outcomes come back in input order; any
/// failing case fails the whole batch.
pub fn run_batch(cases: &[BatchCase]) -> SolverResult<Vec<BatchOutcome>> {
    run_batch_with_config(cases, SphericalDiffusionConfig::default())
}

pub fn run_batch_with_config(
    cases: &[BatchCase],
    config: SphericalDiffusionConfig,
) -> SolverResult<Vec<BatchOutcome>> {
    log::debug!("Batch: {} spherical solves", cases.len());
    let outcomes = cases
        .par_iter()
        .map(|case| -> SolverResult<BatchOutcome> {
            let effective_d = case.effective_d()?;
            let params = SphericalDiffusionParams {
                d: effective_d,
                r: case.r,
                ns: case.ns,
            };
            let result = SphericalDiffusionSolver::with_config(params, config)?.solve()?;
            Ok(BatchOutcome {
                case: *case,
                effective_d,
                result,
            })
        })
        .collect::<SolverResult<Vec<_>>>()?;

    let unconverged = outcomes.iter().filter(|o| !o.result.converged).count();
    if unconverged > 0 {
        log::warn!("Batch: {unconverged} of {} solves did not converge", outcomes.len());
    }
    Ok(outcomes)
}
