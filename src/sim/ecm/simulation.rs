use serde::{Deserialize, Serialize};

use crate::error::{SolverError, SolverResult, ensure_finite, ensure_positive};
use crate::numeric::linspace;
use crate::sim::ecm::parameters::{EcmCurves, EcmParameters, R0Selection};
use crate::sim::interpolation::InterpolationMethod;

/// Configuration for the ECM simulator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EcmConfig {
    /// Capacity used by the SOC update, regardless of the requested one.
    pub nominal_capacity: f64,
    /// The run stops once the terminal voltage reaches this value [V].
    pub cutoff_voltage: f64,
    pub r0_selection: R0Selection,
    /// Ceiling on `ceil(t_tot / dt)`.
    pub max_steps: u64,
}

impl Default for EcmConfig {
    fn default() -> Self {
        Self {
            nominal_capacity: 130.0,
            cutoff_voltage: 4.0,
            r0_selection: R0Selection::Charge,
            max_steps: 10_000_000,
        }
    }
}

/// Inputs of one ECM run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EcmInput {
    /// Simulated duration [s].
    pub t_tot: f64,
    /// Time step [s].
    pub dt: f64,
    /// Requested capacity. Replaced by [`EcmConfig::nominal_capacity`].
    pub capacity: f64,
    /// Initial state of charge.
    pub soc_0: f64,
    /// Applied current [A], positive while charging.
    pub i_app: f64,
    #[serde(default)]
    pub interpolation: InterpolationMethod,
    /// Optional `(SOC, OCV)` rows replacing the reference curve.
    #[serde(default)]
    pub ocv_curve: Option<Vec<Vec<f64>>>,
}

/// Circuit state between two steps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EcmState {
    pub soc: f64,
    /// Voltage over the fast RC branch.
    pub u1: f64,
    /// Voltage over the slow RC branch.
    pub u2: f64,
    /// Terminal voltage of the last step.
    pub vt: f64,
    pub t: f64,
}

/// Sampled output. All four series have the same length.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EcmResult {
    pub t_table: Vec<f64>,
    pub vt: Vec<f64>,
    /// SOC after each step.
    pub soc: Vec<f64>,
    /// OCV looked up at the start of each step.
    pub ocv: Vec<f64>,
    /// `true` when the cutoff voltage stopped the run.
    pub terminated_early: bool,
}

impl EcmResult {
    pub fn len(&self) -> usize {
        self.t_table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t_table.is_empty()
    }

    fn truncate(&mut self, n: usize) {
        self.t_table.truncate(n);
        self.vt.truncate(n);
        self.soc.truncate(n);
        self.ocv.truncate(n);
    }
}

/// Time-stepping simulator of the 2-RC equivalent circuit.
#[derive(Debug, Clone)]
pub struct EcmSimulation {
    input: EcmInput,
    config: EcmConfig,
    curves: EcmCurves,
    nt: usize,
}

impl EcmSimulation {
    pub fn new(input: EcmInput) -> SolverResult<Self> {
        Self::with_config(input, EcmConfig::default())
    }

    pub fn with_config(input: EcmInput, config: EcmConfig) -> SolverResult<Self> {
        ensure_positive("t_tot", input.t_tot)?;
        ensure_positive("dt", input.dt)?;
        ensure_finite("soc_0", input.soc_0)?;
        ensure_finite("i_app", input.i_app)?;
        ensure_positive("nominal_capacity", config.nominal_capacity)?;

        let steps = (input.t_tot / input.dt).ceil();
        if !steps.is_finite() || steps > config.max_steps as f64 {
            let requested = if steps.is_finite() { steps as u64 } else { u64::MAX };
            return Err(SolverError::resource("ECM time steps", requested, config.max_steps));
        }
        let nt = steps as usize;

        if input.capacity != config.nominal_capacity {
            log::warn!(
                "ECM: requested capacity {} replaced by nominal capacity {}",
                input.capacity,
                config.nominal_capacity
            );
        }

        let mut params = EcmParameters::builtin()?;
        if let Some(rows) = &input.ocv_curve {
            params = params.with_ocv_rows(rows)?;
        }
        let curves = EcmCurves::new(&params, input.interpolation, config.r0_selection, input.i_app)?;

        Ok(Self {
            input,
            config,
            curves,
            nt,
        })
    }

    /// Number of steps `ceil(t_tot / dt)` without early termination.
    pub fn nt(&self) -> usize {
        self.nt
    }

    pub fn initial_state(&self) -> EcmState {
        EcmState {
            soc: self.input.soc_0,
            u1: 0.0,
            u2: 0.0,
            vt: self.curves.at(self.input.soc_0).ocv,
            t: 0.0,
        }
    }

    /// Advances `state` by one step and returns the OCV used for it.
    pub fn step(&self, state: &mut EcmState) -> SolverResult<f64> {
        let EcmInput { dt, i_app, .. } = self.input;
        let p = self.curves.at(state.soc);

        // Extrapolated tables may give a negative time constant; only a zero
        // or non-finite one is unusable.
        let tau1 = p.r1 * p.c1;
        let tau2 = p.r2 * p.c2;
        for tau in [tau1, tau2] {
            if tau == 0.0 || !tau.is_finite() {
                return Err(SolverError::invalid(
                    "i_app",
                    format!("RC time constant {tau:e} at SOC {:.4} is unusable", state.soc),
                ));
            }
        }

        let decay1 = (-dt / tau1).exp();
        let decay2 = (-dt / tau2).exp();
        state.u1 = state.u1 * decay1 + i_app * p.r1 * (1.0 - decay1);
        state.u2 = state.u2 * decay2 + i_app * p.r2 * (1.0 - decay2);
        state.vt = state.u1 + state.u2 + p.ocv;
        if !state.vt.is_finite() {
            return Err(SolverError::invalid(
                "ocv_curve",
                format!("terminal voltage is not finite at SOC {:.4}", state.soc),
            ));
        }

        state.soc += (dt / self.config.nominal_capacity) * i_app + p.r0 * i_app;
        state.t += dt;
        Ok(p.ocv)
    }

    pub fn run(&self) -> SolverResult<EcmResult> {
        let nt = self.nt;
        log::debug!(
            "ECM: t_tot={}, dt={}, soc_0={}, i_app={}, method={}, nt={nt}",
            self.input.t_tot,
            self.input.dt,
            self.input.soc_0,
            self.input.i_app,
            self.input.interpolation
        );

        let mut result = EcmResult {
            t_table: linspace(0.0, self.input.t_tot, nt),
            vt: Vec::with_capacity(nt),
            soc: Vec::with_capacity(nt),
            ocv: Vec::with_capacity(nt),
            terminated_early: false,
        };

        let mut state = self.initial_state();
        for i in 0..nt {
            let ocv = self.step(&mut state)?;
            result.vt.push(state.vt);
            result.soc.push(state.soc);
            result.ocv.push(ocv);

            if state.vt >= self.config.cutoff_voltage {
                // The triggering step is not part of the output
                result.truncate(i);
                result.terminated_early = true;
                log::info!(
                    "ECM: cutoff {} V reached at step {i} of {nt} (t = {:.3} s)",
                    self.config.cutoff_voltage,
                    state.t
                );
                return Ok(result);
            }
        }

        log::info!("ECM: completed {nt} steps, final SOC {:.4}", state.soc);
        Ok(result)
    }
}

/// Runs the ECM simulator with the default configuration.
///
/// `interpolation_choice` must be `linear`, `cubic` or `nearest`.
pub fn simulate(
    t_tot: f64,
    dt: f64,
    capacity: f64,
    soc_0: f64,
    i_app: f64,
    interpolation_choice: &str,
    ocv_curve: Option<Vec<Vec<f64>>>,
) -> SolverResult<EcmResult> {
    let input = EcmInput {
        t_tot,
        dt,
        capacity,
        soc_0,
        i_app,
        interpolation: interpolation_choice.parse()?,
        ocv_curve,
    };
    EcmSimulation::new(input)?.run()
}
