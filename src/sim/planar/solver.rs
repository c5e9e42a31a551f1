use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{SolverError, SolverResult};
use crate::sim::planar::colormap::{RgbFrame, render_frame};
use crate::sim::planar::config::{PlanarDiffusionConfig, PlanarDiffusionParams, StepPlan};
use crate::sim::planar::field::Field2D;

/// Output of a planar run.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanarDiffusionResult {
    /// One frame per step, in order.
    pub frames: Vec<RgbFrame>,
    /// Number of steps taken (equals `frames.len()`).
    pub nt: usize,
    pub nx: usize,
    pub ny: usize,
    /// Time step actually used after stability clamping.
    pub dt: f64,
    /// Explicit stability bound for the grid.
    pub dt_max: f64,
}

/// Explicit finite-difference solver for 2-D diffusion of a step profile.
#[derive(Debug, Clone)]
pub struct PlanarDiffusionSolver {
    params: PlanarDiffusionParams,
    plan: StepPlan,
}

impl PlanarDiffusionSolver {
    pub fn new(params: PlanarDiffusionParams) -> SolverResult<Self> {
        Self::with_config(params, PlanarDiffusionConfig::default())
    }

    pub fn with_config(
        params: PlanarDiffusionParams,
        config: PlanarDiffusionConfig,
    ) -> SolverResult<Self> {
        let plan = StepPlan::new(&params, &config)?;
        if plan.dt < params.dt {
            log::info!(
                "Planar diffusion: dt reduced from {:e} to {:e} (stability bound {:e})",
                params.dt,
                plan.dt,
                plan.dt_max
            );
        }
        Ok(Self { params, plan })
    }

    pub fn plan(&self) -> &StepPlan {
        &self.plan
    }

    pub fn solve(&self) -> SolverResult<PlanarDiffusionResult> {
        self.solve_with_cancel(&AtomicBool::new(false))
    }

    /// Like [`Self::solve`], but checks `cancel` before every step and fails
    /// with [`SolverError::Cancelled`] once it is set.
    pub fn solve_with_cancel(&self, cancel: &AtomicBool) -> SolverResult<PlanarDiffusionResult> {
        let StepPlan { nx, ny, dt, nt, .. } = self.plan;
        log::debug!("Planar diffusion: nx={nx}, ny={ny}, dt={dt:e}, nt={nt}");

        let mut field = Field2D::step_function(nx, ny);
        let mut frames = Vec::with_capacity(nt);
        for step in 0..nt {
            if cancel.load(Ordering::Relaxed) {
                return Err(SolverError::Cancelled { step });
            }
            field.step(self.params.d, dt);
            frames.push(render_frame(&field));
            if step % 100 == 0 {
                log::debug!("Planar diffusion step {step}: max |u| = {:.3}", field.max_abs());
            }
        }

        Ok(PlanarDiffusionResult {
            frames,
            nt,
            nx,
            ny,
            dt,
            dt_max: self.plan.dt_max,
        })
    }
}

/// Runs a planar diffusion solve with the default limits.
pub fn solve(nx: usize, ny: usize, dt: f64, d: f64, t_max: f64) -> SolverResult<PlanarDiffusionResult> {
    PlanarDiffusionSolver::new(PlanarDiffusionParams { nx, ny, dt, d, t_max })?.solve()
}
