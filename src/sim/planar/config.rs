use serde::{Deserialize, Serialize};

use crate::error::{SolverError, SolverResult, ensure_positive};

/// Physical inputs of a planar diffusion run over the unit square.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanarDiffusionParams {
    pub nx: usize,
    pub ny: usize,
    /// Requested time step; reduced to the stability bound when too large.
    pub dt: f64,
    /// Diffusion coefficient.
    pub d: f64,
    /// Simulated duration.
    pub t_max: f64,
}

/// Limits and tuning for the planar solver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanarDiffusionConfig {
    /// Fraction of the explicit stability bound used when clamping `dt`.
    pub stability_factor: f64,
    /// Ceiling on the derived number of time steps.
    pub max_steps: u64,
    /// Ceiling on `nx * ny`.
    pub max_cells: u64,
    /// Ceiling on the stored frame values `nx * ny * 3 * nt`.
    pub max_frame_values: u64,
}

impl Default for PlanarDiffusionConfig {
    fn default() -> Self {
        Self {
            stability_factor: 0.9,
            max_steps: 100_000,
            max_cells: 4_000_000,
            max_frame_values: 500_000_000,
        }
    }
}

/// Effective stepping derived from the inputs and the stability bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepPlan {
    pub nx: usize,
    pub ny: usize,
    /// Grid spacing `1 / nx` (used in both directions).
    pub dx: f64,
    /// Explicit stability bound `dx² / (4 d)`.
    pub dt_max: f64,
    /// Time step actually used.
    pub dt: f64,
    /// Number of steps `floor(t_max / dt)`.
    pub nt: usize,
}

impl StepPlan {
    /// Validates the inputs, clamps `dt` and enforces the resource ceilings
    /// before any frame storage is allocated.
    pub fn new(params: &PlanarDiffusionParams, config: &PlanarDiffusionConfig) -> SolverResult<Self> {
        if params.nx < 3 {
            return Err(SolverError::invalid("nx", format!("must be >= 3, got {}", params.nx)));
        }
        if params.ny < 3 {
            return Err(SolverError::invalid("ny", format!("must be >= 3, got {}", params.ny)));
        }
        ensure_positive("dt", params.dt)?;
        ensure_positive("d", params.d)?;
        ensure_positive("t_max", params.t_max)?;
        ensure_positive("stability_factor", config.stability_factor)?;

        let cells = (params.nx as u64).saturating_mul(params.ny as u64);
        if cells > config.max_cells {
            return Err(SolverError::resource("grid cells", cells, config.max_cells));
        }

        let dx = 1.0 / params.nx as f64;
        let dt_max = dx * dx / (4.0 * params.d);
        let dt = (config.stability_factor * dt_max).min(params.dt);
        if dt.is_nan() || dt <= 0.0 {
            return Err(SolverError::invalid(
                "d",
                format!("stable time step underflows to {dt} for d = {}", params.d),
            ));
        }

        let steps = (params.t_max / dt).floor();
        if !steps.is_finite() || steps > config.max_steps as f64 {
            let requested = if steps.is_finite() { steps as u64 } else { u64::MAX };
            return Err(SolverError::resource("time steps", requested, config.max_steps));
        }
        let nt = steps as usize;

        let values = cells.saturating_mul(3).saturating_mul(nt as u64);
        if values > config.max_frame_values {
            return Err(SolverError::resource(
                "frame values",
                values,
                config.max_frame_values,
            ));
        }

        Ok(Self {
            nx: params.nx,
            ny: params.ny,
            dx,
            dt_max,
            dt,
            nt,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(nx: usize, ny: usize, dt: f64, d: f64, t_max: f64) -> PlanarDiffusionParams {
        PlanarDiffusionParams { nx, ny, dt, d, t_max }
    }

    #[test]
    fn test_dt_is_clamped_to_stability_bound() {
        let plan = StepPlan::new(&params(10, 10, 1.0, 1.0, 0.01), &Default::default()).unwrap();
        assert!((plan.dt_max - 0.0025).abs() < 1e-15);
        assert!(plan.dt < plan.dt_max);
        assert!((plan.dt - 0.00225).abs() < 1e-15);
        assert_eq!(plan.nt, 4);
    }

    #[test]
    fn test_small_dt_is_kept() {
        let plan = StepPlan::new(&params(10, 10, 1e-4, 1.0, 0.01), &Default::default()).unwrap();
        assert_eq!(plan.dt, 1e-4);
        assert_eq!(plan.nt, (0.01_f64 / 1e-4).floor() as usize);
    }

    #[test]
    fn test_step_ceiling_fails_fast() {
        let config = PlanarDiffusionConfig {
            max_steps: 10,
            ..Default::default()
        };
        let err = StepPlan::new(&params(10, 10, 1.0, 1.0, 1.0), &config).unwrap_err();
        assert!(matches!(err, SolverError::ResourceLimit { .. }), "{err}");
    }

    #[test]
    fn test_unbounded_ratio_is_a_resource_error() {
        let err = StepPlan::new(&params(10, 10, 1.0, 1.0, f64::MAX), &Default::default()).unwrap_err();
        assert!(matches!(err, SolverError::ResourceLimit { .. }));
    }

    #[test]
    fn test_cell_and_frame_ceilings() {
        let config = PlanarDiffusionConfig {
            max_cells: 50,
            ..Default::default()
        };
        assert!(matches!(
            StepPlan::new(&params(10, 10, 1.0, 1.0, 0.01), &config),
            Err(SolverError::ResourceLimit { .. })
        ));

        let config = PlanarDiffusionConfig {
            max_frame_values: 100,
            ..Default::default()
        };
        assert!(matches!(
            StepPlan::new(&params(10, 10, 1.0, 1.0, 0.01), &config),
            Err(SolverError::ResourceLimit { .. })
        ));
    }

    #[test]
    fn test_rejects_small_grids_and_bad_scalars() {
        let config = PlanarDiffusionConfig::default();
        assert!(StepPlan::new(&params(2, 10, 1.0, 1.0, 0.01), &config).is_err());
        assert!(StepPlan::new(&params(10, 2, 1.0, 1.0, 0.01), &config).is_err());
        assert!(StepPlan::new(&params(10, 10, 0.0, 1.0, 0.01), &config).is_err());
        assert!(StepPlan::new(&params(10, 10, 1.0, -1.0, 0.01), &config).is_err());
        assert!(StepPlan::new(&params(10, 10, 1.0, 1.0, 0.0), &config).is_err());
    }
}
