use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::{SolverError, SolverResult, ensure_positive};
use crate::numeric::{self, norm2};
use crate::sim::spherical::coefficients::FluxCoefficients;
use crate::sim::spherical::grid::RadialGrid;

/// Linear solver used for each Newton correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinearSolver {
    /// Thomas algorithm on the tridiagonal Jacobian.
    #[default]
    Banded,
    /// Gaussian elimination on the assembled dense Jacobian.
    Dense,
}

/// Configuration for the spherical diffusion solver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SphericalDiffusionConfig {
    /// Newton iteration budget.
    pub max_iterations: usize,
    /// Convergence threshold on the residual 2-norm.
    pub tolerance: f64,
    /// Uniform initial concentration [mol/m^3].
    pub initial_concentration: f64,
    /// Specific surface area `Sa` [1/m].
    pub surface_area: f64,
    /// Surface reaction flux is `-flux_factor * Sa`.
    pub flux_factor: f64,
    /// Pseudo time step [s] of the single implicit step.
    pub pseudo_time_step: f64,
    pub linear_solver: LinearSolver,
    /// Ceiling on `ns`.
    pub max_control_volumes: u64,
}

impl Default for SphericalDiffusionConfig {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            tolerance: 1e-10,
            initial_concentration: 10000.0,
            surface_area: 3e5,
            flux_factor: 6.0,
            pseudo_time_step: 1.0,
            linear_solver: LinearSolver::Banded,
            max_control_volumes: 1_000_000,
        }
    }
}

impl SphericalDiffusionConfig {
    /// Imposed surface flux `j = -flux_factor * Sa`.
    pub fn surface_flux(&self) -> f64 {
        -self.surface_area * self.flux_factor
    }
}

/// Physical inputs of one solve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SphericalDiffusionParams {
    /// Solid-phase diffusivity [m^2/s].
    pub d: f64,
    /// Particle radius [m].
    pub r: f64,
    /// Number of non-surface control volumes.
    pub ns: usize,
}

/// Output of one solve.
#[derive(Debug, Clone, PartialEq)]
pub struct SphericalDiffusionResult {
    /// Node radii, center to surface (`ns + 1` values).
    pub radii: Vec<f64>,
    /// Concentration at each node (`ns + 1` values).
    pub concentration: Vec<f64>,
    /// Residual 2-norm of the last assembled system.
    pub residual_norm: f64,
    /// Residual 2-norm of every Newton iteration, in order.
    pub residual_history: Vec<f64>,
    pub iterations: usize,
    /// `false` when the budget ran out before `residual_norm < tolerance`.
    pub converged: bool,
}

/// Tridiagonal Jacobian. Row `ns` (the surface) couples only into `ns - 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct TridiagonalJacobian {
    /// Sub-diagonal (`lower[0]` unused).
    pub lower: Vec<f64>,
    pub diag: Vec<f64>,
    /// Super-diagonal (`upper[n-1]` unused).
    pub upper: Vec<f64>,
}

impl TridiagonalJacobian {
    fn zeros(n: usize) -> Self {
        Self {
            lower: vec![0.0; n],
            diag: vec![0.0; n],
            upper: vec![0.0; n],
        }
    }

    pub fn len(&self) -> usize {
        self.diag.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diag.is_empty()
    }

    pub fn to_dense(&self) -> Array2<f64> {
        let n = self.len();
        Array2::from_shape_fn((n, n), |(i, j)| {
            if i == j {
                self.diag[i]
            } else if j + 1 == i {
                self.lower[i]
            } else if i + 1 == j {
                self.upper[i]
            } else {
                0.0
            }
        })
    }
}

/// Working state of the Newton iteration.
#[derive(Debug, Clone)]
pub struct NewtonState {
    /// Current iterate.
    pub current: Vec<f64>,
    /// Concentration at the previous (fixed) time level.
    pub previous: Vec<f64>,
    pub residual: Vec<f64>,
    pub jacobian: TridiagonalJacobian,
}

impl NewtonState {
    fn uniform(n: usize, value: f64) -> Self {
        Self {
            current: vec![value; n],
            previous: vec![value; n],
            residual: vec![0.0; n],
            jacobian: TridiagonalJacobian::zeros(n),
        }
    }
}

/// Finite-volume solver for radial diffusion in a sphere with an imposed
/// surface reaction flux.
///
/// One implicit pseudo time step is taken from a uniform initial state; the
/// resulting algebraic system is driven to convergence by Newton iteration.
#[derive(Debug, Clone)]
pub struct SphericalDiffusionSolver {
    params: SphericalDiffusionParams,
    grid: RadialGrid,
    coefficients: FluxCoefficients,
    config: SphericalDiffusionConfig,
}

impl SphericalDiffusionSolver {
    /// Create a solver with the default configuration.
    pub fn new(params: SphericalDiffusionParams) -> SolverResult<Self> {
        Self::with_config(params, SphericalDiffusionConfig::default())
    }

    pub fn with_config(
        params: SphericalDiffusionParams,
        config: SphericalDiffusionConfig,
    ) -> SolverResult<Self> {
        ensure_positive("d", params.d)?;
        ensure_positive("r", params.r)?;
        ensure_positive("tolerance", config.tolerance)?;
        ensure_positive("initial_concentration", config.initial_concentration)?;
        if config.max_iterations == 0 {
            return Err(SolverError::invalid("max_iterations", "must be >= 1"));
        }

        if params.ns as u64 > config.max_control_volumes {
            return Err(SolverError::resource(
                "control volumes",
                params.ns as u64,
                config.max_control_volumes,
            ));
        }

        let grid = RadialGrid::new(params.r, params.ns)?;
        let coefficients = FluxCoefficients::new(
            &grid,
            params.d,
            config.pseudo_time_step,
            config.surface_area,
        )?;

        Ok(Self {
            params,
            grid,
            coefficients,
            config,
        })
    }

    pub fn grid(&self) -> &RadialGrid {
        &self.grid
    }

    pub fn coefficients(&self) -> &FluxCoefficients {
        &self.coefficients
    }

    pub fn config(&self) -> &SphericalDiffusionConfig {
        &self.config
    }

    /// Runs Newton iteration until the residual drops below the tolerance or
    /// the iteration budget is spent.
    pub fn solve(&self) -> SolverResult<SphericalDiffusionResult> {
        let n = self.params.ns + 1;
        let mut state = NewtonState::uniform(n, self.config.initial_concentration);
        let mut history = Vec::new();
        let mut residual_norm = f64::INFINITY;
        let mut converged = false;

        log::debug!(
            "Spherical diffusion solve: d={:e}, r={:e}, ns={}",
            self.params.d,
            self.params.r,
            self.params.ns
        );

        for _ in 0..self.config.max_iterations {
            self.assemble(&mut state);
            let delta = self.newton_step(&state)?;
            for (c, dc) in state.current.iter_mut().zip(&delta) {
                *c -= dc;
            }

            residual_norm = norm2(&state.residual);
            if !residual_norm.is_finite() {
                return Err(SolverError::invalid(
                    "d",
                    format!(
                        "residual became non-finite (d = {:e}, r = {:e}, ns = {})",
                        self.params.d, self.params.r, self.params.ns
                    ),
                ));
            }
            history.push(residual_norm);
            if residual_norm < self.config.tolerance {
                converged = true;
                break;
            }
        }

        if converged {
            log::debug!(
                "Spherical diffusion converged in {} iterations (residual {:e})",
                history.len(),
                residual_norm
            );
        } else {
            log::warn!(
                "Spherical diffusion did not converge in {} iterations (residual {:e} >= {:e})",
                self.config.max_iterations,
                residual_norm,
                self.config.tolerance
            );
        }

        Ok(SphericalDiffusionResult {
            radii: self.grid.nodes().to_vec(),
            concentration: state.current,
            residual_norm,
            iterations: history.len(),
            residual_history: history,
            converged,
        })
    }

    /// Fills the residual and Jacobian for the current iterate against the
    /// fixed previous time level.
    fn assemble(&self, state: &mut NewtonState) {
        let ns = self.params.ns;
        let co = &self.coefficients;
        let cs = &state.previous;
        let it = &state.current;
        let f = &mut state.residual;
        let jac = &mut state.jacobian;

        // Center: east neighbor only (the west face has zero area)
        jac.diag[0] = 1.0;
        jac.upper[0] = -co.east[0];
        f[0] = it[0] - co.east[0] * it[1] - co.transient[0] * cs[0];

        for i in 1..ns {
            jac.lower[i] = -co.west[i];
            jac.diag[i] = 1.0;
            jac.upper[i] = -co.east[i];
            f[i] = -co.west[i] * it[i - 1] + it[i] - co.east[i] * it[i + 1]
                - co.transient[i] * cs[i];
        }

        // Surface: west neighbor plus the imposed reaction flux
        jac.lower[ns] = -co.surface_west;
        jac.diag[ns] = 1.0;
        f[ns] = -co.surface_west * it[ns - 1] + it[ns] - co.surface_transient * cs[ns]
            + co.surface_scale * self.config.surface_flux();
    }

    /// Solves `J · Δ = f` for the Newton correction.
    fn newton_step(&self, state: &NewtonState) -> SolverResult<Vec<f64>> {
        let jac = &state.jacobian;
        let solved = match self.config.linear_solver {
            LinearSolver::Banded => numeric::thomas_solve(
                &jac.lower,
                &mut jac.diag.clone(),
                &jac.upper,
                &mut state.residual.clone(),
            ),
            LinearSolver::Dense => numeric::solve_dense(&jac.to_dense(), &state.residual),
        };
        solved.map_err(|e| {
            SolverError::invalid(
                "d",
                format!(
                    "Jacobian solve failed: {e} (d = {:e}, r = {:e}, ns = {})",
                    self.params.d, self.params.r, self.params.ns
                ),
            )
        })
    }
}

/// Solves spherical diffusion with the default configuration.
pub fn solve(d: f64, r: f64, ns: usize) -> SolverResult<SphericalDiffusionResult> {
    SphericalDiffusionSolver::new(SphericalDiffusionParams { d, r, ns })?.solve()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_particle_converges() {
        let res = solve(1e-12, 5e-6, 100).unwrap();
        assert_eq!(res.radii.len(), 101);
        assert_eq!(res.concentration.len(), 101);
        assert!(res.converged, "residual = {}", res.residual_norm);
        assert!(res.residual_norm < 1e-10);
        assert!(res.iterations <= 1000);
    }

    #[test]
    fn test_surface_flux_raises_surface_concentration() {
        // j < 0 enters with a positive sign on the surface row, pushing the
        // surface concentration above the initial value.
        let res = solve(1e-12, 5e-6, 100).unwrap();
        let c = &res.concentration;
        assert!(c[100] > c[0], "surface {} vs center {}", c[100], c[0]);
        assert!(
            c.windows(2).all(|w| w[1] >= w[0]),
            "profile should increase from center to surface"
        );
    }

    #[test]
    fn test_single_volume_grid() {
        let res = solve(1e-12, 5e-6, 1).unwrap();
        assert_eq!(res.concentration.len(), 2);
        assert!(res.concentration.iter().all(|c| c.is_finite()));
        assert!(res.converged);
    }

    #[test]
    fn test_repeated_solves_are_bit_identical() {
        let a = solve(3e-13, 2e-6, 40).unwrap();
        let b = solve(3e-13, 2e-6, 40).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_dense_and_banded_agree() {
        let params = SphericalDiffusionParams {
            d: 1e-12,
            r: 5e-6,
            ns: 30,
        };
        let banded = SphericalDiffusionSolver::new(params).unwrap().solve().unwrap();
        let dense = SphericalDiffusionSolver::with_config(
            params,
            SphericalDiffusionConfig {
                linear_solver: LinearSolver::Dense,
                ..Default::default()
            },
        )
        .unwrap()
        .solve()
        .unwrap();
        assert!(dense.converged);
        for (a, b) in banded.concentration.iter().zip(&dense.concentration) {
            assert!((a - b).abs() < 1e-8, "banded={a}, dense={b}");
        }
    }

    #[test]
    fn test_exhausted_budget_is_not_an_error() {
        let res = SphericalDiffusionSolver::with_config(
            SphericalDiffusionParams {
                d: 1e-12,
                r: 5e-6,
                ns: 20,
            },
            SphericalDiffusionConfig {
                max_iterations: 1,
                ..Default::default()
            },
        )
        .unwrap()
        .solve()
        .unwrap();
        assert!(!res.converged);
        assert_eq!(res.iterations, 1);
        assert!(res.residual_norm >= 1e-10);
        assert!(res.concentration.iter().all(|c| c.is_finite()));
    }

    #[test]
    fn test_oversized_grid_is_a_resource_error() {
        let params = |ns| SphericalDiffusionParams { d: 1e-12, r: 5e-6, ns };
        let err = SphericalDiffusionSolver::new(params(usize::MAX)).unwrap_err();
        assert!(matches!(
            err,
            SolverError::ResourceLimit { limit: 1_000_000, .. }
        ));
        let small = SphericalDiffusionConfig {
            max_control_volumes: 10,
            ..Default::default()
        };
        assert!(SphericalDiffusionSolver::with_config(params(10), small).is_ok());
        let err = SphericalDiffusionSolver::with_config(params(11), small).unwrap_err();
        assert!(matches!(err, SolverError::ResourceLimit { requested: 11, limit: 10, .. }));
    }

    #[test]
    fn test_residual_decreases() {
        let res = solve(1e-14, 1e-5, 50).unwrap();
        assert!(res.residual_history.len() >= 2);
        assert!(res.residual_history.windows(2).all(|w| w[1] <= w[0]));
    }

    #[test]
    fn test_invalid_inputs_name_the_parameter() {
        let err = solve(-1.0, 5e-6, 10).unwrap_err();
        assert!(matches!(err, SolverError::InvalidInput { ref parameter, .. } if parameter == "d"));
        let err = solve(1e-12, 0.0, 10).unwrap_err();
        assert!(matches!(err, SolverError::InvalidInput { ref parameter, .. } if parameter == "r"));
        let err = solve(1e-12, 5e-6, 0).unwrap_err();
        assert!(matches!(err, SolverError::InvalidInput { ref parameter, .. } if parameter == "ns"));
    }
}
