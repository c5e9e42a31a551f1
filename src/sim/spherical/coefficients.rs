use crate::error::{SolverError, SolverResult, ensure_positive};
use crate::sim::spherical::grid::RadialGrid;

/// Faraday constant [C/mol].
pub const FARADAY: f64 = 96485.0;

/// Normalized finite-volume flux coefficients for one solve.
///
/// For every non-surface control volume `k` the transient, west and east
/// weights sum to one:
///
/// ```text
/// a_t = ΔV_k / dt      a_w = r_w² D / (2 δr)      a_e = r_e² D / (2 δr)
/// ā_x = a_x / (a_t + a_w + a_e)
/// ```
///
/// The surface volume only has a west neighbor; its imposed flux enters
/// through `surface_scale = R² / ((a_tn + a_wn) · Sa · F)`.
#[derive(Debug, Clone, PartialEq)]
pub struct FluxCoefficients {
    pub transient: Vec<f64>,
    pub west: Vec<f64>,
    pub east: Vec<f64>,
    pub surface_transient: f64,
    pub surface_west: f64,
    pub surface_scale: f64,
}

impl FluxCoefficients {
    /// Derives the coefficients from the grid, diffusivity `d` [m²/s],
    /// pseudo time step `dt` [s] and specific surface area `surface_area` [1/m].
    pub fn new(
        grid: &RadialGrid,
        d: f64,
        dt: f64,
        surface_area: f64,
    ) -> SolverResult<Self> {
        ensure_positive("d", d)?;
        ensure_positive("dt", dt)?;
        ensure_positive("surface_area", surface_area)?;

        let ns = grid.ns();
        let two_dr = 2.0 * grid.spacing();

        let mut transient = Vec::with_capacity(ns);
        let mut west = Vec::with_capacity(ns);
        let mut east = Vec::with_capacity(ns);

        for k in 0..ns {
            let a_t = grid.volume(k) / dt;
            let a_w = grid.west_faces()[k].powi(2) * d / two_dr;
            let a_e = grid.east_faces()[k].powi(2) * d / two_dr;
            let total = checked_total(k, a_t + a_w + a_e, d, grid.radius())?;
            transient.push(a_t / total);
            west.push(a_w / total);
            east.push(a_e / total);
        }

        let a_tn = grid.surface_volume() / dt;
        let a_wn = grid.surface_inner_face().powi(2) * d / two_dr;
        let total = checked_total(ns, a_tn + a_wn, d, grid.radius())?;
        let surface_scale = grid.radius().powi(2) / (total * surface_area * FARADAY);
        if !surface_scale.is_finite() {
            return Err(SolverError::invalid(
                "r",
                format!("surface flux scale is not finite for r = {}", grid.radius()),
            ));
        }

        Ok(Self {
            transient,
            west,
            east,
            surface_transient: a_tn / total,
            surface_west: a_wn / total,
            surface_scale,
        })
    }

    pub fn len(&self) -> usize {
        self.transient.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transient.is_empty()
    }
}

/// The normalization denominator must be positive and finite.
fn checked_total(row: usize, total: f64, d: f64, r: f64) -> SolverResult<f64> {
    if total > 0.0 && total.is_finite() {
        return Ok(total);
    }
    // Underflow points at a tiny radius, overflow at an extreme diffusivity.
    let parameter = if total.is_finite() { "r" } else { "d" };
    Err(SolverError::invalid(
        parameter,
        format!(
            "flux coefficient normalization at row {row} is {total} (d = {d}, r = {r}); \
             expected a finite value > 0"
        ),
    ))
}
