use crate::error::{SolverError, SolverResult, ensure_positive};
use crate::numeric::linspace;

/// Node-centered radial grid over a sphere of radius `R`.
///
/// There are `ns + 1` nodes from the center to the surface. Control-volume
/// faces sit on a finer lattice of `2ns + 2` points with constant spacing
/// `δr = R / (2ns + 1)`.
#[derive(Debug, Clone, PartialEq)]
pub struct RadialGrid {
    radius: f64,
    ns: usize,
    spacing: f64,
    /// Node radii, `ns + 1` values from 0 to R.
    nodes: Vec<f64>,
    /// Control-volume boundary lattice, `2ns + 2` values from 0 to R.
    boundaries: Vec<f64>,
    /// Inner face radius of each non-surface control volume (`ns` values).
    west_faces: Vec<f64>,
    /// Outer face radius of each non-surface control volume (`ns` values).
    east_faces: Vec<f64>,
}

impl RadialGrid {
    pub fn new(radius: f64, ns: usize) -> SolverResult<Self> {
        ensure_positive("r", radius)?;
        if ns < 1 {
            return Err(SolverError::invalid("ns", "must be >= 1"));
        }

        // Face lattice holds 2ns + 2 points.
        let lattice = ns
            .checked_mul(2)
            .and_then(|n| n.checked_add(2))
            .ok_or_else(|| {
                SolverError::resource("control volumes", ns as u64, (usize::MAX / 2 - 1) as u64)
            })?;
        let spacing = radius / (lattice - 1) as f64;
        if spacing <= 0.0 || !spacing.is_finite() {
            return Err(SolverError::invalid(
                "r",
                format!("radius {radius} too small for {ns} control volumes"),
            ));
        }
        let nodes = linspace(0.0, radius, ns + 1);
        let boundaries = linspace(0.0, radius, lattice);
        let east_faces = linspace(2.0 * spacing, radius - spacing, ns);
        let mut west_faces = linspace(0.0, radius - spacing, ns + 1);
        // The last lattice point is the surface volume's inner face.
        west_faces.truncate(ns);

        Ok(Self {
            radius,
            ns,
            spacing,
            nodes,
            boundaries,
            west_faces,
            east_faces,
        })
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn ns(&self) -> usize {
        self.ns
    }

    /// Face lattice spacing `δr`.
    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    pub fn nodes(&self) -> &[f64] {
        &self.nodes
    }

    pub fn boundaries(&self) -> &[f64] {
        &self.boundaries
    }

    pub fn west_faces(&self) -> &[f64] {
        &self.west_faces
    }

    pub fn east_faces(&self) -> &[f64] {
        &self.east_faces
    }

    /// Inner face radius of the surface control volume, `R - δr`.
    pub fn surface_inner_face(&self) -> f64 {
        self.radius - self.spacing
    }

    /// Volume (per steradian) of control volume `k < ns`: `(r_e³ - r_w³) / 3`.
    pub fn volume(&self, k: usize) -> f64 {
        (self.east_faces[k].powi(3) - self.west_faces[k].powi(3)) / 3.0
    }

    /// Volume (per steradian) of the surface control volume.
    pub fn surface_volume(&self) -> f64 {
        (self.radius.powi(3) - self.surface_inner_face().powi(3)) / 3.0
    }
}
