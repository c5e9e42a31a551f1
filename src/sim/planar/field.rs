use ndarray::Array2;

/// Scalar field on an `nx × ny` grid over the unit square, clamped to `[-1, 1]`.
///
/// Edge rows and columns are never updated.
#[derive(Debug, Clone, PartialEq)]
pub struct Field2D {
    u: Array2<f64>,
    dx: f64,
}

impl Field2D {
    /// Step initial condition: `+1` for `j >= ny / 2`, `-1` below.
    pub fn step_function(nx: usize, ny: usize) -> Self {
        let half = ny / 2;
        let u = Array2::from_shape_fn((nx, ny), |(_, j)| if j >= half { 1.0 } else { -1.0 });
        Self {
            u,
            dx: 1.0 / nx as f64,
        }
    }

    pub fn from_array(u: Array2<f64>) -> Self {
        let nx = u.nrows();
        Self {
            u: u.mapv(|v| v.clamp(-1.0, 1.0)),
            dx: 1.0 / nx as f64,
        }
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.u
    }

    pub fn dim(&self) -> (usize, usize) {
        self.u.dim()
    }

    pub fn dx(&self) -> f64 {
        self.dx
    }

    /// Five-point discrete Laplacian at an interior cell.
    pub fn laplacian(&self, i: usize, j: usize) -> f64 {
        let u = &self.u;
        let dx2 = self.dx * self.dx;
        (u[[i + 1, j]] - 2.0 * u[[i, j]] + u[[i - 1, j]]) / dx2
            + (u[[i, j + 1]] - 2.0 * u[[i, j]] + u[[i, j - 1]]) / dx2
    }

    /// Advances one explicit step. Every cell reads the old field.
    pub fn step(&mut self, d: f64, dt: f64) {
        let (nx, ny) = self.u.dim();
        let mut next = self.u.clone();
        for i in 1..nx - 1 {
            for j in 1..ny - 1 {
                let v = self.u[[i, j]] + d * dt * self.laplacian(i, j);
                next[[i, j]] = v.clamp(-1.0, 1.0);
            }
        }
        self.u = next;
    }

    /// `max |u|` over the grid.
    pub fn max_abs(&self) -> f64 {
        self.u.iter().fold(0.0_f64, |m, v| m.max(v.abs()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_function_initial_condition() {
        let f = Field2D::step_function(4, 5);
        let u = f.values();
        for i in 0..4 {
            assert_eq!(u[[i, 0]], -1.0);
            assert_eq!(u[[i, 1]], -1.0);
            assert_eq!(u[[i, 2]], 1.0);
            assert_eq!(u[[i, 4]], 1.0);
        }
    }

    #[test]
    fn test_boundaries_are_frozen() {
        let mut f = Field2D::step_function(6, 6);
        let before = f.values().clone();
        for _ in 0..5 {
            f.step(1.0, 0.9 * (1.0 / 36.0) / 4.0);
        }
        let after = f.values();
        for i in 0..6 {
            assert_eq!(after[[i, 0]], before[[i, 0]]);
            assert_eq!(after[[i, 5]], before[[i, 5]]);
        }
        for j in 0..6 {
            assert_eq!(after[[0, j]], before[[0, j]]);
            assert_eq!(after[[5, j]], before[[5, j]]);
        }
    }

    #[test]
    fn test_interface_smooths() {
        let mut f = Field2D::step_function(8, 8);
        f.step(1.0, 0.9 / 256.0);
        let u = f.values();
        // Cells on both sides of the interface move toward zero
        assert!(u[[4, 3]] > -1.0 && u[[4, 3]] < 0.0, "u = {}", u[[4, 3]]);
        assert!(u[[4, 4]] < 1.0 && u[[4, 4]] > 0.0, "u = {}", u[[4, 4]]);
    }

    #[test]
    fn test_clamp_holds_for_unstable_step() {
        let mut f = Field2D::step_function(8, 8);
        // Far above the stability bound
        for _ in 0..10 {
            f.step(1.0, 1.0);
            assert!(f.max_abs() <= 1.0);
        }
    }

    #[test]
    fn test_laplacian_of_constant_is_zero() {
        let f = Field2D::from_array(Array2::from_elem((5, 5), 0.3));
        assert_eq!(f.laplacian(2, 2), 0.0);
    }
}
