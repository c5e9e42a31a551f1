use super::SampleTable;

/// A natural cubic spline through every sample of a [`SampleTable`].
///
/// Second derivatives vanish at both end knots. Outside the table the end
/// polynomials are extended, so queries never fail.
#[derive(Debug, Clone)]
pub struct CubicSpline {
    xs: Vec<f64>,
    ys: Vec<f64>,
    /// Second derivatives at each knot.
    y2s: Vec<f64>,
}

impl CubicSpline {
    /// Builds the spline. The table guarantees at least two strictly
    /// increasing knots.
    pub fn new(table: &SampleTable) -> Self {
        let xs = table.xs().to_vec();
        let ys = table.ys().to_vec();
        let n = xs.len();
        let mut y2s = vec![0.0; n];
        let mut u = vec![0.0; n.saturating_sub(1)];

        // Forward sweep of the tridiagonal system for the second derivatives
        for i in 1..n.saturating_sub(1) {
            let sig = (xs[i] - xs[i - 1]) / (xs[i + 1] - xs[i - 1]);
            let p = sig * y2s[i - 1] + 2.0;
            y2s[i] = (sig - 1.0) / p;
            u[i] = (ys[i + 1] - ys[i]) / (xs[i + 1] - xs[i])
                - (ys[i] - ys[i - 1]) / (xs[i] - xs[i - 1]);
            u[i] = (6.0 * u[i] / (xs[i + 1] - xs[i - 1]) - sig * u[i - 1]) / p;
        }

        // Back substitution (y2s[n-1] stays 0)
        for k in (0..n.saturating_sub(2)).rev() {
            y2s[k + 1] = y2s[k + 1] * y2s[k + 2] + u[k + 1];
        }

        Self { xs, ys, y2s }
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        let n = self.xs.len();

        // Binary search for the enclosing interval
        let mut lo = 0;
        let mut hi = n - 1;
        while hi - lo > 1 {
            let mid = (lo + hi) / 2;
            if self.xs[mid] > x {
                hi = mid;
            } else {
                lo = mid;
            }
        }

        let h = self.xs[hi] - self.xs[lo];
        let a = (self.xs[hi] - x) / h;
        let b = (x - self.xs[lo]) / h;

        a * self.ys[lo]
            + b * self.ys[hi]
            + ((a * a * a - a) * self.y2s[lo] + (b * b * b - b) * self.y2s[hi]) * h * h / 6.0
    }

    /// Second derivative of the spline at each knot.
    pub fn second_derivatives(&self) -> &[f64] {
        &self.y2s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spline(xs: &[f64], ys: &[f64]) -> CubicSpline {
        CubicSpline::new(&SampleTable::new(xs.to_vec(), ys.to_vec()).unwrap())
    }

    #[test]
    fn test_spline_passes_through_knots() {
        let xs = [1.0, 2.0, 3.0, 4.0, 5.0];
        let ys = [2.0, 3.0, 5.0, 4.0, 1.0];
        let s = spline(&xs, &ys);
        for (x, y) in xs.iter().zip(ys.iter()) {
            let v = s.evaluate(*x);
            assert_eq!(v, *y, "spline({x}) = {v}, expected {y}");
        }
    }

    #[test]
    fn test_natural_end_conditions() {
        let s = spline(&[0.0, 1.0, 2.0, 3.0], &[0.0, 1.0, 0.0, 1.0]);
        let y2 = s.second_derivatives();
        assert_eq!(y2[0], 0.0);
        assert_eq!(y2[3], 0.0);
        assert!(y2[1] != 0.0);
    }

    #[test]
    fn test_linear_data_is_reproduced_exactly_enough() {
        let s = spline(&[0.0, 0.5, 1.5, 3.0], &[1.0, 2.0, 4.0, 7.0]);
        for x in [0.25, 1.0, 2.2, 2.9] {
            let expected = 1.0 + 2.0 * x;
            assert!((s.evaluate(x) - expected).abs() < 1e-12, "x = {x}");
        }
    }

    #[test]
    fn test_two_knots_is_linear() {
        let s = spline(&[0.0, 2.0], &[0.0, 4.0]);
        assert!((s.evaluate(0.5) - 1.0).abs() < 1e-15);
        // Extrapolates along the end polynomial
        assert!((s.evaluate(3.0) - 6.0).abs() < 1e-12);
        assert!((s.evaluate(-1.0) + 2.0).abs() < 1e-12);
    }
}
