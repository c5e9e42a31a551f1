//! Small dense and banded linear-algebra helpers used by the engines.

use ndarray::{Array2, ArrayView1, s};
use thiserror::Error;

/// Pivot magnitude below which a system is treated as singular.
const PIVOT_EPS: f64 = 1e-300;

/// Failure of a direct linear solve.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LinearSolveError {
    #[error("singular matrix (pivot too small) at row {row}")]
    Singular { row: usize },
    #[error("non-finite solution at index {index}")]
    NonFinite { index: usize },
    #[error("dimension mismatch: {0}")]
    Dimension(String),
}

/// `num` evenly spaced samples over `[start, stop]`, endpoint included.
///
/// A single sample returns `[start]`; the last sample is exactly `stop`.
pub fn linspace(start: f64, stop: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (num - 1) as f64;
            (0..num)
                .map(|i| {
                    if i == num - 1 {
                        stop
                    } else {
                        start + i as f64 * step
                    }
                })
                .collect()
        }
    }
}

/// Euclidean norm.
pub fn norm2(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

/// Thomas algorithm for a tridiagonal system.
///
/// - `a[i]` is the sub-diagonal (a[0] unused)
/// - `b[i]` is the diagonal
/// - `c[i]` is the super-diagonal (c[n-1] unused)
/// - `d[i]` is the RHS
///
/// `b` and `d` are used as scratch space. Returns the solution.
pub fn thomas_solve(
    a: &[f64],
    b: &mut [f64],
    c: &[f64],
    d: &mut [f64],
) -> Result<Vec<f64>, LinearSolveError> {
    let n = b.len();
    if a.len() != n || c.len() != n || d.len() != n {
        return Err(LinearSolveError::Dimension(format!(
            "a={}, b={n}, c={}, d={}",
            a.len(),
            c.len(),
            d.len()
        )));
    }
    if n == 0 {
        return Ok(Vec::new());
    }

    // Forward sweep
    for i in 1..n {
        if b[i - 1].abs() < PIVOT_EPS {
            return Err(LinearSolveError::Singular { row: i - 1 });
        }
        let w = a[i] / b[i - 1];
        b[i] -= w * c[i - 1];
        d[i] -= w * d[i - 1];
    }
    if b[n - 1].abs() < PIVOT_EPS {
        return Err(LinearSolveError::Singular { row: n - 1 });
    }

    // Back substitution
    d[n - 1] /= b[n - 1];
    for i in (0..n - 1).rev() {
        d[i] = (d[i] - c[i] * d[i + 1]) / b[i];
    }

    check_finite(d)?;
    Ok(d.to_vec())
}

/// Solves `A x = b` by Gaussian elimination with partial pivoting on the
/// augmented matrix `[A | b]`.
pub fn solve_dense(a: &Array2<f64>, b: &[f64]) -> Result<Vec<f64>, LinearSolveError> {
    let n = b.len();
    if a.dim() != (n, n) {
        return Err(LinearSolveError::Dimension(format!(
            "A is {:?}, b has {n} rows",
            a.dim()
        )));
    }

    let mut m = Array2::<f64>::zeros((n, n + 1));
    m.slice_mut(s![.., ..n]).assign(a);
    m.column_mut(n).assign(&ArrayView1::from(b));

    for k in 0..n {
        // Largest magnitude in column k at or below the diagonal; ties keep the upper row
        let (offset, magnitude) = m
            .slice(s![k.., k])
            .iter()
            .enumerate()
            .fold((0, 0.0_f64), |best, (i, v)| if v.abs() > best.1 { (i, v.abs()) } else { best });
        if magnitude < PIVOT_EPS {
            return Err(LinearSolveError::Singular { row: k });
        }
        let p = k + offset;
        if p != k {
            for j in k..=n {
                m.swap([k, j], [p, j]);
            }
        }

        let pivot_row = m.row(k).to_owned();
        for i in (k + 1)..n {
            let factor = m[[i, k]] / pivot_row[k];
            if factor != 0.0 {
                m.row_mut(i).scaled_add(-factor, &pivot_row);
            }
        }
    }

    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let known: f64 = ((i + 1)..n).map(|j| m[[i, j]] * x[j]).sum();
        x[i] = (m[[i, n]] - known) / m[[i, i]];
    }

    check_finite(&x)?;
    Ok(x)
}

fn check_finite(x: &[f64]) -> Result<(), LinearSolveError> {
    match x.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(LinearSolveError::NonFinite { index }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linspace_endpoints() {
        let v = linspace(0.0, 1.0, 5);
        assert_eq!(v, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(linspace(2.0, 3.0, 1), vec![2.0]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn test_linspace_last_is_exact() {
        let v = linspace(0.0, 5e-6, 101);
        assert_eq!(*v.last().unwrap(), 5e-6);
        assert!(v.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_thomas_simple_tridiag() {
        // [ 2 -1  0  0]   [x0]   [1]
        // [-1  2 -1  0] * [x1] = [0]
        // [ 0 -1  2 -1]   [x2]   [0]
        // [ 0  0 -1  2]   [x3]   [1]
        let a = vec![0.0, -1.0, -1.0, -1.0];
        let mut b = vec![2.0, 2.0, 2.0, 2.0];
        let c = vec![-1.0, -1.0, -1.0, 0.0];
        let mut d = vec![1.0, 0.0, 0.0, 1.0];
        let x = thomas_solve(&a, &mut b, &c, &mut d).unwrap();
        for xi in &x {
            assert!((xi - 1.0).abs() < 1e-12, "x = {x:?}");
        }
    }

    #[test]
    fn test_thomas_detects_singular_pivot() {
        let a = vec![0.0, 1.0];
        let mut b = vec![0.0, 1.0];
        let c = vec![1.0, 0.0];
        let mut d = vec![1.0, 1.0];
        let err = thomas_solve(&a, &mut b, &c, &mut d).unwrap_err();
        assert_eq!(err, LinearSolveError::Singular { row: 0 });
    }

    #[test]
    fn test_dense_matches_thomas() {
        let n = 6;
        let a: Vec<f64> = (0..n).map(|i| if i > 0 { -0.3 } else { 0.0 }).collect();
        let c: Vec<f64> = (0..n).map(|i| if i < n - 1 { -0.4 } else { 0.0 }).collect();
        let diag = vec![1.0; n];
        let rhs: Vec<f64> = (0..n).map(|i| i as f64 + 1.0).collect();

        let dense = Array2::from_shape_fn((n, n), |(i, j)| {
            if i == j {
                diag[i]
            } else if j + 1 == i {
                a[i]
            } else if i + 1 == j {
                c[i]
            } else {
                0.0
            }
        });

        let x_dense = solve_dense(&dense, &rhs).unwrap();
        let x_band = thomas_solve(&a, &mut diag.clone(), &c, &mut rhs.clone()).unwrap();
        for (xd, xb) in x_dense.iter().zip(&x_band) {
            assert!((xd - xb).abs() < 1e-12, "dense={xd}, banded={xb}");
        }
    }

    #[test]
    fn test_dense_pivots_on_zero_diagonal() {
        // [0 1] x = [2]
        // [1 0]     [3]
        let a = ndarray::array![[0.0, 1.0], [1.0, 0.0]];
        assert_eq!(solve_dense(&a, &[2.0, 3.0]).unwrap(), vec![3.0, 2.0]);
    }

    #[test]
    fn test_dense_singular() {
        let a = ndarray::array![[1.0, 2.0], [2.0, 4.0]];
        assert!(matches!(
            solve_dense(&a, &[1.0, 2.0]),
            Err(LinearSolveError::Singular { .. })
        ));
    }

    #[test]
    fn test_dense_dimension_mismatch() {
        let a = Array2::<f64>::zeros((2, 3));
        assert!(matches!(
            solve_dense(&a, &[1.0, 2.0]),
            Err(LinearSolveError::Dimension(_))
        ));
    }

    #[test]
    fn test_norm2() {
        assert!((norm2(&[3.0, 4.0]) - 5.0).abs() < 1e-15);
        assert_eq!(norm2(&[]), 0.0);
    }
}
