//! One-dimensional interpolation over monotonic sample tables.
//!
//! Three strategies are available: nearest sample, piecewise linear and
//! natural cubic spline. All of them are pure and deterministic.
//!
//! ```text
//! (xs, ys) ──► SampleTable::new() ──► Interpolant::new(method) ──► eval(x)
//!                  (validation)          (spline coefficients)
//! ```
//!
//! [`interpolate`] rebuilds the interpolant on every call. Callers that query
//! one curve many times (the ECM engine) keep an [`Interpolant`] instead; the
//! coefficients are computed by the same arithmetic, so results are
//! bit-identical.

pub mod spline;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{SolverError, SolverResult};
pub use spline::CubicSpline;

/// Interpolation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationMethod {
    Nearest,
    #[default]
    Linear,
    Cubic,
}

impl InterpolationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nearest => "nearest",
            Self::Linear => "linear",
            Self::Cubic => "cubic",
        }
    }

    /// Minimum number of samples the strategy needs.
    pub fn min_samples(&self) -> usize {
        match self {
            Self::Nearest => 1,
            Self::Linear | Self::Cubic => 2,
        }
    }
}

impl fmt::Display for InterpolationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InterpolationMethod {
    type Err = SolverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nearest" => Ok(Self::Nearest),
            "linear" => Ok(Self::Linear),
            "cubic" => Ok(Self::Cubic),
            other => Err(SolverError::invalid(
                "interpolation_choice",
                format!("unknown method '{other}', expected 'linear', 'cubic' or 'nearest'"),
            )),
        }
    }
}

/// A validated sample table: equal lengths, finite values, `xs` strictly
/// monotonic.
///
/// Decreasing tables are stored in increasing order; [`Self::xs`] and
/// [`Self::ys`] always return the increasing view.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleTable {
    xs: Vec<f64>,
    ys: Vec<f64>,
    /// Samples were supplied with decreasing `xs`.
    reversed: bool,
}

impl SampleTable {
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> SolverResult<Self> {
        if xs.len() != ys.len() {
            return Err(SolverError::invalid(
                "ys",
                format!("length {} does not match xs length {}", ys.len(), xs.len()),
            ));
        }
        if xs.is_empty() {
            return Err(SolverError::invalid("xs", "sample table is empty"));
        }
        if let Some(i) = xs.iter().position(|x| !x.is_finite()) {
            return Err(SolverError::invalid("xs", format!("non-finite sample at index {i}")));
        }
        if let Some(i) = ys.iter().position(|y| !y.is_finite()) {
            return Err(SolverError::invalid("ys", format!("non-finite sample at index {i}")));
        }
        let reversed = xs.len() > 1 && xs[1] < xs[0];
        let violation = if reversed {
            xs.windows(2).position(|w| w[1] >= w[0])
        } else {
            xs.windows(2).position(|w| w[1] <= w[0])
        };
        if let Some(i) = violation {
            return Err(SolverError::invalid(
                "xs",
                format!(
                    "must be strictly monotonic, but xs[{}] = {} and xs[{}] = {} break the order",
                    i,
                    xs[i],
                    i + 1,
                    xs[i + 1]
                ),
            ));
        }

        let (mut xs, mut ys) = (xs, ys);
        if reversed {
            xs.reverse();
            ys.reverse();
        }
        Ok(Self { xs, ys, reversed })
    }

    /// Builds a table from `(x, y)` rows.
    pub fn from_pairs(rows: &[[f64; 2]]) -> SolverResult<Self> {
        let (xs, ys) = rows.iter().map(|r| (r[0], r[1])).unzip();
        Self::new(xs, ys)
    }

    pub fn xs(&self) -> &[f64] {
        &self.xs
    }

    pub fn ys(&self) -> &[f64] {
        &self.ys
    }

    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    /// `(xs[0], xs[last])`.
    pub fn domain(&self) -> (f64, f64) {
        (self.xs[0], self.xs[self.xs.len() - 1])
    }

    /// `true` if the samples were supplied with decreasing `xs`.
    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    /// Sample value whose abscissa is closest to `x`. Ties go to the lower
    /// index in the order the samples were supplied; queries outside the
    /// table snap to the nearest end.
    pub fn nearest(&self, x: f64) -> f64 {
        let n = self.xs.len();
        let k = self.xs.partition_point(|&xi| xi < x);
        let idx = if k == 0 {
            0
        } else if k == n {
            n - 1
        } else {
            let (left, right) = (x - self.xs[k - 1], self.xs[k] - x);
            if left < right || (left == right && !self.reversed) {
                k - 1
            } else {
                k
            }
        };
        self.ys[idx]
    }

    /// Piecewise-linear value at `x`. Outside the table the edge segment is
    /// extended.
    pub fn linear(&self, x: f64) -> f64 {
        let n = self.xs.len();
        if n == 1 {
            return self.ys[0];
        }
        let k = self
            .xs
            .partition_point(|&xi| xi <= x)
            .saturating_sub(1)
            .min(n - 2);
        let (x0, x1) = (self.xs[k], self.xs[k + 1]);
        let (y0, y1) = (self.ys[k], self.ys[k + 1]);
        let t = (x - x0) / (x1 - x0);
        // Exact at both knots: t = 0 gives y0, t = 1 gives y1.
        y0 * (1.0 - t) + y1 * t
    }
}

/// A sample table prepared for repeated queries with one strategy.
#[derive(Debug, Clone)]
pub enum Interpolant {
    Nearest(SampleTable),
    Linear(SampleTable),
    Cubic(CubicSpline),
}

impl Interpolant {
    pub fn new(table: SampleTable, method: InterpolationMethod) -> SolverResult<Self> {
        if table.len() < method.min_samples() {
            return Err(SolverError::invalid(
                "xs",
                format!(
                    "{method} interpolation needs at least {} samples, got {}",
                    method.min_samples(),
                    table.len()
                ),
            ));
        }
        Ok(match method {
            InterpolationMethod::Nearest => Self::Nearest(table),
            InterpolationMethod::Linear => Self::Linear(table),
            InterpolationMethod::Cubic => Self::Cubic(CubicSpline::new(&table)),
        })
    }

    pub fn method(&self) -> InterpolationMethod {
        match self {
            Self::Nearest(_) => InterpolationMethod::Nearest,
            Self::Linear(_) => InterpolationMethod::Linear,
            Self::Cubic(_) => InterpolationMethod::Cubic,
        }
    }

    pub fn eval(&self, x: f64) -> f64 {
        match self {
            Self::Nearest(t) => t.nearest(x),
            Self::Linear(t) => t.linear(x),
            Self::Cubic(s) => s.evaluate(x),
        }
    }
}

/// Interpolates `ys(xs)` at `query`.
///
/// `xs` must be strictly monotonic and as long as `ys`; the table is never
/// sorted, so unordered samples are rejected. Linear and cubic queries outside `[xs[0], xs[last]]`
/// extrapolate, nearest queries snap to the closer end.
pub fn interpolate(
    xs: &[f64],
    ys: &[f64],
    query: f64,
    method: InterpolationMethod,
) -> SolverResult<f64> {
    if !query.is_finite() {
        return Err(SolverError::invalid("query", format!("must be finite, got {query}")));
    }
    let table = SampleTable::new(xs.to_vec(), ys.to_vec())?;
    Ok(Interpolant::new(table, method)?.eval(query))
}
