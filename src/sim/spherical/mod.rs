//! Finite-volume solid-phase diffusion in a spherical particle.
//!
//! # Architecture
//!
//! ```text
//! (d, r, ns) ──► RadialGrid ──► FluxCoefficients ──► SphericalDiffusionSolver
//!                                                        │
//!                                        assemble() / newton_step() until ‖f‖₂ < tol
//! ```
//!
//! The surface control volume carries a fixed reaction flux. The resulting
//! system is tridiagonal, so each Newton correction is a banded solve; a dense
//! reference solve is available through [`LinearSolver::Dense`].

pub mod coefficients;
pub mod grid;
pub mod solver;
pub mod temperature;

pub use coefficients::{FARADAY, FluxCoefficients};
pub use grid::RadialGrid;
pub use solver::{
    LinearSolver, NewtonState, SphericalDiffusionConfig, SphericalDiffusionParams,
    SphericalDiffusionResult, SphericalDiffusionSolver, TridiagonalJacobian, solve,
};
pub use temperature::{arrhenius_diffusivity, temperature_influenced};
