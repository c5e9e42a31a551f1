pub mod error;
pub mod io;
pub mod numeric;
pub mod sim;

// Prelude
pub use error::{SolverError, SolverResult};
pub use sim::batch::{BatchCase, run_batch};
pub use sim::ecm::{EcmConfig, EcmInput, EcmResult, EcmSimulation, simulate};
pub use sim::interpolation::{InterpolationMethod, interpolate};
pub use sim::planar::{PlanarDiffusionConfig, PlanarDiffusionResult, PlanarDiffusionSolver};
pub use sim::spherical::{
    SphericalDiffusionConfig, SphericalDiffusionResult, SphericalDiffusionSolver,
};
