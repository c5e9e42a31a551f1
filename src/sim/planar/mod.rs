//! Explicit 2-D diffusion of a step profile over the unit square.
//!
//! The requested time step is clamped to the explicit stability bound
//! `dx² / (4 d)`; every step is rendered into an RGB frame.

pub mod colormap;
pub mod config;
pub mod field;
pub mod solver;

pub use colormap::{RgbFrame, diverging_rgb, render_frame};
pub use config::{PlanarDiffusionConfig, PlanarDiffusionParams, StepPlan};
pub use field::Field2D;
pub use solver::{PlanarDiffusionResult, PlanarDiffusionSolver, solve};
