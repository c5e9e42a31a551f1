//! Two-RC equivalent circuit model of a battery cell.
//!
//! Resistances, capacitances and the open-circuit voltage depend on the state
//! of charge and are looked up through [`crate::sim::interpolation`] on every
//! step. The run stops early once the terminal voltage reaches the cutoff.

pub mod parameters;
pub mod simulation;
pub mod tables;

pub use parameters::{EcmCurves, EcmParameters, EcmPoint, R0Selection, ocv_table_from_rows};
pub use simulation::{EcmConfig, EcmInput, EcmResult, EcmSimulation, EcmState, simulate};
