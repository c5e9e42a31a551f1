//! Arrhenius temperature correction for the solid-phase diffusivity.

use crate::error::{SolverResult, ensure_positive};

/// Reference temperature of tabulated diffusivities [K].
pub const REFERENCE_TEMPERATURE: f64 = 293.0;
/// Gas constant applied by the correction [J/(mol*K)].
pub const GAS_CONSTANT: f64 = 8.41;
/// Default activation energy [J/mol].
pub const DEFAULT_ACTIVATION_ENERGY: f64 = 50000.0;
/// Default operating temperature [K].
pub const DEFAULT_TEMPERATURE: f64 = 313.0;

/// `d_ref * exp(Ea / R * (1/T_ref - 1/T))`.
pub fn arrhenius_diffusivity(d_ref: f64, activation_energy: f64, temperature: f64) -> SolverResult<f64> {
    ensure_positive("d", d_ref)?;
    ensure_positive("temperature", temperature)?;
    let d = d_ref
        * (activation_energy * (1.0 / REFERENCE_TEMPERATURE - 1.0 / temperature) / GAS_CONSTANT).exp();
    ensure_positive("d", d)?;
    Ok(d)
}

/// Correction with the default activation energy and operating temperature.
pub fn temperature_influenced(d_ref: f64) -> SolverResult<f64> {
    arrhenius_diffusivity(d_ref, DEFAULT_ACTIVATION_ENERGY, DEFAULT_TEMPERATURE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_temperature_is_identity() {
        let d = arrhenius_diffusivity(1e-12, 50000.0, REFERENCE_TEMPERATURE).unwrap();
        assert_eq!(d, 1e-12);
    }

    #[test]
    fn test_warmer_diffuses_faster() {
        let d = temperature_influenced(1e-12).unwrap();
        // exp(50000 / 8.41 * (1/293 - 1/313)) ≈ 3.66
        let factor = d / 1e-12;
        assert!((factor - 3.66).abs() < 0.01, "factor = {factor}");
    }

    #[test]
    fn test_rejects_non_positive_temperature() {
        assert!(arrhenius_diffusivity(1e-12, 50000.0, 0.0).is_err());
    }
}
