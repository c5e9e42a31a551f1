//! Built-in parameter tables of the 2-RC cell model.
//!
//! All resistance and time-constant tables are sampled on the same 21-point
//! SOC grid `0.00, 0.05, ..., 1.00`.

/// Number of samples in every built-in SOC table.
pub const SOC_POINTS: usize = 21;

/// Ohmic resistance while charging [mΩ].
pub const R0_CHARGE_MOHM: [f64; SOC_POINTS] = [
    0.01, 0.01, 0.51, 0.35, 0.39, 0.4, 0.41, 0.44, 0.47, 0.47, 0.47, 0.46, 0.45, 0.4, 0.45, 0.46,
    0.45, 0.46, 0.46, 0.44, 0.17,
];

/// Ohmic resistance while discharging [mΩ].
pub const R0_DISCHARGE_MOHM: [f64; SOC_POINTS] = [
    1.0, 1.0, 0.65, 0.62, 0.59, 0.58, 0.57, 0.55, 0.54, 0.54, 0.53, 0.53, 0.53, 0.55, 0.52, 0.5,
    0.5, 0.5, 0.49, 0.5, 0.71,
];

/// Polarization resistance of both RC branches [mΩ].
pub const R_RC_MOHM: [f64; SOC_POINTS] = [
    1.0, 1.0, 0.6, 0.43, 0.4, 0.38, 0.37, 0.36, 0.36, 0.35, 0.34, 0.33, 0.33, 0.35, 0.35, 0.34,
    0.34, 0.34, 0.33, 0.32, 0.41,
];

/// Time constant of the fast RC branch [s].
pub const TAU1_S: [f64; SOC_POINTS] = [
    50.0, 50.0, 50.0, 10.55, 10.76, 11.08, 11.27, 12.47, 14.31, 13.91, 13.53, 13.2, 12.74, 10.55,
    12.95, 13.59, 14.37, 14.8, 14.6, 12.71, 7.18,
];

/// Time constant of the slow RC branch [s].
pub const TAU2_S: [f64; SOC_POINTS] = [
    157.56, 157.56, 499.63, 355.08, 500.0, 500.0, 500.0, 500.0, 456.73, 416.17, 426.76, 459.72,
    482.44, 450.18, 500.0, 403.97, 362.14, 397.06, 430.51, 432.6, 425.62,
];

/// Reference open-circuit voltage curve as `(SOC, OCV [V])` rows.
pub const REFERENCE_OCV: [[f64; 2]; SOC_POINTS] = [
    [0.00, 3.00],
    [0.05, 3.30],
    [0.10, 3.43],
    [0.15, 3.50],
    [0.20, 3.55],
    [0.25, 3.58],
    [0.30, 3.60],
    [0.35, 3.62],
    [0.40, 3.64],
    [0.45, 3.66],
    [0.50, 3.69],
    [0.55, 3.72],
    [0.60, 3.76],
    [0.65, 3.80],
    [0.70, 3.85],
    [0.75, 3.90],
    [0.80, 3.95],
    [0.85, 4.00],
    [0.90, 4.06],
    [0.95, 4.12],
    [1.00, 4.20],
];

/// The SOC grid shared by the built-in tables.
pub fn soc_grid() -> Vec<f64> {
    crate::numeric::linspace(0.0, 1.0, SOC_POINTS)
}

/// Converts a milliohm table to ohms.
pub fn to_ohm(table: &[f64]) -> Vec<f64> {
    table.iter().map(|r| r * 1e-3).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_ocv_is_increasing() {
        assert!(REFERENCE_OCV.windows(2).all(|w| w[1][0] > w[0][0] && w[1][1] > w[0][1]));
        assert_eq!(REFERENCE_OCV[0][0], 0.0);
        assert_eq!(REFERENCE_OCV[SOC_POINTS - 1][0], 1.0);
    }

    #[test]
    fn test_soc_grid_matches_tables() {
        let grid = soc_grid();
        assert_eq!(grid.len(), SOC_POINTS);
        assert!((grid[1] - 0.05).abs() < 1e-15);
        assert_eq!(grid[SOC_POINTS - 1], 1.0);
    }

    #[test]
    fn test_tables_are_positive() {
        for table in [&R0_CHARGE_MOHM, &R0_DISCHARGE_MOHM, &R_RC_MOHM, &TAU1_S, &TAU2_S] {
            assert!(table.iter().all(|v| *v > 0.0));
        }
    }
}
