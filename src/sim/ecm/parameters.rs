use crate::error::{SolverError, SolverResult};
use crate::sim::ecm::tables::{
    R0_CHARGE_MOHM, R0_DISCHARGE_MOHM, R_RC_MOHM, REFERENCE_OCV, TAU1_S, TAU2_S, soc_grid, to_ohm,
};
use crate::sim::interpolation::{Interpolant, InterpolationMethod, SampleTable};

/// SOC-dependent parameter curves of the 2-RC model.
///
/// Resistances are in ohms, capacitances in farads, OCV in volts.
#[derive(Debug, Clone, PartialEq)]
pub struct EcmParameters {
    pub r0_charge: SampleTable,
    pub r0_discharge: SampleTable,
    pub r1: SampleTable,
    pub r2: SampleTable,
    pub c1: SampleTable,
    pub c2: SampleTable,
    pub ocv: SampleTable,
}

impl EcmParameters {
    /// Built-in tables with the reference OCV curve.
    pub fn builtin() -> SolverResult<Self> {
        let soc = soc_grid();
        let r_rc = to_ohm(&R_RC_MOHM);
        let c1: Vec<f64> = TAU1_S.iter().zip(&r_rc).map(|(tau, r)| tau / r).collect();
        let c2: Vec<f64> = TAU2_S.iter().zip(&r_rc).map(|(tau, r)| tau / r).collect();

        Ok(Self {
            r0_charge: SampleTable::new(soc.clone(), to_ohm(&R0_CHARGE_MOHM))?,
            r0_discharge: SampleTable::new(soc.clone(), to_ohm(&R0_DISCHARGE_MOHM))?,
            r1: SampleTable::new(soc.clone(), r_rc.clone())?,
            r2: SampleTable::new(soc.clone(), r_rc)?,
            c1: SampleTable::new(soc.clone(), c1)?,
            c2: SampleTable::new(soc, c2)?,
            ocv: SampleTable::from_pairs(&REFERENCE_OCV)?,
        })
    }

    /// Replaces the OCV curve with caller-supplied `(SOC, OCV)` rows.
    ///
    /// Every row must have exactly two columns and SOC must be strictly
    /// increasing; the rows are not re-sorted.
    pub fn with_ocv_rows(mut self, rows: &[Vec<f64>]) -> SolverResult<Self> {
        self.ocv = ocv_table_from_rows(rows)?;
        Ok(self)
    }
}

/// Validates a caller-supplied OCV curve.
pub fn ocv_table_from_rows(rows: &[Vec<f64>]) -> SolverResult<SampleTable> {
    if let Some((i, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != 2) {
        return Err(SolverError::invalid(
            "ocv_curve",
            format!("must have exactly 2 columns (SOC, OCV), row {i} has {}", row.len()),
        ));
    }
    if rows.len() < 2 {
        return Err(SolverError::invalid(
            "ocv_curve",
            format!("needs at least 2 rows, got {}", rows.len()),
        ));
    }
    if let Some(i) = rows.windows(2).position(|w| w[1][0] <= w[0][0]) {
        return Err(SolverError::invalid(
            "ocv_curve",
            format!("rows must be sorted ascending by SOC, row {} breaks the order", i + 1),
        ));
    }
    let (xs, ys) = rows.iter().map(|r| (r[0], r[1])).unzip();
    SampleTable::new(xs, ys).map_err(|e| match e {
        SolverError::InvalidInput { reason, .. } => SolverError::invalid(
            "ocv_curve",
            format!("{reason} (rows must be sorted ascending by SOC)"),
        ),
        other => other,
    })
}

/// Parameter values at one SOC.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EcmPoint {
    pub r0: f64,
    pub r1: f64,
    pub r2: f64,
    pub c1: f64,
    pub c2: f64,
    pub ocv: f64,
}

/// Which ohmic-resistance table feeds the state update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum R0Selection {
    /// Always the charge table.
    #[default]
    Charge,
    /// Charge table for `i_app >= 0`, discharge table otherwise.
    ByCurrentSign,
}

/// Parameter curves prepared for repeated queries with one method.
#[derive(Debug, Clone)]
pub struct EcmCurves {
    r0: Interpolant,
    r1: Interpolant,
    r2: Interpolant,
    c1: Interpolant,
    c2: Interpolant,
    ocv: Interpolant,
}

impl EcmCurves {
    pub fn new(
        params: &EcmParameters,
        method: InterpolationMethod,
        r0_selection: R0Selection,
        i_app: f64,
    ) -> SolverResult<Self> {
        let r0 = match r0_selection {
            R0Selection::ByCurrentSign if i_app < 0.0 => &params.r0_discharge,
            _ => &params.r0_charge,
        };
        Ok(Self {
            r0: Interpolant::new(r0.clone(), method)?,
            r1: Interpolant::new(params.r1.clone(), method)?,
            r2: Interpolant::new(params.r2.clone(), method)?,
            c1: Interpolant::new(params.c1.clone(), method)?,
            c2: Interpolant::new(params.c2.clone(), method)?,
            ocv: Interpolant::new(params.ocv.clone(), method)?,
        })
    }

    pub fn at(&self, soc: f64) -> EcmPoint {
        EcmPoint {
            r0: self.r0.eval(soc),
            r1: self.r1.eval(soc),
            r2: self.r2.eval(soc),
            c1: self.c1.eval(soc),
            c2: self.c2.eval(soc),
            ocv: self.ocv.eval(soc),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_capacitance_from_time_constant() {
        let p = EcmParameters::builtin().unwrap();
        // tau1[3] = 10.55 s, R1[3] = 0.43 mΩ
        let c1 = p.c1.ys()[3];
        assert!((c1 - 10.55 / 0.43e-3).abs() < 1e-6, "c1 = {c1}");
        assert_eq!(p.r1, p.r2);
    }

    #[test]
    fn test_curves_reproduce_table_samples() {
        let p = EcmParameters::builtin().unwrap();
        let curves = EcmCurves::new(&p, InterpolationMethod::Linear, R0Selection::Charge, 1.0).unwrap();
        let pt = curves.at(0.5);
        assert!((pt.ocv - 3.69).abs() < 1e-12);
        assert!((pt.r0 - 0.47e-3).abs() < 1e-15);
    }

    #[test]
    fn test_r0_selection_by_current_sign() {
        let p = EcmParameters::builtin().unwrap();
        let m = InterpolationMethod::Nearest;
        let charge = EcmCurves::new(&p, m, R0Selection::ByCurrentSign, 1.0).unwrap();
        let discharge = EcmCurves::new(&p, m, R0Selection::ByCurrentSign, -1.0).unwrap();
        let fixed = EcmCurves::new(&p, m, R0Selection::Charge, -1.0).unwrap();
        assert!((charge.at(0.0).r0 - 0.01e-3).abs() < 1e-15);
        assert!((discharge.at(0.0).r0 - 1.0e-3).abs() < 1e-15);
        assert_eq!(fixed.at(0.0).r0, charge.at(0.0).r0);
    }

    #[test]
    fn test_custom_ocv_rows() {
        let rows = vec![vec![0.0, 3.0], vec![0.5, 3.6], vec![1.0, 4.1]];
        let p = EcmParameters::builtin().unwrap().with_ocv_rows(&rows).unwrap();
        assert_eq!(p.ocv.len(), 3);
    }

    #[test]
    fn test_custom_ocv_requires_two_columns() {
        let rows = vec![vec![0.0, 3.0, 1.0], vec![1.0, 4.0, 1.0]];
        let err = ocv_table_from_rows(&rows).unwrap_err();
        assert!(err.to_string().contains("exactly 2 columns"), "{err}");
        let rows = vec![vec![0.0], vec![1.0]];
        assert!(ocv_table_from_rows(&rows).is_err());
    }

    #[test]
    fn test_custom_ocv_must_be_sorted() {
        let rows = vec![vec![0.5, 3.6], vec![0.0, 3.0], vec![1.0, 4.1]];
        let err = ocv_table_from_rows(&rows).unwrap_err();
        assert!(matches!(err, SolverError::InvalidInput { ref parameter, .. } if parameter == "ocv_curve"));
        // Strictly descending is monotonic but still not ascending
        let rows = vec![vec![1.0, 4.1], vec![0.5, 3.6], vec![0.0, 3.0]];
        let err = ocv_table_from_rows(&rows).unwrap_err();
        assert!(err.to_string().contains("ascending"), "{err}");
    }
}
