use anyhow::Result;
use electrosim::sim::ecm::{EcmInput, EcmSimulation};
use electrosim::sim::interpolation::InterpolationMethod;

/// Constant-current charge of a 2-RC cell model until the 4 V cutoff,
/// compared across interpolation methods.
fn main() -> Result<()> {
    println!("ECM Constant-Current Charge");
    println!("{:=<60}", "");
    println!(
        "  {:<8} {:>8} {:>10} {:>10} {:>10}",
        "method", "samples", "t_end [s]", "SOC_end", "Vt_end [V]"
    );

    for method in [
        InterpolationMethod::Nearest,
        InterpolationMethod::Linear,
        InterpolationMethod::Cubic,
    ] {
        let input = EcmInput {
            t_tot: 120.0,
            dt: 0.5,
            capacity: 130.0,
            soc_0: 0.3,
            i_app: 2.0,
            interpolation: method,
            ocv_curve: None,
        };
        let sim = EcmSimulation::new(input)?;
        let res = sim.run()?;
        println!(
            "  {:<8} {:>8} {:>10.1} {:>10.4} {:>10.4}{}",
            method.to_string(),
            res.len(),
            res.t_table.last().copied().unwrap_or(0.0),
            res.soc.last().copied().unwrap_or(f64::NAN),
            res.vt.last().copied().unwrap_or(f64::NAN),
            if res.terminated_early { "  (cutoff)" } else { "" }
        );
    }

    Ok(())
}
