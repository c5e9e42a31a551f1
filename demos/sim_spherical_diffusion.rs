use anyhow::Result;
use electrosim::sim::spherical::{
    LinearSolver, SphericalDiffusionConfig, SphericalDiffusionParams, SphericalDiffusionSolver,
    temperature_influenced,
};

/// Solid-phase diffusion in a 5 µm particle.
///
/// Part 1: reference solve, printing the concentration profile.
/// Part 2: banded vs dense Newton corrections.
/// Part 3: effect of the Arrhenius correction at 313 K.
fn main() -> Result<()> {
    let params = SphericalDiffusionParams {
        d: 1e-12,
        r: 5e-6,
        ns: 100,
    };

    println!("Spherical Solid-Phase Diffusion");
    println!("{:=<60}", "");
    println!("  d  = {:e} m2/s", params.d);
    println!("  r  = {:e} m", params.r);
    println!("  ns = {}", params.ns);
    println!();

    // =====================================================================
    // PART 1: Reference solve
    // =====================================================================
    println!("PART 1: Reference solve");
    println!("{:-<60}", "");
    let solver = SphericalDiffusionSolver::new(params)?;
    let res = solver.solve()?;
    println!(
        "  iterations: {}, residual: {:e}, converged: {}",
        res.iterations, res.residual_norm, res.converged
    );
    println!("  {:>12} {:>14}", "r [um]", "c [mol/m3]");
    for (r, c) in res.radii.iter().zip(&res.concentration).step_by(10) {
        println!("  {:>12.3} {:>14.4}", r * 1e6, c);
    }
    println!();

    // =====================================================================
    // PART 2: Linear solver comparison
    // =====================================================================
    println!("PART 2: Banded vs dense Newton corrections");
    println!("{:-<60}", "");
    let dense_config = SphericalDiffusionConfig {
        linear_solver: LinearSolver::Dense,
        ..Default::default()
    };
    let dense = SphericalDiffusionSolver::with_config(params, dense_config)?.solve()?;
    let max_diff = res
        .concentration
        .iter()
        .zip(&dense.concentration)
        .map(|(a, b)| (a - b).abs())
        .fold(0.0, f64::max);
    println!("  max |c_banded - c_dense| = {max_diff:e}");
    println!();

    // =====================================================================
    // PART 3: Temperature influence
    // =====================================================================
    println!("PART 3: Arrhenius correction (313 K)");
    println!("{:-<60}", "");
    let d_warm = temperature_influenced(params.d)?;
    let warm = SphericalDiffusionSolver::new(SphericalDiffusionParams { d: d_warm, ..params })?.solve()?;
    let spread = |c: &[f64]| c[c.len() - 1] - c[0];
    println!("  d(313 K) = {d_warm:e} m2/s ({:.3}x)", d_warm / params.d);
    println!("  surface - center at 293 K: {:.4}", spread(&res.concentration));
    println!("  surface - center at 313 K: {:.4}", spread(&warm.concentration));

    Ok(())
}
