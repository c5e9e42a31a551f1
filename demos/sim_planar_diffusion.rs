use anyhow::Result;
use electrosim::io::json::{serialized_size, to_gzip_json};
use electrosim::io::request::Diffusion2dResponse;
use electrosim::sim::planar::{PlanarDiffusionParams, PlanarDiffusionSolver};

/// Explicit 2-D diffusion of a step profile, with frame export sizes.
fn main() -> Result<()> {
    let params = PlanarDiffusionParams {
        nx: 40,
        ny: 40,
        dt: 1.0,
        d: 1.0,
        t_max: 0.02,
    };

    let solver = PlanarDiffusionSolver::new(params)?;
    let plan = solver.plan();
    println!("Planar 2-D Diffusion");
    println!("{:=<60}", "");
    println!("  grid: {}x{}, dx = {:.4}", plan.nx, plan.ny, plan.dx);
    println!("  requested dt = {:e}, stability bound = {:e}", params.dt, plan.dt_max);
    println!("  used dt = {:e}, steps = {}", plan.dt, plan.nt);
    println!();

    let res = solver.solve()?;

    // Middle column of the last frame, bottom to top
    if let Some(frame) = res.frames.last() {
        let column = &frame[res.nx / 2];
        for (j, rgb) in column.iter().enumerate().step_by(4) {
            println!("  j = {j:>3}: rgb({:>3}, {:>3}, {:>3})", rgb[0], rgb[1], rgb[2]);
        }
    }
    println!();

    let response: Diffusion2dResponse = res.into();
    let plain = serialized_size(&response)?;
    let packed = to_gzip_json(&response)?.len();
    println!("  JSON size:   {:.2} MB", plain as f64 / 1024.0 / 1024.0);
    println!("  gzip size:   {:.2} MB", packed as f64 / 1024.0 / 1024.0);
    println!("  ratio:       {:.1}x", plain as f64 / packed as f64);

    Ok(())
}
