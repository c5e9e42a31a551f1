use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use electrosim::io::{
    SimulationResponse, from_request_str, read_batch_csv, run_diffusion_batch, serialized_size,
    write_record,
};

const USAGE: &str = "usage: electrosim <request.json> [output.json[.gz]]\n       electrosim batch <cases.csv> [output.json[.gz]]";

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.as_slice() {
        [cmd, csv, rest @ ..] if cmd == "batch" && rest.len() <= 1 => {
            run_batch_file(Path::new(csv), rest.first().map(PathBuf::from))
        }
        [request, rest @ ..] if rest.len() <= 1 => {
            run_request_file(Path::new(request), rest.first().map(PathBuf::from))
        }
        _ => bail!("{USAGE}"),
    }
}

fn run_request_file(path: &Path, output: Option<PathBuf>) -> Result<()> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read request: {}", path.display()))?;
    let request = from_request_str(&json)?;
    let kind = request.kind();
    let response = request.run()?;

    match &response {
        SimulationResponse::Diffusion(res) => println!(
            "{kind}: {} nodes, residual {:e}, converged: {}",
            res.cs_iter.len(),
            res.loss_value,
            res.converged
        ),
        SimulationResponse::Diffusion2d(res) => println!(
            "{kind}: {}x{} grid, {} frames",
            res.metadata.nx, res.metadata.ny, res.metadata.timesteps
        ),
        SimulationResponse::Ecm(res) => println!(
            "{kind}: {} samples, final Vt {:.4} V",
            res.t_table.len(),
            res.vt.last().copied().unwrap_or(f64::NAN)
        ),
    }
    println!("Record size: {} bytes", serialized_size(&response)?);

    if let Some(out) = output {
        let written = write_record(&out, &response)?;
        println!("Wrote {} ({written} bytes)", out.display());
    }
    Ok(())
}

fn run_batch_file(path: &Path, output: Option<PathBuf>) -> Result<()> {
    let cases = read_batch_csv(path)?;
    let response = run_diffusion_batch(&cases)?;
    for (i, res) in response.results.iter().enumerate() {
        println!("case {i}: residual {:e}, converged: {}", res.loss_value, res.converged);
    }

    if let Some(out) = output {
        let written = write_record(&out, &response)?;
        println!("Wrote {} ({written} bytes)", out.display());
    }
    Ok(())
}
