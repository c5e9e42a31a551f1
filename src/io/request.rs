//! JSON request and response records of the simulation service.
//!
//! A request names the engine through its `kind` tag:
//!
//! ```json
//! {"kind": "diffusion", "d": 1e-12, "r": 5e-6, "ns": 100, "temp_influenced": false}
//! {"kind": "diffusion_2d", "nx": 10, "ny": 10, "dt": 1.0, "d": 1.0, "t_max": 0.01}
//! {"kind": "ecm", "t_tot": 100, "dt": 1, "Cn": 130, "SOC_0": 0.5, "i_app": 1,
//!  "interpolation_choice": "linear", "ocv_data": [{"x": 0, "y": 3.0}, {"x": 1, "y": 4.2}]}
//! ```
//!
//! Response field names follow the persisted record shape and must stay
//! stable.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::sim::batch::{BatchCase, BatchOutcome, run_batch_with_config};
use crate::sim::ecm::{EcmConfig, EcmInput, EcmResult, EcmSimulation};
use crate::sim::planar::{
    PlanarDiffusionConfig, PlanarDiffusionParams, PlanarDiffusionResult, PlanarDiffusionSolver,
    RgbFrame,
};
use crate::sim::spherical::{
    SphericalDiffusionConfig, SphericalDiffusionParams, SphericalDiffusionResult,
    SphericalDiffusionSolver, temperature_influenced,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SimulationRequest {
    Diffusion(DiffusionRequest),
    #[serde(rename = "diffusion_2d")]
    Diffusion2d(Diffusion2dRequest),
    Ecm(EcmRequest),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffusionRequest {
    pub d: f64,
    pub r: f64,
    pub ns: usize,
    #[serde(default)]
    pub temp_influenced: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub config: SphericalDiffusionConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diffusion2dRequest {
    pub nx: usize,
    pub ny: usize,
    pub dt: f64,
    pub d: f64,
    pub t_max: f64,
    #[serde(default)]
    pub config: PlanarDiffusionConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EcmRequest {
    pub t_tot: f64,
    pub dt: f64,
    #[serde(rename = "Cn")]
    pub cn: f64,
    #[serde(rename = "SOC_0")]
    pub soc_0: f64,
    pub i_app: f64,
    #[serde(alias = "intepolation_choice")]
    pub interpolation_choice: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocv_data: Option<OcvData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub config: EcmConfig,
}

/// A point of an uploaded OCV curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OcvPoint {
    pub x: f64,
    pub y: f64,
}

/// Uploaded OCV curve, either as `{x, y}` points or as `[soc, v]` rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OcvData {
    Points(Vec<OcvPoint>),
    Rows(Vec<Vec<f64>>),
}

impl OcvData {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Points(points) => points.is_empty(),
            Self::Rows(rows) => rows.is_empty(),
        }
    }

    /// Converts to `(SOC, OCV)` rows sorted by SOC.
    ///
    /// Rows with the wrong number of columns are passed through unsorted so
    /// the engine can reject them.
    pub fn into_rows(self) -> Vec<Vec<f64>> {
        let mut rows = match self {
            Self::Points(points) => points.into_iter().map(|p| vec![p.x, p.y]).collect(),
            Self::Rows(rows) => rows,
        };
        if rows.iter().all(|row| row.len() == 2) {
            rows.sort_by(|a, b| a[0].total_cmp(&b[0]));
        }
        rows
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffusionResponse {
    pub rp_disc: Vec<f64>,
    pub cs_iter: Vec<f64>,
    pub loss_value: f64,
    pub iterations: usize,
    pub converged: bool,
}

impl From<SphericalDiffusionResult> for DiffusionResponse {
    fn from(res: SphericalDiffusionResult) -> Self {
        Self {
            rp_disc: res.radii,
            cs_iter: res.concentration,
            loss_value: res.residual_norm,
            iterations: res.iterations,
            converged: res.converged,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameMetadata {
    pub nx: usize,
    pub ny: usize,
    pub timesteps: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diffusion2dResponse {
    pub metadata: FrameMetadata,
    pub frames: Vec<RgbFrame>,
}

impl From<PlanarDiffusionResult> for Diffusion2dResponse {
    fn from(res: PlanarDiffusionResult) -> Self {
        Self {
            metadata: FrameMetadata {
                nx: res.nx,
                ny: res.ny,
                timesteps: res.nt,
            },
            frames: res.frames,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EcmResponse {
    pub t_table: Vec<f64>,
    #[serde(rename = "Vt")]
    pub vt: Vec<f64>,
    #[serde(rename = "SOC_store")]
    pub soc_store: Vec<f64>,
    #[serde(rename = "OCV_store")]
    pub ocv_store: Vec<f64>,
}

impl From<EcmResult> for EcmResponse {
    fn from(res: EcmResult) -> Self {
        Self {
            t_table: res.t_table,
            vt: res.vt,
            soc_store: res.soc,
            ocv_store: res.ocv,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResponse {
    pub results: Vec<DiffusionResponse>,
}

impl From<Vec<BatchOutcome>> for BatchResponse {
    fn from(outcomes: Vec<BatchOutcome>) -> Self {
        Self {
            results: outcomes.into_iter().map(|o| o.result.into()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SimulationResponse {
    Diffusion(DiffusionResponse),
    Diffusion2d(Diffusion2dResponse),
    Ecm(EcmResponse),
}

impl SimulationRequest {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Diffusion(_) => "diffusion",
            Self::Diffusion2d(_) => "diffusion_2d",
            Self::Ecm(_) => "ecm",
        }
    }

    /// Runs the engine named by the request.
    pub fn run(self) -> Result<SimulationResponse> {
        match self {
            Self::Diffusion(req) => req.run().map(SimulationResponse::Diffusion),
            Self::Diffusion2d(req) => req.run().map(SimulationResponse::Diffusion2d),
            Self::Ecm(req) => req.run().map(SimulationResponse::Ecm),
        }
    }
}

impl DiffusionRequest {
    pub fn run(&self) -> Result<DiffusionResponse> {
        let d = if self.temp_influenced {
            temperature_influenced(self.d).context("Failed to apply temperature correction")?
        } else {
            self.d
        };
        let params = SphericalDiffusionParams {
            d,
            r: self.r,
            ns: self.ns,
        };
        let result = SphericalDiffusionSolver::with_config(params, self.config)
            .and_then(|solver| solver.solve())
            .context("Spherical diffusion solve failed")?;
        Ok(result.into())
    }
}

impl Diffusion2dRequest {
    pub fn run(&self) -> Result<Diffusion2dResponse> {
        let params = PlanarDiffusionParams {
            nx: self.nx,
            ny: self.ny,
            dt: self.dt,
            d: self.d,
            t_max: self.t_max,
        };
        let result = PlanarDiffusionSolver::with_config(params, self.config)
            .and_then(|solver| solver.solve())
            .context("Planar diffusion solve failed")?;
        Ok(result.into())
    }
}

impl EcmRequest {
    pub fn run(&self) -> Result<EcmResponse> {
        let input = EcmInput {
            t_tot: self.t_tot,
            dt: self.dt,
            capacity: self.cn,
            soc_0: self.soc_0,
            i_app: self.i_app,
            interpolation: self.interpolation_choice.parse()?,
            // An empty upload means "no custom curve"
            ocv_curve: self
                .ocv_data
                .clone()
                .filter(|data| !data.is_empty())
                .map(OcvData::into_rows),
        };
        let result = EcmSimulation::with_config(input, self.config)
            .and_then(|sim| sim.run())
            .context("ECM simulation failed")?;
        Ok(result.into())
    }
}

/// Runs a batch of spherical solves and shapes the response.
pub fn run_diffusion_batch(cases: &[BatchCase]) -> Result<BatchResponse> {
    let outcomes = run_batch_with_config(cases, SphericalDiffusionConfig::default())
        .context("Batch diffusion failed")?;
    Ok(outcomes.into())
}

/// Parses a request from a JSON string.
pub fn from_request_str(json: &str) -> Result<SimulationRequest> {
    serde_json::from_str(json).context("Failed to parse simulation request")
}
