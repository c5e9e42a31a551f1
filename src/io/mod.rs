//! Request decoding and record export.
//!
//! This module turns JSON requests and batch CSV files into engine inputs,
//! and writes the resulting records as compact (optionally gzip-compressed)
//! JSON.

pub mod csv;
pub mod json;
pub mod request;

pub use self::csv::{parse_batch_csv, read_batch_csv};
pub use json::{read_record, serialized_size, to_gzip_json, to_json_string, write_record};
pub use request::{
    BatchResponse, SimulationRequest, SimulationResponse, from_request_str, run_diffusion_batch,
};
