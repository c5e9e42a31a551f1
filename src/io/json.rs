//! Compact JSON and gzip export of simulation records.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Compression level used for exported frames.
pub const GZIP_LEVEL: u32 = 9;

/// Serializes a record to compact JSON (no whitespace).
pub fn to_json_string<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).context("Failed to serialize record to JSON")
}

/// Compact JSON compressed with gzip at [`GZIP_LEVEL`].
pub fn to_gzip_json<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::new(GZIP_LEVEL));
    serde_json::to_writer(&mut encoder, value).context("Failed to serialize record to JSON")?;
    encoder.finish().context("Failed to finish gzip stream")
}

/// Decodes a gzip-compressed JSON record.
pub fn from_gzip_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let mut json = Vec::new();
    GzDecoder::new(bytes)
        .read_to_end(&mut json)
        .context("Failed to decompress gzip stream")?;
    serde_json::from_slice(&json).context("Failed to deserialize record from JSON")
}

/// Byte size of the compact JSON form, as used for storage quota accounting.
pub fn serialized_size<T: Serialize>(value: &T) -> Result<usize> {
    let mut counter = ByteCounter::default();
    serde_json::to_writer(&mut counter, value).context("Failed to serialize record to JSON")?;
    Ok(counter.0)
}

#[derive(Default)]
struct ByteCounter(usize);

impl Write for ByteCounter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0 += buf.len();
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn is_gzip_path(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
}

/// Writes a record as compact JSON, gzip-compressed when the path ends in
/// `.gz`. Returns the number of bytes written.
pub fn write_record<T: Serialize>(path: &Path, value: &T) -> Result<usize> {
    let bytes = if is_gzip_path(path) {
        to_gzip_json(value)?
    } else {
        to_json_string(value)?.into_bytes()
    };
    let file = File::create(path)
        .with_context(|| format!("Failed to create file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(&bytes)
        .and_then(|_| writer.flush())
        .with_context(|| format!("Failed to write record to: {}", path.display()))?;
    Ok(bytes.len())
}

/// Reads a JSON record, transparently decompressing `.gz` files.
pub fn read_record<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open file: {}", path.display()))?;
    let mut reader = BufReader::new(file);
    if is_gzip_path(path) {
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        from_gzip_json(&bytes).with_context(|| format!("Failed to decode: {}", path.display()))
    } else {
        serde_json::from_reader(reader)
            .with_context(|| format!("Failed to deserialize record from: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::request::{Diffusion2dResponse, EcmResponse};
    use crate::sim::planar;

    #[test]
    fn test_json_is_compact() {
        let res = EcmResponse {
            t_table: vec![0.0, 1.0],
            vt: vec![3.6, 3.7],
            soc_store: vec![0.5, 0.51],
            ocv_store: vec![3.6, 3.6],
        };
        let json = to_json_string(&res).unwrap();
        assert!(!json.contains(' '));
        assert!(json.starts_with(r#"{"t_table":[0.0,1.0],"Vt":"#));
        assert_eq!(serialized_size(&res).unwrap(), json.len());
    }

    #[test]
    fn test_gzip_shrinks_frames() {
        let res: Diffusion2dResponse = planar::solve(20, 20, 1.0, 1.0, 0.01).unwrap().into();
        let plain = serialized_size(&res).unwrap();
        let packed = to_gzip_json(&res).unwrap();
        assert!(packed.len() < plain / 4, "{} vs {plain}", packed.len());
        let back: Diffusion2dResponse = from_gzip_json(&packed).unwrap();
        assert_eq!(back, res);
    }

    #[test]
    fn test_write_and_read_gz_file() {
        let path = std::env::temp_dir().join(format!("electrosim_{}.json.gz", std::process::id()));
        let res: Diffusion2dResponse = planar::solve(6, 6, 1.0, 1.0, 0.01).unwrap().into();
        let written = write_record(&path, &res).unwrap();
        assert_eq!(written as u64, std::fs::metadata(&path).unwrap().len());
        let back: Diffusion2dResponse = read_record(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(back, res);
    }

    #[test]
    fn test_missing_file_error_names_path() {
        let err = read_record::<EcmResponse>(Path::new("/nonexistent/record.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/record.json"));
    }
}
