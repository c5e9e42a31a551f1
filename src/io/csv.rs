//! CSV input for batch diffusion runs.
//!
//! The header must contain `d`, `r`, `ns` and `temp_influenced` in any order;
//! other columns are ignored. Quoted fields follow the usual CSV rules.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use csv::{ReaderBuilder, StringRecord, Trim};

use crate::sim::batch::BatchCase;

const REQUIRED_COLUMNS: [&str; 4] = ["d", "r", "ns", "temp_influenced"];

/// Column positions of the required fields.
struct Columns {
    d: usize,
    r: usize,
    ns: usize,
    temp_influenced: usize,
}

impl Columns {
    fn from_header(header: &StringRecord) -> Result<Self> {
        let position = |name: &str| header.iter().position(|c| c == name);
        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|name| position(name).is_none())
            .collect();
        if !missing.is_empty() {
            bail!("CSV header is missing columns: {}", missing.join(", "));
        }
        let [d, r, ns, temp_influenced] = REQUIRED_COLUMNS.map(|name| position(name).unwrap_or_default());
        Ok(Self {
            d,
            r,
            ns,
            temp_influenced,
        })
    }

    fn parse(&self, record: &StringRecord) -> Result<BatchCase> {
        let field = |i: usize, name: &str| {
            record
                .get(i)
                .ok_or_else(|| anyhow!("missing value for column '{name}'"))
        };
        let d = field(self.d, "d")?;
        let r = field(self.r, "r")?;
        let ns = field(self.ns, "ns")?;
        let temp = field(self.temp_influenced, "temp_influenced")?;

        Ok(BatchCase {
            d: d.parse().with_context(|| format!("invalid d '{d}'"))?,
            r: r.parse().with_context(|| format!("invalid r '{r}'"))?,
            ns: ns.parse().with_context(|| format!("invalid ns '{ns}'"))?,
            temp_influenced: matches!(temp.to_ascii_lowercase().as_str(), "true" | "1" | "yes"),
        })
    }
}

fn parse_reader<R: Read>(reader: R) -> Result<Vec<BatchCase>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let header = rdr.headers().context("Failed to read CSV header")?.clone();
    if header.is_empty() {
        bail!("CSV input is empty");
    }
    let columns = Columns::from_header(&header)?;

    let mut cases = Vec::new();
    for record in rdr.records() {
        let record = record.context("Malformed CSV record")?;
        if record.iter().all(|f| f.is_empty()) {
            continue;
        }
        let line = record.position().map_or(0, |p| p.line());
        let case = columns
            .parse(&record)
            .with_context(|| format!("Error in line {line}"))?;
        cases.push(case);
    }
    log::debug!("Parsed {} batch cases", cases.len());
    Ok(cases)
}

/// Parses batch cases from CSV text. Errors report the 1-based line number.
pub fn parse_batch_csv(text: &str) -> Result<Vec<BatchCase>> {
    parse_reader(text.as_bytes())
}

/// Reads and parses a batch CSV file.
pub fn read_batch_csv(path: &Path) -> Result<Vec<BatchCase>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open file: {}", path.display()))?;
    parse_reader(file).with_context(|| format!("Invalid batch file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_columns_in_any_order() {
        let text = "name,ns,temp_influenced,r,d\nA,10,TRUE,5e-6,1e-12\nB,20,no,4e-6,2e-12\n";
        let cases = parse_batch_csv(text).unwrap();
        assert_eq!(cases.len(), 2);
        assert_eq!(
            cases[0],
            BatchCase {
                d: 1e-12,
                r: 5e-6,
                ns: 10,
                temp_influenced: true
            }
        );
        assert_eq!(cases[1].ns, 20);
        assert!(!cases[1].temp_influenced);
    }

    #[test]
    fn test_quoted_field_with_comma() {
        let text = "name,d,r,ns,temp_influenced\n\"cell A, anode\",1e-12,5e-6,10,false\n";
        let cases = parse_batch_csv(text).unwrap();
        assert_eq!(
            cases,
            vec![BatchCase {
                d: 1e-12,
                r: 5e-6,
                ns: 10,
                temp_influenced: false
            }]
        );
    }

    #[test]
    fn test_boolean_spellings() {
        let text = "d,r,ns,temp_influenced\n1,1,1,1\n1,1,1,Yes\n1,1,1,false\n1,1,1,\n";
        let flags: Vec<bool> = parse_batch_csv(text).unwrap().iter().map(|c| c.temp_influenced).collect();
        assert_eq!(flags, vec![true, true, false, false]);
    }

    #[test]
    fn test_missing_column() {
        let err = parse_batch_csv("d,r,ns\n1,1,1\n").unwrap_err();
        assert!(err.to_string().contains("temp_influenced"), "{err}");
    }

    #[test]
    fn test_bad_row_reports_line() {
        let err = parse_batch_csv("d,r,ns,temp_influenced\n1e-12,5e-6,10,false\n1e-12,abc,10,false\n")
            .unwrap_err();
        assert_eq!(err.to_string(), "Error in line 3");
        assert!(format!("{err:#}").contains("invalid r 'abc'"));
    }

    #[test]
    fn test_short_row_reports_missing_value() {
        let err = parse_batch_csv("d,r,ns,temp_influenced\n1e-12,5e-6\n").unwrap_err();
        assert!(format!("{err:#}").contains("missing value for column 'ns'"), "{err:#}");
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_batch_csv("").is_err());
        assert!(parse_batch_csv("d,r,ns,temp_influenced\n").unwrap().is_empty());
    }
}
