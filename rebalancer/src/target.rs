//! Target-allocations CSV: `TICKER,TARGET_ALLOCATION`, no header.

use std::io::Read;
use std::path::Path;

use rustc_hash::FxHashSet;

use crate::error::{Error, Result};
use crate::rows;

const EXPECTED: &str = "TICKER,TARGET_ALLOCATION";

/// One row of the target-allocations CSV.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetRow {
    /// 1-based row number
    pub row: usize,
    /// Ticker as spelled in the file
    pub ticker: String,
    pub target: f64,
}

/// Parse every row, rejecting malformed rows, bad numbers and repeated
/// tickers. The 100% check happens after merging with the account, since
/// held positions without a row are reported first.
pub fn parse<R: Read>(input: R) -> Result<Vec<TargetRow>> {
    let mut out = Vec::new();
    let mut seen = FxHashSet::default();

    for (i, record) in rows::reader(input).records().enumerate() {
        let row = i + 1;
        let record = record?;
        if record.len() != 2 || record[0].is_empty() {
            return Err(Error::MalformedRow {
                row,
                expected: EXPECTED,
            });
        }
        let ticker = record[0].to_string();
        let target = rows::parse_target(&record[1], row)?;
        if !seen.insert(ticker.clone()) {
            return Err(Error::DuplicateTicker { row, ticker });
        }
        out.push(TargetRow {
            row,
            ticker,
            target,
        });
    }

    if out.is_empty() {
        return Err(Error::MalformedRow {
            row: 1,
            expected: EXPECTED,
        });
    }
    Ok(out)
}

/// Read a target-allocations CSV file.
pub fn load(path: &Path) -> Result<Vec<TargetRow>> {
    let file = std::fs::File::open(path).map_err(|e| Error::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse(file)
}
