//! Field parsing shared by the CSV loaders.

use std::io::Read;

use crate::error::{Error, Result};

/// Tolerance when checking that targets add up to 100.
pub const SUM_TOLERANCE: f64 = 1e-9;

/// Headerless, trimmed reader that lets rows vary in width so the loaders
/// can report the bad row themselves.
pub fn reader<R: Read>(input: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input)
}

/// Largest share count a position can carry: quantities are valued as
/// `i64` cents.
pub const MAX_SHARES: u64 = i64::MAX as u64;

/// A whole, non-negative share count. `3` and `3.0` are both accepted.
pub fn parse_shares(raw: &str, row: usize) -> Result<u64> {
    let invalid = || Error::InvalidNumber {
        row,
        field: "shares owned",
    };
    let shares = match raw.parse::<u64>() {
        Ok(n) => n,
        Err(_) => {
            let value: f64 = raw.parse().map_err(|_| invalid())?;
            if !value.is_finite() || value < 0.0 || value.fract() != 0.0 {
                return Err(invalid());
            }
            if value >= MAX_SHARES as f64 {
                return Err(Error::QuantityTooLarge { row });
            }
            value as u64
        }
    };
    if shares > MAX_SHARES {
        return Err(Error::QuantityTooLarge { row });
    }
    Ok(shares)
}

/// A target percentage in (0, 100], optionally suffixed with `%`.
pub fn parse_target(raw: &str, row: usize) -> Result<f64> {
    let value: f64 = raw
        .trim_end_matches('%')
        .trim()
        .parse()
        .map_err(|_| Error::InvalidNumber {
            row,
            field: "target allocation",
        })?;
    if !value.is_finite() {
        return Err(Error::InvalidNumber {
            row,
            field: "target allocation",
        });
    }
    if value <= 0.0 || value > 100.0 {
        return Err(Error::InvalidTarget { row, value });
    }
    Ok(value)
}

/// Targets must add up to 100.
pub fn check_allocation_sum(total: f64) -> Result<()> {
    if (total - 100.0).abs() > SUM_TOLERANCE {
        return Err(Error::AllocationSumInvalid(total));
    }
    Ok(())
}
