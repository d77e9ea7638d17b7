//! Portfolio CSV: `TICKER,SHARES_OWNED,TARGET_ALLOCATION`, no header.

use std::io::Read;
use std::path::Path;

use driftbook::{Portfolio, PortfolioError, Position, Price, Symbol};
use rustc_hash::FxHashSet;

use crate::error::{Error, Result};
use crate::prices::PriceSource;
use crate::rows;

const EXPECTED: &str = "TICKER,SHARES_OWNED,TARGET_ALLOCATION";

/// One validated row of the portfolio CSV.
#[derive(Debug, Clone, PartialEq)]
pub struct HoldingRow {
    /// 1-based row number
    pub row: usize,
    pub symbol: Symbol,
    pub shares: u64,
    pub target: f64,
}

/// Parse and validate every row. Targets must add up to 100.
pub fn parse<R: Read>(input: R) -> Result<Vec<HoldingRow>> {
    let mut out = Vec::new();
    let mut seen = FxHashSet::default();
    let mut total = 0.0;

    for (i, record) in rows::reader(input).records().enumerate() {
        let row = i + 1;
        let record = record?;
        if record.len() != 3 {
            return Err(Error::MalformedRow {
                row,
                expected: EXPECTED,
            });
        }
        let symbol = Symbol::try_new(&record[0]).ok_or(Error::MalformedRow {
            row,
            expected: EXPECTED,
        })?;
        let shares = rows::parse_shares(&record[1], row)?;
        let target = rows::parse_target(&record[2], row)?;

        if !seen.insert(symbol.clone()) {
            return Err(Error::DuplicateTicker {
                row,
                ticker: symbol.to_string(),
            });
        }
        total += target;
        out.push(HoldingRow {
            row,
            symbol,
            shares,
            target,
        });
    }

    if out.is_empty() {
        return Err(Error::MalformedRow {
            row: 1,
            expected: EXPECTED,
        });
    }
    rows::check_allocation_sum(total)?;
    Ok(out)
}

/// Price each row and build a portfolio with no cash.
pub fn build(holdings: &[HoldingRow], prices: &dyn PriceSource) -> Result<Portfolio> {
    let mut portfolio = Portfolio::new(Price::ZERO);
    for h in holdings {
        let price = prices.price(&h.symbol)?;
        portfolio
            .add_position(Position::new(h.symbol.clone(), price, h.shares, h.target))
            .map_err(|e| match e {
                PortfolioError::ValueOverflow(_) => Error::ValueTooLarge {
                    row: h.row,
                    ticker: h.symbol.to_string(),
                },
                other => other.into(),
            })?;
    }
    Ok(portfolio)
}

/// Read and validate a portfolio CSV file without pricing it.
pub fn read(path: &Path) -> Result<Vec<HoldingRow>> {
    let file = std::fs::File::open(path).map_err(|e| Error::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse(file)
}

/// Read, validate and price a portfolio CSV file.
pub fn load(path: &Path, prices: &dyn PriceSource) -> Result<Portfolio> {
    build(&read(path)?, prices)
}
