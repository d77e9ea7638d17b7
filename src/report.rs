//! Human-readable reports: the purchase plan and the drift table.

use std::fmt;

use crate::error::PortfolioError;
use crate::portfolio::Portfolio;
use crate::rebalance::Allocation;
use crate::types::{Price, Symbol};

/// One purchase line of a [`BuyReport`].
#[derive(Clone, Debug, PartialEq)]
pub struct BuyLine {
    pub symbol: Symbol,
    pub units: u64,
    pub price: Price,
    /// Allocation after all purchases, in percent
    pub new_allocation_pct: f64,
}

/// Purchase plan rendered after an allocation run.
///
/// ```text
/// Buy 5X MSFT @ 10.00 - New allocation 40.00%
/// Remaining cash $0.00
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct BuyReport {
    pub lines: Vec<BuyLine>,
    pub remaining: Price,
}

impl BuyReport {
    /// Build the report from a portfolio that has already been allocated.
    ///
    /// New allocations come from [`Portfolio::current_allocation_pct`], so a
    /// ledger entry against a zero-value portfolio is an error.
    pub fn new(portfolio: &Portfolio, allocation: &Allocation) -> Result<Self, PortfolioError> {
        let lines = allocation
            .ledger
            .iter()
            .map(|(symbol, units)| {
                let pos = portfolio.lookup(symbol)?;
                Ok(BuyLine {
                    symbol: symbol.clone(),
                    units,
                    price: pos.price(),
                    new_allocation_pct: portfolio.current_allocation_pct(symbol)?,
                })
            })
            .collect::<Result<Vec<_>, PortfolioError>>()?;

        Ok(Self {
            lines,
            remaining: allocation.remaining,
        })
    }
}

impl fmt::Display for BuyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(
                f,
                "Buy {}X {} @ {:.2} - New allocation {:.2}%",
                line.units,
                line.symbol,
                line.price.dollars(),
                line.new_allocation_pct,
            )?;
        }
        writeln!(f, "Remaining cash {}", self.remaining)
    }
}

/// One row of a [`DriftReport`].
#[derive(Clone, Debug, PartialEq)]
pub struct DriftRow {
    pub symbol: Symbol,
    pub quantity: u64,
    pub price: Price,
    pub value: Price,
    pub current_pct: f64,
    pub target_pct: f64,
    pub drift_pct: f64,
}

/// Snapshot of where every position stands against its target.
#[derive(Clone, Debug, PartialEq)]
pub struct DriftReport {
    pub rows: Vec<DriftRow>,
    pub total_value: Price,
}

impl DriftReport {
    pub fn new(portfolio: &Portfolio) -> Self {
        let total = portfolio.total_value();
        let rows = portfolio
            .positions()
            .map(|pos| DriftRow {
                symbol: pos.symbol().clone(),
                quantity: pos.quantity(),
                price: pos.price(),
                value: Price(pos.market_value()),
                current_pct: pos.allocation_pct(total),
                target_pct: pos.target_allocation(),
                drift_pct: pos.drift_pct(total),
            })
            .collect();
        Self {
            rows,
            total_value: Price(total),
        }
    }

    /// The most under-allocated row, if any position is below target.
    pub fn most_underweight(&self) -> Option<&DriftRow> {
        self.rows
            .iter()
            .filter(|r| r.drift_pct < 0.0)
            .min_by(|a, b| a.drift_pct.total_cmp(&b.drift_pct))
    }
}

impl fmt::Display for DriftReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "  {:8} {:>8} {:>10} {:>12} {:>9} {:>9} {:>9}",
            "Ticker", "Qty", "Price", "Value", "Current", "Target", "Drift"
        )?;
        for row in &self.rows {
            writeln!(
                f,
                "  {:8} {:>8} {:>10} {:>12} {:>8.2}% {:>8.2}% {:>+8.2}%",
                row.symbol.as_str(),
                row.quantity,
                format!("{}", row.price),
                format!("{}", row.value),
                row.current_pct,
                row.target_pct,
                row.drift_pct,
            )?;
        }
        writeln!(f, "  Total value {}", self.total_value)
    }
}
