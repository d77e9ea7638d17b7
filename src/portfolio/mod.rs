//! Portfolio model: positions, available cash, and allocation drift.
//!
//! A [`Portfolio`] is populated once by a loader, mutated in place while
//! purchases are planned, and read afterwards for reporting.
//!
//! # Example
//!
//! ```
//! use driftbook::portfolio::{Portfolio, Position};
//! use driftbook::{Price, Symbol};
//!
//! let mut portfolio = Portfolio::new(Price(100_00));
//! portfolio
//!     .add_position(Position::new(Symbol::new("MSFT"), Price(10_00), 3, 50.0))
//!     .unwrap();
//! portfolio
//!     .add_position(Position::new(Symbol::new("GOOG"), Price(30_00), 1, 50.0))
//!     .unwrap();
//!
//! assert_eq!(portfolio.total_value(), 60_00);
//! let drifts = portfolio.drift_percentages();
//! assert_eq!(drifts[0].0, Symbol::new("MSFT"));
//! assert_eq!(drifts[0].1, 0.0);
//! ```

pub mod position;

pub use position::Position;

use crate::error::PortfolioError;
use crate::types::{Price, Symbol};
use rustc_hash::FxHashMap;

/// A collection of positions plus the cash available to buy more of them.
///
/// Positions keep the order they were added in. Every scan (drift
/// computation, purchase selection, reporting) walks them in that order.
#[derive(Clone, Debug, Default)]
pub struct Portfolio {
    /// Cash available for purchases (cents)
    cash_available: Price,
    /// Positions in insertion order
    positions: Vec<Position>,
    /// Symbol → index into `positions`
    index: FxHashMap<Symbol, usize>,
}

impl Portfolio {
    /// Create an empty portfolio with the given cash.
    pub fn new(cash_available: Price) -> Self {
        Self {
            cash_available,
            positions: Vec::new(),
            index: FxHashMap::default(),
        }
    }

    // === Queries ===

    /// Cash available for purchases.
    #[inline]
    pub fn cash_available(&self) -> Price {
        self.cash_available
    }

    /// Replace the available cash.
    pub fn set_cash_available(&mut self, cash: Price) {
        self.cash_available = cash;
    }

    /// Look up a position by ticker.
    pub fn lookup(&self, symbol: &Symbol) -> Result<&Position, PortfolioError> {
        self.get(symbol)
            .ok_or_else(|| PortfolioError::NotFound(symbol.clone()))
    }

    /// Get a position by ticker, if present.
    pub fn get(&self, symbol: &Symbol) -> Option<&Position> {
        self.index.get(symbol).map(|&i| &self.positions[i])
    }

    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.index.contains_key(symbol)
    }

    /// Positions in insertion order.
    pub fn positions(&self) -> impl Iterator<Item = &Position> {
        self.positions.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Total market value of all positions (cents). Cash is not included.
    ///
    /// Always fits in an `i64`: [`add_position`](Self::add_position) and the
    /// allocation loop refuse anything that would overflow it.
    pub fn total_value(&self) -> i64 {
        self.positions.iter().map(Position::market_value).sum()
    }

    /// Sum of all target allocations, in percent.
    pub fn target_total(&self) -> f64 {
        self.positions.iter().map(Position::target_allocation).sum()
    }

    /// Drift percentage of every position, in insertion order.
    ///
    /// Recomputed from current quantities on every call. When the portfolio
    /// has no value each position counts as 0% allocated, so every drift is
    /// -100.
    pub fn drift_percentages(&self) -> Vec<(Symbol, f64)> {
        let total = self.total_value();
        self.positions
            .iter()
            .map(|pos| (pos.symbol().clone(), pos.drift_pct(total)))
            .collect()
    }

    /// Share of total value held in `symbol`, in percent.
    ///
    /// Unlike [`drift_percentages`](Self::drift_percentages) this is not
    /// guarded against an empty portfolio: it fails with
    /// [`PortfolioError::ZeroTotalValue`] when nothing is held yet.
    pub fn current_allocation_pct(&self, symbol: &Symbol) -> Result<f64, PortfolioError> {
        let pos = self.lookup(symbol)?;
        let total = self.total_value();
        if total == 0 {
            return Err(PortfolioError::ZeroTotalValue);
        }
        Ok(100.0 * pos.market_value() as f64 / total as f64)
    }

    // === Mutation ===

    /// Add a position.
    ///
    /// Fails if the ticker is already present, or if the position's value
    /// would overflow the portfolio total. Loaders report duplicates with row
    /// context before getting here.
    pub fn add_position(&mut self, position: Position) -> Result<(), PortfolioError> {
        if self.index.contains_key(position.symbol()) {
            return Err(PortfolioError::DuplicateTicker(position.symbol().clone()));
        }
        let fits = position
            .checked_market_value()
            .and_then(|v| self.total_value().checked_add(v));
        if fits.is_none() {
            return Err(PortfolioError::ValueOverflow(position.symbol().clone()));
        }
        self.index
            .insert(position.symbol().clone(), self.positions.len());
        self.positions.push(position);
        Ok(())
    }

    /// Buy one unit of `symbol`: quantity +1, cash minus the unit price.
    ///
    /// Affordability is not checked; cash may go negative if the caller
    /// does not check first. Fails with [`PortfolioError::ValueOverflow`]
    /// when one more unit would overflow the total value.
    pub fn buy_one_unit(&mut self, symbol: &Symbol) -> Result<(), PortfolioError> {
        let i = *self
            .index
            .get(symbol)
            .ok_or_else(|| PortfolioError::NotFound(symbol.clone()))?;
        if !self.can_value_one_more(&self.positions[i]) {
            return Err(PortfolioError::ValueOverflow(symbol.clone()));
        }
        self.buy_unit_at(i);
        Ok(())
    }

    /// Buy one unit of the position at `index` (insertion order).
    pub(crate) fn buy_unit_at(&mut self, index: usize) -> &Position {
        let pos = &mut self.positions[index];
        pos.add_unit();
        self.cash_available -= pos.price();
        pos
    }

    /// Whether one more unit of `pos` keeps the total value representable.
    pub(crate) fn can_value_one_more(&self, pos: &Position) -> bool {
        self.total_value().checked_add(pos.price().0).is_some()
    }

    pub(crate) fn position_at(&self, index: usize) -> &Position {
        &self.positions[index]
    }
}
