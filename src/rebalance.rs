//! Greedy cash allocation toward target weights.
//!
//! Buys one unit at a time. Before every purchase the drift of each position
//! is recomputed, because each buy changes the total value and therefore
//! every other position's share. The next unit always goes to the most
//! under-allocated position that cash can still pay for.
//!
//! ```
//! use driftbook::portfolio::{Portfolio, Position};
//! use driftbook::rebalance;
//! use driftbook::{Price, Symbol};
//!
//! let mut portfolio = Portfolio::default();
//! portfolio
//!     .add_position(Position::new(Symbol::new("MSFT"), Price(55_00), 1, 40.0))
//!     .unwrap();
//! portfolio
//!     .add_position(Position::new(Symbol::new("APPL"), Price(30_00), 1, 40.0))
//!     .unwrap();
//! portfolio
//!     .add_position(Position::new(Symbol::new("GOOG"), Price(15_00), 1, 20.0))
//!     .unwrap();
//!
//! let allocation = rebalance::allocate(&mut portfolio, Price(30_00));
//! assert_eq!(allocation.ledger.units(&Symbol::new("GOOG")), 1);
//! assert_eq!(allocation.remaining, Price(15_00));
//! ```

use crate::portfolio::{Portfolio, Position};
use crate::types::{Price, Symbol};

/// Units bought per ticker during one run, in first-purchase order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ledger {
    entries: Vec<(Symbol, u64)>,
}

impl Ledger {
    /// Record one more unit of `symbol`.
    pub fn record(&mut self, symbol: &Symbol) {
        match self.entries.iter_mut().find(|(s, _)| s == symbol) {
            Some((_, units)) => *units += 1,
            None => self.entries.push((symbol.clone(), 1)),
        }
    }

    /// Units bought of `symbol` (0 if never bought).
    pub fn units(&self, symbol: &Symbol) -> u64 {
        self.entries
            .iter()
            .find(|(s, _)| s == symbol)
            .map_or(0, |&(_, units)| units)
    }

    /// Entries in the order each ticker was first bought.
    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, u64)> {
        self.entries.iter().map(|(s, units)| (s, *units))
    }

    /// Number of distinct tickers bought.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Units bought across all tickers.
    pub fn total_units(&self) -> u64 {
        self.entries.iter().map(|(_, units)| units).sum()
    }

    /// Cash spent on the ledger at the portfolio's unit prices.
    ///
    /// Tickers missing from `portfolio` contribute nothing.
    pub fn cost(&self, portfolio: &Portfolio) -> Price {
        let cents = self
            .entries
            .iter()
            .filter_map(|(s, units)| portfolio.get(s).map(|p| p.price().0 * *units as i64))
            .sum();
        Price(cents)
    }
}

/// Result of one allocation run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Allocation {
    /// Units bought per ticker
    pub ledger: Ledger,
    /// Cash left over
    pub remaining: Price,
}

/// Invest `cash_to_invest` into `portfolio`.
///
/// The portfolio's available cash is replaced by `cash_to_invest` and then
/// spent down; see [`allocate_available`].
pub fn allocate(portfolio: &mut Portfolio, cash_to_invest: Price) -> Allocation {
    portfolio.set_cash_available(cash_to_invest);
    allocate_available(portfolio)
}

/// Invest the portfolio's own available cash.
///
/// Loops while cash remains: pick the next position with [`select_next`],
/// buy one unit, record it. Stops when cash runs out or no position is
/// eligible. Prices must be strictly positive; with a zero price the loop
/// would not terminate.
pub fn allocate_available(portfolio: &mut Portfolio) -> Allocation {
    let mut ledger = Ledger::default();
    while portfolio.cash_available() > Price::ZERO {
        let Some((index, _)) = select_index(portfolio, portfolio.cash_available()) else {
            break;
        };
        let bought = portfolio.buy_unit_at(index);
        ledger.record(bought.symbol());
    }
    Allocation {
        ledger,
        remaining: portfolio.cash_available(),
    }
}

/// The position that would receive the next unit with `remaining` cash,
/// together with its current drift.
///
/// Eligible positions have drift ≤ 0 and a unit price ≤ `remaining`. Among
/// them the most negative drift wins; on an exact tie the lower price wins,
/// and after that the earlier position. A unit that would overflow the
/// portfolio's total value is never eligible.
pub fn select_next(portfolio: &Portfolio, remaining: Price) -> Option<(&Position, f64)> {
    select_index(portfolio, remaining).map(|(i, drift)| (portfolio.position_at(i), drift))
}

#[allow(clippy::float_cmp)]
fn select_index(portfolio: &Portfolio, remaining: Price) -> Option<(usize, f64)> {
    let total = portfolio.total_value();
    let mut best: Option<(usize, f64, Price)> = None;

    for (i, pos) in portfolio.positions().enumerate() {
        let drift = pos.drift_pct(total);
        let fits = total.checked_add(pos.price().0).is_some();
        if drift > 0.0 || pos.price() > remaining || !fits {
            continue;
        }
        let better = match best {
            None => true,
            Some((_, best_drift, best_price)) => {
                drift < best_drift || (drift == best_drift && pos.price() < best_price)
            }
        };
        if better {
            best = Some((i, drift, pos.price()));
        }
    }

    best.map(|(i, drift, _)| (i, drift))
}
