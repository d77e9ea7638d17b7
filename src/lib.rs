// Allow our dollar.cents digit grouping convention (e.g., 100_00 = $100.00)
#![allow(clippy::inconsistent_digit_grouping)]

//! # driftbook
//!
//! Plans whole-share purchases that move a portfolio as close as possible to
//! its target allocation with a fixed amount of cash.
//!
//! ## Features
//!
//! - **Greedy, one unit at a time**: every purchase goes to the position that
//!   is currently furthest below target and still affordable
//! - **Never overshoots**: a position above its target is never bought
//! - **Deterministic**: ties break on lower price, then on portfolio order
//! - **Fixed-point cash**: prices and cash are integer cents, so
//!   `cash − remaining = Σ units · price` holds exactly
//!
//! ## Quick Start
//!
//! ```
//! use driftbook::{BuyReport, Portfolio, Position, Price, Symbol, rebalance};
//!
//! let mut portfolio = Portfolio::default();
//! portfolio.add_position(Position::new(Symbol::new("MSFT"), Price(10_00), 3, 50.0)).unwrap();
//! portfolio.add_position(Position::new(Symbol::new("APPL"), Price(20_00), 2, 30.0)).unwrap();
//! portfolio.add_position(Position::new(Symbol::new("GOOG"), Price(30_00), 1, 20.0)).unwrap();
//!
//! let allocation = rebalance::allocate(&mut portfolio, Price(100_00));
//! let report = BuyReport::new(&portfolio, &allocation).unwrap();
//!
//! assert_eq!(report.to_string(), "\
//! Buy 5X MSFT @ 10.00 - New allocation 40.00%
//! Buy 1X APPL @ 20.00 - New allocation 30.00%
//! Buy 1X GOOG @ 30.00 - New allocation 30.00%
//! Remaining cash $0.00
//! ");
//! ```
//!
//! ## Drift
//!
//! For a position with value `v` in a portfolio worth `V`:
//!
//! | quantity | formula |
//! |----------|---------|
//! | current allocation | `100 · v / V` (0 when `V = 0`) |
//! | drift | `100 · (current − target) / target` |
//!
//! Negative drift means under-allocated.
//!
//! ## Prices
//!
//! Prices are stored as [`i64`] cents:
//!
//! ```
//! use driftbook::Price;
//!
//! let price = Price(100_50);  // $100.50
//! assert_eq!(format!("{}", price), "$100.50");
//! ```

mod error;
pub mod portfolio;
pub mod rebalance;
pub mod report;
mod types;

// Re-export public API
pub use error::PortfolioError;
pub use portfolio::{Portfolio, Position};
pub use rebalance::{Allocation, Ledger};
pub use report::{BuyLine, BuyReport, DriftReport, DriftRow};
pub use types::{Price, Symbol};
