//! driftbook-rebalancer: whole-share purchase planner.
//!
//! Loads a portfolio either from a CSV file plus a price file, or from a
//! Wealthsimple Trade account merged with a target-allocations CSV, then
//! prints the purchases that bring it closest to its targets. Runs are
//! recorded in a JSONL audit trail. No orders are ever submitted.

pub mod audit;
pub mod brokerage;
pub mod config;
pub mod error;
pub mod execution;
pub mod portfolio_csv;
pub mod prices;
pub mod prompt;
pub mod rows;
pub mod target;
