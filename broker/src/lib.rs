//! Brokerage trait and implementations for driftbook.
//!
//! Provides a generic `Broker` trait for reading what an account holds and
//! looking up securities. Nothing here places orders: the rebalancer only
//! plans purchases.
//!
//! Implementations:
//!
//! - **Mock** (always available): configurable in-memory broker for tests
//! - **Wealthsimple** (feature `wealthsimple`): Wealthsimple Trade REST API

pub mod error;
pub mod mock;
pub mod types;

#[cfg(feature = "wealthsimple")]
pub mod wealthsimple;

pub use error::BrokerError;
pub use types::*;

/// A brokerage session that can list accounts, positions and securities.
pub trait Broker {
    /// Authenticate and open the session.
    fn connect(&mut self) -> Result<(), BrokerError>;

    /// Close the session and drop any credentials held for it.
    fn disconnect(&mut self) -> Result<(), BrokerError>;

    /// All trading accounts visible to this login.
    fn accounts(&self) -> Result<Vec<Account>, BrokerError>;

    /// Positions held in one account, each with its current quote.
    fn positions(&self, account: &AccountId) -> Result<Vec<Position>, BrokerError>;

    /// Search the security catalog by ticker or name.
    fn search_securities(&self, query: &str) -> Result<Vec<Security>, BrokerError>;

    /// Fetch one security, including its current quote.
    fn security(&self, id: &SecurityId) -> Result<Security, BrokerError>;
}
