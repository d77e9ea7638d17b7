//! Mock broker for testing: implements the `Broker` trait over in-memory data.
//!
//! Use this in integration tests to simulate a brokerage without network calls.
//!
//! ```
//! use driftbook_broker::mock::MockBroker;
//! use driftbook_broker::Broker;
//!
//! let mut broker = MockBroker::builder()
//!     .with_account("tfsa-1", 1_000_00)
//!     .with_position("tfsa-1", "VFV", 10, 110_00)
//!     .with_security("XEQT", "iShares Core Equity ETF Portfolio", "TSX", 28_50)
//!     .build();
//!
//! broker.connect().unwrap();
//! assert_eq!(broker.accounts().unwrap().len(), 1);
//! ```

use std::cell::Cell;

use driftbook::Symbol;

use crate::Broker;
use crate::error::BrokerError;
use crate::types::*;

/// Builder for `MockBroker`.
pub struct MockBrokerBuilder {
    accounts: Vec<Account>,
    holdings: Vec<(AccountId, Position)>,
    catalog: Vec<Security>,
    require_otp: Option<String>,
}

impl MockBrokerBuilder {
    /// Add a CAD trading account with the given buying power.
    pub fn with_account(mut self, id: &str, buying_power_cents: i64) -> Self {
        self.accounts.push(Account {
            id: AccountId(id.to_string()),
            kind: "ca_tfsa".to_string(),
            buying_power_cents,
            currency: "CAD".to_string(),
        });
        self
    }

    /// Add a holding to an account. The security is also added to the
    /// catalog (if absent) so that it can be searched for.
    pub fn with_position(
        mut self,
        account: &str,
        symbol: &str,
        quantity: u64,
        price_cents: i64,
    ) -> Self {
        let security = self.ensure_security(symbol, symbol, "TSX", price_cents);
        self.holdings.push((
            AccountId(account.to_string()),
            Position {
                symbol: security.symbol,
                security_id: security.id,
                quantity,
                price_cents,
            },
        ));
        self
    }

    /// Add a catalog entry that no account holds.
    pub fn with_security(mut self, symbol: &str, name: &str, exchange: &str, price_cents: i64) -> Self {
        self.ensure_security(symbol, name, exchange, price_cents);
        self
    }

    /// Make `connect` fail with `TwoFactorRequired` unless the given code is
    /// supplied through `MockBroker::with_otp`.
    pub fn require_otp(mut self, code: &str) -> Self {
        self.require_otp = Some(code.to_string());
        self
    }

    fn ensure_security(&mut self, symbol: &str, name: &str, exchange: &str, price_cents: i64) -> Security {
        if let Some(existing) = self
            .catalog
            .iter()
            .find(|s| s.symbol.as_str() == symbol && s.exchange == exchange)
        {
            return existing.clone();
        }
        let security = Security {
            id: SecurityId(format!("sec-s-{}", self.catalog.len() + 1)),
            symbol: Symbol::new(symbol),
            name: name.to_string(),
            exchange: exchange.to_string(),
            price_cents: Some(price_cents),
        };
        self.catalog.push(security.clone());
        security
    }

    pub fn build(self) -> MockBroker {
        MockBroker {
            connected: false,
            accounts: self.accounts,
            holdings: self.holdings,
            catalog: self.catalog,
            require_otp: self.require_otp,
            otp: None,
            searches: Cell::new(0),
        }
    }
}

/// A mock broker serving fixed accounts, holdings and a security catalog.
pub struct MockBroker {
    connected: bool,
    accounts: Vec<Account>,
    holdings: Vec<(AccountId, Position)>,
    catalog: Vec<Security>,
    require_otp: Option<String>,
    otp: Option<String>,
    searches: Cell<usize>,
}

impl MockBroker {
    pub fn builder() -> MockBrokerBuilder {
        MockBrokerBuilder {
            accounts: Vec::new(),
            holdings: Vec::new(),
            catalog: Vec::new(),
            require_otp: None,
        }
    }

    /// Supply a one-time password for the next `connect`.
    pub fn with_otp(&mut self, code: &str) {
        self.otp = Some(code.to_string());
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Number of catalog searches served (for assertion in tests).
    pub fn search_count(&self) -> usize {
        self.searches.get()
    }

    fn require_connected(&self) -> Result<(), BrokerError> {
        if self.connected {
            Ok(())
        } else {
            Err(BrokerError::NotConnected)
        }
    }
}

impl Broker for MockBroker {
    fn connect(&mut self) -> Result<(), BrokerError> {
        if let Some(expected) = &self.require_otp {
            match &self.otp {
                None => return Err(BrokerError::TwoFactorRequired),
                Some(code) if code != expected => {
                    return Err(BrokerError::Auth("invalid one-time password".into()));
                }
                Some(_) => {}
            }
        }
        self.connected = true;
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), BrokerError> {
        self.connected = false;
        self.otp = None;
        Ok(())
    }

    fn accounts(&self) -> Result<Vec<Account>, BrokerError> {
        self.require_connected()?;
        Ok(self.accounts.clone())
    }

    fn positions(&self, account: &AccountId) -> Result<Vec<Position>, BrokerError> {
        self.require_connected()?;
        if !self.accounts.iter().any(|a| &a.id == account) {
            return Err(BrokerError::UnknownAccount(account.to_string()));
        }
        Ok(self
            .holdings
            .iter()
            .filter(|(id, _)| id == account)
            .map(|(_, p)| p.clone())
            .collect())
    }

    fn search_securities(&self, query: &str) -> Result<Vec<Security>, BrokerError> {
        self.require_connected()?;
        self.searches.set(self.searches.get() + 1);
        let needle = query.to_ascii_uppercase();
        // Search results never carry a quote.
        Ok(self
            .catalog
            .iter()
            .filter(|s| {
                s.symbol.as_str().to_ascii_uppercase().starts_with(&needle)
                    || s.name.to_ascii_uppercase().contains(&needle)
            })
            .map(|s| Security {
                price_cents: None,
                ..s.clone()
            })
            .collect())
    }

    fn security(&self, id: &SecurityId) -> Result<Security, BrokerError> {
        self.require_connected()?;
        self.catalog
            .iter()
            .find(|s| &s.id == id)
            .cloned()
            .ok_or_else(|| BrokerError::InvalidSymbol(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MockBroker {
        MockBroker::builder()
            .with_account("tfsa-1", 500_00)
            .with_account("rrsp-1", 0)
            .with_position("tfsa-1", "VFV", 10, 110_00)
            .with_position("rrsp-1", "XEQT", 3, 28_50)
            .with_security("VCN", "Vanguard FTSE Canada All Cap", "TSX", 45_10)
            .build()
    }

    #[test]
    fn builder_basic() {
        let mut broker = sample();
        broker.connect().unwrap();

        let accounts = broker.accounts().unwrap();
        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].buying_power_cents, 500_00);

        let positions = broker.positions(&AccountId("tfsa-1".into())).unwrap();
        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].symbol, Symbol::new("VFV"));
        assert_eq!(positions[0].quantity, 10);
        assert_eq!(positions[0].price_cents, 110_00);
    }

    #[test]
    fn not_connected_errors() {
        let broker = sample();
        assert!(matches!(broker.accounts(), Err(BrokerError::NotConnected)));
        assert!(matches!(
            broker.search_securities("VFV"),
            Err(BrokerError::NotConnected)
        ));
    }

    #[test]
    fn disconnect_closes_session() {
        let mut broker = sample();
        broker.connect().unwrap();
        broker.disconnect().unwrap();
        assert!(broker.accounts().is_err());
    }

    #[test]
    fn unknown_account() {
        let mut broker = sample();
        broker.connect().unwrap();
        let err = broker.positions(&AccountId("nope".into())).unwrap_err();
        assert!(matches!(err, BrokerError::UnknownAccount(_)));
    }

    #[test]
    fn search_strips_quotes_and_security_restores_them() {
        let mut broker = sample();
        broker.connect().unwrap();

        let hits = broker.search_securities("vcn").unwrap();
        assert_eq!(hits.len(), 1);
        assert!(hits[0].price_cents.is_none());

        let full = broker.security(&hits[0].id).unwrap();
        assert_eq!(full.price_cents, Some(45_10));
        assert_eq!(broker.search_count(), 1);
    }

    #[test]
    fn search_matches_names() {
        let mut broker = sample();
        broker.connect().unwrap();
        let hits = broker.search_securities("canada").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].symbol, Symbol::new("VCN"));
    }

    #[test]
    fn held_security_is_in_catalog_once() {
        let mut broker = MockBroker::builder()
            .with_account("a", 0)
            .with_account("b", 0)
            .with_position("a", "VFV", 1, 110_00)
            .with_position("b", "VFV", 2, 110_00)
            .build();
        broker.connect().unwrap();
        assert_eq!(broker.search_securities("VFV").unwrap().len(), 1);
    }

    #[test]
    fn otp_flow() {
        let mut broker = MockBroker::builder().require_otp("123456").build();
        assert!(matches!(
            broker.connect(),
            Err(BrokerError::TwoFactorRequired)
        ));

        broker.with_otp("000000");
        assert!(matches!(broker.connect(), Err(BrokerError::Auth(_))));

        broker.with_otp("123456");
        broker.connect().unwrap();
        assert!(broker.accounts().unwrap().is_empty());
    }
}
