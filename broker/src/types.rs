//! Shared broker types: accounts, positions, securities.

use std::fmt;

use driftbook::{Price, Symbol};

/// Opaque account identifier assigned by the broker.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccountId(pub String);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque security identifier assigned by the broker.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SecurityId(pub String);

impl fmt::Display for SecurityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A trading account and the cash it can spend.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: AccountId,
    /// Account kind as the broker names it (e.g. "ca_tfsa")
    pub kind: String,
    pub buying_power_cents: i64,
    pub currency: String,
}

impl Account {
    pub fn buying_power(&self) -> Price {
        Price(self.buying_power_cents)
    }
}

/// A holding in an account, with the quote it was read at.
#[derive(Debug, Clone)]
pub struct Position {
    pub symbol: Symbol,
    pub security_id: SecurityId,
    /// Whole units held.
    pub quantity: u64,
    pub price_cents: i64,
}

impl Position {
    pub fn price(&self) -> Price {
        Price(self.price_cents)
    }
}

/// A catalog entry.
#[derive(Debug, Clone)]
pub struct Security {
    pub id: SecurityId,
    pub symbol: Symbol,
    pub name: String,
    pub exchange: String,
    /// Last quote, when the endpoint returns one (search results usually don't).
    pub price_cents: Option<i64>,
}

impl Security {
    pub fn price(&self) -> Option<Price> {
        self.price_cents.map(Price)
    }
}

impl fmt::Display for Security {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ticker: {}, Name: {}, Exchange: {}",
            self.symbol, self.name, self.exchange
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn security_display() {
        let sec = Security {
            id: SecurityId("sec-s-1".into()),
            symbol: Symbol::new("VFV"),
            name: "Vanguard S&P 500 Index ETF".into(),
            exchange: "TSX".into(),
            price_cents: None,
        };
        assert_eq!(
            sec.to_string(),
            "Ticker: VFV, Name: Vanguard S&P 500 Index ETF, Exchange: TSX"
        );
        assert!(sec.price().is_none());
    }

    #[test]
    fn ids_display_raw() {
        assert_eq!(AccountId("tfsa-abc".into()).to_string(), "tfsa-abc");
        assert_eq!(SecurityId("sec-s-1".into()).to_string(), "sec-s-1");
    }
}
