//! Unit prices for the calculator: a JSON price file or a brokerage.

use std::path::Path;

use driftbook::{Price, Symbol};
use driftbook_broker::Broker;
use rustc_hash::FxHashMap;

use crate::error::{Error, Result};

/// Something that can quote a unit price for a ticker.
pub trait PriceSource {
    fn price(&self, symbol: &Symbol) -> Result<Price>;
}

/// Prices read from a JSON object of ticker → dollars, e.g.
/// `{"MSFT": 10.0, "GOOG": 30.0}`.
#[derive(Debug, Clone, Default)]
pub struct PriceFile {
    prices: FxHashMap<String, f64>,
}

impl PriceFile {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&contents)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let prices: FxHashMap<String, f64> = serde_json::from_str(json)?;
        Ok(Self { prices })
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

impl PriceSource for PriceFile {
    fn price(&self, symbol: &Symbol) -> Result<Price> {
        let dollars = *self
            .prices
            .get(symbol.as_str())
            .ok_or_else(|| Error::PriceNotFound(symbol.to_string()))?;
        positive(symbol, dollars.is_finite().then(|| Price::from_dollars(dollars)))
    }
}

/// Quotes from a connected brokerage: the catalog entry whose symbol matches
/// exactly, priced through its security lookup.
pub struct BrokerQuotes<'a, B: Broker + ?Sized> {
    broker: &'a B,
}

impl<'a, B: Broker + ?Sized> BrokerQuotes<'a, B> {
    pub fn new(broker: &'a B) -> Self {
        Self { broker }
    }
}

impl<B: Broker + ?Sized> PriceSource for BrokerQuotes<'_, B> {
    fn price(&self, symbol: &Symbol) -> Result<Price> {
        let hit = self
            .broker
            .search_securities(symbol.as_str())?
            .into_iter()
            .find(|s| &s.symbol == symbol)
            .ok_or_else(|| Error::PriceNotFound(symbol.to_string()))?;
        let security = self.broker.security(&hit.id)?;
        positive(symbol, security.price())
    }
}

/// Reject missing, zero and negative quotes.
pub(crate) fn positive(symbol: &Symbol, price: Option<Price>) -> Result<Price> {
    match price {
        Some(p) if p.is_positive() => Ok(p),
        _ => Err(Error::InvalidPrice {
            ticker: symbol.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use driftbook_broker::mock::MockBroker;

    #[test]
    fn price_file_lookup() {
        let file = PriceFile::from_json(r#"{"MSFT": 10.0, "GOOG": 30.25}"#).unwrap();
        assert_eq!(file.len(), 2);
        assert_eq!(file.price(&Symbol::new("GOOG")).unwrap(), Price(30_25));
        assert!(matches!(
            file.price(&Symbol::new("AAPL")),
            Err(Error::PriceNotFound(t)) if t == "AAPL"
        ));
    }

    #[test]
    fn price_file_rejects_non_positive() {
        let file = PriceFile::from_json(r#"{"ZERO": 0, "NEG": -1.5, "DUST": 0.001}"#).unwrap();
        for t in ["ZERO", "NEG", "DUST"] {
            assert!(matches!(
                file.price(&Symbol::new(t)),
                Err(Error::InvalidPrice { .. })
            ));
        }
    }

    #[test]
    fn price_file_bad_json() {
        assert!(matches!(
            PriceFile::from_json(r#"{"MSFT": "ten"}"#),
            Err(Error::PriceParse(_))
        ));
        assert!(matches!(
            PriceFile::from_json("[1, 2]"),
            Err(Error::PriceParse(_))
        ));
    }

    #[test]
    fn broker_quotes_use_exact_symbol() {
        let mut broker = MockBroker::builder()
            .with_security("XEQT", "iShares Core Equity", "TSX", 28_50)
            .with_security("XEQT.U", "iShares Core Equity USD", "TSX", 21_00)
            .build();
        broker.connect().unwrap();

        let quotes = BrokerQuotes::new(&broker);
        assert_eq!(quotes.price(&Symbol::new("XEQT")).unwrap(), Price(28_50));
        assert!(matches!(
            quotes.price(&Symbol::new("XEQ")),
            Err(Error::PriceNotFound(_))
        ));
    }
}
