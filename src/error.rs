//! Errors raised by portfolio queries and mutations.

use std::fmt;

use crate::types::Symbol;

/// Errors returned by [`Portfolio`](crate::Portfolio) operations.
///
/// The rebalancing loop itself never produces these: it only touches
/// positions it has just read from the portfolio.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PortfolioError {
    /// No position is held for this ticker.
    NotFound(Symbol),
    /// A position for this ticker is already in the portfolio.
    DuplicateTicker(Symbol),
    /// The portfolio has no value, so an allocation share is undefined.
    ZeroTotalValue,
    /// Adding this position would push the portfolio's value past what
    /// cents in an `i64` can hold.
    ValueOverflow(Symbol),
}

impl fmt::Display for PortfolioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortfolioError::NotFound(sym) => write!(f, "ticker {sym} not found in portfolio"),
            PortfolioError::DuplicateTicker(sym) => {
                write!(f, "ticker {sym} is already in the portfolio")
            }
            PortfolioError::ZeroTotalValue => {
                write!(f, "portfolio total value is zero; allocation is undefined")
            }
            PortfolioError::ValueOverflow(sym) => {
                write!(f, "value of {sym} is too large to track")
            }
        }
    }
}

impl std::error::Error for PortfolioError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(
            format!("{}", PortfolioError::NotFound(Symbol::new("MSFT"))),
            "ticker MSFT not found in portfolio"
        );
        assert_eq!(
            format!("{}", PortfolioError::DuplicateTicker(Symbol::new("GOOG"))),
            "ticker GOOG is already in the portfolio"
        );
        assert!(format!("{}", PortfolioError::ZeroTotalValue).contains("zero"));
        assert_eq!(
            format!("{}", PortfolioError::ValueOverflow(Symbol::new("BRK.A"))),
            "value of BRK.A is too large to track"
        );
    }

    #[test]
    fn is_error() {
        let err: Box<dyn std::error::Error> = Box::new(PortfolioError::ZeroTotalValue);
        assert!(err.to_string().contains("total value"));
    }
}
