//! Core types: Symbol, Price

use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// Ticker identifier (e.g. `MSFT`, `VFV.TO`).
///
/// Stored trimmed. Comparison is case-sensitive: `MSFT` and `msft` are
/// different symbols.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Symbol(String);

impl Symbol {
    /// Create a symbol from a ticker string.
    ///
    /// Surrounding whitespace is trimmed. An empty ticker is a programming
    /// error; use [`Symbol::try_new`] for untrusted input.
    pub fn new(s: &str) -> Self {
        let trimmed = s.trim();
        debug_assert!(!trimmed.is_empty(), "symbol must not be empty");
        Symbol(trimmed.to_string())
    }

    /// Create a symbol, returning `None` if the ticker is empty after trimming.
    pub fn try_new(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Symbol(trimmed.to_string()))
        }
    }

    /// The ticker as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Money in cents.
///
/// `Price(10_50)` represents $10.50. Using fixed-point keeps cash
/// bookkeeping exact across any number of purchases.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Price(pub i64);

impl Price {
    pub const ZERO: Price = Price(0);

    /// Convert a dollar amount to cents, rounding to the nearest cent.
    pub fn from_dollars(dollars: f64) -> Price {
        Price((dollars * 100.0).round() as i64)
    }

    /// The amount in dollars.
    #[inline]
    pub fn dollars(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// The amount in cents.
    #[inline]
    pub fn cents(self) -> i64 {
        self.0
    }

    #[inline]
    pub fn is_positive(self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dollars = self.0 / 100;
        let cents = (self.0 % 100).abs();
        if self.0 < 0 {
            write!(f, "-${}.{:02}", dollars.abs(), cents)
        } else {
            write!(f, "${}.{:02}", dollars, cents)
        }
    }
}

impl Add for Price {
    type Output = Price;
    fn add(self, rhs: Price) -> Price {
        Price(self.0 + rhs.0)
    }
}

impl AddAssign for Price {
    fn add_assign(&mut self, rhs: Price) {
        self.0 += rhs.0;
    }
}

impl Sub for Price {
    type Output = Price;
    fn sub(self, rhs: Price) -> Price {
        Price(self.0 - rhs.0)
    }
}

impl SubAssign for Price {
    fn sub_assign(&mut self, rhs: Price) {
        self.0 -= rhs.0;
    }
}
